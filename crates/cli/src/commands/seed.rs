//! Seed the database with a small demo catalog for local development.
//!
//! Creates one brand with a template catalog, a franchise store with a
//! price override, and an independent store with its own product. Running
//! it twice creates a second copy of everything except the brand, whose
//! unique name makes the command fail fast.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Seed the demo catalog.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or any insert fails.
/// All inserts run in one transaction.
pub async fn run() -> Result<(), SeedError> {
    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;

    info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let mut tx = pool.begin().await?;

    let brand_id: i32 =
        sqlx::query_scalar("INSERT INTO brand (name) VALUES ($1) RETURNING id")
            .bind("Pizza Palace")
            .fetch_one(&mut *tx)
            .await?;
    info!(brand_id, "Created demo brand");

    let franchise_id = insert_store(&mut tx, "Pizza Palace Centro", Some(brand_id)).await?;
    let independent_id = insert_store(&mut tx, "Cantina da Nona", None).await?;
    info!(franchise_id, independent_id, "Created demo stores");

    // Brand template catalog.
    let category_id: i32 = sqlx::query_scalar(
        "INSERT INTO category (name, display_order, brand_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("Pizzas")
    .bind(0)
    .bind(brand_id)
    .fetch_one(&mut *tx)
    .await?;

    let product_id: i32 = sqlx::query_scalar(
        "INSERT INTO product (name, description, price, category_id, brand_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind("Margherita")
    .bind("Tomato, mozzarella, basil")
    .bind(Decimal::new(4990, 2))
    .bind(category_id)
    .bind(brand_id)
    .fetch_one(&mut *tx)
    .await?;

    let group_id: i32 = sqlx::query_scalar(
        "INSERT INTO option_group (name, min_selections, max_selections, brand_id) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Size")
    .bind(1)
    .bind(1)
    .bind(brand_id)
    .fetch_one(&mut *tx)
    .await?;

    for (order, (name, extra)) in [
        ("Medium", Decimal::ZERO),
        ("Large", Decimal::new(1000, 2)),
        ("Family", Decimal::new(2000, 2)),
    ]
    .into_iter()
    .enumerate()
    {
        sqlx::query(
            "INSERT INTO option_item (name, additional_price, display_order, option_group_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(extra)
        .bind(i32::try_from(order).unwrap_or(0))
        .bind(group_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO category_option_group (category_id, option_group_id, \
         display_order_in_category) VALUES ($1, $2, $3)",
    )
    .bind(category_id)
    .bind(group_id)
    .bind(0)
    .execute(&mut *tx)
    .await?;
    info!(category_id, product_id, group_id, "Created template catalog");

    // The franchise store sells the Margherita cheaper than the template.
    sqlx::query(
        "INSERT INTO store_item_override (store_id, kind, template_item_id, local_price) \
         VALUES ($1, 'product', $2, $3)",
    )
    .bind(franchise_id)
    .bind(product_id)
    .bind(Decimal::new(4490, 2))
    .execute(&mut *tx)
    .await?;

    // The independent store has its own small menu.
    let own_category_id: i32 = sqlx::query_scalar(
        "INSERT INTO category (name, display_order, store_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("Pastas")
    .bind(0)
    .bind(independent_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO product (name, price, category_id, store_id) VALUES ($1, $2, $3, $4)",
    )
    .bind("Lasagna della Nona")
    .bind(Decimal::new(3890, 2))
    .bind(own_category_id)
    .bind(independent_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Seeding complete!");
    Ok(())
}

async fn insert_store(
    conn: &mut PgConnection,
    name: &str,
    brand_id: Option<i32>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO store (name, brand_id, min_order_value) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(brand_id)
    .bind(Decimal::ZERO)
    .fetch_one(conn)
    .await
}
