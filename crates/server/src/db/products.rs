//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use menuforge_core::catalog::Product;
use menuforge_core::overrides::OverrideKind;
use menuforge_core::types::{BrandId, CategoryId, Owner, ProductId, StoreId};

use super::{OwnerFilter, RepositoryError};

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    available: bool,
    category_id: Option<i32>,
    store_id: Option<i32>,
    brand_id: Option<i32>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let owner = Owner::from_columns(
            row.store_id.map(StoreId::new),
            row.brand_id.map(BrandId::new),
        )
        .map_err(|e| RepositoryError::DataCorruption(format!("product {}: {e}", row.id)))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url,
            available: row.available,
            category_id: row.category_id.map(CategoryId::new),
            owner,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, available, category_id, store_id, brand_id";

/// Fields of a product create or update.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub category_id: Option<CategoryId>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products visible through the filter, optionally restricted to
    /// one category, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn list(
        &self,
        filter: OwnerFilter,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let (any, store_id, brand_id) = filter.params();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
             WHERE ($1 OR store_id = $2 OR brand_id = $3) \
             AND ($4::int IS NULL OR category_id = $4) \
             ORDER BY name"
        ))
        .bind(any)
        .bind(store_id)
        .bind(brand_id)
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a product under the given owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &ProductInput,
        owner: Owner,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product \
             (name, description, price, image_url, available, category_id, store_id, brand_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.available)
        .bind(input.category_id)
        .bind(owner.store_id())
        .bind(owner.brand_id())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update a product's fields. Ownership never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product SET name = $2, description = $3, price = $4, image_url = $5, \
             available = $6, category_id = $7 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.available)
        .bind(input.category_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product together with any override rows pointing at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_item_override WHERE kind = $1 AND template_item_id = $2")
            .bind(OverrideKind::Product)
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }
}
