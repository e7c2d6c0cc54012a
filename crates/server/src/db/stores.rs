//! Store repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use menuforge_core::catalog::{PromoBanner, Store, StoreAddress};
use menuforge_core::types::{BrandId, StoreId};

use super::RepositoryError;

/// Internal row type for `PostgreSQL` store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    logo_url: Option<String>,
    cover_url: Option<String>,
    whatsapp_phone: Option<String>,
    landline_phone: Option<String>,
    brand_id: Option<i32>,
    street: Option<String>,
    number: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    complement: Option<String>,
    maps_link: Option<String>,
    business_hours: Option<String>,
    min_order_value: Decimal,
    estimated_delivery_time: Option<String>,
    banner_enabled: bool,
    banner_image_url: Option<String>,
    banner_text: Option<String>,
    banner_link_url: Option<String>,
    allow_order_notes: bool,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: StoreId::new(row.id),
            name: row.name,
            logo_url: row.logo_url,
            cover_url: row.cover_url,
            whatsapp_phone: row.whatsapp_phone,
            landline_phone: row.landline_phone,
            brand_id: row.brand_id.map(BrandId::new),
            address: StoreAddress {
                street: row.street,
                number: row.number,
                district: row.district,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                complement: row.complement,
                maps_link: row.maps_link,
            },
            business_hours: row.business_hours,
            min_order_value: row.min_order_value,
            estimated_delivery_time: row.estimated_delivery_time,
            promo_banner: PromoBanner {
                enabled: row.banner_enabled,
                image_url: row.banner_image_url,
                text: row.banner_text,
                link_url: row.banner_link_url,
            },
            allow_order_notes: row.allow_order_notes,
        }
    }
}

const STORE_COLUMNS: &str = "id, name, logo_url, cover_url, whatsapp_phone, landline_phone, \
     brand_id, street, number, district, city, state, postal_code, complement, maps_link, \
     business_hours, min_order_value, estimated_delivery_time, banner_enabled, \
     banner_image_url, banner_text, banner_link_url, allow_order_notes";

/// Fields of a store create or update, everything but the id.
#[derive(Debug, Clone)]
pub struct StoreInput {
    pub name: String,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub landline_phone: Option<String>,
    pub brand_id: Option<BrandId>,
    pub address: StoreAddress,
    pub business_hours: Option<String>,
    pub min_order_value: Decimal,
    pub estimated_delivery_time: Option<String>,
    pub promo_banner: PromoBanner,
    pub allow_order_notes: bool,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all stores, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a store by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// The brand a store belongs to, or `None` for an independent store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the store does not exist.
    pub async fn brand_of(&self, id: StoreId) -> Result<Option<BrandId>, RepositoryError> {
        let brand_id: Option<Option<i32>> =
            sqlx::query_scalar("SELECT brand_id FROM store WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        brand_id
            .map(|inner| inner.map(BrandId::new))
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (a dangling
    /// `brand_id` surfaces as a foreign-key error).
    pub async fn create(&self, input: &StoreInput) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO store (name, logo_url, cover_url, whatsapp_phone, landline_phone, \
             brand_id, street, number, district, city, state, postal_code, complement, \
             maps_link, business_hours, min_order_value, estimated_delivery_time, \
             banner_enabled, banner_image_url, banner_text, banner_link_url, allow_order_notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22) \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.logo_url)
        .bind(&input.cover_url)
        .bind(&input.whatsapp_phone)
        .bind(&input.landline_phone)
        .bind(input.brand_id)
        .bind(&input.address.street)
        .bind(&input.address.number)
        .bind(&input.address.district)
        .bind(&input.address.city)
        .bind(&input.address.state)
        .bind(&input.address.postal_code)
        .bind(&input.address.complement)
        .bind(&input.address.maps_link)
        .bind(&input.business_hours)
        .bind(input.min_order_value)
        .bind(&input.estimated_delivery_time)
        .bind(input.promo_banner.enabled)
        .bind(&input.promo_banner.image_url)
        .bind(&input.promo_banner.text)
        .bind(&input.promo_banner.link_url)
        .bind(input.allow_order_notes)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn update(&self, id: StoreId, input: &StoreInput) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "UPDATE store SET name = $2, logo_url = $3, cover_url = $4, whatsapp_phone = $5, \
             landline_phone = $6, brand_id = $7, street = $8, number = $9, district = $10, \
             city = $11, state = $12, postal_code = $13, complement = $14, maps_link = $15, \
             business_hours = $16, min_order_value = $17, estimated_delivery_time = $18, \
             banner_enabled = $19, banner_image_url = $20, banner_text = $21, \
             banner_link_url = $22, allow_order_notes = $23 \
             WHERE id = $1 RETURNING {STORE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.logo_url)
        .bind(&input.cover_url)
        .bind(&input.whatsapp_phone)
        .bind(&input.landline_phone)
        .bind(input.brand_id)
        .bind(&input.address.street)
        .bind(&input.address.number)
        .bind(&input.address.district)
        .bind(&input.address.city)
        .bind(&input.address.state)
        .bind(&input.address.postal_code)
        .bind(&input.address.complement)
        .bind(&input.address.maps_link)
        .bind(&input.business_hours)
        .bind(input.min_order_value)
        .bind(&input.estimated_delivery_time)
        .bind(input.promo_banner.enabled)
        .bind(&input.promo_banner.image_url)
        .bind(&input.promo_banner.text)
        .bind(&input.promo_banner.link_url)
        .bind(input.allow_order_notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a store. Store-owned catalog rows and overrides cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
