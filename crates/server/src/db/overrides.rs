//! Store-override repository for database operations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;

use menuforge_core::overrides::{OverrideKey, OverrideKind, StoreOverride};
use menuforge_core::types::{OverrideId, StoreId};

use super::{RepositoryError, is_unique_violation};

/// Internal row type for `PostgreSQL` override queries.
#[derive(Debug, sqlx::FromRow)]
struct OverrideRow {
    id: i32,
    store_id: i32,
    kind: OverrideKind,
    template_item_id: i32,
    local_price: Option<Decimal>,
    local_available: Option<bool>,
    active_in_store: bool,
    local_name: Option<String>,
    local_display_order: Option<i32>,
}

impl From<OverrideRow> for StoreOverride {
    fn from(row: OverrideRow) -> Self {
        Self {
            id: OverrideId::new(row.id),
            store_id: StoreId::new(row.store_id),
            kind: row.kind,
            template_item_id: row.template_item_id,
            local_price: row.local_price,
            local_available: row.local_available,
            active_in_store: row.active_in_store,
            local_name: row.local_name,
            local_display_order: row.local_display_order,
        }
    }
}

const OVERRIDE_COLUMNS: &str = "id, store_id, kind, template_item_id, local_price, \
     local_available, active_in_store, local_name, local_display_order";

/// The customization fields of an override, everything but the key.
#[derive(Debug, Clone)]
pub struct OverrideInput {
    pub local_price: Option<Decimal>,
    pub local_available: Option<bool>,
    pub active_in_store: bool,
    pub local_name: Option<String>,
    pub local_display_order: Option<i32>,
}

/// Repository for store-override database operations.
pub struct OverrideRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OverrideRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an override by its natural key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: OverrideKey) -> Result<Option<StoreOverride>, RepositoryError> {
        let row = sqlx::query_as::<_, OverrideRow>(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM store_item_override \
             WHERE store_id = $1 AND kind = $2 AND template_item_id = $3"
        ))
        .bind(key.store_id)
        .bind(key.kind)
        .bind(key.template_item_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a store's overrides, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store_id: StoreId,
        kind: Option<OverrideKind>,
    ) -> Result<Vec<StoreOverride>, RepositoryError> {
        let rows = sqlx::query_as::<_, OverrideRow>(&format!(
            "SELECT {OVERRIDE_COLUMNS} FROM store_item_override \
             WHERE store_id = $1 AND ($2::override_kind IS NULL OR kind = $2) \
             ORDER BY kind, template_item_id"
        ))
        .bind(store_id)
        .bind(kind)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A store's overrides of one kind, keyed by template item id.
    ///
    /// Used by the merge passes, which look overrides up per template row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn map_for_store(
        &self,
        store_id: StoreId,
        kind: OverrideKind,
    ) -> Result<HashMap<i32, StoreOverride>, RepositoryError> {
        let overrides = self.list(store_id, Some(kind)).await?;
        Ok(overrides
            .into_iter()
            .map(|ov| (ov.template_item_id, ov))
            .collect())
    }

    /// Insert or update the override for one `(store, kind, template item)`
    /// key. Idempotent; two concurrent first-time upserts race on the unique
    /// key and the loser retries as an update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if both attempts fail.
    pub async fn upsert(
        &self,
        key: OverrideKey,
        input: &OverrideInput,
    ) -> Result<StoreOverride, RepositoryError> {
        let inserted = sqlx::query_as::<_, OverrideRow>(&format!(
            "INSERT INTO store_item_override \
             (store_id, kind, template_item_id, local_price, local_available, \
             active_in_store, local_name, local_display_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {OVERRIDE_COLUMNS}"
        ))
        .bind(key.store_id)
        .bind(key.kind)
        .bind(key.template_item_id)
        .bind(input.local_price)
        .bind(input.local_available)
        .bind(input.active_in_store)
        .bind(&input.local_name)
        .bind(input.local_display_order)
        .fetch_one(self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.into()),
            Err(e) if is_unique_violation(&e) => self.update(key, input).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an override by its natural key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when no such override exists.
    pub async fn delete(&self, key: OverrideKey) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM store_item_override \
             WHERE store_id = $1 AND kind = $2 AND template_item_id = $3",
        )
        .bind(key.store_id)
        .bind(key.kind)
        .bind(key.template_item_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// How many stores still actively carry a template item.
    ///
    /// Template deletion is blocked while this is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_count_for_template(
        &self,
        kind: OverrideKind,
        template_item_id: i32,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM store_item_override \
             WHERE kind = $1 AND template_item_id = $2 AND active_in_store",
        )
        .bind(kind)
        .bind(template_item_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    async fn update(
        &self,
        key: OverrideKey,
        input: &OverrideInput,
    ) -> Result<StoreOverride, RepositoryError> {
        let row = sqlx::query_as::<_, OverrideRow>(&format!(
            "UPDATE store_item_override SET local_price = $4, local_available = $5, \
             active_in_store = $6, local_name = $7, local_display_order = $8 \
             WHERE store_id = $1 AND kind = $2 AND template_item_id = $3 \
             RETURNING {OVERRIDE_COLUMNS}"
        ))
        .bind(key.store_id)
        .bind(key.kind)
        .bind(key.template_item_id)
        .bind(input.local_price)
        .bind(input.local_available)
        .bind(input.active_in_store)
        .bind(&input.local_name)
        .bind(input.local_display_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
