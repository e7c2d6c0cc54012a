//! Option-item repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;

use menuforge_core::catalog::OptionItem;
use menuforge_core::overrides::OverrideKind;
use menuforge_core::types::{OptionGroupId, OptionItemId, StoreId};

use super::RepositoryError;

/// Internal row type for `PostgreSQL` option-item queries.
#[derive(Debug, sqlx::FromRow)]
struct OptionItemRow {
    id: i32,
    name: String,
    additional_price: Decimal,
    available: bool,
    display_order: i32,
    option_group_id: i32,
    store_id: Option<i32>,
}

impl From<OptionItemRow> for OptionItem {
    fn from(row: OptionItemRow) -> Self {
        Self {
            id: OptionItemId::new(row.id),
            name: row.name,
            additional_price: row.additional_price,
            available: row.available,
            display_order: row.display_order,
            option_group_id: OptionGroupId::new(row.option_group_id),
            store_id: row.store_id.map(StoreId::new),
        }
    }
}

const ITEM_COLUMNS: &str =
    "id, name, additional_price, available, display_order, option_group_id, store_id";

/// Fields of an option-item create or update.
#[derive(Debug, Clone)]
pub struct OptionItemInput {
    pub name: String,
    pub additional_price: Decimal,
    pub available: bool,
    pub display_order: i32,
}

/// Repository for option-item database operations.
pub struct OptionItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OptionItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the items of one group, by display order then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_group(
        &self,
        group_id: OptionGroupId,
    ) -> Result<Vec<OptionItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OptionItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM option_item WHERE option_group_id = $1 \
             ORDER BY display_order, name"
        ))
        .bind(group_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List the items of several groups at once, for menu assembly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_groups(
        &self,
        group_ids: &[OptionGroupId],
    ) -> Result<Vec<OptionItem>, RepositoryError> {
        let raw_ids: Vec<i32> = group_ids.iter().map(|id| id.as_i32()).collect();
        let rows = sqlx::query_as::<_, OptionItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM option_item WHERE option_group_id = ANY($1) \
             ORDER BY display_order, name"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an option item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OptionItemId) -> Result<Option<OptionItem>, RepositoryError> {
        let row = sqlx::query_as::<_, OptionItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM option_item WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create an item inside a group.
    ///
    /// `store_id` mirrors the parent group's owner: set for a store-owned
    /// group, null for a template.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        group_id: OptionGroupId,
        store_id: Option<StoreId>,
        input: &OptionItemInput,
    ) -> Result<OptionItem, RepositoryError> {
        let row = sqlx::query_as::<_, OptionItemRow>(&format!(
            "INSERT INTO option_item \
             (name, additional_price, available, display_order, option_group_id, store_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.additional_price)
        .bind(input.available)
        .bind(input.display_order)
        .bind(group_id)
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update an item's fields. The parent group never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn update(
        &self,
        id: OptionItemId,
        input: &OptionItemInput,
    ) -> Result<OptionItem, RepositoryError> {
        let row = sqlx::query_as::<_, OptionItemRow>(&format!(
            "UPDATE option_item SET name = $2, additional_price = $3, available = $4, \
             display_order = $5 WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.additional_price)
        .bind(input.available)
        .bind(input.display_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an item together with any override rows pointing at it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: OptionItemId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_item_override WHERE kind = $1 AND template_item_id = $2")
            .bind(OverrideKind::OptionItem)
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM option_item WHERE id = $1")
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
