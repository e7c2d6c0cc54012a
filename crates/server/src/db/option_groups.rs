//! Option-group repository for database operations.

use sqlx::PgPool;

use menuforge_core::catalog::OptionGroup;
use menuforge_core::overrides::OverrideKind;
use menuforge_core::types::{BrandId, CategoryId, OptionGroupId, Owner, StoreId};

use super::{OwnerFilter, RepositoryError};

/// Internal row type for `PostgreSQL` option-group queries.
#[derive(Debug, sqlx::FromRow)]
struct OptionGroupRow {
    id: i32,
    name: String,
    description: Option<String>,
    min_selections: i32,
    max_selections: i32,
    display_order: i32,
    store_id: Option<i32>,
    brand_id: Option<i32>,
}

impl TryFrom<OptionGroupRow> for OptionGroup {
    type Error = RepositoryError;

    fn try_from(row: OptionGroupRow) -> Result<Self, Self::Error> {
        let owner = Owner::from_columns(
            row.store_id.map(StoreId::new),
            row.brand_id.map(BrandId::new),
        )
        .map_err(|e| RepositoryError::DataCorruption(format!("option group {}: {e}", row.id)))?;

        Ok(Self {
            id: OptionGroupId::new(row.id),
            name: row.name,
            description: row.description,
            min_selections: row.min_selections,
            max_selections: row.max_selections,
            display_order: row.display_order,
            owner,
        })
    }
}

const GROUP_COLUMNS: &str = "id, name, description, min_selections, max_selections, \
     display_order, store_id, brand_id";

/// Fields of an option-group create or update.
#[derive(Debug, Clone)]
pub struct OptionGroupInput {
    pub name: String,
    pub description: Option<String>,
    pub min_selections: i32,
    pub max_selections: i32,
    pub display_order: i32,
}

/// Repository for option-group database operations.
pub struct OptionGroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OptionGroupRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List option groups visible through the filter, by display order then
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn list(&self, filter: OwnerFilter) -> Result<Vec<OptionGroup>, RepositoryError> {
        let (any, store_id, brand_id) = filter.params();
        let rows = sqlx::query_as::<_, OptionGroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM option_group \
             WHERE ($1 OR store_id = $2 OR brand_id = $3) \
             ORDER BY display_order, name"
        ))
        .bind(any)
        .bind(store_id)
        .bind(brand_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an option group by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn get(&self, id: OptionGroupId) -> Result<Option<OptionGroup>, RepositoryError> {
        let row = sqlx::query_as::<_, OptionGroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM option_group WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// The option groups linked to a category, in link order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn list_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<OptionGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, OptionGroupRow>(&format!(
            "SELECT g.{} FROM option_group g \
             JOIN category_option_group l ON l.option_group_id = g.id \
             WHERE l.category_id = $1 \
             ORDER BY l.display_order_in_category",
            GROUP_COLUMNS.replace(", ", ", g.")
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// How many categories currently link this group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn linked_category_count(
        &self,
        id: OptionGroupId,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM category_option_group WHERE option_group_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Create an option group under the given owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &OptionGroupInput,
        owner: Owner,
    ) -> Result<OptionGroup, RepositoryError> {
        let row = sqlx::query_as::<_, OptionGroupRow>(&format!(
            "INSERT INTO option_group \
             (name, description, min_selections, max_selections, display_order, store_id, brand_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {GROUP_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.min_selections)
        .bind(input.max_selections)
        .bind(input.display_order)
        .bind(owner.store_id())
        .bind(owner.brand_id())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update an option group's fields. Ownership never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn update(
        &self,
        id: OptionGroupId,
        input: &OptionGroupInput,
    ) -> Result<OptionGroup, RepositoryError> {
        let row = sqlx::query_as::<_, OptionGroupRow>(&format!(
            "UPDATE option_group SET name = $2, description = $3, min_selections = $4, \
             max_selections = $5, display_order = $6 \
             WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.min_selections)
        .bind(input.max_selections)
        .bind(input.display_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an option group, its items, and any override rows pointing at
    /// the group or its items.
    ///
    /// The caller checks the category-link count first; this method only
    /// performs the mechanical cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: OptionGroupId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM store_item_override WHERE kind = $1 AND template_item_id IN \
             (SELECT id FROM option_item WHERE option_group_id = $2)",
        )
        .bind(OverrideKind::OptionItem)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM store_item_override WHERE kind = $1 AND template_item_id = $2")
            .bind(OverrideKind::OptionGroup)
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM option_group WHERE id = $1")
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
