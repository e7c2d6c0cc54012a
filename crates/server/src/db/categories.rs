//! Category repository, including the category/option-group link table.
//!
//! Write operations take a `PgExecutor` so the link-reconciliation service
//! can run them inside one transaction together with the link writes.

use sqlx::{PgExecutor, PgPool};

use menuforge_core::catalog::Category;
use menuforge_core::overrides::OverrideKind;
use menuforge_core::types::{BrandId, CategoryId, OptionGroupId, Owner, StoreId};

use super::{OwnerFilter, RepositoryError};

/// Internal row type for `PostgreSQL` category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    display_order: i32,
    store_id: Option<i32>,
    brand_id: Option<i32>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let owner = Owner::from_columns(
            row.store_id.map(StoreId::new),
            row.brand_id.map(BrandId::new),
        )
        .map_err(|e| RepositoryError::DataCorruption(format!("category {}: {e}", row.id)))?;

        Ok(Self {
            id: CategoryId::new(row.id),
            name: row.name,
            display_order: row.display_order,
            owner,
        })
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories visible through the filter, by display order then
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn list(&self, filter: OwnerFilter) -> Result<Vec<Category>, RepositoryError> {
        let (any, store_id, brand_id) = filter.params();
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, display_order, store_id, brand_id FROM category \
             WHERE ($1 OR store_id = $2 OR brand_id = $3) \
             ORDER BY display_order, name",
        )
        .bind(any)
        .bind(store_id)
        .bind(brand_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` on an invalid ownership pair.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, display_order, store_id, brand_id FROM category WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete a category together with any override rows pointing at it.
    ///
    /// Products keep existing with their category link nulled; the link
    /// table cascades.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store_item_override WHERE kind = $1 AND template_item_id = $2")
            .bind(OverrideKind::Category)
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        name: &str,
        display_order: i32,
        owner: Owner,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO category (name, display_order, store_id, brand_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, display_order, store_id, brand_id",
        )
        .bind(name)
        .bind(display_order)
        .bind(owner.store_id())
        .bind(owner.brand_id())
        .fetch_one(executor)
        .await?;

        row.try_into()
    }

    /// Update a category's fields. Ownership never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: CategoryId,
        name: &str,
        display_order: i32,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE category SET name = $2, display_order = $3 WHERE id = $1 \
             RETURNING id, name, display_order, store_id, brand_id",
        )
        .bind(id)
        .bind(name)
        .bind(display_order)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// The option groups currently linked to a category, in link order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn linked_group_ids(
        executor: impl PgExecutor<'_>,
        category_id: CategoryId,
    ) -> Result<Vec<OptionGroupId>, RepositoryError> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT option_group_id FROM category_option_group \
             WHERE category_id = $1 ORDER BY display_order_in_category",
        )
        .bind(category_id)
        .fetch_all(executor)
        .await?;

        Ok(ids.into_iter().map(OptionGroupId::new).collect())
    }

    /// Link an option group to a category at the given position, or move an
    /// existing link there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn upsert_link(
        executor: impl PgExecutor<'_>,
        category_id: CategoryId,
        option_group_id: OptionGroupId,
        display_order_in_category: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO category_option_group \
             (category_id, option_group_id, display_order_in_category) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (category_id, option_group_id) \
             DO UPDATE SET display_order_in_category = EXCLUDED.display_order_in_category",
        )
        .bind(category_id)
        .bind(option_group_id)
        .bind(display_order_in_category)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Remove the link between a category and an option group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_link(
        executor: impl PgExecutor<'_>,
        category_id: CategoryId,
        option_group_id: OptionGroupId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "DELETE FROM category_option_group \
             WHERE category_id = $1 AND option_group_id = $2",
        )
        .bind(category_id)
        .bind(option_group_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
