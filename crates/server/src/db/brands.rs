//! Brand repository for database operations.

use sqlx::PgPool;

use menuforge_core::catalog::Brand;
use menuforge_core::types::BrandId;

use super::{RepositoryError, is_unique_violation};

/// Internal row type for `PostgreSQL` brand queries.
#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: i32,
    name: String,
    logo_url: Option<String>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::new(row.id),
            name: row.name,
            logo_url: row.logo_url,
        }
    }
}

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all brands, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, BrandRow>(
            "SELECT id, name, logo_url FROM brand ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a brand by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "SELECT id, name, logo_url FROM brand WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the name is already taken.
    pub async fn create(
        &self,
        name: &str,
        logo_url: Option<&str>,
    ) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "INSERT INTO brand (name, logo_url) VALUES ($1, $2) RETURNING id, name, logo_url",
        )
        .bind(name)
        .bind(logo_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("brand name already in use: {name}"))
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    /// Update a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist and
    /// `RepositoryError::Conflict` when the new name is taken.
    pub async fn update(
        &self,
        id: BrandId,
        name: &str,
        logo_url: Option<&str>,
    ) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "UPDATE brand SET name = $2, logo_url = $3 WHERE id = $1 \
             RETURNING id, name, logo_url",
        )
        .bind(id)
        .bind(name)
        .bind(logo_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict(format!("brand name already in use: {name}"))
            } else {
                RepositoryError::from(e)
            }
        })?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a brand.
    ///
    /// Templates cascade; stores keep existing but lose their brand link
    /// (`ON DELETE SET NULL`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id does not exist.
    pub async fn delete(&self, id: BrandId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM brand WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
