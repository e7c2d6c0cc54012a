//! Database operations for the catalog `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `brand` - franchise brands
//! - `store` - stores, independent or franchise (`brand_id` set)
//! - `category` / `product` / `option_group` - catalog entities, each either
//!   store-owned (`store_id` set) or a brand template (`brand_id` set)
//! - `option_item` - items of an option group (store link derived from the
//!   parent group)
//! - `category_option_group` - which groups are offered for a category
//! - `store_item_override` - per-store customization of template items
//! - `admin_user` - operator accounts consumed by the identity service
//!
//! Every query that touches tenant data filters by the caller's resolved
//! [`OwnerFilter`]; the tables themselves are shared across all tenants.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p menuforge-cli -- migrate
//! ```

pub mod brands;
pub mod categories;
pub mod option_groups;
pub mod option_items;
pub mod overrides;
pub mod products;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use menuforge_core::scope::AccessScope;
use menuforge_core::types::{BrandId, StoreId};

pub use brands::BrandRepository;
pub use categories::CategoryRepository;
pub use option_groups::OptionGroupRepository;
pub use option_items::OptionItemRepository;
pub use overrides::OverrideRepository;
pub use products::ProductRepository;
pub use stores::StoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique brand name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Whether an sqlx error is a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Ownership filter applied to every tenant-data query.
///
/// Derived once per request from the caller's [`AccessScope`] and bound as
/// three SQL parameters, so each repository needs a single query per
/// operation regardless of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerFilter {
    /// No restriction (super admin).
    Any,
    /// Store-owned rows of one store.
    Store(StoreId),
    /// Template rows of one brand.
    Brand(BrandId),
    /// Store-owned rows of one store plus templates of its brand.
    StoreOrBrand(StoreId, BrandId),
}

impl OwnerFilter {
    /// Bind parameters: `(unrestricted, store_id, brand_id)` for a
    /// `($1 OR store_id = $2 OR brand_id = $3)` predicate.
    #[must_use]
    pub const fn params(self) -> (bool, Option<StoreId>, Option<BrandId>) {
        match self {
            Self::Any => (true, None, None),
            Self::Store(store_id) => (false, Some(store_id), None),
            Self::Brand(brand_id) => (false, None, Some(brand_id)),
            Self::StoreOrBrand(store_id, brand_id) => (false, Some(store_id), Some(brand_id)),
        }
    }
}

impl From<&AccessScope> for OwnerFilter {
    fn from(scope: &AccessScope) -> Self {
        match *scope {
            AccessScope::Unrestricted => Self::Any,
            AccessScope::Brand(brand_id) => Self::Brand(brand_id),
            AccessScope::Store {
                store_id,
                brand_id: Some(brand_id),
            } => Self::StoreOrBrand(store_id, brand_id),
            AccessScope::Store {
                store_id,
                brand_id: None,
            } => Self::Store(store_id),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_filter_follows_the_scope() {
        let store = StoreId::new(5);
        let brand = BrandId::new(1);

        assert_eq!(
            OwnerFilter::from(&AccessScope::Unrestricted),
            OwnerFilter::Any
        );
        assert_eq!(
            OwnerFilter::from(&AccessScope::Brand(brand)),
            OwnerFilter::Brand(brand)
        );
        assert_eq!(
            OwnerFilter::from(&AccessScope::Store {
                store_id: store,
                brand_id: Some(brand),
            }),
            OwnerFilter::StoreOrBrand(store, brand)
        );
        assert_eq!(
            OwnerFilter::from(&AccessScope::Store {
                store_id: store,
                brand_id: None,
            }),
            OwnerFilter::Store(store)
        );
    }

    #[test]
    fn params_bind_the_expected_columns() {
        assert_eq!(OwnerFilter::Any.params(), (true, None, None));
        assert_eq!(
            OwnerFilter::StoreOrBrand(StoreId::new(5), BrandId::new(1)).params(),
            (false, Some(StoreId::new(5)), Some(BrandId::new(1)))
        );
    }
}
