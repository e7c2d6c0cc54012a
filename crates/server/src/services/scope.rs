//! Per-request access-scope resolution.

use sqlx::PgPool;

use menuforge_core::scope::{AccessScope, Identity, resolve_context};
use menuforge_core::types::Role;

use crate::db::{RepositoryError, StoreRepository};
use crate::error::AppError;

/// Turn the verified identity triple into an [`AccessScope`].
///
/// For a store admin this loads the store row once to learn whether the
/// store is a franchise, which decides template visibility for the rest of
/// the request.
///
/// # Errors
///
/// Returns [`AppError::InvalidContext`] when the role's required claim is
/// missing or the identity references a store that no longer exists.
pub async fn resolve_scope(pool: &PgPool, identity: Identity) -> Result<AccessScope, AppError> {
    let franchise_brand = match (identity.role, identity.store_id) {
        (Role::StoreAdmin, Some(store_id)) => StoreRepository::new(pool)
            .brand_of(store_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => {
                    AppError::InvalidContext(format!("identity references unknown store {store_id}"))
                }
                other => AppError::Database(other),
            })?,
        _ => None,
    };

    Ok(resolve_context(identity, franchise_brand)?)
}
