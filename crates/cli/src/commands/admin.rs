//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! mf-cli admin create -e admin@example.com -n "Admin Name" -r super_admin
//! mf-cli admin create -e owner@example.com -n "Brand Owner" -r brand_admin --brand-id 1
//! mf-cli admin create -e store@example.com -n "Store Admin" -r store_admin --store-id 5
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use menuforge_core::catalog::AdminUser;
use menuforge_core::types::{AdminUserId, BrandId, Role, StoreId};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, brand_admin, store_admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Role and context arguments do not match.
    #[error("Invalid context: {0}")]
    InvalidContext(&'static str),

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),
}

/// Create a new admin user.
///
/// A `store_admin` requires `--store-id`, a `brand_admin` requires
/// `--brand-id`, and a `super_admin` takes neither.
///
/// # Errors
///
/// Returns `AdminError` on bad arguments, a duplicate email, or a database
/// failure.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    store_id: Option<i32>,
    brand_id: Option<i32>,
) -> Result<AdminUser, AdminError> {
    let role = validate_args(email, role, store_id, brand_id)?;

    let database_url = super::database_url().map_err(AdminError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating admin user: {} ({})", email, role);

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM admin_user WHERE email = $1")
            .bind(email)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(email.to_owned()));
    }

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO admin_user (email, name, role, store_id, brand_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(email)
    .bind(name)
    .bind(role)
    .bind(store_id)
    .bind(brand_id)
    .fetch_one(&pool)
    .await?;

    let user = AdminUser {
        id: AdminUserId::new(user_id),
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        store_id: store_id.map(StoreId::new),
        brand_id: brand_id.map(BrandId::new),
    };

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user)
}

/// Parse and cross-check the arguments before touching the database.
fn validate_args(
    email: &str,
    role: &str,
    store_id: Option<i32>,
    brand_id: Option<i32>,
) -> Result<Role, AdminError> {
    let role: Role = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;

    if !email.contains('@') || !email.contains('.') {
        return Err(AdminError::InvalidEmail(email.to_owned()));
    }

    match role {
        Role::SuperAdmin if store_id.is_some() || brand_id.is_some() => {
            Err(AdminError::InvalidContext(
                "a super_admin takes no store or brand context",
            ))
        }
        Role::BrandAdmin if brand_id.is_none() || store_id.is_some() => {
            Err(AdminError::InvalidContext(
                "a brand_admin requires --brand-id and no --store-id",
            ))
        }
        Role::StoreAdmin if store_id.is_none() || brand_id.is_some() => {
            Err(AdminError::InvalidContext(
                "a store_admin requires --store-id and no --brand-id",
            ))
        }
        _ => Ok(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_context_must_agree() {
        assert!(matches!(
            validate_args("a@b.com", "super_admin", Some(1), None),
            Err(AdminError::InvalidContext(_))
        ));
        assert!(matches!(
            validate_args("a@b.com", "brand_admin", None, None),
            Err(AdminError::InvalidContext(_))
        ));
        assert!(matches!(
            validate_args("a@b.com", "store_admin", None, Some(1)),
            Err(AdminError::InvalidContext(_))
        ));
        assert_eq!(
            validate_args("a@b.com", "store_admin", Some(5), None).unwrap(),
            Role::StoreAdmin
        );
    }

    #[test]
    fn bad_role_and_bad_email_are_rejected() {
        assert!(matches!(
            validate_args("a@b.com", "owner", None, None),
            Err(AdminError::InvalidRole(_))
        ));
        assert!(matches!(
            validate_args("not-an-email", "super_admin", None, None),
            Err(AdminError::InvalidEmail(_))
        ));
    }
}
