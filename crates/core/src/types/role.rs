//! Admin roles as a closed enumeration.
//!
//! The three operator tiers. Every authorization decision funnels through
//! [`crate::scope::AccessScope`] instead of comparing role strings at call
//! sites.

use serde::{Deserialize, Serialize};

/// Admin role with different tenancy levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System-wide access to every brand and store.
    SuperAdmin,
    /// Manages one brand's template catalog.
    BrandAdmin,
    /// Manages one store's own catalog and its template overrides.
    StoreAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::BrandAdmin => write!(f, "brand_admin"),
            Self::StoreAdmin => write!(f, "store_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "brand_admin" => Ok(Self::BrandAdmin),
            "store_admin" => Ok(Self::StoreAdmin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_and_parse_round_trip() {
        for role in [Role::SuperAdmin, Role::BrandAdmin, Role::StoreAdmin] {
            assert_eq!(Role::from_str(&role.to_string()), Ok(role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("AdminLoja").is_err());
        assert!(Role::from_str("").is_err());
    }
}
