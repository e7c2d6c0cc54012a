//! Access-scope resolution.
//!
//! Every request carries a verified `(role, store_id?, brand_id?)` triple
//! supplied by the identity service. This module turns that triple into an
//! [`AccessScope`], the single place where tenant visibility rules live.
//! Repositories and services filter and authorize through the scope's
//! predicates; no call site re-derives the rules from the role.
//!
//! Read-scope violations are reported by the caller as "not found" so that
//! the existence of other tenants' data is not leaked; write-scope
//! violations are explicit, since the caller's own identity is already
//! known.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BrandId, Owner, Role, StoreId};

/// The verified identity triple attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    pub store_id: Option<StoreId>,
    pub brand_id: Option<BrandId>,
}

/// Failure to turn an identity into a scope, or to pick a write target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// A `StoreAdmin` identity arrived without a store id claim.
    #[error("store admin identity is missing its store id")]
    MissingStoreId,
    /// A `BrandAdmin` identity arrived without a brand id claim.
    #[error("brand admin identity is missing its brand id")]
    MissingBrandId,
    /// A super admin write with no explicit target context: catalog items
    /// are never created ownerless.
    #[error("write requires an explicit store or brand target")]
    MissingWriteTarget,
    /// The requested write target lies outside the caller's tenancy.
    #[error("write target is outside the caller's scope")]
    ForeignWriteTarget,
}

/// What a caller may see and touch, resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Super admin: reads everything, writes with an explicit target.
    Unrestricted,
    /// Brand admin: this brand's templates only.
    Brand(BrandId),
    /// Store admin: the store's own items, plus read-only access to the
    /// templates of the store's brand when the store is a franchise.
    Store {
        store_id: StoreId,
        /// The store's brand, loaded from the store row by the caller.
        /// `None` for independent stores.
        brand_id: Option<BrandId>,
    },
}

/// Resolve an identity triple into an access scope.
///
/// `franchise_brand` is the brand of the store named by a `StoreAdmin`
/// identity (the caller looks the store row up); it is ignored for the
/// other roles.
///
/// # Errors
///
/// Returns [`ScopeError::MissingStoreId`] or [`ScopeError::MissingBrandId`]
/// when the role's required claim is absent.
pub fn resolve_context(
    identity: Identity,
    franchise_brand: Option<BrandId>,
) -> Result<AccessScope, ScopeError> {
    match identity.role {
        Role::SuperAdmin => Ok(AccessScope::Unrestricted),
        Role::BrandAdmin => identity
            .brand_id
            .map(AccessScope::Brand)
            .ok_or(ScopeError::MissingBrandId),
        Role::StoreAdmin => {
            let store_id = identity.store_id.ok_or(ScopeError::MissingStoreId)?;
            Ok(AccessScope::Store {
                store_id,
                brand_id: franchise_brand,
            })
        }
    }
}

impl AccessScope {
    /// Whether an entity with this owner is visible to the caller.
    #[must_use]
    pub fn can_read(&self, owner: Owner) -> bool {
        match *self {
            Self::Unrestricted => true,
            Self::Brand(brand) => owner == Owner::BrandTemplate(brand),
            Self::Store { store_id, brand_id } => match owner {
                Owner::StoreOwned(store) => store == store_id,
                Owner::BrandTemplate(brand) => brand_id == Some(brand),
            },
        }
    }

    /// Whether an entity with this owner is writable by the caller.
    ///
    /// Templates are read-only for store admins: customization goes through
    /// the override layer instead.
    #[must_use]
    pub fn can_write(&self, owner: Owner) -> bool {
        match *self {
            Self::Unrestricted => true,
            Self::Brand(brand) => owner == Owner::BrandTemplate(brand),
            Self::Store { store_id, .. } => owner == Owner::StoreOwned(store_id),
        }
    }

    /// Pick the owner for a newly created catalog item.
    ///
    /// Tenant admins always create into their own context; a mismatching
    /// explicit target is rejected rather than silently corrected. Super
    /// admins must name a target.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::MissingWriteTarget`] for a targetless super
    /// admin write and [`ScopeError::ForeignWriteTarget`] when the request
    /// names a context the caller does not own.
    pub fn write_owner(&self, requested: Option<Owner>) -> Result<Owner, ScopeError> {
        match *self {
            Self::Unrestricted => requested.ok_or(ScopeError::MissingWriteTarget),
            Self::Brand(brand) => {
                let own = Owner::BrandTemplate(brand);
                match requested {
                    None => Ok(own),
                    Some(target) if target == own => Ok(own),
                    Some(_) => Err(ScopeError::ForeignWriteTarget),
                }
            }
            Self::Store { store_id, .. } => {
                let own = Owner::StoreOwned(store_id);
                match requested {
                    None => Ok(own),
                    Some(target) if target == own => Ok(own),
                    Some(_) => Err(ScopeError::ForeignWriteTarget),
                }
            }
        }
    }

    /// The brand whose templates are readable in this scope, if any.
    #[must_use]
    pub const fn template_brand(&self) -> Option<BrandId> {
        match *self {
            Self::Brand(brand) => Some(brand),
            Self::Store {
                brand_id: Some(brand),
                ..
            } => Some(brand),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE_A: StoreId = StoreId::new(5);
    const STORE_B: StoreId = StoreId::new(6);
    const BRAND: BrandId = BrandId::new(1);
    const OTHER_BRAND: BrandId = BrandId::new(2);

    fn store_admin(store_id: Option<StoreId>) -> Identity {
        Identity {
            role: Role::StoreAdmin,
            store_id,
            brand_id: None,
        }
    }

    #[test]
    fn missing_claims_are_invalid_context() {
        assert_eq!(
            resolve_context(store_admin(None), None),
            Err(ScopeError::MissingStoreId)
        );
        let brand_admin = Identity {
            role: Role::BrandAdmin,
            store_id: None,
            brand_id: None,
        };
        assert_eq!(
            resolve_context(brand_admin, None),
            Err(ScopeError::MissingBrandId)
        );
    }

    #[test]
    fn store_admin_reads_own_items_and_brand_templates() {
        let scope = resolve_context(store_admin(Some(STORE_A)), Some(BRAND)).unwrap();

        assert!(scope.can_read(Owner::StoreOwned(STORE_A)));
        assert!(!scope.can_read(Owner::StoreOwned(STORE_B)));
        assert!(scope.can_read(Owner::BrandTemplate(BRAND)));
        assert!(!scope.can_read(Owner::BrandTemplate(OTHER_BRAND)));
    }

    #[test]
    fn store_admin_never_writes_templates() {
        let scope = resolve_context(store_admin(Some(STORE_A)), Some(BRAND)).unwrap();

        assert!(scope.can_write(Owner::StoreOwned(STORE_A)));
        assert!(!scope.can_write(Owner::BrandTemplate(BRAND)));
        assert!(!scope.can_write(Owner::StoreOwned(STORE_B)));
    }

    #[test]
    fn independent_store_admin_sees_no_templates() {
        let scope = resolve_context(store_admin(Some(STORE_A)), None).unwrap();
        assert!(!scope.can_read(Owner::BrandTemplate(BRAND)));
        assert_eq!(scope.template_brand(), None);
    }

    #[test]
    fn brand_admin_is_confined_to_own_templates() {
        let identity = Identity {
            role: Role::BrandAdmin,
            store_id: None,
            brand_id: Some(BRAND),
        };
        let scope = resolve_context(identity, None).unwrap();

        assert!(scope.can_read(Owner::BrandTemplate(BRAND)));
        assert!(scope.can_write(Owner::BrandTemplate(BRAND)));
        assert!(!scope.can_read(Owner::BrandTemplate(OTHER_BRAND)));
        assert!(!scope.can_read(Owner::StoreOwned(STORE_A)));
        assert!(!scope.can_write(Owner::StoreOwned(STORE_A)));
    }

    #[test]
    fn super_admin_write_requires_target() {
        let scope = AccessScope::Unrestricted;
        assert_eq!(
            scope.write_owner(None),
            Err(ScopeError::MissingWriteTarget)
        );
        assert_eq!(
            scope.write_owner(Some(Owner::BrandTemplate(BRAND))),
            Ok(Owner::BrandTemplate(BRAND))
        );
    }

    #[test]
    fn tenant_admin_defaults_to_own_context() {
        let scope = AccessScope::Brand(BRAND);
        assert_eq!(
            scope.write_owner(None),
            Ok(Owner::BrandTemplate(BRAND))
        );
        assert_eq!(
            scope.write_owner(Some(Owner::BrandTemplate(OTHER_BRAND))),
            Err(ScopeError::ForeignWriteTarget)
        );

        let scope = AccessScope::Store {
            store_id: STORE_A,
            brand_id: Some(BRAND),
        };
        assert_eq!(scope.write_owner(None), Ok(Owner::StoreOwned(STORE_A)));
        assert_eq!(
            scope.write_owner(Some(Owner::StoreOwned(STORE_B))),
            Err(ScopeError::ForeignWriteTarget)
        );
    }
}
