//! Role-based visibility and write targeting across a shared catalog.
//!
//! Walks one catalog through the three admin roles, checking what each
//! scope can see, what it can write, and where new items land.

use serde_json::json;

use menuforge_core::catalog::AdminUser;
use menuforge_core::scope::{Identity, ScopeError, resolve_context};
use menuforge_core::types::{AdminUserId, BrandId, Owner, Role, StoreId};

use menuforge_integration_tests::{BRAND, FRANCHISE, INDEPENDENT};

const OTHER_BRAND: BrandId = BrandId::new(2);
const OTHER_STORE: StoreId = StoreId::new(30);

fn identity(role: Role, store_id: Option<StoreId>, brand_id: Option<BrandId>) -> Identity {
    Identity {
        role,
        store_id,
        brand_id,
    }
}

/// The owners present in the fixture catalog.
fn owners() -> [Owner; 4] {
    [
        Owner::StoreOwned(FRANCHISE),
        Owner::StoreOwned(INDEPENDENT),
        Owner::BrandTemplate(BRAND),
        Owner::BrandTemplate(OTHER_BRAND),
    ]
}

#[test]
fn super_admin_sees_everything_but_must_name_a_write_target() {
    let scope =
        resolve_context(identity(Role::SuperAdmin, None, None), None).unwrap();

    for owner in owners() {
        assert!(scope.can_read(owner));
        assert!(scope.can_write(owner));
    }

    assert_eq!(scope.write_owner(None), Err(ScopeError::MissingWriteTarget));
    assert_eq!(
        scope.write_owner(Some(Owner::StoreOwned(OTHER_STORE))),
        Ok(Owner::StoreOwned(OTHER_STORE))
    );
}

#[test]
fn brand_admin_lives_inside_one_template_catalog() {
    let scope =
        resolve_context(identity(Role::BrandAdmin, None, Some(BRAND)), None).unwrap();

    let visible: Vec<Owner> = owners()
        .into_iter()
        .filter(|&owner| scope.can_read(owner))
        .collect();
    assert_eq!(visible, [Owner::BrandTemplate(BRAND)]);

    assert!(scope.can_write(Owner::BrandTemplate(BRAND)));
    assert!(!scope.can_write(Owner::StoreOwned(FRANCHISE)));

    // Creates default into the brand's template catalog.
    assert_eq!(scope.write_owner(None), Ok(Owner::BrandTemplate(BRAND)));
    assert_eq!(
        scope.write_owner(Some(Owner::BrandTemplate(OTHER_BRAND))),
        Err(ScopeError::ForeignWriteTarget)
    );
}

#[test]
fn franchise_store_admin_reads_templates_but_writes_only_own_rows() {
    // The store's brand comes from the store row, not from the identity.
    let scope = resolve_context(
        identity(Role::StoreAdmin, Some(FRANCHISE), None),
        Some(BRAND),
    )
    .unwrap();

    assert!(scope.can_read(Owner::StoreOwned(FRANCHISE)));
    assert!(scope.can_read(Owner::BrandTemplate(BRAND)));
    assert!(!scope.can_read(Owner::StoreOwned(INDEPENDENT)));
    assert!(!scope.can_read(Owner::BrandTemplate(OTHER_BRAND)));

    // Templates are customized through overrides, never written directly.
    assert!(scope.can_write(Owner::StoreOwned(FRANCHISE)));
    assert!(!scope.can_write(Owner::BrandTemplate(BRAND)));

    assert_eq!(scope.write_owner(None), Ok(Owner::StoreOwned(FRANCHISE)));
    assert_eq!(scope.template_brand(), Some(BRAND));
}

#[test]
fn independent_store_admin_has_no_template_layer() {
    let scope =
        resolve_context(identity(Role::StoreAdmin, Some(INDEPENDENT), None), None).unwrap();

    assert!(scope.can_read(Owner::StoreOwned(INDEPENDENT)));
    assert!(!scope.can_read(Owner::BrandTemplate(BRAND)));
    assert_eq!(scope.template_brand(), None);
}

#[test]
fn identity_missing_its_claim_is_rejected() {
    assert_eq!(
        resolve_context(identity(Role::StoreAdmin, None, None), None),
        Err(ScopeError::MissingStoreId)
    );
    assert_eq!(
        resolve_context(identity(Role::BrandAdmin, None, None), None),
        Err(ScopeError::MissingBrandId)
    );
}

#[test]
fn admin_account_serializes_with_role_and_context() {
    let account = AdminUser {
        id: AdminUserId::new(7),
        name: "Store Admin".into(),
        email: "store@example.com".into(),
        role: Role::StoreAdmin,
        store_id: Some(FRANCHISE),
        brand_id: None,
    };

    assert_eq!(
        serde_json::to_value(&account).unwrap(),
        json!({
            "id": 7,
            "name": "Store Admin",
            "email": "store@example.com",
            "role": "store_admin",
            "store_id": 10,
            "brand_id": null,
        })
    );
}

#[test]
fn owner_serializes_as_a_tagged_pair() {
    assert_eq!(
        serde_json::to_value(Owner::StoreOwned(FRANCHISE)).unwrap(),
        json!({"kind": "store_owned", "id": 10})
    );
    assert_eq!(
        serde_json::to_value(Owner::BrandTemplate(BRAND)).unwrap(),
        json!({"kind": "brand_template", "id": 1})
    );
}
