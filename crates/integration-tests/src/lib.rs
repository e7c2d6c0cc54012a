//! Integration tests for Menuforge.
//!
//! The tests here drive the core crate end-to-end over in-memory fixtures:
//! a brand template catalog, stores with override layers, and the resolution
//! and reconciliation pipelines composed the way the server composes them.
//! No database or server is required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p menuforge-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `public_menu` - Template/override resolution as the public menu sees it
//! - `link_reconciliation` - Category/option-group link planning
//! - `admin_scopes` - Role-based visibility and write targeting

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use menuforge_core::catalog::{Category, OptionGroup, OptionItem, Product};
use menuforge_core::overrides::{OverrideKind, StoreOverride};
use menuforge_core::types::{
    BrandId, CategoryId, OptionGroupId, OptionItemId, Owner, OverrideId, ProductId, StoreId,
};

/// Fixture brand. All template entities in the fixtures belong to it.
pub const BRAND: BrandId = BrandId::new(1);

/// Fixture franchise store of [`BRAND`].
pub const FRANCHISE: StoreId = StoreId::new(10);

/// Fixture independent store with no brand.
pub const INDEPENDENT: StoreId = StoreId::new(20);

#[must_use]
pub fn template_category(id: i32, name: &str, display_order: i32) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.into(),
        display_order,
        owner: Owner::BrandTemplate(BRAND),
    }
}

#[must_use]
pub fn store_category(id: i32, store: StoreId, name: &str, display_order: i32) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.into(),
        display_order,
        owner: Owner::StoreOwned(store),
    }
}

#[must_use]
pub fn template_product(id: i32, name: &str, cents: i64, category: i32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.into(),
        description: None,
        price: Decimal::new(cents, 2),
        image_url: None,
        available: true,
        category_id: Some(CategoryId::new(category)),
        owner: Owner::BrandTemplate(BRAND),
    }
}

#[must_use]
pub fn store_product(id: i32, store: StoreId, name: &str, cents: i64, category: i32) -> Product {
    Product {
        category_id: Some(CategoryId::new(category)),
        owner: Owner::StoreOwned(store),
        ..template_product(id, name, cents, category)
    }
}

#[must_use]
pub fn template_group(id: i32, name: &str, display_order: i32) -> OptionGroup {
    OptionGroup {
        id: OptionGroupId::new(id),
        name: name.into(),
        description: None,
        min_selections: 0,
        max_selections: 3,
        display_order,
        owner: Owner::BrandTemplate(BRAND),
    }
}

#[must_use]
pub fn template_item(id: i32, group: i32, name: &str, cents: i64, display_order: i32) -> OptionItem {
    OptionItem {
        id: OptionItemId::new(id),
        name: name.into(),
        additional_price: Decimal::new(cents, 2),
        available: true,
        display_order,
        option_group_id: OptionGroupId::new(group),
        store_id: None,
    }
}

/// An override row with every customization field unset.
#[must_use]
pub fn blank_override(store: StoreId, kind: OverrideKind, template_item_id: i32) -> StoreOverride {
    StoreOverride {
        id: OverrideId::new(template_item_id),
        store_id: store,
        kind,
        template_item_id,
        local_price: None,
        local_available: None,
        active_in_store: true,
        local_name: None,
        local_display_order: None,
    }
}
