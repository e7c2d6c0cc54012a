//! Catalog entities and their structural invariants.
//!
//! These are validated domain objects; repository row types convert into
//! them with `TryFrom`, and request payloads are validated through the
//! `validate_*` helpers before any mutation is attempted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    AdminUserId, BrandId, CategoryId, OptionGroupId, OptionItemId, Owner, ProductId, Role, StoreId,
};

/// Structural invariant violation, surfaced before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("additional price must not be negative")]
    NegativeAdditionalPrice,
    #[error("invalid selection bounds: min {min} / max {max}")]
    SelectionBounds { min: i32, max: i32 },
    #[error("category is not compatible with the item's ownership context")]
    IncompatibleCategory,
}

/// A franchise brand. Owns template categories, products and option groups
/// shared by its stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    /// Unique, non-empty.
    pub name: String,
    pub logo_url: Option<String>,
}

/// Street-address block for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAddress {
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub complement: Option<String>,
    pub maps_link: Option<String>,
}

/// Promotional banner shown on the public menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoBanner {
    pub enabled: bool,
    pub image_url: Option<String>,
    pub text: Option<String>,
    pub link_url: Option<String>,
}

/// A store. With `brand_id` set it is a franchise store and may read and
/// override that brand's templates; with `brand_id` unset it is independent
/// and its whole catalog is store-owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub whatsapp_phone: Option<String>,
    pub landline_phone: Option<String>,
    pub brand_id: Option<BrandId>,
    pub address: StoreAddress,
    /// Free-form opening-hours text, formatted by the frontend.
    pub business_hours: Option<String>,
    pub min_order_value: Decimal,
    /// Display text such as "30-50 min".
    pub estimated_delivery_time: Option<String>,
    pub promo_banner: PromoBanner,
    pub allow_order_notes: bool,
}

impl Store {
    /// Whether this store belongs to a brand.
    #[must_use]
    pub const fn is_franchise(&self) -> bool {
        self.brand_id.is_some()
    }
}

/// A menu category, either store-owned or a brand template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub display_order: i32,
    #[serde(flatten)]
    pub owner: Owner,
}

/// A product, either store-owned or a brand template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Strictly positive.
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub category_id: Option<CategoryId>,
    #[serde(flatten)]
    pub owner: Owner,
}

/// A group of selectable options, offered for the products of the
/// categories it is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub id: OptionGroupId,
    pub name: String,
    pub description: Option<String>,
    /// 0 when the group is optional.
    pub min_selections: i32,
    /// At least 1, and at least `min_selections`.
    pub max_selections: i32,
    pub display_order: i32,
    #[serde(flatten)]
    pub owner: Owner,
}

/// One selectable option inside a group.
///
/// The store link is derived from the parent group: a store-owned group's
/// items carry the same store id, a template group's items carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: OptionItemId,
    pub name: String,
    /// Non-negative surcharge on top of the product price.
    pub additional_price: Decimal,
    pub available: bool,
    pub display_order: i32,
    pub option_group_id: OptionGroupId,
    pub store_id: Option<StoreId>,
}

/// Associative row: this option group is offered for products of this
/// category, at the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptionGroupLink {
    pub category_id: CategoryId,
    pub option_group_id: OptionGroupId,
    pub display_order_in_category: i32,
}

/// An administrator account. The identity service authenticates these; the
/// core only consumes the resulting `(role, store_id, brand_id)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub store_id: Option<StoreId>,
    pub brand_id: Option<BrandId>,
}

/// Validate a brand or catalog-item name.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] for blank names.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Validate a product price.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositivePrice`] unless `price > 0`.
pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(())
}

/// Validate an option item's surcharge.
///
/// # Errors
///
/// Returns [`ValidationError::NegativeAdditionalPrice`] for negative values.
pub fn validate_additional_price(price: Decimal) -> Result<(), ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativeAdditionalPrice);
    }
    Ok(())
}

/// Validate option-group selection bounds.
///
/// # Errors
///
/// Returns [`ValidationError::SelectionBounds`] unless
/// `0 <= min <= max` and `max >= 1`.
pub fn validate_selection_bounds(min: i32, max: i32) -> Result<(), ValidationError> {
    if min < 0 || max < 1 || min > max {
        return Err(ValidationError::SelectionBounds { min, max });
    }
    Ok(())
}

/// Whether `category` may hold an item owned by `item_owner`.
///
/// A store-owned item accepts a category owned by the same store, or a
/// template category of the store's brand (`store_brand`, when the store is
/// a franchise). A template item accepts only a template category of the
/// same brand.
#[must_use]
pub fn category_allowed_for(
    item_owner: Owner,
    store_brand: Option<BrandId>,
    category: &Category,
) -> bool {
    match item_owner {
        Owner::StoreOwned(store_id) => match category.owner {
            Owner::StoreOwned(cat_store) => cat_store == store_id,
            Owner::BrandTemplate(cat_brand) => store_brand == Some(cat_brand),
        },
        Owner::BrandTemplate(brand_id) => category.owner == Owner::BrandTemplate(brand_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn category(id: i32, owner: Owner) -> Category {
        Category {
            id: CategoryId::new(id),
            name: "Pizzas".into(),
            display_order: 0,
            owner,
        }
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(Decimal::new(1, 2)).is_ok());
        assert_eq!(
            validate_price(Decimal::ZERO),
            Err(ValidationError::NonPositivePrice)
        );
        assert_eq!(
            validate_price(Decimal::new(-100, 2)),
            Err(ValidationError::NonPositivePrice)
        );
    }

    #[test]
    fn additional_price_allows_zero() {
        assert!(validate_additional_price(Decimal::ZERO).is_ok());
        assert_eq!(
            validate_additional_price(Decimal::new(-1, 2)),
            Err(ValidationError::NegativeAdditionalPrice)
        );
    }

    #[test]
    fn selection_bounds_are_checked() {
        assert!(validate_selection_bounds(0, 1).is_ok());
        assert!(validate_selection_bounds(2, 2).is_ok());
        assert!(validate_selection_bounds(3, 2).is_err());
        assert!(validate_selection_bounds(-1, 1).is_err());
        assert!(validate_selection_bounds(0, 0).is_err());
    }

    #[test]
    fn store_item_accepts_own_store_category() {
        let store = StoreId::new(5);
        let cat = category(1, Owner::StoreOwned(store));
        assert!(category_allowed_for(Owner::StoreOwned(store), None, &cat));
        assert!(!category_allowed_for(
            Owner::StoreOwned(StoreId::new(6)),
            None,
            &cat
        ));
    }

    #[test]
    fn franchise_store_item_accepts_brand_template_category() {
        let brand = BrandId::new(1);
        let cat = category(10, Owner::BrandTemplate(brand));
        assert!(category_allowed_for(
            Owner::StoreOwned(StoreId::new(5)),
            Some(brand),
            &cat
        ));
        // Independent store: no brand templates reachable.
        assert!(!category_allowed_for(
            Owner::StoreOwned(StoreId::new(5)),
            None,
            &cat
        ));
        // Different brand.
        assert!(!category_allowed_for(
            Owner::StoreOwned(StoreId::new(5)),
            Some(BrandId::new(2)),
            &cat
        ));
    }

    #[test]
    fn template_item_requires_same_brand_template_category() {
        let brand = BrandId::new(1);
        let template_cat = category(10, Owner::BrandTemplate(brand));
        let store_cat = category(11, Owner::StoreOwned(StoreId::new(5)));

        assert!(category_allowed_for(
            Owner::BrandTemplate(brand),
            None,
            &template_cat
        ));
        assert!(!category_allowed_for(
            Owner::BrandTemplate(BrandId::new(2)),
            None,
            &template_cat
        ));
        assert!(!category_allowed_for(
            Owner::BrandTemplate(brand),
            None,
            &store_cat
        ));
    }
}
