//! The template/override merge engine.
//!
//! A brand template plus an optional [`StoreOverride`] resolves into one
//! "effective" entity for a given store, or into nothing when the item is
//! suppressed from the requested view. Field resolution is override-wins:
//! a set `local_*` value replaces the template value, an unset one falls
//! through. A local price of zero is a set value.
//!
//! The same functions serve store-owned entities by passing `None` for the
//! override; a store's own items have no override layer, so they resolve to
//! their stored values with only the availability filter applied.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{Category, OptionGroup, OptionItem, Product};
use crate::overrides::StoreOverride;
use crate::types::{CategoryId, OptionGroupId, OptionItemId, ProductId};

/// Which audience the resolution is for.
///
/// The public view suppresses inactive and unavailable items; the admin
/// view never suppresses, so an operator can see and reactivate hidden
/// items, and instead carries the activity state as a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuView {
    Admin,
    Public,
}

impl MenuView {
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// A category as seen through a store's override layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveCategory {
    pub id: CategoryId,
    pub name: String,
    pub display_order: i32,
    pub is_template: bool,
    pub active_in_store: bool,
}

/// A product as seen through a store's override layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveProduct {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub category_id: Option<CategoryId>,
    pub is_template: bool,
    pub active_in_store: bool,
}

/// An option group with its resolved items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveOptionGroup {
    pub id: OptionGroupId,
    pub name: String,
    pub description: Option<String>,
    pub min_selections: i32,
    pub max_selections: i32,
    pub display_order: i32,
    pub is_template: bool,
    pub active_in_store: bool,
    pub items: Vec<EffectiveOptionItem>,
}

/// One selectable option after override resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveOptionItem {
    pub id: OptionItemId,
    pub name: String,
    pub additional_price: Decimal,
    pub available: bool,
    pub display_order: i32,
    pub active_in_store: bool,
}

/// Whether the public view hides this item.
///
/// With no override the template's own availability decides. With an
/// override, only the override decides: the item is hidden when the store
/// deactivated it or locally marked it unavailable, and shown otherwise
/// even if the template itself is unavailable (the store made a local
/// choice and it wins).
fn suppressed(view: MenuView, ov: Option<&StoreOverride>, template_available: bool) -> bool {
    if !view.is_public() {
        return false;
    }
    match ov {
        None => !template_available,
        Some(ov) => !ov.active_in_store || ov.local_available == Some(false),
    }
}

/// Activity flag for the admin view. No override row means active.
fn active_flag(ov: Option<&StoreOverride>) -> bool {
    ov.is_none_or(|ov| ov.active_in_store)
}

/// Resolve a category for one store.
///
/// Categories carry no availability flag, so with no override they are
/// never suppressed; an override can still deactivate them.
#[must_use]
pub fn resolve_category(
    template: &Category,
    ov: Option<&StoreOverride>,
    view: MenuView,
) -> Option<EffectiveCategory> {
    if suppressed(view, ov, true) {
        return None;
    }
    Some(EffectiveCategory {
        id: template.id,
        name: ov
            .and_then(|o| o.local_name.clone())
            .unwrap_or_else(|| template.name.clone()),
        display_order: ov
            .and_then(|o| o.local_display_order)
            .unwrap_or(template.display_order),
        is_template: template.owner.is_template(),
        active_in_store: active_flag(ov),
    })
}

/// Resolve a product for one store.
#[must_use]
pub fn resolve_product(
    template: &Product,
    ov: Option<&StoreOverride>,
    view: MenuView,
) -> Option<EffectiveProduct> {
    if suppressed(view, ov, template.available) {
        return None;
    }
    Some(EffectiveProduct {
        id: template.id,
        name: ov
            .and_then(|o| o.local_name.clone())
            .unwrap_or_else(|| template.name.clone()),
        description: template.description.clone(),
        price: ov.and_then(|o| o.local_price).unwrap_or(template.price),
        image_url: template.image_url.clone(),
        available: ov
            .and_then(|o| o.local_available)
            .unwrap_or(template.available),
        category_id: template.category_id,
        is_template: template.owner.is_template(),
        active_in_store: active_flag(ov),
    })
}

/// Resolve one option item for one store.
#[must_use]
pub fn resolve_option_item(
    template: &OptionItem,
    ov: Option<&StoreOverride>,
    view: MenuView,
) -> Option<EffectiveOptionItem> {
    if suppressed(view, ov, template.available) {
        return None;
    }
    Some(EffectiveOptionItem {
        id: template.id,
        name: ov
            .and_then(|o| o.local_name.clone())
            .unwrap_or_else(|| template.name.clone()),
        additional_price: ov
            .and_then(|o| o.local_price)
            .unwrap_or(template.additional_price),
        available: ov
            .and_then(|o| o.local_available)
            .unwrap_or(template.available),
        display_order: ov
            .and_then(|o| o.local_display_order)
            .unwrap_or(template.display_order),
        active_in_store: active_flag(ov),
    })
}

/// Resolve an option group together with its items.
///
/// `items` pairs each child item with its override, if any. Items are
/// resolved through [`resolve_option_item`] with the same view and come
/// back sorted by `(display_order, name)`. In the public view a group whose
/// every item was suppressed is itself suppressed: a group with nothing to
/// select is meaningless to a customer.
#[must_use]
pub fn resolve_option_group(
    template: &OptionGroup,
    ov: Option<&StoreOverride>,
    items: &[(OptionItem, Option<StoreOverride>)],
    view: MenuView,
) -> Option<EffectiveOptionGroup> {
    if suppressed(view, ov, true) {
        return None;
    }
    let mut resolved: Vec<EffectiveOptionItem> = items
        .iter()
        .filter_map(|(item, item_ov)| resolve_option_item(item, item_ov.as_ref(), view))
        .collect();
    if view.is_public() && resolved.is_empty() {
        return None;
    }
    resolved.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    Some(EffectiveOptionGroup {
        id: template.id,
        name: ov
            .and_then(|o| o.local_name.clone())
            .unwrap_or_else(|| template.name.clone()),
        description: template.description.clone(),
        min_selections: template.min_selections,
        max_selections: template.max_selections,
        display_order: ov
            .and_then(|o| o.local_display_order)
            .unwrap_or(template.display_order),
        is_template: template.owner.is_template(),
        active_in_store: active_flag(ov),
        items: resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{OverrideKind, StoreOverride};
    use crate::types::{BrandId, Owner, OverrideId, StoreId};

    const STORE: StoreId = StoreId::new(10);
    const BRAND: BrandId = BrandId::new(1);

    fn template_product(price: Decimal, available: bool) -> Product {
        Product {
            id: ProductId::new(100),
            name: "Margherita".into(),
            description: Some("Tomato and mozzarella".into()),
            price,
            image_url: None,
            available,
            category_id: Some(CategoryId::new(7)),
            owner: Owner::BrandTemplate(BRAND),
        }
    }

    fn blank_override(kind: OverrideKind, template_item_id: i32) -> StoreOverride {
        StoreOverride {
            id: OverrideId::new(1),
            store_id: STORE,
            kind,
            template_item_id,
            local_price: None,
            local_available: None,
            active_in_store: true,
            local_name: None,
            local_display_order: None,
        }
    }

    fn option_item(id: i32, name: &str, available: bool, display_order: i32) -> OptionItem {
        OptionItem {
            id: OptionItemId::new(id),
            name: name.into(),
            additional_price: Decimal::ZERO,
            available,
            display_order,
            option_group_id: OptionGroupId::new(50),
            store_id: None,
        }
    }

    fn option_group() -> OptionGroup {
        OptionGroup {
            id: OptionGroupId::new(50),
            name: "Extras".into(),
            description: None,
            min_selections: 0,
            max_selections: 3,
            display_order: 1,
            owner: Owner::BrandTemplate(BRAND),
        }
    }

    #[test]
    fn no_override_resolves_template_verbatim() {
        let product = template_product(Decimal::new(4500, 2), true);
        let effective = resolve_product(&product, None, MenuView::Public).unwrap();

        assert_eq!(effective.name, product.name);
        assert_eq!(effective.price, product.price);
        assert_eq!(effective.available, product.available);
        assert_eq!(effective.category_id, product.category_id);
        assert!(effective.is_template);
        assert!(effective.active_in_store);
    }

    #[test]
    fn unavailable_template_without_override_is_hidden_from_public() {
        let product = template_product(Decimal::new(4500, 2), false);
        assert!(resolve_product(&product, None, MenuView::Public).is_none());
        // The admin still sees it, marked unavailable.
        let admin = resolve_product(&product, None, MenuView::Admin).unwrap();
        assert!(!admin.available);
    }

    #[test]
    fn zero_local_price_is_a_real_override() {
        let product = template_product(Decimal::new(4500, 2), true);
        let ov = StoreOverride {
            local_price: Some(Decimal::ZERO),
            ..blank_override(OverrideKind::Product, 100)
        };
        let effective = resolve_product(&product, Some(&ov), MenuView::Public).unwrap();
        assert_eq!(effective.price, Decimal::ZERO);
    }

    #[test]
    fn override_fields_win_and_unset_fields_fall_through() {
        let product = template_product(Decimal::new(4500, 2), true);
        let ov = StoreOverride {
            local_name: Some("Margherita Special".into()),
            local_price: Some(Decimal::new(3990, 2)),
            ..blank_override(OverrideKind::Product, 100)
        };
        let effective = resolve_product(&product, Some(&ov), MenuView::Public).unwrap();

        assert_eq!(effective.name, "Margherita Special");
        assert_eq!(effective.price, Decimal::new(3990, 2));
        // Unset fields keep template values.
        assert!(effective.available);
        assert_eq!(effective.description, product.description);
    }

    #[test]
    fn inactive_override_hides_from_public_but_not_from_admin() {
        let product = template_product(Decimal::new(4500, 2), true);
        let ov = StoreOverride {
            active_in_store: false,
            ..blank_override(OverrideKind::Product, 100)
        };

        assert!(resolve_product(&product, Some(&ov), MenuView::Public).is_none());

        let admin = resolve_product(&product, Some(&ov), MenuView::Admin).unwrap();
        assert!(!admin.active_in_store);
    }

    #[test]
    fn local_unavailability_hides_from_public() {
        let product = template_product(Decimal::new(4500, 2), true);
        let ov = StoreOverride {
            local_available: Some(false),
            ..blank_override(OverrideKind::Product, 100)
        };
        assert!(resolve_product(&product, Some(&ov), MenuView::Public).is_none());
    }

    #[test]
    fn local_availability_outranks_template_unavailability() {
        // The store explicitly carries an item the brand turned off.
        let product = template_product(Decimal::new(4500, 2), false);
        let ov = StoreOverride {
            local_available: Some(true),
            ..blank_override(OverrideKind::Product, 100)
        };
        let effective = resolve_product(&product, Some(&ov), MenuView::Public).unwrap();
        assert!(effective.available);
    }

    #[test]
    fn category_override_renames_and_reorders() {
        let category = Category {
            id: CategoryId::new(7),
            name: "Pizzas".into(),
            display_order: 2,
            owner: Owner::BrandTemplate(BRAND),
        };
        let ov = StoreOverride {
            local_name: Some("Wood-fired Pizzas".into()),
            local_display_order: Some(0),
            ..blank_override(OverrideKind::Category, 7)
        };
        let effective = resolve_category(&category, Some(&ov), MenuView::Public).unwrap();
        assert_eq!(effective.name, "Wood-fired Pizzas");
        assert_eq!(effective.display_order, 0);
    }

    #[test]
    fn deactivated_category_stays_in_admin_view_with_its_local_name() {
        let category = Category {
            id: CategoryId::new(7),
            name: "Pizzas".into(),
            display_order: 2,
            owner: Owner::BrandTemplate(BRAND),
        };
        let ov = StoreOverride {
            local_name: Some("Wood-fired Pizzas".into()),
            active_in_store: false,
            ..blank_override(OverrideKind::Category, 7)
        };

        assert!(resolve_category(&category, Some(&ov), MenuView::Public).is_none());

        let admin = resolve_category(&category, Some(&ov), MenuView::Admin).unwrap();
        assert_eq!(admin.name, "Wood-fired Pizzas");
        assert!(admin.is_template);
        assert!(!admin.active_in_store);
    }

    #[test]
    fn group_with_no_visible_items_is_suppressed_in_public() {
        let group = option_group();
        let items = vec![
            (option_item(1, "Olives", false, 0), None),
            (
                option_item(2, "Oregano", true, 1),
                Some(StoreOverride {
                    active_in_store: false,
                    ..blank_override(OverrideKind::OptionItem, 2)
                }),
            ),
        ];

        assert!(resolve_option_group(&group, None, &items, MenuView::Public).is_none());

        // The admin view keeps the group and every item.
        let admin = resolve_option_group(&group, None, &items, MenuView::Admin).unwrap();
        assert_eq!(admin.items.len(), 2);
        assert!(!admin.items.iter().any(|i| i.id == OptionItemId::new(2) && i.active_in_store));
    }

    #[test]
    fn group_items_sort_by_display_order_then_name() {
        let group = option_group();
        let items = vec![
            (option_item(1, "Oregano", true, 1), None),
            (option_item(2, "Basil", true, 1), None),
            (option_item(3, "Anchovies", true, 0), None),
        ];
        let effective = resolve_option_group(&group, None, &items, MenuView::Public).unwrap();
        let names: Vec<_> = effective.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Anchovies", "Basil", "Oregano"]);
    }

    #[test]
    fn one_visible_item_keeps_the_group() {
        let group = option_group();
        let items = vec![
            (option_item(1, "Olives", false, 0), None),
            (option_item(2, "Oregano", true, 1), None),
        ];
        let effective = resolve_option_group(&group, None, &items, MenuView::Public).unwrap();
        assert_eq!(effective.items.len(), 1);
        assert_eq!(effective.items[0].name, "Oregano");
    }
}
