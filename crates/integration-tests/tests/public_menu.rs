//! End-to-end resolution of a franchise public menu.
//!
//! Builds one brand template catalog and resolves it for two stores with
//! different override layers, composing the resolve functions the way the
//! public menu endpoints do: resolve each entity with the store's override,
//! drop the suppressed ones, then sort.

use rust_decimal::Decimal;

use menuforge_core::overrides::{OverrideKind, StoreOverride};
use menuforge_core::resolve::{
    EffectiveCategory, EffectiveProduct, MenuView, resolve_category, resolve_option_group,
    resolve_product,
};
use menuforge_core::types::{OptionItemId, ProductId};

use menuforge_integration_tests::{
    FRANCHISE, INDEPENDENT, blank_override, store_category, store_product, template_category,
    template_group, template_item, template_product,
};

/// The template catalog: two categories, three products, one option group.
struct Catalog {
    categories: Vec<menuforge_core::catalog::Category>,
    products: Vec<menuforge_core::catalog::Product>,
}

fn catalog() -> Catalog {
    Catalog {
        categories: vec![
            template_category(1, "Pizzas", 0),
            template_category(2, "Drinks", 1),
        ],
        products: vec![
            template_product(100, "Margherita", 4990, 1),
            template_product(101, "Calabresa", 5290, 1),
            template_product(102, "Lemonade", 990, 2),
        ],
    }
}

fn menu_categories(
    catalog: &Catalog,
    overrides: &[StoreOverride],
) -> Vec<EffectiveCategory> {
    let mut resolved: Vec<EffectiveCategory> = catalog
        .categories
        .iter()
        .filter_map(|category| {
            let ov = overrides.iter().find(|ov| {
                ov.kind == OverrideKind::Category && ov.template_item_id == category.id.as_i32()
            });
            resolve_category(category, ov, MenuView::Public)
        })
        .collect();
    resolved.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    resolved
}

fn menu_products(catalog: &Catalog, overrides: &[StoreOverride]) -> Vec<EffectiveProduct> {
    let mut resolved: Vec<EffectiveProduct> = catalog
        .products
        .iter()
        .filter_map(|product| {
            let ov = overrides.iter().find(|ov| {
                ov.kind == OverrideKind::Product && ov.template_item_id == product.id.as_i32()
            });
            resolve_product(product, ov, MenuView::Public)
        })
        .collect();
    resolved.sort_by(|a, b| a.name.cmp(&b.name));
    resolved
}

#[test]
fn two_stores_of_one_brand_see_different_menus() {
    let catalog = catalog();

    // Store A renames a category, reprices the Margherita, and drops the
    // Calabresa entirely.
    let store_a = vec![
        StoreOverride {
            local_name: Some("Wood-fired Pizzas".into()),
            ..blank_override(FRANCHISE, OverrideKind::Category, 1)
        },
        StoreOverride {
            local_price: Some(Decimal::new(4490, 2)),
            ..blank_override(FRANCHISE, OverrideKind::Product, 100)
        },
        StoreOverride {
            active_in_store: false,
            ..blank_override(FRANCHISE, OverrideKind::Product, 101)
        },
    ];

    let categories = menu_categories(&catalog, &store_a);
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Wood-fired Pizzas");

    let products = menu_products(&catalog, &store_a);
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Lemonade", "Margherita"]);
    let margherita = products
        .iter()
        .find(|p| p.id == ProductId::new(100))
        .unwrap();
    assert_eq!(margherita.price, Decimal::new(4490, 2));

    // Store B carries the untouched template.
    let products = menu_products(&catalog, &[]);
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Calabresa", "Lemonade", "Margherita"]);
    let margherita = products
        .iter()
        .find(|p| p.id == ProductId::new(100))
        .unwrap();
    assert_eq!(margherita.price, Decimal::new(4990, 2));
}

#[test]
fn admin_category_listing_keeps_hidden_templates_flagged() {
    let catalog = catalog();

    // The store renames one template category and switches the other off.
    let overrides = vec![
        StoreOverride {
            local_name: Some("Wood-fired Pizzas".into()),
            ..blank_override(FRANCHISE, OverrideKind::Category, 1)
        },
        StoreOverride {
            active_in_store: false,
            ..blank_override(FRANCHISE, OverrideKind::Category, 2)
        },
    ];

    // The admin listing resolves the same way the public one does, but with
    // the admin view: nothing is dropped.
    let listed: Vec<EffectiveCategory> = catalog
        .categories
        .iter()
        .filter_map(|category| {
            let ov = overrides.iter().find(|ov| {
                ov.kind == OverrideKind::Category && ov.template_item_id == category.id.as_i32()
            });
            resolve_category(category, ov, MenuView::Admin)
        })
        .collect();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Wood-fired Pizzas");
    assert!(listed[0].active_in_store);
    assert_eq!(listed[1].name, "Drinks");
    assert!(!listed[1].active_in_store);

    // The public listing drops the deactivated one.
    assert_eq!(menu_categories(&catalog, &overrides).len(), 1);
}

#[test]
fn store_owned_items_interleave_with_resolved_templates() {
    let catalog = catalog();
    let own = store_product(200, FRANCHISE, "House Special", 5990, 1);

    let mut menu = menu_products(&catalog, &[]);
    if let Some(effective) = resolve_product(&own, None, MenuView::Public) {
        menu.push(effective);
    }
    menu.sort_by(|a, b| a.name.cmp(&b.name));

    let names: Vec<_> = menu.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Calabresa", "House Special", "Lemonade", "Margherita"]);
    assert!(!menu.iter().find(|p| p.name == "House Special").unwrap().is_template);
}

#[test]
fn independent_store_resolves_without_an_override_layer() {
    // An independent store has no templates; its own rows resolve verbatim.
    let category = store_category(5, INDEPENDENT, "Pastas", 0);
    let product = store_product(201, INDEPENDENT, "Lasagna", 3890, 5);

    let effective = resolve_category(&category, None, MenuView::Public).unwrap();
    assert!(!effective.is_template);

    let effective = resolve_product(&product, None, MenuView::Public).unwrap();
    assert_eq!(effective.price, Decimal::new(3890, 2));
    assert!(effective.active_in_store);
}

#[test]
fn option_group_resolution_follows_the_link_and_override_layers() {
    let group = template_group(50, "Size", 0);
    let items = vec![
        (template_item(500, 50, "Medium", 0, 0), None),
        (
            template_item(501, 50, "Large", 1000, 1),
            Some(StoreOverride {
                local_price: Some(Decimal::new(800, 2)),
                ..blank_override(FRANCHISE, OverrideKind::OptionItem, 501)
            }),
        ),
        (
            template_item(502, 50, "Family", 2000, 2),
            Some(StoreOverride {
                active_in_store: false,
                ..blank_override(FRANCHISE, OverrideKind::OptionItem, 502)
            }),
        ),
    ];

    let effective = resolve_option_group(&group, None, &items, MenuView::Public).unwrap();
    let ids: Vec<_> = effective.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, [OptionItemId::new(500), OptionItemId::new(501)]);
    assert_eq!(effective.items[1].additional_price, Decimal::new(800, 2));

    // Deactivating every item suppresses the whole group for customers.
    let all_off: Vec<_> = items
        .iter()
        .map(|(item, _)| {
            (
                item.clone(),
                Some(StoreOverride {
                    active_in_store: false,
                    ..blank_override(FRANCHISE, OverrideKind::OptionItem, item.id.as_i32())
                }),
            )
        })
        .collect();
    assert!(resolve_option_group(&group, None, &all_off, MenuView::Public).is_none());

    // The admin view still shows everything, flagged.
    let admin = resolve_option_group(&group, None, &all_off, MenuView::Admin).unwrap();
    assert_eq!(admin.items.len(), 3);
    assert!(admin.items.iter().all(|i| !i.active_in_store));
}
