//! Public menu projection.
//!
//! Composes a store's own catalog with its brand's templates, each resolved
//! through the override layer with the public view (inactive and
//! unavailable entries suppressed). Store-owned and template entries
//! interleave in the final ordering; the customer never sees the
//! distinction.

use std::collections::HashMap;

use sqlx::PgPool;

use menuforge_core::catalog::Store;
use menuforge_core::overrides::{OverrideKind, StoreOverride};
use menuforge_core::resolve::{
    EffectiveCategory, EffectiveOptionGroup, EffectiveProduct, MenuView, resolve_category,
    resolve_option_group, resolve_product,
};
use menuforge_core::types::{CategoryId, Owner, ProductId, StoreId};

use crate::db::{
    CategoryRepository, OptionGroupRepository, OptionItemRepository, OverrideRepository,
    OwnerFilter, ProductRepository, StoreRepository,
};
use crate::error::AppError;

async fn load_store(pool: &PgPool, store_id: StoreId) -> Result<Store, AppError> {
    StoreRepository::new(pool)
        .get(store_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("store {store_id}")))
}

/// What a store can see: its own rows, plus its brand's templates when it
/// is a franchise.
fn store_filter(store: &Store) -> OwnerFilter {
    match store.brand_id {
        Some(brand_id) => OwnerFilter::StoreOrBrand(store.id, brand_id),
        None => OwnerFilter::Store(store.id),
    }
}

async fn override_map(
    pool: &PgPool,
    store: &Store,
    kind: OverrideKind,
) -> Result<HashMap<i32, StoreOverride>, AppError> {
    // Independent stores have no template layer, so no overrides either.
    if store.brand_id.is_none() {
        return Ok(HashMap::new());
    }
    Ok(OverrideRepository::new(pool)
        .map_for_store(store.id, kind)
        .await?)
}

/// The categories of a store's public menu, in display order.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when the store does not exist.
pub async fn menu_categories(
    pool: &PgPool,
    store_id: StoreId,
) -> Result<Vec<EffectiveCategory>, AppError> {
    let store = load_store(pool, store_id).await?;
    let categories = CategoryRepository::new(pool)
        .list(store_filter(&store))
        .await?;
    let overrides = override_map(pool, &store, OverrideKind::Category).await?;

    let mut effective: Vec<EffectiveCategory> = categories
        .iter()
        .filter_map(|category| {
            let ov = match category.owner {
                Owner::BrandTemplate(_) => overrides.get(&category.id.as_i32()),
                Owner::StoreOwned(_) => None,
            };
            resolve_category(category, ov, MenuView::Public)
        })
        .collect();

    effective.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(effective)
}

/// The products of a store's public menu, optionally restricted to one
/// category, by name.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when the store does not exist.
pub async fn menu_products(
    pool: &PgPool,
    store_id: StoreId,
    category_id: Option<CategoryId>,
) -> Result<Vec<EffectiveProduct>, AppError> {
    let store = load_store(pool, store_id).await?;
    let products = ProductRepository::new(pool)
        .list(store_filter(&store), category_id)
        .await?;
    let overrides = override_map(pool, &store, OverrideKind::Product).await?;

    let mut effective: Vec<EffectiveProduct> = products
        .iter()
        .filter_map(|product| {
            let ov = match product.owner {
                Owner::BrandTemplate(_) => overrides.get(&product.id.as_i32()),
                Owner::StoreOwned(_) => None,
            };
            resolve_product(product, ov, MenuView::Public)
        })
        .collect();

    effective.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(effective)
}

/// The option groups offered for one product, in the order its category
/// links them.
///
/// An unreachable product (another store's, or a template of a brand the
/// store does not belong to) is indistinguishable from a missing one.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when the store or product does not exist
/// or the product is not reachable from the store.
pub async fn product_options(
    pool: &PgPool,
    store_id: StoreId,
    product_id: ProductId,
) -> Result<Vec<EffectiveOptionGroup>, AppError> {
    let store = load_store(pool, store_id).await?;
    let product = ProductRepository::new(pool)
        .get(product_id)
        .await?
        .filter(|product| match product.owner {
            Owner::StoreOwned(owner_store) => owner_store == store.id,
            Owner::BrandTemplate(brand) => store.brand_id == Some(brand),
        })
        .ok_or_else(|| AppError::not_found(format!("product {product_id}")))?;

    let Some(category_id) = product.category_id else {
        return Ok(Vec::new());
    };

    let groups = OptionGroupRepository::new(pool)
        .list_for_category(category_id)
        .await?;
    let group_ids: Vec<_> = groups.iter().map(|g| g.id).collect();
    let items = OptionItemRepository::new(pool)
        .list_by_groups(&group_ids)
        .await?;

    let group_overrides = override_map(pool, &store, OverrideKind::OptionGroup).await?;
    let item_overrides = override_map(pool, &store, OverrideKind::OptionItem).await?;

    // Keep the category's link order; groups are not re-sorted.
    Ok(groups
        .iter()
        .filter_map(|group| {
            let group_items: Vec<_> = items
                .iter()
                .filter(|item| item.option_group_id == group.id)
                .map(|item| {
                    let ov = match group.owner {
                        Owner::BrandTemplate(_) => {
                            item_overrides.get(&item.id.as_i32()).cloned()
                        }
                        Owner::StoreOwned(_) => None,
                    };
                    (item.clone(), ov)
                })
                .collect();
            let group_ov = match group.owner {
                Owner::BrandTemplate(_) => group_overrides.get(&group.id.as_i32()),
                Owner::StoreOwned(_) => None,
            };
            resolve_option_group(group, group_ov, &group_items, MenuView::Public)
        })
        .collect())
}
