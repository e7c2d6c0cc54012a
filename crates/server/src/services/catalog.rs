//! Admin-view catalog listings and template delete guards.
//!
//! Store admins see their own items next to their brand's templates, the
//! latter folded through the store's override layer with the admin view
//! (nothing suppressed, activity carried as a flag). Other roles see stored
//! values as-is; the resolver is still applied uniformly so every list
//! speaks the same effective shape.

use std::collections::HashMap;

use sqlx::PgPool;

use menuforge_core::overrides::{OverrideKind, StoreOverride};
use menuforge_core::resolve::{
    EffectiveCategory, EffectiveOptionGroup, EffectiveProduct, MenuView, resolve_category,
    resolve_option_group, resolve_product,
};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{CategoryId, StoreId};

use crate::db::{
    CategoryRepository, OptionGroupRepository, OptionItemRepository, OverrideRepository,
    OwnerFilter, ProductRepository,
};
use crate::error::AppError;

/// The store whose override layer applies to reads in this scope, if any.
const fn override_store(scope: &AccessScope) -> Option<StoreId> {
    match *scope {
        AccessScope::Store { store_id, .. } => Some(store_id),
        _ => None,
    }
}

/// List categories for the admin panel, merged through the caller's
/// override layer.
///
/// # Errors
///
/// Returns [`AppError::Database`] when a query fails.
pub async fn list_categories(
    pool: &PgPool,
    scope: &AccessScope,
) -> Result<Vec<EffectiveCategory>, AppError> {
    let categories = CategoryRepository::new(pool)
        .list(OwnerFilter::from(scope))
        .await?;

    let overrides = match override_store(scope) {
        Some(store_id) => {
            OverrideRepository::new(pool)
                .map_for_store(store_id, OverrideKind::Category)
                .await?
        }
        None => HashMap::new(),
    };

    Ok(categories
        .iter()
        .filter_map(|category| {
            let ov = overrides.get(&category.id.as_i32());
            resolve_category(category, ov, MenuView::Admin)
        })
        .collect())
}

/// List products for the admin panel, merged through the caller's override
/// layer.
///
/// # Errors
///
/// Returns [`AppError::Database`] when a query fails.
pub async fn list_products(
    pool: &PgPool,
    scope: &AccessScope,
    category_id: Option<CategoryId>,
) -> Result<Vec<EffectiveProduct>, AppError> {
    let products = ProductRepository::new(pool)
        .list(OwnerFilter::from(scope), category_id)
        .await?;

    let overrides = match override_store(scope) {
        Some(store_id) => {
            OverrideRepository::new(pool)
                .map_for_store(store_id, OverrideKind::Product)
                .await?
        }
        None => HashMap::new(),
    };

    Ok(products
        .iter()
        .filter_map(|product| {
            let ov = overrides.get(&product.id.as_i32());
            resolve_product(product, ov, MenuView::Admin)
        })
        .collect())
}

/// List option groups with their items for the admin panel, merged through
/// the caller's override layer.
///
/// # Errors
///
/// Returns [`AppError::Database`] when a query fails.
pub async fn list_option_groups(
    pool: &PgPool,
    scope: &AccessScope,
) -> Result<Vec<EffectiveOptionGroup>, AppError> {
    let groups = OptionGroupRepository::new(pool)
        .list(OwnerFilter::from(scope))
        .await?;

    let group_ids: Vec<_> = groups.iter().map(|g| g.id).collect();
    let items = OptionItemRepository::new(pool)
        .list_by_groups(&group_ids)
        .await?;

    let (group_overrides, item_overrides) = match override_store(scope) {
        Some(store_id) => {
            let repo = OverrideRepository::new(pool);
            (
                repo.map_for_store(store_id, OverrideKind::OptionGroup).await?,
                repo.map_for_store(store_id, OverrideKind::OptionItem).await?,
            )
        }
        None => (HashMap::new(), HashMap::new()),
    };

    Ok(groups
        .iter()
        .filter_map(|group| {
            let group_items: Vec<(menuforge_core::catalog::OptionItem, Option<StoreOverride>)> =
                items
                    .iter()
                    .filter(|item| item.option_group_id == group.id)
                    .map(|item| {
                        (
                            item.clone(),
                            item_overrides.get(&item.id.as_i32()).cloned(),
                        )
                    })
                    .collect();
            resolve_option_group(
                group,
                group_overrides.get(&group.id.as_i32()),
                &group_items,
                MenuView::Admin,
            )
        })
        .collect())
}

/// Block deletion of a template item while any store actively carries it.
///
/// # Errors
///
/// Returns [`AppError::DependencyInUse`] when an active override still
/// references the template.
pub async fn ensure_template_deletable(
    pool: &PgPool,
    kind: OverrideKind,
    template_item_id: i32,
) -> Result<(), AppError> {
    let active = OverrideRepository::new(pool)
        .active_count_for_template(kind, template_item_id)
        .await?;

    if active > 0 {
        return Err(AppError::DependencyInUse(format!(
            "{active} store(s) still actively carry this template item"
        )));
    }
    Ok(())
}
