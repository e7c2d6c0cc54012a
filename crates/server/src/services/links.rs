//! Category writes with option-group link reconciliation.
//!
//! A category create or update carries a desired set of option groups. The
//! diff against the current link set is computed by the planner in
//! `menuforge_core::reconcile`, validated per candidate, and applied
//! together with the category row inside one transaction. Invalid
//! candidates are rejected individually and reported in the outcome rather
//! than failing the whole write.

use std::collections::{BTreeMap, BTreeSet};

use sqlx::PgPool;

use menuforge_core::catalog::Category;
use menuforge_core::reconcile::{ReconcileOutcome, plan_links};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{BrandId, OptionGroupId, Owner};

use crate::db::{CategoryRepository, OptionGroupRepository, OwnerFilter, StoreRepository};
use crate::error::AppError;

/// Create a category and link the desired option groups.
///
/// # Errors
///
/// Returns [`AppError::Database`] when a write fails; rejected link
/// candidates do not error.
pub async fn create_category_with_links(
    pool: &PgPool,
    scope: &AccessScope,
    owner: Owner,
    name: &str,
    display_order: i32,
    desired: &[OptionGroupId],
) -> Result<(Category, ReconcileOutcome), AppError> {
    reconcile(pool, scope, owner, None, name, display_order, desired).await
}

/// Update a category and reconcile its option-group links.
///
/// # Errors
///
/// Returns [`AppError::Database`] when a write fails.
pub async fn update_category_with_links(
    pool: &PgPool,
    scope: &AccessScope,
    category: &Category,
    name: &str,
    display_order: i32,
    desired: &[OptionGroupId],
) -> Result<(Category, ReconcileOutcome), AppError> {
    reconcile(
        pool,
        scope,
        category.owner,
        Some(category.id),
        name,
        display_order,
        desired,
    )
    .await
}

async fn reconcile(
    pool: &PgPool,
    scope: &AccessScope,
    owner: Owner,
    existing: Option<menuforge_core::types::CategoryId>,
    name: &str,
    display_order: i32,
    desired: &[OptionGroupId],
) -> Result<(Category, ReconcileOutcome), AppError> {
    // Candidates are the groups the caller could resolve at all; anything
    // else is rejected as not visible.
    let groups = OptionGroupRepository::new(pool)
        .list(OwnerFilter::from(scope))
        .await?;
    let candidates: BTreeMap<OptionGroupId, Owner> =
        groups.into_iter().map(|g| (g.id, g.owner)).collect();

    let store_brand = franchise_brand_of(pool, owner).await?;

    let current = match existing {
        Some(id) => CategoryRepository::linked_group_ids(pool, id).await?,
        None => Vec::new(),
    };

    let plan = plan_links(owner, store_brand, &current, desired, &candidates);
    for (id, reason) in &plan.rejected {
        tracing::warn!(
            option_group_id = %id,
            %reason,
            "rejected option group link candidate"
        );
    }

    // The removals, the validated additions, and the category row itself
    // commit together; no intermediate state is observable.
    let mut tx = pool.begin().await.map_err(crate::db::RepositoryError::from)?;

    let category = match existing {
        Some(id) => CategoryRepository::update(&mut *tx, id, name, display_order).await?,
        None => CategoryRepository::create(&mut *tx, name, display_order, owner).await?,
    };

    for id in &plan.to_remove {
        CategoryRepository::delete_link(&mut *tx, category.id, *id).await?;
    }

    // Link positions follow the order of the desired list.
    let kept: BTreeSet<OptionGroupId> = current
        .iter()
        .copied()
        .filter(|id| !plan.to_remove.contains(id))
        .chain(plan.to_add.iter().copied())
        .collect();
    let mut position = 0;
    let mut seen = BTreeSet::new();
    for id in desired {
        if kept.contains(id) && seen.insert(*id) {
            CategoryRepository::upsert_link(&mut *tx, category.id, *id, position).await?;
            position += 1;
        }
    }

    tx.commit().await.map_err(crate::db::RepositoryError::from)?;

    Ok((category, ReconcileOutcome::from(&plan)))
}

/// The brand whose templates a store-owned category may link, if any.
async fn franchise_brand_of(pool: &PgPool, owner: Owner) -> Result<Option<BrandId>, AppError> {
    match owner {
        Owner::StoreOwned(store_id) => {
            Ok(StoreRepository::new(pool).brand_of(store_id).await?)
        }
        Owner::BrandTemplate(_) => Ok(None),
    }
}
