//! Option-group and option-item route handlers.
//!
//! Items are nested under their group; the parent group's scope is checked
//! before any item operation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::catalog::{
    OptionGroup, OptionItem, validate_additional_price, validate_name, validate_selection_bounds,
};
use menuforge_core::overrides::OverrideKind;
use menuforge_core::resolve::{EffectiveOptionGroup, MenuView, resolve_option_group};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{OptionGroupId, OptionItemId, Owner};

use crate::db::option_groups::OptionGroupInput;
use crate::db::option_items::OptionItemInput;
use crate::db::{OptionGroupRepository, OptionItemRepository, OverrideRepository};
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::catalog::{ensure_template_deletable, list_option_groups};
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/option-groups", get(list).post(create))
        .route(
            "/api/option-groups/{id}",
            get(detail).put(update).delete(remove),
        )
        .route(
            "/api/option-groups/{id}/items",
            get(list_items).post(create_item),
        )
        .route(
            "/api/option-groups/{id}/items/{item_id}",
            axum::routing::put(update_item).delete(remove_item),
        )
}

#[derive(Debug, Deserialize)]
struct OptionGroupPayload {
    name: String,
    description: Option<String>,
    #[serde(default)]
    min_selections: i32,
    #[serde(default = "default_max_selections")]
    max_selections: i32,
    #[serde(default)]
    display_order: i32,
    /// Explicit target context; required for super admins.
    owner: Option<Owner>,
}

const fn default_max_selections() -> i32 {
    1
}

impl OptionGroupPayload {
    fn input(&self) -> OptionGroupInput {
        OptionGroupInput {
            name: self.name.clone(),
            description: self.description.clone(),
            min_selections: self.min_selections,
            max_selections: self.max_selections,
            display_order: self.display_order,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OptionItemPayload {
    name: String,
    #[serde(default)]
    additional_price: Decimal,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    display_order: i32,
}

const fn default_available() -> bool {
    true
}

impl OptionItemPayload {
    fn input(&self) -> OptionItemInput {
        OptionItemInput {
            name: self.name.clone(),
            additional_price: self.additional_price,
            available: self.available,
            display_order: self.display_order,
        }
    }
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<EffectiveOptionGroup>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let groups = list_option_groups(state.pool(), &scope).await?;
    Ok(Json(groups))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<OptionGroupId>,
) -> Result<Json<EffectiveOptionGroup>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_visible(&state, &scope, id).await?;

    let items = OptionItemRepository::new(state.pool())
        .list_by_group(group.id)
        .await?;

    let (group_ov, item_overrides) = match (&scope, group.owner) {
        (AccessScope::Store { store_id, .. }, Owner::BrandTemplate(_)) => {
            let repo = OverrideRepository::new(state.pool());
            (
                repo.get(menuforge_core::overrides::OverrideKey {
                    store_id: *store_id,
                    kind: OverrideKind::OptionGroup,
                    template_item_id: id.as_i32(),
                })
                .await?,
                repo.map_for_store(*store_id, OverrideKind::OptionItem).await?,
            )
        }
        _ => (None, std::collections::HashMap::new()),
    };

    let pairs: Vec<_> = items
        .into_iter()
        .map(|item| {
            let ov = item_overrides.get(&item.id.as_i32()).cloned();
            (item, ov)
        })
        .collect();

    let effective = resolve_option_group(&group, group_ov.as_ref(), &pairs, MenuView::Admin)
        .ok_or_else(|| AppError::Internal("admin view never suppresses".into()))?;
    Ok(Json(effective))
}

#[instrument(skip(state, identity, payload))]
async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<OptionGroupPayload>,
) -> Result<(StatusCode, Json<OptionGroup>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    validate_name(&payload.name)?;
    validate_selection_bounds(payload.min_selections, payload.max_selections)?;
    let owner = scope.write_owner(payload.owner)?;

    let group = OptionGroupRepository::new(state.pool())
        .create(&payload.input(), owner)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[instrument(skip(state, identity, payload))]
async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<OptionGroupId>,
    Json(payload): Json<OptionGroupPayload>,
) -> Result<Json<OptionGroup>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_writable(&state, &scope, id).await?;
    validate_name(&payload.name)?;
    validate_selection_bounds(payload.min_selections, payload.max_selections)?;
    if payload.owner.is_some_and(|owner| owner != group.owner) {
        return Err(AppError::Validation(
            "an option group's ownership cannot change".into(),
        ));
    }

    let group = OptionGroupRepository::new(state.pool())
        .update(id, &payload.input())
        .await?;
    Ok(Json(group))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<OptionGroupId>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_writable(&state, &scope, id).await?;

    let repo = OptionGroupRepository::new(state.pool());
    let linked = repo.linked_category_count(id).await?;
    if linked > 0 {
        return Err(AppError::DependencyInUse(format!(
            "option group {id} is linked to {linked} categories"
        )));
    }
    if group.owner.is_template() {
        ensure_template_deletable(state.pool(), OverrideKind::OptionGroup, id.as_i32()).await?;
    }

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity))]
async fn list_items(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<OptionGroupId>,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_visible(&state, &scope, id).await?;

    let items = OptionItemRepository::new(state.pool())
        .list_by_group(group.id)
        .await?;
    Ok(Json(items))
}

#[instrument(skip(state, identity, payload))]
async fn create_item(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<OptionGroupId>,
    Json(payload): Json<OptionItemPayload>,
) -> Result<(StatusCode, Json<OptionItem>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_writable(&state, &scope, id).await?;
    validate_name(&payload.name)?;
    validate_additional_price(payload.additional_price)?;

    // The item's store link mirrors the parent group's owner.
    let item = OptionItemRepository::new(state.pool())
        .create(group.id, group.owner.store_id(), &payload.input())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, identity, payload))]
async fn update_item(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path((id, item_id)): Path<(OptionGroupId, OptionItemId)>,
    Json(payload): Json<OptionItemPayload>,
) -> Result<Json<OptionItem>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_writable(&state, &scope, id).await?;
    let _ = load_item(&state, group.id, item_id).await?;
    validate_name(&payload.name)?;
    validate_additional_price(payload.additional_price)?;

    let item = OptionItemRepository::new(state.pool())
        .update(item_id, &payload.input())
        .await?;
    Ok(Json(item))
}

#[instrument(skip(state, identity))]
async fn remove_item(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path((id, item_id)): Path<(OptionGroupId, OptionItemId)>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let group = load_writable(&state, &scope, id).await?;
    let item = load_item(&state, group.id, item_id).await?;

    if item.store_id.is_none() {
        ensure_template_deletable(state.pool(), OverrideKind::OptionItem, item_id.as_i32())
            .await?;
    }

    OptionItemRepository::new(state.pool()).delete(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a group, treating out-of-scope exactly like missing.
async fn load_visible(
    state: &AppState,
    scope: &AccessScope,
    id: OptionGroupId,
) -> Result<OptionGroup, AppError> {
    OptionGroupRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|group| scope.can_read(group.owner))
        .ok_or_else(|| AppError::not_found(format!("option group {id}")))
}

/// Load a group for a write: invisible is not-found, read-only is
/// forbidden.
async fn load_writable(
    state: &AppState,
    scope: &AccessScope,
    id: OptionGroupId,
) -> Result<OptionGroup, AppError> {
    let group = load_visible(state, scope, id).await?;
    if !scope.can_write(group.owner) {
        return Err(AppError::Forbidden(format!(
            "option group {id} is not writable in this scope"
        )));
    }
    Ok(group)
}

/// Load an item and verify it belongs to the given group.
async fn load_item(
    state: &AppState,
    group_id: OptionGroupId,
    item_id: OptionItemId,
) -> Result<OptionItem, AppError> {
    OptionItemRepository::new(state.pool())
        .get(item_id)
        .await?
        .filter(|item| item.option_group_id == group_id)
        .ok_or_else(|| AppError::not_found(format!("option item {item_id}")))
}
