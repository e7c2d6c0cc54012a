//! Category route handlers, including option-group link reconciliation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use menuforge_core::catalog::{Category, validate_name};
use menuforge_core::overrides::OverrideKind;
use menuforge_core::reconcile::ReconcileOutcome;
use menuforge_core::resolve::EffectiveCategory;
use menuforge_core::types::{CategoryId, OptionGroupId, Owner};

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::catalog::{ensure_template_deletable, list_categories};
use crate::services::links::{create_category_with_links, update_category_with_links};
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list).post(create))
        .route(
            "/api/categories/{id}",
            get(detail).put(update).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    name: String,
    #[serde(default)]
    display_order: i32,
    /// Explicit target context; required for super admins, defaulted to the
    /// caller's own context otherwise.
    owner: Option<Owner>,
    /// Desired option-group link set. Omitted means "leave links alone".
    option_group_ids: Option<Vec<OptionGroupId>>,
}

#[derive(Debug, Serialize)]
struct CategoryResponse {
    #[serde(flatten)]
    category: Category,
    option_group_ids: Vec<OptionGroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reconcile: Option<ReconcileOutcome>,
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<EffectiveCategory>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    Ok(Json(list_categories(state.pool(), &scope).await?))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let category = load_visible(&state, &scope, id).await?;

    let option_group_ids =
        CategoryRepository::linked_group_ids(state.pool(), category.id).await?;
    Ok(Json(CategoryResponse {
        category,
        option_group_ids,
        reconcile: None,
    }))
}

#[instrument(skip(state, identity, payload))]
async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    validate_name(&payload.name)?;
    let owner = scope.write_owner(payload.owner)?;

    let desired = payload.option_group_ids.unwrap_or_default();
    let (category, outcome) = create_category_with_links(
        state.pool(),
        &scope,
        owner,
        &payload.name,
        payload.display_order,
        &desired,
    )
    .await?;

    let option_group_ids =
        CategoryRepository::linked_group_ids(state.pool(), category.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            category,
            option_group_ids,
            reconcile: Some(outcome),
        }),
    ))
}

#[instrument(skip(state, identity, payload))]
async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<CategoryId>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<CategoryResponse>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let category = load_visible(&state, &scope, id).await?;
    if !scope.can_write(category.owner) {
        return Err(AppError::Forbidden(format!(
            "category {id} is not writable in this scope"
        )));
    }
    validate_name(&payload.name)?;
    if payload.owner.is_some_and(|owner| owner != category.owner) {
        return Err(AppError::Validation(
            "a category's ownership cannot change".into(),
        ));
    }

    // An omitted link set leaves the current links untouched.
    let desired = match payload.option_group_ids {
        Some(ids) => ids,
        None => CategoryRepository::linked_group_ids(state.pool(), category.id).await?,
    };

    let (category, outcome) = update_category_with_links(
        state.pool(),
        &scope,
        &category,
        &payload.name,
        payload.display_order,
        &desired,
    )
    .await?;

    let option_group_ids =
        CategoryRepository::linked_group_ids(state.pool(), category.id).await?;
    Ok(Json(CategoryResponse {
        category,
        option_group_ids,
        reconcile: Some(outcome),
    }))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let category = load_visible(&state, &scope, id).await?;
    if !scope.can_write(category.owner) {
        return Err(AppError::Forbidden(format!(
            "category {id} is not writable in this scope"
        )));
    }
    if category.owner.is_template() {
        ensure_template_deletable(state.pool(), OverrideKind::Category, id.as_i32()).await?;
    }

    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a category, treating out-of-scope exactly like missing.
async fn load_visible(
    state: &AppState,
    scope: &menuforge_core::scope::AccessScope,
    id: CategoryId,
) -> Result<Category, AppError> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|category| scope.can_read(category.owner))
        .ok_or_else(|| AppError::not_found(format!("category {id}")))
}
