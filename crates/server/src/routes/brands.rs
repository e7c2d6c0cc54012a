//! Brand management route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::catalog::{Brand, validate_name};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::BrandId;

use crate::db::BrandRepository;
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/brands", get(list).post(create))
        .route("/api/brands/{id}", get(detail).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct BrandPayload {
    name: String,
    logo_url: Option<String>,
}

/// Whether the caller may see this brand at all.
fn brand_visible(scope: &AccessScope, id: BrandId) -> bool {
    matches!(scope, AccessScope::Unrestricted) || scope.template_brand() == Some(id)
}

fn require_super_admin(scope: &AccessScope) -> Result<(), AppError> {
    if matches!(scope, AccessScope::Unrestricted) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "brand management requires the super admin role".into(),
        ))
    }
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<Brand>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let repo = BrandRepository::new(state.pool());

    let brands = match scope {
        AccessScope::Unrestricted => repo.list_all().await?,
        _ => match scope.template_brand() {
            Some(brand_id) => repo.get(brand_id).await?.into_iter().collect(),
            None => Vec::new(),
        },
    };
    Ok(Json(brands))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<BrandId>,
) -> Result<Json<Brand>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    if !brand_visible(&scope, id) {
        return Err(AppError::not_found(format!("brand {id}")));
    }

    let brand = BrandRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("brand {id}")))?;
    Ok(Json(brand))
}

#[instrument(skip(state, identity, payload))]
async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<BrandPayload>,
) -> Result<(StatusCode, Json<Brand>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    require_super_admin(&scope)?;
    validate_name(&payload.name)?;

    let brand = BrandRepository::new(state.pool())
        .create(&payload.name, payload.logo_url.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

#[instrument(skip(state, identity, payload))]
async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<BrandId>,
    Json(payload): Json<BrandPayload>,
) -> Result<Json<Brand>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    require_super_admin(&scope)?;
    validate_name(&payload.name)?;

    let brand = BrandRepository::new(state.pool())
        .update(id, &payload.name, payload.logo_url.as_deref())
        .await?;
    Ok(Json(brand))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<BrandId>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    require_super_admin(&scope)?;

    // Templates cascade with the brand; stores survive and become
    // independent.
    BrandRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
