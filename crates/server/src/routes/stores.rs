//! Store management route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::catalog::{PromoBanner, Store, StoreAddress, validate_name};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{BrandId, StoreId};

use crate::db::stores::StoreInput;
use crate::db::{BrandRepository, StoreRepository};
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(list).post(create))
        .route("/api/stores/{id}", get(detail).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct StorePayload {
    name: String,
    logo_url: Option<String>,
    cover_url: Option<String>,
    whatsapp_phone: Option<String>,
    landline_phone: Option<String>,
    brand_id: Option<BrandId>,
    #[serde(default)]
    address: StoreAddress,
    business_hours: Option<String>,
    #[serde(default)]
    min_order_value: Decimal,
    estimated_delivery_time: Option<String>,
    #[serde(default)]
    promo_banner: PromoBanner,
    #[serde(default)]
    allow_order_notes: bool,
}

impl StorePayload {
    fn into_input(self) -> StoreInput {
        StoreInput {
            name: self.name,
            logo_url: self.logo_url,
            cover_url: self.cover_url,
            whatsapp_phone: self.whatsapp_phone,
            landline_phone: self.landline_phone,
            brand_id: self.brand_id,
            address: self.address,
            business_hours: self.business_hours,
            min_order_value: self.min_order_value,
            estimated_delivery_time: self.estimated_delivery_time,
            promo_banner: self.promo_banner,
            allow_order_notes: self.allow_order_notes,
        }
    }
}

fn require_super_admin(scope: &AccessScope) -> Result<(), AppError> {
    if matches!(scope, AccessScope::Unrestricted) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "store management requires the super admin role".into(),
        ))
    }
}

/// Reject a store payload that points at a brand that does not exist.
async fn check_brand_exists(
    state: &AppState,
    brand_id: Option<BrandId>,
) -> Result<(), AppError> {
    if let Some(brand_id) = brand_id {
        BrandRepository::new(state.pool())
            .get(brand_id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("unknown brand {brand_id}")))?;
    }
    Ok(())
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<Store>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let repo = StoreRepository::new(state.pool());

    let stores = match scope {
        AccessScope::Unrestricted => repo.list_all().await?,
        AccessScope::Store { store_id, .. } => repo.get(store_id).await?.into_iter().collect(),
        AccessScope::Brand(_) => Vec::new(),
    };
    Ok(Json(stores))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<StoreId>,
) -> Result<Json<Store>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;

    let visible = match scope {
        AccessScope::Unrestricted => true,
        AccessScope::Store { store_id, .. } => store_id == id,
        AccessScope::Brand(_) => false,
    };
    if !visible {
        return Err(AppError::not_found(format!("store {id}")));
    }

    let store = StoreRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("store {id}")))?;
    Ok(Json(store))
}

#[instrument(skip(state, identity, payload))]
async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<StorePayload>,
) -> Result<(StatusCode, Json<Store>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    require_super_admin(&scope)?;
    validate_name(&payload.name)?;
    check_brand_exists(&state, payload.brand_id).await?;

    let store = StoreRepository::new(state.pool())
        .create(&payload.into_input())
        .await?;
    Ok((StatusCode::CREATED, Json(store)))
}

#[instrument(skip(state, identity, payload))]
async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<StoreId>,
    Json(payload): Json<StorePayload>,
) -> Result<Json<Store>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;

    match scope {
        AccessScope::Unrestricted => {}
        AccessScope::Store { store_id, brand_id } if store_id == id => {
            // A store admin maintains their own store's profile but cannot
            // move it between brands.
            if payload.brand_id != brand_id {
                return Err(AppError::Forbidden(
                    "changing a store's brand requires the super admin role".into(),
                ));
            }
        }
        AccessScope::Store { .. } | AccessScope::Brand(_) => {
            return Err(AppError::not_found(format!("store {id}")));
        }
    }

    validate_name(&payload.name)?;
    check_brand_exists(&state, payload.brand_id).await?;

    let store = StoreRepository::new(state.pool())
        .update(id, &payload.into_input())
        .await?;
    Ok(Json(store))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<StoreId>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    require_super_admin(&scope)?;

    // Store-owned catalog rows and the store's overrides cascade.
    StoreRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
