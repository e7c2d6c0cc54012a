//! Store-override route handlers.
//!
//! Overrides belong to the calling store admin's own store; the store must
//! be a franchise, and the referenced template must belong to the store's
//! brand. The upsert is idempotent by natural key.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::overrides::{OverrideKey, OverrideKind, StoreOverride};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{
    BrandId, CategoryId, OptionGroupId, OptionItemId, Owner, ProductId, StoreId,
};

use crate::db::overrides::OverrideInput;
use crate::db::{
    CategoryRepository, OptionGroupRepository, OptionItemRepository, OverrideRepository,
    ProductRepository,
};
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/overrides", put(upsert).get(list))
        .route(
            "/api/overrides/{kind}/{template_item_id}",
            get(detail).delete(remove),
        )
}

#[derive(Debug, Deserialize)]
struct OverridePayload {
    kind: OverrideKind,
    template_item_id: i32,
    local_price: Option<Decimal>,
    local_available: Option<bool>,
    #[serde(default = "default_active")]
    active_in_store: bool,
    local_name: Option<String>,
    local_display_order: Option<i32>,
}

const fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    kind: Option<OverrideKind>,
}

/// The calling store and its brand; overrides exist only for franchise
/// store admins.
fn franchise_store(scope: &AccessScope) -> Result<(StoreId, BrandId), AppError> {
    match *scope {
        AccessScope::Store {
            store_id,
            brand_id: Some(brand_id),
        } => Ok((store_id, brand_id)),
        AccessScope::Store { brand_id: None, .. } => Err(AppError::Validation(
            "an independent store has no template layer to override".into(),
        )),
        _ => Err(AppError::Forbidden(
            "overrides are managed by store admins".into(),
        )),
    }
}

#[instrument(skip(state, identity, payload))]
async fn upsert(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<OverridePayload>,
) -> Result<Json<StoreOverride>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let (store_id, brand_id) = franchise_store(&scope)?;

    if payload.local_price.is_some_and(|price| price < Decimal::ZERO) {
        return Err(AppError::Validation("local price must not be negative".into()));
    }
    if payload
        .local_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::Validation("local name must not be blank".into()));
    }
    check_template(&state, payload.kind, payload.template_item_id, brand_id).await?;

    let key = OverrideKey {
        store_id,
        kind: payload.kind,
        template_item_id: payload.template_item_id,
    };
    let input = OverrideInput {
        local_price: payload.local_price,
        local_available: payload.local_available,
        active_in_store: payload.active_in_store,
        local_name: payload.local_name,
        local_display_order: payload.local_display_order,
    };

    let saved = OverrideRepository::new(state.pool()).upsert(key, &input).await?;
    Ok(Json(saved))
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StoreOverride>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let (store_id, _) = franchise_store(&scope)?;

    let overrides = OverrideRepository::new(state.pool())
        .list(store_id, query.kind)
        .await?;
    Ok(Json(overrides))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path((kind, template_item_id)): Path<(String, i32)>,
) -> Result<Json<StoreOverride>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let (store_id, _) = franchise_store(&scope)?;
    let kind = parse_kind(&kind)?;

    let key = OverrideKey {
        store_id,
        kind,
        template_item_id,
    };
    let found = OverrideRepository::new(state.pool())
        .get(key)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("override {kind}/{template_item_id}"))
        })?;
    Ok(Json(found))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path((kind, template_item_id)): Path<(String, i32)>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let (store_id, _) = franchise_store(&scope)?;
    let kind = parse_kind(&kind)?;

    let key = OverrideKey {
        store_id,
        kind,
        template_item_id,
    };
    OverrideRepository::new(state.pool()).delete(key).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_kind(raw: &str) -> Result<OverrideKind, AppError> {
    OverrideKind::from_str(raw).map_err(AppError::Validation)
}

/// Verify the override target is a template of the store's own brand.
///
/// A template of another brand is indistinguishable from a missing one.
async fn check_template(
    state: &AppState,
    kind: OverrideKind,
    template_item_id: i32,
    brand_id: BrandId,
) -> Result<(), AppError> {
    let expected = Owner::BrandTemplate(brand_id);
    let found = match kind {
        OverrideKind::Product => ProductRepository::new(state.pool())
            .get(ProductId::new(template_item_id))
            .await?
            .is_some_and(|product| product.owner == expected),
        OverrideKind::Category => CategoryRepository::new(state.pool())
            .get(CategoryId::new(template_item_id))
            .await?
            .is_some_and(|category| category.owner == expected),
        OverrideKind::OptionGroup => OptionGroupRepository::new(state.pool())
            .get(OptionGroupId::new(template_item_id))
            .await?
            .is_some_and(|group| group.owner == expected),
        OverrideKind::OptionItem => {
            // An item is a template exactly when its parent group is.
            match OptionItemRepository::new(state.pool())
                .get(OptionItemId::new(template_item_id))
                .await?
            {
                Some(item) if item.store_id.is_none() => {
                    OptionGroupRepository::new(state.pool())
                        .get(item.option_group_id)
                        .await?
                        .is_some_and(|group| group.owner == expected)
                }
                _ => false,
            }
        }
    };

    if found {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "template item {kind}/{template_item_id}"
        )))
    }
}
