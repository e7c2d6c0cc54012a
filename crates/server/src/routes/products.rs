//! Product route handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::catalog::{
    Product, ValidationError, category_allowed_for, validate_name, validate_price,
};
use menuforge_core::overrides::OverrideKind;
use menuforge_core::resolve::{EffectiveProduct, MenuView, resolve_product};
use menuforge_core::scope::AccessScope;
use menuforge_core::types::{BrandId, CategoryId, Owner, ProductId};

use crate::db::products::ProductInput;
use crate::db::{CategoryRepository, OverrideRepository, ProductRepository, StoreRepository};
use crate::error::AppError;
use crate::middleware::RequireIdentity;
use crate::services::catalog::{ensure_template_deletable, list_products};
use crate::services::scope::resolve_scope;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", get(detail).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
struct ProductPayload {
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    #[serde(default = "default_available")]
    available: bool,
    category_id: Option<CategoryId>,
    /// Explicit target context; required for super admins.
    owner: Option<Owner>,
}

const fn default_available() -> bool {
    true
}

impl ProductPayload {
    fn input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            available: self.available,
            category_id: self.category_id,
        }
    }
}

#[instrument(skip(state, identity))]
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EffectiveProduct>>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let products = list_products(state.pool(), &scope, query.category_id).await?;
    Ok(Json(products))
}

#[instrument(skip(state, identity))]
async fn detail(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<ProductId>,
) -> Result<Json<EffectiveProduct>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let product = load_visible(&state, &scope, id).await?;

    // A store admin sees templates through their own override layer.
    let ov = match (&scope, product.owner) {
        (AccessScope::Store { store_id, .. }, Owner::BrandTemplate(_)) => {
            OverrideRepository::new(state.pool())
                .get(menuforge_core::overrides::OverrideKey {
                    store_id: *store_id,
                    kind: OverrideKind::Product,
                    template_item_id: id.as_i32(),
                })
                .await?
        }
        _ => None,
    };

    let effective = resolve_product(&product, ov.as_ref(), MenuView::Admin)
        .ok_or_else(|| AppError::Internal("admin view never suppresses".into()))?;
    Ok(Json(effective))
}

#[instrument(skip(state, identity, payload))]
async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    validate_name(&payload.name)?;
    validate_price(payload.price)?;
    let owner = scope.write_owner(payload.owner)?;
    check_category(&state, &scope, owner, payload.category_id).await?;

    let product = ProductRepository::new(state.pool())
        .create(&payload.input(), owner)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, identity, payload))]
async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let product = load_visible(&state, &scope, id).await?;
    if !scope.can_write(product.owner) {
        return Err(AppError::Forbidden(format!(
            "product {id} is not writable in this scope"
        )));
    }
    validate_name(&payload.name)?;
    validate_price(payload.price)?;
    if payload.owner.is_some_and(|owner| owner != product.owner) {
        return Err(AppError::Validation(
            "a product's ownership cannot change".into(),
        ));
    }
    check_category(&state, &scope, product.owner, payload.category_id).await?;

    let product = ProductRepository::new(state.pool())
        .update(id, &payload.input())
        .await?;
    Ok(Json(product))
}

#[instrument(skip(state, identity))]
async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    let scope = resolve_scope(state.pool(), identity).await?;
    let product = load_visible(&state, &scope, id).await?;
    if !scope.can_write(product.owner) {
        return Err(AppError::Forbidden(format!(
            "product {id} is not writable in this scope"
        )));
    }
    if product.owner.is_template() {
        ensure_template_deletable(state.pool(), OverrideKind::Product, id.as_i32()).await?;
    }

    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a product, treating out-of-scope exactly like missing.
async fn load_visible(
    state: &AppState,
    scope: &AccessScope,
    id: ProductId,
) -> Result<Product, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|product| scope.can_read(product.owner))
        .ok_or_else(|| AppError::not_found(format!("product {id}")))
}

/// Verify a category reference is visible and compatible with the
/// product's ownership context.
async fn check_category(
    state: &AppState,
    scope: &AccessScope,
    owner: Owner,
    category_id: Option<CategoryId>,
) -> Result<(), AppError> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let category = CategoryRepository::new(state.pool())
        .get(category_id)
        .await?
        .filter(|category| scope.can_read(category.owner))
        .ok_or_else(|| AppError::not_found(format!("category {category_id}")))?;

    let store_brand = store_brand_of(state, owner).await?;
    if !category_allowed_for(owner, store_brand, &category) {
        return Err(ValidationError::IncompatibleCategory.into());
    }
    Ok(())
}

/// The brand of the owning store, for compatibility checks on store-owned
/// items.
async fn store_brand_of(state: &AppState, owner: Owner) -> Result<Option<BrandId>, AppError> {
    match owner {
        Owner::StoreOwned(store_id) => {
            Ok(StoreRepository::new(state.pool()).brand_of(store_id).await?)
        }
        Owner::BrandTemplate(_) => Ok(None),
    }
}
