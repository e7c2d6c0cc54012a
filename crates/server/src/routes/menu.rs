//! Public menu route handlers. Anonymous; no identity headers.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;

use menuforge_core::resolve::{EffectiveCategory, EffectiveOptionGroup, EffectiveProduct};
use menuforge_core::types::{CategoryId, ProductId, StoreId};

use crate::error::AppError;
use crate::services::menu;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu/{store_id}/categories", get(categories))
        .route("/menu/{store_id}/products", get(products))
        .route(
            "/menu/{store_id}/products/{product_id}/options",
            get(product_options),
        )
}

#[derive(Debug, Deserialize)]
struct ProductsQuery {
    category_id: Option<CategoryId>,
}

#[instrument(skip(state))]
async fn categories(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<EffectiveCategory>>, AppError> {
    let categories = menu::menu_categories(state.pool(), store_id).await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
async fn products(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<EffectiveProduct>>, AppError> {
    let products = menu::menu_products(state.pool(), store_id, query.category_id).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
async fn product_options(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<Vec<EffectiveOptionGroup>>, AppError> {
    let groups = menu::product_options(state.pool(), store_id, product_id).await?;
    Ok(Json(groups))
}
