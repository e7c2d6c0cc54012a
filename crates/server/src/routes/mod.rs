//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Admin API (identity headers required)
//! GET    /api/brands                          - List visible brands
//! POST   /api/brands                          - Create brand (super admin)
//! GET    /api/brands/{id}                     - Get brand
//! PUT    /api/brands/{id}                     - Update brand (super admin)
//! DELETE /api/brands/{id}                     - Delete brand (super admin)
//!
//! GET    /api/stores                          - List visible stores
//! POST   /api/stores                          - Create store (super admin)
//! GET    /api/stores/{id}                     - Get store
//! PUT    /api/stores/{id}                     - Update store
//! DELETE /api/stores/{id}                     - Delete store (super admin)
//!
//! GET    /api/categories                      - List visible categories
//! POST   /api/categories                      - Create category + links
//! GET    /api/categories/{id}                 - Get category with linked groups
//! PUT    /api/categories/{id}                 - Update category + reconcile links
//! DELETE /api/categories/{id}                 - Delete category
//!
//! GET    /api/products?category_id=           - List (merged admin view)
//! POST   /api/products                        - Create product
//! GET    /api/products/{id}                   - Get product (merged admin view)
//! PUT    /api/products/{id}                   - Update product
//! DELETE /api/products/{id}                   - Delete product
//!
//! GET    /api/option-groups                   - List with items (merged admin view)
//! POST   /api/option-groups                   - Create option group
//! GET    /api/option-groups/{id}              - Get with items (merged admin view)
//! PUT    /api/option-groups/{id}              - Update option group
//! DELETE /api/option-groups/{id}              - Delete option group
//! GET    /api/option-groups/{id}/items        - List items
//! POST   /api/option-groups/{id}/items        - Create item
//! PUT    /api/option-groups/{id}/items/{iid}  - Update item
//! DELETE /api/option-groups/{id}/items/{iid}  - Delete item
//!
//! PUT    /api/overrides                       - Upsert override (idempotent)
//! GET    /api/overrides?kind=                 - List own store's overrides
//! GET    /api/overrides/{kind}/{template_id}  - Get override by key
//! DELETE /api/overrides/{kind}/{template_id}  - Delete override
//!
//! # Public menu API (anonymous)
//! GET /menu/{store_id}/categories
//! GET /menu/{store_id}/products?category_id=
//! GET /menu/{store_id}/products/{product_id}/options
//! ```

use axum::Router;

use crate::state::AppState;

pub mod brands;
pub mod categories;
pub mod menu;
pub mod option_groups;
pub mod overrides;
pub mod products;
pub mod stores;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(brands::router())
        .merge(stores::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(option_groups::router())
        .merge(overrides::router())
        .merge(menu::router())
}
