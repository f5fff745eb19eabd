//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Menu (?category=<id> filters the grid)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (backend round trip)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page with delivery form
//! POST /cart/add               - Add to cart (HTMX: count badge; else redirect)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Validate, compose WhatsApp order, clear cart
//!
//! # Settings
//! GET  /settings               - Restaurant info + admin login
//! POST /settings/admin-login   - Password check
//!
//! # Admin (requires admin flag)
//! GET  /admin                  - Dashboard (?tab=products|offers)
//! GET  /admin/products/new     - New product form
//! POST /admin/products         - Create product
//! GET  /admin/products/{id}/edit - Edit product form
//! POST /admin/products/{id}    - Update product
//! POST /admin/products/{id}/delete - Delete product
//! GET  /admin/offers/new       - New offer form
//! POST /admin/offers           - Create offer
//! GET  /admin/offers/{id}/edit - Edit offer form
//! POST /admin/offers/{id}      - Update offer
//! POST /admin/offers/{id}/delete - Delete offer
//! POST /admin/logout           - Clear admin flag
//! ```

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod settings;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// Whether the request was issued by HTMX.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the settings routes router.
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::show))
        .route("/admin-login", post(settings::admin_login))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/logout", post(admin::logout))
        .route("/products", post(admin::products::create))
        .route("/products/new", get(admin::products::new))
        .route("/products/{id}", post(admin::products::update))
        .route("/products/{id}/edit", get(admin::products::edit))
        .route("/products/{id}/delete", post(admin::products::delete))
        .route("/offers", post(admin::offers::create))
        .route("/offers/new", get(admin::offers::new))
        .route("/offers/{id}", post(admin::offers::update))
        .route("/offers/{id}/edit", get(admin::offers::edit))
        .route("/offers/{id}/delete", post(admin::offers::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::place_order))
        .nest("/settings", settings_routes())
        .nest("/admin", admin_routes())
}
