//! Admin panel route handlers.
//!
//! Every handler takes [`RequireAdmin`]; writes go through the catalog
//! service, which clears the storefront cache. Successful writes redirect to
//! the dashboard with a flash notice, failed ones re-render the form.

pub mod offers;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use baladi_core::{CatalogSnapshot, Product, SpecialOffer};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{PageContext, RequireAdmin, clear_admin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Dashboard tab selection.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

/// Product row on the dashboard.
#[derive(Debug, Clone)]
pub struct AdminProductView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub is_available: bool,
}

impl AdminProductView {
    fn new(product: &Product, snapshot: &CatalogSnapshot) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name_ar.clone(),
            description: product.description_ar.clone(),
            price: product.price.display(),
            category: product
                .category_id
                .and_then(|id| snapshot.category(id))
                .map(|c| c.name_ar.clone()),
            image_url: product.image_url.clone(),
            is_featured: product.is_featured,
            is_available: product.is_available,
        }
    }
}

/// Offer row on the dashboard.
#[derive(Debug, Clone)]
pub struct AdminOfferView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub discount: Option<u8>,
    pub is_active: bool,
}

impl From<&SpecialOffer> for AdminOfferView {
    fn from(offer: &SpecialOffer) -> Self {
        Self {
            id: offer.id.to_string(),
            title: offer.title_ar.clone(),
            description: offer.description_ar.clone(),
            discount: offer.discount_percentage,
            is_active: offer.is_active,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub offers_tab: bool,
    pub products: Vec<AdminProductView>,
    pub offers: Vec<AdminOfferView>,
    pub unavailable: Vec<&'static str>,
}

/// Admin dashboard: every product and offer, available or not.
#[instrument(skip_all)]
pub async fn dashboard(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<DashboardQuery>,
) -> impl IntoResponse {
    let snapshot = state.catalog().admin_snapshot().await;

    DashboardTemplate {
        page,
        offers_tab: query.tab.as_deref() == Some("offers"),
        products: snapshot
            .products
            .iter()
            .map(|p| AdminProductView::new(p, &snapshot))
            .collect(),
        offers: snapshot.offers.iter().map(AdminOfferView::from).collect(),
        unavailable: snapshot.unavailable.iter().map(|s| s.label_ar()).collect(),
    }
}

/// Clear the admin flag.
#[instrument(skip_all)]
pub async fn logout(_admin: RequireAdmin, session: Session) -> Result<Response> {
    clear_admin(&session).await?;
    tracing::info!("Admin logged out");
    set_flash(&session, Flash::success("تم تسجيل الخروج")).await;
    Ok(Redirect::to("/settings").into_response())
}

/// Checkbox values arrive as `on` when ticked and are absent otherwise.
pub(crate) fn checkbox(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "off" && v != "false")
}
