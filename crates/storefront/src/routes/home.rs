//! Home page route handler: the menu.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use baladi_core::{CatalogSnapshot, CategoryId, Product, SpecialOffer};
use serde::Deserialize;
use tracing::instrument;

use crate::middleware::PageContext;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image_url: Option<String>,
    pub is_featured: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name_ar.clone(),
            description: product.description_ar.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            is_featured: product.is_featured,
        }
    }
}

/// Offer banner display data.
#[derive(Clone)]
pub struct OfferView {
    pub title: String,
    pub description: Option<String>,
    pub discount: Option<u8>,
}

impl From<&SpecialOffer> for OfferView {
    fn from(offer: &SpecialOffer) -> Self {
        Self {
            title: offer.title_ar.clone(),
            description: offer.description_ar.clone(),
            discount: offer.discount_percentage,
        }
    }
}

/// A category filter chip.
#[derive(Clone)]
pub struct CategoryChip {
    pub href: String,
    pub label: String,
    pub selected: bool,
}

/// Menu query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

impl MenuQuery {
    /// The selected category; anything unparsable means "all".
    fn selected(&self) -> Option<CategoryId> {
        self.category.as_deref().and_then(|raw| raw.parse().ok())
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub offers: Vec<OfferView>,
    pub featured: Vec<ProductView>,
    pub all_selected: bool,
    pub categories: Vec<CategoryChip>,
    pub products: Vec<ProductView>,
    /// Arabic labels of sections that failed to load.
    pub unavailable: Vec<&'static str>,
}

impl HomeTemplate {
    /// Project a snapshot onto the menu for the selected category.
    #[must_use]
    pub fn new(page: PageContext, snapshot: &CatalogSnapshot, selected: Option<CategoryId>) -> Self {
        let categories = snapshot
            .categories
            .iter()
            .map(|category| CategoryChip {
                href: format!("/?category={}", category.id),
                label: match &category.icon {
                    Some(icon) => format!("{icon} {}", category.name_ar),
                    None => category.name_ar.clone(),
                },
                selected: selected == Some(category.id),
            })
            .collect();

        Self {
            page,
            offers: snapshot.offers.iter().map(OfferView::from).collect(),
            featured: snapshot.featured().map(ProductView::from).collect(),
            all_selected: selected.is_none(),
            categories,
            products: snapshot.in_category(selected).map(ProductView::from).collect(),
            unavailable: snapshot.unavailable.iter().map(|s| s.label_ar()).collect(),
        }
    }
}

/// Display the menu.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<MenuQuery>,
) -> impl IntoResponse {
    let snapshot = state.catalog().storefront_snapshot().await;
    HomeTemplate::new(page, &snapshot, query.selected())
}
