//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; every handler loads it, applies one
//! operation and stores it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use baladi_core::{Cart, CartLine, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{PageContext, load_cart, save_cart, set_flash};
use crate::models::Flash;
use crate::routes::is_htmx;
use crate::state::AppState;

/// Event HTMX listens for to refresh the badge.
pub const CART_UPDATED_TRIGGER: &str = "cart-updated";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: Option<String>,
    /// Quantity submitted by the "-" button; zero removes the line.
    pub decrement_to: i64,
    pub increment_to: i64,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let quantity = i64::from(line.quantity);
        Self {
            product_id: line.product_id.to_string(),
            name: line.name_ar.clone(),
            quantity: line.quantity,
            price: line.price.display(),
            line_price: line.line_total().display(),
            image_url: line.image_url.clone(),
            decrement_to: quantity - 1,
            increment_to: quantity + 1,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            total: cart.total_price().display(),
            item_count: cart.total_items(),
        }
    }
}

/// Delivery form values and per-field errors.
#[derive(Clone, Default)]
pub struct CheckoutFormView {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub name_error: Option<&'static str>,
    pub phone_error: Option<&'static str>,
    pub address_error: Option<&'static str>,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: CheckoutFormView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Badge plus an out-of-band toast, sent after an HTMX add.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u32,
    pub flash: Flash,
}

/// Display cart page.
#[instrument(skip(session, page))]
pub async fn show(session: Session, page: PageContext) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        page,
        cart: CartView::from(&cart),
        form: CheckoutFormView::default(),
    }
}

/// Add one unit of a product.
///
/// HTMX requests get the new count badge and a `cart-updated` trigger;
/// plain form posts get a flash notice and a redirect back to the menu.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let htmx = is_htmx(&headers);
    let snapshot = state.catalog().storefront_snapshot().await;

    let Some(product) = snapshot.product(form.product_id) else {
        tracing::warn!(product_id = %form.product_id, "Add to cart for unknown product");
        if htmx {
            return Ok((
                StatusCode::NOT_FOUND,
                Html("<span class=\"badge badge--error\">!</span>"),
            )
                .into_response());
        }
        set_flash(&session, Flash::error("المنتج غير متوفر حالياً")).await;
        return Ok(Redirect::to("/").into_response());
    };

    let mut cart = load_cart(&session).await;
    cart.add(product);
    save_cart(&session, &cart).await?;

    let product_id = form.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    let flash = Flash::success(format!("تم إضافة {} إلى السلة", product.name_ar));
    if htmx {
        return Ok((
            AppendHeaders([("HX-Trigger", CART_UPDATED_TRIGGER)]),
            CartAddedTemplate {
                count: cart.total_items(),
                flash,
            },
        )
            .into_response());
    }

    set_flash(&session, flash).await;
    Ok(Redirect::to("/").into_response())
}

/// Set a line's quantity; zero or below removes it.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(form.product_id, form.quantity);
    save_cart(&session, &cart).await?;

    Ok(cart_items_response(&cart, is_htmx(&headers)))
}

/// Remove a line.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;

    Ok(cart_items_response(&cart, is_htmx(&headers)))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_items(),
    }
}

fn cart_items_response(cart: &Cart, htmx: bool) -> Response {
    if !htmx {
        return Redirect::to("/cart").into_response();
    }
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_TRIGGER)]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}
