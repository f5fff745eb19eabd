//! Checkout: turn the session cart into a WhatsApp order.
//!
//! Nothing is stored server-side beyond clearing the cart; the composed
//! message is handed to the customer as a `wa.me` link.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use baladi_core::checkout::{CustomerField, checkout};
use baladi_core::{CheckoutError, CustomerInfo, PlacedOrder};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{PageContext, load_cart, save_cart};
use crate::models::Flash;
use crate::routes::cart::{CartShowTemplate, CartView, CheckoutFormView};
use crate::state::AppState;

/// Composed order display data.
#[derive(Clone)]
pub struct OrderSentView {
    pub whatsapp_url: String,
    pub total: String,
    pub item_count: u32,
}

impl From<&PlacedOrder> for OrderSentView {
    fn from(order: &PlacedOrder) -> Self {
        Self {
            whatsapp_url: order.whatsapp_url.clone(),
            total: order.total.display(),
            item_count: order.total_items,
        }
    }
}

/// Order handed off page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/sent.html")]
pub struct OrderSentTemplate {
    pub page: PageContext,
    pub order: OrderSentView,
}

/// Validate the delivery form, compose the order and clear the cart.
///
/// On failure the cart page is re-rendered with the submitted values, the
/// field errors and an error notice; the cart is left untouched.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(info): Form<CustomerInfo>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    let header = state.config().restaurant.order_header();

    match checkout(&mut cart, &info, &header) {
        Ok(order) => {
            save_cart(&session, &cart).await?;
            tracing::info!(
                total = %order.total,
                items = order.total_items,
                "Order composed"
            );
            add_breadcrumb("checkout", "Order composed", None);

            let page = PageContext {
                cart_count: 0,
                ..page
            }
            .with_flash(Flash::success("تم إرسال الطلب بنجاح!"));
            Ok(OrderSentTemplate {
                page,
                order: OrderSentView::from(&order),
            }
            .into_response())
        }
        Err(err) => {
            tracing::debug!(error = %err, "Checkout rejected");
            let form = form_with_errors(info, &err);
            let template = CartShowTemplate {
                page: page.with_flash(Flash::error(err.message_ar())),
                cart: CartView::from(&cart),
                form,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

fn form_with_errors(info: CustomerInfo, err: &CheckoutError) -> CheckoutFormView {
    let field_error = |field| match err {
        CheckoutError::Invalid(errors) => errors.get(field),
        CheckoutError::EmptyCart => None,
    };

    CheckoutFormView {
        name_error: field_error(CustomerField::Name),
        phone_error: field_error(CustomerField::Phone),
        address_error: field_error(CustomerField::Address),
        name: info.name,
        phone: info.phone,
        address: info.address,
    }
}
