//! Special offer management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use baladi_core::catalog::{CatalogInputError, OfferInput};
use baladi_core::{OfferId, SpecialOffer};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::checkbox;
use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

const OFFERS_TAB: &str = "/admin?tab=offers";

/// Offer form values.
#[derive(Debug, Clone)]
pub struct OfferFormView {
    pub action: String,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub title_ar: String,
    pub description_ar: String,
    pub discount: String,
    pub is_active: bool,
}

impl OfferFormView {
    fn blank() -> Self {
        Self {
            action: "/admin/offers".to_string(),
            heading: "إضافة عرض جديد",
            submit_label: "إضافة",
            title_ar: String::new(),
            description_ar: String::new(),
            discount: String::new(),
            is_active: true,
        }
    }

    fn editing(id: OfferId) -> Self {
        Self {
            action: format!("/admin/offers/{id}"),
            heading: "تعديل العرض",
            submit_label: "حفظ التعديلات",
            ..Self::blank()
        }
    }

    fn for_offer(offer: &SpecialOffer) -> Self {
        Self {
            title_ar: offer.title_ar.clone(),
            description_ar: offer.description_ar.clone().unwrap_or_default(),
            discount: offer
                .discount_percentage
                .map(|d| d.to_string())
                .unwrap_or_default(),
            is_active: offer.is_active,
            ..Self::editing(offer.id)
        }
    }

    fn with_input(self, input: &OfferFormInput) -> Self {
        Self {
            title_ar: input.title_ar.clone(),
            description_ar: input.description_ar.clone(),
            discount: input.discount_percentage.clone(),
            is_active: checkbox(input.is_active.as_deref()),
            ..self
        }
    }
}

/// Offer create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/offer_form.html")]
pub struct OfferFormTemplate {
    pub page: PageContext,
    pub form: OfferFormView,
    pub error: Option<String>,
}

/// Form input for creating/updating offers.
#[derive(Debug, Deserialize)]
pub struct OfferFormInput {
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub discount_percentage: String,
    pub is_active: Option<String>,
}

impl OfferFormInput {
    fn parse(&self) -> std::result::Result<OfferInput, CatalogInputError> {
        OfferInput::new(
            &self.title_ar,
            &self.description_ar,
            &self.discount_percentage,
            checkbox(self.is_active.as_deref()),
        )
    }
}

fn render_form(
    page: PageContext,
    form: OfferFormView,
    error: Option<String>,
    status: StatusCode,
) -> Response {
    (status, OfferFormTemplate { page, form, error }).into_response()
}

/// New offer form handler.
#[instrument(skip_all)]
pub async fn new(_admin: RequireAdmin, page: PageContext) -> Response {
    render_form(page, OfferFormView::blank(), None, StatusCode::OK)
}

/// Create offer handler.
#[instrument(skip(_admin, state, session, page))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(input): Form<OfferFormInput>,
) -> Response {
    let form = OfferFormView::blank().with_input(&input);
    let offer = match input.parse() {
        Ok(offer) => offer,
        Err(e) => {
            let error = Some(e.message_ar().to_string());
            return render_form(page, form, error, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.catalog().create_offer(&offer).await {
        Ok(created) => {
            tracing::info!(offer_id = %created.id, "Offer created");
            set_flash(&session, Flash::success("تم إضافة العرض بنجاح")).await;
            Redirect::to(OFFERS_TAB).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create offer");
            let error = Some("حدث خطأ في الإضافة".to_string());
            render_form(page, form, error, StatusCode::BAD_GATEWAY)
        }
    }
}

/// Edit offer form handler.
#[instrument(skip(_admin, state, page))]
pub async fn edit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<OfferId>,
) -> Result<Response> {
    let offer = state
        .catalog()
        .find_offer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;

    Ok(render_form(
        page,
        OfferFormView::for_offer(&offer),
        None,
        StatusCode::OK,
    ))
}

/// Update offer handler.
#[instrument(skip(_admin, state, session, page))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Path(id): Path<OfferId>,
    Form(input): Form<OfferFormInput>,
) -> Response {
    let form = OfferFormView::editing(id).with_input(&input);
    let offer = match input.parse() {
        Ok(offer) => offer,
        Err(e) => {
            let error = Some(e.message_ar().to_string());
            return render_form(page, form, error, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.catalog().update_offer(id, &offer).await {
        Ok(()) => {
            tracing::info!(offer_id = %id, "Offer updated");
            set_flash(&session, Flash::success("تم تحديث العرض بنجاح")).await;
            Redirect::to(OFFERS_TAB).into_response()
        }
        Err(e) => {
            tracing::error!(offer_id = %id, error = %e, "Failed to update offer");
            let error = Some("حدث خطأ في التحديث".to_string());
            render_form(page, form, error, StatusCode::BAD_GATEWAY)
        }
    }
}

/// Delete offer handler.
#[instrument(skip(_admin, state, session))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OfferId>,
) -> Redirect {
    match state.catalog().delete_offer(id).await {
        Ok(()) => {
            tracing::info!(offer_id = %id, "Offer deleted");
            set_flash(&session, Flash::success("تم حذف العرض")).await;
        }
        Err(e) => {
            tracing::error!(offer_id = %id, error = %e, "Failed to delete offer");
            set_flash(&session, Flash::error("حدث خطأ في الحذف")).await;
        }
    }
    Redirect::to(OFFERS_TAB)
}
