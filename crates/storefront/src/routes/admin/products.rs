//! Product management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use baladi_core::catalog::{CatalogInputError, ProductInput};
use baladi_core::{Category, CategoryId, Product, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::checkbox;
use crate::error::{AppError, Result};
use crate::middleware::{PageContext, RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Product form values.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    pub action: String,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub name_ar: String,
    pub description_ar: String,
    pub price: String,
    pub category_id: String,
    pub is_featured: bool,
    pub is_available: bool,
}

impl ProductFormView {
    fn blank() -> Self {
        Self {
            action: "/admin/products".to_string(),
            heading: "إضافة منتج جديد",
            submit_label: "إضافة",
            name_ar: String::new(),
            description_ar: String::new(),
            price: String::new(),
            category_id: String::new(),
            is_featured: false,
            is_available: true,
        }
    }

    fn for_product(product: &Product) -> Self {
        Self {
            action: format!("/admin/products/{}", product.id),
            heading: "تعديل المنتج",
            submit_label: "حفظ التعديلات",
            name_ar: product.name_ar.clone(),
            description_ar: product.description_ar.clone().unwrap_or_default(),
            price: product.price.to_string(),
            category_id: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            is_featured: product.is_featured,
            is_available: product.is_available,
        }
    }

    fn with_input(self, input: &ProductFormInput) -> Self {
        Self {
            name_ar: input.name_ar.clone(),
            description_ar: input.description_ar.clone(),
            price: input.price.clone(),
            category_id: input.category_id.clone(),
            is_featured: checkbox(input.is_featured.as_deref()),
            is_available: checkbox(input.is_available.as_deref()),
            ..self
        }
    }
}

/// Category choice in the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub page: PageContext,
    pub form: ProductFormView,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

/// Form input for creating/updating products.
#[derive(Debug, Deserialize)]
pub struct ProductFormInput {
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category_id: String,
    pub is_featured: Option<String>,
    pub is_available: Option<String>,
}

impl ProductFormInput {
    fn parse(&self) -> std::result::Result<ProductInput, CatalogInputError> {
        let category_id = self.category_id.trim().parse::<CategoryId>().ok();
        ProductInput::new(
            &self.name_ar,
            &self.description_ar,
            &self.price,
            category_id,
            checkbox(self.is_featured.as_deref()),
            checkbox(self.is_available.as_deref()),
        )
    }
}

/// New product form handler.
#[instrument(skip_all)]
pub async fn new(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
) -> Response {
    render_form(&state, page, ProductFormView::blank(), None, StatusCode::OK).await
}

/// Create product handler.
#[instrument(skip(_admin, state, session, page))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(input): Form<ProductFormInput>,
) -> Response {
    let form = ProductFormView::blank().with_input(&input);
    let product = match input.parse() {
        Ok(product) => product,
        Err(e) => {
            let error = Some(e.message_ar().to_string());
            return render_form(&state, page, form, error, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    match state.catalog().create_product(&product).await {
        Ok(created) => {
            tracing::info!(product_id = %created.id, "Product created");
            set_flash(&session, Flash::success("تم إضافة المنتج بنجاح")).await;
            Redirect::to("/admin").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            let error = Some("حدث خطأ في الإضافة".to_string());
            render_form(&state, page, form, error, StatusCode::BAD_GATEWAY).await
        }
    }
}

/// Edit product form handler.
#[instrument(skip(_admin, state, page))]
pub async fn edit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let form = ProductFormView::for_product(&product);
    Ok(render_form(&state, page, form, None, StatusCode::OK).await)
}

/// Update product handler.
#[instrument(skip(_admin, state, session, page))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Path(id): Path<ProductId>,
    Form(input): Form<ProductFormInput>,
) -> Response {
    let form = ProductFormView {
        action: format!("/admin/products/{id}"),
        heading: "تعديل المنتج",
        submit_label: "حفظ التعديلات",
        ..ProductFormView::blank()
    }
    .with_input(&input);

    let product = match input.parse() {
        Ok(product) => product,
        Err(e) => {
            let error = Some(e.message_ar().to_string());
            return render_form(&state, page, form, error, StatusCode::UNPROCESSABLE_ENTITY).await;
        }
    };

    match state.catalog().update_product(id, &product).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product updated");
            set_flash(&session, Flash::success("تم تحديث المنتج بنجاح")).await;
            Redirect::to("/admin").into_response()
        }
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Failed to update product");
            let error = Some("حدث خطأ في التحديث".to_string());
            render_form(&state, page, form, error, StatusCode::BAD_GATEWAY).await
        }
    }
}

/// Delete product handler.
#[instrument(skip(_admin, state, session))]
pub async fn delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Redirect {
    match state.catalog().delete_product(id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            set_flash(&session, Flash::success("تم حذف المنتج")).await;
        }
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Failed to delete product");
            set_flash(&session, Flash::error("حدث خطأ في الحذف")).await;
        }
    }
    Redirect::to("/admin")
}

async fn render_form(
    state: &AppState,
    page: PageContext,
    form: ProductFormView,
    error: Option<String>,
    status: StatusCode,
) -> Response {
    let categories = match state.catalog().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch categories for product form");
            Vec::new()
        }
    };

    let template = ProductFormTemplate {
        categories: category_options(&categories, &form.category_id),
        page,
        form,
        error,
    };
    (status, template).into_response()
}

fn category_options(categories: &[Category], selected: &str) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|category| {
            let id = category.id.to_string();
            CategoryOption {
                selected: id == selected,
                label: match &category.icon {
                    Some(icon) => format!("{icon} {}", category.name_ar),
                    None => category.name_ar.clone(),
                },
                id,
            }
        })
        .collect()
}
