//! Settings page: restaurant contact details and the admin login form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::RestaurantProfile;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{PageContext, is_admin, set_admin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Admin login form data.
#[derive(Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub password: String,
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub page: PageContext,
    pub restaurant: RestaurantProfile,
    pub whatsapp_url: String,
    pub is_admin: bool,
}

/// Display the settings page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
) -> impl IntoResponse {
    let restaurant = state.config().restaurant.clone();
    SettingsTemplate {
        page,
        whatsapp_url: format!("https://wa.me/{}", restaurant.whatsapp_number),
        restaurant,
        is_admin: is_admin(&session).await,
    }
}

/// Check the admin password and set the session flag.
///
/// This is a convenience gate, not authentication: the password is compared
/// as plain text and nothing is rate limited.
#[instrument(skip_all)]
pub async fn admin_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdminLoginForm>,
) -> Result<Response> {
    if form.password != state.config().admin_password.expose_secret() {
        tracing::warn!("Admin login failed");
        set_flash(&session, Flash::error("كلمة المرور غير صحيحة")).await;
        return Ok(Redirect::to("/settings").into_response());
    }

    set_admin(&session).await?;
    add_breadcrumb("admin", "Admin login", None);
    tracing::info!("Admin login succeeded");
    set_flash(&session, Flash::success("تم تسجيل الدخول بنجاح!")).await;
    Ok(Redirect::to("/admin").into_response())
}
