//! Admin gate extractor.
//!
//! The gate is a session flag set after a plain password comparison on the
//! settings page. It keeps casual visitors out of the panel; it does not
//! authenticate anyone.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::session::set_flash;
use crate::models::{Flash, session_keys};

/// Notice shown when the gate turns someone away.
pub const LOGIN_REQUIRED: &str = "يجب تسجيل الدخول أولاً";

/// Extractor that requires the admin flag in the session.
///
/// Without it, queues a flash notice and redirects to `/settings`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(_admin: RequireAdmin) -> impl IntoResponse {
///     "admin only"
/// }
/// ```
pub struct RequireAdmin;

/// Error returned when the admin flag is missing.
pub enum AdminRejection {
    /// Redirect to the settings page, where the login form lives.
    RedirectToSettings,
    /// No session layer in the stack.
    MissingSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSettings => Redirect::to("/settings").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection::MissingSession)?;

        if is_admin(session).await {
            return Ok(Self);
        }

        tracing::debug!(path = %parts.uri.path(), "Admin gate rejected request");
        set_flash(session, Flash::error(LOGIN_REQUIRED)).await;
        Err(AdminRejection::RedirectToSettings)
    }
}

/// Whether the session carries the admin flag.
pub async fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>(session_keys::ADMIN_AUTH)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Set the admin flag.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn set_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ADMIN_AUTH, true).await
}

/// Clear the admin flag.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn clear_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<bool>(session_keys::ADMIN_AUTH).await?;
    Ok(())
}
