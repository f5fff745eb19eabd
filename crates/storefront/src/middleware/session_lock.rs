//! Per-session request serialization.
//!
//! tower-sessions loads the record when a handler first touches it and
//! writes the whole record back once the response is ready. Two requests
//! on the same session that overlap would each save their own copy and the
//! later save would drop the other's cart change. This layer sits outside
//! the session layer and lets only one request per session cookie through
//! at a time, so every request reads what the previous one wrote.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::Response;
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

const LOCK_IDLE: Duration = Duration::from_secs(10 * 60);

/// One mutex per live session id, dropped after the session goes idle.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder().time_to_idle(LOCK_IDLE).build(),
        }
    }

    async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .get_with(session_id.to_owned(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

/// Middleware that runs requests carrying the same session cookie one at a
/// time. Requests without a session and static assets pass straight through.
pub async fn serialize_session_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path.starts_with("/static/") || path.starts_with("/health") {
        return next.run(request).await;
    }
    let Some(session_id) = session_cookie(&request) else {
        return next.run(request).await;
    };

    let lock = state.session_locks().lock_for(&session_id).await;
    let _guard = lock.lock_owned().await;
    next.run(request).await
}

fn session_cookie(request: &Request) -> Option<String> {
    request
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn with_cookie(cookie: &str) -> Request {
        Request::builder()
            .uri("/cart")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let request = with_cookie("theme=dark; baladi_session=abc123; lang=ar");
        assert_eq!(session_cookie(&request).as_deref(), Some("abc123"));
    }

    #[test]
    fn no_session_cookie_means_no_lock() {
        assert_eq!(session_cookie(&with_cookie("theme=dark")), None);
        assert_eq!(session_cookie(&with_cookie("baladi_session=")), None);
    }

    #[tokio::test]
    async fn same_session_shares_one_lock() {
        let locks = SessionLocks::new();
        let first = locks.lock_for("abc").await;
        let again = locks.lock_for("abc").await;
        let other = locks.lock_for("xyz").await;
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
