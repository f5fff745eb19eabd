//! Per-page context shared by every full-page template.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::middleware::session::{load_cart, take_flash};
use crate::models::Flash;
use crate::state::AppState;

/// What the layout needs: restaurant name, cart badge, pending flash and the
/// current path for the bottom navigation.
///
/// Extracting it consumes the pending flash notice.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub restaurant_name: String,
    pub cart_count: u32,
    pub flash: Option<Flash>,
    pub path: String,
}

impl PageContext {
    /// Whether the nav item for `prefix` should be highlighted.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }

    /// Replace the flash notice for this render.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let restaurant_name = state.config().restaurant.name.clone();
        // Nested routers see a stripped uri.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |uri| uri.0.path())
            .to_string();

        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                restaurant_name,
                cart_count: 0,
                flash: None,
                path,
            });
        };

        Ok(Self {
            restaurant_name,
            cart_count: load_cart(session).await.total_items(),
            flash: take_flash(session).await,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> PageContext {
        PageContext {
            restaurant_name: "جريمة بلدي".to_string(),
            cart_count: 0,
            flash: None,
            path: path.to_string(),
        }
    }

    #[test]
    fn home_is_only_active_at_root() {
        assert!(page("/").is_active("/"));
        assert!(!page("/cart").is_active("/"));
    }

    #[test]
    fn sections_match_by_prefix() {
        assert!(page("/cart").is_active("/cart"));
        assert!(page("/settings").is_active("/settings"));
        assert!(!page("/admin").is_active("/settings"));
    }
}
