//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session lock (one request per session at a time)
//! 5. Session layer (tower-sessions with in-memory store)
//!
//! # Extractors
//!
//! - [`PageContext`] - layout data for full pages
//! - [`RequireAdmin`] - admin gate

pub mod admin;
pub mod page;
pub mod request_id;
pub mod session;
pub mod session_lock;

pub use admin::{RequireAdmin, clear_admin, is_admin, set_admin};
pub use page::PageContext;
pub use request_id::request_id_middleware;
pub use session_lock::{SessionLocks, serialize_session_requests};
pub use session::{create_session_layer, load_cart, save_cart, set_flash, take_flash};
