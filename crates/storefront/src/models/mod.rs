//! Types stored in the session.

pub mod session;

pub use session::{Flash, FlashKind, keys as session_keys};
