//! Session-related types.
//!
//! Everything the server remembers about a browser lives in its session:
//! the cart, the admin flag and a one-shot flash notice.

use serde::{Deserialize, Serialize};

/// How a flash notice is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A toast shown once by the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier for the toast.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "toast--success",
            FlashKind::Error => "toast--error",
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the serialized `Cart`.
    pub const CART: &str = "cart";

    /// Key for the admin gate flag.
    pub const ADMIN_AUTH: &str = "admin-auth";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "flash";
}
