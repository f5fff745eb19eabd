//! Remote Data Client for the hosted backend.
//!
//! # Architecture
//!
//! - The backend is a PostgREST-style REST surface (as exposed by Supabase)
//!   over three tables: `products`, `categories`, `special_offers`
//! - The backend is the source of truth - NO local sync, direct calls
//! - [`RemoteData`] is the seam: table-like `select`/`insert`/`update`/`delete`
//!   with `eq`, `order` and `limit` filters, returning raw JSON rows
//! - [`SupabaseClient`] talks HTTP; [`MemoryBackend`] keeps rows in memory
//!   for tests and local runs
//!
//! Typed access (records, caching, cache invalidation) lives one level up in
//! [`crate::services::catalog`].
//!
//! # Example
//!
//! ```rust,ignore
//! use baladi_storefront::supabase::{Query, RemoteData, Table};
//!
//! let rows = client
//!     .select(Table::Products, &Query::new().eq("is_available", true))
//!     .await?;
//! ```

mod client;
mod memory;
mod query;

pub use client::SupabaseClient;
pub use memory::MemoryBackend;
pub use query::{Order, Query};

use async_trait::async_trait;
use thiserror::Error;

/// A raw backend row.
pub type Row = serde_json::Value;

/// The backend tables this application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Categories,
    SpecialOffers,
}

impl Table {
    /// Table name as used in the REST path.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::SpecialOffers => "special_offers",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured backend URL could not be extended to a table URL.
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    /// An insert returned no row.
    #[error("no row returned from {0}")]
    NoRow(Table),
}

/// Table-like async operations on the hosted backend.
///
/// Writes carry no version or precondition: last write wins.
#[async_trait]
pub trait RemoteData: Send + Sync {
    /// Rows of `table` matching `query`, in the query's order.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, BackendError>;

    /// Insert `rows` and return them as stored (with generated ids).
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, BackendError>;

    /// Merge `patch` into every row matching `query`'s filters.
    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<(), BackendError>;

    /// Delete every row matching `query`'s filters.
    async fn delete(&self, table: Table, query: &Query) -> Result<(), BackendError>;
}
