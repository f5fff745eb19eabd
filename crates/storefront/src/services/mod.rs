//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`catalog`] - Typed, cached access to products, categories and offers

pub mod catalog;

pub use catalog::CatalogService;
