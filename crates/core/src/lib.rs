//! Baladi Core - Domain types and ordering logic.
//!
//! This crate provides the pieces of the Baladi storefront that have no I/O:
//! - `storefront` - Public menu, cart and admin panel (axum)
//! - `cli` - Command-line tools for seeding the hosted backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no HTTP clients,
//! no sessions, no backend access. The storefront loads and stores these
//! values; the rules about them live here.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids and the non-negative [`Price`]
//! - [`catalog`] - Products, categories, special offers and the menu projection
//! - [`cart`] - The per-session cart store
//! - [`checkout`] - Customer validation and WhatsApp order composition

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod types;

pub use cart::{Cart, CartLine};
pub use catalog::{CatalogSection, CatalogSnapshot, Category, Product, SpecialOffer};
pub use checkout::{CheckoutError, CustomerInfo, OrderHeader, PlacedOrder, ValidationErrors};
pub use types::*;
