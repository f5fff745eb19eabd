//! The per-session cart store.
//!
//! A [`Cart`] is a plain owned value: the storefront loads it from the
//! session, applies one operation, and stores it back. Every operation is
//! total; there is nothing to fail.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// One product-and-quantity entry in the active order.
///
/// Name, price and image are copied from the product when the line is
/// created, so later menu edits do not change what the customer sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name_ar: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for this product, or appends a new line
    /// with quantity 1 and a snapshot of the product's name, price and image.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id,
            name_ar: product.name_ar.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity: 1,
        });
    }

    /// Set the quantity of a line; zero or negative removes it.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.line_mut(id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: ProductId) {
        self.lines.retain(|line| line.product_id != id);
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities (the badge count).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(name: &str, price: &str) -> Product {
        Product {
            id: ProductId::random(),
            name_ar: name.to_string(),
            description_ar: None,
            price: Price::parse(price).unwrap(),
            image_url: Some(format!("/img/{name}.jpg")),
            is_featured: false,
            is_available: true,
            category_id: None,
            created_at: None,
        }
    }

    #[test]
    fn repeated_adds_aggregate_into_one_line() {
        let burger = product("burger", "50.00");
        let mut cart = Cart::new();
        for _ in 0..5 {
            cart.add(&burger);
        }

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Price::parse("250").unwrap());
    }

    #[test]
    fn totals_sum_across_lines() {
        let burger = product("burger", "50.00");
        let fries = product("fries", "12.50");
        let mut cart = Cart::new();
        cart.add(&burger);
        cart.add(&fries);
        cart.add(&fries);

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price().to_string(), "75.00");
        let names: Vec<_> = cart.lines().iter().map(|l| l.name_ar.as_str()).collect();
        assert_eq!(names, ["burger", "fries"]);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_edits() {
        let mut burger = product("burger", "50.00");
        let mut cart = Cart::new();
        cart.add(&burger);

        burger.price = Price::parse("99").unwrap();
        burger.name_ar = "renamed".to_string();
        cart.add(&burger);

        let line = cart.line(burger.id).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.name_ar, "burger");
        assert_eq!(line.price.to_string(), "50.00");
    }

    #[test]
    fn zero_or_negative_quantity_removes_line() {
        let burger = product("burger", "50.00");
        let mut cart = Cart::new();

        cart.add(&burger);
        cart.update_quantity(burger.id, 0);
        assert!(cart.is_empty());

        cart.add(&burger);
        cart.update_quantity(burger.id, -1);
        assert!(cart.line(burger.id).is_none());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn update_sets_quantity() {
        let burger = product("burger", "50.00");
        let mut cart = Cart::new();
        cart.add(&burger);
        cart.update_quantity(burger.id, 4);
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price().to_string(), "200.00");
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let burger = product("burger", "50.00");
        let mut cart = Cart::new();
        cart.add(&burger);
        let before = cart.clone();
        cart.update_quantity(ProductId::random(), 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn remove_missing_id_leaves_cart_unchanged() {
        let burger = product("burger", "50.00");
        let mut cart = Cart::new();
        cart.add(&burger);
        let before = cart.clone();

        cart.remove(ProductId::random());
        assert_eq!(cart, before);

        cart.remove(burger.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add(&product("a", "1"));
        cart.add(&product("b", "2"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn survives_session_round_trip() {
        let mut cart = Cart::new();
        cart.add(&product("burger", "50.00"));
        let json = serde_json::to_value(&cart).unwrap();
        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }
}
