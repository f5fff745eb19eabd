//! Checkout: customer validation and WhatsApp order composition.
//!
//! An order is never stored anywhere. Checkout validates the delivery
//! details, renders the cart into a text message, builds a `wa.me` deep link
//! carrying that text, and empties the cart. Delivery of the message is up to
//! the customer's messaging app.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{CURRENCY_LABEL, Price};

/// Name length bounds, in characters after trimming.
pub const NAME_LEN: (usize, usize) = (2, 100);
/// Phone length bounds. Only the length is checked, not the digits.
pub const PHONE_LEN: (usize, usize) = (11, 15);
/// Address length bounds.
pub const ADDRESS_LEN: (usize, usize) = (10, 500);

/// Base of the messaging deep link.
pub const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// A delivery-form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Name,
    Phone,
    Address,
}

impl CustomerField {
    /// Form field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

/// Field → message mapping for a rejected delivery form.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("invalid customer info: {}", format_fields(.0))]
pub struct ValidationErrors(BTreeMap<CustomerField, &'static str>);

impl ValidationErrors {
    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn get(&self, field: CustomerField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Failed fields in form order.
    pub fn fields(&self) -> impl Iterator<Item = CustomerField> + '_ {
        self.0.keys().copied()
    }

    fn insert(&mut self, field: CustomerField, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }
}

fn format_fields(errors: &BTreeMap<CustomerField, &'static str>) -> String {
    errors
        .keys()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw delivery details as typed into the cart form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Delivery details that passed validation (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl CustomerInfo {
    /// Check field lengths.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its Arabic message.
    pub fn validate(&self) -> Result<ValidatedCustomer, ValidationErrors> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        let address = self.address.trim();

        let mut errors = ValidationErrors::default();
        check_len(
            &mut errors,
            CustomerField::Name,
            name,
            NAME_LEN,
            "الاسم يجب أن يكون حرفين على الأقل",
            "الاسم طويل جداً",
        );
        check_len(
            &mut errors,
            CustomerField::Phone,
            phone,
            PHONE_LEN,
            "رقم الهاتف غير صحيح",
            "رقم الهاتف غير صحيح",
        );
        check_len(
            &mut errors,
            CustomerField::Address,
            address,
            ADDRESS_LEN,
            "العنوان يجب أن يكون 10 أحرف على الأقل",
            "العنوان طويل جداً",
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedCustomer {
            name: name.to_owned(),
            phone: phone.to_owned(),
            address: address.to_owned(),
        })
    }
}

fn check_len(
    errors: &mut ValidationErrors,
    field: CustomerField,
    value: &str,
    (min, max): (usize, usize),
    too_short: &'static str,
    too_long: &'static str,
) {
    let len = value.chars().count();
    if len < min {
        errors.insert(field, too_short);
    } else if len > max {
        errors.insert(field, too_long);
    }
}

/// Why a checkout was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// One or more delivery fields are invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,
}

impl CheckoutError {
    /// Arabic notice shown as a toast.
    #[must_use]
    pub const fn message_ar(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "يرجى التحقق من البيانات المدخلة",
            Self::EmptyCart => "السلة فارغة! أضف منتجات أولاً",
        }
    }
}

/// Where the order goes and how it is headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHeader {
    /// Restaurant name in the message title.
    pub restaurant_name: String,
    /// International number without `+`, e.g. `201025500588`.
    pub whatsapp_number: String,
}

/// A composed order, ready to hand off to the messaging app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub message: String,
    pub whatsapp_url: String,
    pub total: Price,
    pub total_items: u32,
}

/// Render the order text for `cart` and `customer`.
#[must_use]
pub fn compose_message(cart: &Cart, customer: &ValidatedCustomer, header: &OrderHeader) -> String {
    let lines = cart
        .lines()
        .iter()
        .map(|line| {
            format!(
                "{} × {} = {} {CURRENCY_LABEL}",
                line.name_ar,
                line.quantity,
                line.line_total()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut message = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        message,
        "🍔 *طلب جديد من {}*\n\n\
         👤 *الاسم:* {}\n\
         📱 *الهاتف:* {}\n\
         📍 *العنوان:* {}\n\n\
         🛒 *الطلب:*\n{}\n\n\
         💰 *الإجمالي:* {} {CURRENCY_LABEL}",
        header.restaurant_name,
        customer.name,
        customer.phone,
        customer.address,
        lines,
        cart.total_price(),
    );
    message
}

/// `https://wa.me/<number>?text=<url-encoded text>`.
#[must_use]
pub fn whatsapp_url(number: &str, text: &str) -> String {
    format!("{WHATSAPP_BASE_URL}{number}?text={}", urlencoding::encode(text))
}

/// Validate, compose and clear.
///
/// Validation runs first, then the empty-cart check; on either failure the
/// cart is left untouched. On success the cart is emptied.
///
/// # Errors
///
/// Returns [`CheckoutError::Invalid`] for bad delivery details and
/// [`CheckoutError::EmptyCart`] when there is nothing to order.
pub fn checkout(
    cart: &mut Cart,
    info: &CustomerInfo,
    header: &OrderHeader,
) -> Result<PlacedOrder, CheckoutError> {
    let customer = info.validate()?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let message = compose_message(cart, &customer, header);
    let order = PlacedOrder {
        whatsapp_url: whatsapp_url(&header.whatsapp_number, &message),
        message,
        total: cart.total_price(),
        total_items: cart.total_items(),
    };
    cart.clear();
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::types::ProductId;

    fn header() -> OrderHeader {
        OrderHeader {
            restaurant_name: "جريمة بلدي".to_string(),
            whatsapp_number: "201025500588".to_string(),
        }
    }

    fn burger() -> Product {
        Product {
            id: ProductId::random(),
            name_ar: "Burger".to_string(),
            description_ar: None,
            price: Price::parse("50.00").unwrap(),
            image_url: None,
            is_featured: false,
            is_available: true,
            category_id: None,
            created_at: None,
        }
    }

    fn valid_customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ali Hassan".to_string(),
            phone: "01012345678".to_string(),
            address: "1234567890 Main St".to_string(),
        }
    }

    #[test]
    fn burger_order_goes_through_and_clears_cart() {
        let burger = burger();
        let mut cart = Cart::new();
        cart.add(&burger);
        cart.add(&burger);

        let order = checkout(&mut cart, &valid_customer(), &header()).unwrap();

        assert_eq!(order.total.to_string(), "100.00");
        assert_eq!(order.total_items, 2);
        assert!(order.message.contains("Burger × 2 = 100.00 ج.م"));
        assert!(order.message.contains("💰 *الإجمالي:* 100.00 ج.م"));
        assert!(order.message.starts_with("🍔 *طلب جديد من جريمة بلدي*\n\n"));
        assert!(cart.is_empty());
    }

    #[test]
    fn message_layout() {
        let mut cart = Cart::new();
        cart.add(&burger());
        let customer = valid_customer().validate().unwrap();

        let message = compose_message(&cart, &customer, &header());
        let expected = "🍔 *طلب جديد من جريمة بلدي*\n\n\
                        👤 *الاسم:* Ali Hassan\n\
                        📱 *الهاتف:* 01012345678\n\
                        📍 *العنوان:* 1234567890 Main St\n\n\
                        🛒 *الطلب:*\nBurger × 1 = 50.00 ج.م\n\n\
                        💰 *الإجمالي:* 50.00 ج.م";
        assert_eq!(message, expected);
    }

    #[test]
    fn url_is_percent_encoded() {
        let url = whatsapp_url("201025500588", "a b\n*c*&");
        assert_eq!(url, "https://wa.me/201025500588?text=a%20b%0A%2Ac%2A%26");
    }

    #[test]
    fn empty_cart_is_rejected_without_side_effects() {
        let mut cart = Cart::new();
        let info = valid_customer();
        let result = checkout(&mut cart, &info, &header());
        assert_eq!(result, Err(CheckoutError::EmptyCart));
        assert!(cart.is_empty());
        assert_eq!(info, valid_customer());
    }

    #[test]
    fn short_name_fails_before_anything_is_composed() {
        let mut cart = Cart::new();
        cart.add(&burger());
        let before = cart.clone();

        let info = CustomerInfo {
            name: "A".to_string(),
            ..valid_customer()
        };
        let Err(CheckoutError::Invalid(errors)) = checkout(&mut cart, &info, &header()) else {
            panic!("expected validation failure");
        };

        assert_eq!(
            errors.get(CustomerField::Name),
            Some("الاسم يجب أن يكون حرفين على الأقل")
        );
        assert_eq!(errors.fields().count(), 1);
        assert_eq!(cart, before);
    }

    #[test]
    fn validation_reports_every_bad_field() {
        let info = CustomerInfo {
            name: " ".to_string(),
            phone: "0101".to_string(),
            address: "short".to_string(),
        };
        let errors = info.validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            [
                CustomerField::Name,
                CustomerField::Phone,
                CustomerField::Address
            ]
        );
    }

    #[test]
    fn validation_trims_and_counts_characters() {
        let info = CustomerInfo {
            name: "  علي  ".to_string(),
            phone: " 01012345678 ".to_string(),
            address: "شارع النيل، القاهرة".to_string(),
        };
        let customer = info.validate().unwrap();
        assert_eq!(customer.name, "علي");
        assert_eq!(customer.phone, "01012345678");
    }

    #[test]
    fn phone_checks_length_only() {
        let info = CustomerInfo {
            phone: "abcdefghijk".to_string(),
            ..valid_customer()
        };
        assert!(info.validate().is_ok());

        let info = CustomerInfo {
            phone: "0101234567890123".to_string(),
            ..valid_customer()
        };
        assert_eq!(
            info.validate().unwrap_err().get(CustomerField::Phone),
            Some("رقم الهاتف غير صحيح")
        );
    }

    #[test]
    fn upper_bounds_are_enforced() {
        let info = CustomerInfo {
            name: "ا".repeat(101),
            address: "ب".repeat(501),
            ..valid_customer()
        };
        let errors = info.validate().unwrap_err();
        assert_eq!(errors.get(CustomerField::Name), Some("الاسم طويل جداً"));
        assert_eq!(errors.get(CustomerField::Address), Some("العنوان طويل جداً"));
    }
}
