//! Menu records and the storefront projection over them.
//!
//! Records mirror the rows of the hosted backend's `products`, `categories`
//! and `special_offers` tables. Unknown columns (such as the legacy English
//! `name`/`description` mirrors) are ignored on read and written by the
//! input types below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CategoryId, OfferId, Price, PriceError, ProductId};

// =============================================================================
// Records
// =============================================================================

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name_ar: String,
    #[serde(default)]
    pub description_ar: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A menu section such as "برجر" or "بيتزا".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name_ar: String,
    /// Emoji shown before the name on the filter chips.
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

/// A promotional banner, independent of product records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialOffer {
    pub id: OfferId,
    pub title_ar: String,
    #[serde(default)]
    pub description_ar: Option<String>,
    /// Rows written by older admin builds may hold fractions or values
    /// outside 0–100; they are truncated and clamped on read.
    #[serde(default, deserialize_with = "lenient_discount")]
    pub discount_percentage: Option<u8>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

fn lenient_discount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value
        .filter(|v| v.is_finite())
        .map(|v| v.trunc().clamp(0.0, 100.0))
        .filter(|v| *v > 0.0)
        // Clamped to 1..=100 above.
        .map(|v| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pct = v as u8;
            pct
        }))
}

// =============================================================================
// Write inputs
// =============================================================================

/// Errors raised while turning admin form fields into a write payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogInputError {
    /// A required text field was blank.
    #[error("{0} is required")]
    Required(&'static str),
    /// The price field was invalid.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// The discount was not between 0 and 100.
    #[error("discount must be between 0 and 100 (got {0})")]
    DiscountOutOfRange(i64),
}

impl CatalogInputError {
    /// Arabic message shown next to the admin form.
    #[must_use]
    pub const fn message_ar(&self) -> &'static str {
        match self {
            Self::Required(_) => "يرجى ملء الحقول المطلوبة",
            Self::Price(_) => "السعر غير صحيح",
            Self::DiscountOutOfRange(_) => "نسبة الخصم يجب أن تكون بين 0 و 100",
        }
    }
}

/// Insert/update payload for the `products` table.
///
/// The legacy `name`/`description` columns are always written as copies of
/// the Arabic fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name_ar: String,
    pub description_ar: Option<String>,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub is_featured: bool,
    pub is_available: bool,
    pub name: String,
    pub description: Option<String>,
}

impl ProductInput {
    /// Build a payload from raw form values.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the price is not a
    /// non-negative decimal.
    pub fn new(
        name_ar: &str,
        description_ar: &str,
        price: &str,
        category_id: Option<CategoryId>,
        is_featured: bool,
        is_available: bool,
    ) -> Result<Self, CatalogInputError> {
        let name_ar = name_ar.trim();
        if name_ar.is_empty() {
            return Err(CatalogInputError::Required("name_ar"));
        }
        if price.trim().is_empty() {
            return Err(CatalogInputError::Required("price"));
        }
        let price = Price::parse(price)?;
        let description_ar = non_blank(description_ar);

        Ok(Self {
            name_ar: name_ar.to_owned(),
            description_ar: description_ar.clone(),
            price,
            category_id,
            is_featured,
            is_available,
            name: name_ar.to_owned(),
            description: description_ar,
        })
    }
}

/// Insert/update payload for the `special_offers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferInput {
    pub title_ar: String,
    pub description_ar: Option<String>,
    pub discount_percentage: Option<u8>,
    pub is_active: bool,
    pub title: String,
    pub description: Option<String>,
}

impl OfferInput {
    /// Build a payload from raw form values.
    ///
    /// A blank, non-numeric or zero discount means "no discount" and is
    /// stored as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank or the discount is outside
    /// 0–100.
    pub fn new(
        title_ar: &str,
        description_ar: &str,
        discount_percentage: &str,
        is_active: bool,
    ) -> Result<Self, CatalogInputError> {
        let title_ar = title_ar.trim();
        if title_ar.is_empty() {
            return Err(CatalogInputError::Required("title_ar"));
        }
        let discount_percentage = parse_discount(discount_percentage)?;
        let description_ar = non_blank(description_ar);

        Ok(Self {
            title_ar: title_ar.to_owned(),
            description_ar: description_ar.clone(),
            discount_percentage,
            is_active,
            title: title_ar.to_owned(),
            description: description_ar,
        })
    }
}

fn parse_discount(raw: &str) -> Result<Option<u8>, CatalogInputError> {
    let Some(value) = leading_integer(raw) else {
        return Ok(None);
    };
    match u8::try_from(value) {
        Ok(0) => Ok(None),
        Ok(pct) if pct <= 100 => Ok(Some(pct)),
        _ => Err(CatalogInputError::DiscountOutOfRange(value)),
    }
}

/// The integer at the start of `raw`, ignoring leading whitespace and any
/// trailing text: `"12.5"` is 12, `"30 %"` is 30, `"abc"` is nothing.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude = rest.get(..end)?.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Insert payload for the `categories` table (seeding only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name_ar: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

// =============================================================================
// Snapshot
// =============================================================================

/// One of the three collections fetched for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSection {
    Products,
    Categories,
    Offers,
}

impl CatalogSection {
    /// Arabic label used in "could not load" notices.
    #[must_use]
    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Products => "القائمة",
            Self::Categories => "الأقسام",
            Self::Offers => "العروض الخاصة",
        }
    }
}

/// The three collections as fetched together for one page render.
///
/// Sections that failed to load are empty and listed in `unavailable`; the
/// others are still usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub offers: Vec<SpecialOffer>,
    pub unavailable: Vec<CatalogSection>,
}

impl CatalogSnapshot {
    /// Whether every section loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }

    /// Products flagged for the "most ordered" strip, in fetch order.
    ///
    /// Independent of any category selection.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_featured)
    }

    /// Products in the given category, or all products for `None`.
    pub fn in_category(&self, category: Option<CategoryId>) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| category.is_none_or(|id| p.category_id == Some(id)))
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Look up a category by id.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(name: &str, category: Option<CategoryId>, featured: bool) -> Product {
        Product {
            id: ProductId::random(),
            name_ar: name.to_string(),
            description_ar: None,
            price: Price::parse("10").unwrap(),
            image_url: None,
            is_featured: featured,
            is_available: true,
            category_id: category,
            created_at: None,
        }
    }

    fn snapshot() -> (CatalogSnapshot, CategoryId, CategoryId) {
        let burgers = CategoryId::random();
        let pizza = CategoryId::random();
        let snapshot = CatalogSnapshot {
            products: vec![
                product("برجر", Some(burgers), true),
                product("بيتزا", Some(pizza), false),
                product("تشيز برجر", Some(burgers), false),
                product("مياه", None, true),
            ],
            ..CatalogSnapshot::default()
        };
        (snapshot, burgers, pizza)
    }

    #[test]
    fn no_category_shows_everything() {
        let (snapshot, _, _) = snapshot();
        assert_eq!(snapshot.in_category(None).count(), 4);
    }

    #[test]
    fn category_filter_is_exact_match() {
        let (snapshot, burgers, pizza) = snapshot();
        let names: Vec<_> = snapshot
            .in_category(Some(burgers))
            .map(|p| p.name_ar.as_str())
            .collect();
        assert_eq!(names, ["برجر", "تشيز برجر"]);
        assert_eq!(snapshot.in_category(Some(pizza)).count(), 1);
        assert_eq!(snapshot.in_category(Some(CategoryId::random())).count(), 0);
    }

    #[test]
    fn featured_ignores_filter() {
        let (snapshot, _, _) = snapshot();
        let names: Vec<_> = snapshot.featured().map(|p| p.name_ar.as_str()).collect();
        assert_eq!(names, ["برجر", "مياه"]);
    }

    #[test]
    fn product_row_tolerates_missing_and_extra_columns() {
        let row = serde_json::json!({
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "name": "Burger",
            "name_ar": "برجر",
            "price": 50,
            "category_id": null,
        });
        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.price.to_string(), "50.00");
        assert!(product.is_available);
        assert!(!product.is_featured);
        assert!(product.category_id.is_none());
    }

    #[test]
    fn product_input_mirrors_legacy_columns() {
        let input = ProductInput::new(" برجر ", "لحم بلدي", "45.5", None, true, true).unwrap();
        assert_eq!(input.name, "برجر");
        assert_eq!(input.description.as_deref(), Some("لحم بلدي"));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["price"], "45.5");
        assert_eq!(json["category_id"], serde_json::Value::Null);
    }

    #[test]
    fn product_input_requires_name_and_valid_price() {
        assert_eq!(
            ProductInput::new("  ", "", "10", None, false, true),
            Err(CatalogInputError::Required("name_ar"))
        );
        assert_eq!(
            ProductInput::new("برجر", "", "", None, false, true),
            Err(CatalogInputError::Required("price"))
        );
        assert!(matches!(
            ProductInput::new("برجر", "", "-5", None, false, true),
            Err(CatalogInputError::Price(PriceError::Negative))
        ));
    }

    #[test]
    fn offer_discount_parsing() {
        let offer = |d: &str| OfferInput::new("عرض", "", d, true);
        assert_eq!(offer("").unwrap().discount_percentage, None);
        assert_eq!(offer("abc").unwrap().discount_percentage, None);
        assert_eq!(offer("0").unwrap().discount_percentage, None);
        assert_eq!(offer("25").unwrap().discount_percentage, Some(25));
        assert_eq!(offer("100").unwrap().discount_percentage, Some(100));
        assert_eq!(
            offer("101"),
            Err(CatalogInputError::DiscountOutOfRange(101))
        );
        assert_eq!(offer("-4"), Err(CatalogInputError::DiscountOutOfRange(-4)));
    }

    #[test]
    fn offer_discount_keeps_leading_integer() {
        let offer = |d: &str| OfferInput::new("عرض", "", d, true);
        assert_eq!(offer("12.5").unwrap().discount_percentage, Some(12));
        assert_eq!(offer(" 30 %").unwrap().discount_percentage, Some(30));
        assert_eq!(offer("0.9").unwrap().discount_percentage, None);
        assert_eq!(
            offer("150.5"),
            Err(CatalogInputError::DiscountOutOfRange(150))
        );
    }

    #[test]
    fn offer_row_tolerates_legacy_discounts() {
        let discount = |value: serde_json::Value| {
            let row = serde_json::json!({
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "title_ar": "عرض",
                "discount_percentage": value,
            });
            serde_json::from_value::<SpecialOffer>(row)
                .unwrap()
                .discount_percentage
        };
        assert_eq!(discount(serde_json::json!(15)), Some(15));
        assert_eq!(discount(serde_json::json!(12.7)), Some(12));
        assert_eq!(discount(serde_json::json!(300)), Some(100));
        assert_eq!(discount(serde_json::json!(-4)), None);
        assert_eq!(discount(serde_json::json!("20")), Some(20));
        assert_eq!(discount(serde_json::Value::Null), None);

        let row = serde_json::json!({
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "title_ar": "عرض",
        });
        let offer: SpecialOffer = serde_json::from_value(row).unwrap();
        assert_eq!(offer.discount_percentage, None);
        assert!(offer.is_active);
    }
}
