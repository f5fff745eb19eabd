//! Seed the backend with catalog data.
//!
//! Reads a YAML file of categories, products and offers, validates every
//! entry, then inserts them through the catalog service. Products refer to
//! their category by Arabic name.
//!
//! ```yaml
//! categories:
//!   - name_ar: برجر
//!     icon: 🍔
//!     display_order: 1
//! products:
//!   - name_ar: برجر بلدي
//!     price: 50
//!     category: برجر
//!     is_featured: true
//! offers:
//!   - title_ar: عرض الجمعة
//!     discount_percentage: 15
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use baladi_core::catalog::{CatalogInputError, CategoryInput, OfferInput, ProductInput};
use baladi_core::{CategoryId, Price};
use baladi_storefront::config::SupabaseConfig;
use baladi_storefront::services::CatalogService;
use baladi_storefront::supabase::{BackendError, SupabaseClient};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while validating or applying a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("{entry}: {source}")]
    Invalid {
        entry: String,
        source: CatalogInputError,
    },
    #[error("product {product} refers to unknown category {category}")]
    UnknownCategory { product: String, category: String },
    #[error("category {0} is listed twice")]
    DuplicateCategory(String),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Top-level layout of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub categories: Vec<CategoryInput>,
    pub products: Vec<SeedProduct>,
    pub offers: Vec<SeedOffer>,
}

/// A product entry; `category` is a category's `name_ar`.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name_ar: String,
    #[serde(default)]
    pub description_ar: String,
    pub price: Price,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// An offer entry.
#[derive(Debug, Deserialize)]
pub struct SeedOffer {
    pub title_ar: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub discount_percentage: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Counts of inserted rows.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub offers: usize,
}

impl SeedProduct {
    fn to_input(&self, category_id: Option<CategoryId>) -> Result<ProductInput, SeedError> {
        ProductInput::new(
            &self.name_ar,
            &self.description_ar,
            &self.price.to_string(),
            category_id,
            self.is_featured,
            self.is_available,
        )
        .map_err(|source| SeedError::Invalid {
            entry: format!("product {}", self.name_ar),
            source,
        })
    }
}

impl SeedOffer {
    fn to_input(&self) -> Result<OfferInput, SeedError> {
        let discount = self
            .discount_percentage
            .map(|d| d.to_string())
            .unwrap_or_default();
        OfferInput::new(&self.title_ar, &self.description_ar, &discount, self.is_active).map_err(
            |source| SeedError::Invalid {
                entry: format!("offer {}", self.title_ar),
                source,
            },
        )
    }
}

impl SeedFile {
    /// Parse a seed file from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML does not match the expected layout.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check every entry before anything is written.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry found.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut names = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            let name = category.name_ar.trim();
            if name.is_empty() {
                return Err(SeedError::Invalid {
                    entry: "category".to_string(),
                    source: CatalogInputError::Required("name_ar"),
                });
            }
            if names.contains(&name) {
                return Err(SeedError::DuplicateCategory(name.to_string()));
            }
            names.push(name);
        }

        for product in &self.products {
            product.to_input(None)?;
            let Some(category) = &product.category else {
                continue;
            };
            if !names.contains(&category.trim()) {
                return Err(SeedError::UnknownCategory {
                    product: product.name_ar.clone(),
                    category: category.clone(),
                });
            }
        }

        for offer in &self.offers {
            offer.to_input()?;
        }

        Ok(())
    }

    /// Insert categories first, then products with resolved category ids,
    /// then offers.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failed entry or backend call. Rows
    /// inserted before the failure stay in place.
    pub async fn apply(&self, catalog: &CatalogService) -> Result<SeedSummary, SeedError> {
        self.validate()?;
        let mut summary = SeedSummary::default();

        let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
        for input in &self.categories {
            let category = catalog.create_category(input).await?;
            info!(name = %category.name_ar, id = %category.id, "Category created");
            category_ids.insert(category.name_ar.trim().to_string(), category.id);
            summary.categories += 1;
        }

        for product in &self.products {
            let category_id = product
                .category
                .as_deref()
                .and_then(|name| category_ids.get(name.trim()).copied());
            let created = catalog.create_product(&product.to_input(category_id)?).await?;
            info!(name = %created.name_ar, id = %created.id, "Product created");
            summary.products += 1;
        }

        for offer in &self.offers {
            let created = catalog.create_offer(&offer.to_input()?).await?;
            info!(title = %created.title_ar, id = %created.id, "Offer created");
            summary.offers += 1;
        }

        Ok(summary)
    }
}

/// Seed the catalog from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
/// * `dry_run` - If true, validate only and skip every backend call
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or validated, or a backend call fails.
pub async fn catalog(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed");

    // Validate before connecting
    let content = tokio::fs::read_to_string(path).await?;
    let seed = SeedFile::from_yaml(&content)?;
    if let Err(e) = seed.validate() {
        error!("Seed file validation failed: {e}");
        return Err(e.into());
    }

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        offers = seed.offers.len(),
        "Seed file validated"
    );

    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let config = SupabaseConfig::from_env()?;
    let client = SupabaseClient::new(&config)?;
    let catalog = CatalogService::new(Arc::new(client), Duration::from_secs(60));

    let summary = seed.apply(&catalog).await?;

    info!("Seeding complete!");
    info!("  Categories inserted: {}", summary.categories);
    info!("  Products inserted: {}", summary.products);
    info!("  Offers inserted: {}", summary.offers);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use baladi_storefront::supabase::{MemoryBackend, Table};

    use super::*;

    const SEED: &str = r"
categories:
  - name_ar: برجر
    icon: 🍔
    display_order: 1
  - name_ar: مشروبات
    display_order: 2
products:
  - name_ar: برجر بلدي
    price: 50
    category: برجر
    is_featured: true
  - name_ar: عصير مانجو
    price: '20.50'
    category: مشروبات
  - name_ar: صنف بدون قسم
    price: 10
    is_available: false
offers:
  - title_ar: عرض الجمعة
    discount_percentage: 15
  - title_ar: توصيل مجاني
";

    #[test]
    fn parses_defaults() {
        let seed = SeedFile::from_yaml(SEED).unwrap();
        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.categories[1].icon, None);
        assert!(seed.products[1].is_available);
        assert!(!seed.products[2].is_available);
        assert!(seed.offers[1].is_active);
        assert_eq!(seed.offers[1].discount_percentage, None);
        seed.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_category() {
        let seed = SeedFile::from_yaml(
            "products:\n  - name_ar: فول\n    price: 15\n    category: فطار\n",
        )
        .unwrap();
        assert!(matches!(
            seed.validate(),
            Err(SeedError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_category() {
        let seed =
            SeedFile::from_yaml("categories:\n  - name_ar: برجر\n  - name_ar: ' برجر '\n").unwrap();
        assert!(matches!(
            seed.validate(),
            Err(SeedError::DuplicateCategory(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_discount() {
        let seed =
            SeedFile::from_yaml("offers:\n  - title_ar: عرض\n    discount_percentage: 150\n")
                .unwrap();
        assert!(matches!(seed.validate(), Err(SeedError::Invalid { .. })));
    }

    #[tokio::test]
    async fn apply_resolves_categories() {
        let backend = MemoryBackend::new();
        let catalog = CatalogService::new(Arc::new(backend.clone()), Duration::from_secs(60));
        let seed = SeedFile::from_yaml(SEED).unwrap();

        let summary = seed.apply(&catalog).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                categories: 2,
                products: 3,
                offers: 2,
            }
        );

        let categories = backend.rows(Table::Categories).await;
        let products = backend.rows(Table::Products).await;
        assert_eq!(products[0]["category_id"], categories[0]["id"]);
        assert_eq!(products[1]["category_id"], categories[1]["id"]);
        assert!(products[2]["category_id"].is_null());

        let offers = backend.rows(Table::SpecialOffers).await;
        assert_eq!(offers[0]["discount_percentage"], 15);
        assert!(offers[1]["discount_percentage"].is_null());
    }

    #[tokio::test]
    async fn backend_failure_is_reported() {
        let backend = MemoryBackend::new();
        backend.fail_table(Table::Products).await;
        let catalog = CatalogService::new(Arc::new(backend.clone()), Duration::from_secs(60));
        let seed = SeedFile::from_yaml(SEED).unwrap();

        assert!(matches!(
            seed.apply(&catalog).await,
            Err(SeedError::Backend(_))
        ));
        assert_eq!(backend.rows(Table::Categories).await.len(), 2);
    }
}
