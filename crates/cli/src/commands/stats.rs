//! Catalog statistics.

use std::sync::Arc;
use std::time::Duration;

use baladi_storefront::config::SupabaseConfig;
use baladi_storefront::services::CatalogService;
use baladi_storefront::supabase::SupabaseClient;
use tracing::{info, warn};

/// Print product, category and offer counts.
///
/// # Errors
///
/// Returns an error if the backend configuration is missing or invalid.
pub async fn catalog() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = SupabaseConfig::from_env()?;
    let client = SupabaseClient::new(&config)?;
    let catalog = CatalogService::new(Arc::new(client), Duration::from_secs(60));

    let snapshot = catalog.admin_snapshot().await;

    let available = snapshot.products.iter().filter(|p| p.is_available).count();
    let featured = snapshot.products.iter().filter(|p| p.is_featured).count();
    let active_offers = snapshot.offers.iter().filter(|o| o.is_active).count();

    info!("Catalog Statistics");
    info!("==================");
    info!(
        "Products: {} ({available} available, {featured} featured)",
        snapshot.products.len()
    );
    info!("Categories: {}", snapshot.categories.len());
    for category in &snapshot.categories {
        let count = snapshot.in_category(Some(category.id)).count();
        info!("  {}: {count}", category.name_ar);
    }
    info!(
        "Offers: {} ({active_offers} active)",
        snapshot.offers.len()
    );

    for section in &snapshot.unavailable {
        warn!(section = ?section, "Section could not be loaded");
    }

    Ok(())
}
