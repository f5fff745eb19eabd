//! Catalog service: typed reads and writes over the Remote Data Client.
//!
//! The storefront snapshot (available products, ordered categories, active
//! offers) is cached with `moka` for a short TTL. A snapshot with any failed
//! section is never cached, and every admin write clears the cache so the
//! next page shows the change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use baladi_core::catalog::{CategoryInput, OfferInput, ProductInput};
use baladi_core::{
    CatalogSection, CatalogSnapshot, Category, OfferId, Product, ProductId, SpecialOffer,
};
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::supabase::{BackendError, Query, RemoteData, Table};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Storefront,
}

/// Typed catalog access with a cached storefront snapshot.
#[derive(Clone)]
pub struct CatalogService {
    backend: Arc<dyn RemoteData>,
    cache: Cache<CacheKey, Arc<CatalogSnapshot>>,
    /// Bumped by every invalidation. A fetch that overlapped a write must
    /// not be cached.
    generation: Arc<AtomicU64>,
}

impl CatalogService {
    /// Create a catalog service over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn RemoteData>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(cache_ttl)
            .build();

        Self {
            backend,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// What customers see: available products, categories by
    /// `display_order`, active offers.
    ///
    /// The three collections are fetched concurrently and fail independently.
    #[instrument(skip(self))]
    pub async fn storefront_snapshot(&self) -> Arc<CatalogSnapshot> {
        if let Some(snapshot) = self.cache.get(&CacheKey::Storefront).await {
            debug!("Cache hit for storefront catalog");
            return snapshot;
        }

        let generation = self.generation.load(Ordering::Acquire);
        let snapshot = Arc::new(
            self.fetch(
                Query::new().eq("is_available", true),
                Query::new().order("display_order", true),
                Query::new().eq("is_active", true),
            )
            .await,
        );

        if snapshot.is_complete() && self.generation.load(Ordering::Acquire) == generation {
            self.cache
                .insert(CacheKey::Storefront, Arc::clone(&snapshot))
                .await;
            // A write may have landed between the check and the insert.
            if self.generation.load(Ordering::Acquire) != generation {
                self.cache.invalidate(&CacheKey::Storefront).await;
            }
        }
        snapshot
    }

    /// Everything, uncached: all products newest first, all categories, all
    /// offers.
    #[instrument(skip(self))]
    pub async fn admin_snapshot(&self) -> CatalogSnapshot {
        self.fetch(
            Query::new().order("created_at", false),
            Query::new().order("display_order", true),
            Query::new().order("created_at", false),
        )
        .await
    }

    /// Categories by `display_order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        self.select(Table::Categories, &Query::new().order("display_order", true))
            .await
    }

    /// A single product by id, available or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        let rows: Vec<Product> = self
            .select(Table::Products, &Query::new().eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// A single offer by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn find_offer(&self, id: OfferId) -> Result<Option<SpecialOffer>, BackendError> {
        let rows: Vec<SpecialOffer> = self
            .select(Table::SpecialOffers, &Query::new().eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Cheap backend round trip for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.backend
            .select(Table::Categories, &Query::new().limit(1))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a product and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, input), fields(name = %input.name_ar))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, BackendError> {
        let product = self.insert_one(Table::Products, input).await?;
        self.invalidate();
        Ok(product)
    }

    /// Overwrite a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), BackendError> {
        self.update_one(Table::Products, &id.to_string(), input)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        self.delete_one(Table::Products, &id.to_string()).await
    }

    /// Insert an offer and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, input), fields(title = %input.title_ar))]
    pub async fn create_offer(&self, input: &OfferInput) -> Result<SpecialOffer, BackendError> {
        let offer = self.insert_one(Table::SpecialOffers, input).await?;
        self.invalidate();
        Ok(offer)
    }

    /// Overwrite an offer's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update_offer(&self, id: OfferId, input: &OfferInput) -> Result<(), BackendError> {
        self.update_one(Table::SpecialOffers, &id.to_string(), input)
            .await
    }

    /// Delete an offer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_offer(&self, id: OfferId) -> Result<(), BackendError> {
        self.delete_one(Table::SpecialOffers, &id.to_string()).await
    }

    /// Insert a category and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, input), fields(name = %input.name_ar))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, BackendError> {
        let category = self.insert_one(Table::Categories, input).await?;
        self.invalidate();
        Ok(category)
    }

    /// Drop the cached storefront snapshot.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn fetch(&self, products: Query, categories: Query, offers: Query) -> CatalogSnapshot {
        let (products, categories, offers) = tokio::join!(
            self.select::<Product>(Table::Products, &products),
            self.select::<Category>(Table::Categories, &categories),
            self.select::<SpecialOffer>(Table::SpecialOffers, &offers),
        );

        let mut unavailable = Vec::new();
        CatalogSnapshot {
            products: collect_section(products, CatalogSection::Products, &mut unavailable),
            categories: collect_section(categories, CatalogSection::Categories, &mut unavailable),
            offers: collect_section(offers, CatalogSection::Offers, &mut unavailable),
            unavailable,
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Vec<T>, BackendError> {
        let rows = self.backend.select(table, query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(BackendError::from))
            .collect()
    }

    async fn insert_one<I: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: Table,
        input: &I,
    ) -> Result<T, BackendError> {
        let row = serde_json::to_value(input)?;
        let stored = self.backend.insert(table, vec![row]).await?;
        let row = stored.into_iter().next().ok_or(BackendError::NoRow(table))?;
        Ok(serde_json::from_value(row)?)
    }

    async fn update_one<I: Serialize + Sync>(
        &self,
        table: Table,
        id: &str,
        input: &I,
    ) -> Result<(), BackendError> {
        let patch = serde_json::to_value(input)?;
        self.backend
            .update(table, &Query::new().eq("id", id), patch)
            .await?;
        self.invalidate();
        Ok(())
    }

    async fn delete_one(&self, table: Table, id: &str) -> Result<(), BackendError> {
        self.backend.delete(table, &Query::new().eq("id", id)).await?;
        self.invalidate();
        Ok(())
    }
}

fn collect_section<T>(
    result: Result<Vec<T>, BackendError>,
    section: CatalogSection,
    unavailable: &mut Vec<CatalogSection>,
) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(section = ?section, error = %e, "Failed to fetch catalog section");
            unavailable.push(section);
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use async_trait::async_trait;
    use baladi_core::CategoryId;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::supabase::{MemoryBackend, Row};

    /// Holds the next product read after the rows are taken, until released.
    struct HeldProductRead {
        inner: MemoryBackend,
        armed: AtomicBool,
        reached: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RemoteData for HeldProductRead {
        async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, BackendError> {
            let rows = self.inner.select(table, query).await?;
            if table == Table::Products && self.armed.swap(false, Ordering::AcqRel) {
                self.reached.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }

        async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
            self.inner.insert(table, rows).await
        }

        async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<(), BackendError> {
            self.inner.update(table, query, patch).await
        }

        async fn delete(&self, table: Table, query: &Query) -> Result<(), BackendError> {
            self.inner.delete(table, query).await
        }
    }

    fn service(backend: &MemoryBackend) -> CatalogService {
        CatalogService::new(Arc::new(backend.clone()), Duration::from_secs(60))
    }

    async fn seed_category(catalog: &CatalogService, name: &str, order: i32) -> CategoryId {
        catalog
            .create_category(&CategoryInput {
                name_ar: name.to_string(),
                icon: None,
                display_order: order,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn storefront_snapshot_filters_and_orders() {
        let backend = MemoryBackend::new();
        let catalog = service(&backend);

        seed_category(&catalog, "مشروبات", 2).await;
        let burgers = seed_category(&catalog, "برجر", 1).await;

        let input = ProductInput::new("برجر", "", "50", Some(burgers), true, true).unwrap();
        catalog.create_product(&input).await.unwrap();
        let hidden = ProductInput::new("قديم", "", "10", None, false, false).unwrap();
        catalog.create_product(&hidden).await.unwrap();
        catalog
            .create_offer(&OfferInput::new("عرض", "", "20", true).unwrap())
            .await
            .unwrap();
        catalog
            .create_offer(&OfferInput::new("منتهي", "", "", false).unwrap())
            .await
            .unwrap();

        let snapshot = catalog.storefront_snapshot().await;
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products[0].name_ar, "برجر");
        let names: Vec<_> = snapshot.categories.iter().map(|c| c.name_ar.as_str()).collect();
        assert_eq!(names, ["برجر", "مشروبات"]);
        assert_eq!(snapshot.offers.len(), 1);
        assert_eq!(snapshot.offers[0].discount_percentage, Some(20));

        let admin = catalog.admin_snapshot().await;
        assert_eq!(admin.products.len(), 2);
        assert_eq!(admin.offers.len(), 2);
    }

    #[tokio::test]
    async fn failed_section_is_reported_and_not_cached() {
        let backend = MemoryBackend::new();
        let catalog = service(&backend);
        seed_category(&catalog, "برجر", 1).await;

        backend.fail_table(Table::SpecialOffers).await;
        let snapshot = catalog.storefront_snapshot().await;
        assert_eq!(snapshot.unavailable, vec![CatalogSection::Offers]);
        assert_eq!(snapshot.categories.len(), 1);

        backend.restore_table(Table::SpecialOffers).await;
        let snapshot = catalog.storefront_snapshot().await;
        assert!(snapshot.is_complete());
    }

    #[tokio::test]
    async fn writes_invalidate_cached_snapshot() {
        let backend = MemoryBackend::new();
        let catalog = service(&backend);
        assert!(catalog.storefront_snapshot().await.products.is_empty());

        // Bypasses the service, so the cache still holds the empty snapshot.
        backend
            .insert(
                Table::Products,
                vec![json!({"name_ar": "سري", "price": 5, "is_available": true})],
            )
            .await
            .unwrap();
        assert!(catalog.storefront_snapshot().await.products.is_empty());

        let input = ProductInput::new("برجر", "", "50", None, false, true).unwrap();
        let created = catalog.create_product(&input).await.unwrap();
        assert_eq!(catalog.storefront_snapshot().await.products.len(), 2);

        catalog.delete_product(created.id).await.unwrap();
        assert_eq!(catalog.storefront_snapshot().await.products.len(), 1);
    }

    #[tokio::test]
    async fn update_and_find_round_trip() {
        let backend = MemoryBackend::new();
        let catalog = service(&backend);

        let offer = catalog
            .create_offer(&OfferInput::new("عرض", "", "10", true).unwrap())
            .await
            .unwrap();
        catalog
            .update_offer(offer.id, &OfferInput::new("عرض الجمعة", "", "0", false).unwrap())
            .await
            .unwrap();

        let found = catalog.find_offer(offer.id).await.unwrap().unwrap();
        assert_eq!(found.title_ar, "عرض الجمعة");
        assert_eq!(found.discount_percentage, None);
        assert!(!found.is_active);

        assert!(catalog.find_product(ProductId::random()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn snapshot_fetched_during_write_is_not_cached() {
        let backend = Arc::new(HeldProductRead {
            inner: MemoryBackend::new(),
            armed: AtomicBool::new(true),
            reached: Notify::new(),
            release: Notify::new(),
        });
        let catalog = CatalogService::new(backend.clone(), Duration::from_secs(60));

        let reader = tokio::spawn({
            let catalog = catalog.clone();
            async move { catalog.storefront_snapshot().await }
        });
        backend.reached.notified().await;

        let input = ProductInput::new("برجر", "", "50", None, false, true).unwrap();
        catalog.create_product(&input).await.unwrap();
        backend.release.notify_one();

        // The overlapping read saw the old rows...
        assert!(reader.await.unwrap().products.is_empty());
        // ...but must not have been cached over the write.
        let snapshot = catalog.storefront_snapshot().await;
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products[0].name_ar, "برجر");
    }
}
