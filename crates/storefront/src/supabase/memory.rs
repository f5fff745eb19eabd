//! In-memory [`RemoteData`] used by tests and local runs without a backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BackendError, Query, RemoteData, Row, Table};

/// Rows kept in process memory, keyed by table.
///
/// Inserts get a random `id` and a `created_at` timestamp when the row does
/// not carry them. Individual tables can be switched to failing to exercise
/// partial-load paths.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<HashMap<Table, Vec<Row>>>>,
    failing: Arc<RwLock<HashSet<Table>>>,
}

impl MemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `table` fail with a 503.
    pub async fn fail_table(&self, table: Table) {
        self.failing.write().await.insert(table);
    }

    /// Undo [`Self::fail_table`].
    pub async fn restore_table(&self, table: Table) {
        self.failing.write().await.remove(&table);
    }

    /// Current rows of `table`, in insertion order.
    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    async fn check(&self, table: Table) -> Result<(), BackendError> {
        if self.failing.read().await.contains(&table) {
            return Err(BackendError::Api {
                status: 503,
                message: format!("{table} is unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteData for MemoryBackend {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, BackendError> {
        self.check(table).await?;
        Ok(query.apply(self.rows(table).await))
    }

    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
        self.check(table).await?;
        let mut stored = Vec::with_capacity(rows.len());
        for mut row in rows {
            let Some(fields) = row.as_object_mut() else {
                return Err(BackendError::Api {
                    status: 400,
                    message: "row must be a JSON object".to_owned(),
                });
            };
            fields
                .entry("id")
                .or_insert_with(|| Row::String(Uuid::new_v4().to_string()));
            fields
                .entry("created_at")
                .or_insert_with(|| Row::String(Utc::now().to_rfc3339()));
            stored.push(row);
        }

        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<(), BackendError> {
        self.check(table).await?;
        let Row::Object(patch) = patch else {
            return Err(BackendError::Api {
                status: 400,
                message: "patch must be a JSON object".to_owned(),
            });
        };

        let mut tables = self.tables.write().await;
        for row in tables.entry(table).or_default().iter_mut() {
            if !query.matches(row) {
                continue;
            }
            if let Some(fields) = row.as_object_mut() {
                for (key, value) in &patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<(), BackendError> {
        self.check(table).await?;
        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .retain(|row| !query.matches(row));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let backend = MemoryBackend::new();
        let stored = backend
            .insert(Table::Categories, vec![json!({"name_ar": "برجر"})])
            .await
            .unwrap();

        assert_eq!(stored.len(), 1);
        assert!(stored[0]["id"].as_str().is_some());
        assert!(stored[0]["created_at"].as_str().is_some());
        assert_eq!(backend.rows(Table::Categories).await, stored);
    }

    #[tokio::test]
    async fn update_and_delete_by_filter() {
        let backend = MemoryBackend::new();
        backend
            .insert(
                Table::SpecialOffers,
                vec![
                    json!({"id": "a", "title_ar": "عرض", "is_active": true}),
                    json!({"id": "b", "title_ar": "عرض ٢", "is_active": true}),
                ],
            )
            .await
            .unwrap();

        backend
            .update(
                Table::SpecialOffers,
                &Query::new().eq("id", "a"),
                json!({"is_active": false}),
            )
            .await
            .unwrap();
        let active = backend
            .select(Table::SpecialOffers, &Query::new().eq("is_active", true))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["id"], "b");

        backend
            .delete(Table::SpecialOffers, &Query::new().eq("id", "b"))
            .await
            .unwrap();
        assert_eq!(backend.rows(Table::SpecialOffers).await.len(), 1);
    }

    #[tokio::test]
    async fn failing_table_errors_without_touching_others() {
        let backend = MemoryBackend::new();
        backend.fail_table(Table::Products).await;

        assert!(backend.select(Table::Products, &Query::new()).await.is_err());
        assert!(backend.select(Table::Categories, &Query::new()).await.is_ok());

        backend.restore_table(Table::Products).await;
        assert!(backend.select(Table::Products, &Query::new()).await.is_ok());
    }
}
