//! HTTP implementation of [`RemoteData`] over the Supabase REST surface.
//!
//! Requests go to `<SUPABASE_URL>/rest/v1/<table>` with the project's anon
//! key in both the `apikey` and `Authorization: Bearer` headers. Filters
//! travel as query parameters (`col=eq.value`, `order=col.desc`, `limit=n`).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{BackendError, Query, RemoteData, Row, Table};
use crate::config::SupabaseConfig;

/// Client for the hosted backend's REST API.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: Url,
    api_key: SecretString,
}

/// Error body returned by the REST layer.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

impl SupabaseClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the project URL
    /// cannot be extended with the REST path.
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let rest_url = config.url.join("rest/v1/")?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                rest_url,
                api_key: config.anon_key.clone(),
            }),
        })
    }

    /// `rest/v1/<table>?<params>`.
    fn table_url(&self, table: Table, params: &[(String, String)]) -> Result<Url, BackendError> {
        let mut url = self.inner.rest_url.join(table.name())?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and return the body text of a success response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body).map_or_else(
                |_| body.chars().take(200).collect(),
                |e| match e.details {
                    Some(details) => format!("{} ({details})", e.message),
                    None => e.message,
                },
            );
            tracing::error!(
                status = %status,
                message = %message,
                "Backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl RemoteData for SupabaseClient {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, BackendError> {
        let mut params = vec![("select".to_owned(), "*".to_owned())];
        params.extend(query.to_params());
        let url = self.table_url(table, &params)?;

        let body = self.send(self.request(reqwest::Method::GET, url)).await?;
        let rows: Vec<Row> = serde_json::from_str(&body)?;
        debug!(rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(table = %table, rows = rows.len()))]
    async fn insert(&self, table: Table, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
        let url = self.table_url(table, &[])?;
        let request = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&rows);

        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self, query, patch), fields(table = %table))]
    async fn update(&self, table: Table, query: &Query, patch: Row) -> Result<(), BackendError> {
        let url = self.table_url(table, &query.to_params())?;
        let request = self
            .request(reqwest::Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(&patch);

        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self, query), fields(table = %table))]
    async fn delete(&self, table: Table, query: &Query) -> Result<(), BackendError> {
        let url = self.table_url(table, &query.to_params())?;
        self.send(self.request(reqwest::Method::DELETE, url)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(url: &str) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("test-key"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn builds_table_urls_with_filters() {
        let client = client("https://project.supabase.co/");
        let params = Query::new()
            .eq("is_active", true)
            .order("created_at", false)
            .to_params();
        let url = client.table_url(Table::SpecialOffers, &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/rest/v1/special_offers?is_active=eq.true&order=created_at.desc"
        );
    }

    #[test]
    fn bare_table_url_has_no_query() {
        let client = client("https://project.supabase.co/");
        let url = client.table_url(Table::Products, &[]).unwrap();
        assert_eq!(url.as_str(), "https://project.supabase.co/rest/v1/products");
    }
}
