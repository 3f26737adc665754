use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::auth::http::exchange;
use crate::errors::ServiceError;
use crate::store::repository::RestStore;
use crate::upstream::UpstreamResponse;

/// REST store reached over HTTP (`/rest/v1/<table>`).
///
/// Authenticates with a single key chosen at startup: the privileged
/// service key when configured, otherwise the public one.
#[derive(Clone)]
pub struct HttpRestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRestStore {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self { client, base_url, api_key }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Internal("data store credentials not configured".into()))
    }
}

#[async_trait]
impl RestStore for HttpRestStore {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() && !self.base_url.is_empty()
    }

    async fn insert(&self, table: &str, rows: &Value) -> Result<UpstreamResponse, ServiceError> {
        let key = self.key()?;
        let req = self
            .client
            .post(self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(rows);
        exchange(req, table).await
    }

    async fn select_eq(&self, table: &str, column: &str, value: &str) -> Result<UpstreamResponse, ServiceError> {
        let key = self.key()?;
        let filter = format!("eq.{value}");
        let req = self
            .client
            .get(self.table_url(table))
            .query(&[(column, filter.as_str()), ("select", "*")])
            .header("apikey", key)
            .bearer_auth(key);
        exchange(req, table).await
    }
}
