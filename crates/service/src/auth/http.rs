use async_trait::async_trait;
use models::credential::Credential;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::auth::provider::IdentityProvider;
use crate::errors::ServiceError;
use crate::upstream::UpstreamResponse;

/// Identity provider reached over HTTP (`/auth/v1/...` endpoints).
///
/// Every request carries the project key as `apikey`. Token issuance and
/// signup also authenticate with that key; logout and user lookup
/// authenticate with the caller's access token.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url, api_key: api_key.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_key(&self, req: RequestBuilder, bearer: &str) -> RequestBuilder {
        req.header("apikey", self.api_key.as_str()).bearer_auth(bearer)
    }
}

/// Send and read the whole body. Transport problems become `Internal`;
/// the raw error is logged, never returned.
pub(crate) async fn exchange(req: RequestBuilder, what: &str) -> Result<UpstreamResponse, ServiceError> {
    let resp = req.send().await.map_err(|e| {
        warn!(what, error = %e, "upstream unreachable");
        ServiceError::Internal(format!("{what} request failed"))
    })?;
    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(|e| {
        warn!(what, status, error = %e, "upstream body unreadable");
        ServiceError::Internal(format!("{what} response unreadable"))
    })?;
    debug!(what, status, "upstream exchange");
    Ok(UpstreamResponse { status, body })
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn token_password(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError> {
        let req = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .json(credential);
        exchange(self.with_key(req, &self.api_key), "login").await
    }

    async fn signup(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError> {
        let req = self.client.post(self.url("/auth/v1/signup")).json(credential);
        exchange(self.with_key(req, &self.api_key), "signup").await
    }

    async fn logout(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError> {
        let req = self.client.post(self.url("/auth/v1/logout"));
        exchange(self.with_key(req, access_token), "logout").await
    }

    async fn user(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError> {
        let req = self.client.get(self.url("/auth/v1/user"));
        exchange(self.with_key(req, access_token), "user").await
    }
}
