use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::Json;
use common::types::Message;
use configs::AppConfig;
use models::profile::ProfileRow;
use serde_json::{json, Value};
use service::auth::domain::{BearerToken, Identity, LoginInput, SignupInput};
use service::auth::http::HttpIdentityProvider;
use service::auth::provider::IdentityProvider;
use service::auth::{CredentialGateway, IdentityResolver};
use service::store::http::HttpRestStore;
use service::store::repository::RestStore;
use service::store::ResourceAdapter;
use tracing::info;

use crate::errors::{ApiError, StartupError};
use crate::metrics::Metrics;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub gateway: Arc<CredentialGateway>,
    pub resolver: Arc<IdentityResolver>,
    pub resources: Arc<ResourceAdapter>,
    pub metrics: Arc<Metrics>,
}

impl ServerState {
    /// One provider serves both the gateway and the resolver.
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn RestStore>) -> anyhow::Result<Self> {
        let metrics = Metrics::new().map_err(|e| StartupError::Clients(format!("metrics registry: {e}")))?;
        Ok(Self {
            gateway: Arc::new(CredentialGateway::new(provider.clone())),
            resolver: Arc::new(IdentityResolver::new(provider)),
            resources: Arc::new(ResourceAdapter::new(store)),
            metrics: Arc::new(metrics),
        })
    }

    /// HTTP-backed state sharing a single `reqwest::Client`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .map_err(|e| StartupError::Clients(format!("http client: {e}")))?;
        let provider = HttpIdentityProvider::new(client.clone(), config.identity.url.as_str(), config.identity.anon_key.as_str());
        let store = HttpRestStore::new(client, config.store.url.as_str(), config.store.write_key().map(str::to_string));
        Self::new(Arc::new(provider), Arc::new(store))
    }
}

pub(crate) fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = crate::openapi::SessionEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorBody),
        (status = 401, description = "Rejected by the identity provider", body = crate::openapi::ErrorBody),
        (status = 500, description = "Identity provider failure", body = crate::openapi::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let credential = input.credential();
    credential.validate_login()?;

    let session = state.gateway.login(&credential).await?;
    Ok(Json(json!({ "session": session })))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = crate::openapi::SignupRequest,
    responses(
        (status = 200, description = "Session issued, or confirmation pending", body = crate::openapi::SessionEnvelope),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorBody),
        (status = 500, description = "Identity provider failure", body = crate::openapi::ErrorBody)
    )
)]
pub async fn signup(
    State(state): State<ServerState>,
    body: Result<Json<SignupInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(input) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let credential = input.credential();
    credential.validate_signup()?;

    let session = state.gateway.signup(&credential).await?;
    let response = if !session.is_pending() {
        json!({ "session": session })
    } else if !session.user.id.is_empty() {
        json!({ "user": session.user, "message": "Check your email to confirm your account" })
    } else {
        json!({ "message": "Signup completed" })
    };

    // The response is fixed above; the profile write cannot change it. It is
    // awaited so upstream calls for one request stay sequential.
    state.resources.store_profile(&session.user, input.profile_fields()).await;
    info!(user_id = %session.user.id, pending = session.is_pending(), "signup_completed");
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session revoked", body = crate::openapi::MessageBody),
        (status = 401, description = "Missing token", body = crate::openapi::ErrorBody),
        (status = 500, description = "Revoke failed", body = crate::openapi::ErrorBody)
    )
)]
pub async fn logout(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<Message>, ApiError> {
    let token = BearerToken::from_header(authorization(&headers))?;
    state.gateway.logout(&token).await?;
    Ok(Json(Message::new("Logged out")))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = crate::openapi::IdentityDoc),
        (status = 401, description = "Missing, invalid or expired token", body = crate::openapi::ErrorBody),
        (status = 500, description = "Identity provider failure", body = crate::openapi::ErrorBody)
    )
)]
pub async fn me(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<Identity>, ApiError> {
    let identity = state.resolver.resolve(authorization(&headers)).await?;
    Ok(Json(identity))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Stored profile row"),
        (status = 401, description = "Missing, invalid or expired token", body = crate::openapi::ErrorBody),
        (status = 404, description = "No profile row", body = crate::openapi::ErrorBody),
        (status = 500, description = "Store failure", body = crate::openapi::ErrorBody)
    )
)]
pub async fn profile(State(state): State<ServerState>, headers: HeaderMap) -> Result<Json<ProfileRow>, ApiError> {
    let identity = state.resolver.resolve(authorization(&headers)).await?;
    let profile = state.resources.get_profile(&identity.id).await?;
    Ok(Json(profile))
}
