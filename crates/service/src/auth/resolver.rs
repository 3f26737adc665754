use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::domain::{BearerToken, Identity};
use super::provider::IdentityProvider;
use crate::errors::ServiceError;

/// Turns a bearer token into the caller's [`Identity`] by asking the
/// identity provider. Shared by every operation that acts on behalf of a
/// user.
///
/// Nothing is cached: each call is a fresh lookup, so revoked or expired
/// tokens stop working immediately.
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve straight from an `Authorization` header value. A missing or
    /// blank token fails without contacting the provider.
    pub async fn resolve(&self, authorization: Option<&str>) -> Result<Identity, ServiceError> {
        let token = BearerToken::from_header(authorization)?;
        self.resolve_token(&token).await
    }

    #[instrument(skip_all)]
    pub async fn resolve_token(&self, token: &BearerToken) -> Result<Identity, ServiceError> {
        let resp = self.provider.user(token.as_str()).await.map_err(|e| {
            warn!(error = %e, "user lookup failed");
            ServiceError::Internal("Failed to get user".into())
        })?;

        if !resp.is_success() {
            debug!(status = resp.status, "token rejected by identity provider");
            return Err(ServiceError::Unauthorized("Invalid or expired token".into()));
        }

        let identity: Identity = resp.parse().map_err(|e| {
            warn!(error = %e, "unparseable user lookup response");
            ServiceError::Internal("Invalid response".into())
        })?;
        if identity.id.is_empty() {
            warn!("user lookup response without id");
            return Err(ServiceError::Internal("Invalid response".into()));
        }
        debug!(user_id = %identity.id, "identity resolved");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::mock::MockIdentityProvider;
    use crate::upstream::UpstreamResponse;
    use async_trait::async_trait;
    use models::credential::Credential;

    fn setup() -> (Arc<MockIdentityProvider>, IdentityResolver) {
        let provider = Arc::new(MockIdentityProvider::new());
        let resolver = IdentityResolver::new(provider.clone());
        (provider, resolver)
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        let (provider, resolver) = setup();
        for header in [None, Some(""), Some("Bearer ")] {
            let err = resolver.resolve(header).await.unwrap_err();
            assert_eq!(err, ServiceError::Unauthorized("Authorization header required".into()));
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn valid_token_resolves_and_is_stable() {
        let (provider, resolver) = setup();
        let id = provider.add_user("a@x.com", "secret1");
        let token = provider.issue_token("a@x.com").unwrap();
        let header = format!("Bearer {token}");

        let first = resolver.resolve(Some(&header)).await.unwrap();
        let second = resolver.resolve(Some(&header)).await.unwrap();
        assert_eq!(first, Identity { id, email: "a@x.com".into() });
        assert_eq!(first, second);
        // no caching: both calls went upstream
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let (_, resolver) = setup();
        let err = resolver.resolve(Some("Bearer nope")).await.unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized("Invalid or expired token".into()));
    }

    #[tokio::test]
    async fn unreachable_provider_is_internal() {
        let (provider, resolver) = setup();
        provider.set_unreachable(true);
        let err = resolver.resolve(Some("Bearer whatever")).await.unwrap_err();
        assert_eq!(err, ServiceError::Internal("Failed to get user".into()));
    }

    struct Garbled(&'static str);

    #[async_trait]
    impl IdentityProvider for Garbled {
        async fn token_password(&self, _: &Credential) -> Result<UpstreamResponse, ServiceError> {
            unreachable!()
        }
        async fn signup(&self, _: &Credential) -> Result<UpstreamResponse, ServiceError> {
            unreachable!()
        }
        async fn logout(&self, _: &str) -> Result<UpstreamResponse, ServiceError> {
            unreachable!()
        }
        async fn user(&self, _: &str) -> Result<UpstreamResponse, ServiceError> {
            Ok(UpstreamResponse::new(200, self.0))
        }
    }

    #[tokio::test]
    async fn unparseable_success_is_internal() {
        for body in ["<html>", r#"{"email":"a@x.com"}"#, r#"{"id":7}"#] {
            let resolver = IdentityResolver::new(Arc::new(Garbled(body)));
            let err = resolver.resolve(Some("Bearer t")).await.unwrap_err();
            assert_eq!(err, ServiceError::Internal("Invalid response".into()), "{body}");
        }
    }
}
