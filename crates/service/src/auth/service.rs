use std::sync::Arc;

use models::credential::Credential;
use tracing::{info, instrument, warn};

use super::domain::{AuthEnvelope, BearerToken, Session};
use super::provider::IdentityProvider;
use crate::errors::ServiceError;
use crate::upstream::UpstreamResponse;

/// Credential gateway: login, signup and logout against the identity
/// provider, with every reply folded into a [`Session`] or a
/// [`ServiceError`].
///
/// Stateless: one upstream call per operation, no retries.
pub struct CredentialGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl CredentialGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Password-grant login. A 2xx reply without a session is a contract
    /// violation, never an empty success.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::credential::Credential;
    /// use service::auth::{provider::mock::MockIdentityProvider, service::CredentialGateway};
    ///
    /// let provider = Arc::new(MockIdentityProvider::new());
    /// provider.add_user("u@e.com", "Passw0rd");
    /// let gateway = CredentialGateway::new(provider);
    /// let session = tokio_test::block_on(gateway.login(&Credential::new("u@e.com", "Passw0rd"))).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.is_pending());
    /// ```
    #[instrument(skip(self, credential), fields(email = %credential.email))]
    pub async fn login(&self, credential: &Credential) -> Result<Session, ServiceError> {
        let resp = self.provider.token_password(credential).await?;
        if !resp.is_success() {
            let msg = failure_message(&resp);
            info!(status = resp.status, "login_rejected");
            return Err(ServiceError::Unauthorized(format!("login failed: {msg}")));
        }

        let (session, _) = parse_envelope(&resp)?.into_parts();
        let session = session.ok_or_else(|| ServiceError::ProtocolViolation("no session in response".into()))?;
        info!(user_id = %session.user.id, "login_succeeded");
        Ok(session)
    }

    /// Register an account. When the provider holds the session back
    /// (confirmation pending) the result is a pending [`Session`] carrying
    /// only the user.
    #[instrument(skip(self, credential), fields(email = %credential.email))]
    pub async fn signup(&self, credential: &Credential) -> Result<Session, ServiceError> {
        let resp = self.provider.signup(credential).await?;
        if !matches!(resp.status, 200 | 201) {
            let msg = failure_message(&resp);
            info!(status = resp.status, "signup_rejected");
            return Err(ServiceError::BadRequest(format!("signup failed: {msg}")));
        }

        match parse_envelope(&resp)?.into_parts() {
            (Some(session), _) => {
                info!(user_id = %session.user.id, "signup_with_session");
                Ok(session)
            }
            (None, Some(user)) => {
                info!(user_id = %user.id, "signup_pending_confirmation");
                Ok(Session::pending(user))
            }
            (None, None) => Err(ServiceError::ProtocolViolation("unexpected signup response".into())),
        }
    }

    /// One-shot revoke of the session behind `token`.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &BearerToken) -> Result<(), ServiceError> {
        let resp = self.provider.logout(token.as_str()).await?;
        if !matches!(resp.status, 200 | 204) {
            warn!(status = resp.status, "logout_rejected");
            return Err(ServiceError::Internal(format!("logout failed: {}", resp.body)));
        }
        info!("logged_out");
        Ok(())
    }
}

fn parse_envelope(resp: &UpstreamResponse) -> Result<AuthEnvelope, ServiceError> {
    resp.parse::<AuthEnvelope>().map_err(|e| {
        warn!(status = resp.status, error = %e, "identity reply unparseable");
        ServiceError::ProtocolViolation("Invalid response".into())
    })
}

/// Prefer the provider's structured message; fall back to the raw body.
fn failure_message(resp: &UpstreamResponse) -> String {
    if let Some(msg) = resp.parse::<AuthEnvelope>().ok().and_then(|e| e.error_message()) {
        return msg;
    }
    let raw = resp.body.trim();
    if raw.is_empty() {
        format!("status {}", resp.status)
    } else {
        raw.to_string()
    }
}
