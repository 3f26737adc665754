use async_trait::async_trait;
use models::credential::Credential;

use crate::errors::ServiceError;
use crate::upstream::UpstreamResponse;

/// Identity-provider endpoints the gateway and resolver need.
///
/// Implementations return the raw reply; interpreting status codes and
/// bodies is the caller's job. `Err` means the exchange itself failed
/// (connect, timeout, unreadable body).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Password-grant token issuance.
    async fn token_password(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError>;
    async fn signup(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError>;
    /// Revoke the session behind `access_token`.
    async fn logout(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError>;
    /// Look up the user that owns `access_token`.
    async fn user(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError>;
}

/// In-memory identity provider for tests and local runs.
///
/// Mimics the hosted provider's reply shapes and counts every call so tests
/// can assert that nothing went upstream.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use serde_json::json;
    use uuid::Uuid;

    #[derive(Clone)]
    struct Account {
        id: String,
        password: String,
    }

    #[derive(Default)]
    pub struct MockIdentityProvider {
        accounts: Mutex<HashMap<String, Account>>, // key: email
        tokens: Mutex<HashMap<String, (String, String)>>, // key: access token -> (id, email)
        confirm_email: AtomicBool,
        unreachable: AtomicBool,
        garbled: AtomicBool,
        calls: AtomicUsize,
    }

    fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl MockIdentityProvider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Signups return a pending user instead of a session.
        pub fn with_email_confirmation(self) -> Self {
            self.confirm_email.store(true, Ordering::SeqCst);
            self
        }

        /// Every call fails as if the provider could not be reached.
        pub fn set_unreachable(&self, unreachable: bool) {
            self.unreachable.store(unreachable, Ordering::SeqCst);
        }

        /// Every call is answered with a 200 whose body is not JSON.
        pub fn set_garbled(&self, garbled: bool) {
            self.garbled.store(garbled, Ordering::SeqCst);
        }

        /// Register an account directly; returns its id.
        pub fn add_user(&self, email: &str, password: &str) -> String {
            let id = Uuid::new_v4().to_string();
            guard(&self.accounts).insert(
                email.to_string(),
                Account { id: id.clone(), password: password.to_string() },
            );
            id
        }

        /// Mint a valid access token for an existing account.
        pub fn issue_token(&self, email: &str) -> Option<String> {
            let account = guard(&self.accounts).get(email).cloned()?;
            Some(self.mint(&account.id, email))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn is_token_active(&self, token: &str) -> bool {
            guard(&self.tokens).contains_key(token)
        }

        fn mint(&self, id: &str, email: &str) -> String {
            let token = format!("mock-{}", Uuid::new_v4());
            guard(&self.tokens).insert(token.clone(), (id.to_string(), email.to_string()));
            token
        }

        /// Count the call; `Some` short-circuits it with a garbled reply.
        fn enter(&self, what: &str) -> Result<Option<UpstreamResponse>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(ServiceError::Internal(format!("{what} request failed")));
            }
            if self.garbled.load(Ordering::SeqCst) {
                return Ok(Some(UpstreamResponse::new(200, "<html>upstream maintenance</html>")));
            }
            Ok(None)
        }

        fn session_body(&self, id: &str, email: &str) -> serde_json::Value {
            let access_token = self.mint(id, email);
            json!({
                "access_token": access_token,
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": format!("refresh-{}", Uuid::new_v4()),
                "user": {"id": id, "email": email}
            })
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn token_password(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError> {
            if let Some(reply) = self.enter("login")? {
                return Ok(reply);
            }
            let account = guard(&self.accounts).get(&credential.email).cloned();
            match account {
                Some(a) if a.password == credential.password => {
                    Ok(UpstreamResponse::json_body(200, &self.session_body(&a.id, &credential.email)))
                }
                _ => Ok(UpstreamResponse::json_body(
                    400,
                    &json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
                )),
            }
        }

        async fn signup(&self, credential: &Credential) -> Result<UpstreamResponse, ServiceError> {
            if let Some(reply) = self.enter("signup")? {
                return Ok(reply);
            }
            if guard(&self.accounts).contains_key(&credential.email) {
                return Ok(UpstreamResponse::json_body(
                    422,
                    &json!({"code": 422, "msg": "User already registered"}),
                ));
            }
            let id = self.add_user(&credential.email, &credential.password);
            if self.confirm_email.load(Ordering::SeqCst) {
                return Ok(UpstreamResponse::json_body(
                    200,
                    &json!({"user": {"id": id, "email": credential.email}}),
                ));
            }
            Ok(UpstreamResponse::json_body(200, &self.session_body(&id, &credential.email)))
        }

        async fn logout(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError> {
            if let Some(reply) = self.enter("logout")? {
                return Ok(reply);
            }
            if guard(&self.tokens).remove(access_token).is_some() {
                Ok(UpstreamResponse::new(204, ""))
            } else {
                Ok(UpstreamResponse::json_body(401, &json!({"msg": "invalid JWT"})))
            }
        }

        async fn user(&self, access_token: &str) -> Result<UpstreamResponse, ServiceError> {
            if let Some(reply) = self.enter("user")? {
                return Ok(reply);
            }
            match guard(&self.tokens).get(access_token).cloned() {
                Some((id, email)) => Ok(UpstreamResponse::json_body(
                    200,
                    &json!({"id": id, "email": email, "aud": "authenticated", "role": "authenticated"}),
                )),
                None => Ok(UpstreamResponse::json_body(401, &json!({"msg": "invalid JWT"}))),
            }
        }
    }
}
