use std::fmt;

use models::credential::Credential;
use models::nullable::null_as_default;
use models::profile::ProfileFields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

/// Login body. `rememberMe` is accepted for frontend compatibility and has
/// no effect: session lifetime is decided by the identity provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, rename = "rememberMe", deserialize_with = "null_as_default")]
    pub remember_me: bool,
}

impl LoginInput {
    pub fn credential(&self) -> Credential {
        Credential::new(self.email.clone(), self.password.clone())
    }
}

/// Signup body. Name and mobile only feed the best-effort profile row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mobile: String,
}

impl SignupInput {
    pub fn credential(&self) -> Credential {
        Credential::new(self.email.clone(), self.password.clone())
    }

    pub fn profile_fields(&self) -> ProfileFields {
        ProfileFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            mobile: self.mobile.clone(),
            email: self.email.clone(),
        }
    }
}

/// Caller identity as reported by the identity provider. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
}

/// Tokens plus the user they belong to.
///
/// An empty `access_token` means the account exists but no session was
/// issued yet (email confirmation pending). That is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, deserialize_with = "null_as_default")]
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub user: Identity,
}

impl Session {
    pub fn pending(user: Identity) -> Self {
        Self { user, ..Self::default() }
    }

    pub fn is_pending(&self) -> bool {
        self.access_token.is_empty()
    }
}

/// Opaque credential taken from `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Strip the `Bearer ` prefix if present. A missing header or an empty
    /// token is rejected here, before anything is sent upstream.
    pub fn from_header(value: Option<&str>) -> Result<Self, ServiceError> {
        let raw = value.unwrap_or_default();
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(ServiceError::Unauthorized("Authorization header required".into()));
        }
        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Union of the reply shapes the identity provider uses for token and
/// signup calls, successful or not.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuthEnvelope {
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<Identity>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl AuthEnvelope {
    /// Structured error text: `msg`, then `error_description`, then `error`.
    pub(crate) fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref().and_then(Value::as_str);
        [self.msg.as_deref(), self.error_description.as_deref(), error]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Session nested under `session`, or token fields at the top level.
    /// Returns the session and whatever user is left over.
    pub(crate) fn into_parts(self) -> (Option<Session>, Option<Identity>) {
        let top_level_user = self
            .id
            .filter(|id| !id.is_empty())
            .map(|id| Identity { id, email: self.email.unwrap_or_default() });
        let user = self.user.or(top_level_user);

        if let Some(session) = self.session {
            return (Some(session), user);
        }
        match self.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => {
                let session = Session {
                    access_token,
                    refresh_token: self.refresh_token.unwrap_or_default(),
                    expires_in: self.expires_in.unwrap_or_default(),
                    user: user.clone().unwrap_or_default(),
                };
                (Some(session), user)
            }
            None => (None, user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(v: Value) -> AuthEnvelope {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn null_body_fields_read_as_empty() {
        let login: LoginInput =
            serde_json::from_value(json!({"email": null, "password": "secret1", "rememberMe": null})).unwrap();
        assert_eq!(login.email, "");
        assert!(!login.remember_me);

        let signup: SignupInput =
            serde_json::from_value(json!({"email": "a@x.com", "password": "secret1", "first_name": null})).unwrap();
        assert_eq!(signup.profile_fields().first_name, "");
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let t = BearerToken::from_header(Some("Bearer abc.def")).unwrap();
        assert_eq!(t.as_str(), "abc.def");
        let raw = BearerToken::from_header(Some("abc.def")).unwrap();
        assert_eq!(raw.as_str(), "abc.def");
    }

    #[test]
    fn blank_bearer_is_unauthorized() {
        for header in [None, Some(""), Some("Bearer "), Some("Bearer    ")] {
            let err = BearerToken::from_header(header).unwrap_err();
            assert_eq!(err, ServiceError::Unauthorized("Authorization header required".into()));
        }
    }

    #[test]
    fn bearer_debug_is_redacted() {
        let t = BearerToken::from_header(Some("Bearer s3cr3t")).unwrap();
        assert!(!format!("{t:?}").contains("s3cr3t"));
    }

    #[test]
    fn nested_session_is_used() {
        let (session, _) = envelope(json!({
            "session": {
                "access_token": "at", "refresh_token": "rt", "expires_in": 3600,
                "user": {"id": "u1", "email": "a@x.com"}
            }
        }))
        .into_parts();
        let session = session.unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(session.user.id, "u1");
        assert!(!session.is_pending());
    }

    #[test]
    fn top_level_tokens_form_a_session() {
        let (session, user) = envelope(json!({
            "access_token": "at", "token_type": "bearer", "expires_in": 60,
            "refresh_token": "rt", "user": {"id": "u1", "email": "a@x.com", "aud": "authenticated"}
        }))
        .into_parts();
        let session = session.unwrap();
        assert_eq!(session.expires_in, 60);
        assert_eq!(session.user, user.unwrap());
    }

    #[test]
    fn pending_user_may_be_top_level() {
        let (session, user) = envelope(json!({
            "id": "u2", "email": "b@x.com", "confirmation_sent_at": "2024-01-01T00:00:00Z"
        }))
        .into_parts();
        assert!(session.is_none());
        assert_eq!(user, Some(Identity { id: "u2".into(), email: "b@x.com".into() }));
    }

    #[test]
    fn error_message_preference() {
        let e = envelope(json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}));
        assert_eq!(e.error_message().as_deref(), Some("Invalid login credentials"));

        let e = envelope(json!({"error": "x", "msg": "Email not confirmed"}));
        assert_eq!(e.error_message().as_deref(), Some("Email not confirmed"));

        let e = envelope(json!({"error": {"nested": true}}));
        assert_eq!(e.error_message(), None);
    }

    #[test]
    fn null_fields_read_as_empty() {
        let s: Session = serde_json::from_value(json!({
            "access_token": null, "user": {"id": "u", "email": null}
        }))
        .unwrap();
        assert!(s.is_pending());
        assert_eq!(s.user.email, "");
    }
}
