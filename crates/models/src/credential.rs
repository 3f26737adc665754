use std::fmt;

use serde::Serialize;

use crate::errors::ModelError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Email/password pair sent to the identity provider. Lives only for the
/// duration of a login or signup call.
#[derive(Clone, Serialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Both fields must be non-empty.
    pub fn validate_login(&self) -> Result<(), ModelError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ModelError::MissingCredentials);
        }
        Ok(())
    }

    /// Login rules plus a minimum password length, counted in characters.
    pub fn validate_signup(&self) -> Result<(), ModelError> {
        self.validate_login()?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ModelError::PasswordTooShort { min: MIN_PASSWORD_LEN });
        }
        Ok(())
    }
}
