use std::fmt;

use thiserror::Error;

/// The closed set of outward failure kinds. Every failure that reaches the
/// HTTP boundary is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    MethodNotAllowed,
    NotFound,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::MethodNotAllowed => "method_not_allowed",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Failures raised by the gateway, the resolver and the store adapter.
/// The payload is the human-readable detail shown to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    /// The upstream answered 2xx with a body that breaks its contract.
    #[error("{0}")]
    ProtocolViolation(String),
    /// Transport failure or an upstream/store error.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::BadRequest(_) => ErrorKind::BadRequest,
            ServiceError::Unauthorized(_) => ErrorKind::Unauthorized,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::ProtocolViolation(_) | ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 1001,
            ServiceError::Unauthorized(_) => 1004,
            ServiceError::NotFound(_) => 1003,
            ServiceError::ProtocolViolation(_) => 1102,
            ServiceError::Internal(_) => 1200,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::NotFound(m)
            | ServiceError::ProtocolViolation(m)
            | ServiceError::Internal(m) => m,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}
