//! Auth module: everything that talks to the identity provider.
//!
//! - `domain`: sessions, identities, bearer tokens and request bodies
//! - `provider`: the upstream seam, plus an in-memory mock
//! - `http`: the reqwest-backed provider
//! - `service`: the credential gateway (login, signup, logout)
//! - `resolver`: bearer token to identity

pub mod domain;
pub mod provider;
pub mod http;
pub mod service;
pub mod resolver;

pub use resolver::IdentityResolver;
pub use service::CredentialGateway;
