//! Token-relay and session-translation core.
//!
//! - `auth`: credential gateway and identity resolver over the identity provider.
//! - `store`: resource creation and profile reads over the REST data store.
//! - `errors`: the tagged failure taxonomy shared by both.
//!
//! Upstream access goes through the `IdentityProvider` and `RestStore`
//! traits; HTTP and in-memory implementations of each are provided.

pub mod errors;
pub mod upstream;
pub mod auth;
pub mod store;
