//! Store module: rows written and read on behalf of a resolved identity.

pub mod repository;
pub mod http;
pub mod service;

pub use service::ResourceAdapter;
