//! Row and payload shapes for the REST data store, with the validation the
//! router applies before anything leaves the process.

pub mod errors;
pub mod credential;
pub mod listing;
pub mod profile;
pub mod id;
pub mod nullable;
