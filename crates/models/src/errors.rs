use thiserror::Error;

/// Validation failures for inbound payloads. The `Display` text is what the
/// caller sees in the `{ "error": ... }` envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Email and password required")]
    MissingCredentials,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid auction_end_time format (must be RFC3339)")]
    InvalidAuctionEndTime,
}
