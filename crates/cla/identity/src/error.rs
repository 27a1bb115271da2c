use thiserror::Error;

/// Failure talking to the identity-linking service or employment directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Transport failure or service unavailable.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something unusable.
    #[error("invalid identity response: {0}")]
    InvalidResponse(String),
}

/// Result type for identity lookups.
pub type Result<T> = std::result::Result<T, IdentityError>;
