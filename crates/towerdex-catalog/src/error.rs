//! Error types for the catalog crate.

use thiserror::Error;

/// Errors from fetching, mutating or authenticating against the catalog.
///
/// `Clone` so that every caller sharing one in-flight fetch receives the same
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The backing store failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// No collection is served under this key.
    #[error("unknown collection key: {0}")]
    UnknownKey(String),

    /// A record looked up by id does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A mutation input failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The action needs a logged-in user.
    #[error("{action} requires a logged-in user")]
    Unauthenticated { action: &'static str },

    /// The logged-in user lacks the role the action needs.
    #[error("{action} requires the admin role")]
    Unauthorized { action: &'static str },

    /// Login failed.
    #[error("invalid email or password")]
    InvalidCredentials,
}

impl CatalogError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CatalogError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
