/// Core error types for Encore
use thiserror::Error;

/// Result type alias using `EncoreError`
pub type Result<T> = std::result::Result<T, EncoreError>;

/// Core error type for the Encore playback engine
///
/// Every precondition violation in the engine surfaces as one of these
/// variants; nothing is retried internally or replaced with a fallback
/// value.
#[derive(Error, Debug)]
pub enum EncoreError {
    /// Entity not found (user, song, genre, ...)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Access to a private song by someone other than its owner
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed input (negative seek, out-of-range volume, unknown repeat mode)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not valid in the current playback state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Navigation with nothing to navigate to
    #[error("Queue empty: {0}")]
    QueueEmpty(String),

    /// Recommendations requested with no listening history
    #[error("Insufficient listening history")]
    InsufficientHistory,

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl EncoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a queue empty error
    pub fn queue_empty(msg: impl Into<String>) -> Self {
        Self::QueueEmpty(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
