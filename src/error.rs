//! Error taxonomy for the spin engine and its collaborators

/// Result type for prize wheel operations
pub type Result<T> = std::result::Result<T, SpinError>;

/// Errors that can occur while planning, animating or managing the wheel
#[derive(Debug, thiserror::Error)]
pub enum SpinError {
    /// Spin requested against an unusable wheel (e.g. no prizes)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A spin is already running; callers treat this as a no-op
    #[error("A spin is already in progress")]
    AlreadySpinning,

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Invalid prize: {0}")]
    InvalidPrize(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpinError {
    /// True for errors that should be swallowed at the request boundary
    pub fn is_benign(&self) -> bool {
        matches!(self, SpinError::AlreadySpinning)
    }
}
