//! Error types for the discovery and extraction pipelines.
//!
//! Only caller mistakes and caller-initiated aborts are errors. Network
//! trouble never surfaces here: fetches report a [`FetchOutcome`] and the
//! pipeline drops whatever could not be resolved.
//!
//! [`FetchOutcome`]: crate::acquisition::http_client::FetchOutcome

/// All errors that can cross the library boundary.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// Unresolvable region with no state list, unknown state code, or a
    /// roster URL that is not absolute http(s).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoutError {
    /// Whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ScoutError::InvalidInput(_))
    }
}

pub type ScoutResult<T> = Result<T, ScoutError>;
