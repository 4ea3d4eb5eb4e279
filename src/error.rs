use thiserror::Error;

/// Errors raised at the edges of the normalizer: reading responses,
/// loading configuration and persisting submissions.
///
/// Normalization itself never fails; see [`crate::normalizer::normalize`].
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A body that claimed to be JSON could not be parsed
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The generative service answered with an error instead of content
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Input rejected before normalization
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Submission store failure
    #[error("Storage error: {0}")]
    Storage(String),
}
