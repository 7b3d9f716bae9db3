//! Error types for the stream manager.

use crate::models::job::JobKind;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the stream manager.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Video catalog API keys not configured. Set STREAM_API_KEYS environment variable")]
    CatalogApiKeyMissing,

    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Collaborator errors
    #[error("Video catalog request failed: {0}")]
    Catalog(String),

    #[error("TMDB request failed: {0}")]
    Tmdb(String),

    #[error("AI parsing failed: {0}")]
    AiParse(String),

    // Match errors
    #[error("Match request needs a slug or an external id")]
    EmptyMatchRequest,

    // Job errors
    #[error("A {0} job is already in progress")]
    JobAlreadyRunning(JobKind),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    // Rename errors
    #[error("Pending rename not found: {0}")]
    PendingRenameNotFound(String),

    #[error("Catalog rename failed for {0}")]
    RenameFailed(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config file errors
    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
