//! Error types for the minus3 site.

use thiserror::Error;

/// Errors that can occur while loading, validating or exporting site data.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Could not load {path} (HTTP {status})")]
    Load { path: String, status: u16 },

    #[error("Could not fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected data in {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid data in {path}: {reason}")]
    Invalid { path: String, reason: String },

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download error: {0}")]
    Download(String),
}

/// Result type alias for site operations.
pub type SiteResult<T> = Result<T, SiteError>;
