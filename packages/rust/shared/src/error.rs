//! Error types for LeadForge.
//!
//! Library crates use [`LeadForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LeadForge operations.
#[derive(Debug, thiserror::Error)]
pub enum LeadForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page or calling an API.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or response-body parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Row store or file store error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Language-model service error (unreachable, bad status, empty reply).
    #[error("model error: {0}")]
    Model(String),

    /// Search API error (bad key, quota, API-reported error).
    #[error("search error: {0}")]
    Search(String),

    /// The model answered, but not with the structured object we asked for.
    #[error("malformed model reply: {message}")]
    MalformedReply { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input that is accepted but unlikely to work, such as a site URL without an http(s) scheme.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LeadForgeError>;

impl LeadForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a malformed-reply error from any displayable message.
    pub fn malformed_reply(msg: impl Into<String>) -> Self {
        Self::MalformedReply {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Remediation hint for errors a user can act on, if one is known.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Search(msg) => {
                let msg = msg.to_lowercase();
                if msg.contains("invalid api key") {
                    Some("Double-check the SERPAPI_KEY value in your .env file.")
                } else if msg.contains("exceeded your credits") || msg.contains("run out of searches") {
                    Some("You may have used up your SerpAPI credits for the month.")
                } else if msg.contains("not set") {
                    Some("Add SERPAPI_KEY=<your key> to a .env file in the working directory.")
                } else {
                    None
                }
            }
            Self::Model(_) => Some("Start the Ollama application (`ollama serve`) and try again."),
            Self::Storage(msg) if msg.contains("locked") || msg.contains("busy") => {
                Some("Another process is writing to the lead database; retry in a moment.")
            }
            Self::Io { .. } => Some("Check that the path exists and is writable."),
            _ => None,
        }
    }
}
