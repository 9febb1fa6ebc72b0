//! Error types for Agent Deck core
//!
//! Covers:
//! - Transport and HTTP status failures talking to the backend
//! - Response decoding failures
//! - Client-side request validation (blocks submission, no request sent)
//! - Configuration loading

use std::path::PathBuf;

/// Result alias for core operations
pub type Result<T, E = DeckError> = std::result::Result<T, E>;

/// Main Agent Deck error type
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// Request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),

    /// Request rejected before sending
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Timeout
    #[error("request timed out after {duration_secs}s")]
    Timeout {
        /// Configured timeout
        duration_secs: u64,
    },
}

impl DeckError {
    /// Check if the same request may succeed later
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the request was rejected client-side
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Client-side request validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required input field missing or blank
    #[error("`{action}` requires input field `{field}`")]
    MissingField {
        /// Action being submitted
        action: String,
        /// Missing field
        field: &'static str,
    },

    /// Override of the primary MCC suggestion without a reason
    #[error("selecting {selected} over the suggested {primary} requires an override reason")]
    MissingOverrideReason {
        /// Selected code
        selected: String,
        /// System's primary suggestion
        primary: String,
    },

    /// MCC code is not four digits
    #[error("invalid MCC code `{0}`: expected four digits")]
    InvalidMccCode(String),

    /// Action name is blank
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// Identifier or selector is blank
    #[error("{0} must not be empty")]
    EmptySelector(&'static str),

    /// URL does not parse even with a scheme added
    #[error("invalid URL `{0}`")]
    InvalidUrl(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::DeckConfig`]
    #[error("cannot parse {path}: {message}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A value is out of range
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// What is wrong
        message: String,
    },
}

impl From<reqwest::Error> for DeckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}
