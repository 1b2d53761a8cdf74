//! Error types for the droplet plugin
//!
//! Provider errors travel through the adapter untouched: whatever a
//! [`DropletService`](crate::traits::DropletService) or
//! [`TagService`](crate::traits::TagService) returns is what the caller sees.

use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the droplet plugin
#[derive(Error, Debug)]
pub enum Error {
    /// Instance properties are malformed or incomplete
    #[error("invalid instance properties: {0}")]
    Validation(String),

    /// An instance ID that is not a provider numeric ID
    #[error("cannot parse instance id {id:?}: {source}")]
    InvalidId {
        /// The offending identifier
        id: String,
        /// Underlying conversion failure
        #[source]
        source: ParseIntError,
    },

    /// Failure reported by a provider service, message kept verbatim
    #[error("{0}")]
    Provider(String),

    /// Non-success response from the provider's REST API
    #[error("{message} (HTTP {status})")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider diagnostic, taken from the response body
        message: String,
    },

    /// HTTP transport errors (from the provider client)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an identifier-parse error
    pub fn invalid_id(id: impl Into<String>, source: ParseIntError) -> Self {
        Self::InvalidId {
            id: id.into(),
            source,
        }
    }

    /// Create a provider error carrying the provider's own message
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an API error from a status code and diagnostic
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error was detected locally, before any provider call
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId { .. })
    }
}
