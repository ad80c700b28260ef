//! Error handling for dbtcloud-core
//!
//! Every API call fails in one of two ways: the request never produced a
//! usable response (transport, including non-2xx statuses surfaced by the
//! executor), or the response body did not match the expected envelope
//! (decode). Errors are returned as-is; nothing here retries.
//!
//! # Example
//!
//! ```rust
//! use dbtcloud_core::CoreError;
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_not_found() {
//!         println!("Credential not found");
//!     } else if err.is_decode() {
//!         println!("Unexpected response shape: {err}");
//!     }
//! }
//!
//! let err = CoreError::Api { status: 404, message: "not found".to_string() };
//! assert!(err.is_not_found());
//! assert!(err.is_transport());
//! ```

use thiserror::Error;

/// Core error type for dbt Cloud API calls
#[derive(Error, Debug)]
pub enum CoreError {
    /// The HTTP request could not be built or executed
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration is unusable (bad URL, missing token)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true for errors raised while executing the request
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Transport(_) | CoreError::Api { .. })
    }

    /// Returns true when the response body could not be decoded
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, CoreError::Decode(_))
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Api { status: 404, .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Api { status: 401 | 403, .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Api { status, .. } if (500..600).contains(status))
    }

    /// HTTP status code, when the API answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } => Some(*status),
            CoreError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
