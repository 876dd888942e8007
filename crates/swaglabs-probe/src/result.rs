//! Result and error types for the page layer.
//!
//! Every page operation propagates one of these unchanged. Nothing in the
//! crate retries or maps a failure to a default value, with two exceptions
//! documented on the operations themselves: an absent cart badge reads as
//! zero, and an absent checkout error reads as `None`.

use thiserror::Error;

/// Result type for page-layer operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors surfaced by locators, pages, fixtures and drivers
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A single-element operation found no match within its bound
    #[error("No element matching `{selector}` within {timeout_ms}ms")]
    NotFound {
        /// Canonical selector string
        selector: String,
        /// Bound that elapsed
        timeout_ms: u64,
    },

    /// A bounded wait never reached the expected state
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Bound that elapsed
        ms: u64,
    },

    /// A locator meant to identify one element matched several
    #[error("Strict mode violation: `{selector}` resolved to {count} elements")]
    AmbiguousMatch {
        /// Canonical selector string
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Text expected to parse as a number or enum did not
    #[error("Data integrity error: {message}")]
    DataIntegrity {
        /// Error message
        message: String,
    },

    /// Selector or pattern the driver cannot evaluate
    #[error("Invalid selector `{selector}`: {message}")]
    InvalidSelector {
        /// Offending selector text
        selector: String,
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Remote session error (evaluation, action dispatch, closed page)
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Fixture registry error (unknown role name)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Assertion failed (from `expect_*`)
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Shorthand for a session-level failure
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Shorthand for a parse failure on page text
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    /// Whether this failure came from a bounded wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Timeout { .. })
    }
}
