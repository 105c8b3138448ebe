//! Error types for the library API.

use thiserror::Error;

/// Failures of a single request/response exchange with the remote service.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The service answered with a non-success status code.
    #[error("HTTP error! status: {status}")]
    Status {
        /// The HTTP status code returned by the service.
        status: u16,
        /// The raw response body, kept for diagnostics.
        body: String,
    },

    /// The request never produced a response (connection, timeout, TLS, ...).
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body could not be decoded as JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Returns the HTTP status code, if the service produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network(e) => e.status().map(|s| s.as_u16()),
            TransportError::Decode(_) => None,
        }
    }
}

/// A comprehensive error type for all operations in the library API.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Missing or invalid configuration or call arguments.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error originating from the request executor.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A step's variables resolver failed.
    #[error("Resolver error: {0}")]
    Resolve(String),

    /// A chain step failed; the remaining steps were not executed.
    #[error("Chain step '{step_id}' failed: {message}")]
    ChainStep {
        step_id: String,
        message: String,
        #[source]
        source: Box<PromptError>,
    },

    /// Failed to serialize or deserialize data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PromptError::Config(msg.into())
    }

    /// Wraps `cause` as the failure of chain step `step_id`.
    pub fn chain_step(step_id: impl Into<String>, cause: PromptError) -> Self {
        PromptError::ChainStep {
            step_id: step_id.into(),
            message: cause.to_string(),
            source: Box::new(cause),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, PromptError::Config(_))
    }

    /// The id of the failing step, for chain failures.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            PromptError::ChainStep { step_id, .. } => Some(step_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn chain_step_keeps_cause() {
        let cause = PromptError::Transport(TransportError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });
        let err = PromptError::chain_step("summarize", cause);

        assert_eq!(err.step_id(), Some("summarize"));
        assert_eq!(
            err.to_string(),
            "Chain step 'summarize' failed: HTTP error! status: 502"
        );
        let source = err.source().expect("source is preserved");
        assert_eq!(source.to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn status_accessor() {
        let err = TransportError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(TransportError::Decode("eof".into()).status(), None);
    }
}
