//! Error types shared by the client, batch and management layers
//!
//! Two families:
//! - [`ClientError`]: anything that went wrong talking to the backend
//! - [`InputError`]: rejected locally before any request was made

use std::path::PathBuf;

use thiserror::Error;

/// Failure while calling the remote classifier backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS or body transfer failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status without a parsable JSON body
    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Body was not the JSON shape we expected
    #[error("invalid JSON from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON parsed but required fields were missing
    #[error("malformed response: {0}")]
    Malformed(&'static str),

    /// Backend answered with a non-success status
    #[error("{}", .message.as_deref().unwrap_or("request rejected by server"))]
    Rejected { message: Option<String> },

    /// Bad server base URL or endpoint path
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// True for failures where the response arrived but was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(self, ClientError::Decode(_) | ClientError::Malformed(_))
    }
}

/// Local validation failure; never results in a network call
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no files selected")]
    NoFiles,

    #[error("none of the selected files is an image")]
    NoImages,

    #[error("confidence must be between 0 and 1, got {0}")]
    ConfidenceOutOfRange(f32),

    #[error("model file must have a .{expected} extension: {path}")]
    ModelExtension {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("model {0} is active and cannot be deleted")]
    ActiveModel(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_backend_message() {
        let err = ClientError::Rejected {
            message: Some("Model tidak ditemukan".to_string()),
        };
        assert_eq!(err.to_string(), "Model tidak ditemukan");

        let err = ClientError::Rejected { message: None };
        assert_eq!(err.to_string(), "request rejected by server");
    }

    #[test]
    fn test_malformed_classification() {
        assert!(ClientError::Malformed("missing stats").is_malformed());
        let http = ClientError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!http.is_malformed());
    }
}
