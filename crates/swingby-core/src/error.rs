//! Error types for swingby.

use thiserror::Error;

/// Result type alias using swingby's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for swingby operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A single bibliographic source failed; recovered locally by the
    /// reconciler, never surfaced to the indexing caller.
    #[error("Source error ({source_id}): {message}")]
    Source { source_id: String, message: String },

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Completion/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Knowledge store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error; fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a provider failure from the named source.
    pub fn source(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Source {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source() {
        let err = Error::source("ads", "maintenance page");
        assert_eq!(err.to_string(), "Source error (ads): maintenance page");
    }

    #[test]
    fn test_error_display_embedding() {
        let err = Error::Embedding("failed to generate".to_string());
        assert_eq!(err.to_string(), "Embedding error: failed to generate");
    }

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("rename failed".to_string());
        assert_eq!(err.to_string(), "Store error: rename failed");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
