//! Error types for placefinder

use thiserror::Error;

/// Main error type for placefinder operations
///
/// The first four variants are the location taxonomy: they are absorbed at the
/// component that detects them and never reach the UI as a blocking failure.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geolocation permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),

    #[error("Location resolution failed: {0}")]
    Resolution(String),
}

impl Error {
    /// Classify a transport error from reqwest as a network failure
    pub fn network(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network(format!("{context}: timed out"))
        } else {
            Error::Network(format!("{context}: {err}"))
        }
    }
}

/// Result type alias for placefinder operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::MalformedInput("postal code must have 8 digits".to_string());
        assert_eq!(err.to_string(), "Malformed input: postal code must have 8 digits");

        let err = Error::PermissionDenied("user refused".to_string());
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
