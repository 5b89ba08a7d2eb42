//! Error types for ttlkv

use std::fmt;

/// Result type alias for ttlkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the store's configuration, reclaimer and wire layer.
///
/// The store operations themselves (`set`, `get`, `delete`) never fail:
/// a missing or expired key is a normal outcome, not an error.
#[derive(Debug)]
pub enum Error {
    /// Configuration rejected by validation
    InvalidConfig(String),

    /// The background reclaimer task panicked
    ReclaimerPanicked(String),

    /// A wire frame could not be decoded
    Decode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ReclaimerPanicked(msg) => write!(f, "Reclaimer panicked: {}", msg),
            Error::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::InvalidConfig("reclaim interval must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: reclaim interval must be non-zero"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
