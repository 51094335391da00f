//! Error types for MapChat.
//!
//! Failures at the two external boundaries (assistant backend and map surface)
//! have their own enums so callers can recover from them locally. `MapChatError`
//! is the shared error type for everything else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single exchange with the assistant backend failed.
///
/// All variants are treated uniformly as "exchange failed" by the coordinator;
/// the distinction only matters for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned status {status}")]
    Status { status: u16 },

    /// The body could not be decoded as an assistant reply.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

impl ExchangeError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBody(message.into())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedBody(err.to_string())
    }
}

/// A map surface refused or failed an overlay operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Map surface error: {0}")]
pub struct SurfaceError(pub String);

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A shared error type for the MapChat crates.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MapChatError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Backend exchange error
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Map surface error
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MapChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_exchange(&self) -> bool {
        matches!(self, Self::Exchange(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MapChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MapChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MapChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MapChatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MapChatError>`.
pub type Result<T> = std::result::Result<T, MapChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_converts_into_shared_error() {
        let err: MapChatError = ExchangeError::Status { status: 503 }.into();
        assert!(err.is_exchange());
        assert_eq!(err.to_string(), "Backend returned status 503");
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: MapChatError = parse.unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: TOML"));
    }

    #[test]
    fn test_json_error_becomes_malformed_body() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: ExchangeError = parse.unwrap_err().into();
        assert!(matches!(err, ExchangeError::MalformedBody(_)));
    }
}
