//! Error types for the admin data layer.

use std::fmt;

/// Result type for data layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the admin data layer.
///
/// Every client, service, store and storage operation returns `Result<T>`.
/// Variants separate the failure modes the dashboard reacts to differently.
#[derive(Debug, Clone)]
pub enum Error {
    /// The request never completed (DNS, connect, TLS, timeout, body read).
    ///
    /// **Recovery:** Read paths serve fallback data; write paths surface the
    /// error to the caller.
    Network(String),

    /// The backend answered with a non-2xx status other than 401.
    ///
    /// `message` is composed from the JSON `message`/`error` field, the plain
    /// text body, or the status reason, in that order.
    Http {
        /// HTTP status code
        status: u16,
        /// Composed error message
        message: String,
    },

    /// The backend answered 401.
    ///
    /// The client publishes `SessionEvent::Unauthorized` alongside this error;
    /// clearing the session and redirecting to login is done by
    /// `SessionGuard`, never by the transport.
    Unauthenticated(String),

    /// A 2xx response whose envelope carried `success: false`.
    Application(String),

    /// Local persistent storage failed (unavailable directory, quota, I/O).
    Storage(String),

    /// Serializing a request body or stored value failed.
    Serialization(String),

    /// A response body or stored value could not be decoded.
    Deserialization(String),

    /// Input rejected before reaching the backend.
    Validation(String),

    /// Invalid client configuration.
    Config(String),

    /// The addressed record does not exist.
    NotFound(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Unauthenticated(_) => Some(401),
            _ => None,
        }
    }

    /// Whether the error came from the 401 path.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            Error::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            Error::Application(msg) => write!(f, "Request failed: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Validation(msg) => write!(f, "Validation error: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Deserialization(e.to_string())
        } else if e.is_builder() {
            Error::Config(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Storage(e.to_string())
        } else if e.is_syntax() || e.is_eof() || e.is_data() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Http {
            status: 404,
            message: "Customer not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Customer not found");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_status_of_unauthenticated() {
        let err = Error::Unauthenticated("expired".to_string());
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthenticated());
        assert_eq!(Error::Network("down".into()).status(), None);
    }

    #[test]
    fn test_json_syntax_error_maps_to_deserialization() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
