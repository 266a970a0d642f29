//! Error types for vitrine.
//!
//! One unified error type with explicit variants for the failure modes a
//! caller must tell apart: bad input, missing objects, backpressure from the
//! store, corrupted payloads, and an unavailable listing.

use std::fmt;
use std::io;

use thiserror::Error;

/// The unified error type for vitrine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, reset, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the object store.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (unsafe key, bad page bounds, bad URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The store has no object at a validated key.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// The store kept rate-limiting after every retry was spent.
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// A body that is not valid data for its expected schema.
    #[error("corrupted payload for {key}: {reason}")]
    Corrupted { key: String, reason: String },

    /// The listing primitive itself failed.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl Error {
    /// Machine-readable category for API error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport",
            Error::Protocol(_) => "protocol",
            Error::InvalidInput(_) => "validation",
            Error::NotFound { .. } => "not_found",
            Error::RateLimited { .. } => "rate_limited",
            Error::Corrupted { .. } => "corrupted",
            Error::Unavailable { .. } => "unavailable",
        }
    }

    /// Whether the store answered 429 for this request.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::Protocol(e) => e.is_rate_limited(),
            Error::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Whether this is a reset-type network failure worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_reset())
    }

    /// Whether this error means "no object here".
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Protocol(e) => e.status == 404,
            _ => false,
        }
    }

    /// Wrap a listing failure so it surfaces as a 5xx-class error.
    pub fn unavailable(source: impl fmt::Display) -> Self {
        Error::Unavailable {
            reason: source.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// An established connection was reset or aborted mid-request.
    #[error("connection reset: {message}")]
    Reset { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Local I/O failure (filesystem backend).
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl TransportError {
    /// Reset-type failures follow the same backoff path as rate limiting.
    pub fn is_reset(&self) -> bool {
        matches!(
            self,
            TransportError::Reset { .. } | TransportError::Timeout { .. }
        )
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => TransportError::Reset {
                message: err.to_string(),
            },
            io::ErrorKind::TimedOut => TransportError::Timeout {
                message: err.to_string(),
            },
            _ => TransportError::Io {
                message: err.to_string(),
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Non-success responses from the object store.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Store error code (if present).
    pub error: Option<String>,
    /// Error message from the store.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if the store is pushing back.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.error.as_deref() == Some("RateLimited")
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Key rejected by namespace rules.
    #[error("invalid key '{value}': {reason}")]
    Key { value: String, reason: String },

    /// Invalid store URL.
    #[error("invalid store URL '{value}': {reason}")]
    StoreUrl { value: String, reason: String },

    /// Unknown or malformed domain.
    #[error("invalid domain '{value}': {reason}")]
    Domain { value: String, reason: String },

    /// Page or page size out of bounds.
    #[error("invalid page request: {reason}")]
    Page { reason: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            Error::NotFound {
                key: "notices/a.json".into()
            }
            .category(),
            "not_found"
        );
        assert_eq!(Error::RateLimited { attempts: 4 }.category(), "rate_limited");
        assert_eq!(
            Error::from(InvalidInputError::Page {
                reason: "zero".into()
            })
            .category(),
            "validation"
        );
    }

    #[test]
    fn rate_limit_detection() {
        let err = Error::Protocol(ProtocolError::new(429, None, None));
        assert!(err.is_rate_limited());
        assert!(!err.is_transient());

        let err = Error::Protocol(ProtocolError::new(500, None, None));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn reset_is_transient_but_refused_is_not() {
        let reset = Error::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(reset.is_transient());

        let refused = Error::from(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(!refused.is_transient());
    }

    #[test]
    fn protocol_404_is_not_found() {
        assert!(Error::Protocol(ProtocolError::new(404, None, None)).is_not_found());
        assert!(!Error::Protocol(ProtocolError::new(410, None, None)).is_not_found());
    }

    #[test]
    fn protocol_display() {
        let err = ProtocolError::new(
            429,
            Some("RateLimited".into()),
            Some("slow down".into()),
        );
        assert_eq!(err.to_string(), "HTTP 429 [RateLimited]: slow down");
    }
}
