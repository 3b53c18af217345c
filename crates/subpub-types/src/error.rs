//! Error types for SubPub
//!
//! Publishing to a topic nobody listens on and revoking a subscription twice
//! are not errors, so neither has a variant here.

use thiserror::Error;

/// Main error type for SubPub operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The broker has been closed; it never reopens
    #[error("broker is closed")]
    Closed,

    /// Close gave up waiting for deliveries to drain
    #[error("deadline exceeded with {in_flight} deliveries still in flight")]
    DeadlineExceeded {
        /// Invocations still running when the deadline fired
        in_flight: usize,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for [`Error::Closed`]
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }

    /// True for [`Error::DeadlineExceeded`]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Error::DeadlineExceeded { .. })
    }
}

/// Result type alias for SubPub operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Closed.to_string(), "broker is closed");
        assert_eq!(
            Error::DeadlineExceeded { in_flight: 3 }.to_string(),
            "deadline exceeded with 3 deliveries still in flight"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::Closed.is_closed());
        assert!(!Error::Closed.is_deadline_exceeded());
        assert!(Error::DeadlineExceeded { in_flight: 0 }.is_deadline_exceeded());
        assert!(!Error::Internal("x".into()).is_closed());
    }
}
