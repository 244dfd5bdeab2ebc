//! Result and error types for the core library
//!
//! Every expected failure is a typed variant here. Operations return these
//! as values; a rejected operation leaves balances, counters, and journals
//! exactly as they were before the call.

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account closed: {0}")]
    AccountClosed(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Ownership mismatch: {0}")]
    OwnershipMismatch(String),

    #[error("Account limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("SMS delivery failed: {0}")]
    SmsDelivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an insufficient funds error
    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::InsufficientFunds(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_kind() {
        let err = Error::validation("bad input");
        assert!(err.to_string().contains("Validation error"));

        let err = Error::insufficient_funds("need 100, have 50");
        assert!(err.to_string().contains("Insufficient funds"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
