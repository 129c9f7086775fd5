//! # Payment Error Types
//!
//! Typed error handling for the STK push flow.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Message returned to clients for any upstream failure.
///
/// Upstream bodies can carry credential or merchant details, so they are
/// logged server-side and never echoed back.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during the STK push process.";

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Access token could not be obtained from the gateway
    #[error("Token request failed{}: {message}", status_suffix(.status))]
    UpstreamAuth {
        status: Option<u16>,
        message: String,
    },

    /// STK push submission was rejected or never completed
    #[error("STK push request failed{}: {message}", status_suffix(.status))]
    UpstreamPayment {
        status: Option<u16>,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl PaymentError {
    /// Returns true if this error is retryable.
    ///
    /// Upstream failures without a status never got an answer (connect
    /// error, timeout). 429 and 5xx are treated as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::UpstreamAuth { status, .. }
            | PaymentError::UpstreamPayment { status, .. } => match status {
                None => true,
                Some(code) => *code == 429 || *code >= 500,
            },
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::Configuration(_)
            | PaymentError::UpstreamAuth { .. }
            | PaymentError::UpstreamPayment { .. }
            | PaymentError::Serialization(_) => 500,
        }
    }

    /// Message that is safe to show to the caller
    pub fn client_message(&self) -> String {
        match self {
            PaymentError::InvalidRequest(msg) => msg.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
