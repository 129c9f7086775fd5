//! # Daraja API Types
//!
//! Wire shapes of the Daraja endpoints used by this crate.

use serde::{Deserialize, Serialize};

/// `GET /oauth/v1/generate` response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Daraja sends this as a string ("3599")
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    pub fn expires_in_secs(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// `POST /mpesa/stkpush/v1/processrequest` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushPayload {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: String,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub callback_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// Error body returned by Daraja on 4xx/5xx
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DarajaErrorResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    error_message: String,
}

/// Human-readable detail for a failed Daraja call, for server-side logs.
pub(crate) fn gateway_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<DarajaErrorResponse>(body) {
        Ok(err) => format!(
            "{} (code={}, request_id={})",
            err.error_message,
            err.error_code.as_deref().unwrap_or("none"),
            err.request_id.as_deref().unwrap_or("none")
        ),
        Err(_) if body.trim().is_empty() => format!("HTTP {} with empty body", status),
        Err(_) => format!("HTTP {}: {}", status, body),
    }
}

/// Describe a transport failure (no HTTP answer was received).
pub(crate) fn transport_error_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}
