//! # Daraja Credentials
//!
//! Header and password formatting required by the Daraja API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};

/// `Authorization` value for the OAuth token endpoint
pub fn basic_auth_header(consumer_key: &str, consumer_secret: &str) -> String {
    let credentials = format!("{}:{}", consumer_key, consumer_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}

/// 14-digit `YYYYMMDDHHMMSS` timestamp of a UTC instant.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%d%H%M%S").to_string()
}

/// STK push password: `base64(shortcode + passkey + timestamp)`
pub fn stk_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}
