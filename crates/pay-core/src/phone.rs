//! # Phone Numbers
//!
//! MSISDN handling for Kenyan mobile-money numbers.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country calling code for Kenya
pub const KENYA_COUNTRY_CODE: &str = "254";

/// Rewrite a local-format number ("07...") into international format ("2547...").
///
/// Only a leading `0` is rewritten. Every other input is returned unchanged,
/// so already-international numbers pass straight through.
pub fn normalize_phone(raw: &str) -> String {
    match raw.strip_prefix('0') {
        Some(rest) => format!("{}{}", KENYA_COUNTRY_CODE, rest),
        None => raw.to_string(),
    }
}

/// A payer phone number, validated and normalized at construction.
///
/// Deserialization goes through [`PhoneNumber::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate user input and normalize it.
    ///
    /// Surrounding whitespace and a single leading `+` are ignored. The
    /// remainder must be non-empty ASCII digits.
    pub fn parse(raw: &str) -> PaymentResult<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Phone number is required".to_string(),
            ));
        }

        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidRequest(format!(
                "Phone number must contain digits only: {}",
                trimmed
            )));
        }

        Ok(Self(normalize_phone(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PaymentError;

    fn try_from(raw: String) -> PaymentResult<Self> {
        Self::parse(&raw)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
