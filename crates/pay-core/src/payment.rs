//! # Payment Types
//!
//! Request/response types for STK push initiation.

use crate::error::{PaymentError, PaymentResult};
use crate::phone::PhoneNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount in whole Kenyan shillings. M-Pesa does not accept fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    /// Smallest amount the gateway accepts
    pub const MIN: u64 = 1;

    pub fn new(value: u64) -> PaymentResult<Self> {
        if value < Self::MIN {
            return Err(PaymentError::InvalidRequest(format!(
                "Amount must be at least {}",
                Self::MIN
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = PaymentError;

    fn try_from(value: u64) -> PaymentResult<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KES {}", self.0)
    }
}

/// Amount as submitted by a client.
///
/// HTML inputs submit strings, API callers usually send numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// Parse into a validated [`Amount`]
    pub fn to_amount(&self) -> PaymentResult<Amount> {
        let whole = match self {
            AmountInput::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            AmountInput::Text(s) => s.trim().parse::<u64>().ok(),
        };

        let value = whole.ok_or_else(|| {
            PaymentError::InvalidRequest(format!(
                "Amount must be a whole number: {}",
                self
            ))
        })?;

        Amount::new(value)
    }
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountInput::Number(n) => write!(f, "{}", n),
            AmountInput::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Body posted by the payment form: `{ "phone": ..., "amount": ... }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountInput>,
}

impl PaymentForm {
    pub fn new(phone: impl Into<String>, amount: AmountInput) -> Self {
        Self {
            phone: Some(phone.into()),
            amount: Some(amount),
        }
    }

    /// Validate the form into a [`PaymentRequest`]
    pub fn into_request(self) -> PaymentResult<PaymentRequest> {
        let phone = self.phone.ok_or_else(|| {
            PaymentError::InvalidRequest("Phone number is required".to_string())
        })?;
        let amount = self
            .amount
            .ok_or_else(|| PaymentError::InvalidRequest("Amount is required".to_string()))?;

        Ok(PaymentRequest {
            phone_number: PhoneNumber::parse(&phone)?,
            amount: amount.to_amount()?,
        })
    }
}

/// A validated payment initiation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Payer phone, already in international format
    pub phone_number: PhoneNumber,
    pub amount: Amount,
}

impl PaymentRequest {
    pub fn new(phone: &str, amount: u64) -> PaymentResult<Self> {
        Ok(Self {
            phone_number: PhoneNumber::parse(phone)?,
            amount: Amount::new(amount)?,
        })
    }
}

/// Short-lived bearer token issued by the gateway
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub value: String,
    /// Lifetime in seconds as reported by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_in: None,
        }
    }

    /// `Authorization` header value for gateway calls
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Gateway answer to an accepted STK push, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayResponse(serde_json::Value);

impl GatewayResponse {
    pub fn new(body: serde_json::Value) -> Self {
        Self(body)
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_body(self) -> serde_json::Value {
        self.0
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn merchant_request_id(&self) -> Option<&str> {
        self.field("MerchantRequestID")
    }

    pub fn checkout_request_id(&self) -> Option<&str> {
        self.field("CheckoutRequestID")
    }

    pub fn response_code(&self) -> Option<&str> {
        self.field("ResponseCode")
    }

    pub fn customer_message(&self) -> Option<&str> {
        self.field("CustomerMessage")
    }
}
