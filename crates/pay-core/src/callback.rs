//! # Callback Types
//!
//! Result notifications pushed by the gateway once the payer has answered
//! (or ignored) the STK prompt.
//!
//! The gateway is the only authority on the payload shape, so nothing here
//! rejects a notification. A typed [`StkCallback`] view is extracted when the
//! body looks like a Daraja `stkCallback` envelope:
//!
//! ```text
//! { "Body": { "stkCallback": {
//!     "MerchantRequestID": "...", "CheckoutRequestID": "...",
//!     "ResultCode": 0, "ResultDesc": "...",
//!     "CallbackMetadata": { "Item": [ { "Name": "Amount", "Value": 1 }, ... ] }
//! } } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A received callback, kept as raw text plus whatever could be parsed.
#[derive(Debug, Clone)]
pub struct CallbackNotification {
    /// Body exactly as received
    pub raw: String,
    /// Body as JSON, if it was JSON
    pub json: Option<serde_json::Value>,
    /// Typed STK callback, if the JSON had the expected envelope
    pub stk_callback: Option<StkCallback>,
    /// When the notification reached us
    pub received_at: DateTime<Utc>,
}

impl CallbackNotification {
    /// Build from a request body. Never fails.
    pub fn from_bytes(body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).into_owned();
        let json = serde_json::from_slice::<serde_json::Value>(body).ok();
        let stk_callback = json.as_ref().and_then(StkCallback::from_json);

        Self {
            raw,
            json,
            stk_callback,
            received_at: Utc::now(),
        }
    }

    /// Pretty-printed body for logs
    pub fn pretty(&self) -> String {
        self.json
            .as_ref()
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_else(|| self.raw.clone())
    }

    pub fn is_json(&self) -> bool {
        self.json.is_some()
    }
}

/// The `Body.stkCallback` object of a Daraja result notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<CallbackItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackItem {
    pub name: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl StkCallback {
    /// Extract from a full callback body
    pub fn from_json(body: &serde_json::Value) -> Option<Self> {
        let inner = body.get("Body")?.get("stkCallback")?;
        serde_json::from_value(inner.clone()).ok()
    }

    /// `ResultCode == 0` means the payer completed the payment
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Look up a metadata item by name
    pub fn metadata_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.callback_metadata
            .as_ref()?
            .items
            .iter()
            .find(|item| item.name == name)?
            .value
            .as_ref()
    }

    pub fn amount(&self) -> Option<f64> {
        self.metadata_value("Amount")?.as_f64()
    }

    pub fn receipt_number(&self) -> Option<&str> {
        self.metadata_value("MpesaReceiptNumber")?.as_str()
    }

    /// Payer phone. The gateway sends it as a JSON number.
    pub fn phone_number(&self) -> Option<String> {
        match self.metadata_value("PhoneNumber")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Reply the gateway expects for every callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Acknowledgement {
    pub result_code: i32,
    pub result_desc: String,
}

impl Acknowledgement {
    pub fn accepted() -> Self {
        Self {
            result_code: 0,
            result_desc: "Accepted".to_string(),
        }
    }
}

impl Default for Acknowledgement {
    fn default() -> Self {
        Self::accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn success_body() -> serde_json::Value {
        json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            { "Name": "Amount", "Value": 1.00 },
                            { "Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV" },
                            { "Name": "TransactionDate", "Value": 20191219102115u64 },
                            { "Name": "PhoneNumber", "Value": 254708374149u64 }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn test_parse_successful_callback() {
        let body = serde_json::to_vec(&success_body()).unwrap();
        let notification = CallbackNotification::from_bytes(&body);

        let callback = notification.stk_callback.expect("typed callback");
        assert!(callback.is_success());
        assert_eq!(callback.checkout_request_id, "ws_CO_191220191020363925");
        assert_eq!(callback.amount(), Some(1.0));
        assert_eq!(callback.receipt_number(), Some("NLJ7RT61SV"));
        assert_eq!(callback.phone_number().as_deref(), Some("254708374149"));
    }

    #[test]
    fn test_parse_cancelled_callback() {
        let body = json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "8555-67195-1",
                    "CheckoutRequestID": "ws_CO_27072017151044001",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        });
        let callback = StkCallback::from_json(&body).unwrap();

        assert!(!callback.is_success());
        assert_eq!(callback.receipt_number(), None);
        assert_eq!(callback.amount(), None);
    }

    #[test]
    fn test_unrecognised_bodies_are_kept() {
        let empty = CallbackNotification::from_bytes(b"{}");
        assert!(empty.is_json());
        assert!(empty.stk_callback.is_none());

        let garbage = CallbackNotification::from_bytes(b"not json {");
        assert!(!garbage.is_json());
        assert_eq!(garbage.raw, "not json {");
        assert_eq!(garbage.pretty(), "not json {");
    }

    #[test]
    fn test_acknowledgement_wire_format() {
        let ack = serde_json::to_value(Acknowledgement::accepted()).unwrap();
        assert_eq!(ack, json!({ "ResultCode": 0, "ResultDesc": "Accepted" }));
    }
}
