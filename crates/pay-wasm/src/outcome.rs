//! Request building and response interpretation for the payment form.
//!
//! Nothing here touches the DOM, so it runs (and is tested) natively.

use pay_core::{AmountInput, PaymentForm};
use serde::Deserialize;

pub const PAY_LABEL: &str = "Pay Now";
pub const PROCESSING_LABEL: &str = "Processing...";
pub const SUCCESS_MESSAGE: &str =
    "STK push sent! Please check your phone to complete the payment.";
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// What the form shows after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    pub success: bool,
    pub message: String,
}

impl FormOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Error outcome, rendered as `Error: {reason}`
    pub fn error(reason: impl AsRef<str>) -> Self {
        Self {
            success: false,
            message: format!("Error: {}", reason.as_ref()),
        }
    }

    /// CSS colour for the message
    pub fn colour(&self) -> &'static str {
        if self.success {
            "green"
        } else {
            "red"
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Interpret a `/stkpush` response.
///
/// A 2xx status is only a success when the body is JSON; error bodies
/// contribute their `message` when present.
pub fn outcome_from_response(ok: bool, body: &str) -> FormOutcome {
    let parsed: Result<serde_json::Value, _> = serde_json::from_str(body);

    match (ok, parsed) {
        (true, Ok(_)) => FormOutcome::success(),
        (_, Err(e)) => FormOutcome::error(format!("Invalid response from server: {}", e)),
        (false, Ok(value)) => {
            let message = serde_json::from_value::<ErrorBody>(value)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty());
            FormOutcome::error(message.as_deref().unwrap_or(UNKNOWN_ERROR))
        }
    }
}

/// Validate the raw input values and produce the JSON request body.
///
/// Values are sent as typed, the server normalizes the phone number.
pub fn build_request_body(phone: &str, amount: &str) -> Result<String, FormOutcome> {
    let form = PaymentForm::new(phone, AmountInput::Text(amount.to_string()));

    form.clone()
        .into_request()
        .map_err(|e| FormOutcome::error(e.client_message()))?;

    serde_json::to_string(&form).map_err(|e| FormOutcome::error(e.to_string()))
}
