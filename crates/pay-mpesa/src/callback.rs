//! # STK Callback Handling
//!
//! Utilities for handling Daraja result callbacks.
//! The gateway posts one callback per STK push once the payer accepts,
//! cancels, or lets the prompt time out.

use pay_core::{Acknowledgement, CallbackNotification, PaymentResult, StkCallback};
use tracing::{debug, error, info, warn};

/// Callback event handler trait
///
/// Implement this trait to react to payment outcomes. Every method has a
/// logging default, so implementors only override what they need.
#[allow(unused_variables)]
pub trait CallbackHandler: Send + Sync {
    /// Called when the payer completed the payment (`ResultCode == 0`)
    fn on_payment_succeeded(&self, callback: &StkCallback) -> PaymentResult<()> {
        info!(
            "Payment succeeded: checkout={}, receipt={:?}, amount={:?}, phone={:?}",
            callback.checkout_request_id,
            callback.receipt_number(),
            callback.amount(),
            callback.phone_number()
        );
        Ok(())
    }

    /// Called for any non-zero result code (cancelled, timeout, insufficient funds, ...)
    fn on_payment_failed(&self, callback: &StkCallback) -> PaymentResult<()> {
        warn!(
            "Payment failed: checkout={}, code={}, desc={}",
            callback.checkout_request_id, callback.result_code, callback.result_desc
        );
        Ok(())
    }

    /// Called when the body is not a recognisable STK callback
    fn on_unrecognized(&self, notification: &CallbackNotification) -> PaymentResult<()> {
        debug!("Unrecognized callback payload ({} bytes)", notification.raw.len());
        Ok(())
    }
}

/// Default handler (just logs outcomes)
pub struct LoggingCallbackHandler;

impl CallbackHandler for LoggingCallbackHandler {}

/// Log a callback, hand it to `handler`, and produce the acknowledgement.
///
/// Always returns [`Acknowledgement::accepted`]: handler errors are logged,
/// never reported back to the gateway.
pub fn dispatch_callback(
    handler: &dyn CallbackHandler,
    notification: &CallbackNotification,
) -> Acknowledgement {
    info!("--- M-Pesa callback received ---\n{}", notification.pretty());

    let result = match &notification.stk_callback {
        Some(callback) if callback.is_success() => handler.on_payment_succeeded(callback),
        Some(callback) => handler.on_payment_failed(callback),
        None => handler.on_unrecognized(notification),
    };

    if let Err(e) = result {
        error!("Callback handler error: {}", e);
    }

    Acknowledgement::accepted()
}
