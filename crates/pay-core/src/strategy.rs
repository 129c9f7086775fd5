//! # Payment Strategy Trait
//!
//! Seam between the HTTP layer and a mobile-money gateway.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           PaymentStrategy (trait)           │
//! │  ├── initiate_payment()                     │
//! │  ├── parse_callback()                       │
//! │  └── provider_name()                        │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!                       │
//!             ┌─────────┴─────────┐
//!             │  MpesaStkStrategy │
//!             └───────────────────┘
//! ```

use crate::callback::CallbackNotification;
use crate::error::PaymentResult;
use crate::payment::{GatewayResponse, PaymentRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Ask the gateway to prompt the payer's phone.
    ///
    /// # Arguments
    /// * `request` - Validated phone number and amount
    ///
    /// # Returns
    /// The gateway's acknowledgement body, unmodified.
    async fn initiate_payment(&self, request: &PaymentRequest) -> PaymentResult<GatewayResponse>;

    /// Interpret a result notification. Never fails: the gateway must always
    /// be acknowledged.
    fn parse_callback(&self, payload: &[u8]) -> CallbackNotification {
        CallbackNotification::from_bytes(payload)
    }

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;

    /// Path the gateway posts result notifications to.
    fn callback_path(&self) -> &'static str {
        "/callback"
    }
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;
