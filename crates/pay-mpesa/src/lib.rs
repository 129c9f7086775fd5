//! # pay-mpesa
//!
//! M-Pesa (Safaricom Daraja) STK push strategy for stk-push-rs.
//!
//! Flow for one payment:
//!
//! 1. `TokenClient` trades the consumer key/secret for a bearer token
//! 2. `MpesaStkStrategy` builds the signed payload (password =
//!    `base64(shortcode + passkey + timestamp)`) and submits it
//! 3. Daraja prompts the payer and later posts the outcome to the
//!    callback URL, handled by `dispatch_callback`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_mpesa::{MpesaConfig, MpesaStkStrategy};
//! use pay_core::{PaymentRequest, PaymentStrategy};
//!
//! let config = MpesaConfig::from_env()?;
//! let strategy = MpesaStkStrategy::new(&config)?;
//!
//! let request = PaymentRequest::new("0712345678", 1)?;
//! let response = strategy.initiate_payment(&request).await?;
//! ```
//!
//! ## Callback Handling
//!
//! ```rust,ignore
//! use pay_mpesa::{dispatch_callback, CallbackHandler};
//!
//! struct Fulfil;
//!
//! impl CallbackHandler for Fulfil {
//!     fn on_payment_succeeded(&self, cb: &StkCallback) -> PaymentResult<()> {
//!         println!("paid: {:?}", cb.receipt_number());
//!         Ok(())
//!     }
//! }
//!
//! let notification = strategy.parse_callback(&body);
//! let ack = dispatch_callback(&Fulfil, &notification);
//! ```

pub mod api;
pub mod callback;
pub mod config;
pub mod credentials;
pub mod retry;
pub mod stk_push;
pub mod token;

// Re-exports
pub use api::StkPushPayload;
pub use callback::{dispatch_callback, CallbackHandler, LoggingCallbackHandler};
pub use config::{MerchantProfile, MpesaConfig, MpesaEnvironment, TransactionType};
pub use credentials::{basic_auth_header, format_timestamp, stk_password};
pub use retry::RetryPolicy;
pub use stk_push::MpesaStkStrategy;
pub use token::TokenClient;
