//! # pay-core
//!
//! Core types and traits for the stk-push payment flow.
//!
//! This crate provides:
//! - `PaymentStrategy` trait for implementing mobile-money gateways
//! - `PaymentForm`, `PaymentRequest`, `Amount` and `PhoneNumber` for validated input
//! - `GatewayResponse` and `AccessToken` for gateway answers
//! - `CallbackNotification` and `Acknowledgement` for result callbacks
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{PaymentRequest, PaymentStrategy};
//!
//! // "07..." numbers are rewritten to "2547..."
//! let request = PaymentRequest::new("0712345678", 100)?;
//!
//! let response = strategy.initiate_payment(&request).await?;
//! println!("checkout id: {:?}", response.checkout_request_id());
//! ```

pub mod callback;
pub mod error;
pub mod payment;
pub mod phone;
pub mod strategy;

// Re-exports for convenience
pub use callback::{Acknowledgement, CallbackItem, CallbackMetadata, CallbackNotification, StkCallback};
pub use error::{PaymentError, PaymentResult, GENERIC_FAILURE_MESSAGE};
pub use payment::{AccessToken, Amount, AmountInput, GatewayResponse, PaymentForm, PaymentRequest};
pub use phone::{normalize_phone, PhoneNumber, KENYA_COUNTRY_CODE};
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
