//! # pay-wasm
//!
//! The browser side of stk-push-rs: the payment form, compiled to WebAssembly.
//!
//! On submit the form:
//! - switches the button to "Processing..." and disables it
//! - validates the input and POSTs `{ phone, amount }` to `/stkpush`
//! - shows a green success or red error message
//! - always restores the "Pay Now" button
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mount_payment_form } from './pkg/pay_wasm.js';
//!
//! await init();
//! mount_payment_form();
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/pay-wasm --target web --out-dir ../../static/pkg
//! ```

pub mod form;
pub mod outcome;

pub use form::{mount_payment_form, PaymentFormElements};
pub use outcome::{build_request_body, outcome_from_response, FormOutcome};

use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    log(&format!("pay-wasm {} loaded", version()));
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
