//! Browser tests, run with `wasm-pack test --headless --firefox crates/pay-wasm`.

#![cfg(target_arch = "wasm32")]

use pay_wasm::{outcome_from_response, PaymentFormElements};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn install_form() -> PaymentFormElements {
    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    body.set_inner_html(
        r#"<form id="paymentForm">
             <input id="phone" type="text">
             <input id="amount" type="number">
             <button id="payButton" type="submit">Pay Now</button>
           </form>
           <p id="responseMessage"></p>"#,
    );
    PaymentFormElements::find(&document).unwrap()
}

#[wasm_bindgen_test]
fn renders_error_in_red() {
    let elements = install_form();
    let outcome = outcome_from_response(false, r#"{"message":"Phone number is required"}"#);

    elements.render(&outcome).unwrap();

    assert_eq!(
        elements.message.text_content().unwrap(),
        "Error: Phone number is required"
    );
    assert_eq!(
        elements.message.style().get_property_value("color").unwrap(),
        "red"
    );
}

#[wasm_bindgen_test]
fn mounts_on_payment_form() {
    install_form();
    pay_wasm::mount_payment_form().unwrap();
}
