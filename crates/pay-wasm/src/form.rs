//! DOM binding for the payment form.

use crate::outcome::{
    build_request_body, outcome_from_response, FormOutcome, PAY_LABEL, PROCESSING_LABEL,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Event, HtmlButtonElement, HtmlElement, HtmlInputElement, Request, RequestInit,
    Response,
};

const ENDPOINT: &str = "/stkpush";

/// Handles to the elements the form touches
#[derive(Clone)]
pub struct PaymentFormElements {
    pub phone: HtmlInputElement,
    pub amount: HtmlInputElement,
    pub button: HtmlButtonElement,
    pub message: HtmlElement,
}

impl PaymentFormElements {
    /// Look up `#phone`, `#amount`, `#payButton` and `#responseMessage`
    pub fn find(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            phone: element(document, "phone")?,
            amount: element(document, "amount")?,
            button: element(document, "payButton")?,
            message: element(document, "responseMessage")?,
        })
    }

    fn begin(&self) {
        self.button.set_text_content(Some(PROCESSING_LABEL));
        self.button.set_disabled(true);
        self.message.set_text_content(Some(""));
    }

    fn finish(&self) {
        self.button.set_text_content(Some(PAY_LABEL));
        self.button.set_disabled(false);
    }

    /// Show an outcome in the message element
    pub fn render(&self, outcome: &FormOutcome) -> Result<(), JsValue> {
        self.message.set_text_content(Some(&outcome.message));
        self.message.style().set_property("color", outcome.colour())
    }
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element #{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Element #{} has the wrong type", id)))
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))
}

/// Attach the submit handler to `#paymentForm`
#[wasm_bindgen]
pub fn mount_payment_form() -> Result<(), JsValue> {
    let document = document()?;
    let form = document
        .get_element_by_id("paymentForm")
        .ok_or_else(|| JsValue::from_str("Missing element #paymentForm"))?;
    let elements = PaymentFormElements::find(&document)?;

    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();
        let elements = elements.clone();
        spawn_local(async move { submit(&elements).await });
    });

    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    Ok(())
}

async fn submit(elements: &PaymentFormElements) {
    elements.begin();

    let outcome = match build_request_body(&elements.phone.value(), &elements.amount.value()) {
        Ok(body) => send(&body)
            .await
            .unwrap_or_else(|e| FormOutcome::error(js_error_message(&e))),
        Err(outcome) => outcome,
    };

    if let Err(e) = elements.render(&outcome) {
        crate::log(&format!("Failed to render outcome: {:?}", e));
    }
    elements.finish();
}

async fn send(body: &str) -> Result<FormOutcome, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(ENDPOINT, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();

    Ok(outcome_from_response(response.ok(), &text))
}

fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| crate::outcome::UNKNOWN_ERROR.to_string())
}
