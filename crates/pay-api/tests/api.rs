//! End-to-end tests for the HTTP surface, with Daraja mocked by wiremock.

use axum::http::StatusCode;
use axum_test::TestServer;
use pay_api::{create_router, AppConfig, AppState};
use pay_core::{CallbackNotification, PaymentResult, StkCallback, GENERIC_FAILURE_MESSAGE};
use pay_mpesa::{CallbackHandler, MpesaConfig, RetryPolicy};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../static");

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<String>>,
}

impl RecordingHandler {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl CallbackHandler for RecordingHandler {
    fn on_payment_succeeded(&self, callback: &StkCallback) -> PaymentResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("succeeded:{}", callback.checkout_request_id));
        Ok(())
    }

    fn on_payment_failed(&self, callback: &StkCallback) -> PaymentResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("failed:{}", callback.result_code));
        Ok(())
    }

    fn on_unrecognized(&self, _notification: &CallbackNotification) -> PaymentResult<()> {
        self.events.lock().unwrap().push("unrecognized".to_string());
        Ok(())
    }
}

fn app_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        static_dir: PathBuf::from(STATIC_DIR),
    }
}

fn mpesa_config(daraja: &MockServer) -> MpesaConfig {
    MpesaConfig::new(
        "user",
        "pass",
        "174379",
        "passkey",
        "https://example.com/callback",
    )
    .with_api_base_url(daraja.uri())
    .with_retry(RetryPolicy::none())
}

fn test_server(daraja: &MockServer, handler: Arc<RecordingHandler>) -> TestServer {
    server_with_config(&mpesa_config(daraja), handler)
}

fn server_with_config(mpesa: &MpesaConfig, handler: Arc<RecordingHandler>) -> TestServer {
    let state = AppState::new(app_config(), mpesa)
        .unwrap()
        .with_callback_handler(handler);

    TestServer::new(create_router(state)).unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": "3599"
        })))
        .mount(server)
        .await;
}

fn stk_success_body() -> Value {
    json!({
        "MerchantRequestID": "29115-34620561-1",
        "CheckoutRequestID": "ws_CO_191220191020363925",
        "ResponseCode": "0",
        "ResponseDescription": "Success. Request accepted for processing",
        "CustomerMessage": "Success. Request accepted for processing"
    })
}

// ============================================================================
// Status & static
// ============================================================================

#[tokio::test]
async fn test_status() {
    let daraja = MockServer::start().await;
    let server = test_server(&daraja, Arc::default());

    let response = server.get("/status").await;
    response.assert_status_ok();
    response.assert_text("Server is up and running.");
}

#[tokio::test]
async fn test_health() {
    let daraja = MockServer::start().await;
    let server = test_server(&daraja, Arc::default());

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["provider"], "mpesa");
}

#[tokio::test]
async fn test_index_serves_payment_form() {
    let daraja = MockServer::start().await;
    let server = test_server(&daraja, Arc::default());

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("paymentForm"));
}

// ============================================================================
// STK push
// ============================================================================

#[tokio::test]
async fn test_stk_push_returns_gateway_body() {
    let daraja = MockServer::start().await;
    mount_token(&daraja).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stk_success_body()))
        .expect(1)
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "0712345678", "amount": "10" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&stk_success_body());
}

#[tokio::test]
async fn test_stk_push_token_failure_hides_detail() {
    let daraja = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "400.008.01",
            "errorMessage": "Invalid Authentication passed"
        })))
        .mount(&daraja)
        .await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stk_success_body()))
        .expect(0)
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "0712345678", "amount": 1 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "message": GENERIC_FAILURE_MESSAGE }));
    assert!(!response.text().contains("Invalid Authentication"));
}

#[tokio::test]
async fn test_stk_push_gateway_rejection_is_500() {
    let daraja = MockServer::start().await;
    mount_token(&daraja).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": "400.002.02",
            "errorMessage": "Bad Request - Invalid Amount"
        })))
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "254712345678", "amount": 5 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "message": GENERIC_FAILURE_MESSAGE }));
}

#[tokio::test]
async fn test_stk_push_invalid_bodies_rejected_locally() {
    let daraja = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/v1/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    let bodies = [
        json!({ "amount": 10 }),
        json!({ "phone": "0712345678" }),
        json!({ "phone": "", "amount": 10 }),
        json!({ "phone": "07123abc", "amount": 10 }),
        json!({ "phone": "0712345678", "amount": 0 }),
        json!({ "phone": "0712345678", "amount": "ten" }),
    ];

    for body in bodies {
        let response = server.post("/stkpush").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert!(error["message"].is_string(), "body {} gave {}", body, error);
    }

    let response = server.post("/stkpush").text("phone=0712345678").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.post("/stkpush").form(&[("phone", "0712345678")]).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Amount is required" }));
}

#[tokio::test]
async fn test_stk_push_accepts_urlencoded_form() {
    let daraja = MockServer::start().await;
    mount_token(&daraja).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .and(body_partial_json(json!({
            "Amount": 10,
            "PartyA": "254712345678",
            "PhoneNumber": "254712345678"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stk_success_body()))
        .expect(1)
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    let response = server
        .post("/stkpush")
        .form(&[("phone", "0712345678"), ("amount", "10")])
        .await;

    response.assert_status_ok();
    response.assert_json(&stk_success_body());
}

#[tokio::test]
async fn test_stk_push_accepts_leading_plus() {
    let daraja = MockServer::start().await;
    mount_token(&daraja).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .and(body_partial_json(json!({ "PhoneNumber": "254712345678" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stk_success_body()))
        .expect(1)
        .mount(&daraja)
        .await;

    let server = test_server(&daraja, Arc::default());

    server
        .post("/stkpush")
        .json(&json!({ "phone": "+254712345678", "amount": 10 }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_stk_push_upstream_timeout_is_500() {
    let daraja = MockServer::start().await;
    mount_token(&daraja).await;

    Mock::given(method("POST"))
        .and(path("/mpesa/stkpush/v1/processrequest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(stk_success_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&daraja)
        .await;

    let mpesa = mpesa_config(&daraja).with_timeout(Duration::from_millis(200));
    let server = server_with_config(&mpesa, Arc::default());

    let response = server
        .post("/stkpush")
        .json(&json!({ "phone": "0712345678", "amount": 1 }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "message": GENERIC_FAILURE_MESSAGE }));
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn test_callback_success_dispatched() {
    let daraja = MockServer::start().await;
    let handler = Arc::new(RecordingHandler::default());
    let server = test_server(&daraja, handler.clone());

    let response = server
        .post("/callback")
        .json(&json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            { "Name": "Amount", "Value": 1.0 },
                            { "Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV" },
                            { "Name": "PhoneNumber", "Value": 254712345678u64 }
                        ]
                    }
                }
            }
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ResultCode": 0, "ResultDesc": "Accepted" }));
    assert_eq!(
        handler.events(),
        vec!["succeeded:ws_CO_191220191020363925".to_string()]
    );
}

#[tokio::test]
async fn test_callback_cancelled_dispatched() {
    let daraja = MockServer::start().await;
    let handler = Arc::new(RecordingHandler::default());
    let server = test_server(&daraja, handler.clone());

    server
        .post("/callback")
        .json(&json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "1",
                    "CheckoutRequestID": "2",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        }))
        .await
        .assert_status_ok();

    assert_eq!(handler.events(), vec!["failed:1032".to_string()]);
}

#[tokio::test]
async fn test_callback_always_acknowledged() {
    let daraja = MockServer::start().await;
    let handler = Arc::new(RecordingHandler::default());
    let server = test_server(&daraja, handler.clone());

    let ack = json!({ "ResultCode": 0, "ResultDesc": "Accepted" });

    let response = server.post("/callback").json(&json!({})).await;
    response.assert_status_ok();
    response.assert_json(&ack);

    let response = server.post("/callback").bytes("{not json".into()).await;
    response.assert_status_ok();
    response.assert_json(&ack);

    let response = server.post("/callback").await;
    response.assert_status_ok();
    response.assert_json(&ack);

    assert_eq!(handler.events().len(), 3);
    assert!(handler.events().iter().all(|e| e == "unrecognized"));
}

#[tokio::test]
async fn test_callback_large_body_acknowledged() {
    let daraja = MockServer::start().await;
    let handler = Arc::new(RecordingHandler::default());
    let server = test_server(&daraja, handler.clone());

    let body = vec![b'x'; 3 * 1024 * 1024];
    let response = server.post("/callback").bytes(body.into()).await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ResultCode": 0, "ResultDesc": "Accepted" }));
    assert_eq!(handler.events(), vec!["unrecognized".to_string()]);
}
