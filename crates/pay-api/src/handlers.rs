//! # Request Handlers
//!
//! Axum request handlers for the STK push API.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use pay_core::{Acknowledgement, PaymentError, PaymentForm};
use pay_mpesa::dispatch_callback;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response: `{ "message": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.client_message())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness probe
pub async fn status() -> &'static str {
    info!("Server status check received");
    "Server is up and running."
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "stk-push",
        "provider": state.strategy.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn is_urlencoded(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn invalid_body(detail: String) -> ApiError {
    warn!("Rejected STK push body: {}", detail);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(format!("Invalid request body: {}", detail))),
    )
}

/// Decode `{ phone, amount }` from a JSON or urlencoded form body
async fn extract_payment_form(
    request: Request,
    state: &AppState,
) -> Result<PaymentForm, ApiError> {
    if is_urlencoded(&request) {
        let Form(form) = Form::<PaymentForm>::from_request(request, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(form)
    } else {
        let Json(form) = Json::<PaymentForm>::from_request(request, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(form)
    }
}

/// Start an STK push for `{ phone, amount }`
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn stk_push(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("STK push request received from client");

    let form = extract_payment_form(request, &state).await?;

    let request = form.into_request().map_err(|e| {
        warn!("Invalid STK push request: {}", e);
        payment_error_to_response(e)
    })?;

    info!(
        "Phone number formatted to: {}, amount={}",
        request.phone_number, request.amount
    );

    let response = state
        .strategy
        .initiate_payment(&request)
        .await
        .map_err(|e| {
            error!("STK push error: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(response.into_body()))
}

/// Receive a payment result from the gateway. Always acknowledged.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn callback(State(state): State<AppState>, body: Bytes) -> Json<Acknowledgement> {
    let notification = state.strategy.parse_callback(&body);
    Json(dispatch_callback(
        state.callback_handler.as_ref(),
        &notification,
    ))
}
