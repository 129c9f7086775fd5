//! # Token Client
//!
//! Exchanges the consumer key/secret for a short-lived bearer token.
//! Tokens are never cached: every STK push fetches a fresh one.

use crate::api::{gateway_error_message, transport_error_message, TokenResponse};
use crate::config::MpesaConfig;
use crate::retry::RetryPolicy;
use pay_core::{AccessToken, PaymentError, PaymentResult};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// Client for the Daraja OAuth endpoint
#[derive(Clone)]
pub struct TokenClient {
    client: Client,
    token_url: String,
    auth_header: String,
    retry: RetryPolicy,
}

impl TokenClient {
    /// Create a token client sharing `client`'s connection pool
    pub fn new(config: &MpesaConfig, client: Client) -> Self {
        Self {
            client,
            token_url: config.token_url(),
            auth_header: config.auth_header(),
            retry: config.retry,
        }
    }

    /// Fetch a fresh access token, retrying transient failures.
    #[instrument(skip(self))]
    pub async fn fetch_access_token(&self) -> PaymentResult<AccessToken> {
        let token = self
            .retry
            .run("access token request", move || self.request_token())
            .await?;

        info!("Access token received (expires_in={:?})", token.expires_in);
        Ok(token)
    }

    async fn request_token(&self) -> PaymentResult<AccessToken> {
        debug!("Requesting Daraja access token");

        let response = self
            .client
            .get(&self.token_url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(|e| PaymentError::UpstreamAuth {
                status: None,
                message: transport_error_message(&e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| PaymentError::UpstreamAuth {
            status: None,
            message: transport_error_message(&e),
        })?;

        if !status.is_success() {
            error!("Daraja token error: status={}, body={}", status, body);
            return Err(PaymentError::UpstreamAuth {
                status: Some(status.as_u16()),
                message: gateway_error_message(status, &body),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Unparseable Daraja token response: {}", body);
            PaymentError::UpstreamAuth {
                status: Some(status.as_u16()),
                message: format!("Failed to parse token response: {}", e),
            }
        })?;

        Ok(AccessToken {
            expires_in: token.expires_in_secs(),
            value: token.access_token,
        })
    }
}
