//! # STK Push
//!
//! Implementation of the Daraja Lipa Na M-Pesa Online (STK push) API.
//! This is the primary payment flow for stk-push-rs.

use crate::api::{gateway_error_message, transport_error_message, StkPushPayload};
use crate::config::MpesaConfig;
use crate::credentials::{format_timestamp, stk_password};
use crate::token::TokenClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pay_core::{
    AccessToken, GatewayResponse, PaymentError, PaymentRequest, PaymentResult, PaymentStrategy,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// M-Pesa STK push strategy
///
/// Sends a payment prompt to the payer's phone. The final result arrives
/// later on the configured callback URL.
pub struct MpesaStkStrategy {
    config: MpesaConfig,
    client: Client,
    tokens: TokenClient,
}

impl MpesaStkStrategy {
    /// Create a new STK push strategy
    pub fn new(config: &MpesaConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            tokens: TokenClient::new(config, client.clone()),
            config: config.clone(),
            client,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = MpesaConfig::from_env()?;
        Self::new(&config)
    }

    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Build the STK push body for `request` at instant `now`
    pub fn build_payload(&self, request: &PaymentRequest, now: DateTime<Utc>) -> StkPushPayload {
        let timestamp = format_timestamp(now);
        let password = stk_password(&self.config.shortcode, &self.config.passkey, &timestamp);
        let phone = request.phone_number.as_str().to_string();
        let merchant = &self.config.merchant;

        StkPushPayload {
            business_short_code: self.config.shortcode.clone(),
            password,
            timestamp,
            transaction_type: merchant.transaction_type.as_str().to_string(),
            amount: request.amount.value(),
            party_a: phone.clone(),
            party_b: self.config.shortcode.clone(),
            phone_number: phone,
            callback_url: self.config.callback_url.clone(),
            account_reference: merchant.account_reference.clone(),
            transaction_desc: merchant.transaction_desc.clone(),
        }
    }

    async fn submit(
        &self,
        token: &AccessToken,
        payload: &StkPushPayload,
    ) -> PaymentResult<GatewayResponse> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| PaymentError::Serialization(format!("STK push payload: {}", e)))?;

        let response = self
            .client
            .post(self.config.stk_push_url())
            .header(AUTHORIZATION, token.bearer_header())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| PaymentError::UpstreamPayment {
                status: None,
                message: transport_error_message(&e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| PaymentError::UpstreamPayment {
            status: None,
            message: transport_error_message(&e),
        })?;

        if !status.is_success() {
            error!("Daraja STK push error: status={}, body={}", status, body);
            return Err(PaymentError::UpstreamPayment {
                status: Some(status.as_u16()),
                message: gateway_error_message(status, &body),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            error!("Unparseable Daraja STK push response: {}", body);
            PaymentError::UpstreamPayment {
                status: Some(status.as_u16()),
                message: format!("Failed to parse STK push response: {}", e),
            }
        })?;

        Ok(GatewayResponse::new(body))
    }
}

#[async_trait]
impl PaymentStrategy for MpesaStkStrategy {
    #[instrument(skip(self, request), fields(phone = %request.phone_number, amount = request.amount.value()))]
    async fn initiate_payment(&self, request: &PaymentRequest) -> PaymentResult<GatewayResponse> {
        let token = self.tokens.fetch_access_token().await?;
        let payload = self.build_payload(request, Utc::now());

        debug!(
            "Sending STK push: shortcode={}, timestamp={}, type={}, callback={}",
            payload.business_short_code,
            payload.timestamp,
            payload.transaction_type,
            payload.callback_url
        );

        let token = &token;
        let payload = &payload;
        let response = self
            .config
            .retry
            .run("STK push request", move || self.submit(token, payload))
            .await?;

        info!(
            "STK push accepted: merchant_request_id={:?}, checkout_request_id={:?}, response_code={:?}",
            response.merchant_request_id(),
            response.checkout_request_id(),
            response.response_code()
        );

        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "mpesa"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MerchantProfile, TransactionType};

    fn strategy() -> MpesaStkStrategy {
        let config = MpesaConfig::new(
            "key",
            "secret",
            "174379",
            "passkey",
            "https://example.com/callback",
        );
        MpesaStkStrategy::new(&config).unwrap()
    }

    fn fixed_instant() -> DateTime<Utc> {
        "2024-01-02T03:04:05.678Z".parse().unwrap()
    }

    #[test]
    fn test_build_payload() {
        let request = PaymentRequest::new("0712345678", 10).unwrap();
        let payload = strategy().build_payload(&request, fixed_instant());

        assert_eq!(payload.business_short_code, "174379");
        assert_eq!(payload.timestamp, "20240102030405");
        assert_eq!(payload.password, "MTc0Mzc5cGFzc2tleTIwMjQwMTAyMDMwNDA1");
        assert_eq!(payload.transaction_type, "CustomerPayBillOnline");
        assert_eq!(payload.amount, 10);
        assert_eq!(payload.party_a, "254712345678");
        assert_eq!(payload.phone_number, "254712345678");
        assert_eq!(payload.party_b, "174379");
        assert_eq!(payload.callback_url, "https://example.com/callback");
        assert_eq!(payload.account_reference, "YourWebsiteName");
        assert_eq!(payload.transaction_desc, "Payment for services");
    }

    #[test]
    fn test_payload_uses_merchant_profile() {
        let config = MpesaConfig::new("k", "s", "600000", "pk", "https://example.com/cb")
            .with_merchant(MerchantProfile {
                account_reference: "Till42".into(),
                transaction_desc: "Groceries".into(),
                transaction_type: TransactionType::CustomerBuyGoodsOnline,
            });
        let strategy = MpesaStkStrategy::new(&config).unwrap();
        let request = PaymentRequest::new("254700000001", 1).unwrap();

        let payload = strategy.build_payload(&request, fixed_instant());
        assert_eq!(payload.transaction_type, "CustomerBuyGoodsOnline");
        assert_eq!(payload.account_reference, "Till42");
        assert_eq!(payload.transaction_desc, "Groceries");
        assert_eq!(payload.phone_number, "254700000001");
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(strategy().provider_name(), "mpesa");
    }
}
