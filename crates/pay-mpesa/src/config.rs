//! # M-Pesa Configuration
//!
//! Configuration management for the Daraja integration.
//! Secrets are loaded from environment variables; the merchant profile
//! (reference strings shown to the payer) can come from `config/merchant.toml`.

use crate::credentials;
use crate::retry::RetryPolicy;
use pay_core::PaymentError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Which Daraja deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MpesaEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl MpesaEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            MpesaEnvironment::Sandbox => SANDBOX_BASE_URL,
            MpesaEnvironment::Production => PRODUCTION_BASE_URL,
        }
    }

    fn parse(value: &str) -> Result<Self, PaymentError> {
        match value.trim().to_lowercase().as_str() {
            "sandbox" => Ok(MpesaEnvironment::Sandbox),
            "production" | "live" => Ok(MpesaEnvironment::Production),
            other => Err(PaymentError::Configuration(format!(
                "MPESA_ENVIRONMENT must be sandbox or production, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MpesaEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpesaEnvironment::Sandbox => f.write_str("sandbox"),
            MpesaEnvironment::Production => f.write_str("production"),
        }
    }
}

/// STK push transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionType {
    /// Paybill number
    #[default]
    CustomerPayBillOnline,
    /// Till number (Buy Goods)
    CustomerBuyGoodsOnline,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CustomerPayBillOnline => "CustomerPayBillOnline",
            TransactionType::CustomerBuyGoodsOnline => "CustomerBuyGoodsOnline",
        }
    }
}

/// Static strings sent with every STK push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantProfile {
    /// Shown to the payer on the STK prompt
    pub account_reference: String,
    pub transaction_desc: String,
    pub transaction_type: TransactionType,
}

impl Default for MerchantProfile {
    fn default() -> Self {
        Self {
            account_reference: "YourWebsiteName".to_string(),
            transaction_desc: "Payment for services".to_string(),
            transaction_type: TransactionType::default(),
        }
    }
}

impl MerchantProfile {
    /// Parse a TOML merchant profile. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, PaymentError> {
        toml::from_str(content)
            .map_err(|e| PaymentError::Configuration(format!("Invalid merchant profile: {}", e)))
    }

    /// Load `config/merchant.toml` from the working directory or its parents.
    /// Falls back to defaults when no file exists.
    pub fn discover() -> Result<Self, PaymentError> {
        let config_paths = [
            "config/merchant.toml",
            "../config/merchant.toml",
            "../../config/merchant.toml",
        ];

        for path in config_paths {
            if let Ok(content) = std::fs::read_to_string(path) {
                let profile = Self::from_toml(&content)
                    .map_err(|e| PaymentError::Configuration(format!("{}: {}", path, e)))?;
                tracing::info!("Loaded merchant profile from {}", path);
                return Ok(profile);
            }
        }

        tracing::warn!("No merchant profile found, using defaults");
        Ok(Self::default())
    }
}

/// Daraja API configuration
#[derive(Clone)]
pub struct MpesaConfig {
    /// OAuth consumer key from the Daraja portal
    pub consumer_key: String,

    /// OAuth consumer secret
    pub consumer_secret: String,

    /// Paybill or till number
    pub shortcode: String,

    /// Lipa Na M-Pesa Online passkey
    pub passkey: String,

    /// Public URL the gateway posts results to
    pub callback_url: String,

    pub environment: MpesaEnvironment,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Per-request timeout for every gateway call
    pub timeout: Duration,

    pub retry: RetryPolicy,

    pub merchant: MerchantProfile,
}

impl MpesaConfig {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// Required env vars:
    /// - `MPESA_CONSUMER_KEY`
    /// - `MPESA_CONSUMER_SECRET`
    /// - `MPESA_SHORTCODE`
    /// - `MPESA_PASSKEY`
    /// - `MPESA_CALLBACK_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        Ok(config.with_merchant(MerchantProfile::discover()?))
    }

    /// Build configuration from any key lookup (env, map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PaymentError::Configuration(format!("{} not set", key)))
        };

        let consumer_key = required("MPESA_CONSUMER_KEY")?;
        let consumer_secret = required("MPESA_CONSUMER_SECRET")?;
        let shortcode = required("MPESA_SHORTCODE")?;
        let passkey = required("MPESA_PASSKEY")?;
        let callback_url = required("MPESA_CALLBACK_URL")?;

        let environment = match lookup("MPESA_ENVIRONMENT") {
            Some(value) => MpesaEnvironment::parse(&value)?,
            None => MpesaEnvironment::default(),
        };

        let api_base_url = lookup("MPESA_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| environment.base_url().to_string());

        let timeout_secs = parse_number(&lookup, "MPESA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let backoff_ms = parse_number(&lookup, "MPESA_RETRY_BACKOFF_MS", DEFAULT_RETRY_BACKOFF_MS)?;
        let max_retries: u32 = parse_number(&lookup, "MPESA_MAX_RETRIES", 1)?;

        let config = Self {
            consumer_key,
            consumer_secret,
            shortcode,
            passkey,
            callback_url,
            environment,
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy::single_retry(Duration::from_millis(backoff_ms))
                .with_max_retries(max_retries),
            merchant: MerchantProfile::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        shortcode: impl Into<String>,
        passkey: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            shortcode: shortcode.into(),
            passkey: passkey.into(),
            callback_url: callback_url.into(),
            environment: MpesaEnvironment::Sandbox,
            api_base_url: SANDBOX_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            merchant: MerchantProfile::default(),
        }
    }

    /// Check values that the gateway would otherwise reject much later
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.shortcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::Configuration(
                "MPESA_SHORTCODE must contain digits only".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.callback_url).map_err(|e| {
            PaymentError::Configuration(format!("MPESA_CALLBACK_URL is not a valid URL: {}", e))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(PaymentError::Configuration(
                "MPESA_CALLBACK_URL must be an http(s) URL".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if talking to the sandbox
    pub fn is_sandbox(&self) -> bool {
        self.environment == MpesaEnvironment::Sandbox
    }

    /// Basic auth value for the token endpoint
    pub fn auth_header(&self) -> String {
        credentials::basic_auth_header(&self.consumer_key, &self.consumer_secret)
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.api_base_url, TOKEN_PATH)
    }

    pub fn stk_push_url(&self) -> String {
        format!("{}{}", self.api_base_url, STK_PUSH_PATH)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_merchant(mut self, merchant: MerchantProfile) -> Self {
        self.merchant = merchant;
        self
    }
}

impl fmt::Debug for MpesaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpesaConfig")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("shortcode", &self.shortcode)
            .field("passkey", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("environment", &self.environment)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("merchant", &self.merchant)
            .finish()
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, PaymentError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| {
            PaymentError::Configuration(format!("{} must be a number, got {}", key, value))
        }),
        None => Ok(default),
    }
}
