//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment strategy, the callback handler, and server configuration.

use pay_core::BoxedPaymentStrategy;
use pay_mpesa::{CallbackHandler, LoggingCallbackHandler, MpesaConfig, MpesaStkStrategy};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding `index.html` and the WASM form bundle
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Entry page served at `/`
    pub fn index_file(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway used for STK push
    pub strategy: BoxedPaymentStrategy,
    /// Receives parsed result callbacks
    pub callback_handler: Arc<dyn CallbackHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by the Daraja STK push strategy
    pub fn new(config: AppConfig, mpesa: &MpesaConfig) -> anyhow::Result<Self> {
        let strategy = MpesaStkStrategy::new(mpesa)
            .map_err(|e| anyhow::anyhow!("Failed to initialize M-Pesa: {}", e))?;

        Ok(Self::with_strategy(config, Arc::new(strategy)))
    }

    /// Create state around any strategy, logging callbacks
    pub fn with_strategy(config: AppConfig, strategy: BoxedPaymentStrategy) -> Self {
        Self {
            strategy,
            callback_handler: Arc::new(LoggingCallbackHandler),
            config,
        }
    }

    /// Builder: replace the callback handler
    pub fn with_callback_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callback_handler = handler;
        self
    }
}
