//! # stk-push
//!
//! M-Pesa STK push payment server.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export MPESA_CONSUMER_KEY=...
//! export MPESA_CONSUMER_SECRET=...
//! export MPESA_SHORTCODE=174379
//! export MPESA_PASSKEY=...
//! export MPESA_CALLBACK_URL=https://example.com/callback
//!
//! # Run the server
//! stk-push
//! ```

use pay_api::{routes, AppConfig, AppState};
use pay_mpesa::MpesaConfig;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let config = AppConfig::from_env();
    let mpesa = MpesaConfig::from_env()?;
    let state = AppState::new(config, &mpesa)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("M-Pesa environment: {}", mpesa.environment);
    info!("Daraja API: {}", mpesa.api_base_url);
    info!("Callback URL: {}", mpesa.callback_url);
    info!("Static files: {}", state.config.static_dir.display());

    let app = routes::create_router(state);

    info!("Server is running on http://{}", addr);

    if !is_prod {
        info!("Status: GET http://{}/status", addr);
        info!("STK push: POST http://{}/stkpush", addr);
        info!("Callback: POST http://{}/callback", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  M-Pesa STK Push
  ━━━━━━━━━━━━━━━━━━━━━━━
  Lipa na M-Pesa Online
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
