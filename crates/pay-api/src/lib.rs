//! # pay-api
//!
//! HTTP API layer for stk-push-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The STK push endpoint used by the payment form
//! - The result callback endpoint Daraja posts to
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/status` | Liveness text |
//! | GET | `/health` | Health check |
//! | POST | `/stkpush` | Start an STK push |
//! | POST | `/callback` | Payment result callback |
//! | GET | `/` | Payment form |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
