//! Axum HTTP API for the photobooth site.
//!
//! This crate provides:
//! - Still upload with server-side processing and pointer publishing
//! - Video backup chunk storage
//! - Background redirect and visit counting
//! - Rate limiting, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod multipart;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
