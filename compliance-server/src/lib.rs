//! Compliance Engine HTTP Server - RESTful API over `compliance-core`
//!
//! This crate provides the HTTP surface for transaction ingestion,
//! rule template/version management, and alert review — the thin axum
//! shell around the pure evaluation engine and persistence boundary that
//! live in `compliance-core`.

pub mod api;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod tracing;

pub use api::{EvaluationResponse, HealthResponse, IngestTransactionRequest};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
