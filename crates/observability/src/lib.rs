//! # emporio-observability
//!
//! Observability-Crate fuer Emporio:
//! - Prometheus-kompatible Metriken (`/metrics`)
//! - Health-Check-Zustand (`/health`)
//! - Structured Logging via tracing-subscriber
//! - Request-Timing Middleware

pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;

pub use health::{HealthResponse, HealthState, HealthStatus};
pub use logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren};
pub use metrics::{metrics_router, EmporioMetrics};
pub use middleware::timing_middleware;
