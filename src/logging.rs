//! # Structured Logging Module
//!
//! Environment-aware structured logging for the processing engine. Every
//! processor log line carries the action tuple as structured fields, so the
//! differentiated severities of the relevance check (error for unexpected
//! absence, info for an expected cleanup race) stay machine-readable.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Honors `DAGFLOW_LOG` as an env-filter directive when set; otherwise the
/// level follows `DAGFLOW_ENV` / `APP_ENV`. Production output is JSON.
/// Safe to call more than once; an already-installed global subscriber wins.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let filter =
            EnvFilter::try_from_env("DAGFLOW_LOG").unwrap_or_else(|_| EnvFilter::new(log_level));

        let initialized = if environment == "production" {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(filter),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(true)
                        .with_filter(filter),
                )
                .try_init()
        };

        if initialized.is_err() {
            // A global subscriber is already set (likely by the embedding
            // process); continue with it
            tracing::debug!("Global tracing subscriber already initialized");
        } else {
            tracing::info!(environment = %environment, "Structured logging initialized");
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("DAGFLOW_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
