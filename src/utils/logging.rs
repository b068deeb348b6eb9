//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Eventum application.

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
///
/// The returned guard must be kept alive for the lifetime of the process,
/// otherwise buffered file output is dropped.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "eventum.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event state transitions with structured data
pub fn log_state_transition(event_id: i64, from: &str, to: &str, actor: &str) {
    info!(
        event_id = event_id,
        from = from,
        to = to,
        actor = actor,
        "Event state transition"
    );
}

/// Log admission decisions for a batch update
pub fn log_admission_outcome(event_id: i64, confirmed: usize, rejected: usize) {
    info!(
        event_id = event_id,
        confirmed = confirmed,
        rejected = rejected,
        "Admission batch processed"
    );
}
