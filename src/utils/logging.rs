//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the BloodLink application.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{BloodLinkError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| BloodLinkError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log authentication attempts
pub fn log_auth_attempt(email: &str, action: &str, success: bool) {
    if success {
        info!(email = email, action = action, "Authentication succeeded");
    } else {
        warn!(email = email, action = action, "Authentication failed");
    }
}

/// Log a registration status change
pub fn log_registration_transition(registration_id: i64, actor_id: i64, from: &str, to: &str) {
    info!(
        registration_id = registration_id,
        actor_id = actor_id,
        from = from,
        to = to,
        "Registration status changed"
    );
}

/// Log camp management actions
pub fn log_camp_action(camp_id: i64, action: &str, ngo_id: i64, details: Option<&str>) {
    info!(
        camp_id = camp_id,
        action = action,
        ngo_id = ngo_id,
        details = details,
        "Camp action performed"
    );
}
