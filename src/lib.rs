//! BloodLink
//!
//! Web backend connecting blood donors, hospitals and NGOs. This library
//! provides the account and session handling, donor registration workflows,
//! blood-camp management, inventory counts and the notification feed behind
//! the JSON API.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BloodLinkError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
