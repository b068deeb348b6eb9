//! Eventum
//!
//! An events marketplace service: organizers publish events with a capacity
//! limit, users file participation requests, and the owner admits or rejects
//! them under the event's moderation policy and remaining capacity.

pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventumError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::AppState;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
