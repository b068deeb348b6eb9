//! Services module
//!
//! This module contains business logic services

pub mod admission;
pub mod category;
pub mod event;
pub mod locks;
pub mod rating;
pub mod request;
pub mod stats;
pub mod user;

// Re-export commonly used services
pub use category::CategoryService;
pub use event::EventService;
pub use locks::{EventLocks, LockRegistry, RatingLocks};
pub use rating::RatingService;
pub use request::RequestService;
pub use stats::{StatsService, ViewStats};
pub use user::UserService;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub request_service: RequestService,
    pub rating_service: RatingService,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub stats_service: StatsService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    ///
    /// The event and request services share one lock registry: admission
    /// decisions and publish transitions on the same event serialize against
    /// each other.
    pub fn new(db: DatabaseService, settings: Settings) -> Result<Self> {
        let stats_service = StatsService::new(settings.stats)?;
        let event_locks = EventLocks::new();

        let event_service =
            EventService::new(db.clone(), stats_service.clone(), event_locks.clone());
        let request_service = RequestService::new(db.clone(), event_locks);
        let rating_service = RatingService::new(db.clone(), RatingLocks::new());
        let user_service = UserService::new(db.clone());
        let category_service = CategoryService::new(db);

        Ok(Self {
            event_service,
            request_service,
            rating_service,
            user_service,
            category_service,
            stats_service,
        })
    }
}
