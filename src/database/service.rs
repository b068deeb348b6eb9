//! Database service layer
//!
//! Bundles the per-aggregate repositories behind a single handle.

use crate::database::{
    CategoryRepository, DatabasePool, EventRepository, RatingRepository, RequestRepository,
    UserRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub requests: RequestRepository,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub ratings: RatingRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            ratings: RatingRepository::new(pool),
        }
    }
}
