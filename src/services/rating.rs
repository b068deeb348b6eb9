//! Rating service
//!
//! Like/dislike ledger for events. A user holds at most one rating value per
//! event, may only rate events they hold a confirmed request against, and a
//! toggle replaces the opposite value atomically. The read-then-decide step
//! runs under a lock keyed by (event, user), mirroring the admission
//! critical section.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::rating::{EventRating, RatingValue};
use crate::services::locks::RatingLocks;
use crate::utils::errors::{EventumError, Result};

/// Rating service for event likes and dislikes
#[derive(Clone)]
pub struct RatingService {
    db: DatabaseService,
    locks: RatingLocks,
}

impl RatingService {
    /// Create a new RatingService instance
    pub fn new(db: DatabaseService, locks: RatingLocks) -> Self {
        Self { db, locks }
    }

    /// Add or toggle a user's rating on an event
    pub async fn rate(
        &self,
        user_id: i64,
        event_id: i64,
        value: RatingValue,
    ) -> Result<EventRating> {
        debug!(user_id = user_id, event_id = event_id, value = value.as_str(), "Rating event");

        self.load_user(user_id).await?;
        self.ensure_event_exists(event_id).await?;

        if !self.db.requests.has_confirmed(event_id, user_id).await? {
            return Err(EventumError::conflict(format!(
                "user {} did not take part in event {}",
                user_id, event_id
            )));
        }

        let _guard = self.locks.acquire((event_id, user_id)).await;

        if let Some(current) = self.db.ratings.find_value(event_id, user_id).await? {
            if current == value.as_i16() {
                return Err(EventumError::conflict(format!(
                    "user {} already rated event {} with {}",
                    user_id,
                    event_id,
                    value.as_str()
                )));
            }
        }

        // Replacing the opposite value is a single upsert statement.
        self.db
            .ratings
            .upsert(event_id, user_id, value.as_i16())
            .await?;
        info!(
            user_id = user_id,
            event_id = event_id,
            value = value.as_str(),
            "Event rated"
        );

        self.db.ratings.event_rating(event_id).await
    }

    /// Remove a user's rating from an event
    pub async fn remove(&self, user_id: i64, event_id: i64) -> Result<()> {
        self.load_user(user_id).await?;
        self.ensure_event_exists(event_id).await?;

        let _guard = self.locks.acquire((event_id, user_id)).await;

        let deleted = self.db.ratings.delete(event_id, user_id).await?;
        if deleted == 0 {
            return Err(EventumError::not_found(format!(
                "user {} has no rating on event {}",
                user_id, event_id
            )));
        }
        info!(user_id = user_id, event_id = event_id, "Rating removed");

        Ok(())
    }

    /// Aggregated rating of an event
    pub async fn event_rating(&self, event_id: i64) -> Result<EventRating> {
        self.ensure_event_exists(event_id).await?;
        self.db.ratings.event_rating(event_id).await
    }

    /// Highest-scored events
    pub async fn top_events(&self, limit: i64) -> Result<Vec<EventRating>> {
        if limit <= 0 {
            return Err(EventumError::validation(format!(
                "'count' must be greater than 0, got {}",
                limit
            )));
        }
        self.db.ratings.top_events(limit).await
    }

    async fn load_user(&self, user_id: i64) -> Result<()> {
        if user_id == 0 {
            return Err(EventumError::validation("user id must be positive"));
        }
        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EventumError::not_found(format!("user {} does not exist", user_id)))?;
        Ok(())
    }

    async fn ensure_event_exists(&self, event_id: i64) -> Result<()> {
        if event_id == 0 {
            return Err(EventumError::validation("event id must be positive"));
        }
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventumError::not_found(format!("event {} does not exist", event_id)))?;
        Ok(())
    }
}
