//! Rating repository implementation

use sqlx::PgPool;

use crate::models::rating::EventRating;
use crate::utils::errors::EventumError;

#[derive(Debug, Clone)]
pub struct RatingRepository {
    pool: PgPool,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current rating value a user holds on an event, if any
    pub async fn find_value(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<i16>, EventumError> {
        let value: Option<(i16,)> = sqlx::query_as(
            "SELECT value FROM ratings WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.map(|row| row.0))
    }

    /// Insert or replace a user's rating on an event
    pub async fn upsert(&self, event_id: i64, user_id: i64, value: i16) -> Result<(), EventumError> {
        sqlx::query(
            r#"
            INSERT INTO ratings (event_id, user_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a user's rating; returns the number of affected rows
    pub async fn delete(&self, event_id: i64, user_id: i64) -> Result<u64, EventumError> {
        let result = sqlx::query("DELETE FROM ratings WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Aggregate rating of a single event
    pub async fn event_rating(&self, event_id: i64) -> Result<EventRating, EventumError> {
        let rating = sqlx::query_as::<_, EventRating>(
            r#"
            SELECT event_id,
                   COUNT(*) FILTER (WHERE value = 1) AS likes,
                   COUNT(*) FILTER (WHERE value = -1) AS dislikes,
                   COALESCE(SUM(value), 0)::BIGINT AS score
            FROM ratings
            WHERE event_id = $1
            GROUP BY event_id
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating.unwrap_or(EventRating {
            event_id,
            likes: 0,
            dislikes: 0,
            score: 0,
        }))
    }

    /// Highest-scored events
    pub async fn top_events(&self, limit: i64) -> Result<Vec<EventRating>, EventumError> {
        let ratings = sqlx::query_as::<_, EventRating>(
            r#"
            SELECT event_id,
                   COUNT(*) FILTER (WHERE value = 1) AS likes,
                   COUNT(*) FILTER (WHERE value = -1) AS dislikes,
                   COALESCE(SUM(value), 0)::BIGINT AS score
            FROM ratings
            GROUP BY event_id
            ORDER BY score DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }
}
