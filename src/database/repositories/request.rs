//! Participation request repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::request::{ParticipationRequest, RequestStatus};
use crate::utils::errors::EventumError;

const REQUEST_COLUMNS: &str = "id, event_id, requester_id, status, creation_date";

#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new participation request
    pub async fn create(
        &self,
        event_id: i64,
        requester_id: i64,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<ParticipationRequest, EventumError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            INSERT INTO requests (event_id, requester_id, status, creation_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, requester_id, status, creation_date
            "#,
        )
        .bind(event_id)
        .bind(requester_id)
        .bind(status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Find a request by ID restricted to its requester
    pub async fn find_by_id_and_requester(
        &self,
        id: i64,
        requester_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventumError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1 AND requester_id = $2"
        ))
        .bind(id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// List all requests filed by a user
    pub async fn find_by_requester(
        &self,
        requester_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventumError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE requester_id = $1 \
             ORDER BY creation_date ASC"
        ))
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// List all requests on an event
    pub async fn find_by_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventumError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE event_id = $1 \
             ORDER BY creation_date ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Fetch the named requests belonging to an event
    ///
    /// Ids that do not belong to the event are silently absent from the
    /// result; callers decide how to treat them.
    pub async fn find_by_ids_and_event(
        &self,
        ids: &[i64],
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventumError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ANY($1) AND event_id = $2"
        ))
        .bind(ids.to_vec())
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Find a user's non-canceled request on an event, if any
    pub async fn find_active(
        &self,
        event_id: i64,
        requester_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventumError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests \
             WHERE event_id = $1 AND requester_id = $2 AND status <> 'CANCELED'"
        ))
        .bind(event_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Check whether a user holds a confirmed request on an event
    pub async fn has_confirmed(
        &self,
        event_id: i64,
        requester_id: i64,
    ) -> Result<bool, EventumError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM requests \
             WHERE event_id = $1 AND requester_id = $2 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Live count of confirmed requests on an event
    pub async fn confirmed_count(&self, event_id: i64) -> Result<i64, EventumError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM requests WHERE event_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Confirmed request counts for a set of events
    pub async fn confirmed_counts(
        &self,
        event_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, EventumError> {
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT event_id, COUNT(*) FROM requests \
             WHERE event_id = ANY($1) AND status = 'CONFIRMED' GROUP BY event_id",
        )
        .bind(event_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    /// Update the status of a single request
    pub async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EventumError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            UPDATE requests
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, requester_id, status, creation_date
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Apply a batch admission decision in a single transaction
    ///
    /// Either every named request changes status or none does.
    pub async fn apply_admission(
        &self,
        confirmed_ids: &[i64],
        rejected_ids: &[i64],
    ) -> Result<(), EventumError> {
        let mut tx = self.pool.begin().await?;

        if !confirmed_ids.is_empty() {
            sqlx::query("UPDATE requests SET status = 'CONFIRMED' WHERE id = ANY($1)")
                .bind(confirmed_ids.to_vec())
                .execute(&mut *tx)
                .await?;
        }
        if !rejected_ids.is_empty() {
            sqlx::query("UPDATE requests SET status = 'REJECTED' WHERE id = ANY($1)")
                .bind(rejected_ids.to_vec())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
