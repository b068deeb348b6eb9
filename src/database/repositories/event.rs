//! Event repository implementation

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::event::{AdminSearchFilters, Event, EventDraft, EventState, SearchFilters};
use crate::utils::errors::EventumError;

const EVENT_COLUMNS: &str = "id, title, annotation, description, event_date, paid, \
     participant_limit, request_moderation, state, creation_date, published_date, \
     initiator_id, category_id";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new event
    pub async fn create(&self, draft: &EventDraft) -> Result<Event, EventumError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, annotation, description, event_date, paid,
                participant_limit, request_moderation, state, creation_date,
                initiator_id, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, annotation, description, event_date, paid,
                participant_limit, request_moderation, state, creation_date,
                published_date, initiator_id, category_id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.annotation)
        .bind(&draft.description)
        .bind(draft.event_date)
        .bind(draft.paid)
        .bind(draft.participant_limit)
        .bind(draft.request_moderation)
        .bind(draft.state)
        .bind(draft.creation_date)
        .bind(draft.initiator_id)
        .bind(draft.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventumError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID restricted to its initiator
    pub async fn find_by_id_and_initiator(
        &self,
        id: i64,
        initiator_id: i64,
    ) -> Result<Option<Event>, EventumError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND initiator_id = $2"
        ))
        .bind(id)
        .bind(initiator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List events created by a user
    pub async fn find_by_initiator(
        &self,
        initiator_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, EventumError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE initiator_id = $1 \
             ORDER BY event_date ASC LIMIT $2 OFFSET $3"
        ))
        .bind(initiator_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Write back every mutable field of an event
    pub async fn save(&self, event: &Event) -> Result<Event, EventumError> {
        let saved = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $2,
                annotation = $3,
                description = $4,
                event_date = $5,
                paid = $6,
                participant_limit = $7,
                request_moderation = $8,
                state = $9,
                published_date = $10,
                category_id = $11
            WHERE id = $1
            RETURNING id, title, annotation, description, event_date, paid,
                participant_limit, request_moderation, state, creation_date,
                published_date, initiator_id, category_id
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.event_date)
        .bind(event.paid)
        .bind(event.participant_limit)
        .bind(event.request_moderation)
        .bind(event.state)
        .bind(event.published_date)
        .bind(event.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    /// Search published events matching public filters
    ///
    /// Availability filtering, view counts and final ordering are applied by
    /// the service on top of this result.
    pub async fn search_published(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<Event>, EventumError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE state = "
        ));
        query.push_bind(EventState::Published);

        if let Some(text) = filters.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let pattern = format!("%{}%", text);
            query.push(" AND (annotation ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR description ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        if let Some(categories) = &filters.categories {
            query.push(" AND category_id = ANY(");
            query.push_bind(categories.clone());
            query.push(")");
        }
        if let Some(paid) = filters.paid {
            query.push(" AND paid = ");
            query.push_bind(paid);
        }
        match (filters.range_start, filters.range_end) {
            (None, None) => {
                query.push(" AND event_date >= NOW()");
            }
            (start, end) => {
                if let Some(start) = start {
                    query.push(" AND event_date >= ");
                    query.push_bind(start);
                }
                if let Some(end) = end {
                    query.push(" AND event_date <= ");
                    query.push_bind(end);
                }
            }
        }
        query.push(" ORDER BY event_date ASC");

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;

        Ok(events)
    }

    /// Search all events for the admin listing
    pub async fn admin_search(
        &self,
        filters: &AdminSearchFilters,
    ) -> Result<Vec<Event>, EventumError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE TRUE"));

        if let Some(users) = &filters.users {
            query.push(" AND initiator_id = ANY(");
            query.push_bind(users.clone());
            query.push(")");
        }
        if let Some(states) = &filters.states {
            query.push(" AND state = ANY(");
            query.push_bind(states.clone());
            query.push(")");
        }
        if let Some(categories) = &filters.categories {
            query.push(" AND category_id = ANY(");
            query.push_bind(categories.clone());
            query.push(")");
        }
        if let Some(start) = filters.range_start {
            query.push(" AND event_date >= ");
            query.push_bind(start);
        }
        if let Some(end) = filters.range_end {
            query.push(" AND event_date <= ");
            query.push_bind(end);
        }
        query.push(" ORDER BY id ASC LIMIT ");
        query.push_bind(filters.size);
        query.push(" OFFSET ");
        query.push_bind(filters.from);

        let events = query.build_query_as::<Event>().fetch_all(&self.pool).await?;

        Ok(events)
    }

    /// Check whether any event references a category
    pub async fn exists_with_category(&self, category_id: i64) -> Result<bool, EventumError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM events WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0 > 0)
    }
}
