//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::category::Category;
use crate::models::user::UserShort;

/// Moderation state of an event
///
/// `Pending` means awaiting moderation, not to be confused with a pending
/// participation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl sqlx::postgres::PgHasArrayType for EventState {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_event_state")
    }
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    /// Maximum number of confirmed participants; 0 means unlimited.
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub creation_date: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub initiator_id: i64,
    pub category_id: i64,
}

/// Payload for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: i64,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(default)]
    pub participant_limit: Option<i32>,
    #[serde(default)]
    pub request_moderation: Option<bool>,
}

/// Fully-populated insert payload with creation defaults applied
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub creation_date: DateTime<Utc>,
    pub initiator_id: i64,
    pub category_id: i64,
}

impl NewEvent {
    /// Build the stored representation of a freshly submitted event.
    ///
    /// Defaults are applied in exactly one place: paid = false,
    /// participant_limit = 0 (unlimited), request_moderation = true.
    pub fn into_draft(self, initiator_id: i64, now: DateTime<Utc>) -> EventDraft {
        EventDraft {
            title: self.title,
            annotation: self.annotation,
            description: self.description,
            event_date: self.event_date,
            paid: self.paid.unwrap_or(false),
            participant_limit: self.participant_limit.unwrap_or(0),
            request_moderation: self.request_moderation.unwrap_or(true),
            state: EventState::Pending,
            creation_date: now,
            initiator_id,
            category_id: self.category,
        }
    }
}

/// State transition requested by an administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

/// State transition requested by the event initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

/// Partial update applied by an administrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminEventPatch {
    pub title: Option<String>,
    pub annotation: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<AdminStateAction>,
}

/// Partial update applied by the event initiator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerEventPatch {
    pub title: Option<String>,
    pub annotation: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub state_action: Option<UserStateAction>,
}

/// Sort order for public event search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    EventDate,
    Views,
}

/// Filters for the public search over published events
#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub only_available: bool,
    pub sort: EventSort,
    pub from: i64,
    pub size: i64,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            text: None,
            categories: None,
            paid: None,
            range_start: None,
            range_end: None,
            only_available: false,
            sort: EventSort::EventDate,
            from: 0,
            size: 10,
        }
    }
}

/// Filters for the admin listing over all events
#[derive(Debug, Clone, Default)]
pub struct AdminSearchFilters {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub from: i64,
    pub size: i64,
}

/// Full outward-facing event view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFull {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: Category,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
    pub initiator: UserShort,
    pub confirmed_requests: i64,
    pub views: i64,
}

/// Compact outward-facing event view used in listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventShort {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub category: Category,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub initiator: UserShort,
    pub confirmed_requests: i64,
    pub views: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_new_event(now: DateTime<Utc>) -> NewEvent {
        NewEvent {
            title: "Lindy hop social".to_string(),
            annotation: "An evening of social dancing downtown".to_string(),
            description: "Live band, beginners lesson at the start, open floor after".to_string(),
            category: 3,
            event_date: now + chrono::Duration::days(7),
            paid: None,
            participant_limit: None,
            request_moderation: None,
        }
    }

    #[test]
    fn test_draft_applies_creation_defaults() {
        let now = Utc::now();
        let draft = minimal_new_event(now).into_draft(11, now);

        assert!(!draft.paid);
        assert_eq!(draft.participant_limit, 0);
        assert!(draft.request_moderation);
        assert_eq!(draft.state, EventState::Pending);
        assert_eq!(draft.creation_date, now);
        assert_eq!(draft.initiator_id, 11);
    }

    #[test]
    fn test_draft_preserves_submitted_fields() {
        let now = Utc::now();
        let mut new_event = minimal_new_event(now);
        new_event.paid = Some(true);
        new_event.participant_limit = Some(25);
        new_event.request_moderation = Some(false);

        let draft = new_event.clone().into_draft(7, now);

        assert_eq!(draft.title, new_event.title);
        assert_eq!(draft.annotation, new_event.annotation);
        assert_eq!(draft.description, new_event.description);
        assert_eq!(draft.category_id, 3);
        assert_eq!(draft.event_date, new_event.event_date);
        assert!(draft.paid);
        assert_eq!(draft.participant_limit, 25);
        assert!(!draft.request_moderation);
    }

    #[test]
    fn test_state_action_wire_format() {
        let action: AdminStateAction = serde_json::from_str("\"PUBLISH_EVENT\"").unwrap();
        assert_eq!(action, AdminStateAction::PublishEvent);

        let action: UserStateAction = serde_json::from_str("\"CANCEL_REVIEW\"").unwrap();
        assert_eq!(action, UserStateAction::CancelReview);

        // Unknown tags are rejected at the boundary, not silently ignored.
        assert!(serde_json::from_str::<AdminStateAction>("\"MAKE_IT_LIVE\"").is_err());
    }
}
