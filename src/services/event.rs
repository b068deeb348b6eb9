//! Event lifecycle service
//!
//! Owns event creation, state transitions and field-update validation, and
//! assembles the outward-facing event views with confirmed-request and view
//! counts.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::category::Category;
use crate::models::event::{
    AdminEventPatch, AdminSearchFilters, AdminStateAction, Event, EventFull, EventShort,
    EventSort, EventState, NewEvent, OwnerEventPatch, SearchFilters, UserStateAction,
};
use crate::models::user::UserShort;
use crate::services::admission;
use crate::services::locks::EventLocks;
use crate::services::stats::StatsService;
use crate::utils::errors::{EventumError, Result};
use crate::utils::logging;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 120;
const ANNOTATION_MIN: usize = 20;
const ANNOTATION_MAX: usize = 2000;
const DESCRIPTION_MIN: usize = 20;
const DESCRIPTION_MAX: usize = 7000;

/// Event service for lifecycle management and lookups
#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    stats: StatsService,
    locks: EventLocks,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(db: DatabaseService, stats: StatsService, locks: EventLocks) -> Self {
        Self { db, stats, locks }
    }

    /// Create a new event on behalf of its initiator
    pub async fn create(&self, user_id: i64, new_event: NewEvent) -> Result<EventFull> {
        debug!(user_id = user_id, "Creating event");

        let initiator = self.load_user(user_id).await?;
        let category = self.load_category(new_event.category).await?;

        let now = Utc::now();
        validate_new_event(&new_event, now)?;

        let draft = new_event.into_draft(user_id, now);
        let event = self.db.events.create(&draft).await?;
        info!(event_id = event.id, user_id = user_id, "Event created");

        Ok(build_full(event, category, initiator.into(), 0, 0))
    }

    /// Apply an administrator update, possibly publishing or rejecting
    pub async fn update_admin(&self, event_id: i64, patch: AdminEventPatch) -> Result<EventFull> {
        debug!(event_id = event_id, "Applying admin update");

        // Publishing and limit changes feed capacity decisions, so the whole
        // update runs inside the event's critical section.
        let _guard = self.locks.acquire(event_id).await;

        let mut event = self.load_event(event_id).await?;
        if let Some(category_id) = patch.category {
            self.load_category(category_id).await?;
        }

        let previous_state = event.state;
        apply_admin_patch(&mut event, &patch, Utc::now())?;
        self.check_limit_not_below_confirmed(&event, patch.participant_limit)
            .await?;

        let event = self.db.events.save(&event).await?;
        if event.state != previous_state {
            logging::log_state_transition(
                event.id,
                previous_state.as_str(),
                event.state.as_str(),
                "admin",
            );
        }

        self.assemble_full(event).await
    }

    /// Apply an update from the event's initiator
    pub async fn update_owner(
        &self,
        user_id: i64,
        event_id: i64,
        patch: OwnerEventPatch,
    ) -> Result<EventFull> {
        debug!(user_id = user_id, event_id = event_id, "Applying owner update");

        self.load_user(user_id).await?;

        let _guard = self.locks.acquire(event_id).await;

        let mut event = self.load_owned_event(user_id, event_id).await?;
        if let Some(category_id) = patch.category {
            self.load_category(category_id).await?;
        }

        let previous_state = event.state;
        apply_owner_patch(&mut event, &patch, Utc::now())?;
        self.check_limit_not_below_confirmed(&event, patch.participant_limit)
            .await?;

        let event = self.db.events.save(&event).await?;
        if event.state != previous_state {
            logging::log_state_transition(
                event.id,
                previous_state.as_str(),
                event.state.as_str(),
                "owner",
            );
        }

        self.assemble_full(event).await
    }

    /// Point lookup without visibility restrictions
    pub async fn find(&self, event_id: i64) -> Result<EventFull> {
        let event = self.load_event(event_id).await?;
        self.assemble_full(event).await
    }

    /// Point lookup restricted to published events
    pub async fn find_published(&self, event_id: i64) -> Result<EventFull> {
        let event = self.load_event(event_id).await?;
        if event.state != EventState::Published {
            debug!(event_id = event_id, state = ?event.state, "Event is not published");
            return Err(EventumError::not_found(format!(
                "event {} is not published",
                event_id
            )));
        }
        self.assemble_full(event).await
    }

    /// Public search over published events
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<EventShort>> {
        validate_pagination(filters.from, filters.size)?;
        debug!(from = filters.from, size = filters.size, "Searching published events");

        let mut events = self.db.events.search_published(filters).await?;
        let ids: Vec<i64> = events.iter().map(|event| event.id).collect();
        let counts: HashMap<i64, i64> = self
            .db
            .requests
            .confirmed_counts(&ids)
            .await?
            .into_iter()
            .collect();

        if filters.only_available {
            events.retain(|event| {
                let confirmed = counts.get(&event.id).copied().unwrap_or(0);
                !admission::limit_reached(event.participant_limit, confirmed)
            });
        }

        let views = self.view_counts(&events).await;
        match filters.sort {
            EventSort::EventDate => events.sort_by_key(|event| event.event_date),
            EventSort::Views => events.sort_by_key(|event| {
                std::cmp::Reverse(views.get(&event.id).copied().unwrap_or(0))
            }),
        }

        let page: Vec<Event> = events
            .into_iter()
            .skip(filters.from as usize)
            .take(filters.size as usize)
            .collect();

        self.assemble_shorts(page, &counts, &views).await
    }

    /// Admin listing over all events
    pub async fn admin_search(&self, filters: &AdminSearchFilters) -> Result<Vec<EventFull>> {
        validate_pagination(filters.from, filters.size)?;

        let events = self.db.events.admin_search(filters).await?;
        let ids: Vec<i64> = events.iter().map(|event| event.id).collect();
        let counts: HashMap<i64, i64> = self
            .db
            .requests
            .confirmed_counts(&ids)
            .await?
            .into_iter()
            .collect();
        let views = self.view_counts(&events).await;

        let (categories, users) = self.load_references(&events).await?;
        events
            .into_iter()
            .map(|event| {
                let category = lookup_category(&categories, event.category_id)?;
                let initiator = lookup_initiator(&users, event.initiator_id)?;
                let confirmed = counts.get(&event.id).copied().unwrap_or(0);
                let view_count = views.get(&event.id).copied().unwrap_or(0);
                Ok(build_full(event, category, initiator, confirmed, view_count))
            })
            .collect()
    }

    /// Events created by a user
    pub async fn list_owner_events(
        &self,
        user_id: i64,
        from: i64,
        size: i64,
    ) -> Result<Vec<EventShort>> {
        self.load_user(user_id).await?;
        validate_pagination(from, size)?;

        let events = self.db.events.find_by_initiator(user_id, size, from).await?;
        let ids: Vec<i64> = events.iter().map(|event| event.id).collect();
        let counts: HashMap<i64, i64> = self
            .db
            .requests
            .confirmed_counts(&ids)
            .await?
            .into_iter()
            .collect();
        let views = self.view_counts(&events).await;

        self.assemble_shorts(events, &counts, &views).await
    }

    /// Point lookup restricted to events the user initiated
    pub async fn find_owner_event(&self, user_id: i64, event_id: i64) -> Result<EventFull> {
        self.load_user(user_id).await?;
        let event = self.load_owned_event(user_id, event_id).await?;
        self.assemble_full(event).await
    }

    async fn load_user(&self, user_id: i64) -> Result<crate::models::user::User> {
        if user_id == 0 {
            return Err(EventumError::validation("user id must be positive"));
        }
        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EventumError::not_found(format!("user {} does not exist", user_id)))
    }

    async fn load_category(&self, category_id: i64) -> Result<Category> {
        if category_id == 0 {
            return Err(EventumError::validation("category id must be positive"));
        }
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!("category {} does not exist", category_id))
            })
    }

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        if event_id == 0 {
            return Err(EventumError::validation("event id must be positive"));
        }
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventumError::not_found(format!("event {} does not exist", event_id)))
    }

    async fn load_owned_event(&self, user_id: i64, event_id: i64) -> Result<Event> {
        if event_id == 0 {
            return Err(EventumError::validation("event id must be positive"));
        }
        self.db
            .events
            .find_by_id_and_initiator(event_id, user_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!(
                    "event {} initiated by user {} does not exist",
                    event_id, user_id
                ))
            })
    }

    /// Reject limit reductions below the already admitted participant count
    async fn check_limit_not_below_confirmed(
        &self,
        event: &Event,
        new_limit: Option<i32>,
    ) -> Result<()> {
        if let Some(limit) = new_limit {
            if limit > 0 {
                let confirmed = self.db.requests.confirmed_count(event.id).await?;
                if confirmed > i64::from(limit) {
                    return Err(EventumError::conflict(format!(
                        "participant limit {} is below {} already confirmed requests",
                        limit, confirmed
                    )));
                }
            }
        }
        Ok(())
    }

    async fn assemble_full(&self, event: Event) -> Result<EventFull> {
        let category = self.load_category(event.category_id).await?;
        let initiator = self.load_user(event.initiator_id).await?;
        let confirmed = self.db.requests.confirmed_count(event.id).await?;
        let views = self.view_count(&event).await;

        Ok(build_full(event, category, initiator.into(), confirmed, views))
    }

    async fn assemble_shorts(
        &self,
        events: Vec<Event>,
        counts: &HashMap<i64, i64>,
        views: &HashMap<i64, i64>,
    ) -> Result<Vec<EventShort>> {
        let (categories, users) = self.load_references(&events).await?;

        events
            .into_iter()
            .map(|event| {
                let category = lookup_category(&categories, event.category_id)?;
                let initiator = lookup_initiator(&users, event.initiator_id)?;
                let confirmed = counts.get(&event.id).copied().unwrap_or(0);
                let view_count = views.get(&event.id).copied().unwrap_or(0);
                Ok(build_short(event, category, initiator, confirmed, view_count))
            })
            .collect()
    }

    async fn load_references(
        &self,
        events: &[Event],
    ) -> Result<(HashMap<i64, Category>, HashMap<i64, UserShort>)> {
        let mut category_ids: Vec<i64> = events.iter().map(|event| event.category_id).collect();
        category_ids.sort_unstable();
        category_ids.dedup();
        let mut user_ids: Vec<i64> = events.iter().map(|event| event.initiator_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let categories = self
            .db
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();
        let users = self
            .db
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, UserShort::from(user)))
            .collect();

        Ok((categories, users))
    }

    async fn view_count(&self, event: &Event) -> i64 {
        let start = event.published_date.unwrap_or(event.creation_date);
        self.stats.view_count(event.id, start, Utc::now()).await
    }

    async fn view_counts(&self, events: &[Event]) -> HashMap<i64, i64> {
        let lookups = events
            .iter()
            .map(|event| async move { (event.id, self.view_count(event).await) });
        join_all(lookups).await.into_iter().collect()
    }
}

fn lookup_category(categories: &HashMap<i64, Category>, id: i64) -> Result<Category> {
    categories
        .get(&id)
        .cloned()
        .ok_or_else(|| EventumError::not_found(format!("category {} does not exist", id)))
}

fn lookup_initiator(users: &HashMap<i64, UserShort>, id: i64) -> Result<UserShort> {
    users
        .get(&id)
        .cloned()
        .ok_or_else(|| EventumError::not_found(format!("user {} does not exist", id)))
}

fn build_full(
    event: Event,
    category: Category,
    initiator: UserShort,
    confirmed_requests: i64,
    views: i64,
) -> EventFull {
    EventFull {
        id: event.id,
        title: event.title,
        annotation: event.annotation,
        description: event.description,
        category,
        event_date: event.event_date,
        paid: event.paid,
        participant_limit: event.participant_limit,
        request_moderation: event.request_moderation,
        state: event.state,
        created_on: event.creation_date,
        published_on: event.published_date,
        initiator,
        confirmed_requests,
        views,
    }
}

fn build_short(
    event: Event,
    category: Category,
    initiator: UserShort,
    confirmed_requests: i64,
    views: i64,
) -> EventShort {
    EventShort {
        id: event.id,
        title: event.title,
        annotation: event.annotation,
        category,
        event_date: event.event_date,
        paid: event.paid,
        initiator,
        confirmed_requests,
        views,
    }
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(EventumError::validation(format!(
            "{} must be between {} and {} characters, got {}",
            field, min, max, length
        )));
    }
    Ok(())
}

pub(crate) fn validate_pagination(from: i64, size: i64) -> Result<()> {
    if from < 0 {
        return Err(EventumError::validation(format!(
            "'from' must be greater than or equal to 0, got {}",
            from
        )));
    }
    if size <= 0 {
        return Err(EventumError::validation(format!(
            "'size' must be greater than 0, got {}",
            size
        )));
    }
    Ok(())
}

/// Validate a creation payload against field bounds and lead-time rules
pub(crate) fn validate_new_event(new_event: &NewEvent, now: DateTime<Utc>) -> Result<()> {
    validate_length("title", &new_event.title, TITLE_MIN, TITLE_MAX)?;
    validate_length(
        "annotation",
        &new_event.annotation,
        ANNOTATION_MIN,
        ANNOTATION_MAX,
    )?;
    validate_length(
        "description",
        &new_event.description,
        DESCRIPTION_MIN,
        DESCRIPTION_MAX,
    )?;
    if let Some(limit) = new_event.participant_limit {
        if limit < 0 {
            return Err(EventumError::validation(
                "participant limit cannot be negative",
            ));
        }
    }
    if new_event.event_date < now {
        return Err(EventumError::validation(
            "event date cannot be in the past",
        ));
    }
    if new_event.event_date < now + Duration::hours(2) {
        return Err(EventumError::conflict(
            "event date must be at least 2 hours from now",
        ));
    }
    Ok(())
}

/// Apply an administrator patch to an event in place
pub(crate) fn apply_admin_patch(
    event: &mut Event,
    patch: &AdminEventPatch,
    now: DateTime<Utc>,
) -> Result<()> {
    validate_patch_fields(
        patch.title.as_deref(),
        patch.annotation.as_deref(),
        patch.description.as_deref(),
        patch.participant_limit,
    )?;

    if let Some(action) = patch.state_action {
        if event.state != EventState::Pending {
            return Err(EventumError::conflict(format!(
                "event {} can only be published or rejected while pending, current state is {}",
                event.id,
                event.state.as_str()
            )));
        }
        match action {
            AdminStateAction::PublishEvent => {
                event.state = EventState::Published;
                event.published_date = Some(now);
            }
            AdminStateAction::RejectEvent => {
                event.state = EventState::Canceled;
            }
        }
    }

    if let Some(date) = patch.event_date {
        if date < now {
            return Err(EventumError::validation(
                "event date cannot be in the past",
            ));
        }
        if event.state == EventState::Published {
            if let Some(published) = event.published_date {
                if date <= published + Duration::hours(1) {
                    return Err(EventumError::conflict(
                        "event date must be at least 1 hour after publication",
                    ));
                }
            }
        }
        event.event_date = date;
    }

    apply_common_fields(
        event,
        &patch.title,
        &patch.annotation,
        &patch.description,
        patch.category,
        patch.paid,
        patch.participant_limit,
        patch.request_moderation,
    );

    Ok(())
}

/// Apply an initiator patch to an event in place
pub(crate) fn apply_owner_patch(
    event: &mut Event,
    patch: &OwnerEventPatch,
    now: DateTime<Utc>,
) -> Result<()> {
    validate_patch_fields(
        patch.title.as_deref(),
        patch.annotation.as_deref(),
        patch.description.as_deref(),
        patch.participant_limit,
    )?;

    if let Some(date) = patch.event_date {
        if date < now {
            return Err(EventumError::validation(
                "event date cannot be in the past",
            ));
        }
        if event.state == EventState::Published {
            if let Some(published) = event.published_date {
                if date <= published + Duration::hours(1) {
                    return Err(EventumError::conflict(
                        "event date must be at least 1 hour after publication",
                    ));
                }
            }
            if date < now + Duration::hours(2) {
                return Err(EventumError::conflict(
                    "event date must be at least 2 hours from now",
                ));
            }
        }
        event.event_date = date;
    }

    if let Some(action) = patch.state_action {
        if event.state == EventState::Published {
            return Err(EventumError::conflict(format!(
                "published event {} can no longer be reviewed by its initiator",
                event.id
            )));
        }
        match action {
            UserStateAction::SendToReview => event.state = EventState::Pending,
            UserStateAction::CancelReview => event.state = EventState::Canceled,
        }
    }

    apply_common_fields(
        event,
        &patch.title,
        &patch.annotation,
        &patch.description,
        patch.category,
        patch.paid,
        patch.participant_limit,
        patch.request_moderation,
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn apply_common_fields(
    event: &mut Event,
    title: &Option<String>,
    annotation: &Option<String>,
    description: &Option<String>,
    category: Option<i64>,
    paid: Option<bool>,
    participant_limit: Option<i32>,
    request_moderation: Option<bool>,
) {
    if let Some(title) = title {
        event.title = title.clone();
    }
    if let Some(annotation) = annotation {
        event.annotation = annotation.clone();
    }
    if let Some(description) = description {
        event.description = description.clone();
    }
    if let Some(category) = category {
        event.category_id = category;
    }
    if let Some(paid) = paid {
        event.paid = paid;
    }
    if let Some(limit) = participant_limit {
        event.participant_limit = limit;
    }
    if let Some(moderation) = request_moderation {
        event.request_moderation = moderation;
    }
}

fn validate_patch_fields(
    title: Option<&str>,
    annotation: Option<&str>,
    description: Option<&str>,
    participant_limit: Option<i32>,
) -> Result<()> {
    if let Some(title) = title {
        validate_length("title", title, TITLE_MIN, TITLE_MAX)?;
    }
    if let Some(annotation) = annotation {
        validate_length("annotation", annotation, ANNOTATION_MIN, ANNOTATION_MAX)?;
    }
    if let Some(description) = description {
        validate_length("description", description, DESCRIPTION_MIN, DESCRIPTION_MAX)?;
    }
    if let Some(limit) = participant_limit {
        if limit < 0 {
            return Err(EventumError::validation(
                "participant limit cannot be negative",
            ));
        }
    }
    Ok(())
}
