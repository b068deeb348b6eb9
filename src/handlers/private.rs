//! Private HTTP surface
//!
//! Endpoints scoped to a user: their events, participation requests and
//! ratings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::AppState;
use crate::models::event::{EventFull, EventShort, NewEvent, OwnerEventPatch};
use crate::models::rating::{EventRating, RatingValue};
use crate::models::request::{AdmissionResult, AdmissionUpdate, ParticipationRequest};
use crate::utils::errors::EventumError;

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// `POST /users/{userId}/events` — create an event
pub async fn create_event(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventFull>), EventumError> {
    let event = state.services.event_service.create(user_id, new_event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /users/{userId}/events` — list the caller's events
pub async fn list_owner_events(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<EventShort>>, EventumError> {
    let events = state
        .services
        .event_service
        .list_owner_events(user_id, query.from.unwrap_or(0), query.size.unwrap_or(10))
        .await?;
    Ok(Json(events))
}

/// `GET /users/{userId}/events/{eventId}` — one of the caller's events
pub async fn find_owner_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventFull>, EventumError> {
    let event = state
        .services
        .event_service
        .find_owner_event(user_id, event_id)
        .await?;
    Ok(Json(event))
}

/// `PATCH /users/{userId}/events/{eventId}` — owner update
pub async fn update_owner_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(patch): Json<OwnerEventPatch>,
) -> Result<Json<EventFull>, EventumError> {
    let event = state
        .services
        .event_service
        .update_owner(user_id, event_id, patch)
        .await?;
    Ok(Json(event))
}

/// `GET /users/{userId}/events/{eventId}/requests` — requests on an owned event
pub async fn list_event_requests(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<ParticipationRequest>>, EventumError> {
    let requests = state
        .services
        .request_service
        .list_for_event(user_id, event_id)
        .await?;
    Ok(Json(requests))
}

/// `PATCH /users/{userId}/events/{eventId}/requests` — batch confirm/reject
pub async fn update_event_requests(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(update): Json<AdmissionUpdate>,
) -> Result<Json<AdmissionResult>, EventumError> {
    let result = state
        .services
        .request_service
        .update_event_requests(user_id, event_id, update)
        .await?;
    Ok(Json(result))
}

/// `GET /users/{userId}/requests` — the caller's participation requests
pub async fn list_own_requests(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ParticipationRequest>>, EventumError> {
    let requests = state.services.request_service.list_own(user_id).await?;
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestQuery {
    pub event_id: Option<i64>,
}

/// `POST /users/{userId}/requests?eventId=` — file a participation request
pub async fn create_request(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<CreateRequestQuery>,
) -> Result<(StatusCode, Json<ParticipationRequest>), EventumError> {
    let event_id = query
        .event_id
        .ok_or_else(|| EventumError::validation("query parameter 'eventId' is required"))?;

    let request = state.services.request_service.create(user_id, event_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// `PATCH /users/{userId}/requests/{requestId}/cancel` — cancel own request
pub async fn cancel_request(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<ParticipationRequest>, EventumError> {
    let request = state.services.request_service.cancel(user_id, request_id).await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub value: Option<RatingValue>,
}

/// `PUT /users/{userId}/ratings/{eventId}?value=like|dislike` — rate an event
pub async fn rate_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<EventRating>, EventumError> {
    let value = query
        .value
        .ok_or_else(|| EventumError::validation("query parameter 'value' is required"))?;

    let rating = state
        .services
        .rating_service
        .rate(user_id, event_id, value)
        .await?;
    Ok(Json(rating))
}

/// `DELETE /users/{userId}/ratings/{eventId}` — remove own rating
pub async fn remove_rating(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<StatusCode, EventumError> {
    state.services.rating_service.remove(user_id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
