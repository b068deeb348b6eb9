//! Admin HTTP surface
//!
//! Moderation endpoints: event publication, user and category management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::{parse_date_param, parse_id_list, AppState};
use crate::models::category::{Category, NewCategory};
use crate::models::event::{AdminEventPatch, AdminSearchFilters, EventFull, EventState};
use crate::models::user::{NewUser, User};
use crate::utils::errors::EventumError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminEventQuery {
    pub users: Option<String>,
    pub states: Option<String>,
    pub categories: Option<String>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl AdminEventQuery {
    fn into_filters(self) -> Result<AdminSearchFilters, EventumError> {
        let users = self
            .users
            .as_deref()
            .map(|raw| parse_id_list("users", raw))
            .transpose()?;
        let categories = self
            .categories
            .as_deref()
            .map(|raw| parse_id_list("categories", raw))
            .transpose()?;
        let states = self
            .states
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(parse_state)
                    .collect::<Result<Vec<EventState>, EventumError>>()
            })
            .transpose()?;
        let range_start = self
            .range_start
            .as_deref()
            .map(|raw| parse_date_param("rangeStart", raw))
            .transpose()?;
        let range_end = self
            .range_end
            .as_deref()
            .map(|raw| parse_date_param("rangeEnd", raw))
            .transpose()?;

        Ok(AdminSearchFilters {
            users,
            states,
            categories,
            range_start,
            range_end,
            from: self.from.unwrap_or(0),
            size: self.size.unwrap_or(10),
        })
    }
}

fn parse_state(value: &str) -> Result<EventState, EventumError> {
    match value {
        "PENDING" => Ok(EventState::Pending),
        "PUBLISHED" => Ok(EventState::Published),
        "CANCELED" => Ok(EventState::Canceled),
        other => Err(EventumError::validation(format!(
            "unknown event state '{}'",
            other
        ))),
    }
}

/// `GET /admin/events` — unrestricted event listing
pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<AdminEventQuery>,
) -> Result<Json<Vec<EventFull>>, EventumError> {
    let filters = query.into_filters()?;
    let events = state.services.event_service.admin_search(&filters).await?;
    Ok(Json(events))
}

/// `PATCH /admin/events/{eventId}` — admin update and state transitions
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(patch): Json<AdminEventPatch>,
) -> Result<Json<EventFull>, EventumError> {
    let event = state.services.event_service.update_admin(event_id, patch).await?;
    Ok(Json(event))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserListQuery {
    pub ids: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// `POST /admin/users` — register a user
pub async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), EventumError> {
    let user = state.services.user_service.create(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /admin/users` — list users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<User>>, EventumError> {
    let ids = query
        .ids
        .as_deref()
        .map(|raw| parse_id_list("ids", raw))
        .transpose()?;
    let users = state
        .services
        .user_service
        .list(ids, query.from.unwrap_or(0), query.size.unwrap_or(10))
        .await?;
    Ok(Json(users))
}

/// `DELETE /admin/users/{userId}` — delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, EventumError> {
    state.services.user_service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/categories` — create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), EventumError> {
    let category = state.services.category_service.create(new_category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PATCH /admin/categories/{categoryId}` — rename a category
pub async fn rename_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(new_category): Json<NewCategory>,
) -> Result<Json<Category>, EventumError> {
    let category = state
        .services
        .category_service
        .rename(category_id, new_category)
        .await?;
    Ok(Json(category))
}

/// `DELETE /admin/categories/{categoryId}` — delete an unused category
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<StatusCode, EventumError> {
    state.services.category_service.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_admin_query_parses_states() {
        let query = AdminEventQuery {
            states: Some("PENDING,PUBLISHED".to_string()),
            ..Default::default()
        };
        let filters = query.into_filters().unwrap();
        assert_eq!(
            filters.states,
            Some(vec![EventState::Pending, EventState::Published])
        );
    }

    #[test]
    fn test_admin_query_rejects_unknown_state() {
        let query = AdminEventQuery {
            states: Some("LIVE".to_string()),
            ..Default::default()
        };
        assert_matches!(query.into_filters(), Err(EventumError::Validation(_)));
    }
}
