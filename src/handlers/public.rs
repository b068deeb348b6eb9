//! Public HTTP surface
//!
//! Unauthenticated read endpoints. Event reads report a hit to the stats
//! service before answering.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use super::{parse_date_param, parse_id_list, AppState};
use crate::models::category::Category;
use crate::models::event::{EventFull, EventShort, EventSort, SearchFilters};
use crate::models::rating::EventRating;
use crate::utils::errors::EventumError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSearchQuery {
    pub text: Option<String>,
    pub categories: Option<String>,
    pub paid: Option<bool>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub only_available: Option<bool>,
    pub sort: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

impl EventSearchQuery {
    fn into_filters(self) -> Result<SearchFilters, EventumError> {
        let categories = self
            .categories
            .as_deref()
            .map(|raw| parse_id_list("categories", raw))
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
        let sort = match self.sort.as_deref() {
            None | Some("EVENT_DATE") => EventSort::EventDate,
            Some("VIEWS") => EventSort::Views,
            Some(other) => {
                return Err(EventumError::validation(format!(
                    "unknown sort order '{}'",
                    other
                )))
            }
        };

        Ok(SearchFilters {
            text: self.text,
            categories,
            paid: self.paid,
            range_start,
            range_end,
            only_available: self.only_available.unwrap_or(false),
            sort,
            from: self.from.unwrap_or(0),
            size: self.size.unwrap_or(10),
        })
    }
}

/// `GET /events` — search published events
pub async fn search_events(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<EventSearchQuery>,
) -> Result<Json<Vec<EventShort>>, EventumError> {
    state
        .services
        .stats_service
        .record_hit("/events", &addr.ip().to_string())
        .await;

    let filters = query.into_filters()?;
    let events = state.services.event_service.search(&filters).await?;
    Ok(Json(events))
}

/// `GET /events/{eventId}` — published event detail
pub async fn find_event(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventFull>, EventumError> {
    state
        .services
        .stats_service
        .record_hit(&format!("/events/{}", event_id), &addr.ip().to_string())
        .await;

    let event = state.services.event_service.find_published(event_id).await?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
pub struct TopEventsQuery {
    pub count: Option<i64>,
}

/// `GET /events/top` — highest rated events
pub async fn top_events(
    State(state): State<AppState>,
    Query(query): Query<TopEventsQuery>,
) -> Result<Json<Vec<EventRating>>, EventumError> {
    let ratings = state
        .services
        .rating_service
        .top_events(query.count.unwrap_or(10))
        .await?;
    Ok(Json(ratings))
}

/// `GET /events/{eventId}/rating` — aggregated rating of an event
pub async fn event_rating(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventRating>, EventumError> {
    let rating = state.services.rating_service.event_rating(event_id).await?;
    Ok(Json(rating))
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// `GET /categories` — list categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Vec<Category>>, EventumError> {
    let categories = state
        .services
        .category_service
        .list(query.from.unwrap_or(0), query.size.unwrap_or(10))
        .await?;
    Ok(Json(categories))
}

/// `GET /categories/{categoryId}` — category detail
pub async fn find_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<Category>, EventumError> {
    let category = state.services.category_service.find(category_id).await?;
    Ok(Json(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_filters_defaults() {
        let filters = EventSearchQuery::default().into_filters().unwrap();
        assert_eq!(filters.from, 0);
        assert_eq!(filters.size, 10);
        assert_eq!(filters.sort, EventSort::EventDate);
        assert!(!filters.only_available);
        assert!(filters.categories.is_none());
    }

    #[test]
    fn test_filters_parse_lists_and_dates() {
        let query = EventSearchQuery {
            categories: Some("4,7".to_string()),
            range_start: Some("2024-05-01 00:00:00".to_string()),
            sort: Some("VIEWS".to_string()),
            ..Default::default()
        };
        let filters = query.into_filters().unwrap();

        assert_eq!(filters.categories, Some(vec![4, 7]));
        assert!(filters.range_start.is_some());
        assert_eq!(filters.sort, EventSort::Views);
    }

    #[test]
    fn test_filters_reject_unknown_sort() {
        let query = EventSearchQuery {
            sort: Some("RELEVANCE".to_string()),
            ..Default::default()
        };
        assert_matches!(query.into_filters(), Err(EventumError::Validation(_)));
    }
}
