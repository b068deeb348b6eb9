//! HTTP handlers module
//!
//! Axum router and the shared error-response mapping. Handlers stay thin:
//! parse parameters, call the matching service, serialize the result.

pub mod admin;
pub mod private;
pub mod public;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::services::ServiceFactory;
use crate::utils::errors::EventumError;

pub(crate) const DATE_PARAM_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
}

impl AppState {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }
}

/// Build the main application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Public surface
        .route("/events", get(public::search_events))
        .route("/events/top", get(public::top_events))
        .route("/events/:event_id", get(public::find_event))
        .route("/events/:event_id/rating", get(public::event_rating))
        .route("/categories", get(public::list_categories))
        .route("/categories/:category_id", get(public::find_category))
        // Private surface
        .route(
            "/users/:user_id/events",
            post(private::create_event).get(private::list_owner_events),
        )
        .route(
            "/users/:user_id/events/:event_id",
            get(private::find_owner_event).patch(private::update_owner_event),
        )
        .route(
            "/users/:user_id/events/:event_id/requests",
            get(private::list_event_requests).patch(private::update_event_requests),
        )
        .route(
            "/users/:user_id/requests",
            get(private::list_own_requests).post(private::create_request),
        )
        .route(
            "/users/:user_id/requests/:request_id/cancel",
            patch(private::cancel_request),
        )
        .route(
            "/users/:user_id/ratings/:event_id",
            put(private::rate_event).delete(private::remove_rating),
        )
        // Admin surface
        .route("/admin/events", get(admin::search_events))
        .route("/admin/events/:event_id", patch(admin::update_event))
        .route(
            "/admin/users",
            post(admin::create_user).get(admin::list_users),
        )
        .route("/admin/users/:user_id", delete(admin::delete_user))
        .route("/admin/categories", post(admin::create_category))
        .route(
            "/admin/categories/:category_id",
            patch(admin::rename_category).delete(admin::delete_category),
        )
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Error body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: String,
    pub reason: String,
    pub message: String,
    pub timestamp: String,
}

impl IntoResponse for EventumError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            EventumError::Validation(_) => (StatusCode::BAD_REQUEST, "Incorrectly made request."),
            EventumError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "The required object was not found.")
            }
            EventumError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Integrity constraint has been violated.",
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error."),
        };

        if self.is_client_error() {
            debug!(status = %status, error = %self, "Request failed");
        } else {
            error!(status = %status, error = %self, "Request failed");
        }

        let body = ApiError {
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            reason: reason.to_string(),
            message: self.to_string(),
            timestamp: Utc::now().format(DATE_PARAM_FORMAT).to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Parse a `yyyy-MM-dd HH:mm:ss` query parameter
pub(crate) fn parse_date_param(name: &str, value: &str) -> Result<DateTime<Utc>, EventumError> {
    NaiveDateTime::parse_from_str(value, DATE_PARAM_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            EventumError::validation(format!(
                "'{}' must match the format {}, got '{}'",
                name, DATE_PARAM_FORMAT, value
            ))
        })
}

/// Parse a comma-separated list of ids
pub(crate) fn parse_id_list(name: &str, raw: &str) -> Result<Vec<i64>, EventumError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                EventumError::validation(format!("'{}' contains a non-numeric id: '{}'", name, part))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let response = EventumError::validation("bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = EventumError::not_found("missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = EventumError::conflict("duplicate").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = EventumError::Config("broken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_date_param() {
        let parsed = parse_date_param("rangeStart", "2024-06-01 18:30:00").unwrap();
        assert_eq!(parsed.format(DATE_PARAM_FORMAT).to_string(), "2024-06-01 18:30:00");

        assert!(parse_date_param("rangeStart", "June 1st").is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("categories", "1,2, 3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("categories", "1,x").is_err());
    }
}
