//! Stats client behavior against a mock stats server
//!
//! The view counter is best-effort telemetry: every failure mode must
//! degrade to a count of zero instead of failing the caller.

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventum::config::StatsConfig;
use eventum::services::StatsService;

fn stats_config(base_url: String) -> StatsConfig {
    StatsConfig {
        base_url,
        app_name: "eventum".to_string(),
        timeout_seconds: 2,
    }
}

#[tokio::test]
async fn view_count_returns_reported_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("uris", "/events/7"))
        .and(query_param("unique", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"app": "eventum", "uri": "/events/7", "hits": 42}
        ])))
        .mount(&server)
        .await;

    let service = StatsService::new(stats_config(server.uri())).unwrap();
    let views = service
        .view_count(7, Utc::now() - Duration::hours(6), Utc::now())
        .await;

    assert_eq!(views, 42);
}

#[tokio::test]
async fn view_count_ignores_other_uris() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"app": "eventum", "uri": "/events/99", "hits": 17}
        ])))
        .mount(&server)
        .await;

    let service = StatsService::new(stats_config(server.uri())).unwrap();
    let views = service
        .view_count(7, Utc::now() - Duration::hours(6), Utc::now())
        .await;

    assert_eq!(views, 0);
}

#[tokio::test]
async fn view_count_degrades_to_zero_on_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = StatsService::new(stats_config(server.uri())).unwrap();
    let views = service
        .view_count(7, Utc::now() - Duration::hours(6), Utc::now())
        .await;

    assert_eq!(views, 0);
}

#[tokio::test]
async fn view_count_degrades_to_zero_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = StatsService::new(stats_config(server.uri())).unwrap();
    let views = service
        .view_count(7, Utc::now() - Duration::hours(6), Utc::now())
        .await;

    assert_eq!(views, 0);
}

#[tokio::test]
async fn view_count_degrades_to_zero_when_unreachable() {
    // Nothing listens on this address.
    let service =
        StatsService::new(stats_config("http://127.0.0.1:9".to_string())).unwrap();
    let views = service
        .view_count(7, Utc::now() - Duration::hours(6), Utc::now())
        .await;

    assert_eq!(views, 0);
}

#[tokio::test]
async fn record_hit_posts_to_the_stats_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = StatsService::new(stats_config(server.uri())).unwrap();
    service.record_hit("/events/7", "203.0.113.5").await;

    server.verify().await;
}

#[tokio::test]
async fn record_hit_swallows_failures() {
    let service =
        StatsService::new(stats_config("http://127.0.0.1:9".to_string())).unwrap();
    // Must return without error even though nothing is listening.
    service.record_hit("/events/7", "203.0.113.5").await;
}
