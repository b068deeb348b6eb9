//! Stats service client
//!
//! This service handles integration with the external hit-counting service,
//! including HTTP client setup, response parsing and error handling. The
//! stats service is best-effort telemetry: failures degrade to a view count
//! of zero and never fail the caller.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::StatsConfig;
use crate::utils::errors::Result;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single endpoint hit reported to the stats service
#[derive(Debug, Clone, Serialize)]
struct EndpointHit {
    app: String,
    uri: String,
    ip: String,
    timestamp: String,
}

/// Aggregated view statistics for one URI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

/// Client for the external view-counting service
#[derive(Debug, Clone)]
pub struct StatsService {
    client: Client,
    settings: StatsConfig,
}

impl StatsService {
    /// Create a new StatsService instance
    pub fn new(settings: StatsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent("eventum/0.1")
            .build()?;

        Ok(Self { client, settings })
    }

    /// Record a hit against a public endpoint
    ///
    /// Telemetry must not fail the caller; errors are logged and swallowed.
    pub async fn record_hit(&self, uri: &str, ip: &str) {
        let hit = EndpointHit {
            app: self.settings.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: Utc::now().format(DATE_FORMAT).to_string(),
        };

        let url = format!("{}/hit", self.settings.base_url);
        match self.client.post(&url).json(&hit).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(uri = uri, "Hit recorded");
            }
            Ok(response) => {
                warn!(uri = uri, status = %response.status(), "Stats service rejected hit");
            }
            Err(e) => {
                warn!(uri = uri, error = %e, "Failed to record hit");
            }
        }
    }

    /// Number of views of an event page within a time window
    ///
    /// Any transport error, non-success status or empty result degrades to 0.
    pub async fn view_count(
        &self,
        event_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> i64 {
        let uri = format!("/events/{}", event_id);
        let url = format!("{}/stats", self.settings.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("start", start.format(DATE_FORMAT).to_string()),
                ("end", end.format(DATE_FORMAT).to_string()),
                ("uris", uri.clone()),
                ("unique", "false".to_string()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(event_id = event_id, error = %e, "Failed to query view stats");
                return 0;
            }
        };

        if !response.status().is_success() {
            warn!(event_id = event_id, status = %response.status(), "Stats service returned an error");
            return 0;
        }

        match response.json::<Vec<ViewStats>>().await {
            Ok(stats) => stats
                .iter()
                .find(|entry| entry.uri == uri)
                .map(|entry| entry.hits)
                .unwrap_or(0),
            Err(e) => {
                warn!(event_id = event_id, error = %e, "Failed to parse view stats");
                0
            }
        }
    }
}
