//! Participation request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a participation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl RequestStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Canceled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    pub id: i64,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
    pub creation_date: DateTime<Utc>,
}

/// Target outcome of a batch admission update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdmissionStatus {
    Confirmed,
    Rejected,
}

/// Batch status update submitted by the event owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionUpdate {
    pub request_ids: Vec<i64>,
    pub status: AdmissionStatus,
}

/// Outcome of a batch admission update
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResult {
    pub confirmed_requests: Vec<ParticipationRequest>,
    pub rejected_requests: Vec<ParticipationRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Confirmed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_admission_status_wire_format() {
        let status: AdmissionStatus = serde_json::from_str("\"CONFIRMED\"").unwrap();
        assert_eq!(status, AdmissionStatus::Confirmed);
        assert!(serde_json::from_str::<AdmissionStatus>("\"PENDING\"").is_err());
    }
}
