//! Admission decision kernel
//!
//! Pure capacity accounting for participation requests. Every rule that
//! compares the confirmed count against the participant limit lives here, so
//! the services share one implementation and the rules are testable without
//! storage. Callers are responsible for running these decisions inside the
//! per-event critical section.

use crate::models::event::{Event, EventState};
use crate::models::request::{AdmissionStatus, ParticipationRequest, RequestStatus};
use crate::utils::errors::{EventumError, Result};

/// Number of confirmed requests in a snapshot
pub fn confirmed_count(requests: &[ParticipationRequest]) -> i64 {
    requests
        .iter()
        .filter(|request| request.status == RequestStatus::Confirmed)
        .count() as i64
}

/// Whether an event with `limit` has no room left
///
/// A limit of 0 means unlimited and is never reached.
pub fn limit_reached(limit: i32, confirmed: i64) -> bool {
    limit > 0 && confirmed >= i64::from(limit)
}

/// Initial status of a fresh request on `event`
///
/// Moderation-exempt and unlimited events confirm at creation; everything
/// else waits for the owner's decision.
pub fn initial_status(event: &Event) -> RequestStatus {
    if !event.request_moderation || event.participant_limit == 0 {
        RequestStatus::Confirmed
    } else {
        RequestStatus::Pending
    }
}

/// Validate that a user may file a new request against `event`
pub fn check_new_request(
    event: &Event,
    requester_id: i64,
    has_active_request: bool,
    confirmed: i64,
) -> Result<()> {
    if has_active_request {
        return Err(EventumError::conflict(format!(
            "user {} already has an active request on event {}",
            requester_id, event.id
        )));
    }
    if event.initiator_id == requester_id {
        return Err(EventumError::conflict(format!(
            "initiator cannot request participation in own event {}",
            event.id
        )));
    }
    if event.state != EventState::Published {
        return Err(EventumError::conflict(format!(
            "event {} is not published",
            event.id
        )));
    }
    if limit_reached(event.participant_limit, confirmed) {
        return Err(EventumError::conflict(format!(
            "participant limit of event {} is reached",
            event.id
        )));
    }

    Ok(())
}

/// Ids partitioned by decided outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDecision {
    pub confirmed: Vec<i64>,
    pub rejected: Vec<i64>,
}

/// Decide a batch of requests against the remaining capacity
///
/// Requests are processed in the order given. Each must still be pending;
/// encountering an already decided request fails the whole batch before
/// anything is persisted. Once the running confirmed count reaches the
/// limit, every remaining request is rejected regardless of the requested
/// status.
pub fn decide_batch(
    requests: &[ParticipationRequest],
    target: AdmissionStatus,
    limit: i32,
    already_confirmed: i64,
) -> Result<BatchDecision> {
    if target == AdmissionStatus::Confirmed && limit_reached(limit, already_confirmed) {
        return Err(EventumError::conflict(
            "participant limit is already reached".to_string(),
        ));
    }

    let mut confirmed = already_confirmed;
    let mut decision = BatchDecision::default();

    for request in requests {
        if request.status != RequestStatus::Pending {
            return Err(EventumError::conflict(format!(
                "request {} is already decided ({:?})",
                request.id, request.status
            )));
        }

        let outcome = if limit_reached(limit, confirmed) {
            AdmissionStatus::Rejected
        } else {
            target
        };

        match outcome {
            AdmissionStatus::Confirmed => {
                confirmed += 1;
                decision.confirmed.push(request.id);
            }
            AdmissionStatus::Rejected => decision.rejected.push(request.id),
        }
    }

    Ok(decision)
}

/// Reorder fetched requests to the order the caller named them in
///
/// Ids absent from `requests` are skipped.
pub fn order_by_ids(
    requests: Vec<ParticipationRequest>,
    ids: &[i64],
) -> Vec<ParticipationRequest> {
    let mut by_id: std::collections::HashMap<i64, ParticipationRequest> =
        requests.into_iter().map(|r| (r.id, r)).collect();

    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use proptest::prelude::*;

    fn event(limit: i32, moderation: bool, state: EventState) -> Event {
        let now = Utc::now();
        Event {
            id: 1,
            title: "Weekend jazz jam".to_string(),
            annotation: "Open jam session for local musicians".to_string(),
            description: "Bring your instrument, rhythm section provided all night".to_string(),
            event_date: now + chrono::Duration::days(3),
            paid: false,
            participant_limit: limit,
            request_moderation: moderation,
            state,
            creation_date: now,
            published_date: Some(now),
            initiator_id: 100,
            category_id: 1,
        }
    }

    fn pending(id: i64) -> ParticipationRequest {
        request(id, RequestStatus::Pending)
    }

    fn request(id: i64, status: RequestStatus) -> ParticipationRequest {
        ParticipationRequest {
            id,
            event_id: 1,
            requester_id: 200 + id,
            status,
            creation_date: Utc::now(),
        }
    }

    #[test]
    fn test_limit_zero_is_never_reached() {
        assert!(!limit_reached(0, 0));
        assert!(!limit_reached(0, 1_000_000));
    }

    #[test]
    fn test_limit_reached_at_and_above() {
        assert!(!limit_reached(3, 2));
        assert!(limit_reached(3, 3));
        assert!(limit_reached(3, 4));
    }

    #[test]
    fn test_initial_status_moderated_limited() {
        assert_eq!(
            initial_status(&event(10, true, EventState::Published)),
            RequestStatus::Pending
        );
    }

    #[test]
    fn test_initial_status_moderation_off() {
        assert_eq!(
            initial_status(&event(10, false, EventState::Published)),
            RequestStatus::Confirmed
        );
    }

    #[test]
    fn test_initial_status_unlimited_auto_confirms() {
        // Scenario: participant_limit = 0 confirms immediately even with
        // moderation enabled.
        assert_eq!(
            initial_status(&event(0, true, EventState::Published)),
            RequestStatus::Confirmed
        );
    }

    #[test]
    fn test_new_request_rejects_duplicates() {
        let result = check_new_request(&event(10, true, EventState::Published), 201, true, 0);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_new_request_rejects_own_event() {
        let result = check_new_request(&event(10, true, EventState::Published), 100, false, 0);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_new_request_rejects_unpublished_event() {
        let result = check_new_request(&event(10, true, EventState::Pending), 201, false, 0);
        assert_matches!(result, Err(EventumError::Conflict(_)));

        let result = check_new_request(&event(10, true, EventState::Canceled), 201, false, 0);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_new_request_rejects_full_event() {
        let result = check_new_request(&event(2, true, EventState::Published), 201, false, 2);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_new_request_accepts_free_capacity() {
        assert!(check_new_request(&event(2, true, EventState::Published), 201, false, 1).is_ok());
    }

    #[test]
    fn test_batch_caps_at_limit() {
        // Two pending requests, room for one: the first is confirmed, the
        // second is force-rejected.
        let requests = vec![pending(1), pending(2)];
        let decision =
            decide_batch(&requests, AdmissionStatus::Confirmed, 1, 0).unwrap();

        assert_eq!(decision.confirmed, vec![1]);
        assert_eq!(decision.rejected, vec![2]);
    }

    #[test]
    fn test_batch_order_decides_who_gets_in() {
        let requests = vec![pending(2), pending(1)];
        let decision =
            decide_batch(&requests, AdmissionStatus::Confirmed, 1, 0).unwrap();

        assert_eq!(decision.confirmed, vec![2]);
        assert_eq!(decision.rejected, vec![1]);
    }

    #[test]
    fn test_batch_counts_prior_confirmations() {
        let requests = vec![pending(1), pending(2), pending(3)];
        let decision =
            decide_batch(&requests, AdmissionStatus::Confirmed, 4, 2).unwrap();

        assert_eq!(decision.confirmed, vec![1, 2]);
        assert_eq!(decision.rejected, vec![3]);
    }

    #[test]
    fn test_batch_conflict_when_already_full() {
        let requests = vec![pending(1)];
        let result = decide_batch(&requests, AdmissionStatus::Confirmed, 2, 2);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_batch_conflict_on_decided_request() {
        // Re-running a confirmation over already decided requests fails
        // instead of double-confirming.
        let requests = vec![request(1, RequestStatus::Confirmed), pending(2)];
        let result = decide_batch(&requests, AdmissionStatus::Confirmed, 10, 1);
        assert_matches!(result, Err(EventumError::Conflict(_)));

        let requests = vec![request(1, RequestStatus::Canceled)];
        let result = decide_batch(&requests, AdmissionStatus::Confirmed, 10, 0);
        assert_matches!(result, Err(EventumError::Conflict(_)));
    }

    #[test]
    fn test_batch_reject_ignores_capacity() {
        let requests = vec![pending(1), pending(2)];
        let decision = decide_batch(&requests, AdmissionStatus::Rejected, 1, 1).unwrap();

        assert!(decision.confirmed.is_empty());
        assert_eq!(decision.rejected, vec![1, 2]);
    }

    #[test]
    fn test_batch_unlimited_confirms_everything() {
        let requests: Vec<_> = (1..=50).map(pending).collect();
        let decision =
            decide_batch(&requests, AdmissionStatus::Confirmed, 0, 123).unwrap();

        assert_eq!(decision.confirmed.len(), 50);
        assert!(decision.rejected.is_empty());
    }

    #[test]
    fn test_order_by_ids_follows_caller_order() {
        let fetched = vec![pending(3), pending(1), pending(2)];
        let ordered = order_by_ids(fetched, &[2, 3, 99, 1]);

        let ids: Vec<i64> = ordered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    proptest! {
        #[test]
        fn prop_confirmations_never_exceed_limit(
            batch_size in 0usize..40,
            limit in 1i32..20,
            already_confirmed in 0i64..20,
        ) {
            let requests: Vec<_> = (1..=batch_size as i64).map(pending).collect();
            let result = decide_batch(
                &requests,
                AdmissionStatus::Confirmed,
                limit,
                already_confirmed,
            );

            if let Ok(decision) = result {
                prop_assert!(
                    already_confirmed + decision.confirmed.len() as i64 <= i64::from(limit)
                );
                prop_assert_eq!(
                    decision.confirmed.len() + decision.rejected.len(),
                    batch_size
                );
            } else {
                // The only failure over all-pending input is a full event.
                prop_assert!(limit_reached(limit, already_confirmed));
            }
        }
    }
}
