//! Admission protocol scenarios
//!
//! End-to-end coverage of the capacity-enforcement rules over the pure
//! decision kernel, exercised the way the request service drives it: fetch a
//! snapshot, reorder to the caller's id order, decide, partition.

use chrono::{Duration, Utc};

use eventum::models::event::{Event, EventState, NewEvent};
use eventum::models::request::{AdmissionStatus, ParticipationRequest, RequestStatus};
use eventum::services::admission;
use eventum::EventumError;

fn published_event(id: i64, limit: i32, moderation: bool) -> Event {
    let now = Utc::now();
    Event {
        id,
        title: "City park picnic".to_string(),
        annotation: "Bring a blanket and something to share".to_string(),
        description: "Informal picnic in the park with games and live acoustic music".to_string(),
        event_date: now + Duration::days(5),
        paid: false,
        participant_limit: limit,
        request_moderation: moderation,
        state: EventState::Published,
        creation_date: now - Duration::days(2),
        published_date: Some(now - Duration::days(1)),
        initiator_id: 1,
        category_id: 1,
    }
}

fn pending_request(id: i64, event_id: i64, requester_id: i64) -> ParticipationRequest {
    ParticipationRequest {
        id,
        event_id,
        requester_id,
        status: RequestStatus::Pending,
        creation_date: Utc::now(),
    }
}

#[test]
fn batch_confirm_caps_admissions_at_the_limit() {
    // An event with one remaining slot and two pending requests, confirmed
    // in one batch: the first named request is admitted, the second is
    // force-rejected once the limit is reached.
    let event = published_event(10, 1, true);
    let requests = vec![
        pending_request(101, event.id, 2),
        pending_request(102, event.id, 3),
    ];

    let ordered = admission::order_by_ids(requests, &[101, 102]);
    let decision = admission::decide_batch(
        &ordered,
        AdmissionStatus::Confirmed,
        event.participant_limit,
        0,
    )
    .unwrap();

    assert_eq!(decision.confirmed, vec![101]);
    assert_eq!(decision.rejected, vec![102]);
}

#[test]
fn unlimited_event_confirms_at_creation() {
    // participant_limit = 0 auto-confirms new requests even under
    // moderation.
    let event = published_event(11, 0, true);

    assert!(admission::check_new_request(&event, 5, false, 0).is_ok());
    assert_eq!(admission::initial_status(&event), RequestStatus::Confirmed);
}

#[test]
fn moderation_off_confirms_at_creation() {
    let event = published_event(12, 50, false);
    assert_eq!(admission::initial_status(&event), RequestStatus::Confirmed);
}

#[test]
fn initiator_cannot_request_own_event() {
    let event = published_event(13, 10, true);
    let result = admission::check_new_request(&event, event.initiator_id, false, 0);
    assert!(matches!(result, Err(EventumError::Conflict(_))));
}

#[test]
fn repeated_batch_confirmation_conflicts() {
    // A second confirmation pass over requests decided by the first pass
    // fails instead of double-confirming.
    let event = published_event(14, 5, true);
    let requests = vec![
        pending_request(201, event.id, 2),
        pending_request(202, event.id, 3),
    ];

    let decision =
        admission::decide_batch(&requests, AdmissionStatus::Confirmed, event.participant_limit, 0)
            .unwrap();
    assert_eq!(decision.confirmed.len(), 2);

    let decided: Vec<ParticipationRequest> = requests
        .into_iter()
        .map(|mut request| {
            request.status = RequestStatus::Confirmed;
            request
        })
        .collect();

    let second = admission::decide_batch(
        &decided,
        AdmissionStatus::Confirmed,
        event.participant_limit,
        2,
    );
    assert!(matches!(second, Err(EventumError::Conflict(_))));
}

#[test]
fn whole_batch_fails_on_full_event_before_any_decision() {
    let event = published_event(15, 2, true);
    let requests = vec![pending_request(301, event.id, 4)];

    let result =
        admission::decide_batch(&requests, AdmissionStatus::Confirmed, event.participant_limit, 2);
    assert!(matches!(result, Err(EventumError::Conflict(_))));
}

#[test]
fn ids_missing_from_the_event_are_skipped() {
    let fetched = vec![pending_request(401, 16, 2)];
    let ordered = admission::order_by_ids(fetched, &[999, 401]);

    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered[0].id, 401);
}

#[test]
fn new_event_round_trips_submitted_fields() {
    // Creating an event and reading it back yields the submitted values,
    // with only server-assigned fields added.
    let now = Utc::now();
    let new_event = NewEvent {
        title: "Vintage swing picnic".to_string(),
        annotation: "Dancing on the grass with a gramophone".to_string(),
        description: "A relaxed afternoon of swing music, dance and picnic baskets".to_string(),
        category: 4,
        event_date: now + Duration::days(3),
        paid: Some(true),
        participant_limit: Some(60),
        request_moderation: Some(true),
    };

    let draft = new_event.clone().into_draft(9, now);

    assert_eq!(draft.title, new_event.title);
    assert_eq!(draft.annotation, new_event.annotation);
    assert_eq!(draft.description, new_event.description);
    assert_eq!(draft.category_id, new_event.category);
    assert_eq!(draft.event_date, new_event.event_date);
    assert_eq!(draft.paid, new_event.paid.unwrap());
    assert_eq!(draft.participant_limit, new_event.participant_limit.unwrap());
    assert_eq!(draft.request_moderation, new_event.request_moderation.unwrap());
    assert_eq!(draft.state, EventState::Pending);
    assert_eq!(draft.creation_date, now);
}
