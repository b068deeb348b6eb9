//! Participation request service
//!
//! Owns request creation, cancellation and the owner's batch admission
//! protocol. Every decision that compares the confirmed count against the
//! participant limit is taken inside the per-event critical section, so
//! concurrent admissions on the same event cannot both observe free capacity.

use chrono::Utc;
use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::event::Event;
use crate::models::request::{
    AdmissionResult, AdmissionStatus, AdmissionUpdate, ParticipationRequest, RequestStatus,
};
use crate::services::admission;
use crate::services::locks::EventLocks;
use crate::utils::errors::{EventumError, Result};
use crate::utils::logging;

/// Request service for participation admission
#[derive(Clone)]
pub struct RequestService {
    db: DatabaseService,
    locks: EventLocks,
}

impl RequestService {
    /// Create a new RequestService instance
    pub fn new(db: DatabaseService, locks: EventLocks) -> Self {
        Self { db, locks }
    }

    /// File a participation request on a published event
    pub async fn create(&self, user_id: i64, event_id: i64) -> Result<ParticipationRequest> {
        debug!(user_id = user_id, event_id = event_id, "Creating participation request");

        if event_id == 0 {
            return Err(EventumError::validation("event id must be positive"));
        }
        self.load_user(user_id).await?;

        let _guard = self.locks.acquire(event_id).await;

        let event = self.load_event(event_id).await?;
        let has_active = self
            .db
            .requests
            .find_active(event_id, user_id)
            .await?
            .is_some();
        let confirmed = self.db.requests.confirmed_count(event_id).await?;

        admission::check_new_request(&event, user_id, has_active, confirmed)?;

        let status = admission::initial_status(&event);
        let request = self
            .db
            .requests
            .create(event_id, user_id, status, Utc::now())
            .await?;
        info!(
            request_id = request.id,
            event_id = event_id,
            user_id = user_id,
            status = ?request.status,
            "Participation request created"
        );

        Ok(request)
    }

    /// Cancel the caller's own request
    ///
    /// Rejected and canceled requests are terminal; canceling one again is a
    /// conflict rather than a silent no-op.
    pub async fn cancel(&self, user_id: i64, request_id: i64) -> Result<ParticipationRequest> {
        debug!(user_id = user_id, request_id = request_id, "Canceling participation request");

        self.load_user(user_id).await?;
        if request_id == 0 {
            return Err(EventumError::validation("request id must be positive"));
        }

        let request = self
            .db
            .requests
            .find_by_id_and_requester(request_id, user_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!(
                    "request {} by user {} does not exist",
                    request_id, user_id
                ))
            })?;

        // Canceling a confirmed request frees capacity, so it runs under the
        // event lock like every other confirmed-count change. The status is
        // re-read inside the critical section; a concurrent batch may have
        // decided the request in the meantime.
        let _guard = self.locks.acquire(request.event_id).await;

        let request = self
            .db
            .requests
            .find_by_id_and_requester(request_id, user_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!(
                    "request {} by user {} does not exist",
                    request_id, user_id
                ))
            })?;

        if request.status.is_terminal() {
            return Err(EventumError::conflict(format!(
                "request {} is already decided ({:?})",
                request.id, request.status
            )));
        }

        let canceled = self
            .db
            .requests
            .update_status(request.id, RequestStatus::Canceled)
            .await?;
        info!(
            request_id = canceled.id,
            event_id = canceled.event_id,
            user_id = user_id,
            "Participation request canceled"
        );

        Ok(canceled)
    }

    /// All requests filed by a user
    pub async fn list_own(&self, user_id: i64) -> Result<Vec<ParticipationRequest>> {
        self.load_user(user_id).await?;
        self.db.requests.find_by_requester(user_id).await
    }

    /// All requests on an event owned by the caller
    pub async fn list_for_event(
        &self,
        owner_id: i64,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>> {
        self.load_user(owner_id).await?;
        self.load_owned_event(owner_id, event_id).await?;
        self.db.requests.find_by_event(event_id).await
    }

    /// Batch confirm or reject pending requests on an owned event
    pub async fn update_event_requests(
        &self,
        owner_id: i64,
        event_id: i64,
        update: AdmissionUpdate,
    ) -> Result<AdmissionResult> {
        debug!(
            owner_id = owner_id,
            event_id = event_id,
            requests = update.request_ids.len(),
            status = ?update.status,
            "Processing admission batch"
        );

        self.load_user(owner_id).await?;

        let _guard = self.locks.acquire(event_id).await;

        let event = self.load_owned_event(owner_id, event_id).await?;
        let confirmed = self.db.requests.confirmed_count(event_id).await?;

        if update.status == AdmissionStatus::Confirmed
            && admission::limit_reached(event.participant_limit, confirmed)
        {
            return Err(EventumError::conflict(format!(
                "participant limit of event {} is already reached",
                event_id
            )));
        }

        // Moderation-exempt events confirm at creation; re-confirming them
        // is a no-op.
        if !event.request_moderation && update.status == AdmissionStatus::Confirmed {
            return Ok(AdmissionResult::default());
        }

        let fetched = self
            .db
            .requests
            .find_by_ids_and_event(&update.request_ids, event_id)
            .await?;
        let ordered = admission::order_by_ids(fetched, &update.request_ids);

        let decision = admission::decide_batch(
            &ordered,
            update.status,
            event.participant_limit,
            confirmed,
        )?;

        self.db
            .requests
            .apply_admission(&decision.confirmed, &decision.rejected)
            .await?;
        logging::log_admission_outcome(event_id, decision.confirmed.len(), decision.rejected.len());

        let mut result = AdmissionResult::default();
        for mut request in ordered {
            if decision.confirmed.contains(&request.id) {
                request.status = RequestStatus::Confirmed;
                result.confirmed_requests.push(request);
            } else {
                request.status = RequestStatus::Rejected;
                result.rejected_requests.push(request);
            }
        }

        Ok(result)
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

    async fn load_event(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventumError::not_found(format!("event {} does not exist", event_id)))
    }

    async fn load_owned_event(&self, owner_id: i64, event_id: i64) -> Result<Event> {
        if event_id == 0 {
            return Err(EventumError::validation("event id must be positive"));
        }
        self.db
            .events
            .find_by_id_and_initiator(event_id, owner_id)
            .await?
            .ok_or_else(|| {
                EventumError::not_found(format!(
                    "event {} initiated by user {} does not exist",
                    event_id, owner_id
                ))
            })
    }
}
