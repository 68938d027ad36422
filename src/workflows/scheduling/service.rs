use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::availability::{AvailabilityError, AvailabilityQuery, AvailabilityResolver};
use super::booking::{self, BookingError};
use super::domain::{Interview, InterviewId, NewInterview, PartyRole, SchedulingMode, TimeSlot};
use super::negotiation::{self, NegotiationError};
use super::repository::{
    InterviewRecord, InterviewRepository, NotifyError, RepositoryError, RuleStore,
    ScheduleNotifier,
};
use super::reschedule;
use super::transitions::TransitionError;

/// Tunables the outer application hands to the scheduling core.
#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Slot length applied to interviews created without an explicit one.
    pub default_slot_minutes: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            default_slot_minutes: 30,
        }
    }
}

/// Service composing the interview repository, the availability resolver,
/// and the notification seam. Each operation is one fetch, one pure
/// mutation with all checks up front, one versioned write, one
/// notification.
pub struct InterviewSchedulingService<R, S, N> {
    repository: Arc<R>,
    resolver: AvailabilityResolver<S>,
    notifier: Arc<N>,
    config: SchedulingConfig,
}

static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_interview_id() -> InterviewId {
    let id = INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InterviewId(format!("itv-{id:06}"))
}

impl<R, S, N> InterviewSchedulingService<R, S, N>
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        rules: Arc<S>,
        notifier: Arc<N>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            repository,
            resolver: AvailabilityResolver::new(rules),
            notifier,
            config,
        }
    }

    /// Create an interview in the mode the outer workflow picked.
    pub fn create(&self, request: NewInterview) -> Result<InterviewRecord, SchedulingServiceError> {
        let id = next_interview_id();
        let slot_minutes = request
            .slot_minutes
            .unwrap_or(self.config.default_slot_minutes);

        let interview = match request.mode {
            SchedulingMode::Negotiation => Interview::negotiation(
                id,
                request.application_id,
                request.applicant,
                request.reviewer,
                request.platform,
                slot_minutes,
            ),
            SchedulingMode::SlotSelection => Interview::slot_selection(
                id,
                request.application_id,
                request.applicant,
                request.reviewer,
                request.platform,
                slot_minutes,
            ),
        };

        Ok(self.repository.insert(interview)?)
    }

    /// Fetch an interview and current state for API responses.
    pub fn get(&self, id: &InterviewId) -> Result<InterviewRecord, SchedulingServiceError> {
        Ok(self.fetch(id)?)
    }

    /// Bookable slots for one owner's calendar. Pure read; emits nothing.
    pub fn free_slots(
        &self,
        query: &AvailabilityQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, SchedulingServiceError> {
        Ok(self.resolver.free_slots(query, now)?)
    }

    /// Submit 1..=3 candidate dates for the counterpart to confirm or
    /// counter.
    pub fn propose_dates(
        &self,
        id: &InterviewId,
        party: PartyRole,
        dates: Vec<DateTime<Utc>>,
        observations: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<InterviewRecord, SchedulingServiceError> {
        let mut record = self.fetch(id)?;
        let event =
            negotiation::propose_dates(&mut record.interview, party, dates, observations, now)?;
        let record = self.repository.update(record)?;
        self.notifier.notify(event)?;
        Ok(record)
    }

    /// Confirm one of the currently proposed dates.
    pub fn confirm_date(
        &self,
        id: &InterviewId,
        party: PartyRole,
        chosen: DateTime<Utc>,
    ) -> Result<InterviewRecord, SchedulingServiceError> {
        let mut record = self.fetch(id)?;
        let event = negotiation::confirm_date(&mut record.interview, party, chosen)?;
        let record = self.repository.update(record)?;
        self.notifier.notify(event)?;
        Ok(record)
    }

    /// Book a slot straight off the reviewer's computed availability.
    pub fn book_slot(
        &self,
        id: &InterviewId,
        applicant_id: &str,
        slot_start: DateTime<Utc>,
        observations: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<InterviewRecord, SchedulingServiceError> {
        let mut record = self.fetch(id)?;
        let event = booking::book_slot(
            &mut record.interview,
            &self.resolver,
            applicant_id,
            slot_start,
            observations,
            now,
        )?;
        let record = self.repository.update(record)?;
        self.notifier.notify(event)?;
        Ok(record)
    }

    /// Reopen a confirmed interview for a new slot selection.
    pub fn request_reschedule(
        &self,
        id: &InterviewId,
        party: PartyRole,
        reason: Option<String>,
    ) -> Result<InterviewRecord, SchedulingServiceError> {
        let mut record = self.fetch(id)?;
        let event = reschedule::request_reschedule(&mut record.interview, party, reason)?;
        let record = self.repository.update(record)?;
        self.notifier.notify(event)?;
        Ok(record)
    }

    fn fetch(&self, id: &InterviewId) -> Result<InterviewRecord, RepositoryError> {
        self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)
    }
}

/// Error raised by the scheduling service.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingServiceError {
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Reschedule(#[from] TransitionError),
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotifyError),
}

/// The caller-facing error taxonomy. Validation needs new input, Conflict
/// is safe to retry after a re-fetch, Unexpected covers infrastructure
/// failures including notification delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Conflict,
    NotFound,
    Unexpected,
}

impl SchedulingServiceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Negotiation(NegotiationError::Transition(_)) => ErrorClass::Conflict,
            Self::Negotiation(NegotiationError::Validation(_)) => ErrorClass::Validation,
            Self::Booking(BookingError::Transition(_)) => ErrorClass::Conflict,
            Self::Booking(BookingError::Validation(_)) => ErrorClass::Validation,
            Self::Booking(BookingError::Availability(error)) => availability_class(error),
            Self::Reschedule(_) => ErrorClass::Conflict,
            Self::Availability(error) => availability_class(error),
            Self::Repository(RepositoryError::NotFound) => ErrorClass::NotFound,
            Self::Repository(RepositoryError::Conflict) => ErrorClass::Conflict,
            Self::Repository(RepositoryError::Unavailable(_)) => ErrorClass::Unexpected,
            Self::Notification(_) => ErrorClass::Unexpected,
        }
    }
}

fn availability_class(error: &AvailabilityError) -> ErrorClass {
    match error {
        AvailabilityError::InvalidRange { .. } | AvailabilityError::InvalidSlotDuration => {
            ErrorClass::Validation
        }
        AvailabilityError::Rules(_) => ErrorClass::Unexpected,
    }
}
