use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, AvailabilityRule, BookedInterval, Interview, InterviewId, PartyIdentity,
    PartyRole,
};

/// Repository record pairing the interview with its optimistic-concurrency
/// version. `update` must carry the version the record was fetched at; a
/// store rejects a mismatch with [`RepositoryError::Conflict`] and bumps the
/// version on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub interview: Interview,
    pub version: u64,
}

impl InterviewRecord {
    pub fn status_view(&self) -> InterviewView {
        InterviewView {
            interview_id: self.interview.id.clone(),
            application_id: self.interview.application_id.clone(),
            status: self.interview.phase.label(),
            applicant: self.interview.applicant.clone(),
            reviewer: self.interview.reviewer.clone(),
            platform: self.interview.platform.0.clone(),
            proposed_dates: self.interview.proposed_dates.clone(),
            observations: self.interview.observations.clone(),
            scheduled_at: self.interview.scheduled_at,
            confirmed_by: self.interview.confirmed_by.map(PartyRole::label),
            version: self.version,
        }
    }
}

/// Sanitized representation of an interview's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewView {
    pub interview_id: InterviewId,
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub applicant: PartyIdentity,
    pub reviewer: PartyIdentity,
    pub platform: String,
    pub proposed_dates: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_by: Option<&'static str>,
    pub version: u64,
}

/// Storage abstraction for interviews so the service can be exercised in
/// isolation. One logical transaction per call.
pub trait InterviewRepository: Send + Sync {
    fn insert(&self, interview: Interview) -> Result<InterviewRecord, RepositoryError>;
    fn update(&self, record: InterviewRecord) -> Result<InterviewRecord, RepositoryError>;
    fn fetch(&self, id: &InterviewId) -> Result<Option<InterviewRecord>, RepositoryError>;
    /// Confirmed interviews on a reviewer's calendar, the source for
    /// [`BookedInterval`] derivation.
    fn confirmed_for(&self, reviewer_id: &str) -> Result<Vec<InterviewRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("interview version mismatch or duplicate record")]
    Conflict,
    #[error("interview not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read side of an owner's calendar: the rules the owner maintains plus the
/// intervals already taken by confirmed interviews.
pub trait RuleStore: Send + Sync {
    /// Rules whose active range overlaps `[from, to)` for the given owner.
    fn active_rules(
        &self,
        owner_id: &str,
        owner_role: PartyRole,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityRule>, RuleStoreError>;

    /// Confirmed `[start, end)` intervals overlapping `[from, to)`.
    fn booked_intervals(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BookedInterval>, RuleStoreError>;
}

/// Rule store failure.
#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Typed scheduling events handed to the delivery layer. Payload only; how
/// a message is rendered and sent is not this crate's concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingEvent {
    DatesProposed {
        applicant_name: String,
        reviewer_name: String,
        proposed_by: PartyRole,
        dates: Vec<DateTime<Utc>>,
        observations: Option<String>,
    },
    InterviewConfirmed {
        applicant_name: String,
        reviewer_name: String,
        scheduled_at: DateTime<Utc>,
        confirmed_by: PartyRole,
    },
    RescheduleRequested {
        applicant_name: String,
        reviewer_name: String,
        requested_by: PartyRole,
        reason: Option<String>,
    },
}

/// Trait describing the outbound notification hook.
pub trait ScheduleNotifier: Send + Sync {
    fn notify(&self, event: SchedulingEvent) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
