use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for interviews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewId(pub String);

/// Identifier wrapper for the owning application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Upper bound on candidate dates per proposal round.
pub const MAX_PROPOSED_DATES: usize = 3;

/// The two fixed interview participants. Every transition names which role
/// may perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Applicant,
    Reviewer,
}

impl PartyRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "applicant",
            Self::Reviewer => "reviewer",
        }
    }

    pub const fn counterpart(self) -> Self {
        match self {
            Self::Applicant => Self::Reviewer,
            Self::Reviewer => Self::Applicant,
        }
    }
}

/// A named participant as the outer workflow knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyIdentity {
    pub id: String,
    pub name: String,
}

/// Where the interview happens. Opaque to scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationPlatform(pub String);

/// Position inside the proposal ping-pong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStep {
    AwaitingReviewerProposedDates,
    AwaitingReviewerConfirmation,
    AwaitingApplicantConfirmation,
}

/// Lifecycle phase of an interview. Negotiation and direct slot selection
/// are separate modes sharing the one record; `Confirmed` is terminal until
/// a reschedule reopens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    Negotiating(NegotiationStep),
    SlotSelection,
    Confirmed,
}

impl InterviewPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Negotiating(NegotiationStep::AwaitingReviewerProposedDates) => {
                "awaiting_reviewer_proposed_dates"
            }
            Self::Negotiating(NegotiationStep::AwaitingReviewerConfirmation) => {
                "awaiting_reviewer_confirmation"
            }
            Self::Negotiating(NegotiationStep::AwaitingApplicantConfirmation) => {
                "awaiting_applicant_confirmation"
            }
            Self::SlotSelection => "awaiting_applicant_slot_selection",
            Self::Confirmed => "confirmed",
        }
    }

    /// The role expected to confirm from this phase, if any.
    pub const fn expected_confirmer(self) -> Option<PartyRole> {
        match self {
            Self::Negotiating(NegotiationStep::AwaitingReviewerConfirmation) => {
                Some(PartyRole::Reviewer)
            }
            Self::Negotiating(NegotiationStep::AwaitingApplicantConfirmation) => {
                Some(PartyRole::Applicant)
            }
            _ => None,
        }
    }
}

/// Which booking path a newly created interview starts on. The outer
/// workflow decides; scheduling imposes no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    Negotiation,
    SlotSelection,
}

/// One interview per application. Mutated only through the operation
/// modules so that `scheduled_at`, `proposed_dates`, and the phase stay
/// consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub applicant: PartyIdentity,
    pub reviewer: PartyIdentity,
    pub platform: CommunicationPlatform,
    pub phase: InterviewPhase,
    pub proposed_dates: Vec<DateTime<Utc>>,
    pub observations: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<PartyRole>,
    /// Slot length used when the applicant books directly from the
    /// reviewer's calendar.
    pub slot_minutes: u32,
}

impl Interview {
    fn new(
        id: InterviewId,
        application_id: ApplicationId,
        applicant: PartyIdentity,
        reviewer: PartyIdentity,
        platform: CommunicationPlatform,
        phase: InterviewPhase,
        slot_minutes: u32,
    ) -> Self {
        Self {
            id,
            application_id,
            applicant,
            reviewer,
            platform,
            phase,
            proposed_dates: Vec::new(),
            observations: None,
            scheduled_at: None,
            confirmed_by: None,
            slot_minutes,
        }
    }

    /// Start in the proposal ping-pong.
    pub fn negotiation(
        id: InterviewId,
        application_id: ApplicationId,
        applicant: PartyIdentity,
        reviewer: PartyIdentity,
        platform: CommunicationPlatform,
        slot_minutes: u32,
    ) -> Self {
        Self::new(
            id,
            application_id,
            applicant,
            reviewer,
            platform,
            InterviewPhase::Negotiating(NegotiationStep::AwaitingReviewerProposedDates),
            slot_minutes,
        )
    }

    /// Start with the applicant picking a slot from the reviewer's calendar.
    pub fn slot_selection(
        id: InterviewId,
        application_id: ApplicationId,
        applicant: PartyIdentity,
        reviewer: PartyIdentity,
        platform: CommunicationPlatform,
        slot_minutes: u32,
    ) -> Self {
        Self::new(
            id,
            application_id,
            applicant,
            reviewer,
            platform,
            InterviewPhase::SlotSelection,
            slot_minutes,
        )
    }

    pub fn party(&self, role: PartyRole) -> &PartyIdentity {
        match role {
            PartyRole::Applicant => &self.applicant,
            PartyRole::Reviewer => &self.reviewer,
        }
    }
}

/// Creation request handed in by the outer workflow, which also decides
/// the initial mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInterview {
    pub application_id: ApplicationId,
    pub applicant: PartyIdentity,
    pub reviewer: PartyIdentity,
    pub platform: CommunicationPlatform,
    pub mode: SchedulingMode,
    #[serde(default)]
    pub slot_minutes: Option<u32>,
}

/// Same-day availability window, UTC. `start < end` by construction of the
/// rule-owning command; the resolver skips degenerate windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A recurring or date-bounded calendar rule owned by one party. Exclusion
/// rules mark the owner unavailable and override overlapping availability;
/// an exclusion without a window covers the owner's entire day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub owner_id: String,
    pub owner_role: PartyRole,
    pub weekday: Weekday,
    pub window: Option<DailyWindow>,
    pub active_from: NaiveDate,
    pub active_until: Option<NaiveDate>,
    pub exclusion: bool,
}

impl AvailabilityRule {
    /// Whether the rule contributes to the given calendar day.
    pub fn applies_on(&self, day: NaiveDate) -> bool {
        day.weekday() == self.weekday
            && self.active_from <= day
            && self.active_until.map_or(true, |until| day <= until)
    }
}

/// An already-confirmed `[start, end)` interval on an owner's calendar.
/// Derived from confirmed interviews; never created directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A concrete bookable window produced by the resolver. Ephemeral; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// Input problems detected before any mutation. Non-retryable without new
/// input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one candidate date is required")]
    NoProposedDates,
    #[error("no more than {MAX_PROPOSED_DATES} candidate dates may be proposed, got {0}")]
    TooManyProposedDates(usize),
    #[error("proposed date {0} is not in the future")]
    ProposedDateNotFuture(DateTime<Utc>),
    #[error("proposed date {0} appears more than once")]
    DuplicateProposedDate(DateTime<Utc>),
    #[error("{0} is not one of the proposed dates")]
    DateNotProposed(DateTime<Utc>),
    #[error("no bookable slot starts at {0}")]
    SlotNotAvailable(DateTime<Utc>),
    #[error("party '{0}' does not belong to this interview")]
    UnknownParty(String),
}
