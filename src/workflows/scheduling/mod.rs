//! Interview scheduling: availability resolution, the proposal ping-pong,
//! direct slot booking, and reviewer-initiated reschedules.
//!
//! The two booking paths are independent state machines sharing one
//! `Interview` record; every legal move lives in the transition table in
//! [`transitions`], and the operation modules run all checks before any
//! mutation.

pub mod availability;
pub mod booking;
pub mod domain;
mod intervals;
pub mod negotiation;
pub mod repository;
pub mod reschedule;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityError, AvailabilityQuery, AvailabilityResolver};
pub use booking::BookingError;
pub use domain::{
    ApplicationId, AvailabilityRule, BookedInterval, CommunicationPlatform, DailyWindow,
    Interview, InterviewId, InterviewPhase, NegotiationStep, NewInterview, PartyIdentity,
    PartyRole, SchedulingMode, TimeSlot, ValidationError, MAX_PROPOSED_DATES,
};
pub use negotiation::NegotiationError;
pub use repository::{
    InterviewRecord, InterviewRepository, InterviewView, NotifyError, RepositoryError, RuleStore,
    RuleStoreError, ScheduleNotifier, SchedulingEvent,
};
pub use router::interview_router;
pub use service::{
    ErrorClass, InterviewSchedulingService, SchedulingConfig, SchedulingServiceError,
};
pub use transitions::{SchedulingOperation, TransitionError};
