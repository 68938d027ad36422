//! The closed transition table for interview scheduling.
//!
//! Every legal move is one arm of [`next_phase`]; anything not listed is a
//! conflict. Keeping the table in one pure function makes each transition
//! enumerable and testable without touching a repository.

use super::domain::{InterviewPhase, NegotiationStep, PartyRole};

/// The four scheduling operations a party can attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingOperation {
    ProposeDates,
    ConfirmDate,
    BookSlot,
    RequestReschedule,
}

impl SchedulingOperation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProposeDates => "propose dates",
            Self::ConfirmDate => "confirm a date",
            Self::BookSlot => "book a slot",
            Self::RequestReschedule => "request a reschedule",
        }
    }
}

/// Raised when an operation is attempted from a phase that does not permit
/// it, or by the wrong party. Indicates a race or a stale client view; safe
/// to retry after re-fetching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("the {party} may not {operation} while the interview is {phase}")]
    NotPermitted {
        operation: &'static str,
        party: &'static str,
        phase: &'static str,
    },
}

fn not_permitted(
    phase: InterviewPhase,
    operation: SchedulingOperation,
    party: PartyRole,
) -> TransitionError {
    TransitionError::NotPermitted {
        operation: operation.label(),
        party: party.label(),
        phase: phase.label(),
    }
}

/// Resolve `phase × operation × party` to the phase the interview moves to.
pub fn next_phase(
    phase: InterviewPhase,
    operation: SchedulingOperation,
    party: PartyRole,
) -> Result<InterviewPhase, TransitionError> {
    use InterviewPhase::{Confirmed, Negotiating, SlotSelection};
    use NegotiationStep::{
        AwaitingApplicantConfirmation, AwaitingReviewerConfirmation, AwaitingReviewerProposedDates,
    };
    use PartyRole::{Applicant, Reviewer};
    use SchedulingOperation::{BookSlot, ConfirmDate, ProposeDates, RequestReschedule};

    match (phase, operation, party) {
        // Proposal ping-pong: a proposal always hands the decision to the
        // counterpart.
        (Negotiating(AwaitingReviewerProposedDates), ProposeDates, Applicant)
        | (Negotiating(AwaitingApplicantConfirmation), ProposeDates, Applicant) => {
            Ok(Negotiating(AwaitingReviewerConfirmation))
        }
        (Negotiating(AwaitingReviewerConfirmation), ProposeDates, Reviewer) => {
            Ok(Negotiating(AwaitingApplicantConfirmation))
        }

        // Confirmation is only legal for the party the phase names.
        (Negotiating(AwaitingReviewerConfirmation), ConfirmDate, Reviewer)
        | (Negotiating(AwaitingApplicantConfirmation), ConfirmDate, Applicant) => Ok(Confirmed),

        // Direct booking path.
        (SlotSelection, BookSlot, Applicant) => Ok(Confirmed),

        // Reopening. A re-request before a new confirmation lands in the
        // same phase again.
        (Confirmed, RequestReschedule, _) | (SlotSelection, RequestReschedule, _) => {
            Ok(SlotSelection)
        }

        (phase, operation, party) => Err(not_permitted(phase, operation, party)),
    }
}
