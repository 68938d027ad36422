//! The proposal ping-pong: candidate dates go back and forth until one
//! party confirms a date the other proposed.

use chrono::{DateTime, Utc};

use super::domain::{Interview, PartyRole, ValidationError, MAX_PROPOSED_DATES};
use super::repository::SchedulingEvent;
use super::transitions::{self, SchedulingOperation, TransitionError};

/// Error raised by a negotiation step. Transition problems are conflicts;
/// validation problems need new input.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Replace the candidate dates and observations wholesale and hand the
/// decision to the counterpart. All checks run before any field changes.
pub fn propose_dates(
    interview: &mut Interview,
    party: PartyRole,
    dates: Vec<DateTime<Utc>>,
    observations: Option<String>,
    now: DateTime<Utc>,
) -> Result<SchedulingEvent, NegotiationError> {
    let next = transitions::next_phase(interview.phase, SchedulingOperation::ProposeDates, party)?;
    validate_candidate_dates(&dates, now)?;

    interview.phase = next;
    interview.proposed_dates = dates.clone();
    interview.observations = observations.clone();

    Ok(SchedulingEvent::DatesProposed {
        applicant_name: interview.applicant.name.clone(),
        reviewer_name: interview.reviewer.name.clone(),
        proposed_by: party,
        dates,
        observations,
    })
}

/// Confirm one of the counterpart's proposed dates. The chosen instant must
/// be an exact member of the current proposal.
pub fn confirm_date(
    interview: &mut Interview,
    party: PartyRole,
    chosen: DateTime<Utc>,
) -> Result<SchedulingEvent, NegotiationError> {
    let next = transitions::next_phase(interview.phase, SchedulingOperation::ConfirmDate, party)?;
    if !interview.proposed_dates.contains(&chosen) {
        return Err(ValidationError::DateNotProposed(chosen).into());
    }

    interview.phase = next;
    interview.scheduled_at = Some(chosen);
    interview.confirmed_by = Some(party);
    interview.proposed_dates.clear();

    Ok(SchedulingEvent::InterviewConfirmed {
        applicant_name: interview.applicant.name.clone(),
        reviewer_name: interview.reviewer.name.clone(),
        scheduled_at: chosen,
        confirmed_by: party,
    })
}

fn validate_candidate_dates(
    dates: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if dates.is_empty() {
        return Err(ValidationError::NoProposedDates);
    }
    if dates.len() > MAX_PROPOSED_DATES {
        return Err(ValidationError::TooManyProposedDates(dates.len()));
    }
    for (index, date) in dates.iter().enumerate() {
        if *date <= now {
            return Err(ValidationError::ProposedDateNotFuture(*date));
        }
        if dates[..index].contains(date) {
            return Err(ValidationError::DuplicateProposedDate(*date));
        }
    }
    Ok(())
}
