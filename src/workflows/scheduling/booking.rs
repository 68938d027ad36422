//! Direct booking: the applicant picks one of the reviewer's computed
//! slots and the interview confirms in a single step.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use super::availability::{AvailabilityError, AvailabilityQuery, AvailabilityResolver};
use super::domain::{Interview, PartyRole, ValidationError};
use super::repository::{RuleStore, SchedulingEvent};
use super::transitions::{self, SchedulingOperation, TransitionError};

/// Error raised by the direct booking path.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

/// Book the slot starting at `slot_start` for the calling applicant.
///
/// The reviewer's availability is recomputed for the UTC day containing the
/// chosen start; the start must equal one returned slot's start exactly, no
/// partial or rounded matches. On any failure the interview is untouched.
pub fn book_slot<S>(
    interview: &mut Interview,
    resolver: &AvailabilityResolver<S>,
    applicant_id: &str,
    slot_start: DateTime<Utc>,
    observations: Option<String>,
    now: DateTime<Utc>,
) -> Result<SchedulingEvent, BookingError>
where
    S: RuleStore,
{
    if interview.party(PartyRole::Applicant).id != applicant_id {
        return Err(ValidationError::UnknownParty(applicant_id.to_string()).into());
    }

    let next = transitions::next_phase(
        interview.phase,
        SchedulingOperation::BookSlot,
        PartyRole::Applicant,
    )?;

    let day_start = slot_start.date_naive().and_time(NaiveTime::MIN).and_utc();
    let query = AvailabilityQuery {
        owner_id: interview.reviewer.id.clone(),
        owner_role: PartyRole::Reviewer,
        from: day_start,
        to: day_start + Duration::days(1),
        slot_minutes: interview.slot_minutes,
    };

    let slots = resolver.free_slots(&query, now)?;
    if !slots.iter().any(|slot| slot.start == slot_start) {
        return Err(ValidationError::SlotNotAvailable(slot_start).into());
    }

    interview.phase = next;
    interview.scheduled_at = Some(slot_start);
    interview.confirmed_by = Some(PartyRole::Applicant);
    if observations.is_some() {
        interview.observations = observations;
    }

    Ok(SchedulingEvent::InterviewConfirmed {
        applicant_name: interview.applicant.name.clone(),
        reviewer_name: interview.reviewer.name.clone(),
        scheduled_at: slot_start,
        confirmed_by: PartyRole::Applicant,
    })
}
