//! Reopening a confirmed interview for a new slot selection.

use super::domain::{Interview, PartyRole};
use super::repository::SchedulingEvent;
use super::transitions::{self, SchedulingOperation, TransitionError};

/// Return the interview to the slot-selection phase. Repeating the request
/// before a new confirmation lands in the same phase with fresh
/// observations; there is no limit on how often an interview reschedules.
pub fn request_reschedule(
    interview: &mut Interview,
    party: PartyRole,
    reason: Option<String>,
) -> Result<SchedulingEvent, TransitionError> {
    let next = transitions::next_phase(
        interview.phase,
        SchedulingOperation::RequestReschedule,
        party,
    )?;

    interview.phase = next;
    interview.scheduled_at = None;
    interview.confirmed_by = None;
    interview.proposed_dates.clear();
    interview.observations = reason.clone();

    Ok(SchedulingEvent::RescheduleRequested {
        applicant_name: interview.applicant.name.clone(),
        reviewer_name: interview.reviewer.name.clone(),
        requested_by: party,
        reason,
    })
}
