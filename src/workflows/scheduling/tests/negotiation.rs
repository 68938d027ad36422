use super::common::*;
use std::sync::Arc;

use crate::workflows::scheduling::domain::{
    InterviewPhase, NegotiationStep, PartyRole, SchedulingMode, ValidationError,
};
use crate::workflows::scheduling::negotiation::NegotiationError;
use crate::workflows::scheduling::repository::{
    InterviewRepository, RepositoryError, SchedulingEvent,
};
use crate::workflows::scheduling::service::{
    ErrorClass, InterviewSchedulingService, SchedulingConfig, SchedulingServiceError,
};

#[test]
fn the_full_round_trip_confirms_the_countered_date() {
    let (service, repository, _, notifier) = build_service();
    let (id, record) = created(&service, SchedulingMode::Negotiation);
    assert_eq!(
        record.interview.phase,
        InterviewPhase::Negotiating(NegotiationStep::AwaitingReviewerProposedDates)
    );

    let d1 = august(10, 9, 0);
    let d2 = august(11, 14, 0);
    let d3 = august(12, 10, 0);

    let record = service
        .propose_dates(
            &id,
            PartyRole::Applicant,
            vec![d1, d2],
            Some("mornings preferred".to_string()),
            now(),
        )
        .expect("applicant proposes");
    assert_eq!(
        record.interview.phase,
        InterviewPhase::Negotiating(NegotiationStep::AwaitingReviewerConfirmation)
    );
    assert_eq!(record.interview.proposed_dates, vec![d1, d2]);

    let record = service
        .propose_dates(&id, PartyRole::Reviewer, vec![d3], None, now())
        .expect("reviewer counters");
    assert_eq!(
        record.interview.phase,
        InterviewPhase::Negotiating(NegotiationStep::AwaitingApplicantConfirmation)
    );
    // A counter-proposal replaces dates and observations wholesale.
    assert_eq!(record.interview.proposed_dates, vec![d3]);
    assert!(record.interview.observations.is_none());

    let record = service
        .confirm_date(&id, PartyRole::Applicant, d3)
        .expect("applicant confirms");
    assert_eq!(record.interview.phase, InterviewPhase::Confirmed);
    assert_eq!(record.interview.scheduled_at, Some(d3));
    assert_eq!(record.interview.confirmed_by, Some(PartyRole::Applicant));
    assert!(record.interview.proposed_dates.is_empty());

    let stored = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
    assert_eq!(stored.version, 4, "create plus three updates");

    let events = notifier.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], SchedulingEvent::DatesProposed { .. }));
    assert!(matches!(events[1], SchedulingEvent::DatesProposed { .. }));
    match &events[2] {
        SchedulingEvent::InterviewConfirmed {
            scheduled_at,
            confirmed_by,
            ..
        } => {
            assert_eq!(*scheduled_at, d3);
            assert_eq!(*confirmed_by, PartyRole::Applicant);
        }
        other => panic!("expected confirmation event, got {other:?}"),
    }
}

#[test]
fn reproposing_without_an_intervening_counter_is_a_conflict() {
    let (service, repository, _, _) = build_service();
    let (id, _) = created(&service, SchedulingMode::Negotiation);

    service
        .propose_dates(&id, PartyRole::Applicant, vec![august(10, 9, 0)], None, now())
        .expect("first proposal");

    let error = service
        .propose_dates(&id, PartyRole::Applicant, vec![august(11, 9, 0)], None, now())
        .expect_err("second proposal from the same party");
    assert_eq!(error.class(), ErrorClass::Conflict);

    let stored = repository.fetch(&id).expect("fetch").expect("present");
    assert_eq!(stored.interview.proposed_dates, vec![august(10, 9, 0)]);
}

#[test]
fn confirming_an_unproposed_date_changes_nothing() {
    let (service, repository, _, _) = build_service();
    let (id, _) = created(&service, SchedulingMode::Negotiation);

    service
        .propose_dates(&id, PartyRole::Applicant, vec![august(10, 9, 0)], None, now())
        .expect("proposal");
    let before = repository.fetch(&id).expect("fetch").expect("present");

    let error = service
        .confirm_date(&id, PartyRole::Reviewer, august(10, 9, 1))
        .expect_err("unproposed date");
    assert_eq!(error.class(), ErrorClass::Validation);
    assert!(matches!(
        error,
        SchedulingServiceError::Negotiation(NegotiationError::Validation(
            ValidationError::DateNotProposed(_)
        ))
    ));

    let after = repository.fetch(&id).expect("fetch").expect("present");
    assert_eq!(before, after, "failed confirmation must not mutate");
}

#[test]
fn candidate_dates_are_validated_before_any_mutation() {
    let (service, _, _, notifier) = build_service();
    let (id, _) = created(&service, SchedulingMode::Negotiation);

    let past = service
        .propose_dates(&id, PartyRole::Applicant, vec![now()], None, now())
        .expect_err("date equal to now is not future");
    assert_eq!(past.class(), ErrorClass::Validation);

    let too_many = service
        .propose_dates(
            &id,
            PartyRole::Applicant,
            vec![
                august(10, 9, 0),
                august(10, 10, 0),
                august(10, 11, 0),
                august(10, 12, 0),
            ],
            None,
            now(),
        )
        .expect_err("four dates");
    assert!(matches!(
        too_many,
        SchedulingServiceError::Negotiation(NegotiationError::Validation(
            ValidationError::TooManyProposedDates(4)
        ))
    ));

    let duplicate = service
        .propose_dates(
            &id,
            PartyRole::Applicant,
            vec![august(10, 9, 0), august(10, 9, 0)],
            None,
            now(),
        )
        .expect_err("duplicate dates");
    assert!(matches!(
        duplicate,
        SchedulingServiceError::Negotiation(NegotiationError::Validation(
            ValidationError::DuplicateProposedDate(_)
        ))
    ));

    let empty = service
        .propose_dates(&id, PartyRole::Applicant, Vec::new(), None, now())
        .expect_err("no dates");
    assert!(matches!(
        empty,
        SchedulingServiceError::Negotiation(NegotiationError::Validation(
            ValidationError::NoProposedDates
        ))
    ));

    assert!(notifier.events().is_empty(), "nothing was ever proposed");
}

#[test]
fn the_wrong_party_cannot_confirm() {
    let (service, _, _, _) = build_service();
    let (id, _) = created(&service, SchedulingMode::Negotiation);

    service
        .propose_dates(&id, PartyRole::Applicant, vec![august(10, 9, 0)], None, now())
        .expect("proposal");

    // The applicant proposed, so confirmation belongs to the reviewer.
    let error = service
        .confirm_date(&id, PartyRole::Applicant, august(10, 9, 0))
        .expect_err("own proposal");
    assert_eq!(error.class(), ErrorClass::Conflict);
}

#[test]
fn missing_interviews_surface_not_found() {
    let (service, _, _, _) = build_service();

    let error = service
        .propose_dates(
            &crate::workflows::scheduling::domain::InterviewId("itv-missing".to_string()),
            PartyRole::Applicant,
            vec![august(10, 9, 0)],
            None,
            now(),
        )
        .expect_err("missing interview");
    assert_eq!(error.class(), ErrorClass::NotFound);
}

#[test]
fn a_stale_version_is_rejected_by_the_store() {
    let (service, repository, _, _) = build_service();
    let (id, stale) = created(&service, SchedulingMode::Negotiation);

    service
        .propose_dates(&id, PartyRole::Applicant, vec![august(10, 9, 0)], None, now())
        .expect("proposal bumps the version");

    match repository.update(stale) {
        Err(RepositoryError::Conflict) => {}
        other => panic!("expected version conflict, got {other:?}"),
    }
}

#[test]
fn notification_failure_fails_the_call_but_keeps_the_transition() {
    let repository = Arc::new(crate::infra::InMemoryInterviewRepository::default());
    let rules = Arc::new(crate::infra::InMemoryRuleStore::default());
    let service = InterviewSchedulingService::new(
        repository.clone(),
        rules,
        Arc::new(FailingNotifier),
        SchedulingConfig::default(),
    );

    let record = service
        .create(submission(SchedulingMode::Negotiation))
        .expect("create succeeds");
    let id = record.interview.id.clone();

    let error = service
        .propose_dates(&id, PartyRole::Applicant, vec![august(10, 9, 0)], None, now())
        .expect_err("notifier is down");
    assert_eq!(error.class(), ErrorClass::Unexpected);

    // The transition was already persisted; callers re-fetch to observe it.
    let stored = repository.fetch(&id).expect("fetch").expect("present");
    assert_eq!(
        stored.interview.phase,
        InterviewPhase::Negotiating(NegotiationStep::AwaitingReviewerConfirmation)
    );
}
