use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::infra::{InMemoryInterviewRepository, InMemoryRuleStore};
use crate::workflows::scheduling::domain::{
    ApplicationId, AvailabilityRule, CommunicationPlatform, DailyWindow, Interview, InterviewId,
    NewInterview, PartyIdentity, PartyRole, SchedulingMode,
};
use crate::workflows::scheduling::repository::{
    InterviewRecord, InterviewRepository, NotifyError, RepositoryError, ScheduleNotifier,
    SchedulingEvent,
};
use crate::workflows::scheduling::service::{InterviewSchedulingService, SchedulingConfig};

pub(super) const REVIEWER_ID: &str = "rev-anna";
pub(super) const APPLICANT_ID: &str = "app-maria";

/// Fixed "now": Saturday 2026-08-01 08:00 UTC. The Mondays that follow are
/// 2026-08-03, 2026-08-10, ...
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap()
}

pub(super) fn august(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, hour, minute, 0).unwrap()
}

pub(super) fn applicant() -> PartyIdentity {
    PartyIdentity {
        id: APPLICANT_ID.to_string(),
        name: "Maria Prieto".to_string(),
    }
}

pub(super) fn reviewer() -> PartyIdentity {
    PartyIdentity {
        id: REVIEWER_ID.to_string(),
        name: "Anna Keller".to_string(),
    }
}

pub(super) fn submission(mode: SchedulingMode) -> NewInterview {
    NewInterview {
        application_id: ApplicationId("appl-204".to_string()),
        applicant: applicant(),
        reviewer: reviewer(),
        platform: CommunicationPlatform("google-meet".to_string()),
        mode,
        slot_minutes: Some(30),
    }
}

/// A weekly availability window on the reviewer's calendar, active from the
/// start of 2026 with no end.
pub(super) fn weekly_rule(weekday: Weekday, start: (u32, u32), end: (u32, u32)) -> AvailabilityRule {
    AvailabilityRule {
        owner_id: REVIEWER_ID.to_string(),
        owner_role: PartyRole::Reviewer,
        weekday,
        window: Some(DailyWindow {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("valid time"),
        }),
        active_from: NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
        active_until: None,
        exclusion: false,
    }
}

pub(super) fn exclusion_rule(
    weekday: Weekday,
    window: Option<((u32, u32), (u32, u32))>,
) -> AvailabilityRule {
    AvailabilityRule {
        window: window.map(|(start, end)| DailyWindow {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).expect("valid time"),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).expect("valid time"),
        }),
        exclusion: true,
        ..weekly_rule(weekday, (0, 0), (0, 1))
    }
}

pub(super) type TestService =
    InterviewSchedulingService<InMemoryInterviewRepository, InMemoryRuleStore, MemoryNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemoryInterviewRepository>,
    Arc<InMemoryRuleStore>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(InMemoryInterviewRepository::default());
    let rules = Arc::new(InMemoryRuleStore::default().backed_by(repository.clone()));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = InterviewSchedulingService::new(
        repository.clone(),
        rules.clone(),
        notifier.clone(),
        SchedulingConfig::default(),
    );
    (service, repository, rules, notifier)
}

/// Create an interview and return its id alongside the stored record.
pub(super) fn created(service: &TestService, mode: SchedulingMode) -> (InterviewId, InterviewRecord) {
    let record = service.create(submission(mode)).expect("create succeeds");
    (record.interview.id.clone(), record)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<SchedulingEvent>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<SchedulingEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ScheduleNotifier for MemoryNotifier {
    fn notify(&self, event: SchedulingEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl ScheduleNotifier for FailingNotifier {
    fn notify(&self, _event: SchedulingEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl InterviewRepository for UnavailableRepository {
    fn insert(&self, _interview: Interview) -> Result<InterviewRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: InterviewRecord) -> Result<InterviewRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &InterviewId) -> Result<Option<InterviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn confirmed_for(&self, _reviewer_id: &str) -> Result<Vec<InterviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
