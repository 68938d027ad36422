//! In-memory adapters behind the scheduling seams.
//!
//! The `serve` command runs against these; tests reuse them so the service
//! can be exercised without external storage or transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::workflows::scheduling::domain::{
    AvailabilityRule, BookedInterval, Interview, InterviewId, InterviewPhase, PartyRole,
};
use crate::workflows::scheduling::repository::{
    InterviewRecord, InterviewRepository, NotifyError, RepositoryError, RuleStore, RuleStoreError,
    ScheduleNotifier, SchedulingEvent,
};

#[derive(Default, Clone)]
pub struct InMemoryInterviewRepository {
    records: Arc<Mutex<HashMap<InterviewId, InterviewRecord>>>,
}

impl InterviewRepository for InMemoryInterviewRepository {
    fn insert(&self, interview: Interview) -> Result<InterviewRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&interview.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = InterviewRecord {
            interview,
            version: 1,
        };
        guard.insert(record.interview.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: InterviewRecord) -> Result<InterviewRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get_mut(&record.interview.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::Conflict);
        }
        let updated = InterviewRecord {
            interview: record.interview,
            version: record.version + 1,
        };
        *stored = updated.clone();
        Ok(updated)
    }

    fn fetch(&self, id: &InterviewId) -> Result<Option<InterviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn confirmed_for(&self, reviewer_id: &str) -> Result<Vec<InterviewRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                record.interview.reviewer.id == reviewer_id
                    && record.interview.phase == InterviewPhase::Confirmed
                    && record.interview.scheduled_at.is_some()
            })
            .cloned()
            .collect())
    }
}

/// Rule store backed by imported rules plus, optionally, the interview
/// repository so confirmed interviews surface as booked intervals.
#[derive(Default, Clone)]
pub struct InMemoryRuleStore {
    rules: Arc<Mutex<Vec<AvailabilityRule>>>,
    interviews: Option<Arc<InMemoryInterviewRepository>>,
}

impl InMemoryRuleStore {
    pub fn with_rules(rules: Vec<AvailabilityRule>) -> Self {
        Self {
            rules: Arc::new(Mutex::new(rules)),
            interviews: None,
        }
    }

    pub fn backed_by(mut self, interviews: Arc<InMemoryInterviewRepository>) -> Self {
        self.interviews = Some(interviews);
        self
    }

    pub fn add_rule(&self, rule: AvailabilityRule) {
        self.rules.lock().expect("rule mutex poisoned").push(rule);
    }
}

impl RuleStore for InMemoryRuleStore {
    fn active_rules(
        &self,
        owner_id: &str,
        owner_role: PartyRole,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityRule>, RuleStoreError> {
        let guard = self.rules.lock().expect("rule mutex poisoned");
        Ok(guard
            .iter()
            .filter(|rule| {
                rule.owner_id == owner_id
                    && rule.owner_role == owner_role
                    && rule.active_from <= to.date_naive()
                    && rule
                        .active_until
                        .map_or(true, |until| until >= from.date_naive())
            })
            .cloned()
            .collect())
    }

    fn booked_intervals(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BookedInterval>, RuleStoreError> {
        let Some(interviews) = &self.interviews else {
            return Ok(Vec::new());
        };

        let confirmed = interviews
            .confirmed_for(owner_id)
            .map_err(|err| RuleStoreError::Unavailable(err.to_string()))?;

        Ok(confirmed
            .iter()
            .filter_map(|record| {
                let start = record.interview.scheduled_at?;
                let end = start + Duration::minutes(i64::from(record.interview.slot_minutes));
                (start < to && end > from).then_some(BookedInterval { start, end })
            })
            .collect())
    }
}

/// Notifier that records scheduling events in the service log. Stand-in for
/// the delivery integration.
#[derive(Default, Clone)]
pub struct LoggingNotifier;

impl ScheduleNotifier for LoggingNotifier {
    fn notify(&self, event: SchedulingEvent) -> Result<(), NotifyError> {
        match &event {
            SchedulingEvent::DatesProposed {
                applicant_name,
                reviewer_name,
                proposed_by,
                dates,
                ..
            } => info!(
                %applicant_name,
                %reviewer_name,
                proposed_by = proposed_by.label(),
                recipient = proposed_by.counterpart().label(),
                count = dates.len(),
                "candidate dates proposed"
            ),
            SchedulingEvent::InterviewConfirmed {
                applicant_name,
                reviewer_name,
                scheduled_at,
                confirmed_by,
            } => info!(
                %applicant_name,
                %reviewer_name,
                %scheduled_at,
                confirmed_by = confirmed_by.label(),
                "interview confirmed"
            ),
            SchedulingEvent::RescheduleRequested {
                applicant_name,
                reviewer_name,
                requested_by,
                ..
            } => info!(
                %applicant_name,
                %reviewer_name,
                requested_by = requested_by.label(),
                recipient = requested_by.counterpart().label(),
                "reschedule requested"
            ),
        }
        Ok(())
    }
}
