//! Rule → free-slot computation for one owner's calendar.
//!
//! The resolver is a pure function of rule-store state at call time: no
//! caching, no snapshot isolation across calls. Per calendar day it unions
//! the availability windows, subtracts exclusion windows and already-booked
//! intervals, then slices what remains into fixed-length slots.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use super::domain::{DailyWindow, PartyRole, TimeSlot};
use super::intervals::{self, Interval};
use super::repository::{RuleStore, RuleStoreError};

/// Caller-shaped request for bookable slots.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityQuery {
    pub owner_id: String,
    pub owner_role: PartyRole,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub slot_minutes: u32,
}

/// Malformed queries and rule-store failures. An empty calendar is not an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("query range is empty: {from} is not before {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    #[error("slot duration must be a positive number of minutes")]
    InvalidSlotDuration,
    #[error(transparent)]
    Rules(#[from] RuleStoreError),
}

pub struct AvailabilityResolver<S> {
    rules: Arc<S>,
}

impl<S> AvailabilityResolver<S>
where
    S: RuleStore,
{
    pub fn new(rules: Arc<S>) -> Self {
        Self { rules }
    }

    /// Compute the sorted bookable slots for `query`, never looking into the
    /// past: a `from` behind `now` is clamped forward, and a range emptied
    /// by clamping yields an empty result rather than an error.
    pub fn free_slots(
        &self,
        query: &AvailabilityQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, AvailabilityError> {
        if query.from >= query.to {
            return Err(AvailabilityError::InvalidRange {
                from: query.from,
                to: query.to,
            });
        }
        if query.slot_minutes == 0 {
            return Err(AvailabilityError::InvalidSlotDuration);
        }

        let from = query.from.max(now);
        if from >= query.to {
            return Ok(Vec::new());
        }

        let rules =
            self.rules
                .active_rules(&query.owner_id, query.owner_role, from, query.to)?;
        let booked = intervals::merge(
            self.rules
                .booked_intervals(&query.owner_id, from, query.to)?
                .into_iter()
                .map(|interval| (interval.start, interval.end))
                .collect(),
        );

        let slot_length = Duration::minutes(i64::from(query.slot_minutes));
        let mut slots = Vec::new();

        let mut day = from.date_naive();
        let last_day = query.to.date_naive();
        while day <= last_day {
            let mut open: Vec<Interval> = Vec::new();
            let mut blocked: Vec<Interval> = Vec::new();

            for rule in rules.iter().filter(|rule| rule.applies_on(day)) {
                let window = window_on(day, rule.window);
                if rule.exclusion {
                    blocked.push(window);
                } else {
                    open.push(window);
                }
            }

            let free = intervals::subtract(intervals::merge(open), &intervals::merge(blocked));
            let free = intervals::subtract(free, &booked);

            for (start, end) in free {
                for slot in intervals::slice_slots((start, end.min(query.to)), slot_length) {
                    if slot.start >= from {
                        slots.push(slot);
                    }
                }
            }

            day += Duration::days(1);
        }

        slots.sort_by_key(|slot| slot.start);
        Ok(slots)
    }
}

/// A rule window materialized on a concrete day. No window means the whole
/// day.
fn window_on(day: NaiveDate, window: Option<DailyWindow>) -> Interval {
    match window {
        Some(window) => (
            day.and_time(window.start).and_utc(),
            day.and_time(window.end).and_utc(),
        ),
        None => (
            day.and_time(NaiveTime::MIN).and_utc(),
            (day + Duration::days(1)).and_time(NaiveTime::MIN).and_utc(),
        ),
    }
}
