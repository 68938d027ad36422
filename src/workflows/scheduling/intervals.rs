//! Half-open `[start, end)` interval set operations over UTC instants.
//!
//! The resolver composes these three primitives: union availability
//! windows, subtract exclusions and bookings, slice what remains into
//! fixed-length slots. Intervals that only touch at a boundary neither
//! overlap nor block each other.

use chrono::{DateTime, Duration, Utc};

use super::domain::TimeSlot;

pub(crate) type Interval = (DateTime<Utc>, DateTime<Utc>);

/// Sort and coalesce overlapping or adjacent intervals, discarding
/// degenerate ones.
pub(crate) fn merge(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|(start, end)| start < end);
    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Remove `cuts` from `base`. Both inputs must already be merged and
/// sorted; the result stays sorted. A cut ending exactly where a base
/// interval starts removes nothing from it.
pub(crate) fn subtract(base: Vec<Interval>, cuts: &[Interval]) -> Vec<Interval> {
    let mut remaining = Vec::with_capacity(base.len());

    for (start, end) in base {
        let mut cursor = start;
        for &(cut_start, cut_end) in cuts {
            if cut_end <= cursor {
                continue;
            }
            if cut_start >= end {
                break;
            }
            if cut_start > cursor {
                remaining.push((cursor, cut_start.min(end)));
            }
            cursor = cursor.max(cut_end);
            if cursor >= end {
                break;
            }
        }
        if cursor < end {
            remaining.push((cursor, end));
        }
    }

    remaining
}

/// Slice one free interval into back-to-back slots of exactly
/// `slot_length`, starting at the interval's own start. A trailing
/// remainder shorter than `slot_length` is discarded.
pub(crate) fn slice_slots(interval: Interval, slot_length: Duration) -> Vec<TimeSlot> {
    let (start, end) = interval;
    let mut slots = Vec::new();
    let mut cursor = start;

    while cursor + slot_length <= end {
        slots.push(TimeSlot::new(cursor, cursor + slot_length));
        cursor += slot_length;
    }

    slots
}
