//! Date-scoped wall-clock intervals and per-date union.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A `[start_time, end_time)` range of wall-clock time on a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AvailabilityInterval {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityInterval {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        AvailabilityInterval {
            date,
            start_time,
            end_time,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    pub fn is_empty(&self) -> bool {
        self.start_time >= self.end_time
    }
}

/// Group intervals by date, keeping only `(start, end)` pairs.
pub(crate) fn group_by_date(
    intervals: &[AvailabilityInterval],
) -> BTreeMap<NaiveDate, Vec<(NaiveTime, NaiveTime)>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<(NaiveTime, NaiveTime)>> = BTreeMap::new();
    for interval in intervals.iter().filter(|i| !i.is_empty()) {
        by_date
            .entry(interval.date)
            .or_default()
            .push((interval.start_time, interval.end_time));
    }
    by_date
}

/// Sort ranges and merge the ones that overlap or touch.
pub(crate) fn merge_ranges(mut ranges: Vec<(NaiveTime, NaiveTime)>) -> Vec<(NaiveTime, NaiveTime)> {
    ranges.sort_unstable();

    let mut merged: Vec<(NaiveTime, NaiveTime)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
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

/// Union a resource's intervals per date.
///
/// Returns intervals sorted by `(date, start_time)` with no two intervals on the
/// same date overlapping or touching. Empty intervals are dropped.
pub fn normalize(intervals: &[AvailabilityInterval]) -> Vec<AvailabilityInterval> {
    group_by_date(intervals)
        .into_iter()
        .flat_map(|(date, ranges)| {
            merge_ranges(ranges)
                .into_iter()
                .map(move |(start, end)| AvailabilityInterval::new(date, start, end))
        })
        .collect()
}
