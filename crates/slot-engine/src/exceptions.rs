//! Blocked-date resolution -- subtracts one-off exceptions from expanded intervals.
//!
//! Blocks are grouped by date and the whole block set of a date is applied
//! before moving on, so the result does not depend on the order blocks arrive in.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::interval::AvailabilityInterval;
use crate::rules::{BlockSpan, BlockedDate};

/// What the blocks of one date remove.
#[derive(Debug, Default)]
struct DayBlocks {
    all_day: bool,
    ranges: Vec<(NaiveTime, NaiveTime)>,
}

/// Remove blocked time from `intervals`.
///
/// - An all-day block removes every interval on its date.
/// - A partial block `[start, end)` removes an interval lying inside it,
///   truncates one that overlaps an edge, and splits one that spans it.
/// - Several partial blocks on one date are subtracted cumulatively.
///
/// Intervals keep their input order; applying the same blocks twice changes nothing.
pub fn apply_exceptions(
    intervals: &[AvailabilityInterval],
    blocks: &[BlockedDate],
) -> Vec<AvailabilityInterval> {
    if blocks.is_empty() {
        return intervals.to_vec();
    }

    let mut by_date: HashMap<NaiveDate, DayBlocks> = HashMap::new();
    for block in blocks {
        let day = by_date.entry(block.date()).or_default();
        match block.span() {
            BlockSpan::AllDay => day.all_day = true,
            BlockSpan::Partial { start, end } => day.ranges.push((start, end)),
        }
    }

    let mut resolved = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match by_date.get(&interval.date) {
            None => resolved.push(*interval),
            Some(day) if day.all_day => {}
            Some(day) => {
                let remaining = subtract_all(interval.start_time, interval.end_time, &day.ranges);
                resolved.extend(
                    remaining
                        .into_iter()
                        .map(|(start, end)| AvailabilityInterval::new(interval.date, start, end)),
                );
            }
        }
    }

    tracing::trace!(
        before = intervals.len(),
        after = resolved.len(),
        blocked_dates = by_date.len(),
        "applied blocked dates"
    );
    resolved
}

/// Subtract every blocked range from `[start, end)`, returning the pieces left over.
fn subtract_all(
    start: NaiveTime,
    end: NaiveTime,
    blocked: &[(NaiveTime, NaiveTime)],
) -> Vec<(NaiveTime, NaiveTime)> {
    let mut pieces = vec![(start, end)];
    for &(block_start, block_end) in blocked {
        pieces = pieces
            .into_iter()
            .flat_map(|(s, e)| subtract_one(s, e, block_start, block_end))
            .collect();
        if pieces.is_empty() {
            break;
        }
    }
    pieces
}

fn subtract_one(
    start: NaiveTime,
    end: NaiveTime,
    block_start: NaiveTime,
    block_end: NaiveTime,
) -> Vec<(NaiveTime, NaiveTime)> {
    // Adjacent ranges do not overlap.
    if block_end <= start || block_start >= end {
        return vec![(start, end)];
    }

    let mut pieces = Vec::with_capacity(2);
    if start < block_start {
        pieces.push((start, block_start));
    }
    if block_end < end {
        pieces.push((block_end, end));
    }
    pieces
}
