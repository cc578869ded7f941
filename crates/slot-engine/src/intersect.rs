//! Dual-resource intersection -- the time both resources are free.
//!
//! Each side is first unioned per date (sort + merge), then the two sorted,
//! disjoint lists of a shared date are swept with two cursors. That keeps the
//! cost at O(n log n + m log m) even when a multi-month window expands into
//! many short rule-generated intervals.

use chrono::NaiveTime;

use crate::interval::{group_by_date, merge_ranges, AvailabilityInterval};

/// Intervals during which both `a` and `b` are available.
///
/// Only intervals on the same date can overlap. Output is sorted by
/// `(date, start_time)` and non-overlapping; adjacent intervals (one ending exactly
/// when the other starts) share no time and produce nothing.
pub fn intersect(
    a: &[AvailabilityInterval],
    b: &[AvailabilityInterval],
) -> Vec<AvailabilityInterval> {
    let a_by_date = group_by_date(a);
    let mut b_by_date = group_by_date(b);

    let mut result = Vec::new();
    for (date, a_ranges) in a_by_date {
        let Some(b_ranges) = b_by_date.remove(&date) else {
            continue;
        };
        let overlaps = sweep(&merge_ranges(a_ranges), &merge_ranges(b_ranges));
        result.extend(
            overlaps
                .into_iter()
                .map(|(start, end)| AvailabilityInterval::new(date, start, end)),
        );
    }

    tracing::trace!(
        a = a.len(),
        b = b.len(),
        overlaps = result.len(),
        "intersected availability"
    );
    result
}

/// Two-cursor sweep over sorted, disjoint range lists.
fn sweep(
    a: &[(NaiveTime, NaiveTime)],
    b: &[(NaiveTime, NaiveTime)],
) -> Vec<(NaiveTime, NaiveTime)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (a_start, a_end) = a[i];
        let (b_start, b_end) = b[j];

        let start = a_start.max(b_start);
        let end = a_end.min(b_end);
        if start < end {
            out.push((start, end));
        }

        // Advance whichever range finishes first; it cannot overlap anything later.
        if a_end <= b_end {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}
