//! Recurrence expansion -- converts recurring rules into concrete dated intervals.
//!
//! Every pattern is anchored on a weekday, so candidate dates are found by
//! stepping week by week from the first matching weekday in the effective range
//! and keeping the ones the pattern accepts.

use chrono::{Datelike, Days, NaiveDate};

use crate::interval::AvailabilityInterval;
use crate::rules::{RecurringRule, Resource};

/// Expand rules into one interval per matching date inside `[window_start, window_end]`.
///
/// Each rule only contributes dates inside its own `[valid_from, valid_until]`
/// range. Rules may produce overlapping or duplicate intervals on the same date;
/// they are returned as-is (sorted by date, then time) and unioned downstream.
pub fn expand(
    rules: &[RecurringRule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<AvailabilityInterval> {
    let mut intervals: Vec<AvailabilityInterval> = rules
        .iter()
        .flat_map(|rule| expand_rule(rule, window_start, window_end))
        .collect();
    intervals.sort_unstable();
    intervals
}

/// Expand a single rule within the window.
pub fn expand_rule(
    rule: &RecurringRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<AvailabilityInterval> {
    let lo = window_start.max(rule.valid_from());
    let hi = rule
        .valid_until()
        .map_or(window_end, |until| until.min(window_end));
    if lo > hi {
        return Vec::new();
    }

    let Some(first) = first_weekday_on_or_after(lo, rule.pattern().day_of_week()) else {
        return Vec::new();
    };

    first
        .iter_weeks()
        .take_while(|date| *date <= hi)
        .filter(|date| rule.pattern().matches(*date, rule.valid_from()))
        .map(|date| AvailabilityInterval::new(date, rule.start_time(), rule.end_time()))
        .collect()
}

/// Expand a resource's rules, clipped to its overall validity window.
pub fn expand_resource(
    resource: &Resource,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<AvailabilityInterval> {
    let lo = resource
        .available_from
        .map_or(window_start, |from| from.max(window_start));
    let hi = resource
        .available_until
        .map_or(window_end, |until| until.min(window_end));
    if lo > hi {
        tracing::debug!(resource = %resource.id, "validity window does not meet query window");
        return Vec::new();
    }

    let intervals = expand(&resource.rules, lo, hi);
    tracing::debug!(
        resource = %resource.id,
        rules = resource.rules.len(),
        intervals = intervals.len(),
        "expanded recurring rules"
    );
    intervals
}

fn first_weekday_on_or_after(date: NaiveDate, weekday: chrono::Weekday) -> Option<NaiveDate> {
    let offset = (7 + weekday.num_days_from_monday() - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(offset)))
}
