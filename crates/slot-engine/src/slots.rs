//! Slot generation -- slices free intervals into fixed-duration ceremony slots.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::{normalize, AvailabilityInterval};
use crate::rules::normalize_languages;

/// Shortest ceremony the engine will plan.
pub const MIN_DURATION_MINUTES: u32 = 15;
/// Longest ceremony the engine will plan (a full working day).
pub const MAX_DURATION_MINUTES: u32 = 480;

/// A concrete bookable time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Slot {
            date,
            start_time,
            end_time,
        }
    }

    /// Whether the slot lies entirely inside `interval`.
    pub fn fits_in(&self, interval: &AvailabilityInterval) -> bool {
        self.date == interval.date
            && interval.start_time <= self.start_time
            && self.end_time <= interval.end_time
    }
}

/// Non-fatal conditions explaining why a result is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotWarning {
    /// The celebrant speaks none of the languages the ceremony type requires.
    LanguageMismatch,
    /// One or both resources are unknown or have no recurring rules.
    ResourceNotFound,
    /// The two resources' recurring schedules never coincide in the window.
    NoOverlap,
}

impl SlotWarning {
    pub fn code(self) -> &'static str {
        match self {
            SlotWarning::LanguageMismatch => "language_mismatch",
            SlotWarning::ResourceNotFound => "resource_not_found",
            SlotWarning::NoOverlap => "no_overlap",
        }
    }
}

/// Slots plus the warning, if any, that explains an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotOutcome {
    pub slots: Vec<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<SlotWarning>,
}

impl SlotOutcome {
    pub fn empty(warning: SlotWarning) -> Self {
        SlotOutcome {
            slots: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// Check a ceremony duration against the supported range.
///
/// # Errors
/// Returns `SlotError::InvalidDuration` if `duration_minutes` is outside `[15, 480]`.
pub fn validate_duration(duration_minutes: u32) -> Result<TimeDelta> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }
    Ok(TimeDelta::minutes(i64::from(duration_minutes)))
}

/// `true` unless `required` is non-empty and shares no language with `spoken`.
pub fn languages_compatible(required: &BTreeSet<String>, spoken: &BTreeSet<String>) -> bool {
    let required = normalize_languages(required);
    if required.is_empty() {
        return true;
    }
    let spoken = normalize_languages(spoken);
    !required.is_disjoint(&spoken)
}

/// Slice `intervals` into back-to-back slots of exactly `duration_minutes`.
///
/// Intervals are unioned per date first, so overlapping input never yields
/// overlapping or duplicate slots. Each merged interval is cut from its start;
/// the remainder shorter than the duration is dropped. Slots are ordered by
/// `(date, start_time)`.
///
/// # Errors
/// Returns `SlotError::InvalidDuration` before looking at the intervals if the
/// duration is out of range.
pub fn generate_slots(
    intervals: &[AvailabilityInterval],
    duration_minutes: u32,
    required_languages: &BTreeSet<String>,
    resource_languages: &BTreeSet<String>,
) -> Result<SlotOutcome> {
    let duration = validate_duration(duration_minutes)?;

    if !languages_compatible(required_languages, resource_languages) {
        tracing::debug!(
            required = ?required_languages,
            spoken = ?resource_languages,
            "no common ceremony language"
        );
        return Ok(SlotOutcome::empty(SlotWarning::LanguageMismatch));
    }

    let slots = normalize(intervals)
        .iter()
        .flat_map(|interval| slice(interval, duration))
        .collect();

    Ok(SlotOutcome {
        slots,
        warning: None,
    })
}

fn slice(interval: &AvailabilityInterval, duration: TimeDelta) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut cursor = interval.start_time;
    // `cursor + duration` never wraps past midnight: the remaining span is checked first.
    while interval.end_time - cursor >= duration {
        let end = cursor + duration;
        slots.push(Slot::new(interval.date, cursor, end));
        cursor = end;
    }
    slots
}
