//! Tests for slot generation and the language filter.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use slot_engine::slots::{languages_compatible, validate_duration};
use slot_engine::{generate_slots, AvailabilityInterval, Slot, SlotError, SlotWarning};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn iv(date: &str, start: (u32, u32), end: (u32, u32)) -> AvailabilityInterval {
    AvailabilityInterval::new(d(date), t(start.0, start.1), t(end.0, end.1))
}

fn langs(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn starts(slots: &[Slot]) -> Vec<(NaiveDate, NaiveTime)> {
    slots.iter().map(|s| (s.date, s.start_time)).collect()
}

#[test]
fn six_hour_interval_gives_six_hourly_slots() {
    let intervals = vec![iv("2025-03-04", (10, 0), (16, 0))];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&["nl"])).unwrap();

    assert_eq!(outcome.warning, None);
    assert_eq!(outcome.slots.len(), 6);
    for (slot, hour) in outcome.slots.iter().zip(10..16) {
        assert_eq!(slot.start_time, t(hour, 0));
        assert_eq!(slot.end_time, t(hour + 1, 0));
    }
}

#[test]
fn remainder_shorter_than_duration_is_dropped() {
    let intervals = vec![iv("2025-03-04", (10, 0), (11, 45))];

    let outcome = generate_slots(&intervals, 30, &langs(&[]), &langs(&[])).unwrap();

    assert_eq!(
        starts(&outcome.slots),
        vec![
            (d("2025-03-04"), t(10, 0)),
            (d("2025-03-04"), t(10, 30)),
            (d("2025-03-04"), t(11, 0)),
        ]
    );
    assert!(outcome.slots.iter().all(|s| s.end_time <= t(11, 45)));
}

#[test]
fn interval_shorter_than_duration_gives_nothing() {
    let intervals = vec![iv("2025-03-04", (10, 0), (10, 45))];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&[])).unwrap();

    assert!(outcome.slots.is_empty());
    assert_eq!(outcome.warning, None);
}

#[test]
fn slots_never_cross_an_interval_gap() {
    let intervals = vec![
        iv("2025-03-04", (10, 0), (11, 30)),
        iv("2025-03-04", (12, 0), (13, 0)),
    ];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&[])).unwrap();

    assert_eq!(
        starts(&outcome.slots),
        vec![(d("2025-03-04"), t(10, 0)), (d("2025-03-04"), t(12, 0))]
    );
}

#[test]
fn overlapping_intervals_are_merged_before_slicing() {
    let intervals = vec![
        iv("2025-03-04", (10, 0), (12, 0)),
        iv("2025-03-04", (11, 0), (13, 0)),
    ];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&[])).unwrap();

    assert_eq!(
        starts(&outcome.slots),
        vec![
            (d("2025-03-04"), t(10, 0)),
            (d("2025-03-04"), t(11, 0)),
            (d("2025-03-04"), t(12, 0)),
        ]
    );
}

#[test]
fn output_is_ordered_by_date_and_time() {
    let intervals = vec![
        iv("2025-03-11", (10, 0), (11, 0)),
        iv("2025-03-04", (14, 0), (15, 0)),
        iv("2025-03-04", (10, 0), (11, 0)),
    ];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&[])).unwrap();

    assert_eq!(
        starts(&outcome.slots),
        vec![
            (d("2025-03-04"), t(10, 0)),
            (d("2025-03-04"), t(14, 0)),
            (d("2025-03-11"), t(10, 0)),
        ]
    );
}

#[test]
fn slot_ending_at_last_minute_of_day() {
    let intervals = vec![AvailabilityInterval::new(
        d("2025-03-04"),
        t(22, 0),
        NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
    )];

    let outcome = generate_slots(&intervals, 60, &langs(&[]), &langs(&[])).unwrap();

    assert_eq!(starts(&outcome.slots), vec![(d("2025-03-04"), t(22, 0))]);
}

// ── Duration bounds ─────────────────────────────────────────────────────────

#[test]
fn duration_bounds_are_inclusive() {
    assert!(validate_duration(15).is_ok());
    assert!(validate_duration(480).is_ok());
}

#[test]
fn duration_out_of_range_is_rejected_before_any_work() {
    let intervals = vec![iv("2025-03-04", (10, 0), (16, 0))];

    for bad in [0, 14, 481, 500] {
        let err = generate_slots(&intervals, bad, &langs(&["en"]), &langs(&["nl"])).unwrap_err();
        assert!(
            matches!(err, SlotError::InvalidDuration(m) if m == bad),
            "duration {} should be rejected",
            bad
        );
    }
}

// ── Language filter ─────────────────────────────────────────────────────────

#[test]
fn disjoint_languages_return_empty_with_warning() {
    let intervals = vec![iv("2025-03-04", (10, 0), (16, 0))];

    let outcome = generate_slots(&intervals, 60, &langs(&["en"]), &langs(&["nl"])).unwrap();

    assert!(outcome.slots.is_empty());
    assert_eq!(outcome.warning, Some(SlotWarning::LanguageMismatch));
}

#[test]
fn one_shared_language_is_enough() {
    let intervals = vec![iv("2025-03-04", (10, 0), (11, 0))];

    let outcome =
        generate_slots(&intervals, 60, &langs(&["en", "de"]), &langs(&["nl", "de"])).unwrap();

    assert_eq!(outcome.slots.len(), 1);
    assert_eq!(outcome.warning, None);
}

#[test]
fn language_codes_compare_case_insensitively() {
    assert!(languages_compatible(&langs(&["EN"]), &langs(&[" en "])));
}

#[test]
fn no_requirement_accepts_any_celebrant() {
    assert!(languages_compatible(&langs(&[]), &langs(&[])));
    assert!(languages_compatible(&langs(&[]), &langs(&["nl"])));
}

#[test]
fn requirement_against_no_spoken_languages_is_a_mismatch() {
    assert!(!languages_compatible(&langs(&["nl"]), &langs(&[])));
}

#[test]
fn warning_codes_match_wire_format() {
    assert_eq!(SlotWarning::LanguageMismatch.code(), "language_mismatch");
    assert_eq!(SlotWarning::ResourceNotFound.code(), "resource_not_found");
    assert_eq!(SlotWarning::NoOverlap.code(), "no_overlap");
    assert_eq!(
        serde_json::to_string(&SlotWarning::NoOverlap).unwrap(),
        "\"no_overlap\""
    );
}
