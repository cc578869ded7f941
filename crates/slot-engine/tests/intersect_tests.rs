//! Tests for dual-resource intersection.

use chrono::{NaiveDate, NaiveTime};
use slot_engine::{intersect, normalize, AvailabilityInterval};

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn iv(date: &str, start: (u32, u32), end: (u32, u32)) -> AvailabilityInterval {
    AvailabilityInterval::new(d(date), t(start.0, start.1), t(end.0, end.1))
}

#[test]
fn overlap_is_max_start_to_min_end() {
    let babs = vec![iv("2025-03-04", (9, 0), (17, 0))];
    let venue = vec![iv("2025-03-04", (10, 0), (16, 0))];

    assert_eq!(
        intersect(&babs, &venue),
        vec![iv("2025-03-04", (10, 0), (16, 0))]
    );
}

#[test]
fn partial_overlap() {
    let a = vec![iv("2025-03-04", (9, 0), (12, 0))];
    let b = vec![iv("2025-03-04", (11, 0), (15, 0))];

    assert_eq!(intersect(&a, &b), vec![iv("2025-03-04", (11, 0), (12, 0))]);
}

#[test]
fn different_dates_never_intersect() {
    let a = vec![iv("2025-03-04", (9, 0), (17, 0))];
    let b = vec![iv("2025-03-03", (9, 0), (17, 0))];

    assert!(intersect(&a, &b).is_empty());
}

#[test]
fn adjacent_intervals_share_no_time() {
    let a = vec![iv("2025-03-04", (9, 0), (12, 0))];
    let b = vec![iv("2025-03-04", (12, 0), (15, 0))];

    assert!(intersect(&a, &b).is_empty());
}

#[test]
fn one_interval_against_many() {
    let a = vec![
        iv("2025-03-04", (9, 0), (12, 0)),
        iv("2025-03-04", (13, 0), (17, 0)),
    ];
    let b = vec![iv("2025-03-04", (10, 0), (14, 0))];

    assert_eq!(
        intersect(&a, &b),
        vec![
            iv("2025-03-04", (10, 0), (12, 0)),
            iv("2025-03-04", (13, 0), (14, 0)),
        ]
    );
}

#[test]
fn overlapping_input_on_one_side_is_unioned_first() {
    // Two rules of the same resource overlap; the result must not repeat 10:00-12:00.
    let a = vec![
        iv("2025-03-04", (9, 0), (12, 0)),
        iv("2025-03-04", (10, 0), (13, 0)),
    ];
    let b = vec![iv("2025-03-04", (8, 0), (18, 0))];

    assert_eq!(intersect(&a, &b), vec![iv("2025-03-04", (9, 0), (13, 0))]);
}

#[test]
fn unsorted_multi_date_input() {
    let a = vec![
        iv("2025-03-11", (9, 0), (17, 0)),
        iv("2025-03-04", (9, 0), (17, 0)),
        iv("2025-03-18", (9, 0), (17, 0)),
    ];
    let b = vec![
        iv("2025-03-18", (15, 0), (19, 0)),
        iv("2025-03-04", (10, 0), (11, 0)),
        iv("2025-03-04", (14, 0), (16, 0)),
    ];

    assert_eq!(
        intersect(&a, &b),
        vec![
            iv("2025-03-04", (10, 0), (11, 0)),
            iv("2025-03-04", (14, 0), (16, 0)),
            iv("2025-03-18", (15, 0), (17, 0)),
        ]
    );
}

#[test]
fn interleaved_ranges_sweep_correctly() {
    let a = vec![
        iv("2025-03-04", (8, 0), (9, 0)),
        iv("2025-03-04", (10, 0), (11, 0)),
        iv("2025-03-04", (12, 0), (13, 0)),
    ];
    let b = vec![
        iv("2025-03-04", (8, 30), (10, 30)),
        iv("2025-03-04", (10, 45), (12, 15)),
    ];

    assert_eq!(
        intersect(&a, &b),
        vec![
            iv("2025-03-04", (8, 30), (9, 0)),
            iv("2025-03-04", (10, 0), (10, 30)),
            iv("2025-03-04", (10, 45), (11, 0)),
            iv("2025-03-04", (12, 0), (12, 15)),
        ]
    );
}

#[test]
fn intersection_is_commutative() {
    let a = vec![
        iv("2025-03-04", (9, 0), (12, 0)),
        iv("2025-03-04", (13, 0), (17, 0)),
        iv("2025-03-05", (9, 0), (10, 0)),
    ];
    let b = vec![
        iv("2025-03-04", (11, 0), (14, 0)),
        iv("2025-03-05", (9, 30), (11, 0)),
    ];

    assert_eq!(intersect(&a, &b), intersect(&b, &a));
}

#[test]
fn empty_side_gives_empty_result() {
    let a = vec![iv("2025-03-04", (9, 0), (17, 0))];
    assert!(intersect(&a, &[]).is_empty());
    assert!(intersect(&[], &a).is_empty());
}

#[test]
fn normalize_merges_touching_intervals_per_date() {
    let intervals = vec![
        iv("2025-03-05", (9, 0), (10, 0)),
        iv("2025-03-04", (12, 0), (13, 0)),
        iv("2025-03-04", (9, 0), (12, 0)),
        iv("2025-03-04", (9, 30), (10, 0)),
    ];

    assert_eq!(
        normalize(&intervals),
        vec![
            iv("2025-03-04", (9, 0), (13, 0)),
            iv("2025-03-05", (9, 0), (10, 0)),
        ]
    );
}
