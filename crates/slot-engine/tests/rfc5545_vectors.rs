//! Cross-checks the expander against the `rrule` crate's RFC 5545 expansion.
//!
//! Each case states the same recurrence twice: once as a typed `Pattern`, once
//! as an RRULE string. DTSTART is always an occurrence of the rule, so both
//! interpretations must yield exactly the same dates.

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use rrule::RRuleSet;
use slot_engine::expander::expand_rule;
use slot_engine::{Pattern, RecurringRule, WeekOfMonth};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Dates produced by the `rrule` crate for `rrule` starting at `dtstart` (UTC)
/// up to and including `until`.
fn rrule_dates(rrule: &str, dtstart: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let text = format!(
        "DTSTART;TZID=UTC:{}T090000\nRRULE:{};UNTIL={}T235959Z",
        dtstart.format("%Y%m%d"),
        rrule,
        until.format("%Y%m%d"),
    );
    let set: RRuleSet = text.parse().expect("valid RRULE text");
    set.all(1000)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .collect()
}

fn engine_dates(pattern: Pattern, valid_from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let rule = RecurringRule::new(
        pattern,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        valid_from,
        None,
    )
    .unwrap();
    expand_rule(&rule, valid_from, until)
        .into_iter()
        .map(|i| i.date)
        .collect()
}

// ===========================================================================
// Weekly
// ===========================================================================

#[test]
fn weekly_tuesday_matches_rrule() {
    let (from, until) = (d("2025-01-07"), d("2025-12-31"));

    assert_eq!(
        engine_dates(Pattern::Weekly { day_of_week: Weekday::Tue }, from, until),
        rrule_dates("FREQ=WEEKLY;BYDAY=TU", from, until)
    );
}

#[test]
fn weekly_saturday_matches_rrule() {
    let (from, until) = (d("2025-01-04"), d("2025-06-30"));

    assert_eq!(
        engine_dates(Pattern::Weekly { day_of_week: Weekday::Sat }, from, until),
        rrule_dates("FREQ=WEEKLY;BYDAY=SA", from, until)
    );
}

// ===========================================================================
// Interval weeks
// ===========================================================================

#[test]
fn biweekly_matches_rrule_interval_2() {
    let (from, until) = (d("2025-01-07"), d("2025-12-31"));

    assert_eq!(
        engine_dates(
            Pattern::IntervalWeeks {
                day_of_week: Weekday::Tue,
                interval_weeks: 2
            },
            from,
            until
        ),
        rrule_dates("FREQ=WEEKLY;INTERVAL=2;BYDAY=TU", from, until)
    );
}

#[test]
fn triweekly_friday_matches_rrule_interval_3() {
    let (from, until) = (d("2025-01-03"), d("2026-06-30"));

    assert_eq!(
        engine_dates(
            Pattern::IntervalWeeks {
                day_of_week: Weekday::Fri,
                interval_weeks: 3
            },
            from,
            until
        ),
        rrule_dates("FREQ=WEEKLY;INTERVAL=3;BYDAY=FR", from, until)
    );
}

// ===========================================================================
// Monthly ordinal
// ===========================================================================

#[test]
fn second_tuesday_matches_rrule() {
    let (from, until) = (d("2025-01-14"), d("2026-12-31"));

    assert_eq!(
        engine_dates(
            Pattern::MonthlyOrdinal {
                day_of_week: Weekday::Tue,
                week_of_month: WeekOfMonth::Second
            },
            from,
            until
        ),
        rrule_dates("FREQ=MONTHLY;BYDAY=2TU", from, until)
    );
}

#[test]
fn last_friday_matches_rrule_negative_ordinal() {
    let (from, until) = (d("2025-01-31"), d("2026-12-31"));

    assert_eq!(
        engine_dates(
            Pattern::MonthlyOrdinal {
                day_of_week: Weekday::Fri,
                week_of_month: WeekOfMonth::Last
            },
            from,
            until
        ),
        rrule_dates("FREQ=MONTHLY;BYDAY=-1FR", from, until)
    );
}

#[test]
fn fourth_saturday_matches_rrule() {
    // 2025-01-25 is the 4th Saturday of January.
    let (from, until) = (d("2025-01-25"), d("2026-12-31"));

    assert_eq!(
        engine_dates(
            Pattern::MonthlyOrdinal {
                day_of_week: Weekday::Sat,
                week_of_month: WeekOfMonth::Fourth
            },
            from,
            until
        ),
        rrule_dates("FREQ=MONTHLY;BYDAY=4SA", from, until)
    );
}
