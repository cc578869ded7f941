//! Typed availability model: resources, recurring rules, and blocked dates.
//!
//! Every value in this module is validated when it is built. A `RecurringRule`
//! or `BlockedDate` that exists is well-formed, so the expansion and resolution
//! stages never have to re-check ordering of times or validity dates.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Opaque identifier of a celebrant or venue, as assigned by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId(id)
    }
}

/// The two kinds of resource a ceremony needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Civil celebrant (buitengewoon ambtenaar van de burgerlijke stand).
    Babs,
    /// Ceremony venue.
    Locatie,
}

/// Which occurrence of a weekday within its month a monthly rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    /// The last occurrence, whether that is the 4th or the 5th.
    Last,
}

impl WeekOfMonth {
    /// Map the persisted ordinal (1–5, 5 = last) to a `WeekOfMonth`.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(WeekOfMonth::First),
            2 => Some(WeekOfMonth::Second),
            3 => Some(WeekOfMonth::Third),
            4 => Some(WeekOfMonth::Fourth),
            5 => Some(WeekOfMonth::Last),
            _ => None,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            WeekOfMonth::First => 1,
            WeekOfMonth::Second => 2,
            WeekOfMonth::Third => 3,
            WeekOfMonth::Fourth => 4,
            WeekOfMonth::Last => 5,
        }
    }

    /// Whether `date` is this occurrence of its own weekday within its month.
    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            WeekOfMonth::Last => date
                .checked_add_days(Days::new(7))
                .is_none_or(|next| next.month() != date.month()),
            nth => (date.day0() / 7 + 1) == u32::from(nth.ordinal()),
        }
    }
}

/// Convert the persisted day-of-week convention (0 = Sunday … 6 = Saturday).
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// The date pattern of a recurring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Every week on `day_of_week`.
    Weekly { day_of_week: Weekday },
    /// The Nth `day_of_week` of every month ("2nd Tuesday", "last Friday").
    MonthlyOrdinal {
        day_of_week: Weekday,
        week_of_month: WeekOfMonth,
    },
    /// Every `interval_weeks` weeks on `day_of_week`, phased from the rule's `valid_from`.
    IntervalWeeks {
        day_of_week: Weekday,
        interval_weeks: u32,
    },
}

impl Pattern {
    pub fn day_of_week(&self) -> Weekday {
        match *self {
            Pattern::Weekly { day_of_week }
            | Pattern::MonthlyOrdinal { day_of_week, .. }
            | Pattern::IntervalWeeks { day_of_week, .. } => day_of_week,
        }
    }

    /// Whether `date` is generated by this pattern for a rule starting at `anchor`.
    pub fn matches(&self, date: NaiveDate, anchor: NaiveDate) -> bool {
        if date.weekday() != self.day_of_week() {
            return false;
        }
        match *self {
            Pattern::Weekly { .. } => true,
            Pattern::MonthlyOrdinal { week_of_month, .. } => week_of_month.contains(date),
            Pattern::IntervalWeeks { interval_weeks, .. } => {
                let days = (date - anchor).num_days();
                days >= 0 && (days / 7) % i64::from(interval_weeks) == 0
            }
        }
    }
}

/// A recurring availability pattern with a wall-clock time range and a validity span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringRule {
    pattern: Pattern,
    start_time: NaiveTime,
    end_time: NaiveTime,
    valid_from: NaiveDate,
    valid_until: Option<NaiveDate>,
}

impl RecurringRule {
    /// Build a rule, rejecting inverted time ranges and validity spans.
    ///
    /// # Errors
    /// Returns `SlotError::Configuration` if `start_time >= end_time`, if
    /// `valid_until < valid_from`, or if an interval pattern has `interval_weeks == 0`.
    pub fn new(
        pattern: Pattern,
        start_time: NaiveTime,
        end_time: NaiveTime,
        valid_from: NaiveDate,
        valid_until: Option<NaiveDate>,
    ) -> Result<Self> {
        if start_time >= end_time {
            return Err(SlotError::Configuration(format!(
                "start_time {} must be before end_time {}",
                start_time, end_time
            )));
        }
        if let Some(until) = valid_until {
            if until < valid_from {
                return Err(SlotError::Configuration(format!(
                    "valid_until {} precedes valid_from {}",
                    until, valid_from
                )));
            }
        }
        if let Pattern::IntervalWeeks { interval_weeks: 0, .. } = pattern {
            return Err(SlotError::Configuration(
                "interval_weeks must be at least 1".to_string(),
            ));
        }
        Ok(RecurringRule {
            pattern,
            start_time,
            end_time,
            valid_from,
            valid_until,
        })
    }

    /// Shorthand for an open-ended weekly rule.
    pub fn weekly(
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        valid_from: NaiveDate,
    ) -> Result<Self> {
        Self::new(
            Pattern::Weekly { day_of_week },
            start_time,
            end_time,
            valid_from,
            None,
        )
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.valid_until
    }
}

/// The part of a day a blocked date removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSpan {
    AllDay,
    Partial { start: NaiveTime, end: NaiveTime },
}

/// A one-off exception removing availability on a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedDate {
    date: NaiveDate,
    span: BlockSpan,
    reason: String,
}

impl BlockedDate {
    pub fn all_day(date: NaiveDate, reason: impl Into<String>) -> Self {
        BlockedDate {
            date,
            span: BlockSpan::AllDay,
            reason: reason.into(),
        }
    }

    /// Build a partial-day block.
    ///
    /// # Errors
    /// Returns `SlotError::Configuration` if `start >= end`.
    pub fn partial(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        reason: impl Into<String>,
    ) -> Result<Self> {
        if start >= end {
            return Err(SlotError::Configuration(format!(
                "blocked range {}-{} on {} is empty or inverted",
                start, end, date
            )));
        }
        Ok(BlockedDate {
            date,
            span: BlockSpan::Partial { start, end },
            reason: reason.into(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn span(&self) -> BlockSpan {
        self.span
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A celebrant or venue together with everything that defines its availability.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    /// First date the resource can be booked at all (inclusive).
    pub available_from: Option<NaiveDate>,
    /// Last date the resource can be booked at all (inclusive).
    pub available_until: Option<NaiveDate>,
    /// Lower-cased language codes; empty for venues.
    pub spoken_languages: BTreeSet<String>,
    pub rules: Vec<RecurringRule>,
    pub blocked_dates: Vec<BlockedDate>,
}

impl Resource {
    pub fn new(id: impl Into<ResourceId>, kind: ResourceKind) -> Self {
        Resource {
            id: id.into(),
            kind,
            available_from: None,
            available_until: None,
            spoken_languages: BTreeSet::new(),
            rules: Vec::new(),
            blocked_dates: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: RecurringRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_block(mut self, block: BlockedDate) -> Self {
        self.blocked_dates.push(block);
        self
    }

    pub fn with_languages<I, L>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        self.spoken_languages = normalize_languages(languages);
        self
    }

    /// Restrict the resource to an inclusive validity window.
    ///
    /// # Errors
    /// Returns `SlotError::Configuration` if `until < from`.
    pub fn with_validity(mut self, from: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        if let (Some(from), Some(until)) = (from, until) {
            if until < from {
                return Err(SlotError::Configuration(format!(
                    "available_until {} precedes available_from {}",
                    until, from
                ))
                .in_resource(self.id.as_str()));
            }
        }
        self.available_from = from;
        self.available_until = until;
        Ok(self)
    }

    /// Whether `date` falls inside the resource's overall validity window.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.available_from.is_none_or(|from| date >= from)
            && self.available_until.is_none_or(|until| date <= until)
    }
}

/// Trim and lower-case language codes so "NL " and "nl" compare equal.
pub fn normalize_languages<I, L>(languages: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    languages
        .into_iter()
        .map(|l| l.as_ref().trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}
