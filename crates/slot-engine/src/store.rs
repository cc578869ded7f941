//! Availability rule store -- persisted records, validation, and snapshot lookup.
//!
//! The persistence layer hands rows over in a loosely typed shape (a `rule_type`
//! string plus optional fields). They are converted to the typed model exactly
//! once, here, so malformed data surfaces at load time rather than deep inside
//! expansion.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::rules::{
    normalize_languages, weekday_from_index, BlockedDate, Pattern, RecurringRule, Resource,
    ResourceId, ResourceKind, WeekOfMonth,
};

/// How to treat malformed rules and blocked dates while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Abort the load on the first malformed row.
    #[default]
    Strict,
    /// Skip malformed rows with a warning and keep the rest.
    BestEffort,
}

/// A recurring rule as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// `weekly`, `monthly_ordinal`, or `interval_weeks`.
    pub rule_type: String,
    /// 0 = Sunday … 6 = Saturday.
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// 1–5, 5 = last. Only for `monthly_ordinal`.
    #[serde(default)]
    pub week_of_month: Option<u8>,
    /// Only for `interval_weeks`.
    #[serde(default)]
    pub interval_weeks: Option<u32>,
    pub start_time: String,
    pub end_time: String,
    pub valid_from: NaiveDate,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

/// A blocked date as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub blocked_date: NaiveDate,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: String,
}

/// A resource with its rules and blocked dates as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: ResourceId,
    pub kind: ResourceKind,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub available_until: Option<NaiveDate>,
    #[serde(default)]
    pub spoken_languages: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
    #[serde(default)]
    pub blocked_dates: Vec<BlockRecord>,
}

/// The top-level JSON document accepted by [`InMemoryStore::from_json`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub resources: Vec<ResourceRecord>,
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| SlotError::Configuration(format!("invalid time '{}': {}", s, e)))
}

impl TryFrom<&RuleRecord> for RecurringRule {
    type Error = SlotError;

    fn try_from(record: &RuleRecord) -> Result<Self> {
        let day_of_week = record
            .day_of_week
            .ok_or_else(|| missing(&record.rule_type, "day_of_week"))?;
        let day_of_week = weekday_from_index(day_of_week).ok_or_else(|| {
            SlotError::Configuration(format!("day_of_week {} is not in 0..=6", day_of_week))
        })?;

        let pattern = match record.rule_type.as_str() {
            "weekly" => Pattern::Weekly { day_of_week },
            "monthly_ordinal" => {
                let ordinal = record
                    .week_of_month
                    .ok_or_else(|| missing(&record.rule_type, "week_of_month"))?;
                let week_of_month = WeekOfMonth::from_ordinal(ordinal).ok_or_else(|| {
                    SlotError::Configuration(format!("week_of_month {} is not in 1..=5", ordinal))
                })?;
                Pattern::MonthlyOrdinal {
                    day_of_week,
                    week_of_month,
                }
            }
            "interval_weeks" => Pattern::IntervalWeeks {
                day_of_week,
                interval_weeks: record
                    .interval_weeks
                    .ok_or_else(|| missing(&record.rule_type, "interval_weeks"))?,
            },
            other => {
                return Err(SlotError::Configuration(format!(
                    "unknown rule_type '{}'",
                    other
                )))
            }
        };

        RecurringRule::new(
            pattern,
            parse_time(&record.start_time)?,
            parse_time(&record.end_time)?,
            record.valid_from,
            record.valid_until,
        )
    }
}

impl TryFrom<&BlockRecord> for BlockedDate {
    type Error = SlotError;

    fn try_from(record: &BlockRecord) -> Result<Self> {
        if record.all_day {
            return Ok(BlockedDate::all_day(record.blocked_date, record.reason.clone()));
        }
        match (&record.start_time, &record.end_time) {
            (Some(start), Some(end)) => BlockedDate::partial(
                record.blocked_date,
                parse_time(start)?,
                parse_time(end)?,
                record.reason.clone(),
            ),
            _ => Err(SlotError::Configuration(format!(
                "blocked date {} is not all-day but lacks start_time/end_time",
                record.blocked_date
            ))),
        }
    }
}

fn missing(rule_type: &str, field: &str) -> SlotError {
    SlotError::Configuration(format!("{} rule is missing {}", rule_type, field))
}

impl ResourceRecord {
    /// Convert to the typed model.
    ///
    /// # Errors
    /// In `Strict` mode, the first malformed rule or blocked date fails the
    /// conversion with `SlotError::Configuration`. In `BestEffort` mode such rows
    /// are skipped. An inverted validity window fails in both modes.
    pub fn into_resource(self, mode: ValidationMode) -> Result<Resource> {
        let id = self.id.clone();
        let rules = convert_all(&id, "rule", &self.rules, mode)?;
        let blocked_dates = convert_all(&id, "blocked date", &self.blocked_dates, mode)?;

        let mut resource = Resource::new(self.id, self.kind)
            .with_validity(self.available_from, self.available_until)?;
        resource.spoken_languages = normalize_languages(&self.spoken_languages);
        resource.rules = rules;
        resource.blocked_dates = blocked_dates;
        Ok(resource)
    }
}

fn convert_all<'a, R, T>(
    id: &ResourceId,
    what: &str,
    records: &'a [R],
    mode: ValidationMode,
) -> Result<Vec<T>>
where
    T: TryFrom<&'a R, Error = SlotError>,
{
    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match T::try_from(record) {
            Ok(value) => out.push(value),
            Err(e) => {
                let e = match e {
                    SlotError::Configuration(message) => {
                        SlotError::Configuration(format!("{} #{}: {}", what, index, message))
                    }
                    other => other,
                }
                .in_resource(id.as_str());
                if mode == ValidationMode::Strict {
                    return Err(e);
                }
                tracing::warn!(resource = %id, index, error = %e, "skipping malformed {}", what);
            }
        }
    }
    Ok(out)
}

/// Anything that can serve a consistent snapshot of one resource.
///
/// The persistence layer implements this; the engine never writes through it.
pub trait ResourceSource {
    /// Snapshot of `id`, or `None` if the resource is unknown.
    fn resource(&self, id: &ResourceId) -> Option<Resource>;
}

/// A `HashMap`-backed store, loaded once and read many times.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    resources: HashMap<ResourceId, Resource>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a resource.
    pub fn insert(&mut self, resource: Resource) {
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Build a store from persisted records.
    ///
    /// # Errors
    /// See [`ResourceRecord::into_resource`].
    pub fn from_records(records: Vec<ResourceRecord>, mode: ValidationMode) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record.into_resource(mode)?);
        }
        tracing::debug!(resources = store.len(), ?mode, "loaded availability snapshot");
        Ok(store)
    }

    /// Parse a [`Snapshot`] JSON document.
    ///
    /// # Errors
    /// Returns `SlotError::Json` if the document does not parse, or a
    /// configuration error as described in [`ResourceRecord::into_resource`].
    pub fn from_json(json: &str, mode: ValidationMode) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_records(snapshot.resources, mode)
    }
}

impl ResourceSource for InMemoryStore {
    fn resource(&self, id: &ResourceId) -> Option<Resource> {
        self.resources.get(id).cloned()
    }
}

impl<S: ResourceSource + ?Sized> ResourceSource for &S {
    fn resource(&self, id: &ResourceId) -> Option<Resource> {
        (**self).resource(id)
    }
}
