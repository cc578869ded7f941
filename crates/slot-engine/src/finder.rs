//! Slot finding for a celebrant/venue pair.
//!
//! Runs the whole pipeline for one request against a read-only snapshot:
//! expand each resource's rules, clip to its validity window, subtract its
//! blocked dates, intersect the two, and cut the result into ceremony slots.
//! Missing data and language conflicts come back as warnings on an empty
//! result; only bad caller parameters are errors.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::exceptions::apply_exceptions;
use crate::expander::expand_resource;
use crate::interval::{normalize, AvailabilityInterval};
use crate::intersect::intersect;
use crate::rules::{Resource, ResourceId, ResourceKind};
use crate::slots::{
    generate_slots, languages_compatible, validate_duration, Slot, SlotOutcome, SlotWarning,
};
use crate::store::{ResourceSource, ValidationMode};

/// Widest date window a single request may span, in days (inclusive of both ends).
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 366;

/// Engine-wide knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_window_days: u32,
    /// How snapshot loaders built from this config treat malformed rows.
    pub validation: ValidationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            validation: ValidationMode::Strict,
        }
    }
}

/// One slot-finding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotQuery {
    pub babs: ResourceId,
    pub locatie: ResourceId,
    /// First date searched (inclusive).
    pub window_start: NaiveDate,
    /// Last date searched (inclusive).
    pub window_end: NaiveDate,
    pub duration_minutes: u32,
    /// Languages the ceremony type requires; empty means no requirement.
    #[serde(default)]
    pub required_languages: BTreeSet<String>,
}

/// Finds ceremony slots over any [`ResourceSource`].
#[derive(Debug, Clone)]
pub struct SlotFinder<S> {
    source: S,
    config: EngineConfig,
}

impl<S: ResourceSource> SlotFinder<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: S, config: EngineConfig) -> Self {
        SlotFinder { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check an inclusive date window against ordering and the configured cap.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidWindow` if `end < start` or the window spans
    /// more than `max_window_days` days.
    pub fn validate_window(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end < start {
            return Err(SlotError::InvalidWindow(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        let span_days = (end - start).num_days() + 1;
        if span_days > i64::from(self.config.max_window_days) {
            return Err(SlotError::InvalidWindow(format!(
                "{} days requested, at most {} allowed",
                span_days, self.config.max_window_days
            )));
        }
        Ok(())
    }

    /// Find every slot where both the celebrant and the venue are free.
    ///
    /// Warnings, in order of precedence:
    /// - `resource_not_found`: either ID is unknown, names the wrong kind of
    ///   resource, or has no recurring rules.
    /// - `language_mismatch`: the celebrant speaks none of the required languages.
    /// - `no_overlap`: the two recurring schedules never coincide in the window.
    ///
    /// An empty list caused only by blocked dates carries no warning, and neither
    /// does one where every shared interval is shorter than the duration: the
    /// schedules do meet, just not for long enough.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDuration` or `SlotError::InvalidWindow` before
    /// any data is loaded.
    #[tracing::instrument(skip_all, fields(babs = %query.babs, locatie = %query.locatie))]
    pub fn find_slots(&self, query: &SlotQuery) -> Result<SlotOutcome> {
        validate_duration(query.duration_minutes)?;
        self.validate_window(query.window_start, query.window_end)?;

        let (Some(babs), Some(locatie)) = (
            self.load(&query.babs, ResourceKind::Babs),
            self.load(&query.locatie, ResourceKind::Locatie),
        ) else {
            return Ok(SlotOutcome::empty(SlotWarning::ResourceNotFound));
        };

        if !languages_compatible(&query.required_languages, &babs.spoken_languages) {
            tracing::debug!(required = ?query.required_languages, "celebrant language mismatch");
            return Ok(SlotOutcome::empty(SlotWarning::LanguageMismatch));
        }

        let babs_scheduled = expand_resource(&babs, query.window_start, query.window_end);
        let locatie_scheduled = expand_resource(&locatie, query.window_start, query.window_end);

        let babs_free = apply_exceptions(&babs_scheduled, &babs.blocked_dates);
        let locatie_free = apply_exceptions(&locatie_scheduled, &locatie.blocked_dates);

        let shared = intersect(&babs_free, &locatie_free);
        if shared.is_empty() {
            let warning = intersect(&babs_scheduled, &locatie_scheduled)
                .is_empty()
                .then_some(SlotWarning::NoOverlap);
            tracing::debug!(warning = ?warning, "no shared availability");
            return Ok(SlotOutcome {
                slots: Vec::new(),
                warning,
            });
        }

        let outcome = generate_slots(
            &shared,
            query.duration_minutes,
            &query.required_languages,
            &babs.spoken_languages,
        )?;
        tracing::info!(
            shared_intervals = shared.len(),
            slots = outcome.slots.len(),
            "slot search complete"
        );
        Ok(outcome)
    }

    /// A resource's free time in the window: expanded, clipped, blocks removed, merged.
    ///
    /// Returns `Ok(None)` when the resource is unknown.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidWindow` for a bad window.
    pub fn resolved_availability(
        &self,
        id: &ResourceId,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Option<Vec<AvailabilityInterval>>> {
        self.validate_window(window_start, window_end)?;
        Ok(self
            .source
            .resource(id)
            .map(|resource| resolve(&resource, window_start, window_end)))
    }

    /// Re-check one previously offered slot against the current snapshot.
    ///
    /// Used right before a reservation is persisted, since a search result can
    /// go stale between query and booking.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidSlot` if the slot ends at or before its start
    /// (slots never cross midnight), and `SlotError::InvalidDuration` if its
    /// length is out of range.
    #[tracing::instrument(skip_all, fields(babs = %babs, locatie = %locatie, date = %slot.date))]
    pub fn verify_slot(&self, babs: &ResourceId, locatie: &ResourceId, slot: &Slot) -> Result<bool> {
        if slot.end_time <= slot.start_time {
            return Err(SlotError::InvalidSlot(format!(
                "{} on {} ends at {}, not after its start",
                slot.start_time, slot.date, slot.end_time
            )));
        }
        let minutes = (slot.end_time - slot.start_time).num_minutes();
        validate_duration(u32::try_from(minutes).unwrap_or(u32::MAX))?;

        let (Some(babs), Some(locatie)) = (
            self.load(babs, ResourceKind::Babs),
            self.load(locatie, ResourceKind::Locatie),
        ) else {
            return Ok(false);
        };

        let shared = intersect(
            &resolve(&babs, slot.date, slot.date),
            &resolve(&locatie, slot.date, slot.date),
        );
        let available = shared.iter().any(|interval| slot.fits_in(interval));
        tracing::debug!(available, start = %slot.start_time, "verified slot");
        Ok(available)
    }

    fn load(&self, id: &ResourceId, kind: ResourceKind) -> Option<Resource> {
        let resource = self.source.resource(id);
        match resource {
            None => {
                tracing::debug!(resource = %id, "resource not found");
                None
            }
            Some(r) if r.kind != kind => {
                tracing::warn!(resource = %id, expected = ?kind, found = ?r.kind, "resource has the wrong kind");
                None
            }
            Some(r) if r.rules.is_empty() => {
                tracing::debug!(resource = %id, "resource has no recurring rules");
                None
            }
            Some(r) => Some(r),
        }
    }
}

fn resolve(resource: &Resource, window_start: NaiveDate, window_end: NaiveDate) -> Vec<AvailabilityInterval> {
    let scheduled = expand_resource(resource, window_start, window_end);
    normalize(&apply_exceptions(&scheduled, &resource.blocked_dates))
}
