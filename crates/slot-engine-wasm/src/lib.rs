//! WASM bindings for slot-engine.
//!
//! Exposes slot search, per-resource availability, and slot re-verification to
//! the JavaScript booking front end via `wasm-bindgen`. The availability
//! snapshot and all complex arguments cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slot_engine::store::parse_time;
use slot_engine::{
    AvailabilityInterval, EngineConfig, InMemoryStore, ResourceId, Slot, SlotFinder, SlotQuery,
    SlotWarning, ValidationMode,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotDto {
    date: String,
    start_time: String,
    end_time: String,
}

impl From<&Slot> for SlotDto {
    fn from(s: &Slot) -> Self {
        Self {
            date: s.date.to_string(),
            start_time: s.start_time.format("%H:%M").to_string(),
            end_time: s.end_time.format("%H:%M").to_string(),
        }
    }
}

impl From<&AvailabilityInterval> for SlotDto {
    fn from(i: &AvailabilityInterval) -> Self {
        Self {
            date: i.date.to_string(),
            start_time: i.start_time.format("%H:%M").to_string(),
            end_time: i.end_time.format("%H:%M").to_string(),
        }
    }
}

#[derive(Serialize)]
struct FindSlotsDto {
    slots: Vec<SlotDto>,
    /// `language_mismatch`, `resource_not_found`, `no_overlap`, or null.
    warning: Option<&'static str>,
}

/// A slot as sent back from JavaScript; times may be `HH:MM` or `HH:MM:SS`.
#[derive(Deserialize)]
struct SlotInput {
    date: String,
    start_time: String,
    end_time: String,
}

impl SlotInput {
    fn to_slot(&self) -> Result<Slot, String> {
        Ok(Slot::new(
            parse_date(&self.date)?,
            parse_time(&self.start_time).map_err(|e| e.to_string())?,
            parse_time(&self.end_time).map_err(|e| e.to_string())?,
        ))
    }
}

/// Optional engine settings passed from JavaScript.
#[derive(Deserialize, Default)]
#[serde(default)]
struct OptionsInput {
    max_window_days: Option<u32>,
    best_effort: bool,
}

impl OptionsInput {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(days) = self.max_window_days {
            config.max_window_days = days;
        }
        if self.best_effort {
            config.validation = ValidationMode::BestEffort;
        }
        config
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_options(json: Option<&str>) -> Result<EngineConfig, String> {
    let options: OptionsInput = match json {
        Some(s) if !s.trim().is_empty() => {
            serde_json::from_str(s).map_err(|e| format!("Invalid options JSON: {}", e))?
        }
        _ => OptionsInput::default(),
    };
    Ok(options.engine_config())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    s.parse()
        .map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn load_finder(store_json: &str, config: EngineConfig) -> Result<SlotFinder<InMemoryStore>, String> {
    let store = InMemoryStore::from_json(store_json, config.validation).map_err(|e| e.to_string())?;
    Ok(SlotFinder::with_config(store, config))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// JSON entry points (callable natively; errors are plain strings)
// ---------------------------------------------------------------------------

/// Slot search over a snapshot; see [`find_slots`] for the JSON shapes.
///
/// `options_json` may set `max_window_days` and `best_effort`; `None` or a
/// blank string keeps the defaults.
pub fn find_slots_json(
    store_json: &str,
    query_json: &str,
    options_json: Option<&str>,
) -> Result<String, String> {
    let finder = load_finder(store_json, parse_options(options_json)?)?;
    let query: SlotQuery =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;

    let outcome = finder.find_slots(&query).map_err(|e| e.to_string())?;

    to_json(&FindSlotsDto {
        slots: outcome.slots.iter().map(SlotDto::from).collect(),
        warning: outcome.warning.map(SlotWarning::code),
    })
}

pub fn resolved_availability_json(
    store_json: &str,
    resource_id: &str,
    window_start: &str,
    window_end: &str,
) -> Result<String, String> {
    let finder = load_finder(store_json, EngineConfig::default())?;
    let intervals = finder
        .resolved_availability(
            &ResourceId::from(resource_id),
            parse_date(window_start)?,
            parse_date(window_end)?,
        )
        .map_err(|e| e.to_string())?;

    let dtos: Option<Vec<SlotDto>> =
        intervals.map(|list| list.iter().map(SlotDto::from).collect());
    to_json(&dtos)
}

pub fn verify_slot_json(
    store_json: &str,
    babs: &str,
    locatie: &str,
    slot_json: &str,
) -> Result<bool, String> {
    let finder = load_finder(store_json, EngineConfig::default())?;
    let input: SlotInput =
        serde_json::from_str(slot_json).map_err(|e| format!("Invalid slot JSON: {}", e))?;
    let slot = input.to_slot()?;

    finder
        .verify_slot(&ResourceId::from(babs), &ResourceId::from(locatie), &slot)
        .map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// Find slots where both the celebrant and the venue are free.
///
/// `store_json` is a snapshot `{"resources": [...]}`; `query_json` is
/// `{babs, locatie, window_start, window_end, duration_minutes, required_languages?}`.
/// Returns `{slots: [{date, start_time, end_time}], warning}`.
#[wasm_bindgen(js_name = "findSlots")]
pub fn find_slots(
    store_json: &str,
    query_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    find_slots_json(store_json, query_json, options_json.as_deref()).map_err(js_err)
}

/// A single resource's free time between two dates, after blocked dates.
///
/// Returns a JSON array of `{date, start_time, end_time}`, or `null` when the
/// resource is unknown.
#[wasm_bindgen(js_name = "resolvedAvailability")]
pub fn resolved_availability(
    store_json: &str,
    resource_id: &str,
    window_start: &str,
    window_end: &str,
) -> Result<String, JsValue> {
    resolved_availability_json(store_json, resource_id, window_start, window_end).map_err(js_err)
}

/// Re-check a previously offered slot (`{date, start_time, end_time}` JSON).
#[wasm_bindgen(js_name = "verifySlot")]
pub fn verify_slot(
    store_json: &str,
    babs: &str,
    locatie: &str,
    slot_json: &str,
) -> Result<bool, JsValue> {
    verify_slot_json(store_json, babs, locatie, slot_json).map_err(js_err)
}
