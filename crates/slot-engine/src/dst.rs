//! DST-aware conversion of wall-clock slots into absolute instants.
//!
//! Resources publish availability in local wall-clock time. Downstream
//! consumers (calendar exports, reminder schedulers) need UTC instants, which is
//! only ambiguous around daylight-saving transitions.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::slots::Slot;

/// Longest clock jump searched when shifting out of a gap (Samoa skipped a whole day).
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Policy for slots that start inside a DST gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop slots that start in the DST gap (e.g., 02:30 during spring forward).
    Skip,
    /// Start at the first valid instant after the gap.
    ShiftForward,
    /// Read the wall-clock time with the offset in force before the gap,
    /// so 02:30 becomes 03:30 local.
    #[default]
    WallClock,
}

/// A slot pinned to absolute time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonedSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The wall-clock slot this was derived from.
    pub local: Slot,
}

/// Parse an IANA timezone name such as `Europe/Amsterdam`.
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Convert wall-clock slots in `tz` to UTC instants.
///
/// Each slot keeps its nominal length. Times repeated by a fall-back transition
/// resolve to their earliest instant; times inside a spring-forward gap follow
/// `policy`.
pub fn localize_slots(slots: &[Slot], tz: Tz, policy: DstPolicy) -> Vec<ZonedSlot> {
    slots
        .iter()
        .filter_map(|slot| {
            let naive = slot.date.and_time(slot.start_time);
            let start = resolve_local(naive, tz, policy)?;
            Some(ZonedSlot {
                start,
                end: start + (slot.end_time - slot.start_time),
                local: *slot,
            })
        })
        .collect()
}

fn resolve_local(naive: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES)
                .map(|m| naive + TimeDelta::minutes(m))
                .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
                .map(|dt| dt.with_timezone(&Utc)),
            DstPolicy::WallClock => {
                let before = tz
                    .from_local_datetime(&(naive - TimeDelta::days(1)))
                    .earliest()?;
                before
                    .offset()
                    .fix()
                    .from_local_datetime(&naive)
                    .single()
                    .map(|dt| dt.with_timezone(&Utc))
            }
        },
    }
}
