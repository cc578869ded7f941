//! # slot-engine
//!
//! Availability intersection and slot discovery for civil-ceremony bookings.
//!
//! A ceremony needs two resources at once: a celebrant (BABS) and a venue
//! (locatie). Each publishes recurring weekly or monthly availability and
//! one-off blocked dates. The engine expands both, subtracts the blocks,
//! intersects the results, and slices the shared time into fixed-length slots,
//! checking that the celebrant speaks a language the ceremony requires.
//!
//! The engine is deterministic and read-only over its inputs: every request
//! works on a snapshot served by a [`store::ResourceSource`].
//!
//! ## Modules
//!
//! - [`rules`] — typed resources, recurring rules, and blocked dates
//! - [`store`] — persisted records, validation modes, snapshot lookup
//! - [`expander`] — recurring rules → dated intervals
//! - [`exceptions`] — blocked dates subtracted from intervals
//! - [`intersect`] — sort-and-sweep intersection of two resources
//! - [`slots`] — fixed-duration slots and the language filter
//! - [`finder`] — the end-to-end request for a celebrant/venue pair
//! - [`dst`] — wall-clock slots → UTC instants around DST transitions
//! - [`error`] — Error types

pub mod dst;
pub mod error;
pub mod exceptions;
pub mod expander;
pub mod finder;
pub mod intersect;
pub mod interval;
pub mod rules;
pub mod slots;
pub mod store;

pub use dst::{localize_slots, DstPolicy, ZonedSlot};
pub use error::SlotError;
pub use exceptions::apply_exceptions;
pub use expander::{expand, expand_resource};
pub use finder::{EngineConfig, SlotFinder, SlotQuery};
pub use interval::{normalize, AvailabilityInterval};
pub use intersect::intersect;
pub use rules::{BlockedDate, Pattern, RecurringRule, Resource, ResourceId, ResourceKind, WeekOfMonth};
pub use slots::{generate_slots, Slot, SlotOutcome, SlotWarning};
pub use store::{InMemoryStore, ResourceSource, ValidationMode};
