//! `slots` CLI — find, inspect, and re-check ceremony slots from a JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Slots where babs-1 and venue-1 are both free, one hour each
//! slots find -s snapshot.json --babs babs-1 --locatie venue-1 \
//!     --from 2025-03-01 --to 2025-03-31 --duration 60
//!
//! # Require an English-speaking celebrant and add UTC instants
//! slots find -s snapshot.json --babs babs-1 --locatie venue-1 \
//!     --from 2025-03-01 --to 2025-03-31 --duration 60 \
//!     --language en --timezone Europe/Amsterdam
//!
//! # Free time of a single resource after blocked dates
//! cat snapshot.json | slots expand --resource venue-1 --from 2025-03-01 --to 2025-03-07
//!
//! # Re-check a chosen slot before booking it
//! slots verify -s snapshot.json --babs babs-1 --locatie venue-1 \
//!     --date 2025-03-04 --start 10:00 --duration 60
//! ```

mod settings;

use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, TimeDelta};
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::dst::parse_timezone;
use slot_engine::store::parse_time;
use slot_engine::{
    localize_slots, DstPolicy, InMemoryStore, ResourceId, Slot, SlotFinder, SlotQuery, SlotWarning,
    ValidationMode, ZonedSlot,
};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Ceremony slot finder for a celebrant (BABS) and a venue (locatie)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML); defaults to ./slots.toml when present
    #[arg(long, global = true)]
    config: Option<String>,

    /// Skip malformed rules and blocked dates instead of failing
    #[arg(long, global = true)]
    best_effort: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find slots where both resources are free
    Find {
        /// Snapshot JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        store: Option<String>,
        #[arg(long)]
        babs: String,
        #[arg(long)]
        locatie: String,
        /// First date searched (inclusive)
        #[arg(long)]
        from: NaiveDate,
        /// Last date searched (inclusive)
        #[arg(long)]
        to: NaiveDate,
        /// Ceremony length in minutes (15-480)
        #[arg(short, long)]
        duration: u32,
        /// Language the ceremony requires (repeatable)
        #[arg(short, long = "language")]
        languages: Vec<String>,
        /// IANA timezone; adds UTC instants to the output
        #[arg(long)]
        timezone: Option<String>,
        /// skip, shift-forward, or wall-clock
        #[arg(long, value_parser = parse_dst_policy)]
        dst_policy: Option<DstPolicy>,
    },
    /// Show a resource's free time after blocked dates
    Expand {
        /// Snapshot JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        store: Option<String>,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Re-check a single slot against the snapshot
    Verify {
        /// Snapshot JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        store: Option<String>,
        #[arg(long)]
        babs: String,
        #[arg(long)]
        locatie: String,
        #[arg(long)]
        date: NaiveDate,
        /// Start time, HH:MM
        #[arg(long)]
        start: String,
        #[arg(short, long)]
        duration: u32,
    },
}

#[derive(Serialize)]
struct FindOutput {
    slots: Vec<Slot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<SlotWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zoned: Option<Vec<ZonedSlot>>,
}

#[derive(Serialize)]
struct VerifyOutput {
    available: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.best_effort {
        settings.engine.validation = ValidationMode::BestEffort;
    }
    init_tracing(&settings.logging.level);
    tracing::debug!(settings = ?settings, "settings loaded");

    match cli.command {
        Commands::Find {
            store,
            babs,
            locatie,
            from,
            to,
            duration,
            languages,
            timezone,
            dst_policy,
        } => {
            let store = load_store(store.as_deref(), &settings)?;
            let finder = SlotFinder::with_config(&store, settings.engine);
            let query = SlotQuery {
                babs: ResourceId::new(babs),
                locatie: ResourceId::new(locatie),
                window_start: from,
                window_end: to,
                duration_minutes: duration,
                required_languages: languages.into_iter().collect(),
            };
            let outcome = finder.find_slots(&query).context("Slot search failed")?;

            if let Some(warning) = outcome.warning {
                eprintln!("warning: {}", warning.code());
            }

            let zoned = match timezone.or(settings.output.timezone) {
                Some(name) => {
                    let tz = parse_timezone(&name)?;
                    let policy = dst_policy.unwrap_or(settings.output.dst_policy);
                    Some(localize_slots(&outcome.slots, tz, policy))
                }
                None => None,
            };

            print_json(&FindOutput {
                slots: outcome.slots,
                warning: outcome.warning,
                zoned,
            })?;
        }
        Commands::Expand {
            store,
            resource,
            from,
            to,
        } => {
            let store = load_store(store.as_deref(), &settings)?;
            let finder = SlotFinder::with_config(&store, settings.engine);
            let intervals = finder
                .resolved_availability(&ResourceId::new(resource.clone()), from, to)?
                .with_context(|| format!("Unknown resource: {}", resource))?;
            print_json(&intervals)?;
        }
        Commands::Verify {
            store,
            babs,
            locatie,
            date,
            start,
            duration,
        } => {
            let store = load_store(store.as_deref(), &settings)?;
            let finder = SlotFinder::with_config(&store, settings.engine);
            let start = parse_time(&start)?;
            let (end, wrapped) =
                start.overflowing_add_signed(TimeDelta::minutes(i64::from(duration)));
            if wrapped != 0 {
                bail!(
                    "Slot starting at {} for {} minutes runs past midnight",
                    start.format("%H:%M"),
                    duration
                );
            }
            let slot = Slot::new(date, start, end);
            let available =
                finder.verify_slot(&ResourceId::new(babs), &ResourceId::new(locatie), &slot)?;
            print_json(&VerifyOutput { available })?;
        }
    }

    Ok(())
}

/// Accept the policy names as typed on a command line or in settings.
fn parse_dst_policy(s: &str) -> std::result::Result<DstPolicy, String> {
    match s.to_ascii_lowercase().replace('_', "-").as_str() {
        "skip" => Ok(DstPolicy::Skip),
        "shift-forward" => Ok(DstPolicy::ShiftForward),
        "wall-clock" => Ok(DstPolicy::WallClock),
        other => Err(format!(
            "unknown DST policy '{}' (expected skip, shift-forward, or wall-clock)",
            other
        )),
    }
}

/// Log to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn load_store(path: Option<&str>, settings: &Settings) -> Result<InMemoryStore> {
    let json = read_input(path)?;
    InMemoryStore::from_json(&json, settings.engine.validation).context("Failed to load snapshot")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    println!("{}", pretty);
    Ok(())
}
