//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    /// A recurring rule, blocked date, or resource record is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid duration: {0} minutes (must be between 15 and 480)")]
    InvalidDuration(u32),

    #[error("Invalid date window: {0}")]
    InvalidWindow(String),

    /// A slot handed back for verification ends at or before its start.
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SlotError {
    /// Prefix a configuration error with the resource it was found in.
    pub(crate) fn in_resource(self, resource: &str) -> Self {
        match self {
            SlotError::Configuration(message) => {
                SlotError::Configuration(format!("resource '{}': {}", resource, message))
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
