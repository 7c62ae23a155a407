//! Error taxonomy for the tracker.
//!
//! Every error is recoverable: routes turn them into a transient
//! notification and the session stays interactive.

use thiserror::Error;

/// Malformed add-creature or field-edit input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Creature name is required")]
    MissingName,
    #[error("{field} must be a whole number (got {value:?})")]
    NotAnInteger { field: &'static str, value: String },
    #[error("Amount must be at least 1 (got {0})")]
    AmountTooSmall(i64),
    #[error("Amount must be at most {max} (got {got})")]
    AmountTooLarge { max: usize, got: String },
    #[error("Unknown creature field: {0}")]
    UnknownField(String),
    #[error("{0} cannot be adjusted by a delta")]
    NotNumeric(&'static str),
    #[error("Unknown direction: {0}")]
    UnknownDirection(String),
}

/// An import token that failed to parse or validate.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Import token is empty")]
    Empty,
    #[error("Import token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Import token is not valid UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Import token does not hold a creature list: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Import token repeats creature id {0}")]
    DuplicateId(u64),
}

/// The host could not write the save token to the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Clipboard write failed: {reason}")]
pub struct ClipboardError {
    pub reason: String,
}

/// Umbrella error for `Tracker` operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Could not encode the creature list: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("A roll is already in progress")]
    RollInProgress,
    #[error("No roll is pending")]
    NoRollPending,
}
