use thiserror::Error;

use crate::ledger::EventId;
use crate::period::Period;

/// Rejections raised by tracker operations.
///
/// Every variant is produced before any state is touched, so a failed call
/// leaves the timer, ledger and roster exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Sequence violation: {0}")]
    SequenceViolation(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(EventId),

    #[error("No recorded start for period {0}")]
    NoPeriodStart(Period),

    #[error("Event {0} is not a goal and cannot take a goal attribution")]
    AttributionMismatch(EventId),

    #[error("No period is running and no target period was given")]
    NoActivePeriod,

    #[error("Unknown player: #{0}")]
    UnknownPlayer(u32),

    #[error("Invalid substitution: {0}")]
    InvalidSubstitution(String),

    #[error("Starting lineup is locked once the first period has started")]
    LineupLocked,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrackerError {
    pub(crate) fn sequence(msg: impl Into<String>) -> Self {
        TrackerError::SequenceViolation(msg.into())
    }
}

/// Failures of the persistence port. The tracker treats these as best-effort
/// and never lets them affect in-memory state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid slot key: {key}")]
    InvalidKey { key: String },
}

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Io(_) => true,
            StoreError::Serialization(_) => false,
            StoreError::InvalidKey { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
