//! Period timer state.
//!
//! Only the start instant of the running period is stored. Elapsed time is
//! always recomputed from the wall clock, so a suspended device catches up
//! on the next reading instead of drifting.

use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::time::elapsed_seconds;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        period: Period,
        /// Unix milliseconds at kick-off of the period
        started_at_ms: i64,
    },
}

impl TimerState {
    pub fn active_period(&self) -> Option<Period> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { period, .. } => Some(*period),
        }
    }

    pub fn started_at_ms(&self) -> Option<i64> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { started_at_ms, .. } => Some(*started_at_ms),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    /// Seconds into the running period, capped at its length. Zero when idle.
    pub fn elapsed_secs(&self, now_ms: i64, period_length_secs: u32) -> u32 {
        match self {
            TimerState::Idle => 0,
            TimerState::Running { started_at_ms, .. } => {
                elapsed_seconds(*started_at_ms, now_ms).min(period_length_secs)
            }
        }
    }
}

/// Where the match is, derived from the timer and the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", content = "period", rename_all = "snake_case")]
pub enum MatchPhase {
    /// Before kick-off or between periods
    Idle,
    Running(Period),
    /// Final period over and `MatchEnd` recorded
    Complete,
}

/// What a timer tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running { period: Period, elapsed_secs: u32 },
    /// The tick hit full time for the period and closed it
    PeriodEnded { period: Period, match_complete: bool },
}

/// Result of asking for a period to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    Ended { period: Period, match_complete: bool },
    /// A `PeriodEnd` was already on record; nothing was added
    AlreadyEnded { period: Period },
}

impl EndOutcome {
    pub fn period(&self) -> Period {
        match self {
            EndOutcome::Ended { period, .. } | EndOutcome::AlreadyEnded { period } => *period,
        }
    }
}
