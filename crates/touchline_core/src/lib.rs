//! # touchline_core - Live Football Match Ledger
//!
//! Records what happens in an amateur or youth football match while it is
//! being played: period whistles, goals and substitutions, each stamped with
//! wall-clock time and cumulative match time.
//!
//! ## Features
//! - Period timer that survives restarts (elapsed time is recomputed from
//!   the start instant, never counted up)
//! - Append-mostly event ledger with missed-goal insertion and corrections
//! - Playing-time reconstruction from substitution history
//! - Age-group presets and power-play eligibility
//! - Deterministic plain-text export
//! - Pluggable JSON persistence

pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod minutes;
pub mod period;
pub mod power_play;
pub mod roster;
pub mod state;
pub mod store;
pub mod summary;
pub mod time;
pub mod timer;
pub mod tracker;

pub use config::{AgeGroup, AgeGroupPreset, MatchConfig, Side};
pub use error::{Result, StoreError, TrackerError};
pub use export::{render_export, ExportOptions, ExternalSection};
pub use ledger::{Direction, EventId, EventKind, EventLedger, GoalAttribution, MatchEvent, PlayerRef};
pub use minutes::PlayerStatus;
pub use period::{Period, PeriodFormat};
pub use power_play::PowerPlayStatus;
pub use roster::{LineupChange, Player, Roster};
pub use state::MatchState;
pub use store::{FileStore, MemoryStore, StateStore};
pub use summary::MatchSummary;
pub use time::{Clock, ManualClock, SystemClock, TimeOfDay};
pub use timer::{EndOutcome, MatchPhase, TickOutcome, TimerState};
pub use tracker::MatchTracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
