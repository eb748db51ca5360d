//! Match state snapshot
//!
//! `MatchState` is everything that describes one match apart from the
//! roster: configuration, timer and ledger. It is what gets written to the
//! `match_state` slot and restored on start-up.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MatchConfig;
use crate::ledger::EventLedger;
use crate::period::Period;
use crate::timer::{MatchPhase, TimerState};

pub const STATE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchState {
    /// Snapshot format version for migration
    pub version: u32,

    /// Fresh for every match, including after a reset
    pub match_id: Uuid,

    pub config: MatchConfig,

    #[serde(default)]
    pub timer: TimerState,

    #[serde(default)]
    pub ledger: EventLedger,
}

impl MatchState {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            version: STATE_VERSION,
            match_id: Uuid::new_v4(),
            config,
            timer: TimerState::Idle,
            ledger: EventLedger::new(),
        }
    }

    /// Clears the timer and ledger for a new match with the same setup.
    pub fn reset(&mut self) {
        self.match_id = Uuid::new_v4();
        self.timer = TimerState::Idle;
        self.ledger.clear();
    }

    pub fn phase(&self) -> MatchPhase {
        match self.timer {
            TimerState::Running { period, .. } => MatchPhase::Running(period),
            TimerState::Idle if self.ledger.has_match_end() => MatchPhase::Complete,
            TimerState::Idle => MatchPhase::Idle,
        }
    }

    /// First period of the format with neither a start nor an end on
    /// record, if any.
    pub fn next_period(&self) -> Option<Period> {
        if self.ledger.has_match_end() {
            return None;
        }
        let played = |p: Period| {
            self.ledger.period_start(p).is_some() || self.ledger.period_end(p).is_some()
        };
        let last_played = self
            .config
            .format
            .periods()
            .iter()
            .rposition(|p| played(*p));
        let from = last_played.map_or(0, |i| i + 1);
        self.config.format.periods().get(from).copied()
    }

    /// Checks the snapshot version on load.
    ///
    /// Version 1 is the only snapshot layout so far, so nothing is
    /// transformed; a missing or zero version is stamped as current.
    pub(crate) fn migrate(mut self) -> Self {
        if self.version > STATE_VERSION {
            tracing::warn!(
                found = self.version,
                supported = STATE_VERSION,
                "match state was written by a newer version; loading anyway"
            );
        } else if self.version < STATE_VERSION {
            tracing::debug!(found = self.version, "stamping match state with current version");
            self.version = STATE_VERSION;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgeGroup;
    use crate::ledger::EventKind;
    use crate::time::TimeOfDay;

    fn u11() -> MatchState {
        MatchState::new(MatchConfig::for_age_group(AgeGroup::U11, "Home", "Away").unwrap())
    }

    #[test]
    fn test_next_period_walks_the_format() {
        let mut state = u11();
        assert_eq!(state.next_period(), Some(Period::H1));

        let start = state
            .ledger
            .draft(TimeOfDay::from_hms(10, 0, 0), 0, Period::H1, EventKind::PeriodStart);
        state.ledger.push(start);
        assert_eq!(state.next_period(), Some(Period::H2));
    }

    #[test]
    fn test_next_period_skips_periods_with_only_an_end() {
        let mut state = u11();
        let end = state
            .ledger
            .draft(TimeOfDay::from_hms(10, 30, 0), 1800, Period::H1, EventKind::PeriodEnd);
        state.ledger.push(end);
        assert_eq!(state.next_period(), Some(Period::H2));
    }

    #[test]
    fn test_reset_issues_new_match_id() {
        let mut state = u11();
        let before = state.match_id;
        let start = state
            .ledger
            .draft(TimeOfDay::from_hms(10, 0, 0), 0, Period::H1, EventKind::PeriodStart);
        state.ledger.push(start);
        state.reset();
        assert_ne!(state.match_id, before);
        assert!(state.ledger.is_empty());
        assert_eq!(state.phase(), MatchPhase::Idle);
        assert_eq!(state.config.home_team, "Home");
    }

    #[test]
    fn test_migrate_old_and_future_versions() {
        let mut old = u11();
        old.version = 0;
        assert_eq!(old.migrate().version, STATE_VERSION);

        let mut future = u11();
        future.version = 999;
        assert_eq!(future.migrate().version, 999);
    }
}
