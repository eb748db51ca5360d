//! Live match tracker
//!
//! `MatchTracker` is the period state machine plus every recording action an
//! observer can take during play. Each action validates first and only then
//! touches the timer, ledger or roster, so a rejected call leaves no trace.
//! After every accepted change both snapshots are handed to the store, if
//! one is attached; a failed write is logged and otherwise ignored.

use crate::config::{MatchConfig, Side};
use crate::error::{Result, TrackerError};
use crate::export::{render_export, ExportOptions, ExternalSection};
use crate::ledger::{Direction, EventId, EventKind, EventLedger, GoalAttribution, MatchEvent};
use crate::period::Period;
use crate::power_play::PowerPlayStatus;
use crate::roster::{LineupChange, Roster};
use crate::state::MatchState;
use crate::store::{
    load_match_state, load_roster, save_match_state, save_roster, StateStore,
};
use crate::summary::{as_of_secs, MatchSummary};
use crate::time::{
    cumulative_display, period_end_secs, previous_periods_offset_secs, Clock, SystemClock,
};
use crate::timer::{EndOutcome, MatchPhase, TickOutcome, TimerState};

pub struct MatchTracker<C: Clock = SystemClock> {
    clock: C,
    state: MatchState,
    roster: Roster,
    store: Option<Box<dyn StateStore>>,
}

impl<C: Clock> MatchTracker<C> {
    /// A fresh match with a default squad for the age group.
    pub fn new(config: MatchConfig, clock: C) -> Self {
        let roster = Roster::with_squad(config.squad_size);
        Self::with_roster(config, roster, clock)
    }

    pub fn with_roster(config: MatchConfig, roster: Roster, clock: C) -> Self {
        Self {
            clock,
            state: MatchState::new(config),
            roster,
            store: None,
        }
    }

    /// Restores both slots from `store`, falling back to `fallback` for a
    /// missing or unreadable match slot and to a default squad for a missing
    /// roster. The store stays attached.
    pub fn restore(store: Box<dyn StateStore>, fallback: MatchConfig, clock: C) -> Self {
        let state = match load_match_state(store.as_ref()) {
            Ok(Some(state)) => match state.config.validate() {
                Ok(()) => state,
                Err(e) => {
                    tracing::warn!(error = %e, "saved match config is invalid; starting fresh");
                    MatchState::new(fallback)
                }
            },
            Ok(None) => MatchState::new(fallback),
            Err(e) => {
                tracing::warn!(error = %e, "could not read match state; starting fresh");
                MatchState::new(fallback)
            }
        };
        let roster = match load_roster(store.as_ref()) {
            Ok(Some(roster)) => roster,
            Ok(None) => Roster::with_squad(state.config.squad_size),
            Err(e) => {
                tracing::warn!(error = %e, "could not read roster; using default squad");
                Roster::with_squad(state.config.squad_size)
            }
        };
        tracing::info!(
            match_id = %state.match_id,
            events = state.ledger.len(),
            players = roster.len(),
            "match restored"
        );
        Self {
            clock,
            state,
            roster,
            store: Some(store),
        }
    }

    /// Attaches a store and writes the current state to it.
    pub fn attach_store(&mut self, store: Box<dyn StateStore>) {
        self.store = Some(store);
        self.persist();
    }

    // ========================
    // Accessors
    // ========================

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.state.config
    }

    pub fn ledger(&self) -> &EventLedger {
        &self.state.ledger
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn timer(&self) -> TimerState {
        self.state.timer
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase()
    }

    pub fn next_period(&self) -> Option<Period> {
        self.state.next_period()
    }

    fn period_length(&self) -> u32 {
        self.state.config.period_length_secs
    }

    /// Seconds into the running period, capped at its length.
    pub fn elapsed_secs(&self) -> u32 {
        self.state
            .timer
            .elapsed_secs(self.clock.now_ms(), self.period_length())
    }

    /// Running clock text such as `"25:42"`, or `None` between periods.
    pub fn clock_display(&self) -> Option<String> {
        self.state
            .timer
            .active_period()
            .map(|p| cumulative_display(p, self.elapsed_secs(), self.period_length()))
    }

    /// Match time now: the live clock during a period, otherwise the most
    /// recent whistle.
    pub fn current_cumulative_secs(&self) -> u32 {
        match self.state.timer.active_period() {
            Some(period) => {
                previous_periods_offset_secs(period, self.period_length())
                    .saturating_add(self.elapsed_secs())
            }
            None => self
                .state
                .ledger
                .last_period_end()
                .map(|e| e.cumulative_secs)
                .unwrap_or(0),
        }
    }

    /// Period a between-period action belongs to.
    fn current_or_last_period(&self) -> Period {
        self.state
            .timer
            .active_period()
            .or_else(|| self.state.ledger.last_period_end().map(|e| e.period))
            .unwrap_or_else(|| self.state.config.format.first())
    }

    // ========================
    // Period state machine
    // ========================

    pub fn start_period(&mut self, period: Period) -> Result<EventId> {
        if let TimerState::Running { period: active, .. } = self.state.timer {
            return Err(TrackerError::sequence(format!(
                "{} is still running",
                active
            )));
        }
        let next = self
            .state
            .next_period()
            .ok_or_else(|| TrackerError::sequence("the match is complete"))?;
        if period != next {
            return Err(TrackerError::sequence(format!(
                "next period is {}, not {}",
                next, period
            )));
        }

        let offset = previous_periods_offset_secs(period, self.period_length());
        let event = self.state.ledger.draft(
            self.clock.time_of_day(),
            offset,
            period,
            EventKind::PeriodStart,
        );
        let id = self.state.ledger.push(event);
        self.state.timer = TimerState::Running {
            period,
            started_at_ms: self.clock.now_ms(),
        };

        tracing::info!(%period, "period started");
        self.persist();
        Ok(id)
    }

    pub fn start_next_period(&mut self) -> Result<(Period, EventId)> {
        let period = self
            .state
            .next_period()
            .ok_or_else(|| TrackerError::sequence("the match is complete"))?;
        let id = self.start_period(period)?;
        Ok((period, id))
    }

    /// Re-reads the wall clock and closes the running period once its full
    /// length has elapsed.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(period) = self.state.timer.active_period() else {
            return TickOutcome::Idle;
        };
        let elapsed = self.elapsed_secs();
        if elapsed < self.period_length() {
            return TickOutcome::Running {
                period,
                elapsed_secs: elapsed,
            };
        }

        tracing::debug!(%period, elapsed, "period length reached");
        match self.end_period(Some(period)) {
            Ok(EndOutcome::Ended {
                period,
                match_complete,
            }) => TickOutcome::PeriodEnded {
                period,
                match_complete,
            },
            Ok(EndOutcome::AlreadyEnded { .. }) => TickOutcome::Idle,
            Err(e) => {
                // Never leave the timer running on a period that cannot end
                tracing::warn!(%period, error = %e, "could not close period; stopping timer");
                self.state.timer = TimerState::Idle;
                self.persist();
                TickOutcome::Idle
            }
        }
    }

    /// Ends `period`, or the running period when `None`.
    ///
    /// Asking again for a period that already has a `PeriodEnd` changes
    /// nothing, which is what lets the tick and a manual "end period" race
    /// safely.
    pub fn end_period(&mut self, period: Option<Period>) -> Result<EndOutcome> {
        let period = match period.or_else(|| self.state.timer.active_period()) {
            Some(p) => p,
            None => {
                return match self.state.ledger.last_period_end() {
                    Some(end) => Ok(EndOutcome::AlreadyEnded { period: end.period }),
                    None => Err(TrackerError::sequence("no period is running")),
                };
            }
        };
        if !self.state.config.format.contains(period) {
            return Err(TrackerError::sequence(format!(
                "{} is not part of this match format",
                period
            )));
        }

        if self.state.ledger.period_end(period).is_some() {
            if self.state.timer.active_period() == Some(period) {
                self.state.timer = TimerState::Idle;
                self.persist();
            }
            tracing::debug!(%period, "period already ended");
            return Ok(EndOutcome::AlreadyEnded { period });
        }
        // A running timer proves the period started even if its marker was removed
        let running = self.state.timer.active_period() == Some(period);
        if !running && self.state.ledger.period_start(period).is_none() {
            return Err(TrackerError::sequence(format!("{} has not started", period)));
        }

        let now = self.clock.time_of_day();
        let end_secs = period_end_secs(period, self.period_length());
        let end = self
            .state
            .ledger
            .draft(now, end_secs, period, EventKind::PeriodEnd);
        self.state.ledger.push(end);

        if self.state.timer.active_period() == Some(period) {
            self.state.timer = TimerState::Idle;
        }

        let match_complete = self.state.config.format.is_final(period);
        if match_complete && !self.state.ledger.has_match_end() {
            let full_time = self
                .state
                .ledger
                .draft(now, end_secs, period, EventKind::MatchEnd);
            self.state.ledger.push(full_time);
        }

        tracing::info!(%period, match_complete, "period ended");
        self.persist();
        Ok(EndOutcome::Ended {
            period,
            match_complete,
        })
    }

    // ========================
    // Recording
    // ========================

    /// Records a goal in the running period, or in `target` if given.
    ///
    /// A goal for a period that has already ended is a missed goal: it is
    /// filed just ahead of that period's end and stamped at the close of the
    /// period.
    pub fn record_goal(
        &mut self,
        team: Side,
        scorer: Option<u32>,
        is_penalty: bool,
        target: Option<Period>,
    ) -> Result<EventId> {
        let period = target
            .or_else(|| self.state.timer.active_period())
            .ok_or(TrackerError::NoActivePeriod)?;
        if !self.state.config.format.contains(period) {
            return Err(TrackerError::sequence(format!(
                "{} is not part of this match format",
                period
            )));
        }
        let scorer = scorer.map(|n| self.roster.player_ref(n)).transpose()?;
        let kind = EventKind::Goal {
            team,
            scorer,
            is_penalty,
        };

        let id = if self.state.ledger.period_end(period).is_some() {
            let event = self
                .state
                .ledger
                .draft(self.clock.time_of_day(), 0, period, kind);
            let id = event.id;
            let length = self.period_length();
            let index = self
                .state
                .ledger
                .insert_before_period_end(period, event, length)
                .map_err(|_| TrackerError::sequence(format!("{} has no recorded end", period)))?;
            tracing::debug!(%period, index, "missed goal filed before period end");
            id
        } else if self.state.timer.active_period() == Some(period) {
            let cumulative = self.current_cumulative_secs();
            let event = self
                .state
                .ledger
                .draft(self.clock.time_of_day(), cumulative, period, kind);
            self.state.ledger.push(event)
        } else {
            return Err(TrackerError::sequence(format!("{} is not in play", period)));
        };

        tracing::debug!(?team, %period, "goal recorded");
        self.persist();
        Ok(id)
    }

    /// Swaps one player off for one on. Both events share one match time.
    pub fn record_substitution(&mut self, off: u32, on: u32) -> Result<Vec<EventId>> {
        if off == on {
            return Err(TrackerError::InvalidSubstitution(format!(
                "#{} cannot replace themselves",
                off
            )));
        }
        self.apply_lineup_changes(&[LineupChange::off(off), LineupChange::on(on)])
    }

    /// Moves any number of players between pitch and bench at once, e.g. an
    /// extra player on for a power play.
    pub fn apply_lineup_changes(&mut self, changes: &[LineupChange]) -> Result<Vec<EventId>> {
        let planned = self.roster.plan_changes(changes)?;

        let cumulative = self.current_cumulative_secs();
        let period = self.current_or_last_period();
        let stamp = self.clock.time_of_day();

        self.roster.apply_changes(changes);
        let mut ids = Vec::with_capacity(planned.len());
        for (player, direction) in planned {
            tracing::debug!(number = player.number, ?direction, cumulative, "substitution");
            let event = self.state.ledger.draft(
                stamp,
                cumulative,
                period,
                EventKind::Substitution { player, direction },
            );
            ids.push(self.state.ledger.push(event));
        }

        self.persist();
        Ok(ids)
    }

    // ========================
    // Roster management
    // ========================

    /// Picks the starting lineup. Only allowed before kick-off.
    pub fn set_starting_lineup(&mut self, numbers: &[u32]) -> Result<()> {
        if self.state.ledger.has_kicked_off() {
            return Err(TrackerError::LineupLocked);
        }
        self.roster.set_starting(numbers)?;
        self.persist();
        Ok(())
    }

    /// Adds a player; after kick-off they join the bench. The shirt number
    /// is above every number the roster or the ledger has used, so a new
    /// player never inherits a removed player's events.
    pub fn add_player(&mut self, name: impl Into<String>) -> u32 {
        let on_bench = self.state.ledger.has_kicked_off();
        let floor = self.state.ledger.highest_player_number().unwrap_or(0);
        let number = self.roster.add_player_above(floor, name, on_bench);
        self.persist();
        number
    }

    pub fn rename_player(&mut self, number: u32, name: impl Into<String>) -> Result<()> {
        self.roster.rename(number, name)?;
        self.persist();
        Ok(())
    }

    pub fn remove_player(&mut self, number: u32) -> Result<()> {
        self.roster.remove_player(number)?;
        self.persist();
        Ok(())
    }

    /// Changes a shirt number. Only allowed before kick-off, and never for a
    /// number an event already refers to.
    pub fn renumber_player(&mut self, number: u32, new_number: u32) -> Result<()> {
        if self.state.ledger.has_kicked_off() {
            return Err(TrackerError::LineupLocked);
        }
        if let Some(used) = [number, new_number]
            .into_iter()
            .find(|n| self.state.ledger.mentions_player(*n))
        {
            return Err(TrackerError::InvalidConfig(format!(
                "shirt number {} is already on record",
                used
            )));
        }
        self.roster.renumber(number, new_number)?;
        self.persist();
        Ok(())
    }

    // ========================
    // Corrections
    // ========================

    pub fn correct_event(
        &mut self,
        id: EventId,
        cumulative_secs: u32,
        attribution: Option<GoalAttribution>,
    ) -> Result<()> {
        let length = self.period_length();
        self.state
            .ledger
            .correct(id, cumulative_secs, attribution, length)?;
        tracing::debug!(%id, cumulative_secs, "event corrected");
        self.persist();
        Ok(())
    }

    /// Builds a goal attribution from a shirt number on the roster.
    pub fn goal_attribution(
        &self,
        team: Side,
        scorer: Option<u32>,
        is_penalty: bool,
    ) -> Result<GoalAttribution> {
        let scorer = scorer.map(|n| self.roster.player_ref(n)).transpose()?;
        Ok(GoalAttribution {
            team,
            scorer,
            is_penalty,
        })
    }

    pub fn remove_event(&mut self, id: EventId) -> Result<MatchEvent> {
        let removed = self.state.ledger.remove(id)?;
        tracing::debug!(%id, "event removed");
        self.persist();
        Ok(removed)
    }

    /// Clears the timer and ledger. Configuration and players stay.
    pub fn reset(&mut self) {
        self.state.reset();
        tracing::info!(match_id = %self.state.match_id, "match reset");
        self.persist();
    }

    // ========================
    // Read side
    // ========================

    pub fn summary(&self) -> MatchSummary {
        let live = self
            .state
            .timer
            .is_running()
            .then(|| self.current_cumulative_secs());
        MatchSummary::build(
            &self.state.config,
            &self.state.ledger,
            &self.roster,
            as_of_secs(&self.state.ledger, live),
        )
    }

    pub fn power_play(&self) -> PowerPlayStatus {
        PowerPlayStatus::evaluate(
            &self.state.config,
            self.state.ledger.goal_count(Side::Home),
            self.state.ledger.goal_count(Side::Away),
        )
    }

    pub fn export_text(&self, options: ExportOptions, sections: &[ExternalSection]) -> String {
        render_export(
            &self.summary(),
            &self.state.ledger,
            &self.state.config,
            options,
            sections,
        )
    }

    /// Substitution events for one player, for display.
    pub fn substitution_history(&self, number: u32) -> Vec<(u32, Direction)> {
        self.state.ledger.substitutions_for(number)
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = save_match_state(store.as_mut(), &self.state) {
            tracing::warn!(error = %e, recoverable = e.is_recoverable(), "match state not saved");
        }
        if let Err(e) = save_roster(store.as_mut(), &self.roster) {
            tracing::warn!(error = %e, recoverable = e.is_recoverable(), "roster not saved");
        }
    }
}
