//! Event ledger
//!
//! The ordered record of everything that happened in a match. Position in the
//! ledger is meaningful: readers that walk a prefix of the ledger see events
//! in the order they belong to the match, which is why late goals are slotted
//! in ahead of their period's end rather than appended.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Side;
use crate::error::TrackerError;
use crate::period::Period;
use crate::time::{previous_periods_offset_secs, TimeOfDay};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a player as they were when the event was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlayerRef {
    pub number: u32,
    pub name: String,
}

impl PlayerRef {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
        }
    }

    /// "#3 Alex", "Alex", or "Player 3" for a blank name.
    pub fn label(&self, show_numbers: bool) -> String {
        let name = if self.name.trim().is_empty() {
            format!("Player {}", self.number)
        } else {
            self.name.clone()
        };
        if show_numbers && self.number > 0 {
            format!("#{} {}", self.number, name)
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    On,
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    PeriodStart,
    PeriodEnd,
    Goal {
        team: Side,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scorer: Option<PlayerRef>,
        #[serde(default)]
        is_penalty: bool,
    },
    Substitution {
        player: PlayerRef,
        direction: Direction,
    },
    MatchEnd,
}

/// New scorer details for a goal correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalAttribution {
    pub team: Side,
    pub scorer: Option<PlayerRef>,
    pub is_penalty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEvent {
    pub id: EventId,
    /// Wall-clock time of day the event happened
    pub timestamp: TimeOfDay,
    /// Seconds since kick-off, counted across periods
    pub cumulative_secs: u32,
    /// Period the event belongs to
    pub period: Period,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl MatchEvent {
    pub fn is_goal(&self) -> bool {
        matches!(self.kind, EventKind::Goal { .. })
    }

    pub fn is_period_start_of(&self, period: Period) -> bool {
        self.period == period && matches!(self.kind, EventKind::PeriodStart)
    }

    pub fn is_period_end_of(&self, period: Period) -> bool {
        self.period == period && matches!(self.kind, EventKind::PeriodEnd)
    }

    pub fn goal_team(&self) -> Option<Side> {
        match self.kind {
            EventKind::Goal { team, .. } => Some(team),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventLedger {
    events: Vec<MatchEvent>,
    /// Next id to hand out; never reused within a match
    next_id: u64,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an event with a fresh id. Nothing is recorded until it is
    /// pushed or inserted.
    pub fn draft(
        &mut self,
        timestamp: TimeOfDay,
        cumulative_secs: u32,
        period: Period,
        kind: EventKind,
    ) -> MatchEvent {
        let id = EventId(self.next_id);
        self.next_id += 1;
        MatchEvent {
            id,
            timestamp,
            cumulative_secs,
            period,
            kind,
        }
    }

    /// Appends to the end of the ledger.
    pub fn push(&mut self, event: MatchEvent) -> EventId {
        let id = event.id;
        if event.id.0 >= self.next_id {
            self.next_id = event.id.0 + 1;
        }
        self.events.push(event);
        id
    }

    /// Slots `event` in directly ahead of `period`'s `PeriodEnd`, back-dated
    /// to the close of the period.
    ///
    /// Cumulative time becomes the `PeriodEnd`'s; the timestamp becomes the
    /// period's start stamp plus its nominal length, or the `PeriodEnd` stamp
    /// when no start is on record. Hands the event back if the period has not
    /// ended.
    pub fn insert_before_period_end(
        &mut self,
        period: Period,
        mut event: MatchEvent,
        period_length_secs: u32,
    ) -> Result<usize, MatchEvent> {
        let Some(index) = self.position_of_period_end(period) else {
            return Err(event);
        };
        let end = &self.events[index];
        event.cumulative_secs = end.cumulative_secs;
        event.timestamp = match self.period_start(period) {
            Some(start) => start.timestamp.plus_secs(period_length_secs),
            None => end.timestamp,
        };
        if event.id.0 >= self.next_id {
            self.next_id = event.id.0 + 1;
        }
        self.events.insert(index, event);
        Ok(index)
    }

    /// Rewrites an event's timing and, for goals, its attribution.
    ///
    /// The timestamp is rebuilt from the period's recorded start so that wall
    /// time and cumulative time keep agreeing.
    pub fn correct(
        &mut self,
        id: EventId,
        cumulative_secs: u32,
        attribution: Option<GoalAttribution>,
        period_length_secs: u32,
    ) -> Result<(), TrackerError> {
        let index = self.index_of(id).ok_or(TrackerError::UnknownEvent(id))?;
        let period = self.events[index].period;
        if attribution.is_some() && !self.events[index].is_goal() {
            return Err(TrackerError::AttributionMismatch(id));
        }
        let start_stamp = self
            .period_start(period)
            .map(|e| e.timestamp)
            .ok_or(TrackerError::NoPeriodStart(period))?;

        let offset = previous_periods_offset_secs(period, period_length_secs);
        let within_period = cumulative_secs.saturating_sub(offset);

        let event = &mut self.events[index];
        event.cumulative_secs = cumulative_secs;
        event.timestamp = start_stamp.plus_secs(within_period);
        if let Some(new) = attribution {
            event.kind = EventKind::Goal {
                team: new.team,
                scorer: new.scorer,
                is_penalty: new.is_penalty,
            };
        }
        Ok(())
    }

    /// Deletes a single event. Nothing else is touched.
    pub fn remove(&mut self, id: EventId) -> Result<MatchEvent, TrackerError> {
        let index = self.index_of(id).ok_or(TrackerError::UnknownEvent(id))?;
        Ok(self.events.remove(index))
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.next_id = 0;
    }

    pub fn get(&self, id: EventId) -> Option<&MatchEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn period_start(&self, period: Period) -> Option<&MatchEvent> {
        self.events.iter().find(|e| e.is_period_start_of(period))
    }

    pub fn period_end(&self, period: Period) -> Option<&MatchEvent> {
        self.events.iter().find(|e| e.is_period_end_of(period))
    }

    pub fn position_of_period_end(&self, period: Period) -> Option<usize> {
        self.events.iter().position(|e| e.is_period_end_of(period))
    }

    pub fn match_end(&self) -> Option<&MatchEvent> {
        self.events
            .iter()
            .find(|e| matches!(e.kind, EventKind::MatchEnd))
    }

    pub fn has_match_end(&self) -> bool {
        self.match_end().is_some()
    }

    /// Latest period close by cumulative time.
    pub fn last_period_end(&self) -> Option<&MatchEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::PeriodEnd))
            .max_by_key(|e| e.cumulative_secs)
    }

    /// True once any period has kicked off.
    pub fn has_kicked_off(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.kind, EventKind::PeriodStart))
    }

    pub fn goals(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter().filter(|e| e.is_goal())
    }

    pub fn goal_count(&self, side: Side) -> u32 {
        self.goals().filter(|e| e.goal_team() == Some(side)).count() as u32
    }

    fn player_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.events.iter().filter_map(|e| match &e.kind {
            EventKind::Goal {
                scorer: Some(player),
                ..
            }
            | EventKind::Substitution { player, .. } => Some(player.number),
            _ => None,
        })
    }

    /// Highest shirt number any event refers to.
    pub fn highest_player_number(&self) -> Option<u32> {
        self.player_numbers().max()
    }

    /// True if any goal or substitution refers to shirt `number`.
    pub fn mentions_player(&self, number: u32) -> bool {
        self.player_numbers().any(|n| n == number)
    }

    /// A player's substitution events, ordered by cumulative time. Ties keep
    /// ledger order.
    pub fn substitutions_for(&self, number: u32) -> Vec<(u32, Direction)> {
        let mut subs: Vec<(u32, Direction)> = self
            .events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Substitution { player, direction } if player.number == number => {
                    Some((e.cumulative_secs, *direction))
                }
                _ => None,
            })
            .collect();
        subs.sort_by_key(|(secs, _)| *secs);
        subs
    }
}
