//! Squad list and live starting/substitute classification.
//!
//! The roster owns who is on the pitch *now*. The ledger only keeps the
//! history of substitutions; the two are kept in step by
//! [`crate::tracker::MatchTracker`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::TrackerError;
use crate::ledger::{Direction, PlayerRef};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub is_substitute: bool,
}

impl Player {
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            is_substitute: false,
        }
    }

    pub fn to_ref(&self) -> PlayerRef {
        PlayerRef::new(self.number, self.name.clone())
    }

    pub fn label(&self, show_numbers: bool) -> String {
        self.to_ref().label(show_numbers)
    }
}

/// One player's move in a batch lineup change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineupChange {
    pub number: u32,
    pub to_substitute: bool,
}

impl LineupChange {
    pub fn off(number: u32) -> Self {
        Self {
            number,
            to_substitute: true,
        }
    }

    pub fn on(number: u32) -> Self {
        Self {
            number,
            to_substitute: false,
        }
    }

    pub fn direction(self) -> Direction {
        if self.to_substitute {
            Direction::Off
        } else {
            Direction::On
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unnamed players numbered `1..=size`, everyone starting.
    pub fn with_squad(size: u32) -> Self {
        Self {
            players: (1..=size).map(|n| Player::new(n, "")).collect(),
        }
    }

    pub fn from_players(players: Vec<Player>) -> Result<Self, TrackerError> {
        let mut seen = HashSet::new();
        for p in &players {
            if !seen.insert(p.number) {
                return Err(TrackerError::InvalidConfig(format!(
                    "shirt number {} is used twice",
                    p.number
                )));
            }
        }
        Ok(Self { players })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, number: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.number == number)
    }

    fn get_mut(&mut self, number: u32) -> Result<&mut Player, TrackerError> {
        self.players
            .iter_mut()
            .find(|p| p.number == number)
            .ok_or(TrackerError::UnknownPlayer(number))
    }

    pub fn player_ref(&self, number: u32) -> Result<PlayerRef, TrackerError> {
        self.get(number)
            .map(Player::to_ref)
            .ok_or(TrackerError::UnknownPlayer(number))
    }

    pub fn starting(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_substitute)
    }

    pub fn substitutes(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_substitute)
    }

    pub fn on_pitch_count(&self) -> u32 {
        self.starting().count() as u32
    }

    /// Adds a player with the next free shirt number and returns it.
    pub fn add_player(&mut self, name: impl Into<String>, is_substitute: bool) -> u32 {
        self.add_player_above(0, name, is_substitute)
    }

    /// Like [`Roster::add_player`], but the number is also above `floor`.
    pub fn add_player_above(
        &mut self,
        floor: u32,
        name: impl Into<String>,
        is_substitute: bool,
    ) -> u32 {
        let highest = self.players.iter().map(|p| p.number).max().unwrap_or(0);
        let number = highest.max(floor).saturating_add(1);
        self.players.push(Player {
            number,
            name: name.into(),
            is_substitute,
        });
        number
    }

    pub fn remove_player(&mut self, number: u32) -> Result<Player, TrackerError> {
        let index = self
            .players
            .iter()
            .position(|p| p.number == number)
            .ok_or(TrackerError::UnknownPlayer(number))?;
        Ok(self.players.remove(index))
    }

    pub fn rename(&mut self, number: u32, name: impl Into<String>) -> Result<(), TrackerError> {
        self.get_mut(number)?.name = name.into();
        Ok(())
    }

    pub fn renumber(&mut self, number: u32, new_number: u32) -> Result<(), TrackerError> {
        if number != new_number && self.get(new_number).is_some() {
            return Err(TrackerError::InvalidConfig(format!(
                "shirt number {} is already taken",
                new_number
            )));
        }
        self.get_mut(number)?.number = new_number;
        Ok(())
    }

    /// Marks exactly `numbers` as starting and everyone else as substitute.
    pub fn set_starting(&mut self, numbers: &[u32]) -> Result<(), TrackerError> {
        if let Some(missing) = numbers.iter().find(|n| self.get(**n).is_none()) {
            return Err(TrackerError::UnknownPlayer(*missing));
        }
        for p in &mut self.players {
            p.is_substitute = !numbers.contains(&p.number);
        }
        Ok(())
    }

    /// Checks a batch of changes without applying it.
    ///
    /// Each player may appear once, must exist, and must actually change
    /// side. Returns the players in the order they should be logged: all
    /// departures first, then arrivals.
    pub fn plan_changes(
        &self,
        changes: &[LineupChange],
    ) -> Result<Vec<(PlayerRef, Direction)>, TrackerError> {
        if changes.is_empty() {
            return Err(TrackerError::InvalidSubstitution(
                "no lineup changes given".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(changes.len());
        for change in changes {
            if !seen.insert(change.number) {
                return Err(TrackerError::InvalidSubstitution(format!(
                    "#{} appears more than once",
                    change.number
                )));
            }
            let player = self
                .get(change.number)
                .ok_or(TrackerError::UnknownPlayer(change.number))?;
            if player.is_substitute == change.to_substitute {
                let place = if player.is_substitute {
                    "on the bench"
                } else {
                    "on the pitch"
                };
                return Err(TrackerError::InvalidSubstitution(format!(
                    "#{} is already {}",
                    change.number, place
                )));
            }
            planned.push((player.to_ref(), change.direction()));
        }
        planned.sort_by_key(|(_, dir)| match dir {
            Direction::Off => 0,
            Direction::On => 1,
        });
        Ok(planned)
    }

    /// Applies changes previously accepted by [`Roster::plan_changes`].
    pub(crate) fn apply_changes(&mut self, changes: &[LineupChange]) {
        for change in changes {
            if let Ok(p) = self.get_mut(change.number) {
                p.is_substitute = change.to_substitute;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squad() -> Roster {
        let mut roster = Roster::with_squad(5);
        roster.rename(3, "Alex").unwrap();
        roster.add_player("Sam", true);
        roster
    }

    #[test]
    fn test_with_squad_numbers_from_one() {
        let roster = Roster::with_squad(7);
        let numbers: Vec<u32> = roster.players().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(roster.on_pitch_count(), 7);
    }

    #[test]
    fn test_add_player_takes_next_number() {
        let roster = squad();
        let sam = roster.get(6).unwrap();
        assert_eq!(sam.name, "Sam");
        assert!(sam.is_substitute);
        assert_eq!(roster.substitutes().count(), 1);
    }

    #[test]
    fn test_labels() {
        let roster = squad();
        assert_eq!(roster.get(3).unwrap().label(true), "#3 Alex");
        assert_eq!(roster.get(3).unwrap().label(false), "Alex");
        assert_eq!(roster.get(2).unwrap().label(true), "#2 Player 2");
    }

    #[test]
    fn test_renumber_rejects_taken_number() {
        let mut roster = squad();
        assert!(roster.renumber(3, 4).is_err());
        roster.renumber(3, 10).unwrap();
        assert_eq!(roster.get(10).unwrap().name, "Alex");
    }

    #[test]
    fn test_add_player_above_skips_retired_numbers() {
        let mut roster = squad();
        assert_eq!(roster.add_player_above(3, "Kim", true), 7);
        assert_eq!(roster.add_player_above(20, "Lee", true), 21);
        assert_eq!(roster.add_player("Max", true), 22);
    }

    #[test]
    fn test_plan_changes_orders_departures_first() {
        let roster = squad();
        let planned = roster
            .plan_changes(&[LineupChange::on(6), LineupChange::off(3)])
            .unwrap();
        assert_eq!(planned[0], (PlayerRef::new(3, "Alex"), Direction::Off));
        assert_eq!(planned[1], (PlayerRef::new(6, "Sam"), Direction::On));
    }

    #[test]
    fn test_plan_changes_rejects_no_op_and_duplicates() {
        let roster = squad();
        assert!(matches!(
            roster.plan_changes(&[LineupChange::on(3)]),
            Err(TrackerError::InvalidSubstitution(_))
        ));
        assert!(matches!(
            roster.plan_changes(&[LineupChange::off(3), LineupChange::off(3)]),
            Err(TrackerError::InvalidSubstitution(_))
        ));
        assert_eq!(
            roster.plan_changes(&[LineupChange::off(42)]),
            Err(TrackerError::UnknownPlayer(42))
        );
    }

    #[test]
    fn test_set_starting() {
        let mut roster = squad();
        roster.set_starting(&[1, 2, 6]).unwrap();
        assert_eq!(roster.on_pitch_count(), 3);
        assert!(roster.get(3).unwrap().is_substitute);
        assert_eq!(roster.set_starting(&[99]), Err(TrackerError::UnknownPlayer(99)));
    }
}
