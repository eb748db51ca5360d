//! On-pitch time reconstruction from substitution events.

use serde::{Deserialize, Serialize};

use crate::ledger::{Direction, EventLedger};
use crate::roster::Player;

/// How a player's match began.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Starting,
    Substitute,
    Unused,
}

/// Folds a player's substitution history into seconds on the pitch.
///
/// `subs` must be sorted by cumulative time. The player starts on the pitch
/// when their first move is `off`; with no moves at all, `on_when_empty`
/// decides. Moves past `end_secs` are clamped to it.
pub fn fold_on_pitch_secs(subs: &[(u32, Direction)], on_when_empty: bool, end_secs: u32) -> u32 {
    let mut on = match subs.first() {
        Some((_, Direction::Off)) => true,
        Some((_, Direction::On)) => false,
        None => on_when_empty,
    };
    let mut since = 0u32;
    let mut total = 0u32;

    for &(at, direction) in subs {
        let at = at.min(end_secs);
        match direction {
            Direction::Off if on => {
                total += at.saturating_sub(since);
                on = false;
            }
            Direction::On if !on => {
                since = at;
                on = true;
            }
            // Repeated moves in the same direction carry no new information
            _ => {}
        }
    }

    if on {
        total += end_secs.saturating_sub(since);
    }
    total
}

/// Seconds `player` spent on the pitch up to `end_secs`.
///
/// A player with no substitution events has kept the classification they
/// kicked off with, so their live status says whether they played
/// throughout or never came on.
pub fn on_pitch_secs(player: &Player, ledger: &EventLedger, end_secs: u32) -> u32 {
    let subs = ledger.substitutions_for(player.number);
    fold_on_pitch_secs(&subs, !player.is_substitute, end_secs)
}

/// [`on_pitch_secs`] rounded to the nearest whole minute.
pub fn on_pitch_minutes(player: &Player, ledger: &EventLedger, end_secs: u32) -> u32 {
    secs_to_rounded_minutes(on_pitch_secs(player, ledger, end_secs))
}

pub fn secs_to_rounded_minutes(secs: u32) -> u32 {
    (secs + 30) / 60
}

pub fn initial_status(player: &Player, ledger: &EventLedger, end_secs: u32) -> PlayerStatus {
    match ledger.substitutions_for(player.number).first() {
        Some((_, Direction::Off)) => PlayerStatus::Starting,
        Some((_, Direction::On)) => PlayerStatus::Substitute,
        None if !player.is_substitute && on_pitch_secs(player, ledger, end_secs) > 0 => {
            PlayerStatus::Starting
        }
        None => PlayerStatus::Unused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Side;
    use crate::ledger::{EventKind, PlayerRef};
    use crate::period::Period;
    use crate::time::TimeOfDay;

    fn sub(ledger: &mut EventLedger, number: u32, secs: u32, direction: Direction) {
        let event = ledger.draft(
            TimeOfDay::from_secs(secs),
            secs,
            Period::H1,
            EventKind::Substitution {
                player: PlayerRef::new(number, ""),
                direction,
            },
        );
        ledger.push(event);
    }

    fn starter(number: u32) -> Player {
        Player::new(number, "")
    }

    fn bench(number: u32) -> Player {
        Player {
            is_substitute: true,
            ..Player::new(number, "")
        }
    }

    #[test]
    fn test_single_off_counts_up_to_departure() {
        let mut ledger = EventLedger::new();
        sub(&mut ledger, 3, 750, Direction::Off);
        // Coming off flips the live status to substitute
        let player = bench(3);
        assert_eq!(on_pitch_secs(&player, &ledger, 2400), 750);
        assert_eq!(on_pitch_minutes(&player, &ledger, 2400), 13);
        assert_eq!(initial_status(&player, &ledger, 2400), PlayerStatus::Starting);
    }

    #[test]
    fn test_no_events_plays_full_match() {
        let ledger = EventLedger::new();
        assert_eq!(on_pitch_minutes(&starter(1), &ledger, 40 * 60), 40);
        assert_eq!(initial_status(&starter(1), &ledger, 40 * 60), PlayerStatus::Starting);
    }

    #[test]
    fn test_unused_substitute() {
        let ledger = EventLedger::new();
        assert_eq!(on_pitch_secs(&bench(9), &ledger, 40 * 60), 0);
        assert_eq!(initial_status(&bench(9), &ledger, 40 * 60), PlayerStatus::Unused);
    }

    #[test]
    fn test_starter_before_kickoff_is_unused() {
        // Nothing played yet, so even a starter has no minutes
        let ledger = EventLedger::new();
        assert_eq!(initial_status(&starter(1), &ledger, 0), PlayerStatus::Unused);
    }

    #[test]
    fn test_on_off_on_intervals() {
        let mut ledger = EventLedger::new();
        sub(&mut ledger, 7, 600, Direction::On);
        sub(&mut ledger, 7, 900, Direction::Off);
        sub(&mut ledger, 7, 1800, Direction::On);
        let player = starter(7);
        // 600..900 plus 1800..2400
        assert_eq!(on_pitch_secs(&player, &ledger, 2400), 900);
        assert_eq!(initial_status(&player, &ledger, 2400), PlayerStatus::Substitute);
    }

    #[test]
    fn test_fold_clamps_to_end() {
        let subs = [(300, Direction::On), (5000, Direction::Off)];
        assert_eq!(fold_on_pitch_secs(&subs, false, 1200), 900);
    }

    #[test]
    fn test_fold_ignores_repeated_direction() {
        let subs = [(300, Direction::Off), (400, Direction::Off), (500, Direction::On)];
        assert_eq!(fold_on_pitch_secs(&subs, true, 600), 400);
    }

    #[test]
    fn test_goals_do_not_affect_minutes() {
        let mut ledger = EventLedger::new();
        let goal = ledger.draft(
            TimeOfDay::from_secs(0),
            100,
            Period::H1,
            EventKind::Goal {
                team: Side::Home,
                scorer: Some(PlayerRef::new(3, "")),
                is_penalty: false,
            },
        );
        ledger.push(goal);
        assert_eq!(on_pitch_secs(&starter(3), &ledger, 600), 600);
    }
}
