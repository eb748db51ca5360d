//! Power-play eligibility for young age groups.
//!
//! A side trailing heavily may put extra players on: four or five goals down
//! earns one more, six or more earns two.

use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, Side};

/// Extra players earned for a goal difference seen from the tracked team.
pub fn power_play_bonus(goal_difference: i32) -> u32 {
    match goal_difference {
        d if d <= -6 => 2,
        -5 | -4 => 1,
        _ => 0,
    }
}

/// Goal difference from the tracked side's point of view.
pub fn tracked_goal_difference(tracked_side: Side, home_goals: u32, away_goals: u32) -> i32 {
    let (ours, theirs) = match tracked_side {
        Side::Home => (home_goals, away_goals),
        Side::Away => (away_goals, home_goals),
    };
    ours as i32 - theirs as i32
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerPlayStatus {
    pub goal_difference: i32,
    pub bonus: u32,
    /// Squad size plus bonus
    pub allowed_players: u32,
}

impl PowerPlayStatus {
    pub fn evaluate(config: &MatchConfig, home_goals: u32, away_goals: u32) -> Self {
        let goal_difference = tracked_goal_difference(config.tracked_side, home_goals, away_goals);
        let bonus = if config.age_group.power_play_allowed() {
            power_play_bonus(goal_difference)
        } else {
            0
        };
        Self {
            goal_difference,
            bonus,
            allowed_players: config.squad_size + bonus,
        }
    }

    /// True when the number on the pitch differs from what is allowed.
    pub fn lineup_mismatch(&self, on_pitch: u32) -> bool {
        on_pitch != self.allowed_players
    }
}
