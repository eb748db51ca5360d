//! Match summary aggregation
//!
//! A read-only view over the ledger and roster. Nothing here mutates state
//! or fails: a ledger that has been hand-edited into an odd shape still
//! produces a summary, with missing anchors read as zero offsets.

use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, Side};
use crate::ledger::{EventKind, EventLedger, MatchEvent, PlayerRef};
use crate::minutes::{initial_status, on_pitch_secs, secs_to_rounded_minutes, PlayerStatus};
use crate::power_play::PowerPlayStatus;
use crate::roster::Roster;
use crate::time::{match_minute, previous_periods_offset_secs};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalMinute {
    pub minute: u32,
    pub is_penalty: bool,
}

/// All goals credited to one scorer (or to nobody).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScorerLine {
    pub scorer: Option<PlayerRef>,
    pub goals: Vec<GoalMinute>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamSummary {
    pub name: String,
    pub goals: u32,
    pub scorers: Vec<ScorerLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerLine {
    pub player: PlayerRef,
    pub status: PlayerStatus,
    pub minutes_played: u32,
    pub goal_minutes: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSummary {
    pub home: TeamSummary,
    pub away: TeamSummary,
    /// Cumulative seconds the minutes are counted up to
    pub as_of_secs: u32,
    pub complete: bool,
    pub starting: Vec<PlayerLine>,
    /// Substitutes and unused players
    pub substitutes: Vec<PlayerLine>,
    pub power_play: PowerPlayStatus,
}

/// Match minute for a goal. A goal whose period never kicked off on record is
/// placed at the first minute of that period.
pub fn goal_minute(event: &MatchEvent, ledger: &EventLedger, period_length_secs: u32) -> u32 {
    let secs = if ledger.period_start(event.period).is_some() {
        event.cumulative_secs
    } else {
        previous_periods_offset_secs(event.period, period_length_secs)
    };
    match_minute(secs, event.period, period_length_secs)
}

/// Point in match time that minutes are counted to: full time if recorded,
/// otherwise the live clock, otherwise the last whistle.
pub fn as_of_secs(ledger: &EventLedger, live_cumulative_secs: Option<u32>) -> u32 {
    if let Some(end) = ledger.match_end() {
        return end.cumulative_secs;
    }
    if let Some(live) = live_cumulative_secs {
        return live;
    }
    ledger
        .last_period_end()
        .map(|e| e.cumulative_secs)
        .unwrap_or(0)
}

fn team_summary(config: &MatchConfig, ledger: &EventLedger, side: Side) -> TeamSummary {
    let mut scorers: Vec<ScorerLine> = Vec::new();
    let mut unattributed: Vec<GoalMinute> = Vec::new();

    for event in ledger.goals() {
        let EventKind::Goal {
            team,
            scorer,
            is_penalty,
        } = &event.kind
        else {
            continue;
        };
        if *team != side {
            continue;
        }
        let goal = GoalMinute {
            minute: goal_minute(event, ledger, config.period_length_secs),
            is_penalty: *is_penalty,
        };
        match scorer {
            Some(player) => {
                match scorers
                    .iter_mut()
                    .find(|line| line.scorer.as_ref().map(|p| p.number) == Some(player.number))
                {
                    Some(line) => line.goals.push(goal),
                    None => scorers.push(ScorerLine {
                        scorer: Some(player.clone()),
                        goals: vec![goal],
                    }),
                }
            }
            None => unattributed.push(goal),
        }
    }

    let goals = scorers.iter().map(|l| l.goals.len()).sum::<usize>() + unattributed.len();
    if !unattributed.is_empty() {
        scorers.push(ScorerLine {
            scorer: None,
            goals: unattributed,
        });
    }
    for line in &mut scorers {
        line.goals.sort_by_key(|g| g.minute);
    }

    TeamSummary {
        name: config.team_name(side).to_string(),
        goals: goals as u32,
        scorers,
    }
}

impl MatchSummary {
    pub fn build(
        config: &MatchConfig,
        ledger: &EventLedger,
        roster: &Roster,
        as_of_secs: u32,
    ) -> Self {
        let home = team_summary(config, ledger, Side::Home);
        let away = team_summary(config, ledger, Side::Away);
        let ours = match config.tracked_side {
            Side::Home => &home,
            Side::Away => &away,
        };

        let mut starting = Vec::new();
        let mut substitutes = Vec::new();
        for player in roster.players() {
            let status = initial_status(player, ledger, as_of_secs);
            let goal_minutes: Vec<u32> = ours
                .scorers
                .iter()
                .find(|l| l.scorer.as_ref().map(|p| p.number) == Some(player.number))
                .map(|l| l.goals.iter().map(|g| g.minute).collect())
                .unwrap_or_default();
            let line = PlayerLine {
                player: player.to_ref(),
                status,
                minutes_played: secs_to_rounded_minutes(on_pitch_secs(player, ledger, as_of_secs)),
                goal_minutes,
            };
            match status {
                PlayerStatus::Starting => starting.push(line),
                PlayerStatus::Substitute | PlayerStatus::Unused => substitutes.push(line),
            }
        }

        let power_play = PowerPlayStatus::evaluate(config, home.goals, away.goals);
        Self {
            home,
            away,
            as_of_secs,
            complete: ledger.has_match_end(),
            starting,
            substitutes,
            power_play,
        }
    }

    /// "Home 1–1 Away"
    pub fn score_line(&self) -> String {
        format!(
            "{} {}\u{2013}{} {}",
            self.home.name, self.home.goals, self.away.goals, self.away.name
        )
    }

    pub fn team(&self, side: Side) -> &TeamSummary {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}
