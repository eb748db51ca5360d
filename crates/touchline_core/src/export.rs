//! Plain-text match export.
//!
//! The text is deterministic for a given ledger and roster; it is what gets
//! copied to the clipboard and what report writers receive as input.

use crate::config::MatchConfig;
use crate::ledger::{Direction, EventKind, EventLedger, MatchEvent};
use crate::summary::{MatchSummary, PlayerLine, ScorerLine, TeamSummary};
use crate::time::format_hms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub include_scorers: bool,
    pub include_lineup: bool,
    pub show_numbers: bool,
}

impl ExportOptions {
    /// Header and event lines only.
    pub fn events_only(show_numbers: bool) -> Self {
        Self {
            include_scorers: false,
            include_lineup: false,
            show_numbers,
        }
    }

    pub fn full(show_numbers: bool) -> Self {
        Self {
            include_scorers: true,
            include_lineup: true,
            show_numbers,
        }
    }
}

/// Output of an outside collaborator (report writer, weather lookup),
/// appended verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSection {
    pub label: String,
    pub outcome: Result<String, String>,
}

impl ExternalSection {
    pub fn ok(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcome: Ok(text.into()),
        }
    }

    pub fn failed(label: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcome: Err(error.into()),
        }
    }
}

/// Human-readable description of one ledger entry, without time stamps.
pub fn describe_event(event: &MatchEvent, config: &MatchConfig, show_numbers: bool) -> String {
    match &event.kind {
        EventKind::PeriodStart => format!("{} Start", event.period),
        EventKind::PeriodEnd => format!("{} End", event.period),
        EventKind::MatchEnd => "Match End".to_string(),
        EventKind::Goal {
            team,
            scorer,
            is_penalty,
        } => {
            let mut line = format!("Goal - {}", config.team_name(*team));
            if let Some(player) = scorer {
                line.push_str(&format!(" ({})", player.label(show_numbers)));
            }
            if *is_penalty {
                line.push_str(" (Penalty)");
            }
            line
        }
        EventKind::Substitution { player, direction } => {
            let verb = match direction {
                Direction::On => "On",
                Direction::Off => "Off",
            };
            format!("Substitution {} - {}", verb, player.label(show_numbers))
        }
    }
}

/// `"<description> - <time of day> [<HH:MM:SS>]"`
pub fn event_line(event: &MatchEvent, config: &MatchConfig, show_numbers: bool) -> String {
    format!(
        "{} - {} [{}]",
        describe_event(event, config, show_numbers),
        event.timestamp,
        format_hms(event.cumulative_secs)
    )
}

fn scorer_line(line: &ScorerLine, show_numbers: bool) -> String {
    let name = line
        .scorer
        .as_ref()
        .map(|p| p.label(show_numbers))
        .unwrap_or_else(|| "Unattributed".to_string());
    let minutes: Vec<String> = line
        .goals
        .iter()
        .map(|g| {
            if g.is_penalty {
                format!("{}' (pen)", g.minute)
            } else {
                format!("{}'", g.minute)
            }
        })
        .collect();
    format!("  {} {}", name, minutes.join(", "))
}

fn scorer_block(team: &TeamSummary, show_numbers: bool, out: &mut Vec<String>) {
    if team.scorers.is_empty() {
        return;
    }
    out.push(format!("{} scorers:", team.name));
    out.extend(team.scorers.iter().map(|l| scorer_line(l, show_numbers)));
}

fn player_line(line: &PlayerLine, show_numbers: bool) -> String {
    let mut text = line.player.label(show_numbers);
    if line.minutes_played > 0 {
        text.push_str(&format!(" (played {}')", line.minutes_played));
    }
    if !line.goal_minutes.is_empty() {
        let count = line.goal_minutes.len();
        let minutes: Vec<String> = line.goal_minutes.iter().map(|m| format!("{}'", m)).collect();
        text.push_str(&format!(
            " ({} {} @ {})",
            count,
            if count == 1 { "goal" } else { "goals" },
            minutes.join(", ")
        ));
    }
    text
}

/// Renders the full export.
pub fn render_export(
    summary: &MatchSummary,
    ledger: &EventLedger,
    config: &MatchConfig,
    options: ExportOptions,
    sections: &[ExternalSection],
) -> String {
    let mut blocks: Vec<Vec<String>> = vec![vec![summary.score_line()]];

    if options.include_scorers {
        let mut lines = Vec::new();
        scorer_block(&summary.home, options.show_numbers, &mut lines);
        scorer_block(&summary.away, options.show_numbers, &mut lines);
        if !lines.is_empty() {
            blocks.push(lines);
        }
    }

    if options.include_lineup && !(summary.starting.is_empty() && summary.substitutes.is_empty()) {
        let mut lines = vec!["Starting Lineup:".to_string()];
        lines.extend(
            summary
                .starting
                .iter()
                .map(|l| player_line(l, options.show_numbers)),
        );
        lines.push("Substitutes:".to_string());
        lines.extend(
            summary
                .substitutes
                .iter()
                .map(|l| player_line(l, options.show_numbers)),
        );
        blocks.push(lines);
    }

    let events: Vec<String> = ledger
        .iter()
        .map(|e| event_line(e, config, options.show_numbers))
        .collect();
    if !events.is_empty() {
        blocks.push(events);
    }

    for section in sections {
        let lines = match &section.outcome {
            Ok(text) => vec![format!("{}:", section.label), text.trim_end().to_string()],
            Err(error) => vec![format!("{}: unavailable ({})", section.label, error)],
        };
        blocks.push(lines);
    }

    let mut text = blocks
        .into_iter()
        .map(|lines| lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n");
    text.push('\n');
    text
}
