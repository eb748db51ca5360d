//! Live recorder loop
//!
//! One task owns the tracker and alternates between stdin commands and a
//! one-second tick. The tick only exists while a period is running.

use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Interval, MissedTickBehavior};

use touchline_core::{
    Clock, EndOutcome, LineupChange, MatchPhase, MatchTracker, TickOutcome, TrackerError,
};

use crate::commands::{Command, HELP};

/// Creates the ticker on entering `Running` and drops it on leaving.
fn sync_ticker(ticker: &mut Option<Interval>, phase: MatchPhase) {
    match (phase, ticker.is_some()) {
        (MatchPhase::Running(_), false) => {
            let mut tick = interval(Duration::from_secs(1));
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *ticker = Some(tick);
        }
        (MatchPhase::Idle | MatchPhase::Complete, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(tick) => {
            tick.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

pub async fn run<C: Clock>(tracker: &mut MatchTracker<C>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker: Option<Interval> = None;
    let mut last_minute = None;

    println!(
        "{} vs {}. Type 'help' for commands.",
        tracker.config().home_team,
        tracker.config().away_team
    );
    print_status(tracker);

    loop {
        sync_ticker(&mut ticker, tracker.phase());

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line, tracker.config()) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(tracker, command) {
                            println!("⚠️  {}", e);
                        }
                    }
                    Err(e) => println!("⚠️  {}", e),
                }
            }
            _ = next_tick(&mut ticker) => {
                match tracker.tick() {
                    TickOutcome::PeriodEnded { period, match_complete } => {
                        println!("⏱  {} over", period.display_name());
                        if match_complete {
                            println!("🏁 Full time: {}", tracker.summary().score_line());
                        }
                        last_minute = None;
                    }
                    TickOutcome::Running { elapsed_secs, .. } => {
                        let minute = elapsed_secs / 60;
                        if last_minute != Some(minute) {
                            last_minute = Some(minute);
                            if let Some(clock) = tracker.clock_display() {
                                println!("   {}", clock);
                            }
                        }
                    }
                    TickOutcome::Idle => {}
                }
            }
        }
    }

    tracing::debug!("live recorder closed");
    Ok(())
}

fn execute<C: Clock>(
    tracker: &mut MatchTracker<C>,
    command: Command,
) -> Result<(), TrackerError> {
    match command {
        Command::Start => {
            let (period, _) = tracker.start_next_period()?;
            println!("▶️  {} started", period.display_name());
        }
        Command::End => match tracker.end_period(None)? {
            EndOutcome::Ended {
                period,
                match_complete,
            } => {
                println!("⏱  {} over", period.display_name());
                if match_complete {
                    println!("🏁 Full time: {}", tracker.summary().score_line());
                }
            }
            EndOutcome::AlreadyEnded { period } => {
                println!("   {} had already ended", period.display_name());
            }
        },
        Command::Goal {
            team,
            scorer,
            is_penalty,
            period,
        } => {
            let id = tracker.record_goal(team, scorer, is_penalty, period)?;
            println!("⚽ {} [{}]", tracker.summary().score_line(), id);
            warn_power_play(tracker);
        }
        Command::Sub { off, on } => {
            tracker.record_substitution(off, on)?;
            println!("🔁 #{} off, #{} on", off, on);
        }
        Command::Swap(changes) => {
            tracker.apply_lineup_changes(&changes)?;
            println!("🔁 {} lineup changes", changes.len());
            warn_power_play(tracker);
        }
        Command::Lineup(numbers) => {
            tracker.set_starting_lineup(&numbers)?;
            println!("   {} starting", numbers.len());
        }
        Command::Add(name) => {
            let number = tracker.add_player(name);
            println!("   added #{}", number);
        }
        Command::Rename { number, name } => tracker.rename_player(number, name)?,
        Command::Renumber { number, new_number } => {
            tracker.renumber_player(number, new_number)?;
            println!("   #{} is now #{}", number, new_number);
        }
        Command::Drop(number) => tracker.remove_player(number)?,
        Command::Fix {
            id,
            cumulative_secs,
            goal,
        } => {
            let attribution = goal
                .map(|g| tracker.goal_attribution(g.team, g.scorer, g.is_penalty))
                .transpose()?;
            tracker.correct_event(id, cumulative_secs, attribution)?;
            println!("   event {} corrected", id);
        }
        Command::Remove(id) => {
            tracker.remove_event(id)?;
            println!("   event {} removed", id);
        }
        Command::Status => print_status(tracker),
        Command::Events => print_events(tracker),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn print_status<C: Clock>(tracker: &MatchTracker<C>) {
    let summary = tracker.summary();
    let phase = match tracker.phase() {
        MatchPhase::Running(period) => format!(
            "{} {}",
            period.display_name(),
            tracker.clock_display().unwrap_or_default()
        ),
        MatchPhase::Idle => match tracker.next_period() {
            Some(next) => format!("waiting for {}", next.display_name()),
            None => "idle".to_string(),
        },
        MatchPhase::Complete => "full time".to_string(),
    };
    println!("   {} ({})", summary.score_line(), phase);
    let on_pitch = tracker.roster().on_pitch_count();
    println!(
        "   {} on the pitch, {} allowed",
        on_pitch, summary.power_play.allowed_players
    );
}

fn print_events<C: Clock>(tracker: &MatchTracker<C>) {
    let show_numbers = tracker.config().show_numbers;
    for event in tracker.ledger().iter() {
        println!(
            "   [{}] {}",
            event.id,
            touchline_core::export::event_line(event, tracker.config(), show_numbers)
        );
    }
}

/// Nudges the user when the power-play count no longer matches the pitch.
fn warn_power_play<C: Clock>(tracker: &MatchTracker<C>) {
    let status = tracker.power_play();
    let on_pitch = tracker.roster().on_pitch_count();
    if status.bonus > 0 && status.lineup_mismatch(on_pitch) {
        let extra = status.allowed_players.saturating_sub(on_pitch);
        let hint: Vec<LineupChange> = tracker
            .roster()
            .substitutes()
            .take(extra as usize)
            .map(|p| LineupChange::on(p.number))
            .collect();
        println!(
            "⚡ Power play: {} players allowed, {} on the pitch",
            status.allowed_players, on_pitch
        );
        if !hint.is_empty() {
            let numbers: Vec<String> = hint.iter().map(|c| format!("+{}", c.number)).collect();
            println!("   e.g. swap {}", numbers.join(" "));
        }
    } else if status.bonus == 0 && on_pitch > status.allowed_players {
        println!(
            "⚡ Power play over: {} players allowed, {} on the pitch",
            status.allowed_players, on_pitch
        );
    }
}
