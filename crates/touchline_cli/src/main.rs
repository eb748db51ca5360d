//! Touchline CLI
//!
//! Sets up a match, runs the live recorder against stdin, and prints the
//! export or a JSON summary. State lives in a directory of JSON slots.

mod commands;
mod live;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use touchline_core::{
    AgeGroup, ExportOptions, ExternalSection, FileStore, MatchConfig, MatchTracker, PeriodFormat,
    Roster, Side, SystemClock,
};

#[derive(Parser)]
#[command(name = "touchline")]
#[command(about = "Record goals, substitutions and playing time during a live match", long_about = None)]
struct Cli {
    /// Directory holding the match and roster slots
    #[arg(long, global = true, default_value = ".touchline")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up a new match, replacing any saved one
    New {
        /// Home team name
        #[arg(long)]
        home: String,

        /// Away team name
        #[arg(long)]
        away: String,

        /// Age group (U7..U18, Adult)
        #[arg(long, default_value = "U11")]
        age_group: String,

        /// Number of periods: 1, 2 or 4
        #[arg(long)]
        periods: Option<u8>,

        /// Period length as MM:SS
        #[arg(long)]
        period_length: Option<String>,

        /// Track the away side instead of the home side
        #[arg(long, default_value = "false")]
        away_side: bool,

        /// Hide shirt numbers in exports
        #[arg(long, default_value = "false")]
        no_numbers: bool,

        /// Player names in shirt-number order; defaults to a numbered squad
        #[arg(long, value_delimiter = ',')]
        players: Vec<String>,
    },

    /// Record the match interactively
    Live,

    /// Print the plain-text match export
    Export {
        /// Include scorers and lineup blocks
        #[arg(long, default_value = "false")]
        full: bool,

        /// Append a text file as a labelled section, as LABEL=PATH
        #[arg(long)]
        section: Vec<String>,
    },

    /// Print the match summary as JSON
    Summary,

    /// Clear timer and events, keeping teams and players
    Reset,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::New {
            home,
            away,
            age_group,
            periods,
            period_length,
            away_side,
            no_numbers,
            players,
        } => {
            let age_group = AgeGroup::parse(&age_group)
                .with_context(|| format!("unknown age group '{}'", age_group))?;
            let mut config = MatchConfig::for_age_group(age_group, home, away)?;
            if let Some(count) = periods {
                config = config.with_format(PeriodFormat::from_count(count)?)?;
            }
            if let Some(text) = period_length {
                let secs = touchline_core::time::parse_duration(&text)
                    .with_context(|| format!("period length '{}' is not MM:SS", text))?;
                config = config.with_period_length_secs(secs)?;
            }
            if away_side {
                config = config.with_tracked_side(Side::Away);
            }
            config.show_numbers = !no_numbers;

            let roster = if players.is_empty() {
                Roster::with_squad(config.squad_size)
            } else {
                let mut roster = Roster::new();
                for (i, name) in players.iter().enumerate() {
                    let on_bench = i as u32 >= config.squad_size;
                    roster.add_player(name.trim(), on_bench);
                }
                roster
            };

            println!("🔨 New match in {}", cli.data_dir.display());
            println!(
                "   {} vs {} ({}, {} x {})",
                config.home_team,
                config.away_team,
                config.age_group,
                config.format.count(),
                touchline_core::time::format_mmss(config.period_length_secs)
            );

            let mut tracker = MatchTracker::with_roster(config, roster, SystemClock);
            tracker.attach_store(Box::new(FileStore::new(&cli.data_dir)));
            println!("✅ {} players on the roster", tracker.roster().len());
        }

        Commands::Live => {
            let mut tracker = open(&cli.data_dir)?;
            live::run(&mut tracker).await?;
        }

        Commands::Export { full, section } => {
            let tracker = open(&cli.data_dir)?;
            let show_numbers = tracker.config().show_numbers;
            let options = if full {
                ExportOptions::full(show_numbers)
            } else {
                ExportOptions::events_only(show_numbers)
            };
            let sections = section
                .iter()
                .map(|spec| read_section(spec))
                .collect::<Result<Vec<_>>>()?;
            print!("{}", tracker.export_text(options, &sections));
        }

        Commands::Summary => {
            let tracker = open(&cli.data_dir)?;
            println!("{}", serde_json::to_string_pretty(&tracker.summary())?);
        }

        Commands::Reset => {
            let mut tracker = open(&cli.data_dir)?;
            tracker.reset();
            println!("✅ Match reset");
        }
    }

    Ok(())
}

/// Loads the saved match, or a default U11 setup if there is none.
fn open(dir: &Path) -> Result<MatchTracker<SystemClock>> {
    let fallback = MatchConfig::for_age_group(AgeGroup::U11, "Home", "Away")?;
    Ok(MatchTracker::restore(
        Box::new(FileStore::new(dir)),
        fallback,
        SystemClock,
    ))
}

/// `LABEL=PATH`. An unreadable file becomes an "unavailable" section.
fn read_section(spec: &str) -> Result<ExternalSection> {
    let (label, path) = spec
        .split_once('=')
        .with_context(|| format!("section '{}' is not LABEL=PATH", spec))?;
    Ok(match std::fs::read_to_string(path) {
        Ok(text) => ExternalSection::ok(label, text),
        Err(e) => ExternalSection::failed(label, e.to_string()),
    })
}
