//! Line commands for the live recorder.

use anyhow::{bail, Context, Result};

use touchline_core::time::parse_duration;
use touchline_core::{EventId, LineupChange, MatchConfig, Period, Side};

pub const HELP: &str = "\
commands:
  start                          start the next period
  end                            end the running period
  goal <home|away> [N] [pen] [P] goal, optional scorer, penalty, period (e.g. H1)
  sub <off> <on>                 one player off, one on
  swap +N -M ...                 several players on (+) and off (-) at once
  lineup N N N ...               starting lineup (before kick-off)
  add <name>                     add a player
  rename <N> <name>              rename a player
  number <N> <new>               change a shirt number (before kick-off)
  drop <N>                       remove a player
  fix <id> <MM:SS> [home|away [N] [pen]]
                                 move an event, optionally re-attribute a goal
  remove <id>                    delete an event
  status | events | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    End,
    Goal {
        team: Side,
        scorer: Option<u32>,
        is_penalty: bool,
        period: Option<Period>,
    },
    Sub {
        off: u32,
        on: u32,
    },
    Swap(Vec<LineupChange>),
    Lineup(Vec<u32>),
    Add(String),
    Rename {
        number: u32,
        name: String,
    },
    Renumber {
        number: u32,
        new_number: u32,
    },
    Drop(u32),
    Fix {
        id: EventId,
        cumulative_secs: u32,
        goal: Option<GoalArgs>,
    },
    Remove(EventId),
    Status,
    Events,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalArgs {
    pub team: Side,
    pub scorer: Option<u32>,
    pub is_penalty: bool,
}

fn number(token: &str) -> Result<u32> {
    token
        .trim_start_matches('#')
        .parse()
        .with_context(|| format!("'{}' is not a shirt number", token))
}

fn event_id(token: &str) -> Result<EventId> {
    Ok(EventId(
        token
            .parse()
            .with_context(|| format!("'{}' is not an event id", token))?,
    ))
}

fn side(token: &str, config: &MatchConfig) -> Result<Side> {
    match token.to_ascii_lowercase().as_str() {
        "home" | "h" => Ok(Side::Home),
        "away" | "a" => Ok(Side::Away),
        _ => config
            .side_for_team(token)
            .with_context(|| format!("'{}' is neither team", token)),
    }
}

/// Team, then any of: scorer number, `pen`, period label.
fn goal_args<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    config: &MatchConfig,
) -> Result<(GoalArgs, Option<Period>)> {
    let team = side(tokens.next().context("goal needs a team")?, config)?;
    let mut args = GoalArgs {
        team,
        scorer: None,
        is_penalty: false,
    };
    let mut period = None;
    for token in tokens {
        if token.eq_ignore_ascii_case("pen") {
            args.is_penalty = true;
        } else if let Some(p) = Period::parse(token) {
            period = Some(p);
        } else {
            args.scorer = Some(number(token)?);
        }
    }
    Ok((args, period))
}

impl Command {
    pub fn parse(line: &str, config: &MatchConfig) -> Result<Command> {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            bail!("empty command");
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "end" => Command::End,
            "goal" => {
                let (args, period) = goal_args(tokens, config)?;
                Command::Goal {
                    team: args.team,
                    scorer: args.scorer,
                    is_penalty: args.is_penalty,
                    period,
                }
            }
            "sub" => {
                let off = number(tokens.next().context("sub needs <off> <on>")?)?;
                let on = number(tokens.next().context("sub needs <off> <on>")?)?;
                Command::Sub { off, on }
            }
            "swap" => {
                let changes = tokens
                    .map(|t| {
                        if let Some(n) = t.strip_prefix('+') {
                            number(n).map(LineupChange::on)
                        } else if let Some(n) = t.strip_prefix('-') {
                            number(n).map(LineupChange::off)
                        } else {
                            bail!("'{}' needs a + or - prefix", t)
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                Command::Swap(changes)
            }
            "lineup" => Command::Lineup(tokens.map(number).collect::<Result<Vec<_>>>()?),
            "add" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    bail!("add needs a name");
                }
                Command::Add(name)
            }
            "rename" => {
                let number = number(tokens.next().context("rename needs <N> <name>")?)?;
                let name = tokens.collect::<Vec<_>>().join(" ");
                Command::Rename { number, name }
            }
            "number" => {
                let old = number(tokens.next().context("number needs <N> <new>")?)?;
                let new_number = number(tokens.next().context("number needs <N> <new>")?)?;
                Command::Renumber {
                    number: old,
                    new_number,
                }
            }
            "drop" => Command::Drop(number(tokens.next().context("drop needs <N>")?)?),
            "fix" => {
                let id = event_id(tokens.next().context("fix needs <id> <MM:SS>")?)?;
                let time = tokens.next().context("fix needs <id> <MM:SS>")?;
                let cumulative_secs =
                    parse_duration(time).with_context(|| format!("'{}' is not MM:SS", time))?;
                let mut rest = tokens.peekable();
                let goal = if rest.peek().is_some() {
                    let (args, _) = goal_args(rest, config)?;
                    Some(args)
                } else {
                    None
                };
                Command::Fix {
                    id,
                    cumulative_secs,
                    goal,
                }
            }
            "remove" => Command::Remove(event_id(tokens.next().context("remove needs <id>")?)?),
            "status" => Command::Status,
            "events" => Command::Events,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchline_core::AgeGroup;

    fn config() -> MatchConfig {
        MatchConfig::for_age_group(AgeGroup::U11, "Pumas", "Rovers").unwrap()
    }

    #[test]
    fn test_goal_with_all_options() {
        let cmd = Command::parse("goal home #7 pen H1", &config()).unwrap();
        assert_eq!(
            cmd,
            Command::Goal {
                team: Side::Home,
                scorer: Some(7),
                is_penalty: true,
                period: Some(Period::H1),
            }
        );
    }

    #[test]
    fn test_goal_by_team_name() {
        let cmd = Command::parse("goal rovers", &config()).unwrap();
        assert_eq!(
            cmd,
            Command::Goal {
                team: Side::Away,
                scorer: None,
                is_penalty: false,
                period: None,
            }
        );
        assert!(Command::parse("goal nobody", &config()).is_err());
    }

    #[test]
    fn test_swap_signs() {
        let cmd = Command::parse("swap +12 -3 +11", &config()).unwrap();
        assert_eq!(
            cmd,
            Command::Swap(vec![
                LineupChange::on(12),
                LineupChange::off(3),
                LineupChange::on(11)
            ])
        );
        assert!(Command::parse("swap 4", &config()).is_err());
    }

    #[test]
    fn test_fix_with_reattribution() {
        let cmd = Command::parse("fix 4 12:30 away 9", &config()).unwrap();
        assert_eq!(
            cmd,
            Command::Fix {
                id: EventId(4),
                cumulative_secs: 750,
                goal: Some(GoalArgs {
                    team: Side::Away,
                    scorer: Some(9),
                    is_penalty: false,
                }),
            }
        );
        assert_eq!(
            Command::parse("fix 4 12:30", &config()).unwrap(),
            Command::Fix {
                id: EventId(4),
                cumulative_secs: 750,
                goal: None,
            }
        );
    }

    #[test]
    fn test_renumber() {
        assert_eq!(
            Command::parse("number 3 #14", &config()).unwrap(),
            Command::Renumber {
                number: 3,
                new_number: 14,
            }
        );
        assert!(Command::parse("number 3", &config()).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Command::parse("", &config()).is_err());
        assert!(Command::parse("kick ball", &config()).is_err());
        assert!(Command::parse("sub 3", &config()).is_err());
        assert!(Command::parse("fix x 1:00", &config()).is_err());
        assert!(Command::parse("fix 1 99999999:00", &config()).is_err());
    }
}
