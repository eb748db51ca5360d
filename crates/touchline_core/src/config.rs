//! # Match configuration
//!
//! Age-group presets and the immutable per-match [`MatchConfig`].
//!
//! ```rust
//! use touchline_core::config::{AgeGroup, MatchConfig};
//!
//! let config = MatchConfig::for_age_group(AgeGroup::U9, "Pumas", "Rovers").unwrap();
//! assert_eq!(config.period_length_secs, 750);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackerError;
use crate::period::PeriodFormat;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    U7,
    U8,
    U9,
    U10,
    U11,
    U12,
    U13,
    U14,
    U15,
    U16,
    U17,
    U18,
    Adult,
}

/// Defaults a league applies to an age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeGroupPreset {
    pub default_format: PeriodFormat,
    /// Length of one period in the default format
    pub default_period_length_secs: u32,
    /// Total playing time across all periods
    pub total_secs: u32,
    /// Players on the pitch per side
    pub squad_size: u32,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 13] = [
        AgeGroup::U7,
        AgeGroup::U8,
        AgeGroup::U9,
        AgeGroup::U10,
        AgeGroup::U11,
        AgeGroup::U12,
        AgeGroup::U13,
        AgeGroup::U14,
        AgeGroup::U15,
        AgeGroup::U16,
        AgeGroup::U17,
        AgeGroup::U18,
        AgeGroup::Adult,
    ];

    pub fn preset(self) -> AgeGroupPreset {
        let (default_format, total_mins, squad_size) = match self {
            AgeGroup::U7 | AgeGroup::U8 => (PeriodFormat::Quarters, 40, 5),
            AgeGroup::U9 | AgeGroup::U10 => (PeriodFormat::Quarters, 50, 7),
            AgeGroup::U11 | AgeGroup::U12 => (PeriodFormat::Halves, 60, 9),
            AgeGroup::U13 | AgeGroup::U14 => (PeriodFormat::Halves, 70, 11),
            AgeGroup::U15 | AgeGroup::U16 => (PeriodFormat::Halves, 80, 11),
            AgeGroup::U17 | AgeGroup::U18 | AgeGroup::Adult => (PeriodFormat::Halves, 90, 11),
        };
        let total_secs = total_mins * 60;
        AgeGroupPreset {
            default_format,
            default_period_length_secs: total_secs / default_format.count(),
            total_secs,
            squad_size,
        }
    }

    /// U13 and up only play halves.
    pub fn allowed_formats(self) -> &'static [PeriodFormat] {
        match self {
            AgeGroup::U7
            | AgeGroup::U8
            | AgeGroup::U9
            | AgeGroup::U10
            | AgeGroup::U11
            | AgeGroup::U12 => &[PeriodFormat::Quarters, PeriodFormat::Halves],
            _ => &[PeriodFormat::Halves],
        }
    }

    /// Young groups where a trailing side may field extra players.
    pub fn power_play_allowed(self) -> bool {
        matches!(
            self,
            AgeGroup::U7 | AgeGroup::U8 | AgeGroup::U9 | AgeGroup::U10
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::U7 => "U7",
            AgeGroup::U8 => "U8",
            AgeGroup::U9 => "U9",
            AgeGroup::U10 => "U10",
            AgeGroup::U11 => "U11",
            AgeGroup::U12 => "U12",
            AgeGroup::U13 => "U13",
            AgeGroup::U14 => "U14",
            AgeGroup::U15 => "U15",
            AgeGroup::U16 => "U16",
            AgeGroup::U17 => "U17",
            AgeGroup::U18 => "U18",
            AgeGroup::Adult => "Adult",
        }
    }

    pub fn parse(label: &str) -> Option<AgeGroup> {
        let wanted = label.trim();
        AgeGroup::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Home or away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Longest period a config accepts (three hours).
pub const MAX_PERIOD_LENGTH_SECS: u32 = 3 * 60 * 60;

/// Everything fixed for the duration of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub format: PeriodFormat,
    pub period_length_secs: u32,
    pub home_team: String,
    pub away_team: String,
    pub age_group: AgeGroup,
    /// Players allowed on the pitch before any power play
    pub squad_size: u32,
    /// The side the observer is tracking (their own team)
    pub tracked_side: Side,
    /// Render shirt numbers next to names
    #[serde(default = "default_show_numbers")]
    pub show_numbers: bool,
}

fn default_show_numbers() -> bool {
    true
}

impl MatchConfig {
    /// Builds a config from the age group's defaults.
    pub fn for_age_group(
        age_group: AgeGroup,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        let preset = age_group.preset();
        let config = Self {
            format: preset.default_format,
            period_length_secs: preset.default_period_length_secs,
            home_team: home_team.into(),
            away_team: away_team.into(),
            age_group,
            squad_size: preset.squad_size,
            tracked_side: Side::Home,
            show_numbers: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same total playing time split into a different number of periods.
    pub fn with_format(mut self, format: PeriodFormat) -> Result<Self, TrackerError> {
        let total = self.total_secs();
        self.format = format;
        self.period_length_secs = total / format.count();
        self.validate()?;
        Ok(self)
    }

    pub fn with_period_length_secs(mut self, secs: u32) -> Result<Self, TrackerError> {
        self.period_length_secs = secs;
        self.validate()?;
        Ok(self)
    }

    pub fn with_tracked_side(mut self, side: Side) -> Self {
        self.tracked_side = side;
        self
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.period_length_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "period length must be positive".to_string(),
            ));
        }
        if self.period_length_secs > MAX_PERIOD_LENGTH_SECS {
            return Err(TrackerError::InvalidConfig(format!(
                "period length must be at most {} seconds",
                MAX_PERIOD_LENGTH_SECS
            )));
        }
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "both team names are required".to_string(),
            ));
        }
        if self.format == PeriodFormat::Quarters
            && !self.age_group.allowed_formats().contains(&PeriodFormat::Quarters)
        {
            return Err(TrackerError::InvalidConfig(format!(
                "{} matches are played in halves",
                self.age_group
            )));
        }
        if self.squad_size == 0 {
            return Err(TrackerError::InvalidConfig(
                "squad size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_secs(&self) -> u32 {
        self.period_length_secs.saturating_mul(self.format.count())
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn side_for_team(&self, name: &str) -> Option<Side> {
        if name.eq_ignore_ascii_case(&self.home_team) {
            Some(Side::Home)
        } else if name.eq_ignore_ascii_case(&self.away_team) {
            Some(Side::Away)
        } else {
            None
        }
    }
}
