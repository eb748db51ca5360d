//! Period labels and match formats.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackerError;

/// One timed segment of a match.
///
/// Quarters, halves and the single-period format never mix within a match;
/// [`PeriodFormat`] decides which labels are in play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Q1,
    Q2,
    Q3,
    Q4,
    H1,
    H2,
    P1,
}

impl Period {
    /// Zero-based position of the period within its own format.
    pub fn ordinal(self) -> u32 {
        match self {
            Period::Q1 | Period::H1 | Period::P1 => 0,
            Period::Q2 | Period::H2 => 1,
            Period::Q3 => 2,
            Period::Q4 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Q1 => "Q1",
            Period::Q2 => "Q2",
            Period::Q3 => "Q3",
            Period::Q4 => "Q4",
            Period::H1 => "H1",
            Period::H2 => "H2",
            Period::P1 => "P1",
        }
    }

    /// Long form used in headings, e.g. "Quarter 2".
    pub fn display_name(self) -> String {
        let kind = match self {
            Period::Q1 | Period::Q2 | Period::Q3 | Period::Q4 => "Quarter",
            Period::H1 | Period::H2 => "Half",
            Period::P1 => "Period",
        };
        format!("{} {}", kind, self.ordinal() + 1)
    }

    pub fn parse(label: &str) -> Option<Period> {
        match label.trim().to_ascii_uppercase().as_str() {
            "Q1" => Some(Period::Q1),
            "Q2" => Some(Period::Q2),
            "Q3" => Some(Period::Q3),
            "Q4" => Some(Period::Q4),
            "H1" => Some(Period::H1),
            "H2" => Some(Period::H2),
            "P1" => Some(Period::P1),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many periods a match is split into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFormat {
    Single,
    Halves,
    Quarters,
}

const SINGLE: [Period; 1] = [Period::P1];
const HALVES: [Period; 2] = [Period::H1, Period::H2];
const QUARTERS: [Period; 4] = [Period::Q1, Period::Q2, Period::Q3, Period::Q4];

impl PeriodFormat {
    pub fn from_count(count: u8) -> Result<Self, TrackerError> {
        match count {
            1 => Ok(PeriodFormat::Single),
            2 => Ok(PeriodFormat::Halves),
            4 => Ok(PeriodFormat::Quarters),
            other => Err(TrackerError::InvalidConfig(format!(
                "period count must be 1, 2 or 4, got {}",
                other
            ))),
        }
    }

    /// Periods in playing order.
    pub fn periods(self) -> &'static [Period] {
        match self {
            PeriodFormat::Single => &SINGLE,
            PeriodFormat::Halves => &HALVES,
            PeriodFormat::Quarters => &QUARTERS,
        }
    }

    pub fn count(self) -> u32 {
        self.periods().len() as u32
    }

    pub fn contains(self, period: Period) -> bool {
        self.periods().contains(&period)
    }

    pub fn first(self) -> Period {
        self.periods()[0]
    }

    pub fn last(self) -> Period {
        self.periods()[self.periods().len() - 1]
    }

    pub fn is_final(self, period: Period) -> bool {
        self.last() == period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_playing_order() {
        for format in [PeriodFormat::Single, PeriodFormat::Halves, PeriodFormat::Quarters] {
            for (idx, period) in format.periods().iter().enumerate() {
                assert_eq!(period.ordinal(), idx as u32);
            }
        }
    }

    #[test]
    fn test_from_count_rejects_three() {
        assert_eq!(PeriodFormat::from_count(4).unwrap(), PeriodFormat::Quarters);
        assert!(matches!(
            PeriodFormat::from_count(3),
            Err(TrackerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Period::Q3.display_name(), "Quarter 3");
        assert_eq!(Period::H2.display_name(), "Half 2");
        assert_eq!(Period::P1.display_name(), "Period 1");
        assert_eq!(Period::parse("h2"), Some(Period::H2));
        assert_eq!(Period::parse("X9"), None);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Period::Q2).unwrap();
        assert_eq!(json, "\"Q2\"");
    }
}
