//! Time utilities
//!
//! Conversions between wall-clock instants, elapsed seconds and the display
//! strings used by the ledger. Everything in here is pure apart from the
//! [`Clock`] implementations, which are the only place the crate reads the
//! real time.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::period::Period;

pub const SECS_PER_DAY: u32 = 24 * 60 * 60;

/// Seconds of play completed before `period` kicked off.
pub fn previous_periods_offset_secs(period: Period, period_length_secs: u32) -> u32 {
    period_length_secs.saturating_mul(period.ordinal())
}

/// Cumulative match seconds at which `period` is nominally over.
pub fn period_end_secs(period: Period, period_length_secs: u32) -> u32 {
    previous_periods_offset_secs(period, period_length_secs).saturating_add(period_length_secs)
}

/// Whole seconds between two millisecond instants. Clock skew that puts
/// `now` before `start` reads as zero.
pub fn elapsed_seconds(start_ms: i64, now_ms: i64) -> u32 {
    let delta = now_ms.saturating_sub(start_ms);
    if delta <= 0 {
        return 0;
    }
    u32::try_from(delta / 1000).unwrap_or(u32::MAX)
}

/// Running match clock, e.g. `"25:42"` in the second quarter of a 20 minute
/// quarter game. Minutes keep counting past 60.
pub fn cumulative_display(period: Period, elapsed_secs: u32, period_length_secs: u32) -> String {
    format_mmss(previous_periods_offset_secs(period, period_length_secs) + elapsed_secs)
}

/// 1-based match minute for an event at `cumulative_secs`.
///
/// Capped at the last minute of `period`, so a goal logged on or after the
/// whistle stays in the period it belongs to.
pub fn match_minute(cumulative_secs: u32, period: Period, period_length_secs: u32) -> u32 {
    let minute = cumulative_secs / 60 + 1;
    let cap = period_end_secs(period, period_length_secs).div_ceil(60);
    minute.min(cap)
}

/// `HH:MM:SS`, hours unbounded.
pub fn format_hms(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// `MM:SS` with minutes allowed to exceed 60.
pub fn format_mmss(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Parses `HH:MM:SS` or `MM:SS` into seconds. Values too large for `u32`
/// read as `None`.
pub fn parse_duration(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let nums: Option<Vec<u32>> = parts.iter().map(|p| p.parse::<u32>().ok()).collect();
    match nums?.as_slice() {
        [m, s] if *s < 60 => m.checked_mul(60)?.checked_add(*s),
        [h, m, s] if *m < 60 && *s < 60 => h
            .checked_mul(3600)?
            .checked_add(m * 60)?
            .checked_add(*s),
        _ => None,
    }
}

/// Wall-clock time of day with second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub fn from_secs(secs: u32) -> Self {
        TimeOfDay(secs % SECS_PER_DAY)
    }

    pub fn from_hms(hours: u32, minutes: u32, secs: u32) -> Self {
        Self::from_secs(hours * 3600 + minutes * 60 + secs)
    }

    pub fn secs_from_midnight(self) -> u32 {
        self.0
    }

    /// Adds seconds, wrapping past midnight.
    pub fn plus_secs(self, secs: u32) -> Self {
        Self::from_secs((self.0 + secs % SECS_PER_DAY) % SECS_PER_DAY)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        if parts.len() != 3 {
            return None;
        }
        let h: u32 = parts[0].parse().ok()?;
        let m: u32 = parts[1].parse().ok()?;
        let s: u32 = parts[2].parse().ok()?;
        if h >= 24 || m >= 60 || s >= 60 {
            return None;
        }
        Some(Self::from_hms(h, m, s))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            (self.0 % 3600) / 60,
            self.0 % 60
        )
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeOfDay::parse(&value).ok_or_else(|| format!("invalid time of day: {}", value))
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Source of wall-clock readings.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Local time of day, used for human-readable event stamps.
    fn time_of_day(&self) -> TimeOfDay;
}

/// Reads the system clock through chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_secs(chrono::Local::now().num_seconds_from_midnight())
    }
}

/// Hand-driven clock for tests and replays. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Rc<Cell<i64>>,
    base_ms: i64,
    base_time: TimeOfDay,
}

impl ManualClock {
    /// Starts at `base_ms`, which is shown as `base_time` on the wall.
    pub fn new(base_ms: i64, base_time: TimeOfDay) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(base_ms)),
            base_ms,
            base_time,
        }
    }

    /// A clock reading 18:00:00 at an arbitrary fixed epoch instant.
    pub fn at_kickoff() -> Self {
        Self::new(1_700_000_000_000, TimeOfDay::from_hms(18, 0, 0))
    }

    pub fn advance_secs(&self, secs: u32) {
        self.advance_ms(i64::from(secs) * 1000);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_ms(&self, ms: i64) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }

    fn time_of_day(&self) -> TimeOfDay {
        let delta = self.now_ms.get() - self.base_ms;
        let offset = delta.div_euclid(1000).rem_euclid(i64::from(SECS_PER_DAY)) as u32;
        self.base_time.plus_secs(offset)
    }
}
