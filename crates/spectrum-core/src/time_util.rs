//! Wall-clock labels and the mission-elapsed clock.
//!
//! Sample timestamps are deliberately low-resolution local time labels
//! (`"14:03:27"`), not epoch values. The mission clock renders the time since
//! a configurable epoch as `HH:MM:SS` in one of two modes:
//!
//! - [`ClockMode::FieldWise`] subtracts the hour, minute and second fields
//!   independently (hours also absorb the day-of-month delta). Negative
//!   fields are not borrowed, so `10:50:30 → 11:10:10` reads `01:-40:-20`.
//! - [`ClockMode::Duration`] renders the true elapsed duration.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, Days, Local, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::error::SpectrumError;

/// Label used before anything has been ingested.
pub const NO_UPDATE_LABEL: &str = "--:--:--";

/// Default `chrono` format for sample timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Current local time rendered with `format`.
///
/// An invalid format string falls back to [`DEFAULT_TIMESTAMP_FORMAT`]
/// instead of panicking inside `chrono`'s `Display` impl.
pub fn timestamp_label(format: &str) -> String {
    format_local(Local::now().naive_local(), format)
}

pub fn format_local(at: NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", at.format(DEFAULT_TIMESTAMP_FORMAT));
    }
    out
}

/// How elapsed mission time is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    #[default]
    FieldWise,
    Duration,
}

/// Where the mission clock counts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionEpoch {
    /// Local midnight of the previous day, resolved once at startup.
    Yesterday,
    /// A fixed instant, converted to local wall-clock time.
    At(DateTime<chrono::FixedOffset>),
}

impl MissionEpoch {
    /// Parse `"yesterday"` or an RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, SpectrumError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("yesterday") {
            return Ok(Self::Yesterday);
        }
        DateTime::parse_from_rfc3339(s)
            .map(Self::At)
            .map_err(|e| SpectrumError::Config(format!("invalid clock epoch '{s}': {e}")))
    }

    /// Local wall-clock instant of the epoch, relative to `now`.
    pub fn resolve(self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Yesterday => {
                let day = now.date().checked_sub_days(Days::new(1)).unwrap_or(now.date());
                day.and_time(chrono::NaiveTime::MIN)
            }
            Self::At(dt) => dt.with_timezone(&Local).naive_local(),
        }
    }
}

/// Mission-elapsed clock anchored at a fixed local epoch.
#[derive(Debug, Clone)]
pub struct MissionClock {
    epoch: NaiveDateTime,
    mode: ClockMode,
}

impl MissionClock {
    pub fn new(epoch: NaiveDateTime, mode: ClockMode) -> Self {
        Self { epoch, mode }
    }

    /// Resolve `epoch` against the current local time.
    pub fn starting_now(epoch: MissionEpoch, mode: ClockMode) -> Self {
        Self::new(epoch.resolve(Local::now().naive_local()), mode)
    }

    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Elapsed string at the current local time.
    pub fn render_now(&self) -> String {
        self.render_at(Local::now().naive_local())
    }

    /// Elapsed string at `now`.
    pub fn render_at(&self, now: NaiveDateTime) -> String {
        match self.mode {
            ClockMode::FieldWise => field_wise(self.epoch, now),
            ClockMode::Duration => true_duration(self.epoch, now),
        }
    }
}

fn field_wise(epoch: NaiveDateTime, now: NaiveDateTime) -> String {
    let hours = i64::from(now.hour()) - i64::from(epoch.hour())
        + (i64::from(now.day()) - i64::from(epoch.day())) * 24;
    let minutes = i64::from(now.minute()) - i64::from(epoch.minute());
    let seconds = i64::from(now.second()) - i64::from(epoch.second());
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn true_duration(epoch: NaiveDateTime, now: NaiveDateTime) -> String {
    let secs = (now - epoch).num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .and_then(|date| date.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn field_wise_matches_plain_subtraction() {
        let clock = MissionClock::new(at(10, 0, 0, 0), ClockMode::FieldWise);
        assert_eq!(clock.render_at(at(11, 3, 4, 5)), "27:04:05");
        assert_eq!(clock.render_at(at(10, 0, 0, 9)), "00:00:09");
    }

    #[test]
    fn field_wise_does_not_borrow() {
        let clock = MissionClock::new(at(10, 10, 50, 30), ClockMode::FieldWise);
        assert_eq!(clock.render_at(at(10, 11, 10, 10)), "01:-40:-20");
        assert_eq!(clock.render_at(at(10, 10, 50, 25)), "00:00:-5");
    }

    #[test]
    fn duration_mode_borrows() {
        let clock = MissionClock::new(at(10, 10, 50, 30), ClockMode::Duration);
        assert_eq!(clock.render_at(at(10, 11, 10, 10)), "00:19:40");
        assert_eq!(clock.render_at(at(12, 10, 50, 30)), "48:00:00");
        assert_eq!(clock.render_at(at(9, 0, 0, 0)), "00:00:00");
    }

    #[test]
    fn yesterday_epoch_is_previous_midnight() {
        let epoch = MissionEpoch::Yesterday.resolve(at(10, 15, 30, 0));
        assert_eq!(epoch, at(9, 0, 0, 0));
        let clock = MissionClock::new(epoch, ClockMode::FieldWise);
        assert_eq!(clock.render_at(at(10, 15, 30, 0)), "39:30:00");
    }

    #[test]
    fn epoch_parsing() {
        assert_eq!(MissionEpoch::parse("Yesterday").unwrap(), MissionEpoch::Yesterday);
        assert!(matches!(
            MissionEpoch::parse("2023-06-01T08:00:00+02:00"),
            Ok(MissionEpoch::At(_))
        ));
        assert!(MissionEpoch::parse("last tuesday").is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(format_local(at(10, 9, 5, 7), DEFAULT_TIMESTAMP_FORMAT), "09:05:07");
        assert_eq!(format_local(at(10, 9, 5, 7), "%Q"), "09:05:07");
    }
}
