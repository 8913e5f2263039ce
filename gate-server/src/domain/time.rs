//! Clock time handling for live-station boards.
//!
//! The live-station site shows times as "HH:MM" strings with no date. A
//! board is only ever read for the next couple of hours, so a time that is
//! already behind "now" is taken to mean the same clock time tomorrow.

use std::fmt;

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel the boards use for a missing arrival or departure time.
pub const UNKNOWN_TIME: &str = "Unknown";

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time with minute precision.
///
/// # Examples
///
/// ```
/// use gate_server::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(t.to_string(), "14:30");
///
/// assert!(ClockTime::parse_hhmm("1430").is_err());
/// assert!(ClockTime::parse_hhmm("24:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse a time from strict "HH:MM" (24-hour) format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Build from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Truncate a datetime to its clock time (seconds are dropped).
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        // hour/minute come from a valid time, so this cannot fail
        Self(NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Place this clock time on or after `now`.
    ///
    /// The time is first put on `now`'s date; if that is earlier than `now`
    /// it is moved forward by one day. A train due at 00:15 seen at 23:50 is
    /// therefore 25 minutes away, not 23 hours 35 minutes in the past.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use gate_server::domain::ClockTime;
    ///
    /// let now = NaiveDate::from_ymd_opt(2024, 3, 15)
    ///     .unwrap()
    ///     .and_hms_opt(23, 50, 0)
    ///     .unwrap();
    /// let next = ClockTime::parse_hhmm("00:15").unwrap().next_occurrence(now);
    /// assert_eq!(next.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    /// ```
    pub fn next_occurrence(&self, now: NaiveDateTime) -> NaiveDateTime {
        let same_day = now.date().and_time(self.0);
        if same_day < now {
            same_day + Duration::days(1)
        } else {
            same_day
        }
    }

    /// Whole minutes from `now` until the next occurrence of this time.
    ///
    /// Always non-negative. Partial minutes are truncated.
    pub fn minutes_until(&self, now: NaiveDateTime) -> i64 {
        self.next_occurrence(now)
            .signed_duration_since(now)
            .num_minutes()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

/// A board time that may be absent.
///
/// Serializes as "HH:MM" or the literal `"Unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScheduleTime {
    At(ClockTime),
    #[default]
    Unknown,
}

impl ScheduleTime {
    /// The clock time, if known.
    pub fn clock(&self) -> Option<ClockTime> {
        match self {
            ScheduleTime::At(t) => Some(*t),
            ScheduleTime::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ScheduleTime::Unknown)
    }
}

impl From<Option<ClockTime>> for ScheduleTime {
    fn from(t: Option<ClockTime>) -> Self {
        t.map_or(ScheduleTime::Unknown, ScheduleTime::At)
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleTime::At(t) => t.fmt(f),
            ScheduleTime::Unknown => f.write_str(UNKNOWN_TIME),
        }
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == UNKNOWN_TIME {
            return Ok(ScheduleTime::Unknown);
        }
        ClockTime::parse_hhmm(&s)
            .map(ScheduleTime::At)
            .map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        /// The next occurrence is never before now and never a full day away.
        #[test]
        fn next_occurrence_within_one_day(
            h in 0u32..24, m in 0u32..60,
            nh in 0u32..24, nm in 0u32..60, ns in 0u32..60,
        ) {
            let now = NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(nh, nm, ns)
                .unwrap();
            let t = ClockTime::from_hm(h, m).unwrap();
            let next = t.next_occurrence(now);
            prop_assert!(next >= now);
            prop_assert!(next - now < Duration::days(1));
            prop_assert_eq!(ClockTime::from_datetime(next), t);
        }

        /// Display then parse returns the same time.
        #[test]
        fn display_parse_roundtrip(h in 0u32..24, m in 0u32..60) {
            let t = ClockTime::from_hm(h, m).unwrap();
            prop_assert_eq!(ClockTime::parse_hhmm(&t.to_string()).unwrap(), t);
        }
    }
}
