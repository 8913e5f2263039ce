//! The near-term window: how far ahead a train counts as relevant.

use chrono::NaiveDateTime;

use crate::domain::{ClockTime, UNKNOWN_TIME};
use crate::extract::extract_time;

/// Default look-ahead horizon in minutes.
pub const DEFAULT_WINDOW_MINS: i64 = 120;

/// A look-ahead horizon starting at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearTermWindow {
    minutes: i64,
}

impl NearTermWindow {
    pub fn new(minutes: i64) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    /// True iff the next occurrence of `time` is 0 to `minutes` minutes away.
    pub fn contains(&self, time: ClockTime, now: NaiveDateTime) -> bool {
        let until = time.minutes_until(now);
        (0..=self.minutes).contains(&until)
    }
}

impl Default for NearTermWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MINS)
    }
}

/// Check whether a board time string falls inside the window from `now`.
///
/// The literal `"Unknown"` is never inside the window. Other text is scanned
/// for an `HH:MM` time; text without one is treated as outside.
///
/// ```
/// use chrono::NaiveDate;
/// use gate_server::window::is_within_window;
///
/// let now = NaiveDate::from_ymd_opt(2024, 3, 15)
///     .unwrap()
///     .and_hms_opt(23, 30, 0)
///     .unwrap();
/// assert!(is_within_window("00:45", now, 120));
/// assert!(!is_within_window("02:00", now, 120));
/// assert!(!is_within_window("Unknown", now, 120));
/// ```
pub fn is_within_window(time_str: &str, now: NaiveDateTime, window_minutes: i64) -> bool {
    if time_str == UNKNOWN_TIME {
        return false;
    }
    extract_time(time_str)
        .is_some_and(|t| NearTermWindow::new(window_minutes).contains(t, now))
}
