use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("finish {finish} is earlier than start {start}")]
    Reversed { start: String, finish: String },
    #[error("invalid timestamp '{input}'")]
    InvalidTimestamp { input: String },
}

/// Elapsed calendar time, broken into the units of the Gregorian calendar.
///
/// Rendered as `P{years}Y{months}M{days}DT{hours}H{minutes}M{seconds}S`
/// with unpadded numbers, zero components included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDuration {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarDuration {
    /// Component-wise `finish - start` with one borrow per unit, smallest
    /// unit first. A day borrow adds the length of the month before
    /// `finish`'s month.
    ///
    /// Expects `finish >= start`. Reversed input is computed mechanically and
    /// the components carry no coherent sign; use
    /// [`CalendarDuration::checked_between`] to reject it instead.
    pub fn between<T>(start: &T, finish: &T) -> Self
    where
        T: Datelike + Timelike,
    {
        let mut years = i64::from(finish.year()) - i64::from(start.year());
        let mut months = i64::from(finish.month0()) - i64::from(start.month0());
        let mut days = i64::from(finish.day()) - i64::from(start.day());
        let mut hours = i64::from(finish.hour()) - i64::from(start.hour());
        let mut minutes = i64::from(finish.minute()) - i64::from(start.minute());
        let mut seconds = i64::from(finish.second()) - i64::from(start.second());

        if seconds < 0 {
            seconds += 60;
            minutes -= 1;
        }
        if minutes < 0 {
            minutes += 60;
            hours -= 1;
        }
        if hours < 0 {
            hours += 24;
            days -= 1;
        }
        if days < 0 {
            days += days_in_previous_month(finish.year(), finish.month());
            months -= 1;
        }
        if months < 0 {
            months += 12;
            years -= 1;
        }

        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub fn checked_between<T>(start: &T, finish: &T) -> Result<Self, DurationError>
    where
        T: Datelike + Timelike + PartialOrd + fmt::Display,
    {
        if finish < start {
            return Err(DurationError::Reversed {
                start: start.to_string(),
                finish: finish.to_string(),
            });
        }
        Ok(Self::between(start, finish))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{}Y{}M{}DT{}H{}M{}S",
            self.years, self.months, self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Shorthand for [`CalendarDuration::between`].
pub fn duration_between<T>(start: &T, finish: &T) -> CalendarDuration
where
    T: Datelike + Timelike,
{
    CalendarDuration::between(start, finish)
}

/// Day count of the month preceding `month` (1-based) of `year`.
fn days_in_previous_month(year: i32, month: u32) -> i64 {
    let (year, month) = if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}
