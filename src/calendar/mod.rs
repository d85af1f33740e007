//! # Calendar Date Builder
//!
//! Turns grid-relative coordinates (semester year, academic week number,
//! weekday label, clock time) into naive local timestamps.
//!
//! Institutions number the last week of a year above the calendar maximum
//! (week 53, 54, …) instead of restarting at week 1. Any week at or above the
//! configured rollover week is therefore moved into the following year by
//! subtracting 52.
pub mod weekday;

pub use weekday::WeekdayTable;

use crate::error::TimetableError;
use chrono::Datelike;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Weekday;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Errors related to calendar arithmetic and date/time literals.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("Week {week} of {year} has no {weekday}")]
    InvalidDate { year: i32, week: u32, weekday: Weekday },

    #[error("Invalid clock time '{0}'")]
    InvalidClock(String),

    #[error("Cannot read year from semester '{0}'")]
    InvalidSemester(String),
}

/// Week numbering convention of the source documents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeekNumbering {
    /// Week 1 starts on the first Monday of the year, days before it are week 0
    #[default]
    MondayFirst,
    /// ISO 8601 weeks (week 1 contains the first Thursday)
    Iso,
}

/// Builds concrete timestamps from week-relative coordinates.
#[derive(Clone, Debug)]
pub struct DateBuilder {
    weekdays: WeekdayTable,
    numbering: WeekNumbering,
    rollover_week: u32,
}

impl DateBuilder {
    pub fn new(weekdays: WeekdayTable, numbering: WeekNumbering, rollover_week: u32) -> Self {
        Self {
            weekdays,
            numbering,
            rollover_week,
        }
    }

    pub fn weekdays(&self) -> &WeekdayTable {
        &self.weekdays
    }

    /// Builds the timestamp of `clock` on the day named `weekday_name` in
    /// week `week` of `year`.
    ///
    /// # Errors
    ///
    /// Returns a `DateRange` error when the weekday label is missing from the
    /// ordering table or the week has no such day.
    pub fn build(
        &self,
        year: i32,
        week: u32,
        weekday_name: &str,
        clock: NaiveTime,
    ) -> Result<NaiveDateTime, TimetableError> {
        let weekday = self
            .weekdays
            .resolve(weekday_name)
            .ok_or_else(|| CalendarError::UnknownWeekday(weekday_name.trim().to_owned()))?;
        Ok(self.date(year, week, weekday)?.and_time(clock))
    }

    /// Resolves the calendar date of a weekday within an academic week.
    pub fn date(&self, year: i32, week: u32, weekday: Weekday) -> Result<NaiveDate, CalendarError> {
        let (year, week) = if week >= self.rollover_week {
            let next = year
                .checked_add(1)
                .ok_or(CalendarError::InvalidDate { year, week, weekday })?;
            (next, week - 52)
        } else {
            (year, week)
        };
        let date = match self.numbering {
            WeekNumbering::MondayFirst => monday_first_date(year, week, weekday),
            WeekNumbering::Iso => NaiveDate::from_isoywd_opt(year, week, weekday),
        };
        date.ok_or(CalendarError::InvalidDate { year, week, weekday })
    }
}

impl Default for DateBuilder {
    fn default() -> Self {
        Self::new(WeekdayTable::default(), WeekNumbering::default(), 53)
    }
}

/// Monday-based week numbering: week 0 holds the days before the first Monday.
fn monday_first_date(year: i32, week: u32, weekday: Weekday) -> Option<NaiveDate> {
    let new_year = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let first_weekday = new_year.weekday().num_days_from_monday() as i64;
    let day_of_week = weekday.num_days_from_monday() as i64;
    let offset = if week == 0 {
        day_of_week - first_weekday
    } else {
        let week_zero_length = (7 - first_weekday) % 7;
        week_zero_length + 7 * (week as i64 - 1) + day_of_week
    };
    new_year.checked_add_signed(Duration::days(offset))
}

/// Parses a clock label such as "08:00" or "08:00:00".
pub fn parse_clock(value: &str) -> Result<NaiveTime, CalendarError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| CalendarError::InvalidClock(value.to_owned()))
}

/// Reads the starting year from a semester label ("SS 2023", "WS 2023/24").
pub fn parse_year(semester: &str) -> Result<i32, CalendarError> {
    semester
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.split('/').next())
        .and_then(|year| year.parse::<i32>().ok())
        .ok_or_else(|| CalendarError::InvalidSemester(semester.trim().to_owned()))
}
