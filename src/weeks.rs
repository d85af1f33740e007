use crate::error::TimetableError;
use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;

/// Errors related to week-number list parsing.
#[derive(Error, Debug)]
pub enum WeekSetError {
    #[error("Invalid week number '{0}'")]
    FormatError(String),

    #[error("Invalid week range '{start}-{end}': start is after end")]
    DescendingRange { start: u32, end: u32 },
}

/// Highest accepted week number: the last week the rollover can still map
/// into the following year.
pub const MAX_WEEK: u32 = 53 + 52;

/// Ordered set of distinct academic week numbers.
///
/// Iteration follows first-seen order of the expanded tokens, so
/// `"10,3-4"` iterates as `10, 3, 4`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeekSet {
    weeks: Vec<u32>,
}

impl WeekSet {
    /// Returns true if the set holds no week at all.
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn contains(&self, week: u32) -> bool {
        self.weeks.contains(&week)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.weeks.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.weeks
    }
}

impl TryFrom<&str> for WeekSet {
    type Error = TimetableError;

    /// Parses a comma separated week list (e.g. "3,5-8,10").
    /// Blank input is a valid empty set.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut weeks = Vec::<u32>::new();
        let mut seen = HashSet::<u32>::new();
        if value.trim().is_empty() {
            return Ok(WeekSet { weeks });
        }
        for token in value.split(',').map(str::trim) {
            let (start, end) = match token.split_once('-') {
                Some((start, end)) => (parse_week(start)?, parse_week(end)?),
                None => {
                    let week = parse_week(token)?;
                    (week, week)
                }
            };
            if start > end {
                Err(WeekSetError::DescendingRange { start, end })?;
            }
            for week in start..=end {
                if seen.insert(week) {
                    weeks.push(week);
                }
            }
        }
        Ok(WeekSet { weeks })
    }
}

impl Display for WeekSet {
    /// Formats the set back into compact range notation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::<String>::new();
        let mut index = 0;
        while index < self.weeks.len() {
            let start = self.weeks[index];
            let mut end = start;
            while index + 1 < self.weeks.len() && end.checked_add(1) == Some(self.weeks[index + 1]) {
                end += 1;
                index += 1;
            }
            if start == end {
                parts.push(start.to_string());
            } else {
                parts.push(format!("{start}-{end}"));
            }
            index += 1;
        }
        write!(f, "{}", parts.join(","))
    }
}

/// Parses a single week number in `1..=MAX_WEEK`.
fn parse_week(token: &str) -> Result<u32, WeekSetError> {
    let token = token.trim();
    token
        .parse::<u32>()
        .ok()
        .filter(|week| (1..=MAX_WEEK).contains(week))
        .ok_or_else(|| WeekSetError::FormatError(token.to_owned()))
}
