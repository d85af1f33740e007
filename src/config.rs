//! Engine configuration: every site-specific constant of the extraction
//! pipeline, loadable from TOML.
//!
//! ```toml
//! numbering = "monday-first"
//! dedup = "strict"
//! room_pattern = 'C\d\d-\d?\w?.\d\d'
//!
//! [weekdays]
//! first = "Sun"
//! names = [["So"], ["Mo"], ["Di"], ["Mi"], ["Do"], ["Fr"], ["Sa"]]
//! ```
use crate::aggregate::DedupKey;
use crate::calendar::WeekNumbering;
use crate::calendar::WeekdayTable;
use crate::error::TimetableError;
use crate::expand::RoomMatcher;
use crate::extract::TimeLabelParser;
use crate::header::HeaderParser;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors related to invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Weekday table is empty")]
    EmptyWeekdayTable,

    #[error("Weekday table has {0} entries, at most 7 are allowed")]
    TooManyWeekdays(usize),

    #[error("Rollover week {0} must be at least 53")]
    InvalidRolloverWeek(u32),

    #[error("Invalid {name} '{pattern}': {message}")]
    InvalidPattern {
        name: &'static str,
        pattern: String,
        message: String,
    },
}

fn default_rollover_week() -> u32 {
    53
}

fn default_lab_markers() -> Vec<String> {
    vec!["-ÜL".to_owned(), "ÜL-".to_owned()]
}

fn default_exercise_markers() -> Vec<String> {
    vec!["-Ü".to_owned(), "Ü-".to_owned()]
}

fn default_room_pattern() -> String {
    RoomMatcher::DEFAULT_PATTERN.to_owned()
}

fn default_header_pattern() -> String {
    HeaderParser::DEFAULT_PATTERN.to_owned()
}

fn default_time_pattern() -> String {
    TimeLabelParser::DEFAULT_PATTERN.to_owned()
}

/// Extraction engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weekday ordering used to resolve day labels
    pub weekdays: WeekdayTable,
    /// How week numbers map to dates
    pub numbering: WeekNumbering,
    /// Weeks at or above this number belong to the following year
    #[serde(default = "default_rollover_week")]
    pub rollover_week: u32,
    /// Substrings marking a lab (checked first)
    #[serde(default = "default_lab_markers")]
    pub lab_markers: Vec<String>,
    /// Substrings marking an exercise
    #[serde(default = "default_exercise_markers")]
    pub exercise_markers: Vec<String>,
    /// Room numbers inside free text
    #[serde(default = "default_room_pattern")]
    pub room_pattern: String,
    /// Page title pattern capturing degree, semester, group and degree suffix
    #[serde(default = "default_header_pattern")]
    pub header_pattern: String,
    /// Clock time pattern with `hour`, `minute` and optional `second` groups
    #[serde(default = "default_time_pattern")]
    pub time_pattern: String,
    /// Event duplicate detection
    pub dedup: DedupKey,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weekdays: WeekdayTable::default(),
            numbering: WeekNumbering::default(),
            rollover_week: default_rollover_week(),
            lab_markers: default_lab_markers(),
            exercise_markers: default_exercise_markers(),
            room_pattern: default_room_pattern(),
            header_pattern: default_header_pattern(),
            time_pattern: default_time_pattern(),
            dedup: DedupKey::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(value: &str) -> Result<Self, TimetableError> {
        let config: EngineConfig = toml::from_str(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TimetableError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks value ranges and that every pattern compiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weekdays.is_empty() {
            return Err(ConfigError::EmptyWeekdayTable);
        }
        if self.weekdays.len() > 7 {
            return Err(ConfigError::TooManyWeekdays(self.weekdays.len()));
        }
        if self.rollover_week < 53 {
            return Err(ConfigError::InvalidRolloverWeek(self.rollover_week));
        }
        compile("room pattern", &self.room_pattern)?;
        compile("header pattern", &self.header_pattern)?;
        let time_pattern = compile("time pattern", &self.time_pattern)?;
        for group in ["hour", "minute"] {
            if !time_pattern.capture_names().flatten().any(|name| name == group) {
                return Err(ConfigError::InvalidPattern {
                    name: "time pattern",
                    pattern: self.time_pattern.to_owned(),
                    message: format!("missing group '{group}'"),
                });
            }
        }
        Ok(())
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|error| ConfigError::InvalidPattern {
        name,
        pattern: pattern.to_owned(),
        message: error.to_string(),
    })
}
