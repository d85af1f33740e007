use crate::calendar::CalendarError;
use crate::extract::TimelineError;
use thiserror::Error;

/// Coarse error classification shared by every pipeline stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed week list, time label, semester or header text
    Format,
    /// A date or time range that cannot exist
    DateRange,
    /// A page or document that cannot be read as a timetable at all
    Structural,
    /// Invalid engine configuration
    Config,
    Io,
}

/// Main error type of the timetable engine.
/// Aggregates errors from the standard library, dependencies and internal modules.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("{message}: {source}")]
    WithContextError {
        message: String,
        source: Box<TimetableError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    RegexError(#[from] regex::Error),

    #[error("{0}")]
    TomlError(#[from] toml::de::Error),

    // Internal module errors
    #[error("{0}")]
    WeekSetError(#[from] crate::weeks::WeekSetError),

    #[error("{0}")]
    CalendarError(#[from] CalendarError),

    #[error("{0}")]
    TimelineError(#[from] TimelineError),

    #[error("{0}")]
    HeaderError(#[from] crate::header::HeaderError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),

    #[error("{0}")]
    DocumentError(#[from] crate::engine::DocumentError),
}

impl TimetableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimetableError::WithContextError { source, .. } => source.kind(),
            TimetableError::IoError(_) => ErrorKind::Io,
            TimetableError::RegexError(_) | TimetableError::TomlError(_) | TimetableError::ConfigError(_) => {
                ErrorKind::Config
            }
            TimetableError::WeekSetError(_) | TimetableError::HeaderError(_) => ErrorKind::Format,
            TimetableError::CalendarError(error) => match error {
                CalendarError::UnknownWeekday(_) | CalendarError::InvalidDate { .. } => ErrorKind::DateRange,
                CalendarError::InvalidClock(_) | CalendarError::InvalidSemester(_) => ErrorKind::Format,
            },
            TimetableError::TimelineError(error) => match error {
                TimelineError::InvalidLabel(_) | TimelineError::MissingLabels => ErrorKind::Format,
                TimelineError::SlotOutOfRange { .. }
                | TimelineError::MissingSlotEnd { .. }
                | TimelineError::EmptyRange { .. } => ErrorKind::DateRange,
            },
            TimetableError::DocumentError(_) => ErrorKind::Structural,
        }
    }
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TimetableError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TimetableError::WithContextError {
            message: message.to_owned(),
            source: Box::new(e),
        })
    }
}
