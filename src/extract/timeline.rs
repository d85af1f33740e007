use chrono::NaiveTime;
use regex::Captures;
use regex::Regex;
use thiserror::Error;

/// Errors related to slot time labels and slot-to-clock resolution.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Invalid time label '{0}'")]
    InvalidLabel(String),

    #[error("Missing time label row")]
    MissingLabels,

    #[error("Slot {index} is outside the {slots} known time slots")]
    SlotOutOfRange { index: usize, slots: usize },

    #[error("Cannot determine when slot {index} ends")]
    MissingSlotEnd { index: usize },

    #[error("Slot range ends at {end} before it starts at {start}")]
    EmptyRange { start: NaiveTime, end: NaiveTime },
}

/// A time slot: its start clock time and, for range labels, its end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: Option<NaiveTime>) -> Self {
        Self { start, end }
    }
}

/// Parses slot labels ("08:00", "08:00 - 08:45", "8.15") into time slots.
///
/// The pattern must define `hour` and `minute` groups and may define a
/// `second` group. The first match is the slot start, a second match the
/// slot end.
#[derive(Clone, Debug)]
pub struct TimeLabelParser {
    pattern: Regex,
}

impl TimeLabelParser {
    pub const DEFAULT_PATTERN: &'static str =
        r"(?P<hour>\d{1,2})[:.](?P<minute>\d{2})(?:[:.](?P<second>\d{2}))?";

    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn parse(&self, label: &str) -> Result<TimeSlot, TimelineError> {
        let invalid = || TimelineError::InvalidLabel(label.trim().to_owned());
        let mut times = self.pattern.captures_iter(label).map(|captures| to_time(&captures));
        let start = times.next().flatten().ok_or_else(invalid)?;
        let end = match times.next() {
            Some(time) => Some(time.ok_or_else(invalid)?),
            None => None,
        };
        Ok(TimeSlot::new(start, end))
    }

    pub fn parse_all<'a, I>(&self, labels: I) -> Result<Timeline, TimelineError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let slots = labels
            .into_iter()
            .map(|label| self.parse(label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Timeline::new(slots))
    }
}

impl Default for TimeLabelParser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN).expect("Hardcode regex pattern")
    }
}

fn to_time(captures: &Captures) -> Option<NaiveTime> {
    let number = |name: &str| -> Option<u32> {
        match captures.name(name) {
            Some(matcher) => matcher.as_str().parse().ok(),
            None => Some(0),
        }
    };
    captures.name("hour")?;
    captures.name("minute")?;
    NaiveTime::from_hms_opt(number("hour")?, number("minute")?, number("second")?)
}

/// Ordered time slots of a page, mapping block slot indexes to clock times.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timeline {
    slots: Vec<TimeSlot>,
}

impl Timeline {
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Resolves the clock range covered by slots `start..end`.
    ///
    /// The end is the last covered slot's own end when its label is a
    /// range, otherwise the start of the following slot. Past the last slot
    /// the previous slot length is repeated.
    pub fn resolve(&self, start: usize, end: usize) -> Result<(NaiveTime, NaiveTime), TimelineError> {
        let slots = self.slots.len();
        let first = self
            .slots
            .get(start)
            .ok_or(TimelineError::SlotOutOfRange { index: start, slots })?;
        if end <= start {
            return Err(TimelineError::EmptyRange { start: first.start, end: first.start });
        }
        let last = self
            .slots
            .get(end - 1)
            .ok_or(TimelineError::SlotOutOfRange { index: end - 1, slots })?;
        let end_time = last
            .end
            .or_else(|| self.slots.get(end).map(|next| next.start))
            .or_else(|| self.extrapolate(end - 1))
            .ok_or(TimelineError::MissingSlotEnd { index: end - 1 })?;
        if end_time <= first.start {
            return Err(TimelineError::EmptyRange { start: first.start, end: end_time });
        }
        Ok((first.start, end_time))
    }

    /// End of slot `index` assuming it is as long as the slot before it.
    fn extrapolate(&self, index: usize) -> Option<NaiveTime> {
        let previous = self.slots.get(index.checked_sub(1)?)?;
        let current = self.slots.get(index)?;
        let length = current.start - previous.start;
        if length <= chrono::Duration::zero() {
            return None;
        }
        let (end, overflow) = current.start.overflowing_add_signed(length);
        (overflow == 0).then_some(end)
    }
}
