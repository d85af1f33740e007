//! # Event Expansion
//!
//! Attaches calendar dates to grid-relative blocks: one event per block,
//! listed day and week of the page's week set.
use crate::calendar::CalendarError;
use crate::calendar::DateBuilder;
use crate::classify::Category;
use crate::error::TimetableError;
use crate::extract::Block;
use crate::extract::Timeline;
use crate::extract::TimelineError;
use crate::header::collapse_lines;
use crate::weeks::WeekSet;
use chrono::Duration;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// A fully dated event occurrence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub category: Category,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Room names, blanks dropped
    pub rooms: Vec<String>,
    pub description: String,
    /// Originating document and page
    pub source: String,
}

impl Event {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Rooms joined for a single location field.
    pub fn location(&self) -> String {
        self.rooms.join(", ")
    }
}

/// Site-specific room-number extraction from free text.
#[derive(Clone, Debug)]
pub struct RoomMatcher {
    pattern: Regex,
}

impl RoomMatcher {
    pub const DEFAULT_PATTERN: &'static str = r"C\d\d-\d?\w?.\d\d";

    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// All room matches in order of appearance.
    pub fn find(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|matcher| matcher.as_str().to_owned())
            .collect()
    }
}

impl Default for RoomMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN).expect("Hardcode regex pattern")
    }
}

/// A block with its text fields and clock times resolved, ready to be dated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventTemplate {
    pub title: String,
    pub category: Category,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub rooms: Vec<String>,
    pub description: String,
    pub source: String,
}

impl EventTemplate {
    /// Resolves a block against the page timeline.
    ///
    /// Structured cells provide title, rooms and description directly; plain
    /// text blocks use the whole text as title and scan it for rooms.
    pub fn from_block(
        block: &Block,
        timeline: &Timeline,
        rooms: &RoomMatcher,
        source: &str,
    ) -> Result<Self, TimetableError> {
        let (start, end) = timeline.resolve(block.start, block.end)?;
        let (title, found_rooms, description) = match &block.details {
            Some(details) => {
                let title = Some(details.display_title())
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| collapse_lines(&block.text));
                let mut found_rooms = details.rooms();
                if found_rooms.is_empty() {
                    found_rooms = rooms.find(&block.text);
                }
                (title, found_rooms, details.description())
            }
            None => (collapse_lines(&block.text), rooms.find(&block.text), String::new()),
        };
        Ok(Self {
            title,
            category: block.category,
            start,
            end,
            rooms: found_rooms,
            description,
            source: source.to_owned(),
        })
    }
}

/// Expands event templates over a week set.
#[derive(Clone, Debug, Default)]
pub struct Expander {
    builder: DateBuilder,
}

impl Expander {
    pub fn new(builder: DateBuilder) -> Self {
        Self { builder }
    }

    /// Emits one event per week of `weeks` and per weekday listed in
    /// `day_label` (comma separated), weeks outer, days inner. No
    /// deduplication happens here.
    ///
    /// # Errors
    ///
    /// Fails as a whole when the template's time range is empty or a day
    /// cannot be resolved.
    pub fn expand(
        &self,
        template: &EventTemplate,
        weeks: &WeekSet,
        year: i32,
        day_label: &str,
    ) -> Result<Vec<Event>, TimetableError> {
        if template.end <= template.start {
            Err(TimelineError::EmptyRange {
                start: template.start,
                end: template.end,
            })?;
        }
        let days = day_label
            .split(',')
            .map(str::trim)
            .filter(|day| !day.is_empty())
            .collect::<Vec<_>>();
        if days.is_empty() {
            Err(CalendarError::UnknownWeekday(day_label.trim().to_owned()))?;
        }
        let mut events = Vec::<Event>::with_capacity(weeks.len() * days.len());
        for week in weeks.iter() {
            for day in &days {
                events.push(Event {
                    title: template.title.to_owned(),
                    category: template.category,
                    start: self.builder.build(year, week, day, template.start)?,
                    end: self.builder.build(year, week, day, template.end)?,
                    rooms: template.rooms.to_owned(),
                    description: template.description.to_owned(),
                    source: template.source.to_owned(),
                });
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_clock;
    use crate::error::ErrorKind;
    use crate::extract::TimeLabelParser;
    use crate::grid::CellDetails;

    fn template(start: &str, end: &str) -> EventTemplate {
        EventTemplate {
            title: "Mathematik 1".to_owned(),
            category: Category::Lecture,
            start: parse_clock(start).unwrap(),
            end: parse_clock(end).unwrap(),
            rooms: vec!["C12-0.01".to_owned()],
            description: String::new(),
            source: "plan.htm".to_owned(),
        }
    }

    #[test]
    fn test_expand_two_weeks() {
        let expander = Expander::default();
        let weeks = WeekSet::try_from("10,11").unwrap();
        let events = expander.expand(&template("08:00", "09:30"), &weeks, 2023, "Monday").unwrap();
        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.duration(), Duration::minutes(90));
            assert!(event.end > event.start);
        }
        assert_eq!(events[1].start - events[0].start, Duration::weeks(1));
        assert_eq!(events[0].start.to_string(), "2023-03-06 08:00:00");
        assert_eq!(events[0].location(), "C12-0.01");
    }

    #[test]
    fn test_expand_follows_week_order() {
        let expander = Expander::default();
        let weeks = WeekSet::try_from("51-52,1").unwrap();
        let events = expander.expand(&template("08:00", "09:30"), &weeks, 2023, "Mo").unwrap();
        let dates = events.iter().map(|event| event.start.date().to_string()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2023-12-18", "2023-12-25", "2023-01-02"]);
    }

    #[test]
    fn test_expand_multiple_days() {
        let expander = Expander::default();
        let weeks = WeekSet::try_from("10").unwrap();
        let events = expander.expand(&template("08:00", "09:30"), &weeks, 2023, "Montag, Mittwoch").unwrap();
        let dates = events.iter().map(|event| event.start.date().to_string()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2023-03-06", "2023-03-08"]);
    }

    #[test]
    fn test_expand_empty_weeks() {
        let expander = Expander::default();
        let events = expander.expand(&template("08:00", "09:30"), &WeekSet::default(), 2023, "Mo").unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_expand_rejects_bad_input() {
        let expander = Expander::default();
        let weeks = WeekSet::try_from("10").unwrap();

        let error = expander.expand(&template("09:30", "09:30"), &weeks, 2023, "Mo").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DateRange);

        let error = expander.expand(&template("08:00", "09:30"), &weeks, 2023, "Feiertag").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DateRange);

        let error = expander.expand(&template("08:00", "09:30"), &weeks, 2023, " ").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DateRange);
    }

    #[test]
    fn test_template_from_text_block() {
        let timeline = TimeLabelParser::default().parse_all(["08:00", "08:45", "09:30"]).unwrap();
        let mut block = Block::new(1, 0, 2, "Mo", "Physik-ÜL\nC12-0.01 C13-1.12");
        block.category = Category::Lab;
        let template = EventTemplate::from_block(&block, &timeline, &RoomMatcher::default(), "plan.pdf").unwrap();
        assert_eq!(template.title, "Physik-ÜL C12-0.01 C13-1.12");
        assert_eq!(template.rooms, vec!["C12-0.01", "C13-1.12"]);
        assert_eq!(template.category, Category::Lab);
        assert_eq!((template.start, template.end), (parse_clock("08:00").unwrap(), parse_clock("09:30").unwrap()));
    }

    #[test]
    fn test_template_from_detailed_block() {
        let timeline = TimeLabelParser::default().parse_all(["08:00", "08:45", "09:30"]).unwrap();
        let mut block = Block::new(0, 1, 3, "Montag", "raw");
        block.details = Some(CellDetails {
            title: "Technische_Mechanik".to_owned(),
            lecturer: "Schmidt".to_owned(),
            internal_room: "C12-0.01".to_owned(),
            ..CellDetails::default()
        });
        let template = EventTemplate::from_block(&block, &timeline, &RoomMatcher::default(), "plan.htm").unwrap();
        assert_eq!(template.title, "Technische Mechanik");
        assert_eq!(template.rooms, vec!["C12-0.01"]);
        assert_eq!(template.description, "Schmidt");
        // the last slot repeats the previous slot length
        assert_eq!(template.end, parse_clock("10:15").unwrap());
    }

    #[test]
    fn test_event_serializes() {
        let expander = Expander::default();
        let weeks = WeekSet::try_from("10").unwrap();
        let events = expander.expand(&template("08:00", "09:30"), &weeks, 2023, "Mo").unwrap();
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["category"], "lecture");
        assert_eq!(json["start"], "2023-03-06T08:00:00");
        assert_eq!(json["rooms"][0], "C12-0.01");
    }
}
