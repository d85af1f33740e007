//! # Extraction Pipeline
//!
//! Drives pages through extraction, classification and expansion, applies
//! the error policy and folds the results of many documents into courses.
//!
//! Per block failures (unknown weekday, slot without end) skip the block and
//! are counted. Week list, time label and semester failures as well as pages
//! without header or rows fail the whole document; the run then continues
//! with the next one.
use crate::aggregate::Aggregator;
use crate::aggregate::Course;
use crate::aggregate::DedupKey;
use crate::aggregate::EventKey;
use crate::aggregate::Member;
use crate::calendar::parse_year;
use crate::calendar::DateBuilder;
use crate::classify::Category;
use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::expand::Event;
use crate::expand::EventTemplate;
use crate::expand::Expander;
use crate::expand::RoomMatcher;
use crate::extract::StructuralWarning;
use crate::extract::TimeLabelParser;
use crate::grid::Document;
use crate::grid::Page;
use crate::header::collapse_lines;
use crate::header::normalize_page_title;
use crate::header::HeaderParser;
use crate::weeks::WeekSet;
use anyhow::Context;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

/// Errors related to pages that cannot be read as timetables at all.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Page {page} has no header")]
    MissingHeader { page: usize },

    #[error("Page {page} has no rows")]
    NoRows { page: usize },
}

/// Events of one block, ready to be folded into a course.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseEvents {
    pub title: String,
    pub category: Category,
    pub events: Vec<Event>,
}

/// Everything extracted from one page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageResult {
    /// 1-based page number
    pub number: usize,
    pub member: Member,
    /// Normalized page title grouping pages into calendars
    pub calendar: String,
    pub courses: Vec<CourseEvents>,
    pub blocks: usize,
    pub row_errors: usize,
    pub skipped_blocks: usize,
    pub warnings: Vec<StructuralWarning>,
}

impl PageResult {
    pub fn event_count(&self) -> usize {
        self.courses.iter().map(|course| course.events.len()).sum()
    }
}

/// Counts reported for one processed document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentSummary {
    pub name: String,
    pub pages: usize,
    pub blocks: usize,
    pub events: usize,
    pub row_errors: usize,
    pub skipped_blocks: usize,
    pub warnings: Vec<StructuralWarning>,
}

impl Display for DocumentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} pages, {} blocks, {} events, {} rows with errors, {} skipped blocks, {} warnings",
            self.name,
            self.pages,
            self.blocks,
            self.events,
            self.row_errors,
            self.skipped_blocks,
            self.warnings.len()
        )
    }
}

/// Result of processing one document.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentResult {
    pub pages: Vec<PageResult>,
    pub summary: DocumentSummary,
}

/// A document skipped because of an unrecoverable error.
#[derive(Debug)]
pub struct DocumentFailure {
    pub name: String,
    pub error: TimetableError,
}

/// Per-page event collection with duplicate suppression.
#[derive(Clone, Debug)]
pub struct Calendar {
    pub name: String,
    events: Vec<Event>,
    keys: HashSet<EventKey>,
}

impl Calendar {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            events: Vec::new(),
            keys: HashSet::new(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn add(&mut self, event: &Event, dedup: DedupKey) {
        if self.keys.insert(dedup.key(event)) {
            self.events.push(event.clone());
        }
    }
}

/// Outcome of a multi-document run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub documents: Vec<DocumentSummary>,
    pub failures: Vec<DocumentFailure>,
    /// Courses in first-seen order
    pub courses: Vec<Course>,
    /// Events grouped by normalized page title, in first-seen order
    pub calendars: Vec<Calendar>,
}

impl RunReport {
    pub fn calendar(&self, name: &str) -> Option<&Calendar> {
        self.calendars.iter().find(|calendar| calendar.name == name)
    }
}

/// Accumulates calendars across documents.
#[derive(Debug, Default)]
struct Calendars {
    dedup: DedupKey,
    calendars: Vec<Calendar>,
    index: HashMap<String, usize>,
}

impl Calendars {
    fn new(dedup: DedupKey) -> Self {
        Self {
            dedup,
            ..Self::default()
        }
    }

    fn ingest(&mut self, page: &PageResult) {
        let index = match self.index.get(&page.calendar).copied() {
            Some(index) => index,
            None => {
                self.calendars.push(Calendar::new(&page.calendar));
                self.index.insert(page.calendar.to_owned(), self.calendars.len() - 1);
                self.calendars.len() - 1
            }
        };
        let calendar = &mut self.calendars[index];
        for course in &page.courses {
            for event in &course.events {
                calendar.add(event, self.dedup);
            }
        }
    }
}

/// The configured extraction pipeline.
#[derive(Clone, Debug)]
pub struct Engine {
    expander: Expander,
    classifier: Classifier,
    rooms: RoomMatcher,
    headers: HeaderParser,
    time_labels: TimeLabelParser,
    dedup: DedupKey,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            expander: Expander::default(),
            classifier: Classifier::default(),
            rooms: RoomMatcher::default(),
            headers: HeaderParser::default(),
            time_labels: TimeLabelParser::default(),
            dedup: DedupKey::default(),
        }
    }
}

impl Engine {
    /// Builds an engine, rejecting invalid configuration up front.
    pub fn new(config: &EngineConfig) -> Result<Self, TimetableError> {
        config.validate()?;
        let builder = DateBuilder::new(config.weekdays.clone(), config.numbering, config.rollover_week);
        Ok(Self {
            expander: Expander::new(builder),
            classifier: Classifier::new(config.lab_markers.clone(), config.exercise_markers.clone()),
            rooms: RoomMatcher::new(&config.room_pattern)?,
            headers: HeaderParser::new(&config.header_pattern)?,
            time_labels: TimeLabelParser::new(&config.time_pattern)?,
            dedup: config.dedup,
        })
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load engine config '{}'", path.display()))?;
        Engine::new(&config).with_context(|| format!("Invalid engine config '{}'", path.display()))
    }

    /// An empty aggregator using this engine's dedup key.
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.dedup)
    }

    /// Extracts and expands every block of one page.
    pub fn process_page(&self, document: &str, number: usize, page: &Page) -> Result<PageResult, TimetableError> {
        let header = page.header();
        if header.title.trim().is_empty() {
            Err(DocumentError::MissingHeader { page: number })?;
        }
        if page.row_count() == 0 {
            Err(DocumentError::NoRows { page: number })?;
        }

        let title = collapse_lines(&header.title);
        let source = format!("{title} [{document}, page {number}]");
        let (member, warning) = self.headers.member_or_fallback(&header.title);
        let year = parse_year(&header.semester)?;
        let weeks = WeekSet::try_from(header.weeks.as_str())?;

        let extractor = page.extractor();
        let timeline = extractor.timeline(&self.time_labels)?;
        let extraction = extractor.extract();

        let mut result = PageResult {
            number,
            member,
            calendar: normalize_page_title(&title),
            courses: Vec::new(),
            blocks: extraction.blocks.len(),
            row_errors: extraction.row_errors,
            skipped_blocks: 0,
            warnings: Vec::new(),
        };
        result.warnings.extend(warning);
        if weeks.is_empty() {
            result.warnings.push(StructuralWarning::NoWeeks { page: title.to_owned() });
        }
        result.warnings.extend(extraction.warnings);
        for warning in &result.warnings {
            log::warn!("{source}: {warning}");
        }

        for mut block in extraction.blocks {
            block.category = self.classifier.classify(&block.text);
            let events = EventTemplate::from_block(&block, &timeline, &self.rooms, &source)
                .and_then(|template| {
                    let events = self.expander.expand(&template, &weeks, year, &block.day)?;
                    Ok((template, events))
                });
            match events {
                Ok((template, events)) => {
                    log::debug!("{source}: '{}' yields {} events", template.title, events.len());
                    result.courses.push(CourseEvents {
                        title: template.title,
                        category: template.category,
                        events,
                    });
                }
                Err(error) => {
                    log::warn!("{source}: skipping block at slot {}: {error}", block.start);
                    result.skipped_blocks += 1;
                }
            }
        }
        Ok(result)
    }

    /// Processes every page of a document; any page failure fails the document.
    pub fn process_document(&self, document: &Document) -> Result<DocumentResult, TimetableError> {
        let mut summary = DocumentSummary {
            name: document.name.to_owned(),
            pages: document.pages.len(),
            ..DocumentSummary::default()
        };
        let mut pages = Vec::<PageResult>::with_capacity(document.pages.len());
        for (index, page) in document.pages.iter().enumerate() {
            let page = self
                .process_page(&document.name, index + 1, page)
                .with_prefix(&document.name)?;
            summary.blocks += page.blocks;
            summary.events += page.event_count();
            summary.row_errors += page.row_errors;
            summary.skipped_blocks += page.skipped_blocks;
            summary.warnings.extend(page.warnings.iter().cloned());
            pages.push(page);
        }
        Ok(DocumentResult { pages, summary })
    }

    /// Processes a document and folds its events and members into `aggregator`.
    /// Nothing is ingested when the document fails.
    pub fn ingest_document(
        &self,
        aggregator: &mut Aggregator,
        document: &Document,
    ) -> Result<DocumentSummary, TimetableError> {
        let result = self.process_document(document)?;
        for page in result.pages {
            ingest_page(aggregator, page);
        }
        Ok(result.summary)
    }

    /// Processes documents in order. A failing document is reported and skipped.
    pub fn run<'a, I>(&self, documents: I) -> RunReport
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut report = RunReport::default();
        let mut aggregator = self.aggregator();
        let mut calendars = Calendars::new(self.dedup);
        for document in documents {
            match self.process_document(document) {
                Ok(result) => {
                    log::info!("{}", result.summary);
                    for page in result.pages {
                        calendars.ingest(&page);
                        ingest_page(&mut aggregator, page);
                    }
                    report.documents.push(result.summary);
                }
                Err(error) => {
                    log::error!("Skipping document '{}': {error}", document.name);
                    report.failures.push(DocumentFailure {
                        name: document.name.to_owned(),
                        error,
                    });
                }
            }
        }
        report.courses = aggregator.finish();
        report.calendars = calendars.calendars;
        report
    }
}

fn ingest_page(aggregator: &mut Aggregator, page: PageResult) {
    for course in page.courses {
        aggregator.ingest(&course.title, course.category, course.events, &page.member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::grid::Cell;
    use crate::grid::FlatTable;
    use crate::grid::Grid;
    use crate::grid::Header;
    use crate::grid::Row;

    fn header(weeks: &str) -> Header {
        Header::new("Vorlesungsplan für Informatik 3. Sem. Gruppe 1", "SS 2023", weeks)
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_owned()).collect()
    }

    fn table_page(weeks: &str, rows: Vec<Vec<String>>) -> Page {
        Page::Table(FlatTable::new(header(weeks), rows))
    }

    fn grid_page(weeks: &str) -> Page {
        let columns = vec!["Montag".to_owned(), "Dienstag".to_owned()];
        let rows = vec![
            Row::new("08:00", vec![Cell::new("Mathematik").with_span(2), Cell::new("Physik-Ü")]),
            Row::new("08:45", vec![Cell::empty()]),
            Row::new("09:30", vec![Cell::empty(), Cell::empty()]),
        ];
        Page::Grid(Grid::new(header(weeks), columns, rows))
    }

    #[test]
    fn test_process_grid_page() {
        let engine = Engine::default();
        let page = engine.process_page("plan.htm", 1, &grid_page("10,11")).unwrap();
        assert_eq!(page.member, Member::new("Informatik", 3, 1));
        assert_eq!(page.calendar, "Vorlesungsplan_für_Informatik_3_Sem_Gruppe_1");
        assert_eq!(page.blocks, 2);
        assert_eq!(page.event_count(), 4);
        assert_eq!(page.row_errors, 0);

        let math = &page.courses[0];
        assert_eq!(math.title, "Mathematik");
        assert_eq!(math.category, Category::Lecture);
        assert_eq!(math.events[0].start.to_string(), "2023-03-06 08:00:00");
        assert_eq!(math.events[0].end.to_string(), "2023-03-06 09:30:00");
        assert_eq!(math.events[0].source, "Vorlesungsplan für Informatik 3. Sem. Gruppe 1 [plan.htm, page 1]");

        let exercise = &page.courses[1];
        assert_eq!(exercise.category, Category::Exercise);
        assert_eq!(exercise.events[0].start.to_string(), "2023-03-07 08:00:00");
        assert_eq!(exercise.events[0].end.to_string(), "2023-03-07 08:45:00");
    }

    #[test]
    fn test_bad_blocks_are_skipped() {
        let engine = Engine::default();
        let page = table_page("10", vec![
            row(&["", "08:00", "08:45", ""]),
            row(&["Feiertag", "Mathe", "", ""]),
            row(&["Mo", "", "Physik", ""]),
        ]);
        let page = engine.process_page("plan.pdf", 2, &page).unwrap();
        assert_eq!(page.blocks, 2);
        assert_eq!(page.skipped_blocks, 1);
        assert_eq!(page.courses.len(), 1);
        assert_eq!(page.courses[0].title, "Physik");
        assert_eq!(page.courses[0].events[0].end.to_string(), "2023-03-06 09:30:00");
    }

    #[test]
    fn test_empty_weeks_warn() {
        let engine = Engine::default();
        let page = engine.process_page("plan.htm", 1, &grid_page("")).unwrap();
        assert_eq!(page.event_count(), 0);
        assert!(page.warnings.contains(&StructuralWarning::NoWeeks {
            page: "Vorlesungsplan für Informatik 3. Sem. Gruppe 1".to_owned(),
        }));
    }

    #[test]
    fn test_document_failures() {
        let engine = Engine::default();

        let document = Document::new("broken.htm", vec![grid_page("10"), grid_page("3-1")]);
        let error = engine.process_document(&document).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
        assert!(error.to_string().starts_with("broken.htm: "));

        let error = engine
            .process_document(&Document::new("typo.htm", vec![grid_page("10-200000")]))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);

        let empty = Page::Grid(Grid::new(header("10"), vec![], vec![]));
        let error = engine.process_document(&Document::new("empty.htm", vec![empty])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);

        let untitled = Page::Table(FlatTable::new(Header::default(), vec![row(&["", "08:00", ""]), row(&["Mo", "", ""])]));
        let error = engine.process_document(&Document::new("untitled.pdf", vec![untitled])).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_failed_document_ingests_nothing() {
        let engine = Engine::default();
        let mut aggregator = engine.aggregator();
        let document = Document::new("broken.htm", vec![grid_page("10"), grid_page("x")]);
        assert!(engine.ingest_document(&mut aggregator, &document).is_err());
        assert!(aggregator.is_empty());

        let summary = engine
            .ingest_document(&mut aggregator, &Document::new("plan.htm", vec![grid_page("10")]))
            .unwrap();
        assert_eq!(summary.events, 2);
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn test_run_continues_after_failure() {
        let engine = Engine::default();
        let documents = vec![
            Document::new("first.htm", vec![grid_page("10")]),
            Document::new("broken.htm", vec![Page::Grid(Grid::new(header("10"), vec![], vec![]))]),
            Document::new("second.htm", vec![grid_page("10,11")]),
        ];
        let report = engine.run(&documents);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "broken.htm");
        assert_eq!(report.courses.len(), 2);
        assert_eq!(report.courses[0].events().len(), 2);
        assert_eq!(report.calendars.len(), 1);
        assert_eq!(report.calendars[0].events().len(), 4);
        assert_eq!(
            report.documents[0].to_string(),
            "first.htm: 1 pages, 2 blocks, 2 events, 0 rows with errors, 0 skipped blocks, 0 warnings"
        );
    }

    #[test]
    fn test_year_overflow_skips_blocks() {
        let engine = Engine::default();
        let overflow = Header::new("Vorlesungsplan für Informatik 3. Sem. Gruppe 1", "SS 2147483647", "53");
        let Page::Grid(grid) = grid_page("53") else { unreachable!() };
        let page = Page::Grid(Grid::new(overflow, grid.columns().to_vec(), grid.rows().to_vec()));
        let documents = vec![
            Document::new("overflow.htm", vec![page]),
            Document::new("plan.htm", vec![grid_page("10")]),
        ];
        let report = engine.run(&documents);
        assert!(report.failures.is_empty());
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.documents[0].events, 0);
        assert_eq!(report.documents[0].skipped_blocks, 2);
        assert_eq!(report.documents[1].events, 2);
    }

    #[test]
    fn test_engine_from_config() {
        let config = EngineConfig::from_toml_str("dedup = \"start\"\nlab_markers = [\"Labor\"]").unwrap();
        let engine = Engine::new(&config).unwrap();
        assert_eq!(engine.aggregator().dedup(), DedupKey::Start);
        assert_eq!(engine.classifier.classify("Labor Physik"), Category::Lab);

        let config = EngineConfig {
            rollover_week: 10,
            ..EngineConfig::default()
        };
        assert_eq!(Engine::new(&config).unwrap_err().kind(), ErrorKind::Config);

        assert!(Engine::from_config_file("missing.toml").is_err());
    }
}
