//! # Timetable Grid Extraction
//!
//! Turns university timetable pages into dated calendar events and folds
//! them into per-course collections across many documents.
//!
//! ## Features
//!
//! - **Two grid shapes**: span grids (cells with explicit row spans, as in
//!   HTML timetables) and flat tables (plain text cells, as extracted from
//!   PDF pages)
//! - **Week lists**: academic week-number lists such as `"3,5-8,10"`, with
//!   rollover of week 53 and above into the next year
//! - **Configurable calendars**: weekday ordering, week numbering, category
//!   markers and room patterns are loaded from TOML
//! - **Cross-document merge**: courses are keyed by normalized title and
//!   keep duplicate-free events and participant groups
//! - **Error tolerance**: malformed rows and blocks are counted and skipped,
//!   a failing document never aborts a run
//!
//! ## Example
//!
//! ```
//! use timetable_grid::grid::{Cell, Document, Grid, Header, Page, Row};
//! use timetable_grid::Engine;
//!
//! let header = Header::new("Vorlesungsplan für Informatik 3. Sem.", "SS 2023", "10-11");
//! let rows = vec![
//!     Row::new("08:00", vec![Cell::new("Mathematik").with_span(2)]),
//!     Row::new("08:45", vec![]),
//!     Row::new("09:30", vec![Cell::empty()]),
//! ];
//! let page = Page::Grid(Grid::new(header, vec!["Montag".to_owned()], rows));
//! let report = Engine::default().run(&[Document::new("plan.htm", vec![page])]);
//! assert_eq!(report.courses[0].events().len(), 2);
//! ```
pub mod aggregate;
pub mod calendar;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod extract;
pub mod grid;
pub mod header;
pub mod weeks;

pub use aggregate::Aggregator;
pub use aggregate::Course;
pub use aggregate::DedupKey;
pub use aggregate::Member;
pub use calendar::DateBuilder;
pub use classify::Category;
pub use config::EngineConfig;
pub use engine::Engine;
pub use engine::RunReport;
pub use error::ErrorKind;
pub use error::TimetableError;
pub use expand::Event;
pub use weeks::WeekSet;
