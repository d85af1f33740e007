//! # Grid Block Extraction
//!
//! Reconstructs grid-relative event blocks from a timetable page. Two
//! strategies implement [`Extractor`]:
//!
//! - [`SpanGrid`] reads explicit row spans and synthesizes covered filler
//!   cells so every row keeps the same column alignment.
//! - [`RunDetector`] finds contiguous non-empty runs of slot columns in a
//!   flat text table.
//!
//! Block `start`/`end` always index into the page's [`Timeline`], which maps
//! them to clock times.
pub mod runs;
pub mod span;
pub mod timeline;

pub use runs::RunDetector;
pub use span::SpanGrid;
pub use timeline::TimeLabelParser;
pub use timeline::TimeSlot;
pub use timeline::Timeline;
pub use timeline::TimelineError;

use crate::classify::Category;
use crate::error::TimetableError;
use crate::grid::CellDetails;
use crate::grid::Header;
use crate::grid::Page;
use thiserror::Error;

/// A reconstructed event occupying one column over a contiguous slot range.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Grid column (span grids) or table row (flat tables) the block was found in
    pub column: usize,
    /// First slot index (inclusive)
    pub start: usize,
    /// Last slot index (exclusive)
    pub end: usize,
    /// Day label of the block's column or row
    pub day: String,
    /// Raw cell text
    pub text: String,
    /// Structured cell fields, when the source provides them
    pub details: Option<CellDetails>,
    pub category: Category,
}

impl Block {
    pub fn new(column: usize, start: usize, end: usize, day: &str, text: &str) -> Self {
        Self {
            column,
            start,
            end,
            day: day.to_owned(),
            text: text.to_owned(),
            details: None,
            category: Category::default(),
        }
    }

    /// Number of slots covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Non-fatal structural problems found while reading a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralWarning {
    #[error("Row {row} has {found} cells, expected {expected}")]
    ShortRow { row: usize, found: usize, expected: usize },

    #[error("Cell {reference} spans {span} rows but only {available} remain")]
    SpanOverflow { reference: String, span: usize, available: usize },

    #[error("Row {row} has content but no day label")]
    UnlabeledRow { row: usize },

    #[error("Page '{page}' has no week numbers")]
    NoWeeks { page: String },

    #[error("Unrecognized header '{header}'")]
    UnrecognizedHeader { header: String },
}

/// Blocks read from one page, plus the structural problems met on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    pub blocks: Vec<Block>,
    /// Rows that did not match the expected column count
    pub row_errors: usize,
    pub warnings: Vec<StructuralWarning>,
}

/// A block extraction strategy bound to one page.
pub trait Extractor {
    fn header(&self) -> &Header;

    /// Slot clock times the extracted blocks index into.
    fn timeline(&self, parser: &TimeLabelParser) -> Result<Timeline, TimetableError>;

    /// Reconstructs every block of the page.
    fn extract(&self) -> Extraction;
}

impl Page {
    /// Selects the extraction strategy matching the page shape.
    pub fn extractor(&self) -> Box<dyn Extractor + '_> {
        match self {
            Page::Grid(grid) => Box::new(SpanGrid::new(grid)),
            Page::Table(table) => Box::new(RunDetector::new(table)),
        }
    }
}
