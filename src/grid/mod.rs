//! # Timetable Grid Model
//!
//! Read-only views over one timetable page as produced by the markup or PDF
//! readers: a header block, column labels (weekdays or groups), and rows of
//! cells ordered by ascending start time.
//!
//! Two page shapes exist:
//!
//! - [`Grid`]: cells carry an explicit row span (HTML timetables).
//! - [`FlatTable`]: plain text cells without span metadata (PDF tables), where
//!   the first row holds the slot time labels and the first column holds the
//!   day label.
pub mod cell;
pub mod reference;

pub use cell::Cell;
pub use cell::CellDetails;
pub use cell::CellKind;

/// Page header metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Page or course title, e.g. "Vorlesungsplan für Informatik 3. Sem."
    pub title: String,
    /// Semester label, e.g. "WS 2023/24"
    pub semester: String,
    /// Week-number list, e.g. "40-51,2-5"
    pub weeks: String,
    /// Last update timestamp as printed on the page
    pub updated: String,
}

impl Header {
    pub fn new(title: &str, semester: &str, weeks: &str) -> Self {
        Self {
            title: title.to_owned(),
            semester: semester.to_owned(),
            weeks: weeks.to_owned(),
            updated: String::new(),
        }
    }

    pub fn with_updated(mut self, updated: &str) -> Self {
        self.updated = updated.to_owned();
        self
    }

    /// Builds a header from extracted page text.
    ///
    /// Line 1 is the title, line 2 the semester and line 3 the week list,
    /// written as `<label>: <weeks> Datum: <update>`.
    pub fn from_page_text(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim);
        let title = lines.next().unwrap_or_default();
        let semester = lines.next().unwrap_or_default();
        let week_line = lines.next().unwrap_or_default();
        let week_line = week_line
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(week_line);
        let (weeks, updated) = week_line
            .split_once("Datum:")
            .unwrap_or((week_line, ""));
        Self {
            title: title.to_owned(),
            semester: semester.to_owned(),
            weeks: weeks.replace(' ', ""),
            updated: updated.trim().to_owned(),
        }
    }
}

/// One time-slot row of a span grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    time: String,
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(time: &str, cells: Vec<Cell>) -> Self {
        Self {
            time: time.to_owned(),
            cells,
        }
    }

    /// Start-of-slot time label.
    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Timetable page whose cells declare row spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    header: Header,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Grid {
    pub fn new(header: Header, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            header,
            columns,
            rows,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Column labels, excluding the leading time column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// Timetable page of plain text cells without span metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatTable {
    header: Header,
    rows: Vec<Vec<String>>,
}

impl FlatTable {
    pub fn new(header: Header, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All rows, the first one holding the slot time labels.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A page of a source document in either shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Page {
    Grid(Grid),
    Table(FlatTable),
}

impl Page {
    pub fn header(&self) -> &Header {
        match self {
            Page::Grid(grid) => grid.header(),
            Page::Table(table) => table.header(),
        }
    }

    /// Number of content rows (the label row of a flat table is not counted).
    pub fn row_count(&self) -> usize {
        match self {
            Page::Grid(grid) => grid.rows().len(),
            Page::Table(table) => table.rows().len().saturating_sub(1),
        }
    }
}

/// A source document (one HTML file or PDF) split into pages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub name: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(name: &str, pages: Vec<Page>) -> Self {
        Self {
            name: name.to_owned(),
            pages,
        }
    }
}
