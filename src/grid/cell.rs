/// Kinds of grid cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellKind {
    #[default]
    Empty,
    /// Cell carrying event text
    Text,
    /// Placeholder for a position occupied by a cell spanning from an earlier row
    Covered,
}

/// Structured fields of an event cell, filled by the grid reader from the
/// cell's nested layout (comment / info / lecturer, title, rooms).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellDetails {
    pub title: String,
    pub title_info: String,
    pub lecturer: String,
    pub comment: String,
    pub external_room: String,
    pub internal_room: String,
}

impl CellDetails {
    /// Display title, with underscores used as word separators replaced by spaces.
    pub fn display_title(&self) -> String {
        self.title.replace('_', " ").trim().to_owned()
    }

    /// Internal rooms followed by external rooms, split on commas, blanks dropped.
    pub fn rooms(&self) -> Vec<String> {
        [&self.internal_room, &self.external_room]
            .iter()
            .flat_map(|rooms| rooms.split(','))
            .map(str::trim)
            .filter(|room| !room.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Title info, comment and lecturer joined by spaces.
    pub fn description(&self) -> String {
        [&self.title_info, &self.comment, &self.lecturer]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single timetable grid position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    kind: CellKind,
    text: String,
    row_span: usize,
    details: Option<CellDetails>,
}

impl Cell {
    /// Creates a cell from its text; blank text yields an empty cell.
    pub fn new(text: &str) -> Self {
        let kind = if text.trim().is_empty() {
            CellKind::Empty
        } else {
            CellKind::Text
        };
        Self {
            kind,
            text: text.to_owned(),
            row_span: 1,
            details: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            row_span: 1,
            ..Self::default()
        }
    }

    /// Filler synthesized below a cell that spans several rows.
    pub fn covered() -> Self {
        Self {
            kind: CellKind::Covered,
            row_span: 1,
            ..Self::default()
        }
    }

    pub fn with_span(mut self, row_span: usize) -> Self {
        self.row_span = row_span;
        self
    }

    pub fn with_details(mut self, details: CellDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn details(&self) -> Option<&CellDetails> {
        self.details.as_ref()
    }

    /// Number of time-slot rows the cell occupies, at least 1.
    pub fn span(&self) -> usize {
        self.row_span.max(1)
    }

    /// Returns true for blank cells and span fillers.
    pub fn is_empty(&self) -> bool {
        self.kind != CellKind::Text
    }

    pub fn is_covered(&self) -> bool {
        self.kind == CellKind::Covered
    }
}
