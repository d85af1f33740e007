use crate::error::TimetableError;
use crate::extract::Block;
use crate::extract::Extraction;
use crate::extract::Extractor;
use crate::extract::StructuralWarning;
use crate::extract::TimeLabelParser;
use crate::extract::Timeline;
use crate::grid::reference::index_to_reference;
use crate::grid::Cell;
use crate::grid::Grid;
use crate::grid::Header;

/// Rows of a span grid after filler synthesis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedGrid {
    pub rows: Vec<Vec<Cell>>,
    pub row_errors: usize,
    pub warnings: Vec<StructuralWarning>,
}

/// Span-grid extraction strategy.
///
/// A cell spanning `s` rows is only present in its first row; the source
/// omits it from the following `s - 1` rows, which shifts every cell to its
/// right. Covered fillers are inserted at the spanned column to restore the
/// alignment before blocks are read.
pub struct SpanGrid<'a> {
    grid: &'a Grid,
}

impl<'a> SpanGrid<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Inserts covered fillers below spanning cells and counts short rows.
    pub fn normalize(&self) -> NormalizedGrid {
        let expected = self.grid.columns().len();
        let mut normalized = NormalizedGrid::default();
        // remaining rows still covered per column
        let mut carry = vec![0usize; expected];
        for (row_index, row) in self.grid.rows().iter().enumerate() {
            let mut cells = Vec::<Cell>::with_capacity(expected);
            let mut raw = row.cells().iter();
            let mut col = 0usize;
            loop {
                if carry.get(col).map(|count| *count > 0).unwrap_or(false) {
                    carry[col] -= 1;
                    cells.push(Cell::covered());
                    col += 1;
                    continue;
                }
                let Some(cell) = raw.next() else { break };
                if cell.span() > 1 {
                    if carry.len() <= col {
                        carry.resize(col + 1, 0);
                    }
                    carry[col] = cell.span() - 1;
                }
                cells.push(cell.clone());
                col += 1;
            }
            // Source row ran out early; spans further right still consume this row
            let mut contiguous = true;
            for count in carry.iter_mut().skip(col) {
                if *count > 0 {
                    *count -= 1;
                    if contiguous {
                        cells.push(Cell::covered());
                    }
                } else {
                    contiguous = false;
                }
            }
            if cells.len() < expected {
                log::debug!("Row {row_index} has {} of {expected} cells", cells.len());
                normalized.row_errors += 1;
                normalized.warnings.push(StructuralWarning::ShortRow {
                    row: row_index,
                    found: cells.len(),
                    expected,
                });
            }
            normalized.rows.push(cells);
        }
        normalized
    }
}

impl Extractor for SpanGrid<'_> {
    fn header(&self) -> &Header {
        self.grid.header()
    }

    /// One slot per row, labelled by the row's start time.
    fn timeline(&self, parser: &TimeLabelParser) -> Result<Timeline, TimetableError> {
        Ok(parser.parse_all(self.grid.rows().iter().map(|row| row.time()))?)
    }

    fn extract(&self) -> Extraction {
        let NormalizedGrid {
            rows,
            row_errors,
            mut warnings,
        } = self.normalize();
        let row_count = rows.len();
        let mut blocks = Vec::<Block>::new();
        for (row_index, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let mut end = row_index + cell.span();
                if end > row_count {
                    warnings.push(StructuralWarning::SpanOverflow {
                        // column A is the time label column
                        reference: index_to_reference(row_index, col + 1),
                        span: cell.span(),
                        available: row_count - row_index,
                    });
                    end = row_count;
                }
                let day = self.grid.columns().get(col).map(String::as_str).unwrap_or_default();
                let mut block = Block::new(col, row_index, end, day, cell.text());
                block.details = cell.details().cloned();
                blocks.push(block);
            }
        }
        Extraction {
            blocks,
            row_errors,
            warnings,
        }
    }
}
