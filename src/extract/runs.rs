use crate::error::TimetableError;
use crate::extract::Block;
use crate::extract::Extraction;
use crate::extract::Extractor;
use crate::extract::StructuralWarning;
use crate::extract::TimeLabelParser;
use crate::extract::Timeline;
use crate::extract::TimelineError;
use crate::grid::FlatTable;
use crate::grid::Header;

/// Run-detection extraction strategy for flat text tables.
///
/// Row 0 holds the slot time labels. Every other row starts with a day label
/// and ends with an empty sentinel column; the columns in between are slots.
/// A block is a run of consecutive non-empty slots and takes the text of the
/// run's first cell.
pub struct RunDetector<'a> {
    table: &'a FlatTable,
}

impl<'a> RunDetector<'a> {
    pub fn new(table: &'a FlatTable) -> Self {
        Self { table }
    }
}

impl Extractor for RunDetector<'_> {
    fn header(&self) -> &Header {
        self.table.header()
    }

    fn timeline(&self, parser: &TimeLabelParser) -> Result<Timeline, TimetableError> {
        let labels = self
            .table
            .rows()
            .first()
            .map(|row| slot_columns(row))
            .filter(|labels| !labels.is_empty())
            .ok_or(TimelineError::MissingLabels)?;
        Ok(parser.parse_all(labels.iter().map(String::as_str))?)
    }

    fn extract(&self) -> Extraction {
        let mut extraction = Extraction::default();
        let slot_count = self.table.rows().first().map(|row| slot_columns(row).len()).unwrap_or(0);
        let mut day = String::new();
        for (row_index, row) in self.table.rows().iter().enumerate().skip(1) {
            let slots = slot_columns(row);
            let is_short = slots.len() != slot_count;
            if is_short {
                extraction.row_errors += 1;
                extraction.warnings.push(StructuralWarning::ShortRow {
                    row: row_index,
                    found: slots.len(),
                    expected: slot_count,
                });
            }
            // Rows without a day label continue the day above them
            if let Some(label) = row.first().map(|label| label.trim()).filter(|label| !label.is_empty()) {
                day = label.to_owned();
            }
            let blocks = detect_runs(row_index, &day, slots);
            if day.is_empty() && !blocks.is_empty() {
                // a short row is already counted
                if !is_short {
                    extraction.row_errors += 1;
                }
                extraction.warnings.push(StructuralWarning::UnlabeledRow { row: row_index });
                continue;
            }
            extraction.blocks.extend(blocks);
        }
        extraction
    }
}

/// Slot cells of a row: everything between the day label and the sentinel.
fn slot_columns(row: &[String]) -> &[String] {
    if row.len() < 2 {
        &[]
    } else {
        &row[1..row.len() - 1]
    }
}

/// Finds runs of non-empty cells; a run still open at the last slot ends there.
pub fn detect_runs(row_index: usize, day: &str, slots: &[String]) -> Vec<Block> {
    let mut blocks = Vec::<Block>::new();
    let mut tracking: Option<Block> = None;
    for (index, cell) in slots.iter().enumerate() {
        let is_empty = cell.trim().is_empty();
        match tracking.take() {
            None if !is_empty => tracking = Some(Block::new(row_index, index, 0, day, cell)),
            Some(mut block) if is_empty => {
                block.end = index;
                blocks.push(block);
            }
            open => tracking = open,
        }
    }
    if let Some(mut block) = tracking {
        block.end = slots.len();
        blocks.push(block);
    }
    blocks
}
