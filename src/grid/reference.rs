//! Spreadsheet-style cell references used in diagnostics.

/// Converts a 0-based column index to column letters (0 → "A", 26 → "AA").
pub fn col_to_letters(col: usize) -> String {
    let mut col = col + 1;
    let mut letters = String::new();
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    letters
}

/// Converts 0-based row and column indexes to an A1-style reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}
