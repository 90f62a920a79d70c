use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// A single non-empty cell as delivered by a grid reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell value as text
    pub value: String,
    /// First column of the merged region this cell belongs to, `None` when not merged
    pub merged_col_start: Option<usize>,
}

impl Cell {
    pub fn new(row: usize, col: usize, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
            merged_col_start: None,
        }
    }

    /// Marks the cell as part of a merged region starting at `col_start`.
    pub fn merged(mut self, col_start: usize) -> Self {
        self.merged_col_start = Some(col_start);
        self
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Returns true if the value is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Returns true for the leftmost column of a merged region.
    pub fn is_merge_start(&self) -> bool {
        self.merged_col_start == Some(self.col)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={:?}", self.reference(), self.value)
    }
}

/// Interprets spreadsheet text as a boolean.
///
/// Accepts `true`/`yes`/`y`/`on`/`1` and `false`/`no`/`n`/`off`/`0`, case-insensitive.
/// Anything else is `None`.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_reference_and_merge() {
        let cell = Cell::new(11, 1, "x").merged(1);
        assert_eq!(cell.reference(), "B12");
        assert!(cell.is_merge_start());
        assert!(!Cell::new(0, 2, "x").merged(1).is_merge_start());
        assert!(Cell::new(0, 0, "  ").is_blank());
    }

    #[test]
    fn boolean_meaning() {
        assert_eq!(parse_boolean("TRUE"), Some(true));
        assert_eq!(parse_boolean(" y "), Some(true));
        assert_eq!(parse_boolean("On"), Some(true));
        assert_eq!(parse_boolean("no"), Some(false));
        assert_eq!(parse_boolean("0"), Some(false));
        assert_eq!(parse_boolean("maybe"), None);
        assert_eq!(parse_boolean(""), None);
    }
}
