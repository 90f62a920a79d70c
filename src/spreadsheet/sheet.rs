use crate::error::RuleSheetError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::SheetEvent;
use crate::spreadsheet::SheetListener;
use crate::spreadsheet::SpreadsheetError;
use std::collections::BTreeMap;

/// A rectangular merged region, all bounds inclusive and 0-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MergedRange {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl MergedRange {
    /// Checks if a cell at (row, col) lies within the region.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.first_row <= row && row <= self.last_row && self.first_col <= col && col <= self.last_col
    }
}

impl TryFrom<&str> for MergedRange {
    type Error = SpreadsheetError;

    /// Parses an Excel-style range such as "B3:D3".
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || SpreadsheetError::InvalidMergedRange(value.to_owned());
        let (start, end) = value.split_once(':').ok_or_else(invalid)?;
        let (first_row, first_col) = reference_to_index(start).ok_or_else(invalid)?;
        let (last_row, last_col) = reference_to_index(end).ok_or_else(invalid)?;
        if last_row < first_row || last_col < first_col {
            Err(invalid())?;
        }
        Ok(MergedRange {
            first_row,
            last_row,
            first_col,
            last_col,
        })
    }
}

/// An in-memory sheet: sparse cell values plus merged regions.
///
/// Replaying a sheet reports rows top to bottom and cells left to right.
/// Every position covered by a merged region is reported with the value of the
/// region's top-left cell and the region's first column as merge start.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Cell values keyed by (row, col), so iteration is row-major
    values: BTreeMap<(usize, usize), String>,
    /// Merged regions
    merges: Vec<MergedRange>,
    /// Actual data range (determined from cell data and merges)
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Builds a sheet from rows of text, starting at A1. Empty strings leave the cell unset.
    pub fn from_rows<R, C>(name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut sheet = Sheet::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                sheet.set(row, col, value.as_ref());
            }
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sets a cell value; empty text removes the cell.
    pub fn set(&mut self, row: usize, col: usize, value: &str) -> &mut Self {
        if value.is_empty() {
            self.values.remove(&(row, col));
        } else {
            self.update_bound(row, col);
            self.values.insert((row, col), value.to_owned());
        }
        self
    }

    /// Sets a cell value addressed by an Excel-style reference.
    pub fn set_at(&mut self, reference: &str, value: &str) -> Result<&mut Self, SpreadsheetError> {
        let (row, col) = reference_to_index(reference)
            .ok_or_else(|| SpreadsheetError::InvalidReference(reference.to_owned()))?;
        Ok(self.set(row, col, value))
    }

    /// Registers a merged region.
    pub fn merge(&mut self, range: MergedRange) -> &mut Self {
        self.update_bound(range.last_row, range.last_col);
        self.merges.push(range);
        self
    }

    /// Registers a merged region given as an Excel-style range ("B3:C3").
    pub fn merge_at(&mut self, range: &str) -> Result<&mut Self, SpreadsheetError> {
        let range = MergedRange::try_from(range)?;
        Ok(self.merge(range))
    }

    /// Gets the stored value at (row, col), ignoring merges.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.values.get(&(row, col)).map(String::as_str)
    }

    /// Returns the merged regions of the sheet.
    pub fn merges(&self) -> &[MergedRange] {
        &self.merges
    }

    /// Updates the data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Returns the cells of one row as a grid reader reports them.
    pub fn row_cells(&self, row: usize) -> Vec<Cell> {
        let Some(col_upper_bound) = self.col_upper_bound else {
            return Vec::new();
        };
        (0..=col_upper_bound)
            .filter_map(|col| {
                if let Some(range) = self.merges.iter().find(|range| range.contains(row, col)) {
                    let value = self.get(range.first_row, range.first_col)?;
                    Some(Cell::new(row, col, value).merged(range.first_col))
                } else {
                    self.get(row, col).map(|value| Cell::new(row, col, value))
                }
            })
            .collect()
    }

    /// Replays the whole sheet into a listener.
    pub fn emit(&self, listener: &mut dyn SheetListener) -> Result<(), RuleSheetError> {
        listener.start_sheet(&self.name)?;
        if let Some((row_upper_bound, col_upper_bound)) = self.row_upper_bound.zip(self.col_upper_bound) {
            for row in 0..=row_upper_bound {
                listener.new_row(row, col_upper_bound + 1)?;
                for cell in self.row_cells(row) {
                    listener.on_event(SheetEvent::NewCell(cell))?;
                }
            }
        }
        listener.finish_sheet()
    }
}
