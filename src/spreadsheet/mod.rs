//! # Spreadsheet Event Module
//!
//! This module defines the push interface between grid readers and the rule
//! table parser. A reader walks a sheet row by row and reports every
//! non-empty cell, together with the start column of the merged region the
//! cell belongs to. Listeners never see the physical file format.
//!
//! Two grid sources ship with the crate: an in-memory [`Sheet`] (cells plus
//! merged ranges) and a CSV loader that understands the `...` merge markers
//! used by CSV decision tables. Binary workbook readers implement
//! [`SheetSource`] outside of this crate.
use crate::error::RuleSheetError;
use thiserror::Error;

pub mod cell;
pub mod criteria;
pub mod csv;
pub mod reference;
pub mod sheet;
pub mod workbook;

pub use cell::Cell;
pub use criteria::Criteria;
pub use sheet::{MergedRange, Sheet};
pub use workbook::Workbook;

/// Errors raised by the grid layer itself.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),

    #[error("Invalid merged range '{0}'")]
    InvalidMergedRange(String),
}

/// One step of the cell stream delivered by a grid reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetEvent {
    /// A new sheet begins
    StartSheet(String),
    /// A new row begins; cells of earlier rows will not follow
    NewRow { row: usize, columns: usize },
    /// A non-empty cell of the current row
    NewCell(Cell),
    /// The sheet is complete
    FinishSheet,
}

/// Receiver of the cell stream of one sheet.
///
/// Implementors only provide [`SheetListener::on_event`]; the remaining
/// methods mirror the calls a grid reader makes and wrap them into events.
pub trait SheetListener {
    /// Consumes one event of the stream.
    fn on_event(&mut self, event: SheetEvent) -> Result<(), RuleSheetError>;

    fn start_sheet(&mut self, name: &str) -> Result<(), RuleSheetError> {
        self.on_event(SheetEvent::StartSheet(name.to_owned()))
    }

    fn new_row(&mut self, row: usize, columns: usize) -> Result<(), RuleSheetError> {
        self.on_event(SheetEvent::NewRow { row, columns })
    }

    fn new_cell(
        &mut self,
        row: usize,
        col: usize,
        value: &str,
        merged_col_start: Option<usize>,
    ) -> Result<(), RuleSheetError> {
        self.on_event(SheetEvent::NewCell(Cell {
            row,
            col,
            value: value.to_owned(),
            merged_col_start,
        }))
    }

    fn finish_sheet(&mut self) -> Result<(), RuleSheetError> {
        self.on_event(SheetEvent::FinishSheet)
    }
}

/// A collection of sheets that can replay their cells into a listener.
///
/// External readers (xls, xlsx, ods, ...) implement this trait and wrap their
/// own failures into [`RuleSheetError::AnyhowError`].
pub trait SheetSource {
    /// Returns the sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Replays every event of the named sheet into `listener`.
    fn read_sheet(&self, name: &str, listener: &mut dyn SheetListener) -> Result<(), RuleSheetError>;
}
