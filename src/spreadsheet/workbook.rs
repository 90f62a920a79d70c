use crate::error::RuleSheetError;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SheetListener;
use crate::spreadsheet::SheetSource;
use crate::spreadsheet::SpreadsheetError;

/// An ordered set of in-memory sheets.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Finds a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

impl SheetSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect()
    }

    fn read_sheet(&self, name: &str, listener: &mut dyn SheetListener) -> Result<(), RuleSheetError> {
        let sheet = self
            .sheet(name)
            .ok_or_else(|| SpreadsheetError::SheetNotFound(name.to_owned()))?;
        sheet.emit(listener)
    }
}
