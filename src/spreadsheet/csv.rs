//! CSV decision-table loader.
//!
//! CSV has no merged cells, so spans are marked in the text: a cell ending
//! with `...` opens a horizontal merge and the next cell starting with `...`
//! closes it. The markers are stripped from the stored values.
use crate::error::RuleSheetError;
use crate::spreadsheet::sheet::MergedRange;
use crate::spreadsheet::sheet::Sheet;
use anyhow::Context;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const MERGE_MARKER: &str = "...";

impl Sheet {
    /// Reads a sheet from CSV text.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R) -> Result<Sheet, RuleSheetError> {
        let mut sheet = Sheet::new(name);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut row = 0usize;
        let mut next_line = 1u64;
        for record in reader.records() {
            let record = record?;
            // The reader skips empty lines; they still count as sheet rows.
            let line = record.position().map_or(next_line, |position| position.line());
            let skipped = usize::try_from(line.saturating_sub(next_line)).unwrap_or_default();
            row += skipped;
            next_line = line + 1 + record.iter().map(|field| field.matches('\n').count() as u64).sum::<u64>();
            let mut merge_start = None::<usize>;
            for (col, field) in record.iter().enumerate() {
                let mut value = field;
                let trimmed = value.trim();
                if let Some(stripped) = trimmed.strip_prefix(MERGE_MARKER).filter(|_| merge_start.is_some()) {
                    value = stripped;
                    if let Some(first_col) = merge_start.take() {
                        sheet.merge(MergedRange {
                            first_row: row,
                            last_row: row,
                            first_col,
                            last_col: col,
                        });
                    }
                } else if let Some(stripped) = trimmed.strip_suffix(MERGE_MARKER) {
                    value = stripped;
                    merge_start = Some(col);
                }
                sheet.set(row, col, value);
            }
            if let Some(first_col) = merge_start {
                // An unterminated span runs to the end of the record.
                let last_col = record.len().saturating_sub(1);
                if first_col < last_col {
                    sheet.merge(MergedRange {
                        first_row: row,
                        last_row: row,
                        first_col,
                        last_col,
                    });
                }
            }
            row += 1;
        }
        Ok(sheet)
    }

    /// Reads a sheet from a CSV file; the sheet is named after the file stem.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Sheet, RuleSheetError> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        Sheet::from_csv_reader(&name, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::Cell;

    #[test]
    fn reads_cells_by_position() {
        let text = "RuleSet,org.example\n\nRuleTable Pricing\nCONDITION,ACTION\n";
        let sheet = Sheet::from_csv_reader("pricing", text.as_bytes()).unwrap();

        assert_eq!(sheet.get(0, 0), Some("RuleSet"));
        assert_eq!(sheet.get(0, 1), Some("org.example"));
        assert_eq!(sheet.get(2, 0), Some("RuleTable Pricing"));
        assert_eq!(sheet.get(3, 1), Some("ACTION"));
    }

    #[test]
    fn merge_markers_become_merged_ranges() {
        let text = "CONDITION,CONDITION,ACTION\nPerson...,...,\n";
        let sheet = Sheet::from_csv_reader("merged", text.as_bytes()).unwrap();

        assert_eq!(
            sheet.merges(),
            &[MergedRange {
                first_row: 1,
                last_row: 1,
                first_col: 0,
                last_col: 1,
            }]
        );
        assert_eq!(
            sheet.row_cells(1),
            vec![Cell::new(1, 0, "Person").merged(0), Cell::new(1, 1, "Person").merged(0)]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let error = Sheet::from_csv_path("does/not/exist.csv").unwrap_err();
        assert!(error.to_string().contains("does/not/exist.csv"));
    }
}
