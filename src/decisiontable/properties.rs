use crate::decisiontable::DecisionTableError;
use crate::spreadsheet::cell::parse_boolean;
use crate::spreadsheet::reference::index_to_reference;
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

pub const RULESET_TAG: &str = "RuleSet";
pub const UNIT_TAG: &str = "Unit";
pub const DIALECT_TAG: &str = "Dialect";
pub const IMPORT_TAG: &str = "Import";
pub const VARIABLES_TAG: &str = "Variables";
pub const FUNCTIONS_TAG: &str = "Functions";
pub const QUERIES_TAG: &str = "Queries";
pub const DECLARES_TAG: &str = "Declare";
pub const SEQUENTIAL_FLAG: &str = "Sequential";
pub const ESCAPE_QUOTES_FLAG: &str = "EscapeQuotes";
pub const NUMERIC_DISABLED_FLAG: &str = "NumericDisabled";
pub const IGNORE_NUMERIC_FORMAT_FLAG: &str = "IgnoreNumericFormat";
pub const MAX_SALIENCE_TAG: &str = "SequentialMaxPriority";
pub const MIN_SALIENCE_TAG: &str = "SequentialMinPriority";

/// One value of a property and the cell it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    pub value: String,
    /// Excel-style reference of the value cell
    pub position: String,
}

/// Key/value pairs found outside rule tables.
///
/// Each row holds one property: its first cell is the tag, the next one the
/// value. Tags are case-insensitive and may repeat.
#[derive(Clone, Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, Vec<PropertyEntry>>,
    pending_row: Option<usize>,
    pending_cells: BTreeMap<usize, String>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects a non-table cell. A cell of another row completes the pending row.
    pub fn new_cell(&mut self, row: usize, col: usize, value: &str) {
        if self.pending_row.is_some_and(|pending| pending != row) {
            self.finish_row();
        }
        self.pending_row = Some(row);
        self.pending_cells.insert(col, value.to_owned());
    }

    /// Turns the cells of the pending row into a property.
    pub fn finish_row(&mut self) {
        let Some(row) = self.pending_row.take() else {
            return;
        };
        let mut cells = std::mem::take(&mut self.pending_cells).into_iter();
        let Some((_, tag)) = cells.next() else {
            return;
        };
        let Some((col, value)) = cells.next() else {
            trace!(row, tag = %tag, "property without value");
            return;
        };
        let extra = cells.count();
        if extra > 0 {
            warn!(row, tag = %tag, extra, "ignoring extra cells of property row");
        }
        self.insert(tag.trim(), value.trim(), index_to_reference(row, col));
    }

    pub fn insert(&mut self, tag: &str, value: &str, position: String) {
        self.properties
            .entry(tag.to_lowercase())
            .or_default()
            .push(PropertyEntry {
                value: value.to_owned(),
                position,
            });
    }

    /// All entries of `tag` in sheet order.
    pub fn entries(&self, tag: &str) -> &[PropertyEntry] {
        self.properties
            .get(&tag.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn values(&self, tag: &str) -> Vec<&str> {
        self.entries(tag).iter().map(|entry| entry.value.as_str()).collect()
    }

    pub fn first(&self, tag: &str) -> Option<&str> {
        self.entries(tag).first().map(|entry| entry.value.as_str())
    }

    pub fn contains(&self, tag: &str) -> bool {
        !self.entries(tag).is_empty()
    }

    /// Returns the only entry of `tag`, failing if the tag was given more than once.
    pub fn single(&self, tag: &str) -> Result<Option<&PropertyEntry>, DecisionTableError> {
        match self.entries(tag) {
            [] => Ok(None),
            [entry] => Ok(Some(entry)),
            entries => Err(DecisionTableError::MultipleValues {
                tag: tag.to_owned(),
                cells: entries.iter().map(|entry| entry.position.to_owned()).collect(),
            }),
        }
    }

    /// Reads a boolean option.
    pub fn flag(&self, tag: &str, default: bool) -> Result<bool, DecisionTableError> {
        let Some(entry) = self.single(tag)? else {
            return Ok(default);
        };
        parse_boolean(&entry.value).ok_or_else(|| DecisionTableError::InvalidBoolean {
            value: entry.value.to_owned(),
            position: entry.position.to_owned(),
        })
    }

    /// Reads an integer option.
    pub fn integer(&self, tag: &str, default: i32) -> Result<i32, DecisionTableError> {
        let Some(entry) = self.single(tag)? else {
            return Ok(default);
        };
        entry
            .value
            .trim()
            .parse()
            .map_err(|_| DecisionTableError::InvalidOption {
                name: tag.to_owned(),
                value: entry.value.to_owned(),
            })
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(rows: &[(usize, &[&str])]) -> PropertyRegistry {
        let mut registry = PropertyRegistry::new();
        for (row, cells) in rows {
            for (col, value) in cells.iter().enumerate() {
                registry.new_cell(*row, col + 1, value);
            }
        }
        registry.finish_row();
        registry
    }

    #[test]
    fn rows_become_properties() {
        let registry = registry(&[
            (0, &["RuleSet", "com.acme.pricing"]),
            (1, &["Import", "com.acme.Order, com.acme.Customer"]),
            (2, &["import", "java.util.List"]),
            (3, &["Notes"]),
        ]);
        assert_eq!(registry.first("ruleset"), Some("com.acme.pricing"));
        assert_eq!(registry.values("IMPORT"), vec!["com.acme.Order, com.acme.Customer", "java.util.List"]);
        assert_eq!(registry.entries("Import")[1].position, "C3");
        assert!(!registry.contains("Notes"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn extra_cells_are_ignored() {
        let registry = registry(&[(4, &["Unit", "pricing", "ignored"])]);
        assert_eq!(registry.values("Unit"), vec!["pricing"]);
    }

    #[test]
    fn single_value_tags() {
        let registry = registry(&[(0, &["RuleSet", "a"]), (2, &["RULESET", "b"])]);
        assert_eq!(
            registry.single("RuleSet"),
            Err(DecisionTableError::MultipleValues {
                tag: "RuleSet".to_owned(),
                cells: vec!["C1".to_owned(), "C3".to_owned()],
            })
        );
        assert_eq!(registry.single("Unit"), Ok(None));
    }

    #[test]
    fn typed_options() {
        let registry = registry(&[
            (0, &["Sequential", "true"]),
            (1, &["EscapeQuotes", "maybe"]),
            (2, &["SequentialMaxPriority", "100"]),
            (3, &["SequentialMinPriority", "ten"]),
        ]);
        assert_eq!(registry.flag(SEQUENTIAL_FLAG, false), Ok(true));
        assert_eq!(registry.flag(NUMERIC_DISABLED_FLAG, false), Ok(false));
        assert_eq!(
            registry.flag(ESCAPE_QUOTES_FLAG, true),
            Err(DecisionTableError::InvalidBoolean {
                value: "maybe".to_owned(),
                position: "C2".to_owned(),
            })
        );
        assert_eq!(registry.integer(MAX_SALIENCE_TAG, 0), Ok(100));
        assert_eq!(
            registry.integer(MIN_SALIENCE_TAG, 0),
            Err(DecisionTableError::InvalidOption {
                name: MIN_SALIENCE_TAG.to_owned(),
                value: "ten".to_owned(),
            })
        );
    }
}
