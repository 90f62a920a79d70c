use crate::decisiontable::{DecisionTableError, ErrorKind};
use thiserror::Error;

/// Main error type for the crate.
/// Aggregates errors from the grid layer, the decision table parser and external readers.
#[derive(Error, Debug)]
pub enum RuleSheetError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    CsvError(#[from] csv::Error),

    // Module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    DecisionTableError(#[from] DecisionTableError),
}

impl RuleSheetError {
    /// Returns the parser error, if this error came from a decision table.
    pub fn decision_table_error(&self) -> Option<&DecisionTableError> {
        match self {
            Self::DecisionTableError(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the category of a decision table error.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.decision_table_error().map(DecisionTableError::kind)
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RuleSheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RuleSheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
