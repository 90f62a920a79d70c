//! # Decision Table Module
//!
//! Turns the cell stream of a sheet into a [`RuleSet`](crate::model::RuleSet).
//!
//! A table starts at a cell reading `RuleTable <name>`. The four rows below
//! it are headers:
//!
//! 1. column kind: `CONDITION`, `ACTION`, `METADATA` or a rule attribute
//!    such as `PRIORITY` or `NO-LOOP`
//! 2. object type: the pattern type of a condition, or the bound variable of
//!    an action. Merging cells here groups the constraints below them into
//!    one pattern
//! 3. code: the snippet template, with `$param`, `$1`..`$n` or `forall`
//!    placeholders
//! 4. label: a free-text comment per column
//!
//! Every following row is one rule whose cells fill the templates. A blank
//! row ends the table. Cells outside tables are sheet properties (package
//! name, imports, globals, options).
use thiserror::Error;

pub mod action_type;
pub mod assembler;
pub mod compiler;
pub mod parser;
pub mod properties;
pub mod snippet;
pub mod source_builder;

pub use action_type::{ActionKind, ActionType, ActionTypeRegistry};
pub use compiler::{compile_sheet, compile_sheets, compile_workbook, SheetOutcome};
pub use parser::{ParserOptions, RuleSheetParser, TableState};
pub use properties::{PropertyEntry, PropertyRegistry};
pub use snippet::{Snippet, SnippetKind};
pub use source_builder::{BuilderId, SourceBuilder};

/// Category of a decision table error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The table or the sheet properties are malformed
    Structural,
    /// A cell value cannot be interpreted
    Value,
    /// Sequential salience ran below its minimum
    Sequencing,
}

/// Fatal errors raised while parsing a decision table sheet.
///
/// Every cell-scoped variant carries the Excel-style reference of the cell.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecisionTableError {
    #[error("Multiple values for {tag} in cells [{}]", cells.join(", "))]
    MultipleValues { tag: String, cells: Vec<String> },

    #[error("Code description in cell {position} does not have an 'ACTION' or 'CONDITION' column header")]
    MissingColumnHeader { position: String },

    #[error("Invalid column header '{keyword}' in cell {header}, referenced by cell {position}; expected CONDITION, ACTION or a rule attribute")]
    UnknownColumnHeader {
        keyword: String,
        header: String,
        position: String,
    },

    #[error("Maximum number of {header} columns is 1, in cell {position}")]
    DuplicateAttributeColumn { header: String, position: String },

    #[error("It looks like you have snippets in the row that is meant for object declarations. Please insert an additional row before the snippets, at cell {position}")]
    SnippetInDeclarationRow { position: String },

    #[error("Code description in cell {position} does not contain any code specification. It should!")]
    MissingCodeTemplate { position: String },

    #[error("Cell {position} adds a second code snippet to the same column")]
    DuplicateTemplate { position: String },

    #[error("Unexpected content \"{content}\" in cell {position}, leave this cell blank")]
    UnexpectedContent { content: String, position: String },

    #[error("No code specified for data cell {position}")]
    MissingTemplateForCell { position: String },

    #[error("The format for global variables is incorrect. It should be: 'Class name, Class otherName'. But it was: '{value}', in cell {position}")]
    InvalidGlobal { value: String, position: String },

    #[error("No RuleTable cells in spreadsheet")]
    NoRuleTables,

    #[error("The rule set of sheet '{0}' is not available before the sheet is finished")]
    SheetNotFinished(String),

    #[error("Priority is not an integer literal, in cell {position}")]
    InvalidPriority { position: String },

    #[error("Duration is not an integer literal, in cell {position}")]
    InvalidDuration { position: String },

    #[error("Cannot interpret '{value}' as a boolean, in cell {position}")]
    InvalidBoolean { value: String, position: String },

    #[error("Invalid numeric value '{value}' for option {name}")]
    InvalidOption { name: String, value: String },

    #[error("Salience {salience} is less than the minimum {minimum} specified, on row {row}")]
    SalienceUnderflow { row: usize, salience: i64, minimum: i32 },
}

impl DecisionTableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MultipleValues { .. }
            | Self::MissingColumnHeader { .. }
            | Self::UnknownColumnHeader { .. }
            | Self::DuplicateAttributeColumn { .. }
            | Self::SnippetInDeclarationRow { .. }
            | Self::MissingCodeTemplate { .. }
            | Self::DuplicateTemplate { .. }
            | Self::UnexpectedContent { .. }
            | Self::MissingTemplateForCell { .. }
            | Self::InvalidGlobal { .. }
            | Self::NoRuleTables
            | Self::SheetNotFinished(_) => ErrorKind::Structural,
            Self::InvalidPriority { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidBoolean { .. }
            | Self::InvalidOption { .. } => ErrorKind::Value,
            Self::SalienceUnderflow { .. } => ErrorKind::Sequencing,
        }
    }
}
