//! # Rusty Rule Table
//!
//! Compiles spreadsheet decision tables into rule sets for a declarative rule
//! engine. Business users write one rule per row; the column headers carry the
//! code templates that the row values fill in.
//!
//! ## Features
//!
//! - **Push-based parsing**: grid readers stream cell events into a
//!   [`RuleSheetParser`]; the physical file format never reaches the parser
//! - **Merged columns**: constraints under a merged object-type cell share one
//!   pattern
//! - **Snippet templates**: `$param`, indexed `$1..$n` and `forall(...){...}`
//!   placeholders
//! - **Sequential salience**: descending rule priorities with a lower bound
//! - **Precise errors**: every fatal error names the offending cell (e.g. `B12`)
//! - **Grid sources**: in-memory [`Sheet`]s with merged ranges, and CSV decision
//!   tables using `...` merge markers
//!
//! ## Example
//!
//! ```
//! use rusty_ruletable::{compile_sheet, ParserOptions, Sheet, Workbook};
//!
//! let sheet = Sheet::from_rows(
//!     "Pricing",
//!     [
//!         vec!["RuleTable Discounts"],
//!         vec!["CONDITION", "ACTION"],
//!         vec!["Order", "$order"],
//!         vec!["total > $param", "setDiscount($param);"],
//!         vec!["Minimum total", "Discount"],
//!         vec!["100", "5"],
//!     ],
//! );
//! let workbook = Workbook::new(vec![sheet]);
//! let rule_set = compile_sheet(&workbook, "Pricing", &ParserOptions::default()).unwrap();
//! assert_eq!(rule_set.rules[0].conditions, vec!["Order(total > 100)"]);
//! ```
pub mod decisiontable;
pub mod error;
pub mod model;
pub mod spreadsheet;

pub use decisiontable::{
    compile_sheet, compile_sheets, compile_workbook, DecisionTableError, ErrorKind, ParserOptions, RuleSheetParser,
    SheetOutcome, TableState,
};
pub use error::RuleSheetError;
pub use model::{Attributes, Global, Import, Rule, RuleSet, Salience};
pub use spreadsheet::{Cell, Criteria, MergedRange, Sheet, SheetEvent, SheetListener, SheetSource, Workbook};
