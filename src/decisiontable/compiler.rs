use crate::decisiontable::parser::{ParserOptions, RuleSheetParser};
use crate::error::{ResultMessage, RuleSheetError};
use crate::model::RuleSet;
use crate::spreadsheet::{Criteria, SheetSource};
use tracing::{debug, warn};

/// Compilation result of one sheet.
#[derive(Debug)]
pub struct SheetOutcome {
    pub sheet_name: String,
    pub result: Result<RuleSet, RuleSheetError>,
}

/// Compiles one sheet of `source` with a fresh parser.
///
/// # Arguments
/// * `source` - Workbook or other grid reader holding the sheet
/// * `sheet_name` - Exact name of the sheet
/// * `options` - Parser options
///
/// # Returns
/// * `Result<RuleSet, RuleSheetError>` - Rule set of the sheet, or the first fatal error
pub fn compile_sheet<S>(source: &S, sheet_name: &str, options: &ParserOptions) -> Result<RuleSet, RuleSheetError>
where
    S: SheetSource + ?Sized,
{
    let mut parser = RuleSheetParser::new(options.to_owned());
    source.read_sheet(sheet_name, &mut parser)?;
    Ok(parser.into_rule_set()?)
}

/// Compiles every sheet selected by `criteria`, one outcome per sheet.
///
/// A failed sheet does not stop the others.
pub fn compile_sheets<S>(source: &S, options: &ParserOptions, criteria: &Criteria) -> Vec<SheetOutcome>
where
    S: SheetSource + ?Sized,
{
    criteria
        .select(source.sheet_names())
        .into_iter()
        .map(|sheet_name| {
            let result = compile_sheet(source, &sheet_name, &sheet_options(options, criteria, &sheet_name));
            match &result {
                Ok(rule_set) => debug!(sheet = %sheet_name, rules = rule_set.rules.len(), "sheet compiled"),
                Err(error) => warn!(sheet = %sheet_name, %error, "sheet failed"),
            }
            SheetOutcome { sheet_name, result }
        })
        .collect()
}

/// Compiles every sheet selected by `criteria`, stopping at the first failure.
///
/// The error is prefixed with the name of the failing sheet.
pub fn compile_workbook<S>(
    source: &S,
    options: &ParserOptions,
    criteria: &Criteria,
) -> Result<Vec<RuleSet>, RuleSheetError>
where
    S: SheetSource + ?Sized,
{
    criteria
        .select(source.sheet_names())
        .iter()
        .map(|sheet_name| {
            compile_sheet(source, sheet_name, &sheet_options(options, criteria, sheet_name)).with_prefix(sheet_name)
        })
        .collect()
}

fn sheet_options(options: &ParserOptions, criteria: &Criteria, sheet_name: &str) -> ParserOptions {
    if criteria.qualify_rule_names {
        ParserOptions {
            worksheet_name: Some(sheet_name.to_owned()),
            ..options.to_owned()
        }
    } else {
        options.to_owned()
    }
}
