use crate::error::RuleSheetError;
use glob::Pattern;

/// Criteria for selecting which sheets of a workbook are compiled.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns for filtering which sheets to process.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to read.
    pub sheet_limit: Option<usize>,

    /// Append the sheet name to every rule name prefix.
    pub qualify_rule_names: bool,
}

impl Criteria {
    /// Builds criteria from glob patterns such as `"Pricing*"`.
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RuleSheetError> {
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria {
            sheet_name_patterns: Some(patterns),
            ..Criteria::default()
        })
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }

    /// Applies the patterns and the sheet limit to a list of sheet names.
    pub fn select(&self, sheet_names: Vec<String>) -> Vec<String> {
        let limit = self.sheet_limit.unwrap_or(usize::MAX);
        sheet_names
            .into_iter()
            .filter(|name| self.accept(name))
            .take(limit)
            .collect()
    }
}
