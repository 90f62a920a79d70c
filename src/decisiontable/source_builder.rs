use crate::decisiontable::action_type::ActionKind;
use crate::decisiontable::snippet::{replace_out_of_quotes, Snippet};
use crate::decisiontable::DecisionTableError;
use crate::spreadsheet::reference::index_to_reference;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Arena index of a [`SourceBuilder`] within its table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuilderId(usize);

impl BuilderId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for BuilderId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Operators that turn a bare field template into a constraint on the cell value.
const OPERATORS: [&str; 16] = [
    "==",
    "!=",
    "<=",
    ">=",
    "<",
    ">",
    " not in",
    " in",
    " not matches",
    " matches",
    " not contains",
    " contains",
    " not memberOf",
    " memberOf",
    " soundslike",
    " excludes",
];

/// How a condition template under a pattern declaration uses its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FieldType {
    /// The template carries its own placeholders
    Normal,
    /// A bare field name, compared with `==`
    Single,
    /// A field followed by an operator
    Operator,
}

#[derive(Clone, Debug)]
struct Template {
    snippet: Snippet,
    field: FieldType,
}

impl Template {
    fn new(text: &str, constrained: bool) -> Self {
        let snippet = Snippet::new(text);
        let field = if !constrained || snippet.has_placeholder() {
            FieldType::Normal
        } else if OPERATORS.iter().any(|operator| text.ends_with(operator)) {
            FieldType::Operator
        } else {
            FieldType::Single
        };
        Self { snippet, field }
    }

    fn render(&self, value: &str, trim: bool) -> String {
        match self.field {
            FieldType::Normal => self.snippet.render(value, trim),
            FieldType::Single => format!("{} == {}", self.snippet.template(), quote_literal(value)),
            FieldType::Operator => format!("{} {}", self.snippet.template(), quote_literal(value)),
        }
    }
}

/// Renders the code of one logical column from its templates and the values of the current row.
///
/// A builder is owned by the first column of a merged group; the other columns
/// of the group add their templates and values to it.
#[derive(Clone, Debug)]
pub struct SourceBuilder {
    /// Anchor row, the action row of the table
    row: usize,
    column: usize,
    kind: ActionKind,
    declaration: String,
    templates: BTreeMap<usize, Template>,
    values: BTreeMap<usize, String>,
}

impl SourceBuilder {
    pub fn new(row: usize, column: usize, kind: ActionKind, declaration: Option<&str>) -> Self {
        Self {
            row,
            column,
            kind,
            declaration: declaration.map(str::trim).unwrap_or_default().to_owned(),
            templates: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn has_template(&self, column: usize) -> bool {
        self.templates.contains_key(&column)
    }

    /// Sets the code template of `column`.
    pub fn add_template(&mut self, row: usize, column: usize, text: &str) -> Result<(), DecisionTableError> {
        if self.templates.contains_key(&column) {
            return Err(DecisionTableError::DuplicateTemplate {
                position: index_to_reference(row, column),
            });
        }
        let constrained = self.kind == ActionKind::Condition && !self.declaration.is_empty();
        self.templates.insert(column, Template::new(text.trim(), constrained));
        Ok(())
    }

    /// Renders the template of `column` with a data cell value.
    ///
    /// A value that is empty after trimming binds nothing.
    pub fn add_cell_value(
        &mut self,
        row: usize,
        column: usize,
        value: &str,
        escape_quotes: bool,
        trim: bool,
    ) -> Result<(), DecisionTableError> {
        let value = if trim { value.trim() } else { value };
        if value.trim().is_empty() {
            return Ok(());
        }
        let template = self
            .templates
            .get(&column)
            .ok_or_else(|| DecisionTableError::MissingTemplateForCell {
                position: index_to_reference(row, column),
            })?;
        let value = if escape_quotes {
            escape_quotes_in(value)
        } else {
            Cow::Borrowed(value)
        };
        self.values.insert(column, template.render(&value, trim));
        Ok(())
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    /// Returns the code for the bound values of the current row.
    pub fn result(&self) -> String {
        let values = self.values.values().map(String::as_str);
        match self.kind {
            ActionKind::Condition => {
                let source = if self.declaration.is_empty() {
                    values.collect::<Vec<_>>().join(" ")
                } else {
                    wrap_constraints(&self.declaration, &values.collect::<Vec<_>>().join(", "))
                };
                replace_out_of_quotes(&source, "\\n", " ")
            }
            ActionKind::Action => {
                let source = if self.declaration.is_empty() {
                    values.collect::<Vec<_>>().join("\n")
                } else {
                    values
                        .map(|value| format!("{}.{}", self.declaration, value))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                replace_out_of_quotes(&source, "\\n", " ")
            }
            _ => values.collect::<Vec<_>>().join(" "),
        }
    }
}

/// Places constraints inside the pattern parentheses of a declaration.
fn wrap_constraints(declaration: &str, constraints: &str) -> String {
    let Some(open) = declaration.find('(') else {
        return format!("{}({})", declaration, constraints);
    };
    let mut depth = 0;
    for (index, c) in declaration[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + index;
                    let separator = if declaration[open + 1..close].trim().is_empty() {
                        ""
                    } else {
                        ", "
                    };
                    return format!(
                        "{}{}{}{}",
                        &declaration[..close],
                        separator,
                        constraints,
                        &declaration[close..]
                    );
                }
            }
            _ => {}
        }
    }
    format!("{}({})", declaration, constraints)
}

/// Escapes double quotes that are not already escaped.
///
/// A value wrapped in quotes keeps its outer pair.
fn escape_quotes_in(value: &str) -> Cow<'_, str> {
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    let inner = if quoted { &value[1..value.len() - 1] } else { value };
    if !inner.contains('"') {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    if quoted {
        escaped.push('"');
    }
    let mut previous = None;
    for c in inner.chars() {
        if c == '"' && previous != Some('\\') {
            escaped.push('\\');
        }
        escaped.push(c);
        previous = Some(c);
    }
    if quoted {
        escaped.push('"');
    }
    Cow::Owned(escaped)
}

/// Quotes a value unless the rule language reads it as a literal or an expression.
fn quote_literal(value: &str) -> Cow<'_, str> {
    let numeric = value.parse::<f64>().is_ok() && value.starts_with(|c: char| c.is_ascii_digit() || "+-.".contains(c));
    let literal = numeric
        || matches!(value, "true" | "false" | "null")
        || (value.len() >= 2 && value.starts_with('"') && value.ends_with('"'))
        || value.starts_with('$')
        || (value.starts_with('(') && value.ends_with(')'));
    if literal {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("\"{}\"", value))
    }
}
