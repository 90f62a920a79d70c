//! Rule-set model produced from decision tables.
//!
//! The model stays close to the declarative rule language it targets, but it
//! carries snippets as plain text. Checking their grammar is left to the
//! downstream compiler.
use std::fmt::Display;

/// Default starting value for sequential salience.
pub const MAX_ROWS: i32 = 65535;

/// Priority of a rule: a literal or an expression evaluated by the rule engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Salience {
    Literal(i32),
    Expression(String),
}

impl Display for Salience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Salience::Literal(value) => write!(f, "{}", value),
            Salience::Expression(expression) => write!(f, "{}", expression),
        }
    }
}

/// Scalar rule attributes, shared by rules and by rule-set defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub activation_group: Option<String>,
    pub agenda_group: Option<String>,
    pub ruleflow_group: Option<String>,
    pub no_loop: Option<bool>,
    pub lock_on_active: Option<bool>,
    pub auto_focus: Option<bool>,
    pub duration: Option<i64>,
    pub timer: Option<String>,
    pub enabled: Option<bool>,
    pub calendars: Option<String>,
    pub date_effective: Option<String>,
    pub date_expires: Option<String>,
}

/// One rule generated from a data row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub salience: Option<Salience>,
    pub description: Option<String>,
    /// Where the rule came from, e.g. "rule values at B12, header at B7"
    pub comment: String,
    pub conditions: Vec<String>,
    pub actions: Vec<String>,
    pub metadata: Vec<String>,
    pub attributes: Attributes,
    /// Spreadsheet row the rule was generated from (1-based)
    pub spreadsheet_row: usize,
}

impl Rule {
    pub fn new(name: String, salience: Option<i32>, spreadsheet_row: usize) -> Self {
        Self {
            name,
            salience: salience.map(Salience::Literal),
            spreadsheet_row,
            ..Self::default()
        }
    }
}

/// An import of a type into the rule set's namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub class_name: String,
}

/// A global variable declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Global {
    pub class_name: String,
    pub identifier: String,
}

/// The complete output of one sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Package name, `None` when package output is disabled
    pub name: Option<String>,
    pub rules: Vec<Rule>,
    pub imports: Vec<Import>,
    pub globals: Vec<Global>,
    pub functions: Vec<String>,
    pub queries: Vec<String>,
    pub declared_types: Vec<String>,
    pub unit: Option<String>,
    pub dialect: Option<String>,
    /// Default salience for every rule
    pub salience: Option<i32>,
    /// Default attributes for every rule
    pub attributes: Attributes,
}

impl RuleSet {
    /// Finds a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
}
