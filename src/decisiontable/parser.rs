use crate::decisiontable::action_type::{ActionKind, ActionTypeRegistry};
use crate::decisiontable::assembler::assemble;
use crate::decisiontable::properties::*;
use crate::decisiontable::snippet::PLACEHOLDER_PATTERN;
use crate::decisiontable::source_builder::{BuilderId, SourceBuilder};
use crate::decisiontable::DecisionTableError;
use crate::error::RuleSheetError;
use crate::model::{Rule, RuleSet, Salience, MAX_ROWS};
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::{Cell, SheetEvent, SheetListener};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Keyword of a table-start cell.
pub const RULE_TABLE_TAG: &str = "ruletable";

const ACTION_ROW: usize = 1;
const OBJECT_TYPE_ROW: usize = 2;
const CODE_ROW: usize = 3;
const LABEL_ROW: usize = 4;

/// Options of a [`RuleSheetParser`].
#[derive(Clone, Debug)]
pub struct ParserOptions {
    /// Put the package name into the rule set
    pub show_package: bool,
    /// Trim cell values before use
    pub trim_cell: bool,
    /// Appended to every rule name prefix
    pub worksheet_name: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            show_package: true,
            trim_cell: true,
            worksheet_name: None,
        }
    }
}

/// Observable state of a [`RuleSheetParser`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TableState {
    OutsideTable,
    /// A table is open and some of its header rows have not been reached
    InTable { pending_header_rows: usize },
    InDataRows,
    Finished,
    /// A fatal error aborted the sheet
    Failed,
}

/// Everything that lives as long as one open table.
#[derive(Debug)]
struct RuleTable {
    start_row: usize,
    start_col: usize,
    /// Row of the rule being accumulated
    rule_row: usize,
    /// Furthest row seen inside the table
    last_row: usize,
    prefix: String,
    sequential: bool,
    escape_quotes: bool,
    numeric_disabled: bool,
    ignore_numeric_format: bool,
    actions: ActionTypeRegistry,
    builders: Vec<SourceBuilder>,
    ordered_builders: BTreeMap<usize, BuilderId>,
    templates_checked: bool,
}

impl RuleTable {
    fn offset(&self, row: usize) -> Option<usize> {
        row.checked_sub(self.start_row)
    }

    fn new_builder(&mut self, col: usize, kind: ActionKind, declaration: Option<&str>) -> BuilderId {
        let id = BuilderId::from(self.builders.len());
        let builder = SourceBuilder::new(self.start_row + ACTION_ROW, col, kind, declaration);
        trace!(
            cell = %index_to_reference(builder.row(), builder.column()),
            declaration = builder.declaration(),
            "new source builder"
        );
        self.builders.push(builder);
        self.ordered_builders.insert(col, id);
        self.actions.set_builder(col, Some(id));
        id
    }

    fn object_type_cell(&mut self, cell: &Cell, value: &str) -> Result<(), DecisionTableError> {
        if PLACEHOLDER_PATTERN.is_match(value) {
            return Err(DecisionTableError::SnippetInDeclarationRow {
                position: cell.reference(),
            });
        }
        let action = self.actions.get(cell.row, cell.col)?;
        if !matches!(action.kind, ActionKind::Condition | ActionKind::Action) {
            return Ok(());
        }
        match cell.merged_col_start {
            Some(start) if start != cell.col => {
                let owner = self.actions.get(cell.row, start)?;
                self.actions.set_builder(cell.col, owner.builder);
            }
            _ => {
                self.new_builder(cell.col, action.kind, Some(value));
            }
        }
        Ok(())
    }

    fn code_cell(&mut self, cell: &Cell, value: &str) -> Result<(), DecisionTableError> {
        let action = self.actions.get(cell.row, cell.col)?;
        let builder = match action.builder {
            Some(id) => id,
            None if action.kind.has_source() || action.kind == ActionKind::Salience => {
                self.new_builder(cell.col, action.kind, None)
            }
            None => {
                return Err(DecisionTableError::UnexpectedContent {
                    content: value.to_owned(),
                    position: cell.reference(),
                })
            }
        };
        self.builders[builder.index()].add_template(cell.row, cell.col, value)
    }

    /// Fails for a source column whose code cell was left blank.
    fn check_templates(&mut self) -> Result<(), DecisionTableError> {
        if self.templates_checked {
            return Ok(());
        }
        self.templates_checked = true;
        for action in self.actions.iter().filter(|action| action.kind.has_source()) {
            let has_template = action
                .builder
                .is_some_and(|id| self.builders[id.index()].has_template(action.column));
            if !has_template {
                return Err(DecisionTableError::MissingCodeTemplate {
                    position: index_to_reference(self.start_row + CODE_ROW, action.column),
                });
            }
        }
        Ok(())
    }

    /// Moves the rendered code of the current row into `rule`.
    fn flush(&mut self, rule: &mut Rule) {
        for id in self.ordered_builders.values() {
            let builder = &mut self.builders[id.index()];
            if !builder.has_values() {
                continue;
            }
            match builder.kind() {
                ActionKind::Condition => rule.conditions.push(builder.result()),
                ActionKind::Action => rule.actions.push(builder.result()),
                ActionKind::Metadata => rule.metadata.push(builder.result()),
                _ => {}
            }
            builder.clear_values();
        }
    }
}

#[derive(Debug)]
enum SheetState {
    OutsideTable,
    InTable(Box<RuleTable>),
    Finished,
    Failed(DecisionTableError),
}

/// Turns the cell events of one sheet into rules.
///
/// A parser handles exactly one sheet; the rule set is available once
/// [`SheetEvent::FinishSheet`] was applied.
#[derive(Debug)]
pub struct RuleSheetParser {
    options: ParserOptions,
    sheet_name: String,
    state: SheetState,
    properties: PropertyRegistry,
    rules: Vec<Rule>,
    current_rule: Option<usize>,
    /// Comment of every label-row cell by column, kept across tables
    comments: BTreeMap<usize, String>,
    /// Next sequential salience; may step below `i32::MIN` once
    salience: i64,
    min_salience: i32,
    table_count: usize,
}

impl Default for RuleSheetParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl RuleSheetParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            sheet_name: String::new(),
            state: SheetState::OutsideTable,
            properties: PropertyRegistry::new(),
            rules: Vec::new(),
            current_rule: None,
            comments: BTreeMap::new(),
            salience: i64::from(MAX_ROWS),
            min_salience: 0,
            table_count: 0,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn state(&self) -> TableState {
        match &self.state {
            SheetState::OutsideTable => TableState::OutsideTable,
            SheetState::Finished => TableState::Finished,
            SheetState::Failed(_) => TableState::Failed,
            SheetState::InTable(table) => match table.offset(table.last_row) {
                Some(offset) if offset > LABEL_ROW => TableState::InDataRows,
                offset => TableState::InTable {
                    pending_header_rows: LABEL_ROW - offset.unwrap_or_default(),
                },
            },
        }
    }

    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn comments(&self) -> &BTreeMap<usize, String> {
        &self.comments
    }

    /// `NumericDisabled` option of the open table.
    pub fn is_numeric_disabled(&self) -> bool {
        matches!(&self.state, SheetState::InTable(table) if table.numeric_disabled)
    }

    /// `IgnoreNumericFormat` option of the open table.
    pub fn ignores_numeric_format(&self) -> bool {
        matches!(&self.state, SheetState::InTable(table) if table.ignore_numeric_format)
    }

    /// The single transition function of the parser.
    ///
    /// A fatal error ends the sheet: every later event and the rule set
    /// return that error.
    pub fn apply(&mut self, event: SheetEvent) -> Result<(), DecisionTableError> {
        match &self.state {
            SheetState::Finished => {
                warn!(sheet = %self.sheet_name, ?event, "ignoring event after sheet finished");
                return Ok(());
            }
            SheetState::Failed(error) => return Err(error.clone()),
            _ => {}
        }
        let result = self.transition(event);
        if let Err(error) = &result {
            warn!(sheet = %self.sheet_name, %error, "sheet aborted");
            self.rules.clear();
            self.current_rule = None;
            self.state = SheetState::Failed(error.clone());
        }
        result
    }

    fn transition(&mut self, event: SheetEvent) -> Result<(), DecisionTableError> {
        match event {
            SheetEvent::StartSheet(name) => {
                debug!(sheet = %name, "start sheet");
                self.sheet_name = name;
                Ok(())
            }
            SheetEvent::NewRow { row, .. } => {
                self.properties.finish_row();
                self.flush_rule();
                if let SheetState::InTable(table) = &mut self.state {
                    table.last_row = table.last_row.max(row);
                }
                Ok(())
            }
            SheetEvent::NewCell(cell) => self.new_cell(cell),
            SheetEvent::FinishSheet => {
                self.properties.finish_row();
                self.close_table()?;
                self.state = SheetState::Finished;
                debug!(sheet = %self.sheet_name, rules = self.rules.len(), "finish sheet");
                Ok(())
            }
        }
    }

    /// Builds the rule set of the finished sheet.
    pub fn rule_set(&self) -> Result<RuleSet, DecisionTableError> {
        match &self.state {
            SheetState::Finished => {}
            SheetState::Failed(error) => return Err(error.clone()),
            _ => return Err(DecisionTableError::SheetNotFinished(self.sheet_name.to_owned())),
        }
        assemble(self.rules.clone(), &self.properties, self.options.show_package)
    }

    /// Like [`RuleSheetParser::rule_set`], without copying the rules.
    pub fn into_rule_set(self) -> Result<RuleSet, DecisionTableError> {
        match self.state {
            SheetState::Finished => {}
            SheetState::Failed(error) => return Err(error),
            _ => return Err(DecisionTableError::SheetNotFinished(self.sheet_name)),
        }
        assemble(self.rules, &self.properties, self.options.show_package)
    }

    fn new_cell(&mut self, cell: Cell) -> Result<(), DecisionTableError> {
        if cell.is_blank() {
            return Ok(());
        }
        trace!(sheet = %self.sheet_name, %cell, "new cell");
        let start_row = match &self.state {
            SheetState::InTable(table) => Some(table.start_row),
            _ => None,
        };
        match start_row {
            Some(start_row) if start_row == cell.row => Ok(()),
            Some(_) => self.rule_cell(&cell),
            None => self.non_rule_cell(&cell),
        }
    }

    fn value<'a>(&self, cell: &'a Cell) -> &'a str {
        if self.options.trim_cell {
            cell.value.trim()
        } else {
            &cell.value
        }
    }

    fn non_rule_cell(&mut self, cell: &Cell) -> Result<(), DecisionTableError> {
        let value = self.value(cell);
        if is_rule_table(value) {
            self.open_table(cell.row, cell.col, value.trim())
        } else {
            self.properties.new_cell(cell.row, cell.col, value);
            Ok(())
        }
    }

    fn rule_cell(&mut self, cell: &Cell) -> Result<(), DecisionTableError> {
        let value = self.value(cell);
        if is_rule_table(value) {
            self.close_table()?;
            return self.open_table(cell.row, cell.col, value.trim());
        }

        let SheetState::InTable(table) = &mut self.state else {
            return Ok(());
        };
        if cell.col < table.start_col {
            return Ok(());
        }
        let Some(offset) = table.offset(cell.row) else {
            warn!(cell = %cell.reference(), "cell above the open table");
            return Ok(());
        };
        table.last_row = table.last_row.max(cell.row);

        match offset {
            ACTION_ROW => table.actions.register(cell.row, cell.col, value),
            OBJECT_TYPE_ROW => table.object_type_cell(cell, value),
            CODE_ROW => table.code_cell(cell, value),
            LABEL_ROW => {
                table.check_templates()?;
                let comment = match table.actions.get(cell.row, cell.col) {
                    Ok(action) if matches!(action.kind, ActionKind::Condition | ActionKind::Action) => {
                        value.to_owned()
                    }
                    _ => format!("From cell: {}", cell.reference()),
                };
                self.comments.insert(cell.col, comment);
                Ok(())
            }
            _ => self.data_cell(cell, value),
        }
    }

    fn data_cell(&mut self, cell: &Cell, value: &str) -> Result<(), DecisionTableError> {
        let SheetState::InTable(table) = &mut self.state else {
            return Ok(());
        };
        table.check_templates()?;

        if cell.row > table.rule_row + 1 {
            debug!(cell = %cell.reference(), "row gap closes the table");
            self.close_table()?;
            return self.non_rule_cell(cell);
        }

        let action = table.actions.get(cell.row, cell.col)?;
        if cell.row > table.rule_row {
            table.rule_row = cell.row;
            self.flush_rule();
            self.new_rule(cell.row)?;
        }

        let SheetState::InTable(table) = &mut self.state else {
            return Ok(());
        };
        let Some(index) = self.current_rule else {
            return Ok(());
        };
        let rule = &mut self.rules[index];
        let position = cell.reference();

        match action.kind {
            ActionKind::Condition | ActionKind::Action | ActionKind::Metadata => {
                let id = action.builder.ok_or(DecisionTableError::MissingTemplateForCell { position })?;
                table.builders[id.index()].add_cell_value(
                    cell.row,
                    cell.col,
                    value,
                    table.escape_quotes,
                    self.options.trim_cell,
                )?;
            }
            ActionKind::Name => rule.name = value.to_owned(),
            ActionKind::Description => rule.description = Some(value.to_owned()),
            ActionKind::Salience if table.sequential => {
                trace!(cell = %position, "explicit priority ignored in sequential mode");
            }
            ActionKind::Salience => {
                let value = value.trim();
                rule.salience = Some(if value.starts_with('(') && value.ends_with(')') {
                    Salience::Expression(value.to_owned())
                } else {
                    Salience::Literal(
                        value
                            .parse()
                            .map_err(|_| DecisionTableError::InvalidPriority { position })?,
                    )
                });
            }
            kind => kind.apply(&mut rule.attributes, value, &position)?,
        }
        Ok(())
    }

    fn open_table(&mut self, row: usize, col: usize, value: &str) -> Result<(), DecisionTableError> {
        self.properties.finish_row();

        let name = value.get(RULE_TABLE_TAG.len()..).unwrap_or_default().trim();
        let prefix = match &self.options.worksheet_name {
            Some(worksheet) => format!("{} {}", name, worksheet),
            None => name.to_owned(),
        };

        if self.table_count == 0 {
            self.salience = i64::from(self.properties.integer(MAX_SALIENCE_TAG, MAX_ROWS)?);
            self.min_salience = self.properties.integer(MIN_SALIENCE_TAG, self.min_salience)?;
        }
        let table = RuleTable {
            start_row: row,
            start_col: col,
            rule_row: row + LABEL_ROW + 1,
            last_row: row,
            prefix,
            sequential: self.properties.flag(SEQUENTIAL_FLAG, false)?,
            escape_quotes: self.properties.flag(ESCAPE_QUOTES_FLAG, true)?,
            numeric_disabled: self.properties.flag(NUMERIC_DISABLED_FLAG, false)?,
            ignore_numeric_format: self.properties.flag(IGNORE_NUMERIC_FORMAT_FLAG, false)?,
            actions: ActionTypeRegistry::new(),
            builders: Vec::new(),
            ordered_builders: BTreeMap::new(),
            templates_checked: false,
        };
        debug!(
            sheet = %self.sheet_name,
            cell = %index_to_reference(row, col),
            prefix = %table.prefix,
            sequential = table.sequential,
            "open rule table"
        );
        let rule_row = table.rule_row;
        self.state = SheetState::InTable(Box::new(table));
        self.table_count += 1;
        self.new_rule(rule_row)
    }

    fn close_table(&mut self) -> Result<(), DecisionTableError> {
        self.flush_rule();
        if let SheetState::InTable(table) = &mut self.state {
            if table.offset(table.last_row).is_some_and(|offset| offset >= CODE_ROW) {
                table.check_templates()?;
            }
            debug!(
                sheet = %self.sheet_name,
                cell = %index_to_reference(table.start_row, table.start_col),
                "close rule table"
            );
        }
        self.state = SheetState::OutsideTable;
        self.current_rule = None;
        Ok(())
    }

    fn new_rule(&mut self, row: usize) -> Result<(), DecisionTableError> {
        let SheetState::InTable(table) = &self.state else {
            return Ok(());
        };
        let salience = if table.sequential {
            let next = self.salience;
            let salience = i32::try_from(next)
                .ok()
                .filter(|salience| *salience >= self.min_salience)
                .ok_or(DecisionTableError::SalienceUnderflow {
                    row: row + 1,
                    salience: next,
                    minimum: self.min_salience,
                })?;
            self.salience = next - 1;
            Some(salience)
        } else {
            None
        };

        let mut rule = Rule::new(format!("{}_{}", table.prefix, row + 1), salience, row + 1);
        rule.comment = format!(
            "rule values at {}, header at {}",
            index_to_reference(row, table.start_col),
            index_to_reference(table.start_row, table.start_col)
        );
        debug!(rule = %rule.name, ?salience, "new rule");
        self.rules.push(rule);
        self.current_rule = Some(self.rules.len() - 1);
        Ok(())
    }

    fn flush_rule(&mut self) {
        if let (SheetState::InTable(table), Some(index)) = (&mut self.state, self.current_rule) {
            table.flush(&mut self.rules[index]);
        }
    }
}

impl SheetListener for RuleSheetParser {
    fn on_event(&mut self, event: SheetEvent) -> Result<(), RuleSheetError> {
        Ok(self.apply(event)?)
    }
}

/// Returns true for the text of a table-start cell.
pub fn is_rule_table(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == RULE_TABLE_TAG || value.starts_with(&format!("{} ", RULE_TABLE_TAG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisiontable::ErrorKind;
    use pretty_assertions::assert_eq;

    /// Feeds rows of (column, value) pairs, one row per slice entry, starting at `first_row`.
    fn feed(parser: &mut RuleSheetParser, first_row: usize, rows: &[&[(usize, &str)]]) -> Result<(), DecisionTableError> {
        for (offset, cells) in rows.iter().enumerate() {
            let row = first_row + offset;
            parser.apply(SheetEvent::NewRow { row, columns: 8 })?;
            for (col, value) in cells.iter() {
                parser.apply(SheetEvent::NewCell(Cell::new(row, *col, *value)))?;
            }
        }
        Ok(())
    }

    const HEADER: &[&[(usize, &str)]] = &[
        &[(1, "RuleTable Pricing")],
        &[(1, "CONDITION"), (2, "ACTION")],
        &[(1, "Order"), (2, "$order")],
        &[(1, "total > $param"), (2, "setDiscount($param);")],
        &[(1, "Minimum total"), (2, "Discount")],
    ];

    #[test]
    fn detects_table_start() {
        assert!(is_rule_table("RuleTable"));
        assert!(is_rule_table("  ruletable Pricing "));
        assert!(is_rule_table("RULETABLE x"));
        assert!(!is_rule_table("RuleTables"));
        assert!(!is_rule_table("Rule Table"));
    }

    #[test]
    fn state_follows_header_rows() {
        let mut parser = RuleSheetParser::default();
        parser.apply(SheetEvent::StartSheet("Sheet1".to_owned())).unwrap();
        assert_eq!(parser.state(), TableState::OutsideTable);

        feed(&mut parser, 0, &HEADER[..1]).unwrap();
        assert_eq!(parser.state(), TableState::InTable { pending_header_rows: 4 });
        feed(&mut parser, 1, &HEADER[1..3]).unwrap();
        assert_eq!(parser.state(), TableState::InTable { pending_header_rows: 2 });
        feed(&mut parser, 3, &HEADER[3..]).unwrap();
        assert_eq!(parser.state(), TableState::InTable { pending_header_rows: 0 });
        feed(&mut parser, 5, &[&[(1, "100"), (2, "5")]]).unwrap();
        assert_eq!(parser.state(), TableState::InDataRows);

        parser.apply(SheetEvent::FinishSheet).unwrap();
        assert_eq!(parser.state(), TableState::Finished);
    }

    #[test]
    fn data_rows_become_rules() {
        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, HEADER).unwrap();
        feed(&mut parser, 5, &[&[(1, "100"), (2, "5")], &[(1, "500"), (2, "10")]]).unwrap();
        parser.apply(SheetEvent::FinishSheet).unwrap();

        let rule_set = parser.rule_set().unwrap();
        assert_eq!(rule_set.rules.len(), 2);
        let rule = &rule_set.rules[0];
        assert_eq!(rule.name, "Pricing_6");
        assert_eq!(rule.spreadsheet_row, 6);
        assert_eq!(rule.comment, "rule values at B6, header at B1");
        assert_eq!(rule.conditions, vec!["Order(total > 100)"]);
        assert_eq!(rule.actions, vec!["$order.setDiscount(5);"]);
        assert_eq!(rule_set.rules[1].name, "Pricing_7");
        assert_eq!(rule_set.rules[1].conditions, vec!["Order(total > 500)"]);
        assert_eq!(parser.comments().get(&1).map(String::as_str), Some("Minimum total"));
    }

    #[test]
    fn rule_set_requires_finished_sheet() {
        let mut parser = RuleSheetParser::default();
        parser.apply(SheetEvent::StartSheet("Rules".to_owned())).unwrap();
        feed(&mut parser, 0, HEADER).unwrap();
        assert_eq!(
            parser.rule_set(),
            Err(DecisionTableError::SheetNotFinished("Rules".to_owned()))
        );
    }

    #[test]
    fn empty_sheet_fails() {
        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, &[&[(0, "RuleSet"), (1, "com.acme")]]).unwrap();
        parser.apply(SheetEvent::FinishSheet).unwrap();
        assert_eq!(parser.into_rule_set(), Err(DecisionTableError::NoRuleTables));
    }

    #[test]
    fn unknown_keyword_is_reported_where_used() {
        let mut parser = RuleSheetParser::default();
        feed(
            &mut parser,
            0,
            &[&[(1, "RuleTable T")], &[(1, "CONDITION"), (2, "CONDITON")], &[(1, "Order")]],
        )
        .unwrap();
        let error = feed(&mut parser, 3, &[&[(1, "total > $param"), (2, "x")]]).unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::UnknownColumnHeader {
                keyword: "CONDITON".to_owned(),
                header: "C2".to_owned(),
                position: "C4".to_owned(),
            }
        );
        assert_eq!(error.kind(), ErrorKind::Structural);
    }

    #[test]
    fn placeholder_in_declaration_row() {
        let mut parser = RuleSheetParser::default();
        let error = feed(
            &mut parser,
            0,
            &[&[(1, "RuleTable T")], &[(1, "CONDITION")], &[(1, "total > $param")]],
        )
        .unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::SnippetInDeclarationRow {
                position: "B3".to_owned()
            }
        );
    }

    #[test]
    fn missing_code_template() {
        let mut parser = RuleSheetParser::default();
        let error = feed(
            &mut parser,
            0,
            &[
                &[(1, "RuleTable T")],
                &[(1, "CONDITION"), (2, "CONDITION")],
                &[(1, "Order"), (2, "Order")],
                &[(1, "total > $param")],
                &[(1, "Total"), (2, "Region")],
            ],
        )
        .unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::MissingCodeTemplate {
                position: "C4".to_owned()
            }
        );
    }

    #[test]
    fn code_under_attribute_column() {
        let mut parser = RuleSheetParser::default();
        let error = feed(
            &mut parser,
            0,
            &[&[(1, "RuleTable T")], &[(1, "NAME")], &[], &[(1, "$param")]],
        )
        .unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::UnexpectedContent {
                content: "$param".to_owned(),
                position: "B4".to_owned(),
            }
        );
    }

    #[test]
    fn cells_left_of_table_are_ignored() {
        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, HEADER).unwrap();
        feed(&mut parser, 5, &[&[(0, "note"), (1, "100"), (2, "5")]]).unwrap();
        parser.apply(SheetEvent::FinishSheet).unwrap();
        assert_eq!(parser.rules().len(), 1);
        assert!(!parser.properties().contains("note"));
    }

    #[test]
    fn attribute_columns() {
        let mut parser = RuleSheetParser::default();
        feed(
            &mut parser,
            0,
            &[
                &[(1, "RuleTable Attrs")],
                &[(1, "NAME"), (2, "PRIORITY"), (3, "NO-LOOP"), (4, "I"), (5, "G")],
                &[],
                &[],
                &[],
                &[(1, "first"), (2, "10"), (3, "true"), (4, "The first"), (5, "pricing")],
                &[(1, "second"), (2, "($base + 1)"), (3, "no")],
            ],
        )
        .unwrap();
        parser.apply(SheetEvent::FinishSheet).unwrap();
        let rules = parser.rules();
        assert_eq!(rules[0].name, "first");
        assert_eq!(rules[0].salience, Some(Salience::Literal(10)));
        assert_eq!(rules[0].attributes.no_loop, Some(true));
        assert_eq!(rules[0].description.as_deref(), Some("The first"));
        assert_eq!(rules[0].attributes.agenda_group.as_deref(), Some("pricing"));
        assert_eq!(rules[1].name, "second");
        assert_eq!(rules[1].salience, Some(Salience::Expression("($base + 1)".to_owned())));
        assert_eq!(rules[1].attributes.no_loop, Some(false));
    }

    #[test]
    fn invalid_attribute_values() {
        let table: &[&[(usize, &str)]] = &[&[(1, "RuleTable T")], &[(1, "PRIORITY"), (2, "ENABLED")], &[], &[], &[]];

        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, table).unwrap();
        let error = feed(&mut parser, 5, &[&[(1, "high")]]).unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::InvalidPriority {
                position: "B6".to_owned()
            }
        );
        assert_eq!(error.kind(), ErrorKind::Value);

        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, table).unwrap();
        let error = feed(&mut parser, 5, &[&[(2, "perhaps")]]).unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::InvalidBoolean {
                value: "perhaps".to_owned(),
                position: "C6".to_owned(),
            }
        );
    }

    #[test]
    fn fatal_error_ends_the_sheet() {
        let table: &[&[(usize, &str)]] = &[
            &[(1, "RuleTable T")],
            &[(1, "CONDITION"), (2, "PRIORITY")],
            &[(1, "Order")],
            &[(1, "total > $param")],
            &[],
        ];
        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, table).unwrap();
        let failure = feed(&mut parser, 5, &[&[(1, "100"), (2, "high")]]).unwrap_err();
        assert_eq!(failure, DecisionTableError::InvalidPriority { position: "C6".to_owned() });
        assert_eq!(parser.state(), TableState::Failed);
        assert!(parser.rules().is_empty());

        assert_eq!(feed(&mut parser, 6, &[&[(1, "200"), (2, "5")]]), Err(failure.clone()));
        assert_eq!(parser.apply(SheetEvent::FinishSheet), Err(failure.clone()));
        assert_eq!(parser.state(), TableState::Failed);
        assert_eq!(parser.rule_set(), Err(failure.clone()));
        assert_eq!(parser.into_rule_set(), Err(failure));
    }

    #[test]
    fn sequential_salience_at_the_integer_floor() {
        let mut parser = RuleSheetParser::default();
        feed(
            &mut parser,
            0,
            &[
                &[(0, "Sequential"), (1, "true")],
                &[(0, "SequentialMaxPriority"), (1, "-2147483648")],
                &[(0, "SequentialMinPriority"), (1, "-2147483648")],
            ],
        )
        .unwrap();
        feed(&mut parser, 3, HEADER).unwrap();
        feed(&mut parser, 8, &[&[(1, "100"), (2, "5")]]).unwrap();
        assert_eq!(parser.rules()[0].salience, Some(Salience::Literal(i32::MIN)));

        let error = feed(&mut parser, 9, &[&[(1, "200"), (2, "10")]]).unwrap_err();
        assert_eq!(
            error,
            DecisionTableError::SalienceUnderflow {
                row: 10,
                salience: i64::from(i32::MIN) - 1,
                minimum: i32::MIN,
            }
        );
    }

    #[test]
    fn numeric_options_follow_the_open_table() {
        let mut parser = RuleSheetParser::default();
        feed(&mut parser, 0, &[&[(0, "NumericDisabled"), (1, "true")], &[(0, "RuleTable T")]]).unwrap();
        assert!(parser.is_numeric_disabled());
        assert!(!parser.ignores_numeric_format());
    }

    #[test]
    fn worksheet_name_qualifies_rules() {
        let mut parser = RuleSheetParser::new(ParserOptions {
            worksheet_name: Some("EU".to_owned()),
            ..ParserOptions::default()
        });
        feed(&mut parser, 0, HEADER).unwrap();
        feed(&mut parser, 5, &[&[(1, "100"), (2, "5")]]).unwrap();
        parser.apply(SheetEvent::FinishSheet).unwrap();
        assert_eq!(parser.rules()[0].name, "Pricing EU_6");
    }
}
