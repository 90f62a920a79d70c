use crate::decisiontable::source_builder::BuilderId;
use crate::decisiontable::DecisionTableError;
use crate::model::Attributes;
use crate::spreadsheet::cell::parse_boolean;
use crate::spreadsheet::reference::index_to_reference;
use std::collections::BTreeMap;
use tracing::warn;

/// Role of a table column, declared by the keyword in its action row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Condition,
    Action,
    Metadata,
    Name,
    Description,
    Salience,
    Duration,
    Timer,
    Enabled,
    Calendars,
    NoLoop,
    LockOnActive,
    AutoFocus,
    ActivationGroup,
    AgendaGroup,
    RuleflowGroup,
    DateEffective,
    DateExpires,
}

impl ActionKind {
    pub const ALL: [ActionKind; 18] = [
        ActionKind::Condition,
        ActionKind::Action,
        ActionKind::Metadata,
        ActionKind::Name,
        ActionKind::Description,
        ActionKind::Salience,
        ActionKind::Duration,
        ActionKind::Timer,
        ActionKind::Enabled,
        ActionKind::Calendars,
        ActionKind::NoLoop,
        ActionKind::LockOnActive,
        ActionKind::AutoFocus,
        ActionKind::ActivationGroup,
        ActionKind::AgendaGroup,
        ActionKind::RuleflowGroup,
        ActionKind::DateEffective,
        ActionKind::DateExpires,
    ];

    /// Kinds that may also be set for the whole rule set through a property.
    pub const ATTRIBUTES: [ActionKind; 13] = [
        ActionKind::Salience,
        ActionKind::Duration,
        ActionKind::Timer,
        ActionKind::Enabled,
        ActionKind::Calendars,
        ActionKind::NoLoop,
        ActionKind::LockOnActive,
        ActionKind::AutoFocus,
        ActionKind::ActivationGroup,
        ActionKind::AgendaGroup,
        ActionKind::RuleflowGroup,
        ActionKind::DateEffective,
        ActionKind::DateExpires,
    ];

    /// Full keyword of the action row.
    pub const fn header(&self) -> &'static str {
        match self {
            ActionKind::Condition => "CONDITION",
            ActionKind::Action => "ACTION",
            ActionKind::Metadata => "METADATA",
            ActionKind::Name => "NAME",
            ActionKind::Description => "DESCRIPTION",
            ActionKind::Salience => "PRIORITY",
            ActionKind::Duration => "DURATION",
            ActionKind::Timer => "TIMER",
            ActionKind::Enabled => "ENABLED",
            ActionKind::Calendars => "CALENDARS",
            ActionKind::NoLoop => "NO-LOOP",
            ActionKind::LockOnActive => "LOCK-ON-ACTIVE",
            ActionKind::AutoFocus => "AUTO-FOCUS",
            ActionKind::ActivationGroup => "ACTIVATION-GROUP",
            ActionKind::AgendaGroup => "AGENDA-GROUP",
            ActionKind::RuleflowGroup => "RULEFLOW-GROUP",
            ActionKind::DateEffective => "DATE-EFFECTIVE",
            ActionKind::DateExpires => "DATE-EXPIRES",
        }
    }

    /// One-letter form of the keyword.
    pub const fn short(&self) -> &'static str {
        match self {
            ActionKind::Condition => "C",
            ActionKind::Action => "A",
            ActionKind::Metadata => "@",
            ActionKind::Name => "N",
            ActionKind::Description => "I",
            ActionKind::Salience => "P",
            ActionKind::Duration => "D",
            ActionKind::Timer => "T",
            ActionKind::Enabled => "B",
            ActionKind::Calendars => "E",
            ActionKind::NoLoop => "U",
            ActionKind::LockOnActive => "L",
            ActionKind::AutoFocus => "F",
            ActionKind::ActivationGroup => "X",
            ActionKind::AgendaGroup => "G",
            ActionKind::RuleflowGroup => "R",
            ActionKind::DateEffective => "V",
            ActionKind::DateExpires => "Z",
        }
    }

    /// Maximum number of columns of this kind per table, `None` if unlimited.
    pub const fn max_count(&self) -> Option<usize> {
        match self {
            ActionKind::Condition | ActionKind::Action | ActionKind::Metadata => None,
            _ => Some(1),
        }
    }

    /// Returns true for the kinds whose cells render code through a source builder.
    pub const fn has_source(&self) -> bool {
        matches!(self, ActionKind::Condition | ActionKind::Action | ActionKind::Metadata)
    }

    /// Looks up an action-row keyword, either the full header or the one-letter form.
    pub fn parse(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_uppercase();
        if keyword == "SALIENCE" {
            return Some(ActionKind::Salience);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.header() == keyword)
            .or_else(|| Self::ALL.into_iter().find(|kind| kind.short() == keyword))
    }

    /// Writes a scalar attribute value into `attributes`.
    ///
    /// Kinds without a scalar attribute are left alone.
    pub(crate) fn apply(
        &self,
        attributes: &mut Attributes,
        value: &str,
        position: &str,
    ) -> Result<(), DecisionTableError> {
        let flag = || {
            parse_boolean(value).ok_or_else(|| DecisionTableError::InvalidBoolean {
                value: value.to_owned(),
                position: position.to_owned(),
            })
        };
        match self {
            ActionKind::Duration => {
                let duration = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| DecisionTableError::InvalidDuration {
                        position: position.to_owned(),
                    })?;
                attributes.duration = Some(duration);
            }
            ActionKind::NoLoop => attributes.no_loop = Some(flag()?),
            ActionKind::LockOnActive => attributes.lock_on_active = Some(flag()?),
            ActionKind::AutoFocus => attributes.auto_focus = Some(flag()?),
            ActionKind::Enabled => attributes.enabled = Some(flag()?),
            ActionKind::Timer => attributes.timer = Some(value.to_owned()),
            ActionKind::Calendars => attributes.calendars = Some(value.to_owned()),
            ActionKind::ActivationGroup => attributes.activation_group = Some(value.to_owned()),
            ActionKind::AgendaGroup => attributes.agenda_group = Some(value.to_owned()),
            ActionKind::RuleflowGroup => attributes.ruleflow_group = Some(value.to_owned()),
            ActionKind::DateEffective => attributes.date_effective = Some(value.to_owned()),
            ActionKind::DateExpires => attributes.date_expires = Some(value.to_owned()),
            ActionKind::Condition
            | ActionKind::Action
            | ActionKind::Metadata
            | ActionKind::Name
            | ActionKind::Description
            | ActionKind::Salience => {}
        }
        Ok(())
    }
}

/// A registered table column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActionType {
    pub column: usize,
    pub kind: ActionKind,
    /// Builder rendering this column, shared by the columns of a merged group
    pub builder: Option<BuilderId>,
}

#[derive(Clone, Debug)]
enum ColumnRole {
    Known(ActionType),
    Unrecognized { keyword: String, header: String },
}

/// Column roles of the open table.
#[derive(Clone, Debug, Default)]
pub struct ActionTypeRegistry {
    columns: BTreeMap<usize, ColumnRole>,
}

impl ActionTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the role declared by an action-row cell.
    ///
    /// Unknown keywords are kept and only reported when the column is used.
    pub fn register(&mut self, row: usize, col: usize, keyword: &str) -> Result<(), DecisionTableError> {
        let header = index_to_reference(row, col);
        let Some(kind) = ActionKind::parse(keyword) else {
            warn!(cell = %header, keyword, "unrecognized column keyword");
            self.columns.insert(
                col,
                ColumnRole::Unrecognized {
                    keyword: keyword.to_owned(),
                    header,
                },
            );
            return Ok(());
        };

        if let Some(max_count) = kind.max_count() {
            let count = self
                .iter()
                .filter(|action| action.kind == kind && action.column != col)
                .count();
            if count >= max_count {
                return Err(DecisionTableError::DuplicateAttributeColumn {
                    header: kind.header().to_owned(),
                    position: header,
                });
            }
        }

        self.columns.insert(
            col,
            ColumnRole::Known(ActionType {
                column: col,
                kind,
                builder: None,
            }),
        );
        Ok(())
    }

    /// Returns the role of `col` for a cell at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Result<ActionType, DecisionTableError> {
        match self.columns.get(&col) {
            Some(ColumnRole::Known(action)) => Ok(*action),
            Some(ColumnRole::Unrecognized { keyword, header }) => Err(DecisionTableError::UnknownColumnHeader {
                keyword: keyword.to_owned(),
                header: header.to_owned(),
                position: index_to_reference(row, col),
            }),
            None => Err(DecisionTableError::MissingColumnHeader {
                position: index_to_reference(row, col),
            }),
        }
    }

    /// Binds `col` to a builder. Unknown columns are left untouched.
    pub fn set_builder(&mut self, col: usize, builder: Option<BuilderId>) {
        if let Some(ColumnRole::Known(action)) = self.columns.get_mut(&col) {
            action.builder = builder;
        }
    }

    /// Iterates the recognized columns in column order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionType> {
        self.columns.values().filter_map(|role| match role {
            ColumnRole::Known(action) => Some(action),
            ColumnRole::Unrecognized { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
