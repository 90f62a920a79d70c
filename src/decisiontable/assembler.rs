use crate::decisiontable::action_type::ActionKind;
use crate::decisiontable::properties::*;
use crate::decisiontable::DecisionTableError;
use crate::model::{Global, Import, Rule, RuleSet};

pub const DEFAULT_RULESET_NAME: &str = "rule_table";

/// Builds the rule set of a finished sheet from its rules and properties.
pub fn assemble(
    rules: Vec<Rule>,
    properties: &PropertyRegistry,
    show_package: bool,
) -> Result<RuleSet, DecisionTableError> {
    if rules.is_empty() {
        return Err(DecisionTableError::NoRuleTables);
    }

    let name = match properties.single(RULESET_TAG)? {
        Some(entry) => entry.value.to_owned(),
        None => DEFAULT_RULESET_NAME.to_owned(),
    };

    let mut rule_set = RuleSet {
        name: show_package.then_some(name),
        rules,
        imports: imports(properties),
        globals: globals(properties)?,
        functions: owned(properties.values(FUNCTIONS_TAG)),
        queries: owned(properties.values(QUERIES_TAG)),
        declared_types: owned(properties.values(DECLARES_TAG)),
        unit: properties.single(UNIT_TAG)?.map(|entry| entry.value.to_owned()),
        dialect: properties.single(DIALECT_TAG)?.map(|entry| entry.value.to_owned()),
        ..RuleSet::default()
    };

    for kind in ActionKind::ATTRIBUTES {
        let Some(entry) = properties.single(kind.header())? else {
            continue;
        };
        if kind == ActionKind::Salience {
            let salience = entry
                .value
                .trim()
                .parse::<i32>()
                .map_err(|_| DecisionTableError::InvalidPriority {
                    position: entry.position.to_owned(),
                })?;
            rule_set.salience = Some(salience);
        } else {
            kind.apply(&mut rule_set.attributes, &entry.value, &entry.position)?;
        }
    }

    Ok(rule_set)
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_owned).collect()
}

fn imports(properties: &PropertyRegistry) -> Vec<Import> {
    properties
        .values(IMPORT_TAG)
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|class_name| !class_name.is_empty())
        .map(|class_name| Import {
            class_name: class_name.to_owned(),
        })
        .collect()
}

fn globals(properties: &PropertyRegistry) -> Result<Vec<Global>, DecisionTableError> {
    let mut globals = Vec::new();
    for entry in properties.entries(VARIABLES_TAG) {
        for declaration in entry.value.split(',').map(str::trim) {
            if declaration.is_empty() {
                continue;
            }
            let parts = declaration.split_whitespace().collect::<Vec<_>>();
            let [class_name, identifier] = parts.as_slice() else {
                return Err(DecisionTableError::InvalidGlobal {
                    value: declaration.to_owned(),
                    position: entry.position.to_owned(),
                });
            };
            globals.push(Global {
                class_name: (*class_name).to_owned(),
                identifier: (*identifier).to_owned(),
            });
        }
    }
    Ok(globals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, MAX_ROWS};
    use pretty_assertions::assert_eq;

    fn rules() -> Vec<Rule> {
        vec![Rule::new("Pricing_10".to_owned(), Some(MAX_ROWS), 10)]
    }

    fn registry(rows: &[(&str, &str)]) -> PropertyRegistry {
        let mut properties = PropertyRegistry::new();
        for (row, (tag, value)) in rows.iter().enumerate() {
            properties.insert(tag, value, format!("B{}", row + 1));
        }
        properties
    }

    #[test]
    fn empty_sheet_has_no_rule_set() {
        assert_eq!(
            assemble(Vec::new(), &PropertyRegistry::new(), true),
            Err(DecisionTableError::NoRuleTables)
        );
    }

    #[test]
    fn default_package_name() {
        let rule_set = assemble(rules(), &PropertyRegistry::new(), true).unwrap();
        assert_eq!(rule_set.name.as_deref(), Some(DEFAULT_RULESET_NAME));

        let rule_set = assemble(rules(), &PropertyRegistry::new(), false).unwrap();
        assert_eq!(rule_set.name, None);
    }

    #[test]
    fn sheet_level_properties() {
        let properties = registry(&[
            ("RuleSet", "com.acme.pricing"),
            ("Import", "com.acme.Order, com.acme.Customer,"),
            ("Variables", "java.util.List results, Logger log"),
            ("Functions", "function int twice(int x) { return 2 * x; }"),
            ("Queries", "query \"gold\" Customer(gold) end"),
            ("Declare", "declare Flag end"),
            ("Unit", "pricing"),
            ("Dialect", "mvel"),
            ("PRIORITY", "10"),
            ("no-loop", "true"),
            ("AGENDA-GROUP", "pricing"),
        ]);
        let rule_set = assemble(rules(), &properties, true).unwrap();
        assert_eq!(rule_set.name.as_deref(), Some("com.acme.pricing"));
        assert_eq!(
            rule_set.imports,
            vec![
                Import {
                    class_name: "com.acme.Order".to_owned()
                },
                Import {
                    class_name: "com.acme.Customer".to_owned()
                },
            ]
        );
        assert_eq!(
            rule_set.globals,
            vec![
                Global {
                    class_name: "java.util.List".to_owned(),
                    identifier: "results".to_owned()
                },
                Global {
                    class_name: "Logger".to_owned(),
                    identifier: "log".to_owned()
                },
            ]
        );
        assert_eq!(rule_set.functions.len(), 1);
        assert_eq!(rule_set.queries.len(), 1);
        assert_eq!(rule_set.declared_types, vec!["declare Flag end"]);
        assert_eq!(rule_set.unit.as_deref(), Some("pricing"));
        assert_eq!(rule_set.dialect.as_deref(), Some("mvel"));
        assert_eq!(rule_set.salience, Some(10));
        assert_eq!(
            rule_set.attributes,
            Attributes {
                no_loop: Some(true),
                agenda_group: Some("pricing".to_owned()),
                ..Attributes::default()
            }
        );
    }

    #[test]
    fn malformed_global() {
        let properties = registry(&[("Variables", "List results, oops")]);
        assert_eq!(
            assemble(rules(), &properties, true),
            Err(DecisionTableError::InvalidGlobal {
                value: "oops".to_owned(),
                position: "B1".to_owned(),
            })
        );
    }

    #[test]
    fn invalid_rule_set_attributes() {
        let properties = registry(&[("Priority", "high")]);
        assert_eq!(
            assemble(rules(), &properties, true),
            Err(DecisionTableError::InvalidPriority {
                position: "B1".to_owned()
            })
        );

        let properties = registry(&[("RuleSet", "a"), ("RuleSet", "b")]);
        assert_eq!(
            assemble(rules(), &properties, true).unwrap_err(),
            DecisionTableError::MultipleValues {
                tag: "RuleSet".to_owned(),
                cells: vec!["B1".to_owned(), "B2".to_owned()],
            }
        );
    }

    #[test]
    fn unit_and_dialect_take_one_value() {
        let properties = registry(&[("Unit", "pricing"), ("Dialect", "mvel"), ("unit", "billing")]);
        assert_eq!(
            assemble(rules(), &properties, true),
            Err(DecisionTableError::MultipleValues {
                tag: "Unit".to_owned(),
                cells: vec!["B1".to_owned(), "B3".to_owned()],
            })
        );

        let properties = registry(&[("Dialect", "java"), ("DIALECT", "mvel")]);
        assert_eq!(
            assemble(rules(), &properties, true).unwrap_err(),
            DecisionTableError::MultipleValues {
                tag: "Dialect".to_owned(),
                cells: vec!["B1".to_owned(), "B2".to_owned()],
            }
        );
    }
}
