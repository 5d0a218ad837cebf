//! CLI display utilities for formatting output

use crate::model::Rule;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use std::collections::HashSet;

/// Outcome of checking one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCheck {
    pub rule_id: String,
    pub problem: Option<String>,
}

/// Validate each rule on its own, then flag repeated ids
pub fn check_rules(rules: &[Rule]) -> Vec<RuleCheck> {
    let mut seen = HashSet::with_capacity(rules.len());
    rules
        .iter()
        .map(|rule| {
            let problem = match rule.validate() {
                Err(e) => Some(e.to_string()),
                Ok(()) if !seen.insert(rule.id) => {
                    Some(format!("rule id {} is defined more than once", rule.formatted_id()))
                }
                Ok(()) => None,
            };
            RuleCheck {
                rule_id: rule.formatted_id(),
                problem,
            }
        })
        .collect()
}

/// Render the rule set as a table
///
/// With `checks`, a status column reports each rule's validation outcome.
pub fn render_rule_table(rules: &[Rule], checks: Option<&[RuleCheck]>, use_color: bool) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    let mut titles = vec!["Rule", "Severity", "Keyword", "Description"];
    if checks.is_some() {
        titles.push("Status");
    }
    table.set_titles(Row::new(
        titles
            .into_iter()
            .map(|t| Cell::new(t).style_spec("b"))
            .collect(),
    ));

    for (index, rule) in rules.iter().enumerate() {
        let mut cells = vec![
            Cell::new(&rule.formatted_id()),
            Cell::new(rule.severity.as_str()),
            Cell::new(&rule.keyword),
            Cell::new(&rule.description),
        ];
        if let Some(check) = checks.and_then(|c| c.get(index)) {
            let status = match (&check.problem, use_color) {
                (None, true) => "ok".green().to_string(),
                (None, false) => "ok".to_string(),
                (Some(problem), true) => problem.red().to_string(),
                (Some(problem), false) => problem.clone(),
            };
            cells.push(Cell::new(&status));
        }
        table.add_row(Row::new(cells));
    }

    table.to_string()
}
