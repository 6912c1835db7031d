//! Input rules for single-record prediction, derived from the training data.
use thiserror::Error;

use crate::data_handling::{Cell, Table};
use crate::error::Result;

/// A validation rule for the raw value of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Checker {
    /// Numeric value within inclusive bounds.
    Range { column: String, min: f64, max: f64 },
    /// Value equal to one of the observed options.
    Membership { column: String, options: Vec<String> },
}

impl Checker {
    pub fn column(&self) -> &str {
        match self {
            Checker::Range { column, .. } | Checker::Membership { column, .. } => column,
        }
    }

    pub fn check(&self, value: &str) -> bool {
        match self {
            Checker::Range { column, min, max } => match value.trim().parse::<f64>() {
                Ok(v) => *min <= v && v <= *max,
                Err(_) => {
                    log::error!("'{}' value is not a number: {}", column, value);
                    false
                }
            },
            Checker::Membership { options, .. } => options.iter().any(|o| o == value),
        }
    }

    /// Derive a rule from the values observed in `column`.
    ///
    /// Numeric columns get their observed range, text columns their distinct
    /// values. Boolean columns get no rule.
    pub fn for_column(table: &Table, column: &str) -> Result<Option<Checker>> {
        let cells: Vec<&Cell> = table.column_values(column)?.collect();
        if cells.is_empty() || cells.iter().all(|c| matches!(c, Cell::Bool(_))) {
            return Ok(None);
        }

        if table.is_numeric_column(column)? {
            let (min, max) = cells
                .iter()
                .filter_map(|c| c.to_f64())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            return Ok(Some(Checker::Range {
                column: column.to_string(),
                min,
                max,
            }));
        }

        let mut options: Vec<String> = cells.iter().map(|c| c.as_key()).collect();
        options.sort();
        options.dedup();
        Ok(Some(Checker::Membership {
            column: column.to_string(),
            options,
        }))
    }

    /// Human readable hint of the accepted values.
    pub fn describe(&self) -> String {
        match self {
            Checker::Range { min, max, .. } => format!("{} - {}", min, max),
            Checker::Membership { options, .. } => options.join(", "),
        }
    }
}

/// Every rejected `(column, value)` pair of one validation pass.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("the following values are invalid (field -> value):\n{}", render_failures(.failures))]
pub struct ValidationError {
    pub failures: Vec<(String, String)>,
}

fn render_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(column, value)| format!("{} -> {}", column, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check `(checker, value)` pairs, skipping empty values.
///
/// All failures are collected before returning.
pub fn validate<'a, I>(pairs: I) -> std::result::Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a Checker, &'a str)>,
{
    let mut failures = Vec::new();
    for (checker, value) in pairs {
        if value.is_empty() {
            continue;
        }
        log::debug!("Checking '{}' value: {}", checker.column(), value);
        if !checker.check(value) {
            log::warn!("'{}' value '{}' is not valid", checker.column(), value);
            failures.push((checker.column().to_string(), value.to_string()));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Age".into(), "Gender".into(), "Remote".into()],
            vec![
                vec![Cell::Int(25), Cell::from("Male"), Cell::Bool(true)],
                vec![Cell::Int(58), Cell::from("Female"), Cell::Bool(false)],
                vec![Cell::Int(31), Cell::from("Male"), Cell::Bool(true)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn derives_range_and_membership() {
        let t = table();
        assert_eq!(
            Checker::for_column(&t, "Age").unwrap(),
            Some(Checker::Range {
                column: "Age".into(),
                min: 25.0,
                max: 58.0
            })
        );
        assert_eq!(
            Checker::for_column(&t, "Gender").unwrap(),
            Some(Checker::Membership {
                column: "Gender".into(),
                options: vec!["Female".into(), "Male".into()]
            })
        );
        assert_eq!(Checker::for_column(&t, "Remote").unwrap(), None);
        assert!(Checker::for_column(&t, "Salary").is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let c = Checker::Range {
            column: "Age".into(),
            min: 18.0,
            max: 60.0,
        };
        assert!(c.check("18"));
        assert!(c.check("60"));
        assert!(!c.check("61"));
        assert!(!c.check("old"));
    }

    #[test]
    fn describe_lists_accepted_values() {
        let t = table();
        let age = Checker::for_column(&t, "Age").unwrap().unwrap();
        assert_eq!(age.describe(), "25 - 58");
        let gender = Checker::for_column(&t, "Gender").unwrap().unwrap();
        assert_eq!(gender.describe(), "Female, Male");
    }

    #[test]
    fn validate_collects_every_failure() {
        let age = Checker::Range {
            column: "Age".into(),
            min: 18.0,
            max: 60.0,
        };
        let gender = Checker::Membership {
            column: "Gender".into(),
            options: vec!["Female".into(), "Male".into()],
        };

        assert!(validate(vec![(&age, "30"), (&gender, "")]).is_ok());

        let err = validate(vec![(&age, "99"), (&gender, "Other")]).unwrap_err();
        assert_eq!(err.failures.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("Age -> 99"));
        assert!(msg.contains("Gender -> Other"));
    }
}
