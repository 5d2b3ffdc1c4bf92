// Category aggregation.
// Pure function: table in, per-category sums (or a whole-table total) out.
// No IO, no clap, no formatting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clean::{parse_number, NumberStyle};
use crate::summary::Summary;
use crate::table::Table;

pub const DEFAULT_VALUE_COLUMN: &str = "Value";
pub const DEFAULT_CATEGORY_COLUMN: &str = "Category";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with rows whose category cell is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankCategory {
    /// Leave the row out of the grouped mapping.
    #[default]
    Skip,
    /// Sum the row under the empty-string key.
    Group,
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub value_column: String,
    /// `None` forces a whole-table total even if a category column exists.
    pub category_column: Option<String>,
    pub number_style: NumberStyle,
    pub blank_category: BlankCategory,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            category_column: Some(DEFAULT_CATEGORY_COLUMN.to_string()),
            number_style: NumberStyle::Strict,
            blank_category: BlankCategory::Skip,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub rows: usize,
    /// Value cells that did not parse and contributed zero.
    pub coerced: usize,
    /// Rows left out because their category was blank.
    pub skipped_blank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub summary: Summary,
    pub stats: AggregateStats,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("column {column:?} not found")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("ambiguous column name {0:?} (appears more than once in header)")]
    AmbiguousColumn(String),

    /// A sum left the finite f64 range and cannot be written as JSON.
    #[error("sum overflowed for {}", overflow_scope(.group))]
    Overflow { group: Option<String> },
}

fn overflow_scope(group: &Option<String>) -> String {
    match group {
        Some(g) => format!("category {g:?}"),
        None => "total".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Core aggregation
// ---------------------------------------------------------------------------

pub fn aggregate(
    table: &Table,
    options: &AggregateOptions,
) -> Result<Aggregation, AggregateError> {
    let value_col = table
        .column_index(&options.value_column)?
        .ok_or_else(|| AggregateError::MissingColumn {
            column: options.value_column.trim().to_string(),
            available: table.header_names(),
        })?;

    let category_col = match &options.category_column {
        Some(name) => table.column_index(name)?,
        None => None,
    };

    let row_count = table.row_count();
    let mut stats = AggregateStats {
        rows: row_count,
        ..Default::default()
    };

    let mut contribution = |row: usize| -> f64 {
        match parse_number(table.cell(row, value_col), options.number_style) {
            Some(v) => v,
            None => {
                stats.coerced += 1;
                0.0
            }
        }
    };

    let summary = match category_col {
        Some(cat_col) => {
            log::debug!("grouping {row_count} rows by column {cat_col}");
            let mut groups: BTreeMap<String, f64> = BTreeMap::new();
            let mut skipped_blank = 0;
            for row in 0..row_count {
                let key = table.cell(row, cat_col).trim();
                if key.is_empty() && options.blank_category == BlankCategory::Skip {
                    skipped_blank += 1;
                    continue;
                }
                let value = contribution(row);
                *groups.entry(key.to_string()).or_insert(0.0) += value;
            }
            stats.skipped_blank = skipped_blank;
            if let Some((key, _)) = groups.iter().find(|(_, sum)| !sum.is_finite()) {
                return Err(AggregateError::Overflow {
                    group: Some(key.clone()),
                });
            }
            Summary::Grouped(groups)
        }
        None => {
            log::debug!("no category column; summing {row_count} rows");
            let total: f64 = (0..row_count).map(&mut contribution).sum();
            if !total.is_finite() {
                return Err(AggregateError::Overflow { group: None });
            }
            Summary::Total(total)
        }
    };

    if stats.coerced > 0 {
        log::info!("{} non-numeric value cells counted as 0", stats.coerced);
    }
    if stats.skipped_blank > 0 {
        log::info!("{} rows skipped (blank category)", stats.skipped_blank);
    }

    Ok(Aggregation { summary, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(table: &Table) -> Result<Aggregation, AggregateError> {
        aggregate(table, &AggregateOptions::default())
    }

    fn grouped(summary: &Summary) -> &BTreeMap<String, f64> {
        match summary {
            Summary::Grouped(g) => g,
            Summary::Total(_) => panic!("expected grouped summary, got total"),
        }
    }

    #[test]
    fn test_groups_and_coerces() {
        let table = Table::from_rows(
            &["Category", "Value"],
            &[&["A", "10"], &["A", "x"], &["B", "5"]],
        );
        let result = run(&table).unwrap();
        let groups = grouped(&result.summary);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"], 10.0);
        assert_eq!(groups["B"], 5.0);
        assert_eq!(result.stats.rows, 3);
        assert_eq!(result.stats.coerced, 1);
    }

    #[test]
    fn test_total_without_category_column() {
        let table = Table::from_rows(&["Value"], &[&["1.5"], &["2.5"], &["oops"], &[""]]);
        let result = run(&table).unwrap();
        assert_eq!(result.summary, Summary::Total(4.0));
        assert_eq!(result.stats.coerced, 2);
    }

    #[test]
    fn test_category_none_forces_total() {
        let table = Table::from_rows(&["Category", "Value"], &[&["A", "1"], &["B", "2"]]);
        let options = AggregateOptions {
            category_column: None,
            ..Default::default()
        };
        let result = aggregate(&table, &options).unwrap();
        assert_eq!(result.summary, Summary::Total(3.0));
    }

    #[test]
    fn test_group_with_only_bad_values_is_zero() {
        let table = Table::from_rows(&["Category", "Value"], &[&["A", "n/a"], &["A", "-"]]);
        let result = run(&table).unwrap();
        assert_eq!(grouped(&result.summary)["A"], 0.0);
    }

    #[test]
    fn test_missing_value_column() {
        let table = Table::from_rows(&["Category", "Amount"], &[&["A", "1"]]);
        match run(&table).unwrap_err() {
            AggregateError::MissingColumn { column, available } => {
                assert_eq!(column, "Value");
                assert_eq!(available, vec!["Category", "Amount"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ambiguous_category_column() {
        let table = Table::from_rows(&["Category", "Value", "Category"], &[]);
        let err = run(&table).unwrap_err();
        assert!(matches!(err, AggregateError::AmbiguousColumn(_)));
    }

    #[test]
    fn test_blank_category_skipped_by_default() {
        let table = Table::from_rows(
            &["Category", "Value"],
            &[&["A", "1"], &["", "7"], &["  ", "8"]],
        );
        let result = run(&table).unwrap();
        let groups = grouped(&result.summary);
        assert_eq!(groups.len(), 1);
        assert_eq!(result.stats.skipped_blank, 2);
    }

    #[test]
    fn test_blank_category_grouped_when_requested() {
        let table = Table::from_rows(
            &["Category", "Value"],
            &[&["A", "1"], &["", "7"], &["  ", "8"]],
        );
        let options = AggregateOptions {
            blank_category: BlankCategory::Group,
            ..Default::default()
        };
        let result = aggregate(&table, &options).unwrap();
        let groups = grouped(&result.summary);
        assert_eq!(groups[""], 15.0);
        assert_eq!(groups["A"], 1.0);
        assert_eq!(result.stats.skipped_blank, 0);
    }

    #[test]
    fn test_category_keys_are_trimmed() {
        let table = Table::from_rows(&["Category", "Value"], &[&["A ", "1"], &[" A", "2"]]);
        let result = run(&table).unwrap();
        assert_eq!(grouped(&result.summary)["A"], 3.0);
    }

    #[test]
    fn test_empty_table() {
        let result = run(&Table::from_rows(&["Category", "Value"], &[])).unwrap();
        assert_eq!(result.summary, Summary::Grouped(BTreeMap::new()));

        let result = run(&Table::from_rows(&["Value"], &[])).unwrap();
        assert_eq!(result.summary, Summary::Total(0.0));
    }

    #[test]
    fn test_financial_style() {
        let table = Table::from_rows(&["Value"], &[&["$1,000"], &["(250)"]]);
        let options = AggregateOptions {
            number_style: NumberStyle::Financial,
            ..Default::default()
        };
        let result = aggregate(&table, &options).unwrap();
        assert_eq!(result.summary, Summary::Total(750.0));
        assert_eq!(result.stats.coerced, 0);
    }

    #[test]
    fn test_overflow_is_error() {
        let table = Table::from_rows(
            &["Category", "Value"],
            &[&["A", "1e308"], &["A", "1e308"], &["B", "1"]],
        );
        let err = run(&table).unwrap_err();
        assert_eq!(err.to_string(), "sum overflowed for category \"A\"");

        let options = AggregateOptions {
            category_column: None,
            ..Default::default()
        };
        let err = aggregate(&table, &options).unwrap_err();
        assert_eq!(err.to_string(), "sum overflowed for total");
    }

    #[test]
    fn test_custom_column_names() {
        let table = Table::from_rows(
            &["region", "sales"],
            &[&["east", "3"], &["west", "4"], &["east", "1"]],
        );
        let options = AggregateOptions {
            value_column: "sales".to_string(),
            category_column: Some("region".to_string()),
            ..Default::default()
        };
        let result = aggregate(&table, &options).unwrap();
        let groups = grouped(&result.summary);
        assert_eq!(groups["east"], 4.0);
        assert_eq!(groups["west"], 4.0);
    }
}
