//! The spending report parsed from raw spreadsheet rows.
//!
//! The spreadsheet range is expected to hold two columns: a category label and
//! an integer amount. One reserved row, identified by the configured month
//! key, carries the reporting period label instead of an amount.

use std::collections::BTreeMap;
use std::num::ParseIntError;
use thiserror::Error;

/// The reserved row label that carries the reporting month instead of a
/// spending amount.
pub const DEFAULT_MONTH_KEY: &str = "Month";

/// An error that can occur when parsing spreadsheet rows into a
/// [`SpendingReport`].
#[derive(Debug, Error)]
pub enum FormatError {
    /// A non-month row's amount cell could not be parsed as a base-10 integer.
    #[error("row {index} ('{label}'): cannot parse amount '{value}' as an integer")]
    Amount {
        index: usize,
        label: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A row did not have both a label cell and a value cell.
    #[error("row {index} has {found} column(s), expected at least 2")]
    Columns { index: usize, found: usize },
}

/// Per-category spending amounts for one reporting period, plus the period
/// label itself.
///
/// Built once from raw sheet rows and never mutated afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendingReport {
    /// The value of the reserved month row, if one was present.
    month: Option<String>,
    /// Category label mapped to the integer amount spent.
    amounts: BTreeMap<String, i64>,
}

impl SpendingReport {
    /// Parses raw sheet rows into a spending report.
    ///
    /// Each row contributes its first cell as the category label and its
    /// second cell as the amount; cells beyond the second are ignored. The
    /// row whose label equals `month_key` is exempt from integer parsing and
    /// its value is stored as the reporting month. If the same label appears
    /// more than once, the last occurrence wins.
    ///
    /// # Errors
    /// Returns a [`FormatError`] if any row is missing its value cell or if a
    /// non-month row's amount is not a base-10 integer (optionally signed).
    pub fn parse(rows: &[Vec<String>], month_key: &str) -> Result<Self, FormatError> {
        let mut month = None;
        let mut amounts = BTreeMap::new();

        for (index, row) in rows.iter().enumerate() {
            if row.len() < 2 {
                return Err(FormatError::Columns {
                    index,
                    found: row.len(),
                });
            }
            let label = row[0].trim();
            let value = row[1].trim();

            if label == month_key {
                month = Some(value.to_string());
                continue;
            }

            let amount = value
                .parse::<i64>()
                .map_err(|source| FormatError::Amount {
                    index,
                    label: label.to_string(),
                    value: value.to_string(),
                    source,
                })?;
            amounts.insert(label.to_string(), amount);
        }

        Ok(Self { month, amounts })
    }

    /// The reporting month label, if the sheet provided one.
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    /// The amount spent in `category`, if the sheet reported one.
    pub fn amount(&self, category: &str) -> Option<i64> {
        self.amounts.get(category).copied()
    }

    /// The category labels in the report, in lexicographic order. The month
    /// key is not a category and is never included.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(String::as_str)
    }

    /// The number of spending categories (excluding the month row).
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// True when the report holds no spending categories.
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        pairs
            .iter()
            .map(|(label, value)| vec![label.to_string(), value.to_string()])
            .collect()
    }

    #[test]
    fn test_parse_round_trip() {
        let report = SpendingReport::parse(&rows(&[("Groceries", "150")]), DEFAULT_MONTH_KEY)
            .unwrap();
        assert_eq!(report.amount("Groceries"), Some(150));
    }

    #[test]
    fn test_parse_negative_amount() {
        let report =
            SpendingReport::parse(&rows(&[("Refunds", "-25")]), DEFAULT_MONTH_KEY).unwrap();
        assert_eq!(report.amount("Refunds"), Some(-25));
    }

    #[test]
    fn test_parse_month_row_not_parsed_as_integer() {
        let report = SpendingReport::parse(
            &rows(&[("Month", "2024-05"), ("Groceries", "150"), ("Rent", "1200")]),
            DEFAULT_MONTH_KEY,
        )
        .unwrap();
        assert_eq!(report.month(), Some("2024-05"));
        assert_eq!(report.amount("Groceries"), Some(150));
        assert_eq!(report.amount("Rent"), Some(1200));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_parse_custom_month_key() {
        let report =
            SpendingReport::parse(&rows(&[("Period", "July"), ("Fun", "30")]), "Period").unwrap();
        assert_eq!(report.month(), Some("July"));
        assert_eq!(report.amount("Fun"), Some(30));
    }

    #[test]
    fn test_parse_no_month_row() {
        let report = SpendingReport::parse(&rows(&[("Food", "80")]), DEFAULT_MONTH_KEY).unwrap();
        assert_eq!(report.month(), None);
        assert_eq!(report.amount("Food"), Some(80));
    }

    #[test]
    fn test_parse_duplicate_label_last_wins() {
        let report = SpendingReport::parse(
            &rows(&[("Food", "10"), ("Food", "20")]),
            DEFAULT_MONTH_KEY,
        )
        .unwrap();
        assert_eq!(report.amount("Food"), Some(20));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_parse_bad_amount_is_format_error() {
        let err = SpendingReport::parse(&rows(&[("Food", "eighty")]), DEFAULT_MONTH_KEY)
            .unwrap_err();
        match err {
            FormatError::Amount { label, value, .. } => {
                assert_eq!(label, "Food");
                assert_eq!(value, "eighty");
            }
            other => panic!("expected FormatError::Amount, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_short_row_is_format_error() {
        let err =
            SpendingReport::parse(&[vec!["Food".to_string()]], DEFAULT_MONTH_KEY).unwrap_err();
        match err {
            FormatError::Columns { index, found } => {
                assert_eq!(index, 0);
                assert_eq!(found, 1);
            }
            other => panic!("expected FormatError::Columns, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_extra_columns_ignored() {
        let report = SpendingReport::parse(
            &[vec![
                "Food".to_string(),
                "80".to_string(),
                "ignored".to_string(),
            ]],
            DEFAULT_MONTH_KEY,
        )
        .unwrap();
        assert_eq!(report.amount("Food"), Some(80));
    }

    #[test]
    fn test_parse_whitespace_trimmed() {
        let report =
            SpendingReport::parse(&rows(&[(" Food ", " 80 ")]), DEFAULT_MONTH_KEY).unwrap();
        assert_eq!(report.amount("Food"), Some(80));
    }

    #[test]
    fn test_parse_empty_rows() {
        let report = SpendingReport::parse(&[], DEFAULT_MONTH_KEY).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.month(), None);
    }
}
