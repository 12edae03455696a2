//! Per-category spending limits loaded from `limits.json`.

use crate::model::SpendingReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when the spending report and the configured limits share no
/// category names. This indicates a configuration mismatch between the sheet
/// and `limits.json`, so both full category sets are reported to aid
/// diagnosis.
#[derive(Debug, Error)]
#[error(
    "no limited category found among spending categories\n\
     \tspending categories: {}\n\
     \tlimited categories: {}",
    .spending.join(", "),
    .limits.join(", ")
)]
pub struct NoOverlapError {
    spending: Vec<String>,
    limits: Vec<String>,
}

impl NoOverlapError {
    /// The category names found in the spending data.
    pub fn spending_categories(&self) -> &[String] {
        &self.spending
    }

    /// The category names found in the limits configuration.
    pub fn limited_categories(&self) -> &[String] {
        &self.limits
    }
}

/// A mapping from category name to the maximum allowed spend for one
/// reporting period. Loaded once per run from `limits.json` and never
/// mutated.
///
/// Serializes as a flat JSON object, e.g. `{"Groceries": 400, "Rent": 1200}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limits(BTreeMap<String, i64>);

impl Limits {
    /// The limit configured for `category`, if any.
    pub fn get(&self, category: &str) -> Option<i64> {
        self.0.get(category).copied()
    }

    /// The limited category names, in lexicographic order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(category, limit)` pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(category, limit)| (category.as_str(), *limit))
    }

    /// The number of limited categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no limits are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Restricts the limits to the categories that also appear in the
    /// spending report.
    ///
    /// # Errors
    /// Returns a [`NoOverlapError`] when the intersection is empty, listing
    /// both full category sets. An empty limits map always produces this
    /// error.
    pub fn restricted_to(&self, spending: &SpendingReport) -> Result<Limits, NoOverlapError> {
        let relevant: BTreeMap<String, i64> = self
            .0
            .iter()
            .filter(|(category, _)| spending.amount(category).is_some())
            .map(|(category, limit)| (category.clone(), *limit))
            .collect();
        if relevant.is_empty() {
            return Err(NoOverlapError {
                spending: spending.categories().map(str::to_string).collect(),
                limits: self.categories().map(str::to_string).collect(),
            });
        }
        Ok(Limits(relevant))
    }
}

impl<S> FromIterator<(S, i64)> for Limits
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        Limits(
            iter.into_iter()
                .map(|(category, limit)| (category.into(), limit))
                .collect(),
        )
    }
}
