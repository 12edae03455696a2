//! Overspend evaluation: which categories exceeded their limit, and by how
//! much.

use crate::model::{Limits, NoOverlapError, SpendingReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Categories whose spend exceeded the configured limit, mapped to the
/// strictly positive overage amount (`spent - limit`).
///
/// Derived, ephemeral, consumed by the alert composer. Empty means every
/// relevant category stayed within budget; that is a normal outcome, not an
/// error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Overspend(BTreeMap<String, i64>);

impl Overspend {
    /// Compares the spending report against the limits and collects the
    /// overages.
    ///
    /// The limits are first restricted to the categories present in the
    /// spending data. A category is recorded only when its remaining budget
    /// (`limit - spent`) is negative; categories at or under their limit are
    /// dropped entirely. Pure function of its two inputs.
    ///
    /// # Errors
    /// Returns a [`NoOverlapError`] when the spending data and the limits
    /// share no category names.
    pub fn evaluate(spending: &SpendingReport, limits: &Limits) -> Result<Self, NoOverlapError> {
        let relevant = limits.restricted_to(spending)?;
        let mut overages = BTreeMap::new();
        for (category, limit) in relevant.iter() {
            // restricted_to guarantees the category is present in spending
            let spent = match spending.amount(category) {
                Some(spent) => spent,
                None => continue,
            };
            let remaining = limit - spent;
            if remaining < 0 {
                overages.insert(category.to_string(), -remaining);
            }
        }
        Ok(Self(overages))
    }

    /// The overage for `category`, if it overspent.
    pub fn get(&self, category: &str) -> Option<i64> {
        self.0.get(category).copied()
    }

    /// The overspent category names, in lexicographic order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates `(category, overage)` pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0
            .iter()
            .map(|(category, overage)| (category.as_str(), *overage))
    }

    /// The number of overspent categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no category overspent.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
