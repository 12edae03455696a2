//! Renders an overspend report into the subject and body of an alert
//! message.

use crate::model::Overspend;
use serde::{Deserialize, Serialize};

/// The composed alert, ready to hand to a delivery sink. The sink owns all
/// transport concerns (addressing, MIME, delivery); this type is just the two
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    subject: String,
    body: String,
}

impl AlertMessage {
    /// The subject line.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The plain-text body.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Composes the email-style alert for an overspend report.
///
/// The subject is `Overspent in <categories> category|categories` with the
/// category names comma-joined in map order, singular when exactly one
/// category overspent. The body is a header sentence followed by one
/// tab-indented `<category>:\t<overage>` line per category.
///
/// Deterministic and side-effect free. Callers must not compose an alert for
/// an empty overspend report; that is a programming error, guarded here with
/// a debug assertion rather than a runtime failure.
pub fn compose_alert(overspend: &Overspend) -> AlertMessage {
    debug_assert!(
        !overspend.is_empty(),
        "composing an alert for an empty overspend report"
    );
    let noun = if overspend.len() == 1 {
        "category"
    } else {
        "categories"
    };
    let joined = overspend.categories().collect::<Vec<_>>().join(", ");
    let lines = overspend
        .iter()
        .map(|(category, overage)| format!("\t{category}:\t{overage}"))
        .collect::<Vec<_>>()
        .join("\n");
    AlertMessage {
        subject: format!("Overspent in {joined} {noun}"),
        body: format!(
            "You spent more than this month's budget in the following {noun}:\n{lines}"
        ),
    }
}

/// Push-notification rendering of an overspend report. This is an extension
/// point sharing the same input as [`compose_alert`] so that other delivery
/// channels can be added.
pub fn compose_push(_overspend: &Overspend) -> AlertMessage {
    todo!("push notification composition is not implemented")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Limits, SpendingReport, DEFAULT_MONTH_KEY};

    fn overspend(pairs: &[(&str, i64, i64)]) -> Overspend {
        // pairs are (category, spent, limit)
        let rows: Vec<Vec<String>> = pairs
            .iter()
            .map(|(label, spent, _)| vec![label.to_string(), spent.to_string()])
            .collect();
        let spending = SpendingReport::parse(&rows, DEFAULT_MONTH_KEY).unwrap();
        let limits: Limits = pairs
            .iter()
            .map(|(label, _, limit)| (label.to_string(), *limit))
            .collect();
        Overspend::evaluate(&spending, &limits).unwrap()
    }

    #[test]
    fn test_compose_singular_subject() {
        let alert = compose_alert(&overspend(&[("Groceries", 150, 100)]));
        assert_eq!(alert.subject(), "Overspent in Groceries category");
    }

    #[test]
    fn test_compose_plural_subject() {
        let alert = compose_alert(&overspend(&[("Food", 120, 100), ("Fun", 30, 20)]));
        assert_eq!(alert.subject(), "Overspent in Food, Fun categories");
    }

    #[test]
    fn test_compose_body() {
        let alert = compose_alert(&overspend(&[("Food", 120, 100), ("Fun", 30, 20)]));
        assert_eq!(
            alert.body(),
            "You spent more than this month's budget in the following categories:\n\
             \tFood:\t20\n\
             \tFun:\t10"
        );
    }

    #[test]
    fn test_compose_singular_body_header() {
        let alert = compose_alert(&overspend(&[("Groceries", 150, 100)]));
        assert_eq!(
            alert.body(),
            "You spent more than this month's budget in the following category:\n\
             \tGroceries:\t50"
        );
    }

    #[test]
    fn test_compose_is_idempotent() {
        let over = overspend(&[("Food", 120, 100), ("Fun", 30, 20)]);
        assert_eq!(compose_alert(&over), compose_alert(&over));
    }

    #[test]
    fn test_serde_round_trip() {
        let alert = compose_alert(&overspend(&[("Groceries", 150, 100)]));
        let json = serde_json::to_string(&alert).unwrap();
        let parsed: AlertMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, alert);
    }
}
