//! The `check` command: the whole batch run. Fetches the monthly spending
//! rows, compares them against the configured limits and delivers an alert
//! when any category exceeded its limit.

use crate::api::{self, Mailer, Mode, RowSource};
use crate::commands::Out;
use crate::model::{compose_alert, Overspend, SpendingReport};
use crate::{Config, Result};
use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Structured result of one `check` run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// The reporting month label read back from the sheet, if present.
    month: Option<String>,

    /// The categories that exceeded their limit and by how much. Empty when
    /// everything stayed within budget.
    overspend: Overspend,

    /// The id of the delivered alert message. None when nothing was
    /// overspent or when the run was a dry run.
    message_id: Option<String>,

    /// When the check ran.
    checked_at: DateTime<Utc>,
}

impl CheckOutcome {
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn overspend(&self) -> &Overspend {
        &self.overspend
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

/// Runs the budget check once and exits.
///
/// Pipeline: fetch rows -> parse into a spending report -> evaluate against
/// the configured limits -> compose and deliver the alert. Any stage failure
/// aborts the run; there is no partial success. When no category overspent,
/// nothing is composed or delivered.
///
/// With `dry_run` the alert is composed but not delivered.
pub async fn check(config: Config, mode: Mode, dry_run: bool) -> Result<Out<CheckOutcome>> {
    let mut source = api::row_source(&config, mode).await?;
    let mut mailer = api::mailer(&config, mode).await?;
    check_inner(&config, source.as_mut(), mailer.as_mut(), dry_run).await
}

async fn check_inner(
    config: &Config,
    source: &mut (dyn RowSource + Send),
    mailer: &mut (dyn Mailer + Send),
    dry_run: bool,
) -> Result<Out<CheckOutcome>> {
    let rows = source.fetch().await?;
    if rows.is_empty() {
        bail!("No spending data found in range '{}'", config.range());
    }

    let spending = SpendingReport::parse(&rows, config.month_key())?;
    let month = spending.month().map(str::to_string);
    if let Some(month) = spending.month() {
        debug!("Reporting month: {month}");
    }

    let overspend = Overspend::evaluate(&spending, config.limits())?;
    if overspend.is_empty() {
        let message = match &month {
            Some(month) => format!("No overspending in {month}, nothing to send"),
            None => "No overspending found, nothing to send".to_string(),
        };
        return Ok(Out::new(
            message,
            CheckOutcome {
                month,
                overspend,
                message_id: None,
                checked_at: Utc::now(),
            },
        ));
    }

    let alert = compose_alert(&overspend);
    if dry_run {
        return Ok(Out::new(
            format!("Dry run, would send alert: {}", alert.subject()),
            CheckOutcome {
                month,
                overspend,
                message_id: None,
                checked_at: Utc::now(),
            },
        ));
    }

    let message_id = mailer.deliver(&alert).await?;
    Ok(Out::new(
        format!("Sent alert: {}", alert.subject()),
        CheckOutcome {
            month,
            overspend,
            message_id: Some(message_id),
            checked_at: Utc::now(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TestMailer, TestRowSource};
    use crate::model::{AlertMessage, Limits};
    use crate::test::TestEnv;
    use crate::utils;

    fn rows(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        pairs
            .iter()
            .map(|(label, value)| vec![label.to_string(), value.to_string()])
            .collect()
    }

    async fn run(
        env: &TestEnv,
        data: Vec<Vec<String>>,
        limits: Limits,
        dry_run: bool,
    ) -> (Result<Out<CheckOutcome>>, std::path::PathBuf) {
        env.set_limits(&limits).await;
        let config = env.config().await;
        let outbox = env.home().join("test-outbox.json");
        let mut source = TestRowSource::new(data);
        let mut mailer = TestMailer::new(&outbox);
        let result = check_inner(&config, &mut source, &mut mailer, dry_run).await;
        (result, outbox)
    }

    #[tokio::test]
    async fn test_check_sends_alert_when_overspent() {
        let env = TestEnv::new().await;
        let data = rows(&[("Month", "2024-05"), ("Groceries", "150"), ("Rent", "1200")]);
        let limits: Limits = [("Groceries", 100), ("Rent", 1200)].into_iter().collect();

        let (result, outbox) = run(&env, data, limits, false).await;

        let out = result.unwrap();
        let outcome = out.structure().unwrap();
        assert_eq!(outcome.month(), Some("2024-05"));
        assert_eq!(outcome.overspend().get("Groceries"), Some(50));
        assert_eq!(outcome.message_id(), Some("outbox"));

        let written = utils::read(&outbox).await.unwrap();
        let alert: AlertMessage = serde_json::from_str(&written).unwrap();
        assert_eq!(alert.subject(), "Overspent in Groceries category");
    }

    #[tokio::test]
    async fn test_check_within_budget_sends_nothing() {
        let env = TestEnv::new().await;
        let data = rows(&[("Food", "40")]);
        let limits: Limits = [("Food", 100)].into_iter().collect();

        let (result, outbox) = run(&env, data, limits, false).await;

        let out = result.unwrap();
        let outcome = out.structure().unwrap();
        assert!(outcome.overspend().is_empty());
        assert_eq!(outcome.message_id(), None);
        assert!(!outbox.exists());
    }

    #[tokio::test]
    async fn test_check_no_overlap_is_fatal() {
        let env = TestEnv::new().await;
        let data = rows(&[("Food", "80")]);
        let limits: Limits = [("Transport", 50)].into_iter().collect();

        let (result, outbox) = run(&env, data, limits, false).await;

        let message = format!("{:?}", result.unwrap_err());
        assert!(message.contains("Food"), "message was: {message}");
        assert!(message.contains("Transport"), "message was: {message}");
        assert!(!outbox.exists());
    }

    #[tokio::test]
    async fn test_check_empty_rows_is_fatal() {
        let env = TestEnv::new().await;
        let limits: Limits = [("Food", 100)].into_iter().collect();

        let (result, outbox) = run(&env, Vec::new(), limits, false).await;

        let message = format!("{:?}", result.unwrap_err());
        assert!(
            message.contains("No spending data found"),
            "message was: {message}"
        );
        assert!(!outbox.exists());
    }

    #[tokio::test]
    async fn test_check_bad_amount_is_fatal() {
        let env = TestEnv::new().await;
        let data = rows(&[("Food", "eighty")]);
        let limits: Limits = [("Food", 100)].into_iter().collect();

        let (result, _) = run(&env, data, limits, false).await;

        let message = format!("{:?}", result.unwrap_err());
        assert!(
            message.contains("cannot parse amount"),
            "message was: {message}"
        );
    }

    #[tokio::test]
    async fn test_check_dry_run_composes_but_does_not_send() {
        let env = TestEnv::new().await;
        let data = rows(&[("Food", "120"), ("Fun", "30")]);
        let limits: Limits = [("Food", 100), ("Fun", 20)].into_iter().collect();

        let (result, outbox) = run(&env, data, limits, true).await;

        let out = result.unwrap();
        assert!(out.message().contains("Overspent in Food, Fun categories"));
        let outcome = out.structure().unwrap();
        assert_eq!(outcome.overspend().len(), 2);
        assert_eq!(outcome.message_id(), None);
        assert!(!outbox.exists());
    }

    #[tokio::test]
    async fn test_check_in_test_mode_uses_seed_data() {
        // Exercises the factories end to end with the seeded test row source
        // and the outbox mailer.
        let env = TestEnv::new().await;
        let limits: Limits = [("Groceries", 400)].into_iter().collect();
        env.set_limits(&limits).await;
        let config = env.config().await;

        let out = check(config.clone(), Mode::Test, false).await.unwrap();

        let outcome = out.structure().unwrap();
        assert_eq!(outcome.month(), Some("2025-07"));
        assert_eq!(outcome.overspend().get("Groceries"), Some(20));

        let written = utils::read(&config.root().join("outbox.json")).await.unwrap();
        let alert: AlertMessage = serde_json::from_str(&written).unwrap();
        assert_eq!(alert.subject(), "Overspent in Groceries category");
    }
}
