//! Implements the `Mailer` trait by writing the alert to an outbox file in
//! the home directory, so tests (and test-mode runs) can inspect what would
//! have been mailed.

use crate::api::Mailer;
use crate::model::AlertMessage;
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

const OUTBOX_JSON: &str = "outbox.json";
const TEST_MESSAGE_ID: &str = "outbox";

/// The path of the outbox file within a home directory.
pub(super) fn outbox_path(config: &Config) -> PathBuf {
    config.root().join(OUTBOX_JSON)
}

/// An implementation of the `Mailer` trait that does not use Gmail. Each
/// delivery overwrites the outbox file with the JSON-serialized alert.
pub(crate) struct TestMailer {
    outbox: PathBuf,
}

impl TestMailer {
    pub(crate) fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }
}

#[async_trait::async_trait]
impl Mailer for TestMailer {
    async fn deliver(&mut self, alert: &AlertMessage) -> Result<String> {
        let json =
            serde_json::to_string_pretty(alert).context("Unable to serialize the alert")?;
        utils::write(&self.outbox, json).await?;
        info!("Wrote alert to {}", self.outbox.display());
        Ok(TEST_MESSAGE_ID.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{compose_alert, Limits, Overspend, SpendingReport, DEFAULT_MONTH_KEY};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_deliver_writes_outbox() {
        let dir = TempDir::new().unwrap();
        let outbox = dir.path().join("outbox.json");
        let mut mailer = TestMailer::new(&outbox);

        let rows = vec![vec!["Food".to_string(), "120".to_string()]];
        let spending = SpendingReport::parse(&rows, DEFAULT_MONTH_KEY).unwrap();
        let limits: Limits = [("Food", 100)].into_iter().collect();
        let alert = compose_alert(&Overspend::evaluate(&spending, &limits).unwrap());

        let id = mailer.deliver(&alert).await.unwrap();

        assert_eq!(id, TEST_MESSAGE_ID);
        let written = utils::read(&outbox).await.unwrap();
        let parsed: AlertMessage = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, alert);
    }
}
