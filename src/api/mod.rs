//! The I/O collaborators: a row source backed by the Google Sheets API and a
//! delivery sink backed by the Gmail API, each with an in-memory test
//! implementation so the whole program can run without touching Google.

mod gmail;
mod mail_test_client;
mod oauth;
mod sheet;
mod sheet_test_client;

use crate::model::AlertMessage;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

pub(crate) use mail_test_client::TestMailer;
pub(crate) use oauth::TokenProvider;
pub(crate) use sheet_test_client::TestRowSource;

/// OAuth scopes required by the program: read-only Sheets access to fetch
/// spending rows and Gmail modify access to insert and label the alert.
const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
];

/// When this environment variable is set and non-zero in length (and not
/// "0"), the program uses in-memory test clients instead of the Google APIs.
const TEST_MODE_VAR: &str = "SPENDING_ALERT_IN_TEST_MODE";

/// Supplies the raw spending rows for one run.
#[async_trait::async_trait]
pub(crate) trait RowSource {
    /// Fetches the rows of the configured range. Each row is a sequence of
    /// cell strings; an empty result means the sheet had no data.
    async fn fetch(&mut self) -> Result<Vec<Vec<String>>>;
}

/// Delivers a composed alert. The sink owns addressing, transport envelope
/// and delivery; the core's contract ends at handing over the two strings.
#[async_trait::async_trait]
pub(crate) trait Mailer {
    /// Delivers `alert` and returns an identifier for the delivered message.
    async fn deliver(&mut self, alert: &AlertMessage) -> Result<String>;
}

/// Selects between the real Google clients and the in-memory test clients.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Google,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` when `SPENDING_ALERT_IN_TEST_MODE` is set to a
    /// non-empty, non-"0" value, otherwise `Mode::Google`.
    pub fn from_env() -> Mode {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() && value != "0" => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// Creates the row source for `mode`.
pub(crate) async fn row_source(config: &Config, mode: Mode) -> Result<Box<dyn RowSource + Send>> {
    match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Ok(Box::new(sheet::GoogleSheet::new(
                config.clone(),
                token_provider,
            )))
        }
        Mode::Test => Ok(Box::new(TestRowSource::default())),
    }
}

/// Creates the delivery sink for `mode`.
pub(crate) async fn mailer(config: &Config, mode: Mode) -> Result<Box<dyn Mailer + Send>> {
    match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Ok(Box::new(gmail::GmailMailer::new(
                config.clone(),
                token_provider,
            )))
        }
        Mode::Test => Ok(Box::new(TestMailer::new(
            mail_test_client::outbox_path(config),
        ))),
    }
}
