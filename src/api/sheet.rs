//! Implements the `RowSource` trait against the Google Sheets REST API.

use crate::api::{RowSource, TokenProvider};
use crate::{Config, Result};
use anyhow::Context;
use serde::Deserialize;
use tracing::trace;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Fetches the configured range from a Google Sheet with `values.get`. It
/// takes a `TokenProvider`, which refreshes the access token as needed before
/// each call.
pub(super) struct GoogleSheet {
    config: Config,
    token_provider: TokenProvider,
    client: reqwest::Client,
}

impl GoogleSheet {
    pub(super) fn new(config: Config, token_provider: TokenProvider) -> Self {
        Self {
            config,
            token_provider,
            client: reqwest::Client::new(),
        }
    }
}

/// The subset of the `values.get` response body that we use. `values` is
/// absent when the range is empty.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[async_trait::async_trait]
impl RowSource for GoogleSheet {
    async fn fetch(&mut self) -> Result<Vec<Vec<String>>> {
        let range = self.config.range();
        trace!("fetch for range {range}");
        let access_token = self.token_provider.access_token().await?;
        let url = format!(
            "{SHEETS_API}/{}/values/{range}",
            self.config.spreadsheet_id()
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&access_token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to fetch range '{range}' from the Sheets API"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Sheets API values.get failed with status {status}: {body}");
        }

        let body: ValuesResponse = response
            .json()
            .await
            .context("Failed to parse the Sheets API response")?;
        Ok(body.values)
    }
}
