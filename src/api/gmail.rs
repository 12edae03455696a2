//! Implements the `Mailer` trait against the Gmail REST API.
//!
//! The alert is not sent through SMTP: it is inserted directly into the
//! authenticated user's mailbox with `messages.insert` and then labeled
//! INBOX/UNREAD so that it shows up as new mail.

use crate::api::{Mailer, TokenProvider};
use crate::model::AlertMessage;
use crate::{Config, Result};
use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{debug, trace};

const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// The tag added to the recipient address when no explicit recipient is
/// configured, e.g. `user+spending-alert@gmail.com`.
const ALIAS_TAG: &str = "spending-alert";

/// Inserts the alert into the authenticated user's Gmail mailbox. It takes a
/// `TokenProvider`, which refreshes the access token as needed.
pub(super) struct GmailMailer {
    config: Config,
    token_provider: TokenProvider,
    client: reqwest::Client,
}

impl GmailMailer {
    pub(super) fn new(config: Config, token_provider: TokenProvider) -> Self {
        Self {
            config,
            token_provider,
            client: reqwest::Client::new(),
        }
    }

    /// Retrieves the authenticated user's email address.
    async fn profile_email(&self, access_token: &str) -> Result<String> {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Profile {
            email_address: String,
        }

        let response = self
            .client
            .get(format!("{GMAIL_API}/profile"))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to fetch the Gmail profile")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Gmail profile request failed with status {status}: {body}");
        }
        let profile: Profile = response
            .json()
            .await
            .context("Failed to parse the Gmail profile response")?;
        Ok(profile.email_address)
    }

    /// Inserts the raw message into the user's mailbox and returns the new
    /// message id.
    async fn insert_message(&self, access_token: &str, raw: &str) -> Result<String> {
        #[derive(Debug, Deserialize)]
        struct Inserted {
            id: String,
        }

        let response = self
            .client
            .post(format!("{GMAIL_API}/messages"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await
            .context("Failed to insert the alert message")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Gmail messages.insert failed with status {status}: {body}");
        }
        let inserted: Inserted = response
            .json()
            .await
            .context("Failed to parse the Gmail insert response")?;
        Ok(inserted.id)
    }

    /// Labels the inserted message INBOX and UNREAD so it appears as new
    /// mail.
    async fn move_to_inbox(&self, access_token: &str, message_id: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{GMAIL_API}/messages/{message_id}/modify"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "addLabelIds": ["INBOX", "UNREAD"] }))
            .send()
            .await
            .context("Failed to label the alert message")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Gmail messages.modify failed with status {status}: {body}");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Mailer for GmailMailer {
    async fn deliver(&mut self, alert: &AlertMessage) -> Result<String> {
        let access_token = self.token_provider.access_token().await?;
        let sender = self.profile_email(&access_token).await?;
        let to = match self.config.alert_to() {
            Some(to) => to.to_string(),
            None => alias_address(&sender),
        };
        trace!("delivering alert to {to}");

        let raw = encode_message(&sender, &to, alert);
        let message_id = self.insert_message(&access_token, &raw).await?;
        self.move_to_inbox(&access_token, &message_id).await?;
        debug!("Inserted alert message {message_id}");
        Ok(message_id)
    }
}

/// Builds the base64url-encoded RFC 2822 message that the Gmail API expects
/// in the `raw` field.
fn encode_message(from: &str, to: &str, alert: &AlertMessage) -> String {
    let mime = format!(
        "From: {from}\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         Content-Type: text/plain; charset=\"UTF-8\"\r\n\
         \r\n\
         {body}",
        subject = alert.subject(),
        body = alert.body(),
    );
    URL_SAFE.encode(mime.as_bytes())
}

/// Derives the default recipient: the sender's own address with a plus tag,
/// so the alert threads separately from regular mail.
fn alias_address(email: &str) -> String {
    match email.split_once('@') {
        Some((user, domain)) => format!("{user}+{ALIAS_TAG}@{domain}"),
        None => email.to_string(),
    }
}
