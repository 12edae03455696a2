//! OAuth 2.0 authentication for the Google APIs.
//!
//! This module handles:
//! - Loading OAuth client credentials from client_secret.json
//! - Running the OAuth consent flow with a local callback server
//! - Managing access and refresh tokens in token.json
//! - Silent token refresh when expired

use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing::{debug, info};

const OAUTH_CALLBACK_PORT: u16 = 3030;

/// Provides access tokens for the Google APIs. Holds the paths to the client
/// credentials and the persisted token file; the yup-oauth2 authenticator is
/// built per request so that refresh is always based on what is on disk.
pub(crate) struct TokenProvider {
    secret_path: PathBuf,
    token_path: PathBuf,
}

impl TokenProvider {
    /// Runs the complete OAuth consent flow and persists the resulting
    /// tokens.
    ///
    /// This is the only entry point that opens a browser. It:
    /// 1. Loads the OAuth client credentials
    /// 2. Starts a local callback server on localhost
    /// 3. Opens the user's browser to the Google consent page
    /// 4. Exchanges the authorization code for tokens and saves them to
    ///    token.json
    ///
    /// # Errors
    /// Returns an error if any step fails (missing files, network errors,
    /// timeout, etc.)
    pub(crate) async fn initialize(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let provider = Self {
            secret_path: secret_path.into(),
            token_path: token_path.into(),
        };
        info!("Starting OAuth consent flow");
        info!(
            "Local callback server will listen on http://localhost:{OAUTH_CALLBACK_PORT}, \
             if the browser does not open automatically you may need to visit the URL manually"
        );
        let _ = provider.access_token().await?;
        info!("Authorization successful");
        info!("Tokens saved to {}", provider.token_path.display());
        Ok(provider)
    }

    /// Creates a `TokenProvider` from previously persisted tokens. This never
    /// opens a browser; it fails if the consent flow has not been run yet.
    ///
    /// # Errors
    /// Returns an error when either credential file is missing.
    pub(crate) async fn load(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret_path = secret_path.into();
        let token_path = token_path.into();
        if !secret_path.is_file() {
            bail!(
                "The OAuth client credentials file is missing '{}', run 'spending-alert init'",
                secret_path.display()
            )
        }
        if !token_path.is_file() {
            bail!(
                "The OAuth token file is missing '{}', run 'spending-alert auth'",
                token_path.display()
            )
        }
        Ok(Self {
            secret_path,
            token_path,
        })
    }

    /// Returns a valid access token, refreshing silently if needed.
    ///
    /// yup-oauth2 checks whether the cached token is near expiration and
    /// refreshes it with the refresh token without browser interaction.
    pub(crate) async fn access_token(&self) -> Result<String> {
        let secret = yup_oauth2::read_application_secret(&self.secret_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to read OAuth client credentials at {}",
                    self.secret_path.display()
                )
            })?;
        let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
            secret,
            yup_oauth2::InstalledFlowReturnMethod::HTTPPortRedirect(OAUTH_CALLBACK_PORT),
        )
        .persist_tokens_to_disk(&self.token_path)
        .build()
        .await
        .context("Failed to create the OAuth authenticator")?;

        let token = auth
            .token(OAUTH_SCOPES)
            .await
            .context("Failed to obtain a valid OAuth token")?;
        let access_token = token
            .token()
            .context("The OAuth response did not contain an access token")?;
        debug!("Obtained an access token");
        Ok(access_token.to_string())
    }
}
