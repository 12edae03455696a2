//! Authentication command handlers for the OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `spending-alert auth` - Initial OAuth consent flow
//! - `spending-alert auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;

/// Handles the `spending-alert auth` command - runs the OAuth consent flow.
///
/// This is the ONLY command that should open a browser for OAuth
/// authentication. It opens the Google consent page and saves the resulting
/// tokens to token.json with the scopes the program needs (read-only Sheets
/// and Gmail modify).
///
/// # Errors
/// Returns an error if the OAuth flow fails or if client_secret.json is
/// missing.
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let _ = TokenProvider::initialize(config.client_secret_path(), config.token_path()).await?;
    Ok("Authorization successful".into())
}

/// Handles the `spending-alert auth --verify` command.
///
/// This command NEVER opens a browser or triggers an interactive OAuth flow.
/// It only verifies that existing cached tokens are valid, refreshing
/// silently if needed. If the token is missing or invalid it fails with a
/// message telling the user to run `spending-alert auth`.
///
/// # Errors
/// Returns an error if verification fails, credentials are missing, or
/// tokens are invalid.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    let token_provider = TokenProvider::load(config.client_secret_path(), config.token_path())
        .await
        .context(
            "Unable to use the existing tokens found in the token JSON file. \n\n\
            You should run 'spending-alert auth' (without the --verify flag).",
        )?;
    let _ = token_provider
        .access_token()
        .await
        .context("Unable to refresh the token")?;
    Ok("Your OAuth token is valid!".into())
}
