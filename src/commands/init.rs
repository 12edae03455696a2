use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its contents:
/// - an initial `config.json` using `sheet_url` and `range` along with
///   default settings
/// - an empty `limits.json` template for the user to fill in with
///   per-category limits
/// - copies `secret_file` into its default location in the data dir
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory,
///   e.g. `$HOME/spending-alert`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed
///   to start the Google OAuth workflow.
/// - `sheet_url` - The URL of the Google Sheet holding the monthly spending
///   totals.
/// - `range` - The range to read, e.g. `Spending!A:B`.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    home: &Path,
    secret_file: &Path,
    sheet_url: &str,
    range: &str,
) -> Result<Out<()>> {
    let config = Config::create(home, secret_file, sheet_url, range)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the spending-alert directory and config. \
         Add your per-category limits to {}",
        config.limits_path().display()
    )
    .into())
}
