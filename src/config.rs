//! Configuration file handling for spending-alert.
//!
//! The configuration lives in `$SPENDING_ALERT_HOME/config.json` and holds
//! the Google Sheet URL, the range to read, the reserved month-row key and
//! the optional alert recipient. The per-category limits live next to it in
//! `limits.json` as a flat JSON object.

use crate::model::{Limits, DEFAULT_MONTH_KEY};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "spending-alert";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const LIMITS_JSON: &str = "limits.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$SPENDING_ALERT_HOME` and from
/// there it loads `config.json` and `limits.json`. It provides paths to other
/// items that are expected in certain locations within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    limits_path: PathBuf,
    config_file: ConfigFile,
    limits: Limits,
    spreadsheet_id: String,
}

impl Config {
    /// Creates the data directory and its contents:
    /// - an initial `config.json` using `sheet_url` and `range` along with
    ///   default settings
    /// - an empty `limits.json` template for the user to fill in
    /// - moves `secret_file` into its default location in the data dir
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory,
    ///   e.g. `$HOME/spending-alert`
    /// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON
    ///   needed to start the Google OAuth workflow. This will be moved from
    ///   the `secret_file` path to its default location in the data
    ///   directory.
    /// - `sheet_url` - The URL of the Google Sheet holding the monthly
    ///   spending totals.
    /// - `range` - The range to read, e.g. `Spending!A:B`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        sheet_url: &str,
        range: &str,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the spending-alert home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        // Move the Google OAuth client credentials file to its default
        // location in the data dir
        let secret_destination = secrets_dir.join(CLIENT_SECRET_JSON);
        utils::rename(secret_file, secret_destination).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: sheet_url.to_string(),
            range: range.to_string(),
            month_key: DEFAULT_MONTH_KEY.to_string(),
            alert_to: None,
            client_secret_path: None,
            token_path: None,
        };
        config_file.save(&config_path).await?;

        // Write an empty limits template for the user to fill in
        let limits_path = root.join(LIMITS_JSON);
        let limits = Limits::default();
        let data = serde_json::to_string_pretty(&limits).context("Unable to serialize limits")?;
        utils::write(&limits_path, data).await?;

        let spreadsheet_id = extract_spreadsheet_id(sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            limits_path,
            config_file,
            limits,
            spreadsheet_id,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file
    ///   exists
    /// - load the config file and the limits file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative).await?;

        let _ = utils::read_dir(&root)
            .await
            .context("The spending-alert home directory is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'spending-alert init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let limits_path = root.join(LIMITS_JSON);
        let limits: Limits = utils::deserialize(&limits_path)
            .await
            .context("Unable to load the per-category limits")?;

        let spreadsheet_id = extract_spreadsheet_id(&config_file.sheet_url)
            .context("Failed to extract spreadsheet ID from sheet URL")?
            .to_string();

        let config = Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            limits_path,
            config_file,
            limits,
            spreadsheet_id,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn limits_path(&self) -> &Path {
        &self.limits_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// The range to read from the sheet, e.g. `Spending!A:B`.
    pub fn range(&self) -> &str {
        &self.config_file.range
    }

    /// The reserved row label that carries the reporting month.
    pub fn month_key(&self) -> &str {
        &self.config_file.month_key
    }

    /// The configured alert recipient, if any. When absent the mailer derives
    /// a plus-address alias of the authenticated account.
    pub fn alert_to(&self) -> Option<&str> {
        self.config_file.alert_to.as_deref()
    }

    /// The per-category limits loaded from `limits.json`.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise
    /// resolves the relative path.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves
    /// the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.token_path())
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it
    /// unchanged if it is absolute.
    fn resolve_secrets_file_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spending-alert",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
///   "range": "Spending!A:B",
///   "month_key": "Month"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spending-alert"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the Google Sheet holding the monthly spending totals
    sheet_url: String,

    /// The range to read, e.g. `Spending!A:B`
    range: String,

    /// The reserved row label whose value is the reporting month
    #[serde(default = "default_month_key")]
    month_key: String,

    /// Where to send the alert. When omitted, the alert goes to a
    /// plus-address alias of the authenticated user's own address.
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_to: Option<String>,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to
    /// the home directory or absolute). Defaults to
    /// `.secrets/client_secret.json` if not specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the OAuth token file (optional, relative to the home
    /// directory or absolute). Defaults to `.secrets/token.json` if not
    /// specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_month_key() -> String {
    DEFAULT_MONTH_KEY.to_string()
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the client secret path. If None, defaults to
    /// `.secrets/client_secret.json`.
    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    /// Gets the token path. If None, defaults to `.secrets/token.json`.
    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g.,
///   "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    // URL format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...
    // or: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID?foo=bar
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            // Extract the ID and remove any query parameters or fragments
            let id_part = parts[i + 1];
            let id = id_part
                .split('?')
                .next()
                .unwrap_or(id_part)
                .split('#')
                .next()
                .unwrap_or(id_part);
            return Ok(id);
        }
    }
    Err(anyhow::anyhow!(
        "Invalid Google Sheets URL format. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("alert_home");
        let secret_source_file = dir.path().join("x.json");
        let secret_content = "12345";
        let sheet_url =
            "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        utils::write(&secret_source_file, secret_content)
            .await
            .unwrap();

        let config = Config::create(&home_dir, &secret_source_file, sheet_url, "Spending!A:B")
            .await
            .unwrap();

        assert_eq!(sheet_url, config.sheet_url());
        assert_eq!(
            "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL",
            config.spreadsheet_id()
        );
        assert_eq!("Spending!A:B", config.range());
        assert_eq!("Month", config.month_key());
        assert!(config.limits().is_empty());

        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(secret_content, found_secret_content);
        assert!(config.secrets().is_dir());
        assert!(config.limits_path().is_file());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("alert_home");
        let secret_file = dir.path().join("foo.json");
        utils::write(&secret_file, "{}").await.unwrap();
        let url = "https://example.com/spreadsheets/d/MySheetIDX";

        let created = Config::create(&home_dir, &secret_file, url, "Sheet1!A:B")
            .await
            .unwrap();

        // Put some limits in place and reload
        utils::write(created.limits_path(), r#"{"Groceries": 400}"#)
            .await
            .unwrap();
        let loaded = Config::load(&home_dir).await.unwrap();

        assert_eq!("MySheetIDX", loaded.spreadsheet_id());
        assert_eq!(loaded.limits().get("Groceries"), Some(400));
    }

    #[tokio::test]
    async fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test",
            "range": "Spending!A:B"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "spending-alert",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/minimal",
            "range": "Spending!A:B"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();

        assert_eq!(config.month_key, "Month");
        assert_eq!(config.alert_to, None);
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
        assert_eq!(config.token_path(), PathBuf::from(SECRETS).join(TOKEN_JSON));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let config = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: "https://docs.google.com/spreadsheets/d/test".to_string(),
            range: "Spending!A:B".to_string(),
            month_key: DEFAULT_MONTH_KEY.to_string(),
            alert_to: None,
            client_secret_path: None,
            token_path: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("alert_to"));
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("token_path"));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        let url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        let id = extract_spreadsheet_id(url).unwrap();
        assert_eq!(id, "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL");

        let url2 = "https://docs.google.com/spreadsheets/d/ABC123";
        assert_eq!(extract_spreadsheet_id(url2).unwrap(), "ABC123");

        let url3 = "https://docs.google.com/spreadsheets/d/ABC123?foo=bar";
        assert_eq!(extract_spreadsheet_id(url3).unwrap(), "ABC123");

        let invalid = "https://example.com/invalid";
        assert!(extract_spreadsheet_id(invalid).is_err());
    }
}
