//! These structs provide the CLI interface for the spending-alert CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// The default sheet range holding the per-category monthly totals.
const DEFAULT_RANGE: &str = "Spending!A:B";

/// spending-alert: a small batch job that checks your budget.
///
/// The purpose of this program is to read monthly spending totals per
/// category from a Google Sheet, compare them against the per-category limits
/// in limits.json, and insert an alert email into your Gmail inbox listing
/// the categories that exceeded their limit. It runs once, does its work, and
/// exits.
///
/// You will need to set up a Google API key and OAuth for this. Run
/// `spending-alert init` first, then `spending-alert auth`, then schedule
/// `spending-alert check` however you like (e.g. cron).
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need a few things ready
    /// beforehand:
    ///
    /// - Decide what directory you want to store data in and pass it as
    ///   --alert-home. By default, it will be $HOME/spending-alert.
    ///
    /// - Get the URL of your Google Sheet and pass it as --sheet-url.
    ///
    /// - Set up your Google API access credentials and download them to a
    ///   file. You will pass this as --client-secret.
    ///
    /// After init, edit limits.json in the data directory to set your
    /// per-category limits.
    Init(InitArgs),
    /// Authenticate with the Google APIs via OAuth.
    Auth(AuthArgs),
    /// Check this month's spending against the limits and send the alert.
    Check(CheckArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where spending-alert data and configuration is held.
    /// Defaults to ~/spending-alert
    #[arg(long, env = "SPENDING_ALERT_HOME", default_value_t = default_alert_home())]
    alert_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, alert_home: PathBuf) -> Self {
        Self {
            log_level,
            alert_home: alert_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn alert_home(&self) -> &DisplayPath {
        &self.alert_home
    }
}

/// Args for the `spending-alert init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The range holding the per-category monthly totals, in the form
    /// 'sheetname!first_cell:last_cell'.
    #[arg(long, default_value = DEFAULT_RANGE)]
    range: String,

    /// The path to your downloaded OAuth API credentials. This file will be
    /// moved to the default secrets location in the main data directory.
    #[arg(long)]
    client_secret: PathBuf,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        range: impl Into<String>,
        client_secret: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            range: range.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }
}

/// Args for the `spending-alert auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication without opening a browser.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// Args for the `spending-alert check` command.
#[derive(Debug, Parser, Clone)]
pub struct CheckArgs {
    /// Compose the alert and print what would be sent, but do not send it.
    #[arg(long)]
    dry_run: bool,
}

impl CheckArgs {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

fn default_alert_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("spending-alert"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --alert-home or SPENDING_ALERT_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("spending-alert")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
