//! These structs provide the CLI interface for the salesboard CLI.

use crate::model::CategoryFilter;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// salesboard: sales and expense reports from your shop's document store.
///
/// The program reads your sales and expense records, filters them by date and category, and
/// writes an HTML dashboard with a weekday comparison chart, an expense breakdown by category and
/// a summary of totals.
///
/// Start with `salesboard init`, then `salesboard login`. Set SALESBOARD_IN_TEST_MODE=1 to try
/// everything against built-in sample data.
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
    /// Create the home directory and its config.json.
    ///
    /// - Decide where the home directory should live and pass it as --home (default
    ///   $HOME/salesboard).
    ///
    /// - Pass the base URL of your document store as --store-url and your OAuth 2.0 token
    ///   endpoint and client ID as --token-url and --client-id.
    Init(InitArgs),
    /// Sign in and save the session.
    Login(LoginArgs),
    /// Remove the saved session.
    Logout,
    /// List the sales and expense categories you can filter on.
    Categories,
    /// Build the dashboard for a date range and category selection.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where salesboard configuration, the session and reports are held. Defaults
    /// to ~/salesboard
    #[arg(long, env = "SALESBOARD_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `salesboard init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the document store, e.g.
    /// https://firestore.googleapis.com/v1/projects/my-shop/databases/(default)/documents
    #[arg(long)]
    store_url: String,

    /// The OAuth 2.0 token endpoint.
    #[arg(long)]
    token_url: String,

    /// The OAuth 2.0 client ID registered for salesboard.
    #[arg(long)]
    client_id: String,
}

impl InitArgs {
    pub fn new(
        store_url: impl Into<String>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            store_url: store_url.into(),
            token_url: token_url.into(),
            client_id: client_id.into(),
        }
    }

    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// (Not shown): Args for the `salesboard login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The user to sign in as, usually an email address.
    #[arg(long)]
    user: String,

    /// The password. Prefer setting SALESBOARD_PASSWORD over passing it on the command line.
    #[arg(long, env = "SALESBOARD_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// (Not shown): Args for the `salesboard report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    /// Only include records on or after this date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Only include records on or before this date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Only include sales in this category. Use `all` for every category.
    #[arg(long, default_value_t = CategoryFilter::All)]
    sales_category: CategoryFilter,

    /// Only include expenses in this category. Use `all` for every category.
    #[arg(long, default_value_t = CategoryFilter::All)]
    expense_category: CategoryFilter,

    /// Where to write the HTML report. Defaults to $SALESBOARD_HOME/reports/report.html
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        sales_category: CategoryFilter,
        expense_category: CategoryFilter,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            start,
            end,
            sales_category,
            expense_category,
            output,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn sales_category(&self) -> &CategoryFilter {
        &self.sales_category
    }

    pub fn expense_category(&self) -> &CategoryFilter {
        &self.expense_category
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("salesboard"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or SALESBOARD_HOME instead of relying on the default \
                salesboard home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("salesboard")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ALL;

    #[test]
    fn test_parse_report_args() {
        let args = Args::try_parse_from([
            "salesboard",
            "--home",
            "/tmp/sb",
            "report",
            "--start",
            "2024-01-07",
            "--sales-category",
            "Coffee",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/sb"));
        let Command::Report(report) = args.command() else {
            panic!("expected the report command");
        };
        assert_eq!(
            report.start(),
            NaiveDate::from_ymd_opt(2024, 1, 7)
        );
        assert_eq!(report.end(), None);
        assert_eq!(
            report.sales_category(),
            &CategoryFilter::Only("Coffee".to_string())
        );
        assert_eq!(report.expense_category(), &CategoryFilter::All);
    }

    #[test]
    fn test_all_is_the_sentinel() {
        let args = Args::try_parse_from(["salesboard", "report", "--expense-category", ALL]).unwrap();
        let Command::Report(report) = args.command() else {
            panic!("expected the report command");
        };
        assert_eq!(report.expense_category(), &CategoryFilter::All);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Args::try_parse_from(["salesboard", "report", "--start", "07/01/2024"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["salesboard", "--log-level", "debug", "logout"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
