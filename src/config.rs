//! Configuration file handling for salesboard.
//!
//! The configuration file is stored at `$SALESBOARD_HOME/config.json` and contains the location of
//! the document store, the OAuth token endpoint used to sign in, and the names of the collections
//! and fields that hold sales and expense records.

use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "salesboard";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const REPORTS: &str = "reports";
const SESSION_JSON: &str = "session.json";
pub(crate) const CONFIG_JSON: &str = "config.json";
const REPORT_HTML: &str = "report.html";
const DEFAULT_CURRENCY: &str = "$";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SALESBOARD_HOME` and from there it loads `$SALESBOARD_HOME/config.json`. It
/// provides paths to other items that are expected in a certain location within the home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    reports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store_url: Url,
    token_url: Url,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g.
    ///   `$HOME/salesboard`
    /// - `store_url` - The base URL of the document store, e.g.
    ///   `https://firestore.googleapis.com/v1/projects/my-shop/databases/(default)/documents`
    /// - `token_url` - The OAuth 2.0 token endpoint used by `salesboard login`.
    /// - `client_id` - The OAuth 2.0 client ID registered for this program.
    ///
    /// # Errors
    /// - Returns an error if either URL is invalid or if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        store_url: &str,
        token_url: &str,
        client_id: &str,
    ) -> Res<Self> {
        let store = parse_url(store_url, "store_url")?;
        let token = parse_url(token_url, "token_url")?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the salesboard home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;
        let reports = root.join(REPORTS);
        utils::make_dir(&reports).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            store_url: store_url.to_string(),
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            reports,
            config_path,
            config_file,
            store_url: store,
            token_url: token,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the secrets and reports directories exist
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The salesboard home directory is missing, run 'salesboard init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let store_url = parse_url(&config_file.store_url, "store_url")?;
        let token_url = parse_url(&config_file.token_url, "token_url")?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            reports: root.join(REPORTS),
            config_path,
            config_file,
            store_url,
            token_url,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        if !config.reports.is_dir() {
            utils::make_dir(&config.reports).await?;
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn reports(&self) -> &Path {
        &self.reports
    }

    /// The default location of the generated HTML report.
    pub fn report_path(&self) -> PathBuf {
        self.reports.join(REPORT_HTML)
    }

    pub fn store_url(&self) -> &Url {
        &self.store_url
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    pub fn client_id(&self) -> &str {
        &self.config_file.client_id
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.config_file.client_secret.as_deref()
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    pub fn collections(&self) -> &Collections {
        &self.config_file.collections
    }

    pub fn fields(&self) -> &FieldNames {
        &self.config_file.fields
    }

    /// Returns the stored `session_path` if it is absolute, otherwise resolves the relative path.
    pub fn session_path(&self) -> PathBuf {
        let p = self.config_file.session_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// The names of the document collections that hold each kind of record.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Collections {
    pub sales: String,
    pub expenses: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            sales: "sales".to_string(),
            expenses: "expenses".to_string(),
        }
    }
}

/// The names of the document fields that make up a record.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct FieldNames {
    pub amount: String,
    pub date: String,
    pub category: String,
    /// The field compared against the signed-in user when querying the store.
    pub owner: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            amount: "amount".to_string(),
            date: "date".to_string(),
            category: "category".to_string(),
            owner: "uid".to_string(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "salesboard",
///   "config_version": 1,
///   "store_url": "https://firestore.googleapis.com/v1/projects/my-shop/databases/(default)/documents",
///   "token_url": "https://auth.example.com/oauth/token",
///   "client_id": "salesboard-cli",
///   "currency_symbol": "R$",
///   "collections": { "sales": "vendas", "expenses": "gastos" },
///   "fields": { "amount": "valor", "date": "data", "category": "categoria", "owner": "uid" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "salesboard"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the document store
    store_url: String,

    /// OAuth 2.0 token endpoint
    token_url: String,

    /// OAuth 2.0 client ID
    client_id: String,

    /// OAuth 2.0 client secret, for providers that require one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,

    /// Prefix used when printing monetary values
    #[serde(default = "default_currency")]
    currency_symbol: String,

    #[serde(default)]
    collections: Collections,

    #[serde(default)]
    fields: FieldNames,

    /// Path to the session file (optional, relative to the home directory or absolute)
    /// Defaults to $SALESBOARD_HOME/.secrets/session.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_path: Option<PathBuf>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            store_url: String::new(),
            token_url: String::new(),
            client_id: String::new(),
            client_secret: None,
            currency_symbol: default_currency(),
            collections: Collections::default(),
            fields: FieldNames::default(),
            session_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
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
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SESSION_JSON))
    }
}

fn parse_url(s: &str, name: &str) -> Res<Url> {
    Url::parse(s).with_context(|| format!("The {name} '{s}' is not a valid URL"))
}
