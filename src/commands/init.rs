use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::config::CONFIG_JSON;
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use std::path::Path;

/// Creates the home directory, its subdirectories and an initial `config.json` file.
///
/// # Arguments
/// - `home` - The directory that will be the root of the home directory, e.g. `$HOME/salesboard`
/// - `store_url` - The base URL of the document store that holds the `sales` and `expenses`
///   collections.
/// - `token_url` - The OAuth 2.0 token endpoint used by `salesboard login`.
/// - `client_id` - The OAuth 2.0 client ID registered for salesboard.
///
/// # Errors
/// - Returns an error if the home directory already has a config, if either URL is invalid, or if
///   any file operations fail.
pub async fn init(home: &Path, store_url: &str, token_url: &str, client_id: &str) -> Result<Out<()>> {
    if home.join(CONFIG_JSON).is_file() {
        return Err(Error::new(
            ErrorType::Config,
            anyhow!(
                "'{}' already has a config.json, remove it first to start over",
                home.display()
            ),
        ));
    }
    let config = Config::create(home, store_url, token_url, client_id)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the salesboard home directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STORE: &str = "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents";
    const TOKEN: &str = "https://auth.example.com/oauth/token";

    #[tokio::test]
    async fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("salesboard");
        init(&home, STORE, TOKEN, "cli").await.unwrap();
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.client_id(), "cli");
        assert!(config.secrets().is_dir());
        assert!(config.reports().is_dir());
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("salesboard");
        init(&home, STORE, TOKEN, "cli").await.unwrap();
        let e = init(&home, STORE, TOKEN, "cli").await.unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_init_bad_url_is_config_error() {
        let dir = TempDir::new().unwrap();
        let e = init(&dir.path().join("sb"), "not a url", TOKEN, "cli")
            .await
            .unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Config);
    }
}
