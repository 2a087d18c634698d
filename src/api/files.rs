//! Serialization and deserialization structures for the session file.
//! - `session.json`: the signed-in user and the tokens issued for them

use crate::error::Res;
use crate::utils;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Represents a file that we want to `Serialize`, `Deserialize`, and read from memory in-between
/// serializations and deserialization. Basically we are just holding the `path` and the `data`
/// here.
#[derive(Default, Debug, Clone)]
pub(super) struct File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    /// Load data from a file and create a File instance
    pub(super) async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let data: F = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    /// Create a File instance with the given path and data
    pub(super) fn new(path: impl Into<PathBuf>, data: F) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Save the current data to the file
    pub(super) async fn save(&self) -> Res<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize data to JSON")?;
        utils::write(&self.path, json).await?;

        // Set restrictive permissions on Unix-like systems
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .context("Failed to set file permissions")?;
        }

        Ok(())
    }

    pub(super) fn data(&self) -> &F {
        &self.data
    }

    pub(super) fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }
}

/// What we save after a successful login.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) struct SessionFile {
    user: String,
    access_token: String,
    /// The identity the provider authenticated, when it differs from `user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    /// `None` means the provider did not say when the token expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    pub(super) fn new(
        user: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user: user.into(),
            owner_id: None,
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    pub(super) fn with_owner_id(mut self, owner_id: Option<String>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub(super) fn user(&self) -> &str {
        &self.user
    }

    /// The owner id records are stored under. Falls back to the login name.
    pub(super) fn owner(&self) -> &str {
        self.owner_id.as_deref().unwrap_or(&self.user)
    }

    pub(super) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(super) fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Check if the token is expired or will expire soon (within 5 minutes)
    pub(super) fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => expires_at <= Utc::now() + chrono::Duration::minutes(5),
        }
    }

    /// Update the token with new values
    pub(super) fn update(
        &mut self,
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
        refresh_token: Option<String>,
        owner_id: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(rt) = refresh_token {
            self.refresh_token = Some(rt);
        }
        if let Some(id) = owner_id {
            self.owner_id = Some(id);
        }
    }
}
