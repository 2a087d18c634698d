//! Access to the remote services: the document store that holds sales and expense records, and
//! the OAuth 2.0 provider that issues sessions.
//!
//! The store is reached through the `Store` trait. `RestStore` talks to a Firestore-style REST
//! endpoint; `TestStore` holds documents in memory and is used when `Mode::Test` is in effect.

mod files;
mod oauth;
mod rest_store;
mod session;
mod test_store;

use crate::error::Res;
use crate::model::Document;
use crate::Config;
use serde::{Deserialize, Serialize};

pub(crate) use oauth::{login, logout};
pub use session::Session;
pub(crate) use session::SessionGuard;
pub(crate) use test_store::TestStore;

#[cfg(test)]
pub(crate) use test_store::TEST_USER;

/// The environment variable that switches the program into `Mode::Test`.
pub const TEST_MODE_ENV: &str = "SALESBOARD_IN_TEST_MODE";

/// A document store that can list the documents of a collection owned by one user.
#[async_trait::async_trait]
pub(crate) trait Store: Send + Sync {
    /// Returns every document in `collection` whose `owner_field` equals `owner`. No other
    /// filtering happens on the store side.
    async fn query(&self, collection: &str, owner_field: &str, owner: &str)
        -> Res<Vec<Document>>;
}

/// Selects between the real remote services and in-memory stand-ins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Use the configured document store and OAuth provider.
    #[default]
    Remote,
    /// Use seeded in-memory data and offline sessions.
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` when `SALESBOARD_IN_TEST_MODE` is set to a non-empty value.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Test,
            _ => Mode::Remote,
        }
    }
}

/// Creates the `Store` for `mode`, authenticated as `session`.
pub(crate) fn store(config: &Config, session: &Session, mode: Mode) -> Res<Box<dyn Store>> {
    Ok(match mode {
        Mode::Remote => Box::new(rest_store::RestStore::new(config, session)?),
        Mode::Test => Box::new(TestStore::default()),
    })
}
