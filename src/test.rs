//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestStore;
use crate::model::{Amount, Record};
use crate::report::RecordSource;
use crate::{Collections, Config, FieldNames};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("salesboard");
        let project = Uuid::new_v4().to_string().replace('-', "");
        let store_url =
            format!("https://firestore.googleapis.com/v1/projects/{project}/databases/(default)/documents");
        let config = Config::create(
            &root,
            &store_url,
            "https://auth.example.com/oauth/token",
            "test-client",
        )
        .await
        .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

/// A `RecordSource` over the default seed data for `user`.
pub fn seeded_source(user: &str) -> RecordSource {
    RecordSource::new(
        Box::new(TestStore::default()),
        Collections::default(),
        FieldNames::default(),
        user,
    )
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn amount(s: &str) -> Amount {
    Amount::new(Decimal::from_str(s).unwrap())
}

/// Shorthand for a record owned by `"u"`.
pub fn record(value: &str, date: NaiveDate, category: Option<&str>) -> Record {
    Record::new(amount(value), date, category, "u")
}
