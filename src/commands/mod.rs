//! Command handlers for the salesboard CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod categories;
mod init;
mod report;

use crate::api::{self, Mode, Session};
use crate::error::{ErrorType, IntoResult};
use crate::report::RecordSource;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout, require_session};
pub use categories::categories;
pub use init::init;
pub use report::{report, ReportOutput};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data that can be logged or inspected by callers.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Connects to the store for `mode` and reads records on behalf of `session`.
fn record_source(config: &Config, session: &Session, mode: Mode) -> Result<RecordSource> {
    let store = api::store(config, session, mode).pub_result(ErrorType::Config)?;
    Ok(RecordSource::new(
        store,
        config.collections().clone(),
        config.fields().clone(),
        session.owner(),
    ))
}
