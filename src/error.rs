//! Error types for the public API.
//!
//! Internally the crate uses `anyhow` through the `Res` alias. At the public boundary (the
//! `commands` module) errors are wrapped in `Error`, which carries an `ErrorType` so that callers
//! can tell a missing session apart from a failed fetch.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The result type used inside the crate.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The result type returned by public functions.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure, suitable for showing to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// There is no usable session. The user needs to log in.
    Session,
    /// Records could not be fetched from the document store.
    Fetch,
    /// The user asked for something that cannot be done, e.g. a start date after the end date.
    Request,
    /// The report could not be rendered or written.
    Render,
    /// Anything else.
    Internal,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// A public error: an `ErrorType` plus the underlying error chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(inner: anyhow::Error) -> Self {
        Self::new(ErrorType::Internal, inner)
    }
}

/// Converts an internal result into a public `Result` tagged with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_pub_result_keeps_type_and_chain() {
        let internal: Res<()> = Err(anyhow!("connection reset")).context("Unable to fetch sales");
        let e = internal.pub_result(ErrorType::Fetch).unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Fetch);
        let message = e.to_string();
        assert!(message.contains("Unable to fetch sales"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let e: Error = anyhow!("boom").into();
        assert_eq!(e.error_type(), ErrorType::Internal);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Session.to_string(), "session");
        assert_eq!(ErrorType::Fetch.to_string(), "fetch");
    }
}
