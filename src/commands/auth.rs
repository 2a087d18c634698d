//! Session command handlers.
//!
//! This module implements the CLI commands for:
//! - `salesboard login` - Sign in with a user and password
//! - `salesboard logout` - Forget the saved session
//!
//! It also holds the session guard used by every command that reads records.

use crate::api::{self, Mode, Session, SessionGuard};
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::anyhow;
use tracing::debug;

/// Handles the `salesboard login` command.
///
/// # Errors
/// Returns a `Session` error if the credentials are rejected.
pub async fn login(config: &Config, mode: Mode, user: &str, password: &str) -> Result<Out<Session>> {
    let session = api::login(config, mode, user, password)
        .await
        .pub_result(ErrorType::Session)?;
    Ok(Out::new(format!("Signed in as {}", session.user()), session))
}

/// Handles the `salesboard logout` command.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    let removed = api::logout(config).await.pub_result(ErrorType::Internal)?;
    Ok(if removed {
        "Signed out".into()
    } else {
        "There was no active session".into()
    })
}

/// Returns the active session or a `Session` error telling the user to sign in.
pub async fn require_session(config: &Config, mode: Mode) -> Result<Session> {
    match SessionGuard::new(config, mode)
        .check()
        .await
        .pub_result(ErrorType::Internal)?
    {
        Some(session) => {
            debug!("Active session for {}", session.user());
            Ok(session)
        }
        None => Err(Error::new(
            ErrorType::Session,
            anyhow!("No active session. Run 'salesboard login' to sign in."),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_no_session_is_session_error() {
        let env = TestEnv::new().await;
        let e = require_session(&env.config(), Mode::Test).await.unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Session);
        assert!(e.to_string().contains("salesboard login"));
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let env = TestEnv::new().await;
        let config = env.config();
        let out = login(&config, Mode::Test, "alice", "pw").await.unwrap();
        assert_eq!(out.message(), "Signed in as alice");
        let session = require_session(&config, Mode::Test).await.unwrap();
        assert_eq!(session.user(), "alice");

        assert_eq!(logout(&config).await.unwrap().message(), "Signed out");
        let e = require_session(&config, Mode::Test).await.unwrap_err();
        assert_eq!(e.error_type(), ErrorType::Session);
        assert_eq!(
            logout(&config).await.unwrap().message(),
            "There was no active session"
        );
    }
}
