//! The session guard: decides whether there is a signed-in user before anything is fetched.

use crate::api::files::{File, SessionFile};
use crate::api::{oauth, Mode};
use crate::error::Res;
use crate::Config;
use serde::Serialize;
use tracing::{debug, warn};

/// The signed-in user and the access token used to query the store on their behalf.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user: String,
    owner: String,
    #[serde(skip_serializing)]
    access_token: String,
}

impl Session {
    pub fn new(
        user: impl Into<String>,
        owner: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            owner: owner.into(),
            access_token: access_token.into(),
        }
    }

    /// The name the user signed in with.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The identity the provider authenticated. Every record fetched for this session is owned
    /// by it.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("owner", &self.owner)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl From<&SessionFile> for Session {
    fn from(file: &SessionFile) -> Self {
        Session::new(file.user(), file.owner(), file.access_token())
    }
}

/// Looks for an active session in the home directory.
pub(crate) struct SessionGuard<'a> {
    config: &'a Config,
    mode: Mode,
}

impl<'a> SessionGuard<'a> {
    pub(crate) fn new(config: &'a Config, mode: Mode) -> Self {
        Self { config, mode }
    }

    /// Returns the active session, or `None` when there is no usable session. A missing or
    /// unreadable session file and an expired token that cannot be refreshed both count as "no
    /// session".
    pub(crate) async fn check(&self) -> Res<Option<Session>> {
        let path = self.config.session_path();
        if !path.is_file() {
            debug!("No session file at {}", path.display());
            return Ok(None);
        }

        let mut file: File<SessionFile> = match File::load(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("Ignoring an unreadable session file: {e:#}");
                return Ok(None);
            }
        };

        if file.data().is_expired() {
            debug!("The session for {} has expired", file.data().user());
            if let Err(e) = oauth::refresh(self.config, self.mode, &mut file).await {
                warn!("Unable to renew the session: {e:#}");
                return Ok(None);
            }
        }

        Ok(Some(Session::from(file.data())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::utils;
    use chrono::Utc;

    #[tokio::test]
    async fn test_no_session_file() {
        let env = TestEnv::new().await;
        let config = env.config();
        let session = SessionGuard::new(&config, Mode::Test).check().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_active_session() {
        let env = TestEnv::new().await;
        let config = env.config();
        oauth::login(&config, Mode::Test, "alice", "pw").await.unwrap();
        let session = SessionGuard::new(&config, Mode::Test)
            .check()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user(), "alice");
        assert_eq!(session.access_token(), "test-token-alice");
    }

    #[tokio::test]
    async fn test_garbage_session_file_is_no_session() {
        let env = TestEnv::new().await;
        let config = env.config();
        utils::write(config.session_path(), "not json").await.unwrap();
        let session = SessionGuard::new(&config, Mode::Test).check().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_without_refresh_token_is_no_session() {
        let env = TestEnv::new().await;
        let config = env.config();
        let expired = Utc::now() - chrono::Duration::hours(2);
        File::new(
            config.session_path(),
            SessionFile::new("alice", "t", None, Some(expired)),
        )
        .save()
        .await
        .unwrap();
        let session = SessionGuard::new(&config, Mode::Remote).check().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_session_owner_comes_from_the_saved_id() {
        let env = TestEnv::new().await;
        let config = env.config();
        File::new(
            config.session_path(),
            SessionFile::new("Alice@Example.com", "t", None, None)
                .with_owner_id(Some("uid-42".to_string())),
        )
        .save()
        .await
        .unwrap();
        let session = SessionGuard::new(&config, Mode::Remote)
            .check()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.user(), "Alice@Example.com");
        assert_eq!(session.owner(), "uid-42");
    }

    #[test]
    fn test_debug_redacts_token() {
        let s = Session::new("alice", "uid-1", "secret-token");
        let printed = format!("{s:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("secret-token"));
    }
}
