//! OAuth 2.0 sign-in for the document store.
//!
//! This module handles:
//! - Signing in with the resource-owner password grant and saving the session to `session.json`
//! - Refreshing an expired access token with the saved refresh token
//! - Signing out by removing the session file

use crate::api::files::{File, SessionFile};
use crate::api::{Mode, Session};
use crate::error::Res;
use crate::{utils, Config};
use anyhow::Context;
use chrono::{DateTime, Utc};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet, ExtraTokenFields, RefreshToken,
    ResourceOwnerPassword, ResourceOwnerUsername, StandardRevocableToken, StandardTokenResponse,
    TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Non-standard fields that identity providers add to the token response to say who signed in.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct IdentityFields {
    #[serde(
        default,
        alias = "localId",
        alias = "uid",
        alias = "sub",
        skip_serializing_if = "Option::is_none"
    )]
    user_id: Option<String>,
}

impl ExtraTokenFields for IdentityFields {}

type IdentityTokenResponse = StandardTokenResponse<IdentityFields, BasicTokenType>;

type AuthClient = Client<
    BasicErrorResponse,
    IdentityTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// How long sessions created in `Mode::Test` last.
const TEST_SESSION_HOURS: i64 = 12;

/// Signs `user` in and saves the session file.
///
/// In `Mode::Test` no request is made; an offline session is created for any user.
///
/// # Errors
/// Returns an error if the token endpoint rejects the credentials or the session cannot be saved.
pub(crate) async fn login(config: &Config, mode: Mode, user: &str, password: &str) -> Res<Session> {
    let session_file = match mode {
        Mode::Test => SessionFile::new(
            user,
            format!("test-token-{user}"),
            None,
            Some(Utc::now() + chrono::Duration::hours(TEST_SESSION_HOURS)),
        ),
        Mode::Remote => {
            info!("Signing in to {} as {user}", config.token_url());
            let token = auth_client(config)
                .exchange_password(
                    &ResourceOwnerUsername::new(user.to_string()),
                    &ResourceOwnerPassword::new(password.to_string()),
                )
                .request_async(&http_client()?)
                .await
                .context("The token endpoint rejected the sign-in")?;
            let id = owner_id(&token);
            if id.is_none() {
                warn!(
                    "The token endpoint did not return a user id, records will be looked up by \
                    '{user}'"
                );
            }
            SessionFile::new(
                user,
                token.access_token().secret().clone(),
                token.refresh_token().map(|t| t.secret().clone()),
                expires_at(token.expires_in()),
            )
            .with_owner_id(id)
        }
    };

    let file = File::new(config.session_path(), session_file);
    file.save().await.context("Unable to save the session")?;
    debug!("Session saved to {}", file.path().display());
    Ok(Session::from(file.data()))
}

/// Removes the session file. Returns `false` if there was no session to remove.
pub(crate) async fn logout(config: &Config) -> Res<bool> {
    utils::remove(config.session_path()).await
}

/// Exchanges the refresh token for a new access token and saves the result.
pub(super) async fn refresh(config: &Config, mode: Mode, file: &mut File<SessionFile>) -> Res<()> {
    match mode {
        Mode::Test => {
            let token = file.data().access_token().to_string();
            let expires = Utc::now() + chrono::Duration::hours(TEST_SESSION_HOURS);
            file.data_mut().update(token, Some(expires), None, None);
        }
        Mode::Remote => {
            let refresh_token = file
                .data()
                .refresh_token()
                .context("The session has expired and has no refresh token")?
                .to_string();
            let token = auth_client(config)
                .exchange_refresh_token(&RefreshToken::new(refresh_token))
                .request_async(&http_client()?)
                .await
                .context("Unable to refresh the session")?;
            file.data_mut().update(
                token.access_token().secret().clone(),
                expires_at(token.expires_in()),
                token.refresh_token().map(|t| t.secret().clone()),
                owner_id(&token),
            );
        }
    }
    file.save().await?;
    debug!("Session refreshed");
    Ok(())
}

/// The authenticated user id from the token response, if the provider sent one.
fn owner_id(token: &IdentityTokenResponse) -> Option<String> {
    token
        .extra_fields()
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn auth_client(config: &Config) -> AuthClient {
    let client = Client::new(ClientId::new(config.client_id().to_string()))
        .set_token_uri(TokenUrl::from_url(config.token_url().clone()));
    match config.client_secret() {
        Some(secret) => client.set_client_secret(ClientSecret::new(secret.to_string())),
        None => client,
    }
}

fn http_client() -> Res<reqwest::Client> {
    reqwest::ClientBuilder::new()
        // Following redirects opens the client up to SSRF vulnerabilities.
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to create the HTTP client")
}

fn expires_at(expires_in: Option<std::time::Duration>) -> Option<DateTime<Utc>> {
    expires_in
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .map(|d| Utc::now() + d)
}
