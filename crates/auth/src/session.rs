use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use crate::claims::ClaimSet;
use crate::principal::UserId;
use crate::store::StoreError;
use crate::token::{TokenError, TokenManager};

/// Session-level failure.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid access token")]
    Token(#[from] TokenError),

    #[error("no active session for user {0}")]
    NoActiveSession(UserId),

    #[error("refresh token does not match the active session")]
    RefreshMismatch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Credential pair handed to a client when a session is opened or renewed.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token validity in seconds.
    pub expires_in: u64,
}

/// Composed session flows over [`TokenManager`].
///
/// Renewal deliberately requires *both* halves: a validly signed (if expired)
/// access token and possession of the refresh token currently stored for its
/// subject. A signature alone never renews a session.
pub struct SessionManager {
    tokens: Arc<TokenManager>,
}

impl SessionManager {
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Open a session for an already-authenticated user.
    ///
    /// Primary authentication (password, SMS code, ...) happens upstream;
    /// this mints the credential pair once identity is established. Any
    /// refresh token from an earlier session of the same user is replaced.
    pub async fn open(
        &self,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> Result<SessionTokens, SessionError> {
        let tokens = self.mint(claims, now).await?;
        debug!(user_id = %claims.subject(), "session opened");
        Ok(tokens)
    }

    /// Exchange an expired access token plus its refresh token for a fresh
    /// credential pair.
    ///
    /// Fails closed: if no refresh token is stored for the token's subject
    /// (revoked, or lapsed past its TTL) the session is gone and the caller
    /// must re-authenticate.
    pub async fn renew(
        &self,
        access_token: &str,
        presented_refresh: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionTokens, SessionError> {
        let claims = self.tokens.validate_for_renewal(access_token)?;
        let user_id = claims.subject();

        let stored = self
            .tokens
            .active_refresh_token(user_id)
            .await?
            .ok_or(SessionError::NoActiveSession(user_id))?;

        if !bool::from(stored.as_bytes().ct_eq(presented_refresh.as_bytes())) {
            return Err(SessionError::RefreshMismatch);
        }

        let tokens = self.mint(&claims, now).await?;
        debug!(user_id = %user_id, "session renewed");
        Ok(tokens)
    }

    /// End the user's session by revoking their refresh token. Idempotent.
    pub async fn close(&self, user_id: UserId) -> Result<(), SessionError> {
        self.tokens.revoke_refresh_token(user_id).await?;
        debug!(user_id = %user_id, "session closed");
        Ok(())
    }

    async fn mint(
        &self,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> Result<SessionTokens, SessionError> {
        let access_token = self.tokens.issue_access_token(claims, now)?;
        let refresh_token = self.tokens.issue_refresh_token(claims.subject()).await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.tokens.settings().access_token_lifetime.as_secs(),
        })
    }
}

impl core::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionManager")
            .field("tokens", &self.tokens)
            .finish()
    }
}
