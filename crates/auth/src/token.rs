use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use crate::claims::ClaimSet;
use crate::principal::UserId;
use crate::settings::TokenSettings;
use crate::store::{KeyValueStore, StoreError};

/// Access-token validation/issuance error.
///
/// Every variant is fatal to the attempt; nothing here is retried.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("token signed with {found:?}, expected HS256")]
    AlgorithmMismatch { found: Algorithm },

    #[error("token signature verification failed")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("token subject is missing or not an integer user id")]
    InvalidSubject,

    #[error("token claims could not be encoded")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// JWT payload as signed/verified on the wire.
///
/// Envelope claims are explicit fields; application claims ride in the
/// flattened map (reserved names are filtered out at [`ClaimSet`] level, so
/// the two cannot collide).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    iss: String,
    aud: String,
    sub: String,
    nbf: i64,
    exp: i64,
    #[serde(flatten)]
    extra: BTreeMap<String, JsonValue>,
}

impl WireClaims {
    fn into_claim_set(self) -> Result<ClaimSet, TokenError> {
        let subject: UserId = self.sub.parse().map_err(|_| TokenError::InvalidSubject)?;
        Ok(ClaimSet::from_parts(subject, self.extra))
    }
}

fn refresh_token_key(user_id: UserId) -> String {
    format!("RefreshToken:{user_id}")
}

/// Issues, validates and revokes session credentials.
///
/// Sole holder of the signing key. Access-token operations are pure CPU work;
/// refresh-token operations each make one round-trip through the configured
/// [`KeyValueStore`].
pub struct TokenManager {
    settings: TokenSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    store: Arc<dyn KeyValueStore>,
}

impl TokenManager {
    pub fn new(settings: TokenSettings, store: Arc<dyn KeyValueStore>) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
        Self {
            settings,
            encoding_key,
            decoding_key,
            store,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Sign an access token for `claims`, valid from `now` for the configured
    /// lifetime.
    pub fn issue_access_token(
        &self,
        claims: &ClaimSet,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let wire = WireClaims {
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            sub: claims.subject().to_string(),
            nbf: now.timestamp(),
            exp: now.timestamp() + self.settings.access_token_lifetime.as_secs() as i64,
            extra: claims.claims().clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    /// Full request-path validation: algorithm, signature, issuer, audience
    /// and the validity window (with clock-skew leeway) against `now`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError> {
        let wire = self.decode(token)?;

        if wire.iss != self.settings.issuer {
            return Err(TokenError::IssuerMismatch);
        }
        if wire.aud != self.settings.audience {
            return Err(TokenError::AudienceMismatch);
        }

        let skew = self.settings.clock_skew.as_secs() as i64;
        if now.timestamp() + skew < wire.nbf {
            return Err(TokenError::NotYetValid);
        }
        if now.timestamp() - skew >= wire.exp {
            return Err(TokenError::Expired);
        }

        wire.into_claim_set()
    }

    /// Renewal-path validation: algorithm and signature only.
    ///
    /// Expiry, not-before, issuer and audience are deliberately not checked:
    /// the point of this path is to accept a recently-expired token so its
    /// subject can be re-issued a fresh one. Whether the session is still
    /// active is a separate question answered by the refresh-token lookup.
    pub fn validate_for_renewal(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.decode(token)?.into_claim_set()
    }

    /// Generate, store and return a fresh refresh token for `user_id`.
    ///
    /// Unconditionally replaces any previously stored value: one active
    /// refresh token per user, last writer wins.
    pub async fn issue_refresh_token(&self, user_id: UserId) -> Result<String, StoreError> {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let token = BASE64.encode(bytes);

        self.store
            .put(
                &refresh_token_key(user_id),
                &token,
                self.settings.refresh_token_ttl(),
            )
            .await?;

        debug!(user_id = %user_id, "refresh token issued");
        Ok(token)
    }

    /// The currently stored refresh token for `user_id`, if any.
    pub async fn active_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, StoreError> {
        self.store.get(&refresh_token_key(user_id)).await
    }

    /// Drop the stored refresh token for `user_id`. Idempotent.
    pub async fn revoke_refresh_token(&self, user_id: UserId) -> Result<(), StoreError> {
        self.store.delete(&refresh_token_key(user_id)).await?;
        debug!(user_id = %user_id, "refresh token revoked");
        Ok(())
    }

    fn decode(&self, token: &str) -> Result<WireClaims, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(TokenError::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::AlgorithmMismatch { found: header.alg });
        }

        // Time-window and audience checks are done explicitly against the
        // caller's clock, so the library is asked for nothing but the
        // signature here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                if matches!(e.kind(), ErrorKind::InvalidSignature) {
                    TokenError::BadSignature
                } else if matches!(e.kind(), ErrorKind::InvalidAlgorithm) {
                    TokenError::AlgorithmMismatch { found: header.alg }
                } else {
                    TokenError::Malformed(e)
                }
            })?;

        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
