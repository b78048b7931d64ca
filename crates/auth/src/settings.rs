use std::time::Duration;

/// Signing and lifetime configuration for session credentials.
///
/// Constructed once at startup and passed to [`crate::TokenManager`] by value;
/// multiple configurations can coexist (separate tenants, tests) because no
/// part of the crate reads process-global state.
#[derive(Clone)]
pub struct TokenSettings {
    /// `iss` claim written into every access token.
    pub issuer: String,

    /// `aud` claim written into every access token.
    pub audience: String,

    /// Symmetric HMAC-SHA-256 key material.
    pub secret: String,

    /// Validity window of an access token.
    pub access_token_lifetime: Duration,

    /// Tolerance for clock drift between issuer and validator.
    pub clock_skew: Duration,
}

impl TokenSettings {
    /// TTL of a stored refresh token: the access-token lifetime padded by the
    /// skew tolerance on both ends.
    pub fn refresh_token_ttl(&self) -> Duration {
        self.access_token_lifetime + self.clock_skew * 2
    }
}

// The secret never appears in logs or debug output.
impl core::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_ttl_pads_lifetime_with_double_skew() {
        let settings = TokenSettings {
            issuer: "test".into(),
            audience: "test".into(),
            secret: "secret".into(),
            access_token_lifetime: Duration::from_secs(1800),
            clock_skew: Duration::from_secs(300),
        };

        assert_eq!(settings.refresh_token_ttl(), Duration::from_secs(2400));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let settings = TokenSettings {
            issuer: "test".into(),
            audience: "test".into(),
            secret: "top-secret".into(),
            access_token_lifetime: Duration::from_secs(60),
            clock_skew: Duration::from_secs(5),
        };

        assert!(!format!("{settings:?}").contains("top-secret"));
    }
}
