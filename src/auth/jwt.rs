use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{auth::repo_types::User, config::JwtConfig, state::AppState};

/// Seconds of clock skew tolerated on `exp`.
const LEEWAY_SECS: u64 = 5;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Identity assertions embedded next to the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str, identity: &Identity, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(sub = %subject, "jwt signed");
        Ok(token)
    }

    /// Signs a token for `user` with the configured lifetime.
    pub fn issue_for(&self, user: &User) -> anyhow::Result<String> {
        let identity = Identity {
            email: user.email.clone(),
            role: user.role.clone(),
        };
        self.issue(&user.id.to_string(), &identity, self.ttl)
    }

    /// Signature first, then expiry, issuer and audience. Claims are only
    /// handed out once every check has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    debug!(error = %e, "jwt rejected");
                    TokenError::Invalid
                }
            }
        })?;
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60,
        })
    }

    fn identity() -> Identity {
        Identity {
            email: "client@example.com".into(),
            role: "client".into(),
        }
    }

    #[test]
    fn issue_and_verify() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.issue("42", &identity(), Duration::hours(1)).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "client@example.com");
        assert_eq!(claims.role, "client");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_is_compact_and_url_safe() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue("1", &identity(), Duration::minutes(5)).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue("7", &identity(), Duration::hours(-1)).unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn other_secret_is_invalid() {
        let good = make_keys("secret-one", "iss", "aud");
        let bad = make_keys("secret-two", "iss", "aud");
        let token = good.issue("7", &identity(), Duration::hours(1)).unwrap();
        assert_eq!(bad.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_and_forged_is_invalid_not_expired() {
        let good = make_keys("secret-one", "iss", "aud");
        let bad = make_keys("secret-two", "iss", "aud");
        let token = good.issue("7", &identity(), Duration::hours(-1)).unwrap();
        assert_eq!(bad.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn single_mutated_character_is_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue("7", &identity(), Duration::hours(1)).unwrap();
        let payload_start = token.find('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        let i = payload_start + 4;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(keys.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.verify(""), Err(TokenError::Invalid));
        assert_eq!(keys.verify("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn wrong_issuer_or_audience_is_invalid() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue("7", &identity(), Duration::hours(1)).unwrap();
        assert_eq!(bad.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn issue_for_uses_user_fields() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let user = User {
            id: 99,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            role: "lawyer".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let claims = keys.verify(&keys.issue_for(&user).unwrap()).unwrap();
        assert_eq!(claims.sub, "99");
        assert_eq!(claims.role, "lawyer");
        assert_eq!(claims.exp - claims.iat, keys.default_ttl().whole_seconds());
    }
}
