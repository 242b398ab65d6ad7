use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::config::JwtConfig;

/// JWT payload. `sub` is the user id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
}

/// Signing and verification keys, built once from [`JwtConfig`] at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    pub fn sign(&self, user_id: i64) -> anyhow::Result<String> {
        self.sign_with_ttl(user_id, self.ttl)
    }

    fn sign_with_ttl(&self, user_id: i64, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry; returns the subject id.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    warn!(error = %e, "jwt rejected");
                    TokenError::Invalid
                }
            }
        })?;

        let user_id = data.claims.sub.parse::<i64>().map_err(|_| {
            warn!(sub = %data.claims.sub, "jwt subject is not a user id");
            TokenError::Invalid
        })?;
        debug!(user_id, "jwt verified");
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_returns_subject() {
        let keys = JwtKeys::from_config(&AppConfig::for_tests().jwt);
        let token = keys.sign(42).expect("sign");
        assert_eq!(keys.verify(&token), Ok(42));
    }

    #[test]
    fn flipped_signature_byte_is_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.sign(7).expect("sign");
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(keys.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn token_past_expiration_is_expired() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys
            .sign_with_ttl(7, Duration::minutes(-10))
            .expect("sign");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn out_of_range_expiry_is_an_error() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(keys.sign_with_ttl(7, Duration::MAX).is_err());
    }

    #[test]
    fn verify_rejects_other_secret_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let token = good.sign(1).expect("sign");

        assert_eq!(
            make_keys("other-secret", "good-iss", "good-aud").verify(&token),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            make_keys("same-secret", "bad-iss", "good-aud").verify(&token),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            make_keys("same-secret", "good-iss", "bad-aud").verify(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn garbage_and_non_numeric_subject_are_invalid() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(keys.verify(""), Err(TokenError::Invalid));

        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: "alice".into(),
            iat: now,
            exp: now + 300,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert_eq!(keys.verify(&token), Err(TokenError::Invalid));
    }
}
