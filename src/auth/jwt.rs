use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo_types::{Role, User};
use crate::config::{JwtConfig, MAX_TOKEN_TTL_DAYS};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature checked out but the token is past `exp`.
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Who a token speaks for, taken from the live user record at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// JWT payload. Email and role are a snapshot from issuance time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    #[serde(rename = "exp")]
    pub expires_at: i64, // unix seconds
}

/// HS256 signing and verification keys built from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDuration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: TimeDuration::days(cfg.ttl_days.clamp(0, MAX_TOKEN_TTL_DAYS)),
        }
    }

    pub fn issue_token(&self, identity: &Identity, now: OffsetDateTime) -> anyhow::Result<String> {
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range"))?;
        let claims = Claims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            expires_at: expires_at.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = identity.user_id, role = identity.role.as_str(), "jwt signed");
        Ok(token)
    }

    /// Signature first, then payload shape, then expiry against `now`.
    pub fn verify_token(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|e| {
                debug!(error = %e, "jwt rejected");
                TokenError::Invalid
            })?
            .claims;

        if now.unix_timestamp() >= claims.expires_at {
            debug!(user_id = claims.user_id, "jwt expired");
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    // Expiry is compared against the caller's clock, not the library's.
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}
