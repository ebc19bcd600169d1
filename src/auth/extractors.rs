use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use time::OffsetDateTime;
use tracing::warn;

use crate::auth::jwt::{Claims, JwtKeys};
use crate::error::ApiError;
use crate::http::AUTH_TOKEN_HEADER;

/// Raw `X-Auth-Token` value, if any. Never rejects, so that preflight and
/// configuration checks run before authentication.
pub struct AuthToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // HeaderMap lookups ignore case.
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Ok(AuthToken(token))
    }
}

impl AuthToken {
    pub fn verify(&self, keys: &JwtKeys, now: OffsetDateTime) -> Result<Claims, ApiError> {
        let token = self.0.as_deref().ok_or_else(|| {
            warn!("missing X-Auth-Token header");
            ApiError::AuthenticationRequired
        })?;
        keys.verify_token(token, now).map_err(|e| {
            warn!(error = %e, "rejected X-Auth-Token");
            ApiError::from(e)
        })
    }
}
