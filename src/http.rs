//! Small request/response helpers shared by the two endpoints.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Request body cap for both endpoints. Uploads arrive base64-encoded inside
/// the JSON body, so this bounds a file at roughly 15MB.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024; // 20MB

const ALLOWED_HEADERS: &str = "Content-Type, X-Auth-Token";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// 200 with an empty body, whatever else the request carried.
pub fn preflight(allowed_methods: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, allowed_methods),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE),
        ],
        (),
    )
        .into_response()
}

/// An empty body reads as `{}`; anything that isn't the expected JSON shape
/// is a 400.
pub fn parse_json_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed JSON body");
        ApiError::validation("Invalid JSON body")
    })
}

/// Parses an optional numeric id from a query parameter.
pub fn parse_id(raw: Option<&String>, name: &str) -> Result<Option<i64>, ApiError> {
    match raw.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("{name} must be numeric"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Body {
        name: Option<String>,
    }

    #[test]
    fn empty_body_is_default() {
        let body: Body = parse_json_body(b"").unwrap();
        assert!(body.name.is_none());
        let body: Body = parse_json_body(b"  \n").unwrap();
        assert!(body.name.is_none());
    }

    #[test]
    fn malformed_body_is_validation_error() {
        let err = parse_json_body::<Body>(b"{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON body");
        assert!(parse_json_body::<Body>(b"42").is_err());
    }

    #[test]
    fn parse_id_cases() {
        assert_eq!(parse_id(None, "id").unwrap(), None);
        assert_eq!(parse_id(Some(&"".to_string()), "id").unwrap(), None);
        assert_eq!(parse_id(Some(&" 12 ".to_string()), "id").unwrap(), Some(12));
        let err = parse_id(Some(&"abc".to_string()), "user_id").unwrap_err();
        assert_eq!(err.to_string(), "user_id must be numeric");
    }

    #[test]
    fn preflight_has_empty_body_and_cors_headers() {
        let res = preflight("POST, OPTIONS");
        assert_eq!(res.status(), StatusCode::OK);
        let headers = res.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }
}
