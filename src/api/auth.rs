// =============================================================================
// Admin Authentication — bearer token for control endpoints
// =============================================================================
//
// Read endpoints are public; anything that changes service behaviour
// (manual refresh, threshold changes) takes an `AdminAuth` extractor. The
// expected token comes from `HOLDER_RADAR_ADMIN_TOKEN` and is re-read on
// every request, so rotating it needs no restart. An unset token disables
// control endpoints entirely.
// =============================================================================

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Environment variable holding the admin bearer token.
pub const ADMIN_TOKEN_ENV: &str = "HOLDER_RADAR_ADMIN_TOKEN";

/// Byte-wise comparison whose duration does not depend on where the first
/// mismatch is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The token part of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Why a control request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    NotConfigured,
    MissingToken,
    InvalidToken,
}

impl AuthError {
    fn message(self) -> &'static str {
        match self {
            Self::NotConfigured => "Server authentication not configured",
            Self::MissingToken => "Missing or malformed authorization header",
            Self::InvalidToken => "Invalid authorization token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message() });
        (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
    }
}

/// Validate `headers` against `expected`.
fn check(headers: &HeaderMap, expected: &str) -> Result<(), AuthError> {
    if expected.is_empty() {
        return Err(AuthError::NotConfigured);
    }
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}

/// Extractor guarding control endpoints.
pub struct AdminAuth;

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let expected = std::env::var(ADMIN_TOKEN_ENV).unwrap_or_default();
        check(&parts.headers, &expected)
            .map(|_| AdminAuth)
            .map_err(|e| {
                warn!(reason = e.message(), "control request rejected");
                e
            })
    }
}
