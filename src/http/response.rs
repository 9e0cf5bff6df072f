//! Response handling and transformation.
//!
//! # Responsibilities
//! - Classify the inbound path (login/refresh, logout, everything else)
//! - Turn a JSON login/refresh response into a cookie with an empty body
//! - Expire the auth cookie on logout while streaming the upstream body
//! - Stream every other response through untouched
//!
//! # Design Decisions
//! - Classification happens once per request and picks exactly one policy
//! - Only the login/refresh branch buffers, bounded by `TokenConfig::max_response_bytes`
//! - Token extraction failures are soft: no cookie, same status, empty body

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE, TRAILER, TRANSFER_ENCODING};
use axum::http::{HeaderMap, Response};
use hyper::body::Incoming;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::config::{CookieConfig, InterceptPaths, TokenConfig};
use crate::http::cookies;

/// Response policy chosen for a request, keyed on the inbound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Login or refresh: harvest the token from a JSON body.
    LoginOrRefresh,
    /// Logout: proxy, then expire the cookie.
    Logout,
    /// Plain passthrough.
    Default,
}

/// Classify `path` by exact comparison against the intercept paths.
///
/// The path is percent-decoded first. Login and refresh are checked before
/// logout.
pub fn classify(path: &str, paths: &InterceptPaths) -> PathClass {
    let path = percent_decode_str(path).decode_utf8_lossy();
    if path == paths.login.as_str() || path == paths.refresh.as_str() {
        PathClass::LoginOrRefresh
    } else if path == paths.logout.as_str() {
        PathClass::Logout
    } else {
        PathClass::Default
    }
}

/// True when the `Content-Type` media type, parameters ignored, is
/// `application/json`.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Why no token could be taken from a login/refresh response.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to read response body: {0}")]
    Body(#[from] axum::Error),

    #[error("failed to parse JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response body is empty")]
    Empty,

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("property '{0}' not found")]
    Missing(String),

    #[error("property '{0}' is not a string")]
    NotAString(String),
}

/// Pull the string value of `property` out of the first JSON value in `body`.
///
/// Bytes after the first JSON value are ignored.
pub fn extract_token(body: &[u8], property: &str) -> Result<String, TokenError> {
    let value = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .ok_or(TokenError::Empty)??;

    let object = match value {
        Value::Object(object) => object,
        Value::Null => return Err(TokenError::Missing(property.to_string())),
        _ => return Err(TokenError::NotAnObject),
    };

    match object.get(property) {
        Some(Value::String(token)) => Ok(token.clone()),
        Some(_) => Err(TokenError::NotAString(property.to_string())),
        None => Err(TokenError::Missing(property.to_string())),
    }
}

/// Login/refresh policy.
///
/// The body is consumed and never forwarded. Upstream headers are kept
/// except the body framing ones (`Content-Length`, `Transfer-Encoding`,
/// `Trailer`); a `Set-Cookie` carrying the token is appended when one could
/// be extracted.
pub async fn shape_token_response(
    upstream: Response<Incoming>,
    cookie: &CookieConfig,
    token: &TokenConfig,
) -> Response<Body> {
    let (mut parts, body) = upstream.into_parts();

    let extracted = match axum::body::to_bytes(Body::new(body), token.max_response_bytes).await {
        Ok(bytes) => extract_token(&bytes, &token.property),
        Err(e) => Err(TokenError::Body(e)),
    };

    for framing in [CONTENT_LENGTH, TRANSFER_ENCODING, TRAILER] {
        parts.headers.remove(framing);
    }

    match extracted {
        Ok(value) => match cookies::set_cookie_value(&cookies::session_cookie(cookie, &value)) {
            Ok(header) => {
                parts.headers.append(SET_COOKIE, header);
                tracing::info!(property = %token.property, cookie = %cookie.name, "Extracted token into cookie");
            }
            Err(e) => {
                tracing::warn!(cookie = %cookie.name, error = %e, "Token cannot be carried in a cookie");
            }
        },
        Err(e) => {
            tracing::warn!(property = %token.property, error = %e, "No token extracted");
        }
    }

    Response::from_parts(parts, Body::empty())
}

/// Logout policy: upstream response verbatim plus an expiring auth cookie.
pub fn shape_logout_response(upstream: Response<Incoming>, cookie: &CookieConfig) -> Response<Body> {
    let (mut parts, body) = upstream.into_parts();

    match cookies::set_cookie_value(&cookies::removal_cookie(cookie)) {
        Ok(header) => {
            parts.headers.append(SET_COOKIE, header);
            tracing::info!(cookie = %cookie.name, "Cleared cookie");
        }
        Err(e) => {
            tracing::error!(cookie = %cookie.name, error = %e, "Failed to encode removal cookie");
        }
    }

    Response::from_parts(parts, Body::new(body))
}

/// Passthrough policy: status, headers and streamed body unchanged.
pub fn passthrough(upstream: Response<Incoming>) -> Response<Body> {
    let (parts, body) = upstream.into_parts();
    Response::from_parts(parts, Body::new(body))
}
