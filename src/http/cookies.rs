//! Auth cookie handling.
//!
//! The auth cookie is the only session state: it is read on every request
//! to produce a bearer header, set from login/refresh responses and expired
//! on logout. Nothing is stored server side.

use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::{Duration, OffsetDateTime};
use cookie::Cookie;

use crate::config::CookieConfig;

/// Find the value of cookie `name` in the request's `Cookie` headers.
///
/// The first occurrence wins. A value wrapped in double quotes is unquoted.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw).filter_map(Result::ok))
        .find(|cookie| cookie.name() == name)
        .map(|cookie| unquote(cookie.value()).to_string())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Build the cookie that carries `token` to the client.
///
/// The token is passed through [`sanitize_value`] first.
pub fn session_cookie(config: &CookieConfig, token: &str) -> Cookie<'static> {
    let mut cookie = base_cookie(config, sanitize_value(token));
    match config.max_age_secs {
        0 => {}
        secs if secs < 0 => cookie.set_max_age(Duration::ZERO),
        secs => cookie.set_max_age(Duration::seconds(secs)),
    }
    cookie
}

/// Build the cookie that instructs the client to drop the auth cookie.
pub fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.set_max_age(Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}

/// Make `value` safe to place in a `Set-Cookie` header.
///
/// Bytes outside printable ASCII and `"`, `;`, `\` are dropped. A value
/// containing a space or comma is wrapped in double quotes.
pub fn sanitize_value(value: &str) -> String {
    let kept: String = value.chars().filter(|c| is_cookie_value_char(*c)).collect();
    if kept.len() != value.len() {
        tracing::warn!(dropped = value.len() - kept.len(), "Dropped invalid bytes from cookie value");
    }

    if kept.contains([' ', ',']) {
        format!("\"{kept}\"")
    } else {
        kept
    }
}

fn is_cookie_value_char(c: char) -> bool {
    matches!(c, ' '..='~') && !matches!(c, '"' | ';' | '\\')
}

fn base_cookie(config: &CookieConfig, value: String) -> Cookie<'static> {
    Cookie::build((config.name.clone(), value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(cookie::SameSite::from(config.same_site))
        .build()
}

/// Render a cookie as a `Set-Cookie` header value.
///
/// Fails when the value contains bytes a header cannot carry.
pub fn set_cookie_value(cookie: &Cookie<'_>) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SameSitePolicy;

    fn config() -> CookieConfig {
        CookieConfig::new("session")
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc123"));
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_across_headers_first_wins() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("session=\"quoted\"; session=second"));
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some("quoted"));
    }

    #[test]
    fn test_read_empty_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(read_cookie(&headers, "session").as_deref(), Some(""));
    }

    #[test]
    fn test_session_cookie_defaults() {
        let rendered = session_cookie(&config(), "tok123").to_string();
        assert!(rendered.starts_with("session=tok123"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Path=/"));
        assert!(!rendered.contains("Secure"));
        assert!(!rendered.contains("Max-Age"));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut cfg = config();
        cfg.secure = true;
        cfg.max_age_secs = 3600;
        cfg.same_site = SameSitePolicy::Lax;

        let rendered = session_cookie(&cfg, "tok").to_string();
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=3600"));
        assert!(rendered.contains("SameSite=Lax"));
    }

    #[test]
    fn test_negative_max_age_expires_immediately() {
        let mut cfg = config();
        cfg.max_age_secs = -5;
        assert!(session_cookie(&cfg, "tok").to_string().contains("Max-Age=0"));
    }

    #[test]
    fn test_same_site_none_keeps_configured_secure_flag() {
        let mut cfg = config();
        cfg.same_site = SameSitePolicy::None;
        let rendered = session_cookie(&cfg, "tok").to_string();
        assert!(rendered.contains("SameSite=None"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_removal_cookie() {
        let rendered = removal_cookie(&config()).to_string();
        assert!(rendered.starts_with("session=;"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Path=/"));
    }

    #[test]
    fn test_sanitize_value() {
        assert_eq!(sanitize_value("tok123"), "tok123");
        assert_eq!(sanitize_value("a b,c"), "\"a b,c\"");
        assert_eq!(sanitize_value("bad\nvalue"), "badvalue");
        assert_eq!(sanitize_value("q\"uo\\te"), "quote");
        assert_eq!(sanitize_value("tök"), "tk");
        assert_eq!(sanitize_value(""), "");
    }

    #[test]
    fn test_token_cannot_inject_attributes() {
        let cookie = session_cookie(&config(), "abc; Domain=evil.example; Path=/admin");
        let header = set_cookie_value(&cookie).unwrap();
        let rendered = header.to_str().unwrap();

        assert!(rendered.starts_with("session=\"abc Domain=evil.example Path=/admin\";"));
        assert!(!rendered.contains("; Domain="));
        assert_eq!(rendered.matches("; Path=").count(), 1);
    }
}
