//! Request handling and transformation.
//!
//! # Responsibilities
//! - Resolve the inbound path and query against the configured target
//! - Build the outbound request (method, headers, streamed body)
//! - Promote the auth cookie to an `Authorization: Bearer` header
//!
//! # Design Decisions
//! - Scheme and authority always come from the target; the inbound ones are discarded
//! - The body is handed over as-is, never buffered
//! - The inbound `Host` header is dropped so the client derives it from the target

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, HOST};
use axum::http::{HeaderValue, Request, Uri};
use url::Url;

use crate::config::ProxyConfig;
use crate::http::cookies;
use crate::http::error::ProxyError;

/// Resolve `inbound`'s path and query against `target`.
///
/// The target contributes scheme and authority only. Dot segments in the
/// inbound path are removed; the query is kept verbatim.
pub fn resolve_upstream_uri(target: &Url, inbound: &Uri) -> Result<Uri, ProxyError> {
    let mut resolved = target.origin().ascii_serialization();
    resolved.push_str(&remove_dot_segments(inbound.path()));
    if let Some(query) = inbound.query() {
        resolved.push('?');
        resolved.push_str(query);
    }
    Ok(resolved.parse::<Uri>()?)
}

/// Collapse `.` and `..` segments of a path, rooting it at `/`.
///
/// A trailing `.` or `..` leaves a trailing slash, and `..` never climbs
/// above the root. A relative path such as the asterisk form `*` is
/// treated as relative to the root.
fn remove_dot_segments(path: &str) -> String {
    let rest = path.strip_prefix('/').unwrap_or(path);

    let segments: Vec<&str> = rest.split('/').collect();
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in &segments {
        match *segment {
            "." => {}
            ".." => {
                output.pop();
            }
            other => output.push(other),
        }
    }

    let mut normalized = String::with_capacity(path.len());
    normalized.push('/');
    normalized.push_str(&output.join("/"));
    if matches!(segments.last(), Some(&".") | Some(&"..")) && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Build the request sent upstream from the inbound request.
///
/// Returns the outbound request and whether a bearer token was injected.
pub fn build_outbound(
    request: Request<Body>,
    config: &ProxyConfig,
) -> Result<(Request<Body>, bool), ProxyError> {
    let (parts, body) = request.into_parts();
    let uri = resolve_upstream_uri(&config.upstream.target, &parts.uri)?;

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = parts.headers;
    outbound.headers_mut().remove(HOST);

    let injected = inject_bearer(&mut outbound, &config.cookie.name)?;
    Ok((outbound, injected))
}

/// Set `Authorization: Bearer <cookie>` when the auth cookie holds a value.
///
/// An existing `Authorization` header is overwritten. Returns whether the
/// header was set.
pub fn inject_bearer(request: &mut Request<Body>, cookie_name: &str) -> Result<bool, ProxyError> {
    let token = match cookies::read_cookie(request.headers(), cookie_name) {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(false),
    };

    let value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::http::Method;

    fn config() -> ProxyConfig {
        ProxyConfig::new(Url::parse("http://backend.internal:3000/ignored?x=1").unwrap(), "session")
    }

    fn resolve(path: &str) -> String {
        let target = Url::parse("http://backend.internal:3000/base/").unwrap();
        resolve_upstream_uri(&target, &path.parse().unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_resolve_keeps_path_and_query() {
        assert_eq!(resolve("/api/users?page=2&q=a%20b"), "http://backend.internal:3000/api/users?page=2&q=a%20b");
        assert_eq!(resolve("/"), "http://backend.internal:3000/");
    }

    #[test]
    fn test_resolve_asterisk_form() {
        assert_eq!(resolve("*"), "http://backend.internal:3000/*");
    }

    #[test]
    fn test_resolve_discards_inbound_authority() {
        assert_eq!(resolve("http://evil.example/login"), "http://backend.internal:3000/login");
    }

    #[test]
    fn test_resolve_default_port_is_omitted() {
        let target = Url::parse("http://backend.internal:80").unwrap();
        let uri = resolve_upstream_uri(&target, &"/x".parse().unwrap()).unwrap();
        assert_eq!(uri.to_string(), "http://backend.internal/x");
    }

    #[test]
    fn test_remove_dot_segments() {
        assert_eq!(remove_dot_segments("/a/./b/../c"), "/a/c");
        assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
        assert_eq!(remove_dot_segments("/a/b/."), "/a/b/");
        assert_eq!(remove_dot_segments("/../../etc"), "/etc");
        assert_eq!(remove_dot_segments("/.."), "/");
        assert_eq!(remove_dot_segments("/a/"), "/a/");
        assert_eq!(remove_dot_segments("*"), "/*");
        assert_eq!(remove_dot_segments(""), "/");
    }

    #[test]
    fn test_build_outbound_copies_request() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/items/7?full=true")
            .header(HOST, "proxy.local:8080")
            .header("x-custom", "kept")
            .body(Body::from("payload"))
            .unwrap();

        let (outbound, injected) = build_outbound(request, &config()).unwrap();
        assert!(!injected);
        assert_eq!(outbound.method(), Method::PUT);
        assert_eq!(outbound.uri(), "http://backend.internal:3000/items/7?full=true");
        assert_eq!(outbound.headers()["x-custom"], "kept");
        assert!(outbound.headers().get(HOST).is_none());
        assert!(outbound.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_cookie_becomes_bearer_header() {
        let request = Request::builder()
            .uri("/me")
            .header(COOKIE, "session=tok123")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let (outbound, injected) = build_outbound(request, &config()).unwrap();
        assert!(injected);
        assert_eq!(outbound.headers().get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(outbound.headers()[AUTHORIZATION], "Bearer tok123");
        assert_eq!(outbound.headers()[COOKIE], "session=tok123");
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let request = Request::builder()
            .uri("/me")
            .header(COOKIE, "session=")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let (outbound, injected) = build_outbound(request, &config()).unwrap();
        assert!(!injected);
        assert_eq!(outbound.headers()[AUTHORIZATION], "Basic dXNlcjpwYXNz");
    }
}
