//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (clap handles syntactic)
//! - Check the upstream target is a usable HTTP origin
//! - Check cookie name, intercept paths and token property are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("target URL scheme must be http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("target URL has no host")]
    MissingHost,

    #[error("cookie name '{0}' is not a valid cookie token")]
    InvalidCookieName(String),

    #[error("{name} path '{path}' must start with '/'")]
    InvalidPath { name: &'static str, path: String },

    #[error("access token property must not be empty")]
    EmptyTokenProperty,

    #[error("max token response size must be greater than zero")]
    ZeroTokenResponseLimit,
}

/// Validate a fully resolved configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = &config.upstream.target;
    if !matches!(target.scheme(), "http" | "https") {
        errors.push(ValidationError::UnsupportedScheme(target.scheme().to_string()));
    }
    if target.host_str().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingHost);
    }

    if !is_cookie_token(&config.cookie.name) {
        errors.push(ValidationError::InvalidCookieName(config.cookie.name.clone()));
    }

    for (name, path) in [
        ("login", &config.paths.login),
        ("logout", &config.paths.logout),
        ("refresh", &config.paths.refresh),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                name,
                path: path.clone(),
            });
        }
    }

    if config.token.property.is_empty() {
        errors.push(ValidationError::EmptyTokenProperty);
    }
    if config.token.max_response_bytes == 0 {
        errors.push(ValidationError::ZeroTokenResponseLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 6265 cookie-name: a non-empty token with no CTLs or separators.
fn is_cookie_token(name: &str) -> bool {
    const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(&b))
}
