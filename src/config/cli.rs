//! Command-line and environment configuration.
//!
//! Every flag has an equivalently named `CB_*` environment variable. Flags
//! take precedence over the environment, the environment over defaults.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use url::Url;

use crate::config::schema::{
    CookieConfig, InterceptPaths, LifecycleConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyConfig, SameSitePolicy, TokenConfig, UpstreamConfig,
};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid target URL '{url}': {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reverse proxy that keeps bearer tokens in HTTP-only cookies.
#[derive(Debug, Parser)]
#[command(name = "cookie-bearer", version, long_about = None)]
pub struct ProxyArgs {
    /// Target server URL to proxy requests to
    #[arg(long, env = "CB_TARGET")]
    pub target: String,

    /// Name of the cookie to read/write the token from/to
    #[arg(long, env = "CB_COOKIE_NAME")]
    pub cookie_name: String,

    /// Set Secure flag on cookie
    #[arg(long, env = "CB_COOKIE_SECURE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub cookie_secure: bool,

    /// Max-Age (in seconds) for the cookie; 0 = session cookie
    #[arg(long, env = "CB_COOKIE_MAX_AGE", default_value_t = 0, allow_negative_numbers = true)]
    pub cookie_max_age: i64,

    /// SameSite setting for the cookie
    #[arg(long, env = "CB_COOKIE_SAME_SITE", value_enum, ignore_case = true, default_value = "strict")]
    pub cookie_same_site: SameSitePolicy,

    /// JSON property to extract access token from login response
    #[arg(long, env = "CB_ACCESS_TOKEN_PROPERTY", default_value = "accessToken")]
    pub access_token_property: String,

    /// Path to intercept for login
    #[arg(long, env = "CB_LOGIN_PATH", default_value = "/login")]
    pub login_path: String,

    /// Path to intercept for logout
    #[arg(long, env = "CB_LOGOUT_PATH", default_value = "/logout")]
    pub logout_path: String,

    /// Path to intercept for token refresh requests
    #[arg(long, env = "CB_REFRESH_PATH", default_value = "/refresh-token")]
    pub refresh_path: String,

    /// Host address for the proxy server to listen on
    #[arg(long, env = "CB_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the proxy server to listen on
    #[arg(long, env = "CB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Deadline in seconds for each upstream exchange (default: none)
    #[arg(long, env = "CB_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Seconds in-flight requests get to finish after SIGINT/SIGTERM
    #[arg(long, env = "CB_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,

    /// Largest login/refresh response body buffered for token extraction
    #[arg(long, env = "CB_MAX_TOKEN_RESPONSE_BYTES", default_value_t = 1024 * 1024)]
    pub max_token_response_bytes: usize,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "CB_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "CB_LOG_FORMAT", value_enum, ignore_case = true, default_value = "text")]
    pub log_format: LogFormat,
}

impl ProxyArgs {
    /// Resolve the parsed arguments into a validated configuration.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let target = Url::parse(&self.target).map_err(|source| ConfigError::InvalidTarget {
            url: self.target.clone(),
            source,
        })?;

        let config = ProxyConfig {
            listener: ListenerConfig {
                bind_address: bind_address(&self.host, self.port),
            },
            upstream: UpstreamConfig {
                target,
                timeout_secs: self.upstream_timeout_secs,
            },
            cookie: CookieConfig {
                name: self.cookie_name,
                secure: self.cookie_secure,
                max_age_secs: self.cookie_max_age,
                same_site: self.cookie_same_site,
            },
            token: TokenConfig {
                property: self.access_token_property,
                max_response_bytes: self.max_token_response_bytes,
            },
            paths: InterceptPaths {
                login: self.login_path,
                logout: self.logout_path,
                refresh: self.refresh_path,
            },
            lifecycle: LifecycleConfig {
                shutdown_grace_secs: self.shutdown_grace_secs,
            },
            observability: ObservabilityConfig {
                log_level: self.log_level,
                log_format: self.log_format,
            },
        };

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// IPv6 literals need brackets before the port is appended.
fn bind_address(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
