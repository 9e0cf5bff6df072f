//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! A `ProxyConfig` is built once at startup (see `cli.rs`) and shared
//! read-only behind an `Arc` for the lifetime of the process.

use std::time::Duration;

use clap::ValueEnum;
use url::Url;

/// Root configuration for the cookie-to-bearer proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin.
    pub upstream: UpstreamConfig,

    /// Auth cookie name and attributes.
    pub cookie: CookieConfig,

    /// Token extraction from login/refresh responses.
    pub token: TokenConfig,

    /// Paths intercepted for cookie handling.
    pub paths: InterceptPaths,

    /// Shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Create a configuration for `target` and `cookie_name` with every
    /// optional setting at its default.
    pub fn new(target: Url, cookie_name: impl Into<String>) -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig {
                target,
                timeout_secs: None,
            },
            cookie: CookieConfig::new(cookie_name),
            token: TokenConfig::default(),
            paths: InterceptPaths::default(),
            lifecycle: LifecycleConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Upstream server configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Origin every request is re-targeted to. Only scheme and authority
    /// are used; path and query come from the inbound request.
    pub target: Url,

    /// Optional deadline for the upstream exchange. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// SameSite policy for the auth cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SameSitePolicy {
    #[default]
    Strict,
    Lax,
    None,
}

impl From<SameSitePolicy> for cookie::SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => cookie::SameSite::Strict,
            SameSitePolicy::Lax => cookie::SameSite::Lax,
            SameSitePolicy::None => cookie::SameSite::None,
        }
    }
}

/// Auth cookie configuration.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name read on requests and written on login/refresh/logout.
    pub name: String,

    /// Emit the `Secure` attribute.
    pub secure: bool,

    /// Max-Age in seconds. 0 produces a session cookie; negative values
    /// produce `Max-Age=0`.
    pub max_age_secs: i64,

    /// SameSite attribute.
    pub same_site: SameSitePolicy,
}

impl CookieConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: false,
            max_age_secs: 0,
            same_site: SameSitePolicy::default(),
        }
    }
}

/// Token extraction configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Top-level JSON property holding the access token.
    pub property: String,

    /// Upper bound on a login/refresh body buffered for parsing.
    pub max_response_bytes: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            property: "accessToken".to_string(),
            max_response_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Request paths that trigger cookie handling. Compared by exact equality.
#[derive(Debug, Clone)]
pub struct InterceptPaths {
    pub login: String,
    pub logout: String,
    pub refresh: String,
}

impl Default for InterceptPaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            logout: "/logout".to_string(),
            refresh: "/refresh-token".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Seconds in-flight requests get to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl LifecycleConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human-readable text or JSON lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}
