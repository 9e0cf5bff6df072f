//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / CB_* environment variables
//!     → cli.rs (parse & resolve)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the request translator
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Every optional setting has a default; target and cookie name are required
//! - Validation separates syntactic (clap) from semantic checks

pub mod cli;
pub mod schema;
pub mod validation;

pub use cli::{ConfigError, ProxyArgs};
pub use schema::{
    CookieConfig, InterceptPaths, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig,
    SameSitePolicy, TokenConfig, UpstreamConfig,
};
