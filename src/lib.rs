//! Cookie-to-bearer reverse proxy library.
//!
//! Sits between a browser and a single upstream API. Tokens returned by the
//! upstream's login/refresh endpoints are moved into an HTTP-only cookie,
//! the cookie is turned back into an `Authorization: Bearer` header on every
//! request, and logout clears it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
