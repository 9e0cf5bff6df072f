//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → translator.rs (one flow per request)
//!         → request.rs (resolve target, copy headers, cookie → bearer)
//!         → upstream client (single attempt)
//!         → response.rs (classify path, shape response)
//!             → cookies.rs (set / clear the auth cookie)
//!     → Send to client
//! ```

pub mod cookies;
pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod translator;

pub use error::ProxyError;
pub use response::PathClass;
pub use server::HttpServer;
pub use translator::Translator;
