//! Observability subsystem.
//!
//! Structured logging through `tracing`. Every proxied request runs in a
//! span carrying a request id, method and path; the translator emits events
//! at each transition (received, forwarded, shaped, completed).

pub mod logging;
