//! Per-request failures and their HTTP mapping.
//!
//! Errors never propagate past the request that produced them: each variant
//! becomes a plain-text response. Token extraction problems are not errors
//! at this level; see `response::TokenError`.

use std::time::Duration;

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream URI could not be built from the target and inbound path.
    #[error("failed to build upstream URI: {0}")]
    RequestBuild(#[from] axum::http::uri::InvalidUri),

    /// A header destined for the upstream could not be encoded.
    #[error("failed to encode header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// Connection refused, DNS failure, reset, malformed upstream response.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RequestBuild(_) | ProxyError::InvalidHeader(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream(_) | ProxyError::UpstreamTimeout(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::BAD_GATEWAY {
            "Failed to reach backend"
        } else {
            "Failed to create request"
        };
        (status, message).into_response()
    }
}
