//! The request translator: one inbound request in, one shaped response out.
//!
//! ```text
//! Received → Resolved → Forwarded → {LoginShaped | LogoutShaped | Passthrough} → Completed
//! ```
//!
//! There is no state across requests; the only shared data is the
//! read-only configuration and the connection-pooling HTTP client.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::request::build_outbound;
use crate::http::response::{self, PathClass};

/// Forwards requests to the configured target and applies cookie policies.
#[derive(Clone)]
pub struct Translator {
    config: Arc<ProxyConfig>,
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl Translator {
    /// Build a translator whose client speaks plain HTTP and TLS (webpki roots).
    pub fn new(config: Arc<ProxyConfig>) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { config, client }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Handle one request. Failures become 500/502 responses here and
    /// never propagate further.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let span = tracing::info_span!(
            "proxy",
            request_id = %Uuid::new_v4(),
            method = %method,
            path = %path,
        );

        async move {
            tracing::debug!("Request received");

            let response = match self.translate(request, &path).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "Request failed");
                    e.into_response()
                }
            };

            tracing::info!(
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn translate(&self, request: Request<Body>, path: &str) -> Result<Response<Body>, ProxyError> {
        let class = response::classify(path, &self.config.paths);

        let (outbound, injected) = build_outbound(request, &self.config)?;
        if injected {
            tracing::debug!(cookie = %self.config.cookie.name, "Using cookie for bearer authentication");
        }
        tracing::debug!(upstream = %outbound.uri(), "Proxying request");

        let upstream = self.forward(outbound).await?;

        let shaped = match class {
            PathClass::LoginOrRefresh if response::is_json(upstream.headers()) => {
                response::shape_token_response(upstream, &self.config.cookie, &self.config.token).await
            }
            PathClass::Logout => response::shape_logout_response(upstream, &self.config.cookie),
            PathClass::LoginOrRefresh | PathClass::Default => response::passthrough(upstream),
        };
        Ok(shaped)
    }

    /// Single attempt, no retry. Optional deadline from `UpstreamConfig`.
    async fn forward(&self, outbound: Request<Body>) -> Result<Response<Incoming>, ProxyError> {
        let send = self.client.request(outbound);
        let result = match self.config.upstream.timeout() {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(limit))?,
            None => send.await,
        };
        Ok(result?)
    }
}
