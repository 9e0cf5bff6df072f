//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router sending every method and request target to the translator
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown, then drain for a bounded period

use std::future::IntoFuture;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::translator::Translator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub translator: Translator,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            translator: Translator::new(config.clone()),
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving on a custom listener or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// After `shutdown` fires, no new connections are accepted and in-flight
    /// requests get `shutdown_grace_secs` to complete before they are dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target = %self.config.upstream.target,
            "HTTP server starting"
        );

        let mut deadline = shutdown.resubscribe();
        let grace = self.config.lifecycle.shutdown_grace();

        let serve = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = async {
                let _ = deadline.recv().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, abandoning in-flight requests");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler. Every request goes through the translator.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    state.translator.handle(request).await
}
