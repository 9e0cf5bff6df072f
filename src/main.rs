//! cookie-bearer
//!
//! ```text
//!     Browser                       cookie-bearer                        Upstream API
//!        │  Cookie: session=tok  ┌──────────────────┐  Authorization: Bearer tok  │
//!        ├──────────────────────▶│ resolve target   ├────────────────────────────▶│
//!        │                       │ cookie → bearer  │                             │
//!        │  Set-Cookie (login)   │ shape response   │  {"accessToken": "tok"}     │
//!        │◀──────────────────────┤ by request path  │◀────────────────────────────┤
//!        │                       └──────────────────┘                             │
//! ```

use clap::{CommandFactory, Parser};
use tokio::net::TcpListener;

use cookie_bearer::config::ProxyArgs;
use cookie_bearer::observability::logging;
use cookie_bearer::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ProxyArgs::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            let _ = ProxyArgs::command().print_help();
            std::process::exit(1);
        }
    };

    logging::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        bind_address = %config.listener.bind_address,
        target = %config.upstream.target,
        cookie = %config.cookie.name,
        "cookie-bearer starting"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        shutdown.trigger_on_signal().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
