//! Server-side relay between the pixelbooth web app and the remote
//! conversion service.
//!
//! The browser posts `{"image": ...}` to `<prefix>/detect` and
//! `<prefix>/convert`; each request is re-posted to the same route on
//! the upstream and the upstream's status and JSON body are returned
//! unchanged. Requests over the body limit are rejected with 413 before
//! anything is forwarded.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=info PIXELME_API_URL=https://pixelme.example cargo run -p pixelbooth-proxy
//! ```
use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upstream;

use config::Config;
use routes::{convert_handler, detect_handler};
use state::AppState;

/// Build the proxy router for `config`.
pub fn router(config: &Config) -> Router {
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let body_limit = config
        .body_limit()
        .map_or_else(DefaultBodyLimit::disable, DefaultBodyLimit::max);

    let api = Router::new()
        .route("/detect", post(detect_handler))
        .route("/convert", post(convert_handler));

    let prefix = config.prefix.trim_end_matches('/');
    let routes = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    routes
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, serve until ctrl-c or SIGTERM, then drain.
///
/// # Errors
///
/// Fails if the listener cannot bind or the server stops abnormally.
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let app = router(&config);

    let address = SocketAddr::new(config.host, config.port);
    info!(%address, upstream = %config.upstream, limit = ?config.body_limit(), "binding");

    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
