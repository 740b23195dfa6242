//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic recovery)
//! - Expose `/metrics` when a Prometheus handle is supplied
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::yggdrasil::IdentityProvider;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn IdentityProvider>,
}

/// HTTP front-end for the multiplexer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server answering from `provider`.
    ///
    /// `/metrics` is only routed when `metrics` is `Some`.
    pub fn new(provider: Arc<dyn IdentityProvider>, metrics: Option<PrometheusHandle>) -> Self {
        let state = AppState { provider };
        let router = Self::build_router(state, metrics);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::index))
            .route(
                "/sessionserver/session/minecraft/hasJoined",
                get(handlers::has_joined),
            )
            .route("/api/profiles/minecraft", post(handlers::get_profiles));

        if let Some(handle) = metrics {
            router = router.route(
                "/metrics",
                get(move || {
                    let handle = handle.clone();
                    async move { handle.render() }
                }),
            );
        }

        // A panicking handler answers 500 instead of dropping the connection.
        router
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// The router, for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
