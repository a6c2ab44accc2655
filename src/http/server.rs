//! HTTP server setup (the dispatcher).
//!
//! # Responsibilities
//! - Create the Axum Router and wire up tracing
//! - Select a backend per request through the shared [`Balancer`]
//! - Forward the request and return the relayed response
//! - Stop accepting on shutdown and let in-flight requests finish
//!
//! Requests are served concurrently. The only state shared between them is
//! owned by the balancer, which synchronizes it.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::health::LoadPoller;
use crate::http::forward::{path_and_query, Forwarder};
use crate::lifecycle::shutdown;
use crate::load_balancer::{Balancer, BackendRegistry};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub balancer: Arc<Balancer>,
    pub forwarder: Forwarder,
}

/// The gateway's HTTP server.
pub struct HttpServer {
    router: Router,
    balancer: Arc<Balancer>,
}

impl HttpServer {
    /// Create the server for `registry` with the given configuration.
    pub fn new(config: &GatewayConfig, registry: BackendRegistry) -> Result<Self, reqwest::Error> {
        let poller = LoadPoller::new(&config.load_poll)?;
        let balancer = Arc::new(Balancer::new(Arc::new(registry), &config.balancing, Some(poller)));
        let forwarder = Forwarder::new(&config.forward)?;

        let state = AppState {
            balancer: balancer.clone(),
            forwarder,
        };

        Ok(Self {
            router: Self::build_router(state),
            balancer,
        })
    }

    /// GET only. HEAD needs its own handler or axum routes it to the GET
    /// handler; other methods get axum's 405.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", get(dispatch_handler).head(method_not_allowed))
            .route("/", get(dispatch_handler).head(method_not_allowed))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Load balancer is listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Load balancer has been shut down");
        Ok(())
    }

    pub fn balancer(&self) -> &Arc<Balancer> {
        &self.balancer
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")])
}

/// Select a backend, forward, relay.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let backend = state.balancer.select().await;

    tracing::info!(
        path = %path_and_query(request.uri()),
        backend = %backend.url(),
        "Forwarding request"
    );

    let response = state.forwarder.forward(backend, request).await;
    metrics::record_request(response.status().as_u16(), backend.url(), start);
    response
}
