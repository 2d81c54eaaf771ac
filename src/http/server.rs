//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all edge handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Hand every request to the failover dispatcher
//! - Forward dispatched requests to the chosen upstream
//! - Start the admin API when enabled
//! - Stop on the shutdown broadcast

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::FailoverConfig;
use crate::health::HealthCheckSource;
use crate::http::request::EdgeRequest;
use crate::observability::metrics;
use crate::routing::{Dispatch, FailoverDispatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<FailoverDispatcher>,
    pub client: Client<HttpConnector, Body>,
    pub config: Arc<FailoverConfig>,
}

/// HTTP server for the failover router.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server querying health through `source`.
    pub fn new(config: FailoverConfig, source: Arc<dyn HealthCheckSource>) -> Self {
        let dispatcher = Arc::new(FailoverDispatcher::from_config(&config, source));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            dispatcher,
            client,
            config: Arc::new(config),
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);
        let max_body_size = state.config.listener.max_body_size;

        Router::new()
            .route("/", any(edge_handler))
            .route("/{*path}", any(edge_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(max_body_size))
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// Run the server until the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            primary = %self.state.dispatcher.primary().host,
            secondary = %self.state.dispatcher.secondary().host,
            "HTTP server starting"
        );

        if self.state.config.admin.enabled {
            spawn_admin(self.state.clone(), shutdown.resubscribe());
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

fn spawn_admin(state: AppState, mut shutdown: broadcast::Receiver<()>) {
    let bind_address = state.config.admin.bind_address.clone();
    let router = admin::setup_admin_router(state);

    tokio::spawn(async move {
        let listener = match TcpListener::bind(&bind_address).await {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(address = %bind_address, error = %e, "Failed to bind admin listener");
                return;
            }
        };
        tracing::info!(address = %bind_address, "Admin API listening");

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Admin API stopped with error");
        }
    });
}

/// Main edge handler.
/// Buffers the body, asks the dispatcher where the request goes, and acts on it.
async fn edge_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.config.listener.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_length_limit(&e) => {
            tracing::warn!(limit = state.config.listener.max_body_size, "Request body too large");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let request = EdgeRequest::from_parts(parts, body);
    tracing::debug!(
        request_id = %request.request_id,
        method = %request.method,
        path = %request.uri.path(),
        "Dispatching request"
    );

    match state.dispatcher.dispatch(request).await {
        Dispatch::Forward(request) => forward(&state, request).await,
        Dispatch::Respond(response) => response.into_response(),
    }
}

/// Bodies without a Content-Length only hit the limit while streaming, and the
/// limit error arrives wrapped in one or more `axum::Error` layers.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

async fn forward(state: &AppState, request: EdgeRequest) -> Response {
    let request_id = request.request_id.clone();
    let host = request.host().unwrap_or_default().to_string();

    let upstream = match request.into_upstream() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(request_id = %request_id, host = %host, error = %e, "Cannot build upstream request");
            metrics::record_upstream_error(host);
            return (StatusCode::BAD_GATEWAY, "Invalid upstream request").into_response();
        }
    };

    match state.client.request(upstream).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, host = %host, error = %e, "Upstream error");
            metrics::record_upstream_error(host);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
