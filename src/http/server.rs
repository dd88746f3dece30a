//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, security headers)
//! - Forward requests to the upstream application server
//! - Expose liveness and (optionally) debug endpoints
//! - Serve with graceful shutdown

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, Scheme},
    http::{Request, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{EdgeConfig, RuntimeEnv};
use crate::http::middleware::{security_headers_middleware, SecurityHeadersState};
use crate::http::request::{
    propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::security::{HeaderPolicy, SecurityHeaders};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<str>,
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new edge server from validated config and environment.
    pub fn new(config: EdgeConfig, env: &RuntimeEnv) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            client,
            upstream: Arc::from(config.upstream.address.as_str()),
        };

        let router = Self::build_router(&config, env, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EdgeConfig, env: &RuntimeEnv, state: AppState) -> Router {
        let policy = HeaderPolicy::new(
            config.security.exempt_path_prefixes.clone(),
            config.security.exempt_paths.clone(),
        );
        let security_state = SecurityHeadersState::new(
            SecurityHeaders::new(),
            policy,
            config.security.enable_headers,
        );

        let mut router = Router::new().route("/health", get(health_handler));

        // Synthetic error endpoint for verifying the reporting pipeline.
        // Never exposed in production.
        if config.debug.expose_error_route && !env.environment.is_production() {
            router = router.route("/api/debug/error", get(debug_error_handler));
        }

        router
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                security_state,
                security_headers_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "Edge server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Edge server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Liveness endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Simulates a backend error and reports it, so the error pipeline can be
/// verified end to end without breaking anything real.
async fn debug_error_handler() -> impl IntoResponse {
    tracing::error!(
        error = "Test error from edge debug endpoint",
        "Captured synthetic error"
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
}

/// Pass-through handler: rewrites the URI to the upstream authority and
/// forwards the request unchanged.
async fn forward_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> impl IntoResponse {
    let request_id = request_id(&request).to_string();
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Forwarding request"
    );

    let authority = match Authority::from_str(&state.upstream) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Invalid upstream authority");
            return (StatusCode::BAD_GATEWAY, "Upstream misconfigured").into_response();
        }
    };

    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(authority);
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(_) => parts.uri,
    };

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                path = %path,
                error = %e,
                "Upstream error"
            );
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
