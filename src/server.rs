//! HTTP transport for the search aggregator.
//!
//! Exposes `GET /api/search?query=<string>` returning the result envelope
//! as JSON, and `GET /health`. A blank or missing query is the only
//! request-level error (400); source failures are reported inside the
//! envelope with a 200.

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use metastream_search::{SearchAggregator, SearchError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    aggregator: Arc<SearchAggregator>,
}

#[derive(Debug, serde::Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the router. Split out so tests can serve it on any listener.
pub fn router(aggregator: Arc<SearchAggregator>) -> Router {
    Router::new()
        .route("/api/search", get(handle_search))
        .route("/health", get(handle_health))
        .with_state(AppState { aggregator })
}

/// Running search server.
pub struct SearchServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl SearchServer {
    /// Bind `{host}:{port}` and serve in a background task.
    ///
    /// If the configured port cannot be bound, retries once on an
    /// ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Server`] if neither bind succeeds.
    pub async fn start(aggregator: Arc<SearchAggregator>, config: &ServerConfig) -> Result<Self> {
        let listener = bind_with_fallback(&config.host, config.port).await?;
        let addr = listener
            .local_addr()
            .map_err(|e| AppError::Server(format!("failed to get local addr: {e}")))?;

        let app = router(aggregator);
        tracing::info!("search server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("search server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for SearchServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn bind_with_fallback(host: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{host}:{port}");
    match TcpListener::bind(&addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if port != 0 => {
            tracing::warn!(%addr, error = %e, "bind failed, trying an ephemeral port");
            TcpListener::bind(format!("{host}:0"))
                .await
                .map_err(|e| AppError::Server(format!("bind failed on {host}:0: {e}")))
        }
        Err(e) => Err(AppError::Server(format!("bind failed on {addr}: {e}"))),
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.query.unwrap_or_default();
    match state.aggregator.search(&query).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(SearchError::InvalidQuery) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "missing or empty ?query=".to_owned(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
