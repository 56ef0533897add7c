//! HTTP API
//!
//! REST adapter over `NodeService`. Handlers only translate between JSON and service
//! calls; write serialisation and every hierarchy rule live in the service.
//!
//! # Usage
//!
//! ```bash
//! NETGRAPH_STORE_BACKEND=memory cargo run --bin netgraph-server
//! ```

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::NodeService;

mod http_error;
mod network_endpoints;

pub use http_error::HttpError;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub node_service: Arc<NodeService>,
}

/// Create the application router with request tracing
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(network_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
///
/// # Arguments
///
/// * `node_service` - Service every endpoint delegates to
/// * `port` - Port to listen on (typically 3001)
///
/// # Errors
///
/// Returns error if the server fails to bind or stops abnormally.
pub async fn start_server(node_service: Arc<NodeService>, port: u16) -> std::io::Result<()> {
    let app = create_router(AppState { node_service });

    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("NetGraph server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
