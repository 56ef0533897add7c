//! Network Endpoints
//!
//! JSON routes over `NodeService`. Bodies use the nested `Node` shape.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint
//! - `POST /network` - Create a network with its subtree
//! - `GET /network` - List all networks
//! - `GET /network/:id` - Get a node with its subtree
//! - `GET /network/:id/entries` - Get child nodes
//! - `PUT /network/:id` - Update a whole subtree
//! - `DELETE /network/:id` - Delete a network
//! - `PUT /network/:id/add-node` - Append new children
//! - `PUT /network/:id/entry` - Update a single node
//! - `DELETE /network/:id/entry` - Delete a node and its subtree
//! - `GET /network/:id/verify` - Validate a subtree

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Serialize;

use crate::api::{AppState, HttpError};
use crate::models::Node;
use crate::services::{CreateReport, DeleteReport, UpdateReport};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a network
///
/// Answers `201 Created` when the root was stored and `409 Conflict` when the
/// root id already existed. Either way the body is the `CreateReport`, so skipped
/// descendants are visible to the caller.
///
/// ```bash
/// curl -X POST http://localhost:3001/network \
///   -H "Content-Type: application/json" \
///   -d '{"id": "n1", "type": "NETWORK", "name": "Office", "children": []}'
/// ```
async fn create_network(
    State(state): State<AppState>,
    Json(node): Json<Node>,
) -> Result<(StatusCode, Json<CreateReport>), HttpError> {
    let root_id = node.id.clone();
    let report = state.node_service.create_network(node).await?;

    let status = if report.conflicts.contains(&root_id) {
        StatusCode::CONFLICT
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(report)))
}

async fn get_networks(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.node_service.get_networks().await?))
}

/// Get a node by ID, with its whole subtree
async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    state
        .node_service
        .get_node(&id)
        .await?
        .map(Json)
        .ok_or_else(|| HttpError::new(format!("Node not found: {}", id), "NODE_NOT_FOUND"))
}

async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.node_service.get_children(&id).await?))
}

/// Update the subtree at `id` from a nested payload
///
/// Children are matched by id; the response lists which ids were updated,
/// unchanged or unmatched.
async fn update_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(node): Json<Node>,
) -> Result<Json<UpdateReport>, HttpError> {
    Ok(Json(state.node_service.update_network(&id, &node).await?))
}

async fn delete_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteReport>, HttpError> {
    Ok(Json(state.node_service.delete_network(&id).await?))
}

/// Append new children to the node at `id`
///
/// ```bash
/// curl -X PUT http://localhost:3001/network/c1/add-node \
///   -H "Content-Type: application/json" \
///   -d '[{"id": "r1", "type": "RESOURCE", "name": "Disk"}]'
/// ```
async fn add_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(children): Json<Vec<Node>>,
) -> Result<Json<CreateReport>, HttpError> {
    Ok(Json(state.node_service.add_children(&id, children).await?))
}

/// Update name, description, params and type of a single node
async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(node): Json<Node>,
) -> Result<Json<Node>, HttpError> {
    Ok(Json(state.node_service.update_node(&id, &node).await?))
}

async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteReport>, HttpError> {
    Ok(Json(state.node_service.delete_node(&id).await?))
}

async fn verify_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<bool>, HttpError> {
    Ok(Json(state.node_service.validate_network(&id).await?))
}

/// Create router with all network endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/network", get(get_networks).post(create_network))
        .route(
            "/network/:id",
            get(get_node).put(update_network).delete(delete_network),
        )
        .route("/network/:id/entries", get(get_children))
        .route("/network/:id/add-node", put(add_children))
        .route("/network/:id/entry", put(update_node).delete(delete_node))
        .route("/network/:id/verify", get(verify_network))
        .with_state(state)
}
