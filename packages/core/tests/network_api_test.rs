//! HTTP API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, so no socket is
//! bound.

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use netgraph_core::api::{create_router, AppState};
use netgraph_core::{MemoryStore, NodeService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let service = NodeService::new(Arc::new(MemoryStore::new()));
    create_router(AppState {
        node_service: Arc::new(service),
    })
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => request.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

fn office_network() -> Value {
    json!({
        "id": "n1",
        "type": "NETWORK",
        "name": "Office",
        "children": [
            { "id": "c1", "type": "NODE", "name": "Router", "children": [] }
        ]
    })
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let router = test_router();
    let (status, body) = send(&router, Method::GET, "/api/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn test_create_and_read_network() -> Result<()> {
    let router = test_router();

    let (status, body) = send(&router, Method::POST, "/network", Some(office_network())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], json!(["c1", "n1"]));
    assert_eq!(body["conflicts"], json!([]));

    let (status, body) = send(&router, Method::GET, "/network/n1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "NETWORK");
    assert_eq!(body["children"][0]["id"], "c1");

    let (status, body) = send(&router, Method::GET, "/network", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(&router, Method::GET, "/network/n1/entries", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Router");
    Ok(())
}

#[tokio::test]
async fn test_create_existing_network_is_conflict() -> Result<()> {
    let router = test_router();
    send(&router, Method::POST, "/network", Some(office_network())).await?;

    let (status, body) = send(&router, Method::POST, "/network", Some(office_network())).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflicts"], json!(["n1"]));
    Ok(())
}

#[tokio::test]
async fn test_create_non_network_root_is_unprocessable() -> Result<()> {
    let router = test_router();
    let payload = json!({ "id": "c1", "type": "NODE", "name": "Router" });

    let (status, body) = send(&router, Method::POST, "/network", Some(payload)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "STRUCTURAL_MISUSE");
    Ok(())
}

#[tokio::test]
async fn test_create_with_blank_name_is_bad_request() -> Result<()> {
    let router = test_router();
    let payload = json!({ "id": "n1", "type": "NETWORK", "name": " " });

    let (status, body) = send(&router, Method::POST, "/network", Some(payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_missing_node_is_not_found() -> Result<()> {
    let router = test_router();

    for (method, uri) in [
        (Method::GET, "/network/missing"),
        (Method::GET, "/network/missing/entries"),
        (Method::GET, "/network/missing/verify"),
        (Method::DELETE, "/network/missing"),
        (Method::DELETE, "/network/missing/entry"),
    ] {
        let (status, body) = send(&router, method, uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["code"], "NODE_NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn test_add_node_update_entry_and_verify() -> Result<()> {
    let router = test_router();
    send(&router, Method::POST, "/network", Some(office_network())).await?;

    let children = json!([{ "id": "r1", "type": "RESOURCE", "name": "Disk" }]);
    let (status, body) = send(&router, Method::PUT, "/network/c1/add-node", Some(children)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], json!(["r1"]));

    let (status, body) = send(&router, Method::GET, "/network/n1/verify", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let replacement = json!({
        "id": "r1",
        "type": "RESOURCE",
        "name": "SSD",
        "params": { "size": "1TB" }
    });
    let (status, body) = send(&router, Method::PUT, "/network/r1/entry", Some(replacement)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "SSD");
    assert_eq!(body["params"]["size"], "1TB");

    let more = json!([{ "id": "x1", "type": "NETWORK", "name": "Nested" }]);
    let (status, body) = send(&router, Method::PUT, "/network/r1/add-node", Some(more)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "STRUCTURAL_MISUSE");
    Ok(())
}

#[tokio::test]
async fn test_update_network_reports_matches() -> Result<()> {
    let router = test_router();
    send(&router, Method::POST, "/network", Some(office_network())).await?;

    let payload = json!({
        "id": "n1",
        "type": "NETWORK",
        "name": "Head office",
        "children": [
            { "id": "c1", "type": "NODE", "name": "Core router" },
            { "id": "c9", "type": "NODE", "name": "Unknown" }
        ]
    });
    let (status, body) = send(&router, Method::PUT, "/network/n1", Some(payload)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(["c1", "n1"]));
    assert_eq!(body["unmatched"], json!(["c9"]));
    Ok(())
}

#[tokio::test]
async fn test_delete_routes() -> Result<()> {
    let router = test_router();
    send(&router, Method::POST, "/network", Some(office_network())).await?;

    let (status, body) = send(&router, Method::DELETE, "/network/c1", None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "STRUCTURAL_MISUSE");

    let (status, body) = send(&router, Method::DELETE, "/network/c1/entry", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!(["c1"]));
    assert_eq!(body["detachedFrom"], json!(["n1"]));

    let (status, body) = send(&router, Method::DELETE, "/network/n1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!(["n1"]));

    let (status, _) = send(&router, Method::GET, "/network/n1", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
