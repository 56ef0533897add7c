//! End-to-end tree lifecycle over the JSON file store
//!
//! Each test opens its own store inside a temp directory and reopens it to check
//! that what the service wrote is what a fresh process would see.

use anyhow::Result;
use netgraph_core::{JsonFileStore, Node, NodeService, NodeStore, NodeType};
use std::sync::Arc;
use tempfile::TempDir;

async fn open_service(dir: &TempDir) -> Result<(NodeService, Arc<JsonFileStore>)> {
    let store = Arc::new(JsonFileStore::open(dir.path().join("nodes.json")).await?);
    Ok((NodeService::new(store.clone()), store))
}

#[tokio::test]
async fn test_network_lifecycle() -> Result<()> {
    let dir = TempDir::new()?;
    let (service, store) = open_service(&dir).await?;

    // Create n1 { NETWORK, [c1 { NODE }] }
    let network = Node::new("n1", NodeType::Network, "Office")
        .with_child(Node::new("c1", NodeType::Node, "Router"));
    let report = service.create_network(network).await?;
    assert_eq!(report.created, vec!["c1", "n1"]);
    assert!(store.get_node("n1").await?.is_some());
    assert!(store.get_node("c1").await?.is_some());

    assert!(service.validate_network("n1").await?);

    // c1 is a NODE, so it accepts RESOURCE children
    let report = service
        .add_children("c1", vec![Node::new("r1", NodeType::Resource, "Disk")])
        .await?;
    assert_eq!(report.created, vec!["r1"]);
    assert!(service.validate_network("n1").await?);

    // RESOURCE is terminal
    let err = service
        .add_children("r1", vec![Node::new("x1", NodeType::Network, "Nested")])
        .await
        .unwrap_err();
    assert!(err.is_structural_misuse());

    // c1 is not a network, nothing is deleted
    let err = service.delete_network("c1").await.unwrap_err();
    assert!(err.is_structural_misuse());
    assert!(store.get_node("c1").await?.is_some());

    let report = service.delete_network("n1").await?;
    assert_eq!(report.deleted, vec!["r1", "c1", "n1"]);
    for id in ["n1", "c1", "r1", "x1"] {
        assert!(store.get_node(id).await?.is_none(), "{} should be gone", id);
    }
    Ok(())
}

#[tokio::test]
async fn test_tree_survives_reopen() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let (service, _store) = open_service(&dir).await?;
        let network = Node::new("n1", NodeType::Network, "Office").with_children([
            Node::new("c1", NodeType::Node, "Router")
                .with_param("ip", "10.0.0.1")
                .with_child(Node::new("r1", NodeType::Resource, "Disk")),
            Node::new("c2", NodeType::Node, "Switch").with_description("rack 2"),
        ]);
        service.create_network(network).await?;
        service.delete_node("r1").await?;
    }

    let (service, _store) = open_service(&dir).await?;
    let n1 = service
        .get_node("n1")
        .await?
        .ok_or_else(|| anyhow::anyhow!("n1 missing after reopen"))?;

    assert_eq!(n1.subtree_ids(), vec!["n1", "c1", "c2"]);
    assert_eq!(n1.children[0].params.get("ip").map(String::as_str), Some("10.0.0.1"));
    assert!(n1.children[0].children.is_empty());
    assert_eq!(n1.children[1].description.as_deref(), Some("rack 2"));
    assert!(service.validate_network("n1").await?);
    Ok(())
}

#[tokio::test]
async fn test_updates_are_persisted() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let (service, _store) = open_service(&dir).await?;
        service
            .create_network(
                Node::new("n1", NodeType::Network, "Office")
                    .with_child(Node::new("c1", NodeType::Node, "Router")),
            )
            .await?;

        let payload = Node::new("n1", NodeType::Network, "Head office")
            .with_child(Node::new("c1", NodeType::Node, "Core router"));
        let report = service.update_network("n1", &payload).await?;
        assert_eq!(report.updated, vec!["c1", "n1"]);
    }

    let (service, _store) = open_service(&dir).await?;
    let networks = service.get_networks().await?;
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0].name, "Head office");
    assert_eq!(networks[0].children[0].name, "Core router");
    Ok(())
}

#[tokio::test]
async fn test_shared_service_serialises_concurrent_writers() -> Result<()> {
    let dir = TempDir::new()?;
    let (service, store) = open_service(&dir).await?;
    service
        .create_network(Node::new("n1", NodeType::Network, "Office"))
        .await?;

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let child = Node::new(format!("c{}", i), NodeType::Node, format!("Device {}", i));
            service.add_children("n1", vec![child]).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    // Every append read the latest parent, so none was lost
    let n1 = store
        .get_node("n1")
        .await?
        .ok_or_else(|| anyhow::anyhow!("n1 missing"))?;
    assert_eq!(n1.child_ids.len(), 10);
    assert!(service.validate_network("n1").await?);
    Ok(())
}
