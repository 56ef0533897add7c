//! NetGraph HTTP Server Binary
//!
//! Loads configuration, opens the configured node store and serves the network
//! API.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: port 3001, JSON store at ~/.netgraph/database/nodes.json
//! cargo run --bin netgraph-server
//!
//! # Ephemeral store on another port
//! NETGRAPH_STORE_BACKEND=memory NETGRAPH_PORT=3002 cargo run --bin netgraph-server
//! ```
//!
//! # Environment Variables
//!
//! - `NETGRAPH_CONFIG`: Path of a JSON config file
//! - `NETGRAPH_PORT`, `NETGRAPH_STORE_BACKEND`, `NETGRAPH_STORE_PATH`: Overrides
//! - `RUST_LOG`: Logging filter, takes precedence over `log_filter` from the config

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use netgraph_core::config::NetGraphConfig;
use netgraph_core::db::open_store;
use netgraph_core::NodeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::var("NETGRAPH_CONFIG").ok().map(PathBuf::from);
    let config = NetGraphConfig::load(config_path.as_deref()).await?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("NetGraph server");
    tracing::info!(port = config.port, backend = ?config.storage.backend, "Configuration loaded");

    let store = open_store(&config.storage).await?;
    let node_service = Arc::new(NodeService::new(store));
    tracing::info!("Services initialized");

    netgraph_core::api::start_server(node_service, config.port).await?;

    Ok(())
}
