#[path = "common/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::CommonArgs;
use clap::Parser;
use custody_core::application::{NodeService, ShardStore};
use custody_core::domain::ConcatenationScheme;
use custody_core::foundation::{CustodyError, NodeId};
use custody_core::infrastructure::crypto::ShardCipher;
use custody_service::node_api::run_node_server;
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "custody-node")]
#[command(about = "Shard node: holds one encrypted shard and serves it to its peers", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Override node.node_id (1..=3)
    #[arg(long)]
    node_id: Option<u8>,

    /// Override node.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    setup::init_logging(&args.common)?;
    args.common.apply_to_env();
    info!("custody-node starting log_level={}", args.common.log_level);

    let mut app_config = setup::load_app_config()?;
    if let Some(node_id) = args.node_id {
        app_config.node.node_id = node_id;
    }
    if let Some(port) = args.port {
        app_config.node.port = port;
    }
    setup::ensure_valid(app_config.validate_node())?;

    let node_id = NodeId::new(app_config.node.node_id)?;
    let cipher = ShardCipher::from_passphrase(&app_config.custody.shard_passphrase)?;
    let store = ShardStore::provision(node_id, app_config.node.shard.take().map(Zeroizing::new), &cipher)?;
    if !store.has_shard() {
        warn!("node started without a shard node_id={}; get_shard, generate and sign will fail", node_id);
    }

    let peer_timeout = Duration::from_millis(app_config.node.peer_timeout_ms);
    let peers = setup::node_clients(&app_config.node.peer_urls, peer_timeout)?;
    let service = Arc::new(NodeService::new(store, cipher, peers, Arc::new(ConcatenationScheme), app_config.node.port, peer_timeout));
    info!("node service ready node_id={} has_shard={} peers={}", node_id, service.health().has_shard, app_config.node.peer_urls.len());

    let addr: SocketAddr = format!("{}:{}", app_config.node.bind_host, app_config.node.port)
        .parse()
        .map_err(|err| CustodyError::ConfigError(format!("invalid node bind address {}:{}: {err}", app_config.node.bind_host, app_config.node.port)))?;
    run_node_server(addr, service).await?;
    Ok(())
}
