#[path = "common/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::CommonArgs;
use clap::Parser;
use custody_core::application::{AuthGuard, AuthSettings, Coordinator, CoordinatorSettings, WalletOperations};
use custody_core::domain::{ConcatenationScheme, QuorumPolicy};
use custody_core::foundation::{Clock, CustodyError, SystemClock};
use custody_core::infrastructure::config::redact_url;
use custody_core::infrastructure::crypto::ShardCipher;
use custody_core::infrastructure::rpc::{ChainRpc, JsonRpcChainClient};
use custody_core::infrastructure::storage::{RocksStorage, Storage};
use custody_service::api::{run_api_server, ApiState};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "custody-coordinator")]
#[command(about = "Wallet API in front of the three shard nodes", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Override the listen address (service.bind_addr)
    #[arg(short, long)]
    bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    setup::init_logging(&args.common)?;
    args.common.apply_to_env();
    info!("custody-coordinator starting log_level={}", args.common.log_level);

    let mut app_config = setup::load_app_config()?;
    if let Some(bind_addr) = args.bind_addr {
        app_config.service.bind_addr = bind_addr;
    }
    setup::ensure_valid(app_config.validate())?;

    let storage: Arc<dyn Storage> = Arc::new(RocksStorage::open_in_dir(&app_config.service.data_dir)?);
    info!("storage initialized data_dir={}", app_config.service.data_dir);

    let node_timeout = Duration::from_millis(app_config.custody.node_timeout_ms);
    let nodes = setup::node_clients(&app_config.custody.node_urls, node_timeout)?;
    let settings = CoordinatorSettings {
        generate: QuorumPolicy::new(app_config.custody.generate_quorum)?,
        sign: QuorumPolicy::new(app_config.custody.sign_required_shards)?,
        node_timeout,
    };
    let cipher = ShardCipher::from_passphrase(&app_config.custody.shard_passphrase)?;
    let coordinator = Arc::new(Coordinator::new(nodes, storage.clone(), cipher, Arc::new(ConcatenationScheme), settings)?);

    let chain: Option<Arc<dyn ChainRpc>> = match app_config.chain.rpc_url.as_deref() {
        Some(url) => {
            info!("chain rpc configured url={}", redact_url(url));
            Some(Arc::new(JsonRpcChainClient::new(url, Duration::from_millis(app_config.chain.rpc_timeout_ms))?))
        }
        None => {
            warn!("chain.rpc_url not set; signing falls back to message signatures and broadcasting is disabled");
            None
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let operations = Arc::new(WalletOperations::new(coordinator, storage.clone(), chain, clock.clone(), app_config.chain.gas_limit));
    let auth = Arc::new(AuthGuard::new(AuthSettings::from(&app_config.auth), storage, clock));
    info!(
        "auth configured require_signature={} request_expiry_seconds={}",
        app_config.auth.require_signature, app_config.auth.request_expiry_seconds
    );

    let addr: SocketAddr = app_config
        .service
        .bind_addr
        .parse()
        .map_err(|err| CustodyError::ConfigError(format!("invalid service.bind_addr {}: {err}", app_config.service.bind_addr)))?;
    run_api_server(addr, Arc::new(ApiState::new(auth, operations))).await?;
    Ok(())
}
