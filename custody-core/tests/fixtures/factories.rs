#![allow(dead_code)]

use super::constants::*;
use async_trait::async_trait;
use custody_core::application::{AuthGuard, AuthSettings, Coordinator, CoordinatorSettings, NodeService, ShardStore, WalletOperations};
use custody_core::domain::{ConcatenationScheme, MasterSeedMaterial};
use custody_core::foundation::util::time::FixedClock;
use custody_core::foundation::{checksum_address, CustodyError, DerivationPath, NodeId};
use custody_core::infrastructure::config::AuthConfig;
use custody_core::infrastructure::crypto::ShardCipher;
use custody_core::infrastructure::rpc::fakes::{FakeChain, FakeNode};
use custody_core::infrastructure::rpc::{ChainRpc, GenerateRequest, GenerateResponse, NodeClient, NodeHealth, ShardResponse};
use custody_core::infrastructure::storage::{MemoryStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

pub fn node_id(value: u8) -> NodeId {
    NodeId::new(value).expect("node id")
}

pub fn cipher() -> ShardCipher {
    ShardCipher::from_passphrase(TEST_PASSPHRASE).expect("cipher")
}

pub fn encrypt_all(shards: &[&str]) -> Vec<String> {
    let cipher = cipher();
    shards.iter().map(|shard| cipher.encrypt(shard).expect("encrypt shard")).collect()
}

pub fn address_for(phrase: &str, path: &str) -> String {
    let path: DerivationPath = path.parse().expect("path");
    let keypair = MasterSeedMaterial::new(phrase.to_string()).derive_keypair(&path).expect("derive");
    checksum_address(&keypair.address())
}

/// Three fake nodes holding `shards` (encrypted), each answering `generate` with `address` if given.
pub fn fake_nodes(shards: &[&str], address: Option<&str>) -> Vec<Arc<FakeNode>> {
    encrypt_all(shards)
        .into_iter()
        .zip(1u8..)
        .map(|(encrypted, id)| {
            let node = FakeNode::new(node_id(id), Some(encrypted));
            Arc::new(match address {
                Some(address) => node.with_address(address),
                None => node,
            })
        })
        .collect()
}

pub fn as_clients<T: NodeClient + 'static>(nodes: &[Arc<T>]) -> Vec<Arc<dyn NodeClient>> {
    nodes.iter().map(|node| Arc::clone(node) as Arc<dyn NodeClient>).collect()
}

pub fn fast_settings() -> CoordinatorSettings {
    CoordinatorSettings { node_timeout: Duration::from_millis(2_000), ..CoordinatorSettings::default() }
}

pub fn coordinator(nodes: Vec<Arc<dyn NodeClient>>, storage: Arc<dyn Storage>) -> Coordinator {
    Coordinator::new(nodes, storage, cipher(), Arc::new(ConcatenationScheme), fast_settings()).expect("coordinator")
}

pub fn coordinator_with_timeout(nodes: Vec<Arc<dyn NodeClient>>, storage: Arc<dyn Storage>, node_timeout: Duration) -> Coordinator {
    let settings = CoordinatorSettings { node_timeout, ..CoordinatorSettings::default() };
    Coordinator::new(nodes, storage, cipher(), Arc::new(ConcatenationScheme), settings).expect("coordinator")
}

/// A real `NodeService` exposed through `NodeClient`, so coordinator tests run the node code path in-process.
pub struct ServiceNode {
    url: String,
    service: NodeService,
}

#[async_trait]
impl NodeClient for ServiceNode {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_shard(&self) -> Result<ShardResponse, CustodyError> {
        self.service.get_shard()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CustodyError> {
        self.service.generate(request).await
    }

    async fn health(&self) -> Result<NodeHealth, CustodyError> {
        Ok(self.service.health())
    }
}

/// Node `id` holding `shards[id - 1]`, with fake peers serving the other two shards.
pub fn node_service(id: u8, shards: &[&str], peers: &[Arc<FakeNode>]) -> NodeService {
    let cipher = cipher();
    let own = Zeroizing::new(shards[usize::from(id) - 1].to_string());
    let store = ShardStore::provision(node_id(id), Some(own), &cipher).expect("provision");
    NodeService::new(store, cipher, as_clients(peers), Arc::new(ConcatenationScheme), 8000 + u16::from(id), Duration::from_millis(2_000))
}

/// Peer fakes for node `id`: every node except `id`.
pub fn peers_for(id: u8, shards: &[&str]) -> Vec<Arc<FakeNode>> {
    let encrypted = encrypt_all(shards);
    (1u8..=3)
        .filter(|peer| *peer != id)
        .map(|peer| Arc::new(FakeNode::new(node_id(peer), Some(encrypted[usize::from(peer) - 1].clone()))))
        .collect()
}

/// Three in-process nodes backed by real `NodeService`s.
pub fn service_nodes(shards: &[&str]) -> Vec<Arc<ServiceNode>> {
    (1u8..=3)
        .map(|id| {
            let peers = peers_for(id, shards);
            Arc::new(ServiceNode { url: format!("local://node-{id}"), service: node_service(id, shards, &peers) })
        })
        .collect()
}

pub fn auth_settings(require_signature: bool) -> AuthSettings {
    let config = AuthConfig { api_secret: TEST_API_SECRET.to_string(), require_signature, ..AuthConfig::default() };
    AuthSettings::from(&config)
}

pub fn auth_guard(require_signature: bool, storage: Arc<dyn Storage>, clock: FixedClock) -> AuthGuard {
    AuthGuard::new(auth_settings(require_signature), storage, Arc::new(clock))
}

pub struct OperationsHarness {
    pub operations: WalletOperations,
    pub storage: Arc<MemoryStorage>,
    pub chain: Option<Arc<FakeChain>>,
    pub clock: FixedClock,
}

/// Wallet operations over real in-process nodes and memory storage, optionally with a fake chain.
pub fn operations(shards: &[&str], with_chain: bool) -> OperationsHarness {
    let storage = Arc::new(MemoryStorage::new());
    let clock = FixedClock::new(TEST_NOW);
    let coordinator = Arc::new(coordinator(as_clients(&service_nodes(shards)), storage.clone()));
    let chain = with_chain.then(|| Arc::new(FakeChain::new(TEST_CHAIN_ID, TEST_GAS_PRICE)));
    let operations = WalletOperations::new(
        coordinator,
        storage.clone(),
        chain.clone().map(|chain| chain as Arc<dyn ChainRpc>),
        Arc::new(clock.clone()),
        21_000,
    );
    OperationsHarness { operations, storage, chain, clock }
}
