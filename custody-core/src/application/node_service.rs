use crate::application::fanout::{absorb_shards, fan_out};
use crate::application::shard_store::ShardStore;
use crate::domain::transaction::sign_message;
use crate::domain::validation::{parse_address, parse_amount, parse_hd_path};
use crate::domain::{MasterSeedMaterial, QuorumPolicy, ShardScheme, ShardSet};
use crate::foundation::{checksum_address, CustodyError, Result, MASTER_HD_PATH};
use crate::infrastructure::crypto::ShardCipher;
use crate::infrastructure::rpc::{GenerateRequest, GenerateResponse, NodeClient, NodeHealth, NodeSignRequest, NodeSignResponse, ShardResponse};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// One custody node: serves its encrypted shard and, for generate/sign, pulls the peers' shards.
pub struct NodeService {
    store: ShardStore,
    cipher: ShardCipher,
    peers: Vec<Arc<dyn NodeClient>>,
    scheme: Arc<dyn ShardScheme>,
    port: u16,
    peer_timeout: Duration,
}

impl NodeService {
    pub fn new(
        store: ShardStore,
        cipher: ShardCipher,
        peers: Vec<Arc<dyn NodeClient>>,
        scheme: Arc<dyn ShardScheme>,
        port: u16,
        peer_timeout: Duration,
    ) -> Self {
        Self { store, cipher, peers, scheme, port, peer_timeout }
    }

    pub fn get_shard(&self) -> Result<ShardResponse> {
        Ok(ShardResponse { encrypted_shard: self.store.encrypted()?.to_string(), node_id: self.store.node_id() })
    }

    pub fn health(&self) -> NodeHealth {
        NodeHealth { status: "healthy".to_string(), node_id: self.store.node_id(), port: self.port, has_shard: self.store.has_shard() }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let path = parse_hd_path("hd_path", &request.hd_path)?;
        let keypair = self.reconstruct().await?.derive_keypair(&path)?;
        let address = checksum_address(&keypair.address());
        info!("node derived address node_id={} hd_path={} address={}", self.store.node_id(), path, address);
        Ok(GenerateResponse { address })
    }

    pub async fn sign(&self, request: &NodeSignRequest) -> Result<NodeSignResponse> {
        let from = parse_address("address", &request.address)?;
        let to = parse_address("to", &request.to)?;
        let amount = parse_amount("amount", &request.amount)?;
        let path = parse_hd_path("hd_path", request.hd_path.as_deref().unwrap_or(MASTER_HD_PATH))?;

        let keypair = self.reconstruct().await?.derive_keypair(&path)?;
        if keypair.address() != from {
            return Err(CustodyError::validation("address", format!("does not belong to key at {path}")));
        }
        let signed = sign_message(&keypair, &from, &to, amount)?;
        info!("node signed message node_id={} from={:#x} to={:#x} hash={}", self.store.node_id(), from, to, signed.message_hash);
        Ok(NodeSignResponse { signature: signed.signature, tx_hash: signed.message_hash })
    }

    /// Local shard plus every peer's; all must be present.
    async fn reconstruct(&self) -> Result<MasterSeedMaterial> {
        let mut shards = ShardSet::new();
        shards.insert(self.store.node_id(), self.cipher.decrypt(self.store.encrypted()?)?)?;

        let outcomes = fan_out(&self.peers, self.peer_timeout, |peer| async move { peer.get_shard().await }).await;
        absorb_shards(&mut shards, &self.cipher, outcomes)?;
        debug!("node gathered shards node_id={} count={}", self.store.node_id(), shards.len());

        QuorumPolicy::strict().ensure_met(shards.len())?;
        self.scheme.reconstruct(&shards)
    }
}
