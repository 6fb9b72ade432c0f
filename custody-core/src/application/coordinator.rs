use crate::application::fanout::{absorb_shards, fan_out, successes};
use crate::domain::transaction::{sign_message, sign_transfer};
use crate::domain::{EthAmount, MasterSeedMaterial, QuorumPolicy, ShardScheme, ShardSet, SignedTransfer, TransferFields, Wallet};
use crate::foundation::{checksum_address, CustodyError, DerivationPath, Result, SigningKeypair, SHARD_COUNT};
use crate::infrastructure::crypto::ShardCipher;
use crate::infrastructure::rpc::{GenerateRequest, NodeClient, NodeHealth};
use crate::infrastructure::storage::Storage;
use ethers_core::types::H160;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

#[derive(Clone, Copy, Debug)]
pub struct CoordinatorSettings {
    /// Agreeing `generate` answers needed to accept an address.
    pub generate: QuorumPolicy,
    /// Shards that must be fetched before signing.
    pub sign: QuorumPolicy,
    pub node_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            generate: QuorumPolicy::new(crate::foundation::DEFAULT_GENERATE_QUORUM).unwrap_or_default(),
            sign: QuorumPolicy::strict(),
            node_timeout: Duration::from_millis(crate::foundation::DEFAULT_NODE_TIMEOUT_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedWallet {
    pub address: String,
    pub hd_path: DerivationPath,
}

/// Result of `sign_transaction`. `raw_transaction` is present only for chain transfers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSignature {
    pub signature: String,
    pub tx_hash: String,
    pub raw_transaction: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NodeStatus {
    pub url: String,
    pub health: Option<NodeHealth>,
}

/// One transfer in a batch signed under a single reconstruction.
#[derive(Clone, Copy, Debug)]
pub struct TransferOrder {
    pub to: H160,
    pub amount: EthAmount,
    pub fields: TransferFields,
}

pub struct Coordinator {
    nodes: Vec<Arc<dyn NodeClient>>,
    storage: Arc<dyn Storage>,
    cipher: ShardCipher,
    scheme: Arc<dyn ShardScheme>,
    settings: CoordinatorSettings,
}

impl Coordinator {
    pub fn new(
        nodes: Vec<Arc<dyn NodeClient>>,
        storage: Arc<dyn Storage>,
        cipher: ShardCipher,
        scheme: Arc<dyn ShardScheme>,
        settings: CoordinatorSettings,
    ) -> Result<Self> {
        if nodes.len() != SHARD_COUNT {
            return Err(CustodyError::ConfigError(format!("coordinator needs exactly {SHARD_COUNT} nodes, got {}", nodes.len())));
        }
        if settings.sign.required() < scheme.min_shards() {
            return Err(CustodyError::ConfigError(format!(
                "sign quorum {} is below the {} scheme minimum of {}",
                settings.sign.required(),
                scheme.name(),
                scheme.min_shards()
            )));
        }
        Ok(Self { nodes, storage, cipher, scheme, settings })
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn node_urls(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.url().to_string()).collect()
    }

    /// Asks every node to derive the address at `hd_path`; accepted when enough nodes agree.
    pub async fn generate_wallet(&self, hd_path: &DerivationPath) -> Result<GeneratedWallet> {
        let request = GenerateRequest { hd_path: hd_path.to_string() };
        let request = &request;
        let outcomes = fan_out(&self.nodes, self.settings.node_timeout, |node| async move { node.generate(request).await }).await;
        let addresses: Vec<String> = successes(outcomes).into_iter().map(|response| response.address).collect();
        debug!("generate responses hd_path={} received={} required={}", hd_path, addresses.len(), self.settings.generate.required());

        let address = self.settings.generate.agree(&addresses)?;
        info!("wallet address agreed hd_path={} address={}", hd_path, address);
        Ok(GeneratedWallet { address, hd_path: hd_path.clone() })
    }

    /// Signs for a stored wallet. Without `tx_fields` the canonical transfer message is signed.
    ///
    /// An unknown `address` fails before any node is contacted.
    pub async fn sign_transaction(
        &self,
        address: &str,
        to: &H160,
        amount: EthAmount,
        tx_fields: Option<TransferFields>,
    ) -> Result<TransactionSignature> {
        let wallet = self.lookup_wallet(address)?;
        let path: DerivationPath = wallet.hd_path.parse()?;
        let keypair = self.derive_verified(&path, &wallet.address).await?;

        match tx_fields {
            Some(fields) => {
                let signed = sign_transfer(&keypair, to, amount, &fields)?;
                info!("transfer signed from={} to={:#x} nonce={} tx_hash={}", wallet.address, to, fields.nonce, signed.tx_hash);
                Ok(TransactionSignature { signature: signed.signature, tx_hash: signed.tx_hash, raw_transaction: Some(signed.raw_transaction) })
            }
            None => {
                let signed = sign_message(&keypair, &keypair.address(), to, amount)?;
                info!("transfer message signed from={} to={:#x} hash={}", wallet.address, to, signed.message_hash);
                Ok(TransactionSignature { signature: signed.signature, tx_hash: signed.message_hash, raw_transaction: None })
            }
        }
    }

    /// Signs several transfers from the key at `hd_path` with one shard fetch.
    pub async fn sign_transfers(&self, hd_path: &DerivationPath, expected_address: &str, orders: &[TransferOrder]) -> Result<Vec<SignedTransfer>> {
        let keypair = self.derive_verified(hd_path, expected_address).await?;
        orders.iter().map(|order| sign_transfer(&keypair, &order.to, order.amount, &order.fields)).collect()
    }

    pub fn decrypt_shard(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        self.cipher.decrypt(ciphertext)
    }

    pub async fn node_health(&self) -> Vec<NodeStatus> {
        fan_out(&self.nodes, self.settings.node_timeout, |node| async move { node.health().await })
            .await
            .into_iter()
            .map(|outcome| NodeStatus { url: outcome.url, health: outcome.result.ok() })
            .collect()
    }

    fn lookup_wallet(&self, address: &str) -> Result<Wallet> {
        self.storage.get_wallet(address)?.ok_or_else(|| CustodyError::NotFound(format!("wallet {address}")))
    }

    async fn derive_verified(&self, path: &DerivationPath, expected_address: &str) -> Result<SigningKeypair> {
        let keypair = self.reconstruct().await?.derive_keypair(path)?;
        let derived = checksum_address(&keypair.address());
        if !derived.eq_ignore_ascii_case(expected_address.trim()) {
            warn!("derived address mismatch hd_path={} expected={} derived={}", path, expected_address, derived);
            return Err(CustodyError::consensus(format!("derived address {derived} does not match {expected_address}")));
        }
        Ok(keypair)
    }

    /// Fetches shards straight from the nodes (no node-side signing) and rebuilds the seed phrase.
    async fn reconstruct(&self) -> Result<MasterSeedMaterial> {
        let outcomes = fan_out(&self.nodes, self.settings.node_timeout, |node| async move { node.get_shard().await }).await;
        let mut shards = ShardSet::new();
        absorb_shards(&mut shards, &self.cipher, outcomes)?;
        debug!("shards collected received={} required={}", shards.len(), self.settings.sign.required());
        self.settings.sign.ensure_met(shards.len())?;
        self.scheme.reconstruct(&shards)
    }
}
