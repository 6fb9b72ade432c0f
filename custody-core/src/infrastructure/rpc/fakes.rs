//! In-process stand-ins for node and chain endpoints.

use crate::foundation::{CustodyError, NodeId};
use crate::infrastructure::rpc::chain::ChainRpc;
use crate::infrastructure::rpc::node::{GenerateRequest, GenerateResponse, NodeClient, NodeHealth, ShardResponse};
use async_trait::async_trait;
use ethers_core::types::H160;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted node. Answers from fixed values and counts every call it receives.
pub struct FakeNode {
    url: String,
    node_id: NodeId,
    encrypted_shard: Option<String>,
    address: Option<String>,
    down: AtomicBool,
    hanging: AtomicBool,
    calls: AtomicUsize,
}

impl FakeNode {
    pub fn new(node_id: NodeId, encrypted_shard: Option<String>) -> Self {
        Self {
            url: format!("fake://node-{}", node_id),
            node_id,
            encrypted_shard,
            address: None,
            down: AtomicBool::new(false),
            hanging: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Address returned from `generate`; without one, `generate` fails.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// A hanging node accepts calls and never answers.
    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), CustodyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(CustodyError::upstream(&self.url, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeClient for FakeNode {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_shard(&self) -> Result<ShardResponse, CustodyError> {
        self.enter().await?;
        let encrypted_shard = self
            .encrypted_shard
            .clone()
            .ok_or_else(|| CustodyError::upstream(&self.url, format!("http_status=500 NODE_SHARD not set for node {}", self.node_id)))?;
        Ok(ShardResponse { encrypted_shard, node_id: self.node_id })
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, CustodyError> {
        self.enter().await?;
        let address = self.address.clone().ok_or_else(|| CustodyError::upstream(&self.url, "generate not scripted"))?;
        Ok(GenerateResponse { address })
    }

    async fn health(&self) -> Result<NodeHealth, CustodyError> {
        self.enter().await?;
        Ok(NodeHealth { status: "healthy".to_string(), node_id: self.node_id, port: 0, has_shard: self.encrypted_shard.is_some() })
    }
}

/// Chain with configurable balances. Broadcasts are recorded, never executed.
pub struct FakeChain {
    chain_id: u64,
    gas_price: u128,
    nonces: Mutex<HashMap<H160, u64>>,
    balances: Mutex<HashMap<H160, u128>>,
    broadcasts: Mutex<Vec<String>>,
    broadcast_attempts: AtomicUsize,
    fail_broadcast_at: Mutex<Option<usize>>,
}

impl FakeChain {
    pub fn new(chain_id: u64, gas_price: u128) -> Self {
        Self {
            chain_id,
            gas_price,
            nonces: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            broadcasts: Mutex::new(Vec::new()),
            broadcast_attempts: AtomicUsize::new(0),
            fail_broadcast_at: Mutex::new(None),
        }
    }

    pub fn set_balance(&self, address: H160, wei: u128) {
        if let Ok(mut balances) = self.balances.lock() {
            balances.insert(address, wei);
        }
    }

    pub fn set_nonce(&self, address: H160, nonce: u64) {
        if let Ok(mut nonces) = self.nonces.lock() {
            nonces.insert(address, nonce);
        }
    }

    /// Rejects the broadcast with this zero-based attempt index.
    pub fn fail_broadcast_at(&self, attempt: usize) {
        if let Ok(mut slot) = self.fail_broadcast_at.lock() {
            *slot = Some(attempt);
        }
    }

    pub fn broadcast_attempts(&self) -> usize {
        self.broadcast_attempts.load(Ordering::SeqCst)
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().map(|raw| raw.clone()).unwrap_or_default()
    }
}

fn poisoned(what: &str) -> CustodyError {
    CustodyError::upstream("fake://chain", format!("{what} lock poisoned"))
}

#[async_trait]
impl ChainRpc for FakeChain {
    async fn transaction_count(&self, address: &H160) -> Result<u64, CustodyError> {
        Ok(self.nonces.lock().map_err(|_| poisoned("nonce"))?.get(address).copied().unwrap_or(0))
    }

    async fn gas_price(&self) -> Result<u128, CustodyError> {
        Ok(self.gas_price)
    }

    async fn chain_id(&self) -> Result<u64, CustodyError> {
        Ok(self.chain_id)
    }

    async fn balance(&self, address: &H160) -> Result<u128, CustodyError> {
        Ok(self.balances.lock().map_err(|_| poisoned("balance"))?.get(address).copied().unwrap_or(0))
    }

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, CustodyError> {
        let attempt = self.broadcast_attempts.fetch_add(1, Ordering::SeqCst);
        if *self.fail_broadcast_at.lock().map_err(|_| poisoned("broadcast"))? == Some(attempt) {
            return Err(CustodyError::upstream("fake://chain", "nonce too low"));
        }
        let hash = ethers_core::utils::keccak256(hex::decode(raw_transaction.trim_start_matches("0x"))?);
        self.broadcasts.lock().map_err(|_| poisoned("broadcast"))?.push(raw_transaction.to_string());
        Ok(format!("0x{}", hex::encode(hash)))
    }
}
