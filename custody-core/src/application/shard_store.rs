use crate::foundation::{CustodyError, NodeId, Result};
use crate::infrastructure::crypto::ShardCipher;
use log::info;
use zeroize::Zeroizing;

/// A node's shard, encrypted once at startup. There is no transition after construction.
#[derive(Clone, Debug)]
pub enum ShardStore {
    NoShard { node_id: NodeId },
    ShardReady { node_id: NodeId, encrypted: String },
}

impl ShardStore {
    /// Encrypts `plaintext` with a fresh IV and drops the clear copy.
    pub fn provision(node_id: NodeId, plaintext: Option<Zeroizing<String>>, cipher: &ShardCipher) -> Result<Self> {
        match plaintext.filter(|shard| !shard.trim().is_empty()) {
            None => {
                info!("node started without shard node_id={}", node_id);
                Ok(ShardStore::NoShard { node_id })
            }
            Some(shard) => {
                let encrypted = cipher.encrypt(shard.trim())?;
                info!("node shard encrypted node_id={} ciphertext_len={}", node_id, encrypted.len());
                Ok(ShardStore::ShardReady { node_id, encrypted })
            }
        }
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            ShardStore::NoShard { node_id } | ShardStore::ShardReady { node_id, .. } => *node_id,
        }
    }

    pub fn has_shard(&self) -> bool {
        matches!(self, ShardStore::ShardReady { .. })
    }

    pub fn encrypted(&self) -> Result<&str> {
        match self {
            ShardStore::ShardReady { encrypted, .. } => Ok(encrypted.as_str()),
            ShardStore::NoShard { node_id } => Err(CustodyError::ConfigError(format!("NODE_SHARD not set for node {node_id}"))),
        }
    }
}
