use crate::foundation::{
    DEFAULT_GENERATE_QUORUM, DEFAULT_NODE_TIMEOUT_MS, DEFAULT_REQUEST_EXPIRY_SECS, DEFAULT_SIGN_REQUIRED_SHARDS,
    NONCE_CLEANUP_SAMPLE_MODULUS, NONCE_RETENTION_SECS, TRANSFER_GAS_LIMIT,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Process-level settings shared by the coordinator and node binaries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub data_dir: String,
    /// Coordinator HTTP listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { data_dir: String::new(), bind_addr: default_bind_addr() }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

/// Inbound request authentication.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared API key; also the first component of the signed request digest.
    #[serde(default)]
    pub api_secret: String,
    /// Enables the signature/timestamp/nonce checks on top of the API key.
    ///
    /// Accepts booleans as well as `"true"`, `"1"` and `"yes"` (case-insensitive) from env.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub require_signature: bool,
    #[serde(default = "default_request_expiry_seconds")]
    pub request_expiry_seconds: u64,
    #[serde(default = "default_nonce_retention_seconds")]
    pub nonce_retention_seconds: u64,
    #[serde(default = "default_cleanup_sample_modulus")]
    pub cleanup_sample_modulus: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_secret: String::new(),
            require_signature: false,
            request_expiry_seconds: default_request_expiry_seconds(),
            nonce_retention_seconds: default_nonce_retention_seconds(),
            cleanup_sample_modulus: default_cleanup_sample_modulus(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_secret", &"<redacted>")
            .field("require_signature", &self.require_signature)
            .field("request_expiry_seconds", &self.request_expiry_seconds)
            .field("nonce_retention_seconds", &self.nonce_retention_seconds)
            .field("cleanup_sample_modulus", &self.cleanup_sample_modulus)
            .finish()
    }
}

const fn default_request_expiry_seconds() -> u64 {
    DEFAULT_REQUEST_EXPIRY_SECS
}

const fn default_nonce_retention_seconds() -> u64 {
    NONCE_RETENTION_SECS
}

const fn default_cleanup_sample_modulus() -> u64 {
    NONCE_CLEANUP_SAMPLE_MODULUS
}

/// Shard custody topology and quorum rules.
#[derive(Clone, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// Passphrase hashed into the AES key that protects shards on every node.
    #[serde(default)]
    pub shard_passphrase: String,
    /// Base URLs of the three nodes, in shard order.
    #[serde(default = "default_node_urls")]
    pub node_urls: Vec<String>,
    #[serde(default = "default_node_timeout_ms")]
    pub node_timeout_ms: u64,
    /// Matching addresses required to accept a generated wallet.
    #[serde(default = "default_generate_quorum")]
    pub generate_quorum: usize,
    /// Shards that must be fetched before the coordinator signs.
    #[serde(default = "default_sign_required_shards")]
    pub sign_required_shards: usize,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            shard_passphrase: String::new(),
            node_urls: default_node_urls(),
            node_timeout_ms: default_node_timeout_ms(),
            generate_quorum: default_generate_quorum(),
            sign_required_shards: default_sign_required_shards(),
        }
    }
}

impl fmt::Debug for CustodyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodyConfig")
            .field("shard_passphrase", &"<redacted>")
            .field("node_urls", &self.node_urls)
            .field("node_timeout_ms", &self.node_timeout_ms)
            .field("generate_quorum", &self.generate_quorum)
            .field("sign_required_shards", &self.sign_required_shards)
            .finish()
    }
}

fn default_node_urls() -> Vec<String> {
    (1..=3).map(|i| format!("http://localhost:800{i}")).collect()
}

const fn default_node_timeout_ms() -> u64 {
    DEFAULT_NODE_TIMEOUT_MS
}

const fn default_generate_quorum() -> usize {
    DEFAULT_GENERATE_QUORUM
}

const fn default_sign_required_shards() -> usize {
    DEFAULT_SIGN_REQUIRED_SHARDS
}

/// Optional JSON-RPC endpoint used for nonces, gas price, balances and broadcast.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { rpc_url: None, gas_limit: default_gas_limit(), rpc_timeout_ms: default_rpc_timeout_ms() }
    }
}

const fn default_gas_limit() -> u64 {
    TRANSFER_GAS_LIMIT
}

const fn default_rpc_timeout_ms() -> u64 {
    DEFAULT_NODE_TIMEOUT_MS
}

/// Settings read by a `custody-node` process.
#[derive(Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_node_id")]
    pub node_id: u8,
    #[serde(default = "default_node_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_node_port")]
    pub port: u16,
    /// Plaintext shard; encrypted at startup and never kept in the clear.
    #[serde(default)]
    pub shard: Option<String>,
    /// Base URLs of the other two nodes.
    #[serde(default)]
    pub peer_urls: Vec<String>,
    #[serde(default = "default_peer_timeout_ms")]
    pub peer_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            bind_host: default_node_bind_host(),
            port: default_node_port(),
            shard: None,
            peer_urls: Vec::new(),
            peer_timeout_ms: default_peer_timeout_ms(),
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("node_id", &self.node_id)
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("shard", &self.shard.as_ref().map(|_| "<redacted>"))
            .field("peer_urls", &self.peer_urls)
            .field("peer_timeout_ms", &self.peer_timeout_ms)
            .finish()
    }
}

const fn default_node_id() -> u8 {
    1
}

fn default_node_bind_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_node_port() -> u16 {
    8001
}

const fn default_peer_timeout_ms() -> u64 {
    5_000
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub custody: CustodyConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value == 1,
        Flag::Text(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
    })
}
