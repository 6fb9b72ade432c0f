//! Node wire format and the client the coordinator (and peer nodes) use to reach it.

use crate::foundation::{CustodyError, NodeId};
use crate::infrastructure::rpc::http::{build_client, get_json, join_url, post_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NODE_HEALTH_PATH: &str = "/health";
pub const NODE_GET_SHARD_PATH: &str = "/get_shard";
pub const NODE_GENERATE_PATH: &str = "/generate";
pub const NODE_SIGN_PATH: &str = "/sign";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardResponse {
    pub encrypted_shard: String,
    pub node_id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub hd_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSignRequest {
    pub address: String,
    pub to: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSignResponse {
    pub signature: String,
    pub tx_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHealth {
    pub status: String,
    pub node_id: NodeId,
    pub port: u16,
    pub has_shard: bool,
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Base URL, used for logging and error context.
    fn url(&self) -> &str;

    async fn get_shard(&self) -> Result<ShardResponse, CustodyError>;

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CustodyError>;

    async fn health(&self) -> Result<NodeHealth, CustodyError>;
}

/// `NodeClient` over plain HTTP/JSON. The per-request timeout is fixed at construction.
#[derive(Clone, Debug)]
pub struct HttpNodeClient {
    base_url: String,
    client: Client,
}

impl HttpNodeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CustodyError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CustodyError::ConfigError("node url is empty".to_string()));
        }
        Ok(Self { base_url, client: build_client(timeout)? })
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    fn url(&self) -> &str {
        &self.base_url
    }

    async fn get_shard(&self) -> Result<ShardResponse, CustodyError> {
        get_json(&self.client, &join_url(&self.base_url, NODE_GET_SHARD_PATH)).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, CustodyError> {
        post_json(&self.client, &join_url(&self.base_url, NODE_GENERATE_PATH), request).await
    }

    async fn health(&self) -> Result<NodeHealth, CustodyError> {
        get_json(&self.client, &join_url(&self.base_url, NODE_HEALTH_PATH)).await
    }
}
