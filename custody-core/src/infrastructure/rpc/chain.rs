//! Ethereum JSON-RPC access: nonces, gas price, chain id, balances and broadcast.

use crate::foundation::CustodyError;
use crate::infrastructure::rpc::http::{build_client, post_json};
use async_trait::async_trait;
use ethers_core::types::H160;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Pending-inclusive nonce for `address`.
    async fn transaction_count(&self, address: &H160) -> Result<u64, CustodyError>;

    async fn gas_price(&self) -> Result<u128, CustodyError>;

    async fn chain_id(&self) -> Result<u64, CustodyError>;

    async fn balance(&self, address: &H160) -> Result<u128, CustodyError>;

    /// Broadcasts a `0x`-prefixed signed transaction; returns the node-reported hash.
    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, CustodyError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct JsonRpcChainClient {
    url: String,
    client: Client,
    next_id: AtomicU64,
}

impl JsonRpcChainClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CustodyError> {
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(CustodyError::ConfigError("chain rpc url is empty".to_string()));
        }
        Ok(Self { url, client: build_client(timeout)?, next_id: AtomicU64::new(1) })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, CustodyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("chain rpc call method={} id={}", method, id);
        let request = JsonRpcRequest { jsonrpc: "2.0", id, method, params };
        let response: JsonRpcResponse = post_json(&self.client, &self.url, &request).await?;
        if let Some(err) = response.error {
            return Err(CustodyError::upstream(&self.url, format!("{method} failed: code={} message={}", err.code, err.message)));
        }
        response.result.ok_or_else(|| CustodyError::upstream(&self.url, format!("{method} returned no result")))
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<u128, CustodyError> {
        let value = self.call(method, params).await?;
        let text = value.as_str().ok_or_else(|| CustodyError::upstream(&self.url, format!("{method} result is not a string")))?;
        parse_quantity(text).map_err(|details| CustodyError::upstream(&self.url, format!("{method}: {details}")))
    }
}

#[async_trait]
impl ChainRpc for JsonRpcChainClient {
    async fn transaction_count(&self, address: &H160) -> Result<u64, CustodyError> {
        let count = self.call_quantity("eth_getTransactionCount", json!([format!("{address:#x}"), "pending"])).await?;
        u64::try_from(count).map_err(|_| CustodyError::upstream(&self.url, "transaction count overflows u64"))
    }

    async fn gas_price(&self) -> Result<u128, CustodyError> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, CustodyError> {
        let id = self.call_quantity("eth_chainId", json!([])).await?;
        u64::try_from(id).map_err(|_| CustodyError::upstream(&self.url, "chain id overflows u64"))
    }

    async fn balance(&self, address: &H160) -> Result<u128, CustodyError> {
        self.call_quantity("eth_getBalance", json!([format!("{address:#x}"), "latest"])).await
    }

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, CustodyError> {
        let value = self.call("eth_sendRawTransaction", json!([raw_transaction])).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CustodyError::upstream(&self.url, "eth_sendRawTransaction result is not a string"))
    }
}

/// Parses a JSON-RPC hex quantity (`"0x1a"`).
fn parse_quantity(text: &str) -> Result<u128, String> {
    let digits = text.strip_prefix("0x").ok_or_else(|| format!("quantity missing 0x prefix: {text}"))?;
    if digits.is_empty() {
        return Err("empty quantity".to_string());
    }
    u128::from_str_radix(digits, 16).map_err(|err| format!("invalid quantity {text}: {err}"))
}
