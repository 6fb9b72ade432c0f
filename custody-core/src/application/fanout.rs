//! Concurrent calls to a fixed set of nodes with isolated failures.

use crate::domain::ShardSet;
use crate::foundation::{CustodyError, Result};
use crate::infrastructure::crypto::ShardCipher;
use crate::infrastructure::rpc::{NodeClient, ShardResponse};
use futures_util::future::join_all;
use log::warn;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct NodeOutcome<T> {
    pub url: String,
    pub result: Result<T>,
}

/// Runs `call` against every node at once, each bounded by `timeout`.
///
/// Returns only after every call finished or timed out; outcomes keep node order.
pub async fn fan_out<T, F, Fut>(nodes: &[Arc<dyn NodeClient>], timeout: Duration, call: F) -> Vec<NodeOutcome<T>>
where
    F: Fn(Arc<dyn NodeClient>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let calls = nodes.iter().map(|node| {
        let url = node.url().to_string();
        let fut = call(Arc::clone(node));
        async move {
            let result = match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(CustodyError::upstream(&url, format!("timed out after {}ms", timeout.as_millis()))),
            };
            if let Err(err) = &result {
                warn!("node call failed url={} error={}", url, err);
            }
            NodeOutcome { url, result }
        }
    });
    join_all(calls).await
}

/// Successful values in node order.
pub fn successes<T>(outcomes: Vec<NodeOutcome<T>>) -> Vec<T> {
    outcomes.into_iter().filter_map(|outcome| outcome.result.ok()).collect()
}

/// Decrypts fetched shards into `set`, keyed by the node id each response reports.
///
/// Undecryptable shards count as missing; a node id reported twice fails the collection.
pub fn absorb_shards(set: &mut ShardSet, cipher: &ShardCipher, outcomes: Vec<NodeOutcome<ShardResponse>>) -> Result<()> {
    for NodeOutcome { url, result } in outcomes {
        let Ok(response) = result else {
            continue;
        };
        match cipher.decrypt(&response.encrypted_shard) {
            Ok(plaintext) => set.insert(response.node_id, plaintext)?,
            Err(err) => warn!("shard decrypt failed url={} node_id={} error={}", url, response.node_id, err),
        }
    }
    Ok(())
}
