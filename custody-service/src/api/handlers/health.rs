use crate::api::state::ApiState;
use axum::extract::State;
use axum::Json;
use log::{debug, trace};
use serde_json::{json, Value};
use std::sync::Arc;

/// Liveness plus a health call to every shard node; a node that does not answer is reported unhealthy.
pub async fn handle_health(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let nodes = state.operations.coordinator().node_health().await;
    let healthy = nodes.iter().filter(|node| node.health.is_some()).count();
    let status = if healthy == nodes.len() { "healthy" } else { "degraded" };
    if status == "healthy" {
        trace!("health check: ok nodes={}", nodes.len());
    } else {
        debug!("health check: degraded healthy_nodes={} nodes={}", healthy, nodes.len());
    }

    let nodes: Vec<Value> = nodes
        .iter()
        .map(|node| match &node.health {
            Some(health) => json!({ "url": node.url, "healthy": true, "has_shard": health.has_shard }),
            None => json!({ "url": node.url, "healthy": false }),
        })
        .collect();
    Json(json!({ "status": status, "nodes": nodes }))
}
