use crate::api::state::ApiState;
use axum::extract::State;
use axum::Json;
use custody_core::infrastructure::config::redact_url;
use serde_json::{json, Value};
use std::sync::Arc;

/// Non-secret settings a client needs to build requests.
pub async fn handle_config(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let nodes: Vec<String> = state.operations.coordinator().node_urls().iter().map(|url| redact_url(url)).collect();
    Json(json!({
        "require_signature": state.auth.require_signature(),
        "request_expiry_seconds": state.auth.request_expiry_secs(),
        "mpc_nodes": nodes,
        "chain_rpc_configured": state.operations.chain_configured(),
        "version": state.version,
    }))
}
