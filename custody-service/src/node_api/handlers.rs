use crate::api::error::{decode_json, ApiError};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use custody_core::application::NodeService;
use custody_core::infrastructure::rpc::{GenerateRequest, GenerateResponse, NodeHealth, NodeSignRequest, NodeSignResponse, ShardResponse};
use log::trace;
use std::sync::Arc;

pub async fn handle_health(State(service): State<Arc<NodeService>>) -> Json<NodeHealth> {
    let health = service.health();
    trace!("node health check node_id={} has_shard={}", health.node_id, health.has_shard);
    Json(health)
}

pub async fn handle_get_shard(State(service): State<Arc<NodeService>>) -> Result<Json<ShardResponse>, ApiError> {
    Ok(Json(service.get_shard()?))
}

pub async fn handle_generate(State(service): State<Arc<NodeService>>, body: Bytes) -> Result<Json<GenerateResponse>, ApiError> {
    let request: GenerateRequest = decode_json(&body)?;
    Ok(Json(service.generate(&request).await?))
}

pub async fn handle_sign(State(service): State<Arc<NodeService>>, body: Bytes) -> Result<Json<NodeSignResponse>, ApiError> {
    let request: NodeSignRequest = decode_json(&body)?;
    Ok(Json(service.sign(&request).await?))
}
