use super::handlers::{handle_generate, handle_get_shard, handle_health, handle_sign};
use crate::api::middleware::correlation::correlation_middleware;
use crate::api::middleware::logging::logging_middleware;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use custody_core::application::NodeService;
use custody_core::foundation::{CustodyError, MAX_REQUEST_BODY_BYTES};
use custody_core::infrastructure::rpc::node::{NODE_GENERATE_PATH, NODE_GET_SHARD_PATH, NODE_HEALTH_PATH, NODE_SIGN_PATH};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn run_node_server(addr: SocketAddr, service: Arc<NodeService>) -> Result<(), CustodyError> {
    info!("binding node api addr={}", addr);
    crate::api::serve(addr, build_node_router(service)).await
}

pub fn build_node_router(service: Arc<NodeService>) -> Router {
    Router::new()
        .route(NODE_HEALTH_PATH, get(handle_health))
        .route(NODE_GET_SHARD_PATH, get(handle_get_shard))
        .route(NODE_GENERATE_PATH, post(handle_generate))
        .route(NODE_SIGN_PATH, post(handle_sign))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(service)
}
