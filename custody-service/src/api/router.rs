use super::handlers::config::handle_config;
use super::handlers::health::handle_health;
use super::handlers::transactions::handle_list_transactions;
use super::handlers::wallet::{handle_bulk_send, handle_create_wallet, handle_list_wallets, handle_sign};
use super::middleware::auth::auth_middleware;
use super::middleware::correlation::correlation_middleware;
use super::middleware::logging::logging_middleware;
use super::state::ApiState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use custody_core::foundation::{CustodyError, MAX_REQUEST_BODY_BYTES};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_api_server(addr: SocketAddr, state: Arc<ApiState>) -> Result<(), CustodyError> {
    info!("binding coordinator api addr={}", addr);
    serve(addr, build_router(state)).await
}

pub(crate) async fn serve(addr: SocketAddr, app: Router) -> Result<(), CustodyError> {
    let listener = TcpListener::bind(addr).await.map_err(|err| CustodyError::ConfigError(format!("cannot bind {addr}: {err}")))?;
    info!("HTTP server ready and accepting connections addr={}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.map_err(|err| {
        error!("HTTP server terminated unexpectedly addr={} error={}", addr, err);
        CustodyError::Message(err.to_string())
    })
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    let protected = Router::new()
        .route("/wallet/create", post(handle_create_wallet))
        .route("/wallet/sign", post(handle_sign))
        .route("/wallet/bulk-send", post(handle_bulk_send))
        .route("/wallets", get(handle_list_wallets))
        .route("/transactions", get(handle_list_transactions))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handle_health))
        .route("/config", get(handle_config))
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(axum::middleware::from_fn(correlation_middleware))
        .with_state(state)
}
