use crate::api::error::{decode_json, ApiError};
use crate::api::state::ApiState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use custody_core::application::{BulkSendReport, BulkSendRequest, SignOutcome, SignRequest};
use custody_core::domain::Wallet;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct CreateWalletRequest {
    #[serde(default)]
    pub hd_path: Option<String>,
}

/// An empty body asks for the next account path.
pub async fn handle_create_wallet(State(state): State<Arc<ApiState>>, body: Bytes) -> Result<(StatusCode, Json<Wallet>), ApiError> {
    let request: CreateWalletRequest = if body.iter().all(u8::is_ascii_whitespace) { CreateWalletRequest::default() } else { decode_json(&body)? };
    let wallet = state.operations.create_wallet(request.hd_path.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn handle_sign(State(state): State<Arc<ApiState>>, body: Bytes) -> Result<Json<SignOutcome>, ApiError> {
    let request: SignRequest = decode_json(&body)?;
    Ok(Json(state.operations.sign(&request).await?))
}

pub async fn handle_bulk_send(State(state): State<Arc<ApiState>>, body: Bytes) -> Result<Json<BulkSendReport>, ApiError> {
    let request: BulkSendRequest = decode_json(&body)?;
    Ok(Json(state.operations.bulk_send(&request).await?))
}

pub async fn handle_list_wallets(State(state): State<Arc<ApiState>>) -> Result<Json<Vec<Wallet>>, ApiError> {
    Ok(Json(state.operations.list_wallets()?))
}
