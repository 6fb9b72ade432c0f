use crate::api::error::ApiError;
use crate::api::state::ApiState;
use axum::extract::{Query, State};
use axum::Json;
use custody_core::application::operations::DEFAULT_TRANSACTION_LIST_LIMIT;
use custody_core::domain::TransactionRecord;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub limit: Option<usize>,
}

/// Newest audit entries first.
pub async fn handle_list_transactions(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TRANSACTION_LIST_LIMIT).clamp(1, DEFAULT_TRANSACTION_LIST_LIMIT);
    Ok(Json(state.operations.list_transactions(limit)?))
}
