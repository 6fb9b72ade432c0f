use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use custody_core::foundation::{CustodyError, ErrorCode};
use log::{debug, error};
use serde::de::DeserializeOwned;

/// A `CustodyError` on its way out as `{"error": ..., "code": ...}`.
#[derive(Debug)]
pub struct ApiError(pub CustodyError);

impl From<CustodyError> for ApiError {
    fn from(err: CustodyError) -> Self {
        Self(err)
    }
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidDerivationPath => StatusCode::BAD_REQUEST,
        ErrorCode::AuthenticationFailed | ErrorCode::RequestExpired | ErrorCode::ReplayDetected => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::WalletExists => StatusCode::CONFLICT,
        ErrorCode::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ConsensusFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::UpstreamNetwork => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let context = self.0.context();
        let status = status_for(context.code);
        if status.is_server_error() {
            error!("request failed status={} code={} error={}", status.as_u16(), context.code.as_str(), context.message);
        } else {
            debug!("request rejected status={} code={} error={}", status.as_u16(), context.code.as_str(), context.message);
        }
        (status, Json(serde_json::json!({ "error": context.message, "code": context.code.as_str() }))).into_response()
    }
}

/// Decodes a JSON request body; malformed input is a validation failure.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError(CustodyError::validation("body", err.to_string())))
}
