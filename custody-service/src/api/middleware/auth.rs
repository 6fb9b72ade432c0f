use crate::api::error::ApiError;
use crate::api::state::ApiState;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use custody_core::application::auth::{HEADER_API_KEY, HEADER_NONCE, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use custody_core::application::AuthRequest;
use custody_core::foundation::{CustodyError, MAX_REQUEST_BODY_BYTES};
use std::sync::Arc;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Buffers the body so the request digest covers exactly the bytes the handler will parse.
pub async fn auth_middleware(State(state): State<Arc<ApiState>>, req: Request<Body>, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => return ApiError(CustodyError::validation("body", format!("unreadable request body: {err}"))).into_response(),
    };

    let verdict = state.auth.verify(&AuthRequest {
        api_key: header(&parts.headers, HEADER_API_KEY),
        signature: header(&parts.headers, HEADER_SIGNATURE),
        timestamp: header(&parts.headers, HEADER_TIMESTAMP),
        nonce: header(&parts.headers, HEADER_NONCE),
        body: &bytes,
    });
    if let Err(err) = verdict {
        return ApiError(err).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
