use super::correlation::RequestId;
use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use custody_core::application::auth::{HEADER_API_KEY, HEADER_SIGNATURE};
use log::{debug, error, trace, warn};
use std::time::Instant;

const REDACTED_HEADERS: &[&str] = &[HEADER_API_KEY, HEADER_SIGNATURE, "authorization", "cookie"];
const MAX_HEADER_VALUE_LEN: usize = 128;

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_string()
            } else {
                match value.to_str() {
                    Ok(text) if text.len() > MAX_HEADER_VALUE_LEN => format!("{}...", text.chars().take(MAX_HEADER_VALUE_LEN).collect::<String>()),
                    Ok(text) => text.to_string(),
                    Err(_) => "<non-utf8>".to_string(),
                }
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone()).unwrap_or_default();
    debug!(target: "http", "request headers request_id={} method={} path={} headers={:?}", request_id, method, path, sanitize_headers(req.headers()));
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();
    if path == "/health" {
        trace!(target: "http", "health check request_id={} status={} duration_ms={}", request_id, status, duration_ms);
    } else if response.status().is_server_error() {
        error!(target: "http", "request failed request_id={} method={} path={} status={} duration_ms={}", request_id, method, path, status, duration_ms);
    } else if response.status().is_client_error() {
        warn!(target: "http", "request rejected request_id={} method={} path={} status={} duration_ms={}", request_id, method, path, status, duration_ms);
    } else {
        debug!(target: "http", "request request_id={} method={} path={} status={} duration_ms={}", request_id, method, path, status, duration_ms);
    }
    response
}
