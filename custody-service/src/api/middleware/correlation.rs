use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const HEADER_REQUEST_ID: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Adopts the caller's `X-Request-Id` when it is a usable header value, otherwise mints one, and echoes it back.
pub async fn correlation_middleware(mut req: Request<Body>, next: Next) -> Response {
    let (request_id, header) = match req.headers().get(HEADER_REQUEST_ID).and_then(|v| v.to_str().ok().map(|s| (s.to_string(), v.clone()))) {
        Some((id, header)) if !id.trim().is_empty() => (id, header),
        _ => {
            let id = Uuid::new_v4().to_string();
            let header = HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            (id, header)
        }
    };

    req.extensions_mut().insert(RequestId(request_id));
    let mut response = next.run(req).await;
    response.headers_mut().insert(HEADER_REQUEST_ID, header);
    response
}
