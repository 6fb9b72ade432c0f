use super::{get, harness, post, send, API_KEY, GENERATED, NOW};
use axum::http::StatusCode;
use custody_core::application::request_signature;
use custody_service::api::build_router;

#[tokio::test]
async fn protected_routes_require_the_api_key() {
    let router = build_router(harness(false).state);

    let reply = send(&router, post("/wallet/create", &[], "{}")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json["code"], "authentication_failed");

    let reply = send(&router, get("/wallets", &[("x-api-key", "wrong")])).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_wallet_returns_created() {
    let router = build_router(harness(false).state);

    let reply = send(&router, post("/wallet/create", &[("x-api-key", API_KEY)], "")).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json["address"], GENERATED);
    assert_eq!(reply.json["hd_path"], "m/44'/60'/0'/0/0");
    assert_eq!(reply.json["created_at"], NOW);

    let reply = send(&router, post("/wallet/create", &[("x-api-key", API_KEY)], r#"{"hd_path":"m/44'/60'/0'/0/0"}"#)).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json["code"], "wallet_exists");

    let reply = send(&router, get("/wallets", &[("x-api-key", API_KEY)])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn sign_for_unknown_wallet_is_not_found() {
    let harness = harness(false);
    let router = build_router(harness.state.clone());
    let body = r#"{"address":"0x0000000000000000000000000000000000000042","to":"0x000000000000000000000000000000000000dead","amount":"1"}"#;

    let reply = send(&router, post("/wallet/sign", &[("x-api-key", API_KEY)], body)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["code"], "not_found");
    assert!(harness.nodes.iter().all(|node| node.calls() == 0));

    let reply = send(&router, get("/transactions", &[("x-api-key", API_KEY)])).await;
    assert_eq!(reply.json, serde_json::json!([]));
}

#[tokio::test]
async fn malformed_and_invalid_bodies_are_bad_requests() {
    let router = build_router(harness(false).state);

    let reply = send(&router, post("/wallet/sign", &[("x-api-key", API_KEY)], "{not json")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json["code"], "validation_failed");

    let body = r#"{"eth_wallets":"0x1234","amount":"1"}"#;
    let reply = send(&router, post("/wallet/bulk-send", &[("x-api-key", API_KEY)], body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_requests_are_single_use() {
    let router = build_router(harness(true).state);
    let body = "";
    let timestamp = NOW.to_string();
    let signature = request_signature(API_KEY, &timestamp, "nonce-1", body.as_bytes());
    let headers = [("x-api-key", API_KEY), ("x-timestamp", timestamp.as_str()), ("x-nonce", "nonce-1"), ("x-signature", signature.as_str())];

    let reply = send(&router, post("/wallet/create", &headers, body)).await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let reply = send(&router, post("/wallet/create", &headers, body)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json["code"], "replay_detected");

    let reply = send(&router, post("/wallet/create", &[("x-api-key", API_KEY)], body)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "signature headers are mandatory");
}

#[tokio::test]
async fn blank_nonce_header_is_rejected() {
    let router = build_router(harness(true).state);
    let timestamp = NOW.to_string();
    let signature = request_signature(API_KEY, &timestamp, "", b"");
    let headers = [("x-api-key", API_KEY), ("x-timestamp", timestamp.as_str()), ("x-nonce", ""), ("x-signature", signature.as_str())];

    let reply = send(&router, get("/wallets", &headers)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json["code"], "authentication_failed");
}

#[tokio::test]
async fn stale_signed_request_is_expired() {
    let router = build_router(harness(true).state);
    let timestamp = (NOW - 301).to_string();
    let signature = request_signature(API_KEY, &timestamp, "nonce-2", b"");
    let headers = [("x-api-key", API_KEY), ("x-timestamp", timestamp.as_str()), ("x-nonce", "nonce-2"), ("x-signature", signature.as_str())];

    let reply = send(&router, get("/wallets", &headers)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json["code"], "request_expired");
}

#[tokio::test]
async fn health_and_config_are_public() {
    let harness = harness(true);
    harness.nodes[1].set_down(true);
    let router = build_router(harness.state.clone());

    let reply = send(&router, get("/health", &[("x-request-id", "req-42")])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.request_id.as_deref(), Some("req-42"));
    assert_eq!(reply.json["status"], "degraded");
    assert_eq!(reply.json["nodes"][0]["healthy"], true);
    assert_eq!(reply.json["nodes"][1]["healthy"], false);

    let reply = send(&router, get("/config", &[])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.request_id.is_some_and(|id| !id.is_empty()));
    assert_eq!(reply.json["require_signature"], true);
    assert_eq!(reply.json["request_expiry_seconds"], 300);
    assert_eq!(reply.json["chain_rpc_configured"], false);
    assert_eq!(reply.json["mpc_nodes"].as_array().map(Vec::len), Some(3));
    assert!(reply.json.get("api_secret").is_none());
}
