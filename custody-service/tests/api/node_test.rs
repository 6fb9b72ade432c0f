use super::{get, post, send, PASSPHRASE};
use axum::http::StatusCode;
use custody_core::application::{NodeService, ShardStore};
use custody_core::domain::ConcatenationScheme;
use custody_core::foundation::NodeId;
use custody_core::infrastructure::crypto::ShardCipher;
use custody_core::infrastructure::rpc::fakes::FakeNode;
use custody_core::infrastructure::rpc::NodeClient;
use custody_service::node_api::build_node_router;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

fn node(shard: Option<&str>, peers_up: bool) -> NodeService {
    let cipher = ShardCipher::from_passphrase(PASSPHRASE).expect("cipher");
    let peers: Vec<Arc<dyn NodeClient>> = [(2u8, "seed"), (3u8, "phrase")]
        .iter()
        .map(|(id, word)| {
            let peer = FakeNode::new(NodeId::new(*id).expect("id"), Some(cipher.encrypt(word).expect("encrypt")));
            peer.set_down(!peers_up);
            Arc::new(peer) as Arc<dyn NodeClient>
        })
        .collect();
    let store = ShardStore::provision(NodeId::new(1).expect("id"), shard.map(|s| Zeroizing::new(s.to_string())), &cipher).expect("provision");
    NodeService::new(store, cipher, peers, Arc::new(ConcatenationScheme), 8001, Duration::from_secs(2))
}

#[tokio::test]
async fn node_health_and_shard() {
    let router = build_node_router(Arc::new(node(Some("correct"), true)));

    let reply = send(&router, get("/health", &[])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["node_id"], 1);
    assert_eq!(reply.json["has_shard"], true);

    let reply = send(&router, get("/get_shard", &[])).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["node_id"], 1);
    assert!(reply.json["encrypted_shard"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn node_without_shard_answers_server_error() {
    let router = build_node_router(Arc::new(node(None, true)));
    let reply = send(&router, get("/get_shard", &[])).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json["code"], "config_error");
}

#[tokio::test]
async fn node_generate_needs_both_peers() {
    let router = build_node_router(Arc::new(node(Some("correct"), true)));
    let reply = send(&router, post("/generate", &[], r#"{"hd_path":"m/44'/60'/0'/0/0"}"#)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.json["address"].as_str().is_some_and(|a| a.starts_with("0x") && a.len() == 42));

    let router = build_node_router(Arc::new(node(Some("correct"), false)));
    let reply = send(&router, post("/generate", &[], r#"{"hd_path":"m/44'/60'/0'/0/0"}"#)).await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.json["code"], "consensus_failed");
}
