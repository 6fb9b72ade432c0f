use crate::fixtures::*;
use custody_core::application::{NodeService, ShardStore};
use custody_core::domain::ConcatenationScheme;
use custody_core::foundation::ErrorCode;
use custody_core::infrastructure::rpc::{GenerateRequest, NodeSignRequest};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn get_shard_without_shard_is_a_config_error() {
    let cipher = cipher();
    let store = ShardStore::provision(node_id(2), None, &cipher).expect("provision");
    let service = NodeService::new(store, cipher, Vec::new(), Arc::new(ConcatenationScheme), 8002, Duration::from_secs(1));

    let err = service.get_shard().expect_err("no shard");
    assert_eq!(err.code(), ErrorCode::ConfigError);
    assert!(err.to_string().contains("NODE_SHARD not set"));
    let health = service.health();
    assert!(!health.has_shard);
    assert_eq!(health.node_id, node_id(2));
}

#[test]
fn served_shard_decrypts_to_the_provisioned_plaintext() {
    let peers = peers_for(1, &SHORT_SHARDS);
    let service = node_service(1, &SHORT_SHARDS, &peers);
    let response = service.get_shard().expect("shard");
    assert_eq!(response.node_id, node_id(1));
    assert_eq!(cipher().decrypt(&response.encrypted_shard).expect("decrypt").as_str(), "correct");
}

#[tokio::test]
async fn generate_derives_the_shared_address() {
    let peers = peers_for(2, &SHORT_SHARDS);
    let service = node_service(2, &SHORT_SHARDS, &peers);

    let response = service.generate(&GenerateRequest { hd_path: SECOND_PATH.to_string() }).await.expect("generate");
    assert_eq!(response.address, address_for(SHORT_PHRASE, SECOND_PATH));
    assert!(peers.iter().all(|peer| peer.calls() == 1));
}

#[tokio::test]
async fn generate_with_a_peer_down_is_a_consensus_failure() {
    let peers = peers_for(3, &SHORT_SHARDS);
    peers[0].set_down(true);
    let service = node_service(3, &SHORT_SHARDS, &peers);

    let err = service.generate(&GenerateRequest { hd_path: MASTER_PATH.to_string() }).await.expect_err("peer down");
    assert_eq!(err.code(), ErrorCode::ConsensusFailed);
}

#[tokio::test]
async fn generate_rejects_a_malformed_path() {
    let peers = peers_for(1, &SHORT_SHARDS);
    let service = node_service(1, &SHORT_SHARDS, &peers);
    let err = service.generate(&GenerateRequest { hd_path: "44'/60'".to_string() }).await.expect_err("bad path");
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    assert!(peers.iter().all(|peer| peer.calls() == 0));
}

#[tokio::test]
async fn sign_checks_the_address_against_the_derived_key() {
    let peers = peers_for(1, &SHORT_SHARDS);
    let service = node_service(1, &SHORT_SHARDS, &peers);
    let owner = address_for(SHORT_PHRASE, MASTER_PATH);

    let signed = service
        .sign(&NodeSignRequest { address: owner.clone(), to: RECIPIENT_A.to_string(), amount: "0.25".to_string(), hd_path: None })
        .await
        .expect("sign");
    assert_eq!(signed.signature.len(), 2 + 130);
    assert!(signed.tx_hash.starts_with("0x"));

    let err = service
        .sign(&NodeSignRequest { address: RECIPIENT_B.to_string(), to: RECIPIENT_A.to_string(), amount: "0.25".to_string(), hd_path: None })
        .await
        .expect_err("foreign address");
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn sign_with_a_peer_down_is_a_consensus_failure() {
    let peers = peers_for(1, &SHORT_SHARDS);
    peers[1].set_down(true);
    let service = node_service(1, &SHORT_SHARDS, &peers);

    let err = service
        .sign(&NodeSignRequest {
            address: address_for(SHORT_PHRASE, MASTER_PATH),
            to: RECIPIENT_A.to_string(),
            amount: "1".to_string(),
            hd_path: Some(MASTER_PATH.to_string()),
        })
        .await
        .expect_err("peer down");
    assert_eq!(err.code(), ErrorCode::ConsensusFailed);
}
