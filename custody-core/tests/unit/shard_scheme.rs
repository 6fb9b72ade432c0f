use crate::fixtures::*;
use custody_core::domain::{ConcatenationScheme, ShardScheme, ShardSet};
use custody_core::foundation::ErrorCode;
use custody_core::infrastructure::crypto::ShardCipher;
use zeroize::Zeroizing;

#[test]
fn split_yields_three_groups_of_eight_and_joins_back() {
    let scheme = ConcatenationScheme;
    let shards = scheme.split(TEST_MNEMONIC).expect("split");
    assert_eq!(shards.len(), 3);
    for shard in &shards {
        assert_eq!(shard.split_whitespace().count(), 8);
    }

    let mut set = ShardSet::new();
    for (shard, id) in shards.into_iter().zip(1u8..) {
        set.insert(node_id(id), shard).expect("insert");
    }
    let joined = scheme.reconstruct(&set).expect("reconstruct");
    let normalized = TEST_MNEMONIC.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(joined.expose_phrase(), normalized);
}

#[test]
fn split_rejects_wrong_word_count() {
    let err = ConcatenationScheme.split("only three words").expect_err("short phrase");
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
}

#[test]
fn reconstruct_orders_by_node_not_arrival() {
    let mut set = ShardSet::new();
    set.insert(node_id(3), Zeroizing::new("phrase".to_string())).expect("insert");
    set.insert(node_id(1), Zeroizing::new("correct".to_string())).expect("insert");
    set.insert(node_id(2), Zeroizing::new("seed".to_string())).expect("insert");
    assert_eq!(ConcatenationScheme.reconstruct(&set).expect("reconstruct").expose_phrase(), SHORT_PHRASE);
}

#[test]
fn duplicate_node_shard_is_a_consensus_failure() {
    let mut set = ShardSet::new();
    set.insert(node_id(2), Zeroizing::new("seed".to_string())).expect("insert");
    let err = set.insert(node_id(2), Zeroizing::new("seed".to_string())).expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::ConsensusFailed);
}

#[test]
fn shard_cipher_decrypts_what_it_encrypts() {
    let cipher = cipher();
    let encrypted = cipher.encrypt("abandon ability able about above absent absorb abstract").expect("encrypt");
    assert_ne!(encrypted, cipher.encrypt("abandon ability able about above absent absorb abstract").expect("encrypt"), "fresh iv per call");
    assert_eq!(cipher.decrypt(&encrypted).expect("decrypt").as_str(), "abandon ability able about above absent absorb abstract");
}

#[test]
fn shard_cipher_wrong_passphrase_does_not_recover_plaintext() {
    let encrypted = cipher().encrypt("correct").expect("encrypt");
    let other = ShardCipher::from_passphrase("another passphrase").expect("cipher");
    match other.decrypt(&encrypted) {
        Ok(plaintext) => assert_ne!(plaintext.as_str(), "correct"),
        Err(err) => assert!(matches!(err.code(), ErrorCode::CryptoError | ErrorCode::EncodingError)),
    }
}

#[test]
fn shard_cipher_rejects_empty_passphrase_and_short_payload() {
    assert_eq!(ShardCipher::from_passphrase("").expect_err("empty").code(), ErrorCode::ConfigError);
    assert!(cipher().decrypt("AAAA").is_err());
    assert_eq!(cipher().decrypt("not base64!").expect_err("garbage").code(), ErrorCode::EncodingError);
}
