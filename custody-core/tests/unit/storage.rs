use custody_core::domain::{TransactionRecord, TxStatus, UsedNonce, Wallet};
use custody_core::infrastructure::storage::{RocksStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;

fn wallet(address: &str, index: u32, created_at: i64) -> Wallet {
    Wallet { address: address.to_string(), hd_path: format!("m/44'/60'/0'/0/{index}"), created_at }
}

fn record(tx_hash: &str, created_at: i64) -> TransactionRecord {
    TransactionRecord {
        tx_hash: tx_hash.to_string(),
        from_address: "0x0000000000000000000000000000000000000001".to_string(),
        to_address: "0x0000000000000000000000000000000000000002".to_string(),
        amount_eth: "0.5".to_string(),
        status: TxStatus::Ok,
        error_message: None,
        broadcasted: false,
        created_at,
    }
}

fn nonce(value: &str, created_at: i64) -> UsedNonce {
    UsedNonce { nonce: value.to_string(), timestamp: created_at, created_at }
}

#[test]
fn rocksdb_wallets_are_unique_case_insensitively() {
    let temp_dir = TempDir::new().expect("temp dir");
    let storage = RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb");

    assert!(storage.insert_wallet(&wallet("0xAbC0000000000000000000000000000000000001", 0, 10)).expect("insert"));
    assert!(!storage.insert_wallet(&wallet("0xabc0000000000000000000000000000000000001", 5, 11)).expect("duplicate"));
    assert_eq!(storage.wallet_count().expect("count"), 1);

    let found = storage.get_wallet("0xABC0000000000000000000000000000000000001").expect("get").expect("present");
    assert_eq!(found.hd_path, "m/44'/60'/0'/0/0");
    assert!(storage.get_wallet("0x0000000000000000000000000000000000000009").expect("get").is_none());
}

#[test]
fn rocksdb_lists_newest_first() {
    let temp_dir = TempDir::new().expect("temp dir");
    let storage = RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb");
    storage.insert_wallet(&wallet("0x0000000000000000000000000000000000000001", 0, 100)).expect("insert");
    storage.insert_wallet(&wallet("0x0000000000000000000000000000000000000002", 1, 300)).expect("insert");
    storage.insert_wallet(&wallet("0x0000000000000000000000000000000000000003", 2, 300)).expect("insert");

    let listed: Vec<String> = storage.list_wallets().expect("list").into_iter().map(|w| w.hd_path).collect();
    assert_eq!(listed, vec!["m/44'/60'/0'/0/2", "m/44'/60'/0'/0/1", "m/44'/60'/0'/0/0"]);

    for (i, ts) in [5, 50, 20, 40].into_iter().enumerate() {
        storage.append_transaction(&record(&format!("0x{i}"), ts)).expect("append");
    }
    let txs: Vec<i64> = storage.list_transactions(10).expect("list").into_iter().map(|r| r.created_at).collect();
    assert_eq!(txs, vec![50, 40, 20, 5]);
    assert_eq!(storage.list_transactions(2).expect("limited").len(), 2);
}

#[test]
fn rocksdb_nonce_ledger_insert_and_purge() {
    let temp_dir = TempDir::new().expect("temp dir");
    let storage = RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb");

    assert!(storage.insert_nonce_if_absent(&nonce("a", 100)).expect("insert"));
    assert!(!storage.insert_nonce_if_absent(&nonce("a", 200)).expect("reuse"));
    assert!(storage.insert_nonce_if_absent(&nonce("b", 700)).expect("insert"));

    assert_eq!(storage.purge_nonces_older_than(600).expect("purge"), 1);
    assert!(!storage.nonce_exists("a").expect("lookup"));
    assert!(storage.nonce_exists("b").expect("lookup"));
    assert_eq!(storage.purge_nonces_older_than(600).expect("purge again"), 0);
}

#[test]
fn rocksdb_state_survives_reopen() {
    let temp_dir = TempDir::new().expect("temp dir");
    {
        let storage = RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb");
        storage.insert_wallet(&wallet("0x0000000000000000000000000000000000000001", 0, 1)).expect("insert");
        storage.insert_nonce_if_absent(&nonce("kept", 1)).expect("nonce");
        storage.append_transaction(&record("0xaa", 1)).expect("append");
    }
    let storage = RocksStorage::open_in_dir(temp_dir.path()).expect("reopen rocksdb");
    storage.health_check().expect("health");
    assert_eq!(storage.wallet_count().expect("count"), 1);
    assert!(storage.nonce_exists("kept").expect("lookup"));
    storage.append_transaction(&record("0xbb", 2)).expect("append");
    let hashes: Vec<String> = storage.list_transactions(10).expect("list").into_iter().map(|r| r.tx_hash).collect();
    assert_eq!(hashes, vec!["0xbb", "0xaa"]);
}

#[test]
fn rocksdb_concurrent_nonce_insert_has_one_winner() {
    let temp_dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let storage = Arc::clone(&storage);
            std::thread::spawn(move || storage.insert_nonce_if_absent(&nonce("shared", i)).expect("insert"))
        })
        .collect();
    let winners = handles.into_iter().map(|handle| handle.join().expect("thread")).filter(|won| *won).count();
    assert_eq!(winners, 1);
}
