//! RocksDB-backed storage engine.
//!
//! # Lock Semantics
//!
//! RocksDB is thread-safe on its own; the mutexes below make read-then-write sequences atomic.
//!
//! - `wallet_lock`: wallet uniqueness check plus insert and the wallet sequence counter.
//! - `nonce_lock`: nonce insert-if-absent and purge, so a purge never races an insert.
//! - `tx_lock`: transaction sequence counter and append.
//!
//! Locks are acquired with a bounded timeout (`STORAGE_LOCK_TIMEOUT_SECS`). At most one is held at a time.

use crate::domain::{TransactionRecord, UsedNonce, Wallet};
use crate::foundation::CustodyError;
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::Storage;
use crate::storage_err;
use bincode::Options;
use log::{debug, info};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options as RocksOptions, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

const DB_DIR_NAME: &str = "custody-db";

#[derive(Serialize, Deserialize)]
struct StoredWallet {
    seq: u64,
    wallet: Wallet,
}

pub struct RocksStorage {
    db: Arc<DB>,
    wallet_lock: Mutex<()>,
    nonce_lock: Mutex<()>,
    tx_lock: Mutex<()>,
}

impl RocksStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CustodyError> {
        let path = path.as_ref();
        debug!("opening RocksStorage path={}", path.display());
        let storage =
            Self { db: Arc::new(open_db_with_cfs(path)?), wallet_lock: Mutex::new(()), nonce_lock: Mutex::new(()), tx_lock: Mutex::new(()) };
        storage.check_schema()?;
        info!("RocksStorage opened path={}", path.display());
        Ok(storage)
    }

    /// Opens (creating if needed) the database directory inside `data_dir`.
    pub fn open_in_dir(data_dir: impl AsRef<Path>) -> Result<Self, CustodyError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        Self::open(dir.join(DB_DIR_NAME))
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, CustodyError> {
        self.db.cf_handle(name).ok_or_else(|| CustodyError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn check_schema(&self) -> Result<(), CustodyError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, META_SCHEMA_VERSION).map_err(|err| storage_err!("rocksdb get_cf schema_version", err))? {
            None => {
                info!("initializing fresh db schema schema_version={}", SCHEMA_VERSION);
                self.db.put_cf(cf, META_SCHEMA_VERSION, SCHEMA_VERSION.to_be_bytes()).map_err(CustodyError::from)
            }
            Some(bytes) => {
                let stored = u32::from_be_bytes(bytes.as_slice().try_into().map_err(|_| CustodyError::StorageError {
                    operation: "schema_version decode".to_string(),
                    details: "corrupt schema version".to_string(),
                })?);
                if stored != SCHEMA_VERSION {
                    return Err(CustodyError::SchemaMismatch { stored, current: SCHEMA_VERSION });
                }
                Ok(())
            }
        }
    }

    fn read_counter(&self, key: &[u8]) -> Result<u64, CustodyError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, key)? {
            None => Ok(0),
            Some(bytes) => bytes.as_slice().try_into().map(u64::from_be_bytes).map_err(|_| CustodyError::StorageError {
                operation: "counter decode".to_string(),
                details: format!("corrupt counter {}", String::from_utf8_lossy(key)),
            }),
        }
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CustodyError> {
        bincode::DefaultOptions::new().with_fixint_encoding().serialize(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CustodyError> {
        bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes).map_err(|err| err.into())
    }
}

fn open_db_with_cfs(path: &Path) -> Result<DB, CustodyError> {
    let mut options = RocksOptions::default();
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    options.set_use_fsync(true);
    options.set_paranoid_checks(true);

    let cfs = [CF_DEFAULT, CF_METADATA, CF_WALLET, CF_NONCE, CF_TX_LOG]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, RocksOptions::default()))
        .collect::<Vec<_>>();

    DB::open_cf_descriptors(&options, path, cfs).map_err(|err| storage_err!("rocksdb open_cf_descriptors", err))
}

impl Storage for RocksStorage {
    fn insert_wallet(&self, wallet: &Wallet) -> Result<bool, CustodyError> {
        let _guard = acquire_with_timeout(&self.wallet_lock, "insert_wallet")?;
        let cf = self.cf_handle(CF_WALLET)?;
        let key = key_wallet(&Wallet::key_for(&wallet.address));
        if self.db.get_pinned_cf(cf, &key)?.is_some() {
            return Ok(false);
        }
        let seq = self.read_counter(META_WALLET_SEQ)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, &key, Self::encode(&StoredWallet { seq, wallet: wallet.clone() })?);
        batch.put_cf(self.cf_handle(CF_METADATA)?, META_WALLET_SEQ, (seq + 1).to_be_bytes());
        self.db.write(batch)?;
        debug!("wallet stored address={} hd_path={} seq={}", wallet.address, wallet.hd_path, seq);
        Ok(true)
    }

    fn get_wallet(&self, address: &str) -> Result<Option<Wallet>, CustodyError> {
        let cf = self.cf_handle(CF_WALLET)?;
        match self.db.get_pinned_cf(cf, key_wallet(&Wallet::key_for(address)))? {
            Some(bytes) => Ok(Some(Self::decode::<StoredWallet>(&bytes)?.wallet)),
            None => Ok(None),
        }
    }

    fn list_wallets(&self) -> Result<Vec<Wallet>, CustodyError> {
        let cf = self.cf_handle(CF_WALLET)?;
        let mut stored = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            stored.push(Self::decode::<StoredWallet>(&value)?);
        }
        stored.sort_by(|a, b| (b.wallet.created_at, b.seq).cmp(&(a.wallet.created_at, a.seq)));
        Ok(stored.into_iter().map(|entry| entry.wallet).collect())
    }

    fn wallet_count(&self) -> Result<u64, CustodyError> {
        self.read_counter(META_WALLET_SEQ)
    }

    fn nonce_exists(&self, nonce: &str) -> Result<bool, CustodyError> {
        let cf = self.cf_handle(CF_NONCE)?;
        Ok(self.db.get_pinned_cf(cf, key_nonce(nonce))?.is_some())
    }

    fn insert_nonce_if_absent(&self, nonce: &UsedNonce) -> Result<bool, CustodyError> {
        let _guard = acquire_with_timeout(&self.nonce_lock, "insert_nonce_if_absent")?;
        let cf = self.cf_handle(CF_NONCE)?;
        let key = key_nonce(&nonce.nonce);
        if self.db.get_pinned_cf(cf, &key)?.is_some() {
            return Ok(false);
        }
        self.db.put_cf(cf, key, Self::encode(nonce)?)?;
        Ok(true)
    }

    fn purge_nonces_older_than(&self, cutoff: i64) -> Result<usize, CustodyError> {
        let _guard = acquire_with_timeout(&self.nonce_lock, "purge_nonces_older_than")?;
        let cf = self.cf_handle(CF_NONCE)?;
        let mut batch = WriteBatch::default();
        let mut removed = 0usize;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let entry: UsedNonce = Self::decode(&value)?;
            if entry.created_at < cutoff {
                batch.delete_cf(cf, key);
                removed += 1;
            }
        }
        if removed > 0 {
            self.db.write(batch)?;
        }
        Ok(removed)
    }

    fn append_transaction(&self, record: &TransactionRecord) -> Result<(), CustodyError> {
        let _guard = acquire_with_timeout(&self.tx_lock, "append_transaction")?;
        let seq = self.read_counter(META_TX_SEQ)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf_handle(CF_TX_LOG)?, key_tx(seq), Self::encode(record)?);
        batch.put_cf(self.cf_handle(CF_METADATA)?, META_TX_SEQ, (seq + 1).to_be_bytes());
        self.db.write(batch)?;
        Ok(())
    }

    fn list_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>, CustodyError> {
        let cf = self.cf_handle(CF_TX_LOG)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::End).take(limit) {
            let (_, value) = item?;
            records.push(Self::decode::<TransactionRecord>(&value)?);
        }
        // Sequence order is append order; a clock step backwards is the only way it differs from created_at.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn health_check(&self) -> Result<(), CustodyError> {
        self.check_schema()
    }
}
