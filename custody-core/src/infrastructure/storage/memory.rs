use crate::domain::{TransactionRecord, UsedNonce, Wallet};
use crate::foundation::CustodyError;
use crate::infrastructure::storage::Storage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    wallets: HashMap<String, (u64, Wallet)>,
    nonces: HashMap<String, UsedNonce>,
    transactions: Vec<TransactionRecord>,
    next_seq: u64,
}

/// Test storage. Insertion order breaks `created_at` ties the same way the RocksDB sequence keys do.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>, CustodyError> {
        self.inner
            .lock()
            .map_err(|_| CustodyError::StorageError { operation: "memory storage lock".to_string(), details: "poisoned".to_string() })
    }
}

impl Storage for MemoryStorage {
    fn insert_wallet(&self, wallet: &Wallet) -> Result<bool, CustodyError> {
        let mut inner = self.lock_inner()?;
        let key = Wallet::key_for(&wallet.address);
        if inner.wallets.contains_key(&key) {
            return Ok(false);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.wallets.insert(key, (seq, wallet.clone()));
        Ok(true)
    }

    fn get_wallet(&self, address: &str) -> Result<Option<Wallet>, CustodyError> {
        Ok(self.lock_inner()?.wallets.get(&Wallet::key_for(address)).map(|(_, wallet)| wallet.clone()))
    }

    fn list_wallets(&self) -> Result<Vec<Wallet>, CustodyError> {
        let inner = self.lock_inner()?;
        let mut entries: Vec<&(u64, Wallet)> = inner.wallets.values().collect();
        entries.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(entries.into_iter().map(|(_, wallet)| wallet.clone()).collect())
    }

    fn wallet_count(&self) -> Result<u64, CustodyError> {
        Ok(self.lock_inner()?.wallets.len() as u64)
    }

    fn nonce_exists(&self, nonce: &str) -> Result<bool, CustodyError> {
        Ok(self.lock_inner()?.nonces.contains_key(nonce))
    }

    fn insert_nonce_if_absent(&self, nonce: &UsedNonce) -> Result<bool, CustodyError> {
        let mut inner = self.lock_inner()?;
        if inner.nonces.contains_key(&nonce.nonce) {
            return Ok(false);
        }
        inner.nonces.insert(nonce.nonce.clone(), nonce.clone());
        Ok(true)
    }

    fn purge_nonces_older_than(&self, cutoff: i64) -> Result<usize, CustodyError> {
        let mut inner = self.lock_inner()?;
        let before = inner.nonces.len();
        inner.nonces.retain(|_, entry| entry.created_at >= cutoff);
        Ok(before - inner.nonces.len())
    }

    fn append_transaction(&self, record: &TransactionRecord) -> Result<(), CustodyError> {
        self.lock_inner()?.transactions.push(record.clone());
        Ok(())
    }

    fn list_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>, CustodyError> {
        let inner = self.lock_inner()?;
        let mut records: Vec<(usize, &TransactionRecord)> = inner.transactions.iter().enumerate().collect();
        records.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(records.into_iter().take(limit).map(|(_, record)| record.clone()).collect())
    }

    fn health_check(&self) -> Result<(), CustodyError> {
        self.lock_inner().map(|_| ())
    }
}
