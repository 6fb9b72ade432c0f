use crate::domain::{TransactionRecord, UsedNonce, Wallet};
use crate::foundation::CustodyError;

pub type Result<T> = std::result::Result<T, CustodyError>;

pub trait Storage: Send + Sync {
    /// Insert a wallet unless one with the same address (case-insensitive) exists.
    /// Returns `Ok(true)` if inserted, `Ok(false)` if it already existed.
    fn insert_wallet(&self, wallet: &Wallet) -> Result<bool>;
    fn get_wallet(&self, address: &str) -> Result<Option<Wallet>>;
    /// Newest first.
    fn list_wallets(&self) -> Result<Vec<Wallet>>;
    fn wallet_count(&self) -> Result<u64>;

    fn nonce_exists(&self, nonce: &str) -> Result<bool>;
    /// Atomic with respect to concurrent callers: exactly one insert of a given nonce succeeds.
    fn insert_nonce_if_absent(&self, nonce: &UsedNonce) -> Result<bool>;
    /// Removes ledger rows with `created_at < cutoff`; returns how many were removed.
    fn purge_nonces_older_than(&self, cutoff: i64) -> Result<usize>;

    fn append_transaction(&self, record: &TransactionRecord) -> Result<()>;
    /// Newest first, at most `limit` entries.
    fn list_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>>;

    fn health_check(&self) -> Result<()>;
}
