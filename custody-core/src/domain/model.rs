use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder hash recorded for a successful sign that produced no hash.
pub const TX_HASH_UNAVAILABLE: &str = "N/A";
/// Placeholder hash recorded for a failed sign attempt.
pub const TX_HASH_ERROR: &str = "ERROR";

/// A derived account the coordinator has issued. Never mutated once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub hd_path: String,
    pub created_at: i64,
}

impl Wallet {
    /// Lookup key: addresses are unique regardless of checksum casing.
    pub fn key_for(address: &str) -> String {
        address.trim().to_ascii_lowercase()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedNonce {
    pub nonce: String,
    /// Client-supplied request timestamp (Unix seconds).
    pub timestamp: i64,
    /// Server time of acceptance; drives retention.
    pub created_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Ok,
    Error,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Ok => f.write_str("ok"),
            TxStatus::Error => f.write_str("error"),
        }
    }
}

/// Audit entry for one sign attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub amount_eth: String,
    pub status: TxStatus,
    pub error_message: Option<String>,
    pub broadcasted: bool,
    pub created_at: i64,
}
