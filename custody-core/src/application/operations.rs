//! Wallet use cases behind the coordinator HTTP surface.

use crate::application::coordinator::{Coordinator, TransferOrder};
use crate::domain::model::{TX_HASH_ERROR, TX_HASH_UNAVAILABLE};
use crate::domain::validation::{parse_address, parse_address_list, parse_amount, parse_hd_path, parse_positive_amount, parse_send_flag};
use crate::domain::{EthAmount, TransactionRecord, TransferFields, TxStatus, Wallet};
use crate::foundation::{checksum_address, Clock, CustodyError, DerivationPath, Result, ACCOUNT_PATH_PREFIX, MASTER_HD_PATH, SIGNATURE_PREVIEW_CHARS};
use crate::infrastructure::rpc::ChainRpc;
use crate::infrastructure::storage::Storage;
use ethers_core::types::H160;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_TRANSACTION_LIST_LIMIT: usize = 100;

#[derive(Clone, Debug, Deserialize)]
pub struct SignRequest {
    pub address: String,
    pub to: String,
    pub amount: String,
    #[serde(default)]
    pub send_tx: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignOutcome {
    pub signature: String,
    pub tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_transaction: Option<String>,
    pub broadcasted: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BulkSendRequest {
    pub eth_wallets: String,
    pub amount: String,
    #[serde(default)]
    pub send_tx: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BulkTransfer {
    pub recipient: String,
    pub amount: String,
    /// Truncated; the full signature is inside the raw transaction.
    pub signature: String,
    pub tx_hash: String,
    pub nonce: u64,
    pub status: TxStatus,
    pub broadcasted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BulkSendReport {
    pub master_wallet: String,
    pub total_recipients: usize,
    pub amount_per_wallet: String,
    pub total_amount: String,
    pub master_balance_before: String,
    pub master_balance_after: String,
    /// True only when every transfer reached the chain.
    pub broadcasted: bool,
    pub failed_transfers: usize,
    pub transactions: Vec<BulkTransfer>,
}

pub struct WalletOperations {
    coordinator: Arc<Coordinator>,
    storage: Arc<dyn Storage>,
    chain: Option<Arc<dyn ChainRpc>>,
    clock: Arc<dyn Clock>,
    gas_limit: u64,
}

impl WalletOperations {
    pub fn new(
        coordinator: Arc<Coordinator>,
        storage: Arc<dyn Storage>,
        chain: Option<Arc<dyn ChainRpc>>,
        clock: Arc<dyn Clock>,
        gas_limit: u64,
    ) -> Self {
        Self { coordinator, storage, chain, clock, gas_limit }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn chain_configured(&self) -> bool {
        self.chain.is_some()
    }

    /// Derives and stores a new wallet. Without a path, the next account index is used.
    pub async fn create_wallet(&self, hd_path: Option<&str>) -> Result<Wallet> {
        let path: DerivationPath = match hd_path.map(str::trim).filter(|path| !path.is_empty()) {
            Some(path) => parse_hd_path("hd_path", path)?,
            None => parse_hd_path("hd_path", &format!("{ACCOUNT_PATH_PREFIX}{}", self.storage.wallet_count()?))?,
        };
        let generated = self.coordinator.generate_wallet(&path).await?;
        let wallet = Wallet { address: generated.address, hd_path: path.to_string(), created_at: self.clock.now_secs() };
        if !self.storage.insert_wallet(&wallet)? {
            return Err(CustodyError::WalletExists(wallet.address));
        }
        info!("wallet created address={} hd_path={}", wallet.address, wallet.hd_path);
        Ok(wallet)
    }

    /// Signs a transfer from a stored wallet, optionally broadcasting it. Every attempt past the
    /// wallet lookup is audited.
    pub async fn sign(&self, request: &SignRequest) -> Result<SignOutcome> {
        let from = parse_address("address", &request.address)?;
        let to = parse_address("to", &request.to)?;
        let amount = parse_amount("amount", &request.amount)?;
        let send = parse_send_flag("send_tx", request.send_tx)?;
        let wallet = self
            .storage
            .get_wallet(&request.address)?
            .ok_or_else(|| CustodyError::NotFound(format!("wallet {}", request.address.trim())))?;

        let result = self.sign_stored(&wallet, &from, &to, amount, send).await;
        let record = match &result {
            Ok(outcome) => TransactionRecord {
                tx_hash: if outcome.tx_hash.is_empty() { TX_HASH_UNAVAILABLE.to_string() } else { outcome.tx_hash.clone() },
                from_address: wallet.address.clone(),
                to_address: checksum_address(&to),
                amount_eth: amount.to_string(),
                status: TxStatus::Ok,
                error_message: None,
                broadcasted: outcome.broadcasted,
                created_at: self.clock.now_secs(),
            },
            Err(err) => TransactionRecord {
                tx_hash: TX_HASH_ERROR.to_string(),
                from_address: wallet.address.clone(),
                to_address: checksum_address(&to),
                amount_eth: amount.to_string(),
                status: TxStatus::Error,
                error_message: Some(err.to_string()),
                broadcasted: false,
                created_at: self.clock.now_secs(),
            },
        };
        self.audit(&record);
        result
    }

    async fn sign_stored(&self, wallet: &Wallet, from: &H160, to: &H160, amount: EthAmount, send: bool) -> Result<SignOutcome> {
        let chain = match (&self.chain, send) {
            (None, true) => return Err(CustodyError::ConfigError("send_tx requires chain.rpc_url".to_string())),
            (chain, _) => chain.as_ref(),
        };
        let fields = match chain {
            Some(chain) => Some(TransferFields {
                nonce: chain.transaction_count(from).await?,
                gas_price_wei: chain.gas_price().await?,
                gas_limit: self.gas_limit,
                chain_id: chain.chain_id().await?,
            }),
            None => None,
        };

        let signed = self.coordinator.sign_transaction(&wallet.address, to, amount, fields).await?;
        let mut outcome = SignOutcome { signature: signed.signature, tx_hash: signed.tx_hash, raw_transaction: signed.raw_transaction, broadcasted: false };
        if send {
            if let (Some(chain), Some(raw)) = (chain, outcome.raw_transaction.as_deref()) {
                outcome.tx_hash = chain.send_raw_transaction(raw).await?;
                outcome.broadcasted = true;
                info!("transaction broadcast from={} tx_hash={}", wallet.address, outcome.tx_hash);
            }
        }
        Ok(outcome)
    }

    /// Funds every recipient from the master account (`m/44'/60'/0'/0/0`) after a balance check.
    pub async fn bulk_send(&self, request: &BulkSendRequest) -> Result<BulkSendReport> {
        let recipients = parse_address_list("eth_wallets", &request.eth_wallets)?;
        let amount = parse_positive_amount("amount", &request.amount)?;
        let send = parse_send_flag("send_tx", request.send_tx)?;
        let chain = self.chain.as_ref().ok_or_else(|| CustodyError::ConfigError("bulk send requires chain.rpc_url".to_string()))?;

        let master_path: DerivationPath = MASTER_HD_PATH.parse()?;
        let master = self.coordinator.generate_wallet(&master_path).await?;
        let master_address = parse_address("master_wallet", &master.address)?;

        let balance = EthAmount::from_wei(chain.balance(&master_address).await?);
        let gas_price = chain.gas_price().await?;
        let count = recipients.len() as u128;
        let overflow = || CustodyError::validation("amount", "total transfer amount out of range");
        let total_amount = amount.checked_mul(count).ok_or_else(overflow)?;
        let total_gas = gas_price
            .checked_mul(u128::from(self.gas_limit))
            .and_then(|per_tx| per_tx.checked_mul(count))
            .map(EthAmount::from_wei)
            .ok_or_else(overflow)?;
        let required = total_amount.checked_add(total_gas).ok_or_else(overflow)?;
        if balance < required {
            return Err(CustodyError::InsufficientBalance { address: master.address, balance: balance.to_string(), required: required.to_string() });
        }

        let nonce = chain.transaction_count(&master_address).await?;
        let chain_id = chain.chain_id().await?;
        let orders: Vec<TransferOrder> = recipients
            .iter()
            .zip(nonce..)
            .map(|(to, nonce)| TransferOrder {
                to: *to,
                amount,
                fields: TransferFields { nonce, gas_price_wei: gas_price, gas_limit: self.gas_limit, chain_id },
            })
            .collect();
        let signed = self.coordinator.sign_transfers(&master_path, &master.address, &orders).await?;

        // Nonces are sequential, so nothing after a failed broadcast can be mined; those are audited unsent.
        let mut transactions = Vec::with_capacity(orders.len());
        let mut halted: Option<u64> = None;
        for (order, signed) in orders.iter().zip(signed) {
            let (tx_hash, status, broadcasted, error) = match (send, halted) {
                (false, _) => (signed.tx_hash, TxStatus::Ok, false, None),
                (true, Some(failed_nonce)) => {
                    (TX_HASH_ERROR.to_string(), TxStatus::Error, false, Some(format!("not broadcast: nonce {failed_nonce} failed")))
                }
                (true, None) => match chain.send_raw_transaction(&signed.raw_transaction).await {
                    Ok(tx_hash) => (tx_hash, TxStatus::Ok, true, None),
                    Err(err) => {
                        warn!("bulk send broadcast failed master={} nonce={} error={}", master.address, order.fields.nonce, err);
                        halted = Some(order.fields.nonce);
                        (TX_HASH_ERROR.to_string(), TxStatus::Error, false, Some(err.to_string()))
                    }
                },
            };
            self.audit(&TransactionRecord {
                tx_hash: tx_hash.clone(),
                from_address: master.address.clone(),
                to_address: checksum_address(&order.to),
                amount_eth: amount.to_string(),
                status,
                error_message: error.clone(),
                broadcasted,
                created_at: self.clock.now_secs(),
            });
            transactions.push(BulkTransfer {
                recipient: checksum_address(&order.to),
                amount: amount.to_string(),
                signature: format!("{}...", signed.signature.chars().take(SIGNATURE_PREVIEW_CHARS).collect::<String>()),
                tx_hash,
                nonce: order.fields.nonce,
                status,
                broadcasted,
                error,
            });
        }
        let failed_transfers = transactions.iter().filter(|tx| tx.status == TxStatus::Error).count();
        info!(
            "bulk send signed master={} recipients={} broadcasted={} failed={}",
            master.address,
            transactions.len(),
            send,
            failed_transfers
        );

        Ok(BulkSendReport {
            master_wallet: master.address,
            total_recipients: transactions.len(),
            amount_per_wallet: amount.to_string(),
            total_amount: total_amount.to_string(),
            master_balance_before: balance.to_string(),
            master_balance_after: balance.saturating_sub(required).to_string(),
            broadcasted: send && failed_transfers == 0,
            failed_transfers,
            transactions,
        })
    }

    pub fn list_wallets(&self) -> Result<Vec<Wallet>> {
        self.storage.list_wallets()
    }

    pub fn list_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        self.storage.list_transactions(limit)
    }

    fn audit(&self, record: &TransactionRecord) {
        if let Err(err) = self.storage.append_transaction(record) {
            warn!("transaction audit write failed tx_hash={} status={} error={}", record.tx_hash, record.status, err);
        }
    }
}
