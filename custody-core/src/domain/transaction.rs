use crate::foundation::{CustodyError, SigningKeypair, ETH_DECIMALS, MAX_AMOUNT_DIGITS};
use ethers_core::types::{Signature, TransactionRequest, H160, U256};
use ethers_core::utils::{format_ether, keccak256, parse_ether};
use std::fmt;

/// A non-negative ether amount, held exactly in wei.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct EthAmount {
    wei: u128,
}

impl EthAmount {
    pub const ZERO: EthAmount = EthAmount { wei: 0 };

    pub fn from_wei(wei: u128) -> Self {
        Self { wei }
    }

    pub fn wei(&self) -> u128 {
        self.wei
    }

    pub fn is_zero(&self) -> bool {
        self.wei == 0
    }

    /// Parses a decimal ether string such as `"0.25"`.
    ///
    /// At most 18 fractional digits and 20 significant digits overall; signs and exponents are rejected.
    pub fn parse(field: &str, value: &str) -> Result<Self, CustodyError> {
        let trimmed = value.trim();
        if trimmed.starts_with('-') {
            return Err(CustodyError::validation(field, "amount cannot be negative"));
        }
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(CustodyError::validation(field, "a valid number is required"));
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(CustodyError::validation(field, "a valid number is required"));
        }
        if fraction.len() > ETH_DECIMALS {
            return Err(CustodyError::validation(field, format!("ensure that there are no more than {ETH_DECIMALS} decimal places")));
        }
        if whole.trim_start_matches('0').len() + fraction.len() > MAX_AMOUNT_DIGITS {
            return Err(CustodyError::validation(field, format!("ensure that there are no more than {MAX_AMOUNT_DIGITS} digits in total")));
        }

        let wei = parse_ether(trimmed).map_err(|err| CustodyError::validation(field, format!("invalid amount: {err}")))?;
        if wei > U256::from(u128::MAX) {
            return Err(CustodyError::validation(field, "amount out of range"));
        }
        Ok(Self { wei: wei.as_u128() })
    }

    pub fn checked_mul(&self, factor: u128) -> Option<Self> {
        self.wei.checked_mul(factor).map(Self::from_wei)
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.wei.checked_add(other.wei).map(Self::from_wei)
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self::from_wei(self.wei.saturating_sub(other.wei))
    }
}

impl fmt::Display for EthAmount {
    /// Shortest exact decimal ether rendering (`1.5`, `0.000021`, `0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format_ether(U256::from(self.wei));
        match rendered.split_once('.') {
            Some((whole, fraction)) if fraction.trim_end_matches('0').is_empty() => f.write_str(whole),
            Some(_) => f.write_str(rendered.trim_end_matches('0')),
            None => f.write_str(&rendered),
        }
    }
}

/// Canonical transfer statement signed when no chain parameters are available.
///
/// Layout: `lowercase(from) | lowercase(to) | amount_wei`.
pub fn canonical_message(from: &H160, to: &H160, amount: EthAmount) -> String {
    format!("{:#x}|{:#x}|{}", from, to, amount.wei())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub signature: String,
    pub message_hash: String,
}

/// Signs the keccak-256 hash of the canonical transfer message.
pub fn sign_message(keypair: &SigningKeypair, from: &H160, to: &H160, amount: EthAmount) -> Result<SignedMessage, CustodyError> {
    let digest = keccak256(canonical_message(from, to, amount).as_bytes());
    let signature = keypair.sign_digest(digest)?;
    Ok(SignedMessage { signature: signature.to_rsv_hex(), message_hash: format!("0x{}", hex::encode(digest)) })
}

/// Chain parameters for a legacy (EIP-155) value transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferFields {
    pub nonce: u64,
    pub gas_price_wei: u128,
    pub gas_limit: u64,
    pub chain_id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransfer {
    pub signature: String,
    pub tx_hash: String,
    pub raw_transaction: String,
}

fn transfer_request(to: &H160, amount: EthAmount, fields: &TransferFields) -> TransactionRequest {
    TransactionRequest::new()
        .to(*to)
        .value(U256::from(amount.wei()))
        .gas(fields.gas_limit)
        .gas_price(U256::from(fields.gas_price_wei))
        .nonce(fields.nonce)
        .chain_id(fields.chain_id)
}

/// Builds and signs a legacy transfer; returns the RLP-encoded raw transaction and its hash.
pub fn sign_transfer(
    keypair: &SigningKeypair,
    to: &H160,
    amount: EthAmount,
    fields: &TransferFields,
) -> Result<SignedTransfer, CustodyError> {
    let request = transfer_request(to, amount, fields);
    let sighash = request.sighash();
    let sig = keypair.sign_digest(sighash.0)?;
    let v = u64::from(sig.recovery_id)
        .checked_add(35)
        .and_then(|v| fields.chain_id.checked_mul(2).and_then(|c| v.checked_add(c)))
        .ok_or_else(|| CustodyError::validation("chain_id", "chain id too large for EIP-155"))?;
    let signature = Signature { r: U256::from_big_endian(&sig.r), s: U256::from_big_endian(&sig.s), v };
    let raw = request.rlp_signed(&signature);
    let tx_hash = keccak256(&raw);
    Ok(SignedTransfer {
        signature: sig.to_rsv_hex(),
        tx_hash: format!("0x{}", hex::encode(tx_hash)),
        raw_transaction: format!("0x{}", hex::encode(&raw)),
    })
}
