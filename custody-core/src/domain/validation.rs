use crate::domain::transaction::EthAmount;
use crate::foundation::{CustodyError, DerivationPath, ADDRESS_STRING_LEN};
use ethers_core::types::H160;

/// Parses a `0x`-prefixed 40 hex digit account address. Case is not checked against EIP-55.
pub fn parse_address(field: &str, value: &str) -> Result<H160, CustodyError> {
    let trimmed = value.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != ADDRESS_STRING_LEN {
        return Err(CustodyError::validation(field, format!("invalid Ethereum address format: {trimmed}")));
    }
    let bytes = hex::decode(&trimmed[2..]).map_err(|_| CustodyError::validation(field, format!("invalid Ethereum address format: {trimmed}")))?;
    Ok(H160::from_slice(&bytes))
}

/// Parses a comma separated recipient list; blank entries are rejected, not skipped.
pub fn parse_address_list(field: &str, value: &str) -> Result<Vec<H160>, CustodyError> {
    if value.trim().is_empty() {
        return Err(CustodyError::validation(field, "at least one address required"));
    }
    value.split(',').map(|entry| parse_address(field, entry)).collect()
}

pub fn parse_amount(field: &str, value: &str) -> Result<EthAmount, CustodyError> {
    EthAmount::parse(field, value)
}

pub fn parse_positive_amount(field: &str, value: &str) -> Result<EthAmount, CustodyError> {
    let amount = EthAmount::parse(field, value)?;
    if amount.is_zero() {
        return Err(CustodyError::validation(field, "amount must be greater than 0"));
    }
    Ok(amount)
}

pub fn parse_hd_path(field: &str, value: &str) -> Result<DerivationPath, CustodyError> {
    value.parse::<DerivationPath>().map_err(|err| CustodyError::validation(field, err.to_string()))
}

/// `send_tx` is an integer flag: 0 signs only, 1 also broadcasts.
pub fn parse_send_flag(field: &str, value: i64) -> Result<bool, CustodyError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CustodyError::validation(field, format!("must be 0 or 1, got {other}"))),
    }
}
