use secp256k1::Error as SecpError;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigError,
    AuthenticationFailed,
    RequestExpired,
    ReplayDetected,
    ConsensusFailed,
    NotFound,
    UpstreamNetwork,
    ValidationFailed,
    WalletExists,
    InsufficientBalance,
    InvalidDerivationPath,
    StorageError,
    StorageLockTimeout,
    SchemaMismatch,
    SerializationError,
    CryptoError,
    EncodingError,
    Message,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => "config_error",
            ErrorCode::AuthenticationFailed => "authentication_failed",
            ErrorCode::RequestExpired => "request_expired",
            ErrorCode::ReplayDetected => "replay_detected",
            ErrorCode::ConsensusFailed => "consensus_failed",
            ErrorCode::NotFound => "not_found",
            ErrorCode::UpstreamNetwork => "upstream_network",
            ErrorCode::ValidationFailed => "validation_failed",
            ErrorCode::WalletExists => "wallet_exists",
            ErrorCode::InsufficientBalance => "insufficient_balance",
            ErrorCode::InvalidDerivationPath => "invalid_derivation_path",
            ErrorCode::StorageError => "storage_error",
            ErrorCode::StorageLockTimeout => "storage_lock_timeout",
            ErrorCode::SchemaMismatch => "schema_mismatch",
            ErrorCode::SerializationError => "serialization_error",
            ErrorCode::CryptoError => "crypto_error",
            ErrorCode::EncodingError => "encoding_error",
            ErrorCode::Message => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("request timestamp expired (max {max_skew_secs}s): timestamp={timestamp} now={now}")]
    RequestExpired { timestamp: i64, now: i64, max_skew_secs: u64 },

    #[error("nonce already used - replay attack detected")]
    ReplayDetected,

    #[error("consensus not reached: {details}")]
    ConsensusFailed { details: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("upstream {endpoint} failed: {details}")]
    UpstreamNetwork { endpoint: String, details: String },

    #[error("validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("wallet already exists: {0}")]
    WalletExists(String),

    #[error("insufficient balance on {address}: balance={balance} required={required}")]
    InsufficientBalance { address: String, balance: String, required: String },

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout: {operation} (waited {timeout_secs}s)")]
    StorageLockTimeout { operation: String, timeout_secs: u64 },

    #[error("schema mismatch: stored={stored} current={current}")]
    SchemaMismatch { stored: u32, current: u32 },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, CustodyError>;

impl CustodyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CustodyError::ConfigError(_) => ErrorCode::ConfigError,
            CustodyError::AuthenticationFailed(_) => ErrorCode::AuthenticationFailed,
            CustodyError::RequestExpired { .. } => ErrorCode::RequestExpired,
            CustodyError::ReplayDetected => ErrorCode::ReplayDetected,
            CustodyError::ConsensusFailed { .. } => ErrorCode::ConsensusFailed,
            CustodyError::NotFound(_) => ErrorCode::NotFound,
            CustodyError::UpstreamNetwork { .. } => ErrorCode::UpstreamNetwork,
            CustodyError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CustodyError::WalletExists(_) => ErrorCode::WalletExists,
            CustodyError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CustodyError::InvalidDerivationPath(_) => ErrorCode::InvalidDerivationPath,
            CustodyError::StorageError { .. } => ErrorCode::StorageError,
            CustodyError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            CustodyError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            CustodyError::SerializationError { .. } => ErrorCode::SerializationError,
            CustodyError::CryptoError { .. } => ErrorCode::CryptoError,
            CustodyError::EncodingError(_) => ErrorCode::EncodingError,
            CustodyError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn authentication(reason: impl Into<String>) -> Self {
        CustodyError::AuthenticationFailed(reason.into())
    }

    pub fn consensus(details: impl Into<String>) -> Self {
        CustodyError::ConsensusFailed { details: details.into() }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CustodyError::ValidationFailed { field: field.into(), reason: reason.into() }
    }

    pub fn upstream(endpoint: impl Into<String>, details: impl Into<String>) -> Self {
        CustodyError::UpstreamNetwork { endpoint: endpoint.into(), details: details.into() }
    }

    pub fn crypto(operation: impl Into<String>, details: impl Into<String>) -> Self {
        CustodyError::CryptoError { operation: operation.into(), details: details.into() }
    }
}

impl From<hex::FromHexError> for CustodyError {
    fn from(err: hex::FromHexError) -> Self {
        CustodyError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<base64::DecodeError> for CustodyError {
    fn from(err: base64::DecodeError) -> Self {
        CustodyError::EncodingError(format!("base64 decode error: {}", err))
    }
}

impl From<toml::de::Error> for CustodyError {
    fn from(err: toml::de::Error) -> Self {
        CustodyError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<rocksdb::Error> for CustodyError {
    fn from(err: rocksdb::Error) -> Self {
        CustodyError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for CustodyError {
    fn from(err: bincode::Error) -> Self {
        CustodyError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::CustodyError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

impl From<io::Error> for CustodyError {
    fn from(err: io::Error) -> Self {
        CustodyError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for CustodyError {
    fn from(err: serde_json::Error) -> Self {
        CustodyError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<SecpError> for CustodyError {
    fn from(err: SecpError) -> Self {
        CustodyError::CryptoError { operation: "secp256k1".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `CustodyError` variants at the call site to preserve context.
