//! Request authentication: API key, then optionally a keyed digest bound to a timestamp and a single-use nonce.

use crate::domain::UsedNonce;
use crate::foundation::{Clock, CustodyError, Result};
use crate::infrastructure::config::AuthConfig;
use crate::infrastructure::storage::Storage;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const HEADER_API_KEY: &str = "x-api-key";
pub const HEADER_SIGNATURE: &str = "x-signature";
pub const HEADER_TIMESTAMP: &str = "x-timestamp";
pub const HEADER_NONCE: &str = "x-nonce";

/// Credentials pulled from one inbound request.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthRequest<'a> {
    pub api_key: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub nonce: Option<&'a str>,
    pub body: &'a [u8],
}

pub struct AuthSettings {
    pub api_secret: SecretString,
    pub require_signature: bool,
    pub request_expiry_secs: u64,
    pub nonce_retention_secs: u64,
    pub cleanup_sample_modulus: u64,
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            api_secret: SecretString::new(config.api_secret.clone()),
            require_signature: config.require_signature,
            request_expiry_secs: config.request_expiry_seconds,
            nonce_retention_secs: config.nonce_retention_seconds,
            cleanup_sample_modulus: config.cleanup_sample_modulus,
        }
    }
}

/// Lowercase hex SHA-256 of `api_key || timestamp || nonce || body`.
pub fn request_signature(api_key: &str, timestamp: &str, nonce: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(nonce.as_bytes());
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Blank header values count as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub struct AuthGuard {
    settings: AuthSettings,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl AuthGuard {
    pub fn new(settings: AuthSettings, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { settings, storage, clock }
    }

    pub fn require_signature(&self) -> bool {
        self.settings.require_signature
    }

    pub fn request_expiry_secs(&self) -> u64 {
        self.settings.request_expiry_secs
    }

    pub fn verify(&self, request: &AuthRequest<'_>) -> Result<()> {
        let api_key = present(request.api_key).ok_or_else(|| CustodyError::authentication("API key required"))?;
        if !constant_time_eq(api_key, self.settings.api_secret.expose_secret()) {
            return Err(CustodyError::authentication("Invalid API key"));
        }
        if !self.settings.require_signature {
            return Ok(());
        }

        let headers = (present(request.signature), present(request.timestamp), present(request.nonce));
        let (Some(signature), Some(timestamp), Some(nonce)) = headers else {
            return Err(CustodyError::authentication("Missing signature headers (X-Signature, X-Timestamp, X-Nonce)"));
        };
        let request_ts: i64 = timestamp.trim().parse().map_err(|_| CustodyError::authentication("Invalid timestamp format"))?;

        let now = self.clock.now_secs();
        let skew = now.checked_sub(request_ts).map(i64::unsigned_abs).unwrap_or(u64::MAX);
        if skew > self.settings.request_expiry_secs {
            debug!("request expired timestamp={} now={} skew={}", request_ts, now, skew);
            return Err(CustodyError::RequestExpired { timestamp: request_ts, now, max_skew_secs: self.settings.request_expiry_secs });
        }

        let expected = request_signature(api_key, timestamp, nonce, request.body);
        if !constant_time_eq(signature, &expected) {
            return Err(CustodyError::authentication("Invalid signature"));
        }

        if self.storage.nonce_exists(nonce)? {
            warn!("replayed nonce rejected nonce={}", nonce);
            return Err(CustodyError::ReplayDetected);
        }
        let entry = UsedNonce { nonce: nonce.to_string(), timestamp: request_ts, created_at: now };
        if !self.storage.insert_nonce_if_absent(&entry)? {
            warn!("concurrent nonce reuse rejected nonce={}", nonce);
            return Err(CustodyError::ReplayDetected);
        }

        self.maybe_purge(now);
        Ok(())
    }

    /// Sampled cleanup: only when the current second is a multiple of `cleanup_sample_modulus`.
    fn maybe_purge(&self, now: i64) {
        let Ok(modulus) = i64::try_from(self.settings.cleanup_sample_modulus) else {
            return;
        };
        if modulus == 0 || now.rem_euclid(modulus) != 0 {
            return;
        }
        let cutoff = now.saturating_sub(i64::try_from(self.settings.nonce_retention_secs).unwrap_or(i64::MAX));
        match self.storage.purge_nonces_older_than(cutoff) {
            Ok(removed) => info!("nonce ledger purged removed={} cutoff={}", removed, cutoff),
            Err(err) => warn!("nonce ledger purge failed cutoff={} error={}", cutoff, err),
        }
    }
}
