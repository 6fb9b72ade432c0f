use crate::foundation::SHARD_COUNT;
use crate::infrastructure::config::types::AppConfig;

use std::ops::RangeInclusive;

/// Node-to-node and coordinator-to-node calls.
const NODE_TIMEOUT_MS: RangeInclusive<u64> = 5_000..=10_000;
const RPC_TIMEOUT_MS: RangeInclusive<u64> = 1_000..=60_000;

impl AppConfig {
    /// Checks the settings a coordinator needs before it accepts traffic.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.auth.api_secret.trim().is_empty() {
            errors.push("auth.api_secret is required".to_string());
        }
        if self.auth.request_expiry_seconds == 0 {
            errors.push("auth.request_expiry_seconds must be > 0".to_string());
        }
        if self.auth.nonce_retention_seconds < self.auth.request_expiry_seconds.saturating_mul(2) {
            errors.push("auth.nonce_retention_seconds must cover the full timestamp window (2 x request_expiry_seconds)".to_string());
        }
        if self.auth.cleanup_sample_modulus == 0 {
            errors.push("auth.cleanup_sample_modulus must be > 0".to_string());
        }

        self.validate_custody(&mut errors);

        if self.custody.node_urls.len() != SHARD_COUNT {
            errors.push(format!("custody.node_urls must list exactly {SHARD_COUNT} nodes, got {}", self.custody.node_urls.len()));
        }
        for url in &self.custody.node_urls {
            if !is_http_url(url) {
                errors.push(format!("invalid custody.node_urls entry: {url}"));
            }
        }
        if self.custody.generate_quorum == 0 || self.custody.generate_quorum > SHARD_COUNT {
            errors.push(format!("custody.generate_quorum must be within 1..={SHARD_COUNT}"));
        }
        if self.custody.sign_required_shards == 0 || self.custody.sign_required_shards > SHARD_COUNT {
            errors.push(format!("custody.sign_required_shards must be within 1..={SHARD_COUNT}"));
        }
        check_timeout(&mut errors, "custody.node_timeout_ms", self.custody.node_timeout_ms, NODE_TIMEOUT_MS);

        if let Some(url) = self.chain.rpc_url.as_deref() {
            if !is_http_url(url) {
                errors.push(format!("invalid chain.rpc_url: {url}"));
            }
        }
        if self.chain.gas_limit == 0 {
            errors.push("chain.gas_limit must be > 0".to_string());
        }
        check_timeout(&mut errors, "chain.rpc_timeout_ms", self.chain.rpc_timeout_ms, RPC_TIMEOUT_MS);

        finish(errors)
    }

    /// Checks the settings a shard node needs. A missing shard is allowed; the node serves errors.
    pub fn validate_node(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.validate_custody(&mut errors);

        if self.node.node_id == 0 || usize::from(self.node.node_id) > SHARD_COUNT {
            errors.push(format!("node.node_id must be within 1..={SHARD_COUNT}, got {}", self.node.node_id));
        }
        if self.node.port == 0 {
            errors.push("node.port must be > 0".to_string());
        }
        if self.node.peer_urls.len() != SHARD_COUNT - 1 {
            errors.push(format!("node.peer_urls must list the other {} nodes, got {}", SHARD_COUNT - 1, self.node.peer_urls.len()));
        }
        for url in &self.node.peer_urls {
            if !is_http_url(url) {
                errors.push(format!("invalid node.peer_urls entry: {url}"));
            }
        }
        check_timeout(&mut errors, "node.peer_timeout_ms", self.node.peer_timeout_ms, NODE_TIMEOUT_MS);

        finish(errors)
    }

    fn validate_custody(&self, errors: &mut Vec<String>) {
        if self.custody.shard_passphrase.is_empty() {
            errors.push("custody.shard_passphrase is required".to_string());
        }
    }
}

fn check_timeout(errors: &mut Vec<String>, field: &str, value: u64, bounds: RangeInclusive<u64>) {
    if !bounds.contains(&value) {
        errors.push(format!("{field} must be within {}..={}, got {value}", bounds.start(), bounds.end()));
    }
}

fn is_http_url(url: &str) -> bool {
    let trimmed = url.trim();
    (trimmed.starts_with("http://") || trimmed.starts_with("https://")) && trimmed.len() > "https://".len()
}

fn finish(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
