//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (CUSTODY_* prefix)

use crate::foundation::CustodyError;
use crate::infrastructure::config::types::AppConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::{debug, info};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "custody.toml";

/// Environment variable prefix for config overrides.
///
/// Example: `CUSTODY_AUTH__REQUIRE_SIGNATURE` -> `auth.require_signature`
const ENV_PREFIX: &str = "CUSTODY_";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Load configuration from the default file in `data_dir` (`custody.toml`).
pub fn load_config(data_dir: &Path) -> Result<AppConfig, CustodyError> {
    let config_path = data_dir.join(CONFIG_FILE_NAME);
    load_config_from_file(&config_path, data_dir)
}

/// Load configuration from a specific file path.
pub fn load_config_from_file(path: &Path, data_dir: &Path) -> Result<AppConfig, CustodyError> {
    info!("loading configuration path={} data_dir={}", path.display(), data_dir.display());
    let figment = figment_base(path).merge(Env::prefixed(ENV_PREFIX).split("__"));
    let mut config: AppConfig = figment.extract().map_err(|e| CustodyError::ConfigError(format!("config extraction failed: {e}")))?;
    postprocess(&mut config, data_dir);
    debug!(
        "configuration loaded bind_addr={} node_urls={:?} chain_rpc={} require_signature={}",
        config.service.bind_addr,
        config.custody.node_urls.iter().map(|url| redact_url(url)).collect::<Vec<_>>(),
        config.chain.rpc_url.as_deref().map(redact_url).unwrap_or_else(|| "disabled".to_string()),
        config.auth.require_signature
    );
    Ok(config)
}

fn figment_base(path: &Path) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!("configuration file missing; using defaults and env only path={}", path.display());
    }
    figment
}

fn postprocess(config: &mut AppConfig, data_dir: &Path) {
    if config.service.data_dir.trim().is_empty() {
        config.service.data_dir = data_dir.to_string_lossy().to_string();
    }

    if config.service.bind_addr.trim().is_empty() {
        config.service.bind_addr = DEFAULT_BIND_ADDR.to_string();
    }

    for url in config.custody.node_urls.iter_mut().chain(config.node.peer_urls.iter_mut()) {
        *url = url.trim().trim_end_matches('/').to_string();
    }

    // An empty RPC URL from env means "no chain access", same as leaving it unset.
    if config.chain.rpc_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
        config.chain.rpc_url = None;
    }
}

pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let (scheme, rest) = url.split_at(scheme_end + 3);
    let Some(at) = rest.find('@') else {
        return url.to_string();
    };
    format!("{scheme}<redacted>@{}", &rest[at + 1..])
}
