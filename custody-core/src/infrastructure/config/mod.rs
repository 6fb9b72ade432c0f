mod loader;
mod types;
pub mod validation;

pub use loader::{load_config, load_config_from_file, redact_url, CONFIG_FILE_NAME};
pub use types::*;

use crate::foundation::CustodyError;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "CUSTODY_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "CUSTODY_DATA_DIR";

pub fn resolve_config_path(data_dir: &Path) -> PathBuf {
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    data_dir.join(CONFIG_FILE_NAME)
}

pub fn resolve_data_dir() -> Result<PathBuf, CustodyError> {
    if let Ok(data_dir) = std::env::var(DATA_DIR_ENV) {
        let trimmed = data_dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    let cwd = std::env::current_dir()
        .map_err(|err| CustodyError::StorageError { operation: "env::current_dir".to_string(), details: err.to_string() })?;
    Ok(cwd.join(".custody"))
}

/// Loads configuration from the resolved data dir. Role-specific validation is left to the caller.
pub fn load_app_config() -> Result<AppConfig, CustodyError> {
    let data_dir = resolve_data_dir()?;
    let config_path = resolve_config_path(&data_dir);
    load_config_from_file(&config_path, &data_dir)
}
