use crate::cli::CommonArgs;
use custody_core::foundation::CustodyError;
use custody_core::infrastructure::config::{self, redact_url, AppConfig};
use custody_core::infrastructure::logging::init_logger;
use custody_core::infrastructure::rpc::{HttpNodeClient, NodeClient};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

pub fn init_logging(args: &CommonArgs) -> Result<(), CustodyError> {
    let log_dir = args.log_dir.as_ref().map(|dir| dir.to_string_lossy().into_owned());
    init_logger(log_dir.as_deref(), &args.log_level)
}

pub fn load_app_config() -> Result<AppConfig, CustodyError> {
    let app_config = config::load_app_config()?;
    info!("config loaded data_dir={} bind_addr={}", app_config.service.data_dir, app_config.service.bind_addr);
    Ok(app_config)
}

/// Logs every violation, then refuses to start if there were any.
pub fn ensure_valid(result: Result<(), Vec<String>>) -> Result<(), CustodyError> {
    match result {
        Ok(()) => Ok(()),
        Err(errors) => {
            for err in &errors {
                error!("config validation error: {}", err);
            }
            Err(CustodyError::ConfigError(format!("{} configuration error(s), first: {}", errors.len(), errors.first().map(String::as_str).unwrap_or(""))))
        }
    }
}

pub fn node_clients(urls: &[String], timeout: Duration) -> Result<Vec<Arc<dyn NodeClient>>, CustodyError> {
    urls.iter()
        .map(|url| {
            info!("node client configured url={} timeout_ms={}", redact_url(url), timeout.as_millis());
            HttpNodeClient::new(url.clone(), timeout).map(|client| Arc::new(client) as Arc<dyn NodeClient>)
        })
        .collect()
}
