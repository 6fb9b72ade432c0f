use clap::Args;
use custody_core::infrastructure::config::{CONFIG_PATH_ENV, DATA_DIR_ENV};
use std::path::PathBuf;

/// Flags shared by the coordinator and node binaries.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log filters, e.g. `info` or `info,custody_core=debug`
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Also write rolling log files into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl CommonArgs {
    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }
        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, data_dir);
        }
    }
}
