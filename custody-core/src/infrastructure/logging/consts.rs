/// Main log file; one per process, placed in the configured log dir.
pub const LOG_FILE_NAME: &str = "custody.log";
/// Warn+error only.
pub const ERR_LOG_FILE_NAME: &str = "custody_err.log";

/// Console pattern: `timestamp [LEVEL] message [module]`.
pub const LOG_LINE_PATTERN_COLORED: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{h({l:5})}] {m} [{M}]{n}";

pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l:5}] {m} [{M}]{n}";

/// Rotate at 20 MB.
pub const LOG_FILE_MAX_SIZE: u64 = 20_000_000;

pub const LOG_FILE_MAX_ROLLS: u32 = 5;

/// Crates logged at the requested level by default; everything else is off unless opted in.
pub const WHITELISTED_CRATES: &[&str] = &["custody_core", "custody_service"];
