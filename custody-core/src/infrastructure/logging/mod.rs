//! Logging setup on `log` + `log4rs`.
//!
//! Filter expressions are comma separated: a bare level applies to our own crates, `<module>=<level>`
//! opts a module in, and `root=<level>` opts in every third-party crate.

mod consts;

pub use consts::*;

use crate::foundation::CustodyError;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy},
            RollingFileAppender,
        },
    },
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::io::IsTerminal;
use std::path::Path;

const CONSOLE_APPENDER: &str = "stderr";
const LOG_FILE_APPENDER: &str = "log_file";
const ERR_LOG_FILE_APPENDER: &str = "err_log_file";

#[derive(Debug, PartialEq, Eq)]
struct LogFilters {
    app: LevelFilter,
    root: LevelFilter,
    modules: Vec<(String, LevelFilter)>,
}

/// Installs the global logger. Console output goes to stderr; `log_dir` adds rolling files.
///
/// A logger that is already installed is left in place.
pub fn init_logger(log_dir: Option<&str>, filters: &str) -> Result<(), CustodyError> {
    let filters = parse_filters(filters);

    let console_pattern = if std::io::stderr().is_terminal() { LOG_LINE_PATTERN_COLORED } else { LOG_LINE_PATTERN };
    let console =
        ConsoleAppender::builder().target(Target::Stderr).encoder(Box::new(PatternEncoder::new(console_pattern))).build();

    let mut builder = Config::builder().appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
    let mut appenders = vec![CONSOLE_APPENDER.to_string()];

    if let Some(dir) = log_dir.map(str::trim).filter(|dir| !dir.is_empty()) {
        let dir = Path::new(dir);
        builder = builder.appender(Appender::builder().build(LOG_FILE_APPENDER, Box::new(rolling_appender(dir, LOG_FILE_NAME)?)));
        builder = builder.appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Warn)))
                .build(ERR_LOG_FILE_APPENDER, Box::new(rolling_appender(dir, ERR_LOG_FILE_NAME)?)),
        );
        appenders.push(LOG_FILE_APPENDER.to_string());
        appenders.push(ERR_LOG_FILE_APPENDER.to_string());
    }

    let explicit = |name: &str| filters.modules.iter().any(|(module, _)| module == name);
    for crate_name in WHITELISTED_CRATES.iter().filter(|name| !explicit(**name)) {
        builder = builder.logger(Logger::builder().appenders(appenders.clone()).additive(false).build(*crate_name, filters.app));
    }
    for (module, level) in &filters.modules {
        builder = builder.logger(Logger::builder().appenders(appenders.clone()).additive(false).build(module, *level));
    }

    let config = builder
        .build(Root::builder().appenders(appenders).build(filters.root))
        .map_err(|err| CustodyError::ConfigError(format!("invalid logger config: {err}")))?;
    let _ = log4rs::init_config(config);
    Ok(())
}

fn rolling_appender(dir: &Path, file_name: &str) -> Result<RollingFileAppender, CustodyError> {
    let archive_pattern = dir.join(format!("{file_name}.{{}}.gz"));
    let archive_pattern = archive_pattern
        .to_str()
        .ok_or_else(|| CustodyError::ConfigError(format!("log dir is not valid UTF-8: {}", dir.display())))?;
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(archive_pattern, LOG_FILE_MAX_ROLLS)
        .map_err(|err| CustodyError::ConfigError(format!("log roller: {err}")))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(LOG_FILE_MAX_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN)))
        .build(dir.join(file_name), Box::new(policy))
        .map_err(CustodyError::from)
}

fn parse_filters(filters: &str) -> LogFilters {
    let mut parsed = LogFilters { app: LevelFilter::Info, root: LevelFilter::Off, modules: Vec::new() };
    let mut app_set = false;
    for part in filters.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('=') {
            None => {
                if !app_set {
                    if let Ok(level) = part.parse() {
                        parsed.app = level;
                        app_set = true;
                    }
                }
            }
            Some((module, level)) => {
                let (module, level) = (module.trim(), level.trim());
                let Ok(level) = level.parse::<LevelFilter>() else {
                    continue;
                };
                match module {
                    "" => {}
                    "root" => parsed.root = level,
                    _ => parsed.modules.push((module.to_string(), level)),
                }
            }
        }
    }
    parsed
}
