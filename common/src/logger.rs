use std::{fmt, fs, path::Path, str::FromStr};

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Failed to create logs directory '{0}': {1}")]
    CreateDirectory(String, std::io::Error),
    #[error("Failed to open log file '{0}': {1}")]
    OpenFile(String, std::io::Error),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

// Override the level of a single module, written as `module=level`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub module: String,
    pub level: LogLevel,
}

impl FromStr for ModuleConfig {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (module, level) = value
            .split_once('=')
            .ok_or_else(|| format!("Invalid module config '{}', expected module=level", value))?;

        if module.is_empty() {
            return Err(format!("Empty module name in '{}'", value));
        }

        let level = LogLevel::from_str(level)
            .map_err(|_| format!("Invalid log level '{}' for module '{}'", level, module))?;

        Ok(Self {
            module: module.to_owned(),
            level,
        })
    }
}

impl fmt::Display for ModuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.module, self.level)
    }
}

pub fn default_logs_datetime_format() -> String {
    "[%Y-%m-%d] (%H:%M:%S%.3f)".to_owned()
}

pub fn default_logs_path() -> String {
    "logs/".to_owned()
}

#[derive(Debug, Clone)]
pub struct LoggerConfig<'a> {
    pub level: LogLevel,
    // Falls back to `level` when not set
    pub file_level: Option<LogLevel>,
    pub dir_path: &'a str,
    pub filename_log: &'a str,
    pub disable_file_logging: bool,
    pub disable_colors: bool,
    pub module_logs: &'a [ModuleConfig],
    pub datetime_format: &'a str,
}

// Noisy dependencies only log at warn unless explicitly overridden
const QUIET_MODULES: [&str; 4] = ["hyper", "reqwest", "rustls", "h2"];

fn apply_modules(mut dispatch: fern::Dispatch, modules: &[ModuleConfig]) -> fern::Dispatch {
    for module in QUIET_MODULES {
        dispatch = dispatch.level_for(module, LevelFilter::Warn);
    }

    for config in modules {
        dispatch = dispatch.level_for(config.module.clone(), config.level.into());
    }
    dispatch
}

// Install the global logger. Terminal output goes to stderr so stdout only
// carries command results.
pub fn setup_logger(config: LoggerConfig<'_>) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::Magenta);

    let datetime_format = config.datetime_format.to_owned();
    let disable_colors = config.disable_colors;
    let terminal = fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = chrono::Local::now().format(&datetime_format);
            if disable_colors {
                out.finish(format_args!(
                    "{} {} {} > {}",
                    now,
                    record.level(),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "{} {} {} > {}",
                    now,
                    colors.color(record.level()),
                    record.target(),
                    message
                ))
            }
        })
        .level(config.level.into())
        .chain(std::io::stderr());

    let mut base = fern::Dispatch::new().chain(apply_modules(terminal, config.module_logs));

    if !config.disable_file_logging {
        let dir = Path::new(config.dir_path);
        fs::create_dir_all(dir)
            .map_err(|e| LoggerError::CreateDirectory(config.dir_path.to_owned(), e))?;

        let file_path = dir.join(config.filename_log);
        let file = fern::log_file(&file_path)
            .map_err(|e| LoggerError::OpenFile(file_path.display().to_string(), e))?;

        let datetime_format = config.datetime_format.to_owned();
        let file_dispatch = fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{} {} {} > {}",
                    chrono::Local::now().format(&datetime_format),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(config.file_level.unwrap_or(config.level).into())
            .chain(file);

        base = base.chain(apply_modules(file_dispatch, config.module_logs));
    }

    base.apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_config_parse() {
        let config: ModuleConfig = "reelchain_client::executor=trace".parse().unwrap();
        assert_eq!(config.module, "reelchain_client::executor");
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.to_string(), "reelchain_client::executor=trace");
    }

    #[test]
    fn test_module_config_invalid() {
        assert!("reelchain".parse::<ModuleConfig>().is_err());
        assert!("=debug".parse::<ModuleConfig>().is_err());
        assert!("reelchain=loud".parse::<ModuleConfig>().is_err());
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::Off);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::Info);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    }
}
