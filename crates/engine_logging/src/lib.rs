#![deny(missing_docs)]
//! Shared logging utilities for the extractor workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the logger initialization used by the worker binary and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use serde::Deserialize;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogDestination {
    /// Write to the configured log file.
    File,
    /// Write to the terminal.
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger with the specified destination.
///
/// For `LogDestination::File` or `Both`, `log_file` is created (truncated if it
/// exists). If the file cannot be created, `File` logs nowhere and `Both`
/// falls back to the terminal only; a warning goes to stderr either way.
/// Calling this twice is harmless: the second call is ignored.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_file: &Path) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config, log_file) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![TermLogger::new(
            level,
            config,
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(level, config, log_file) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_file: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_file) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_file, err);
            None
        }
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritable_log_file_is_reported_not_fatal() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing_dir = temp.path().join("missing").join("worker.log");
        assert!(create_file_logger(LevelFilter::Info, build_config(), &missing_dir).is_none());
    }

    #[test]
    fn file_logger_creates_log_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("worker.log");
        assert!(create_file_logger(LevelFilter::Info, build_config(), &path).is_some());
        assert!(path.is_file());
    }

    #[test]
    fn terminal_is_the_default_destination() {
        assert_eq!(LogDestination::default(), LogDestination::Terminal);
    }
}
