//! Logging setup
//!
//! Log records go to two places: the terminal, with coloured level tags, and
//! the session's log file in plain text. Each destination has its own minimum
//! level so the file can hold per-tick detail while the terminal stays
//! readable.
//!
//! Every line is prefixed with the session time in seconds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Minimum levels for each log destination.
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub console_level: LevelFilter,
    pub file_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Levels below `INFO` cannot be disabled, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: LevelFilter::Debug,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Must only be called once per process.
pub fn logger_init(config: LoggerConfig, session: &Session) -> Result<(), LoggerInitError> {
    for level in [config.console_level, config.file_level].iter() {
        if *level < Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(*level));
        }
    }

    let log_file = fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}",
                session::get_elapsed_seconds(),
                coloured_level(record.level()),
                Body(message, record)
            ))
        })
        .level(config.console_level)
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}",
                session::get_elapsed_seconds(),
                level_tag(record.level()),
                Body(message, record)
            ))
        })
        .level(config.file_level)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!(
        "    Levels: console {:?}, file {:?}",
        config.console_level, config.file_level
    );
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Message body, prefixed by the target for debug and trace records.
struct Body<'a>(&'a fmt::Arguments<'a>, &'a Record<'a>);

impl<'a> fmt::Display for Body<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.1.level() > Level::Info {
            write!(f, "{}: {}", self.1.target(), self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

fn coloured_level(level: Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info => tag.normal(),
        Level::Warn => tag.yellow(),
        Level::Error => tag.red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_quiet_levels() {
        let session = Session {
            session_root: std::env::temp_dir(),
            arch_root: std::env::temp_dir(),
            log_file_path: std::env::temp_dir().join("logger_test_unused.log"),
        };

        let config = LoggerConfig {
            file_level: LevelFilter::Warn,
            ..LoggerConfig::default()
        };

        assert!(matches!(
            logger_init(config, &session),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
    }

    #[test]
    fn test_level_tags() {
        assert_eq!(level_tag(Level::Warn), "WRN");
        assert_eq!(coloured_level(Level::Info).to_string(), "INF");
    }
}
