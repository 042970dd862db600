//! Logging for the sample application.
//!
//! Records go to stdout (colored) and to `sample.log` in the log directory.
//! The per-exchange records written by every invoker use their own target so
//! they can be filtered separately from the rest of the sample's output.

use crate::error::SampleError;

use common::ErrorLocation;

use std::env;
use std::fmt::Display;
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};
use service_invoker::interceptor::logging::LOG_TARGET as EXCHANGE_TARGET;

static LOGGER_INSTALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "sample.log";

/// Overall level, e.g. `SAMPLE_LOG_LEVEL=warn`.
pub const LOG_LEVEL_VAR: &str = "SAMPLE_LOG_LEVEL";

/// Level of the per-exchange records, e.g. `SAMPLE_EXCHANGE_LOG_LEVEL=off`.
pub const EXCHANGE_LOG_LEVEL_VAR: &str = "SAMPLE_EXCHANGE_LOG_LEVEL";

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Parse a level name, falling back to `default` when absent or unknown.
pub fn parse_level(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(default)
}

fn level_from_env(var: &str, default: LevelFilter) -> LevelFilter {
    parse_level(env::var(var).ok().as_deref(), default)
}

/// Install the global logger. Later calls are no-ops.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or another logger is
/// already installed.
pub fn initialize(log_dir: &Path) -> Result<(), SampleError> {
    if LOGGER_INSTALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let level = level_from_env(LOG_LEVEL_VAR, DEFAULT_LEVEL);
    let exchange_level = level_from_env(EXCHANGE_LOG_LEVEL_VAR, level.max(LevelFilter::Info));

    let result = initialize_internal(log_dir, level, exchange_level);
    match &result {
        Ok(()) => info!("Logger initialized with level {level}, exchanges at {exchange_level}"),
        Err(_) => LOGGER_INSTALLED.store(false, Ordering::SeqCst),
    }
    result
}

#[track_caller]
pub(crate) fn initialize_internal(
    log_dir: &Path,
    level: LevelFilter,
    exchange_level: LevelFilter,
) -> Result<(), SampleError> {
    let location = ErrorLocation::from(Location::caller());
    let failure = |message: String| SampleError::Sample { message, location };

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME))
        .map_err(|e| failure(format!("Failed to create log file: {e}")))?;

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, message, record, colors.color(record.level()))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| write_line(out, message, record, record.level()))
        .chain(log_file);

    Dispatch::new()
        .level(level)
        .level_for(EXCHANGE_TARGET, exchange_level)
        .level_for("hyper_util", LevelFilter::Info)
        .level_for("reqwest", LevelFilter::Info)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| failure(format!("Failed to initialize logger: {e}")))
}

fn write_line(
    out: FormatCallback<'_>,
    message: &std::fmt::Arguments<'_>,
    record: &Record<'_>,
    level: impl Display,
) {
    out.finish(format_args!(
        "[{} - {level}] [{}] {message}",
        format_rfc3339(SystemTime::now()),
        record.target(),
    ))
}
