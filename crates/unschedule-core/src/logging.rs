//! Structured logging for the unschedule binaries.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::{LocalTime, UtcTime};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::config_directory;

const LOG_FILE_NAME: &str = "unschedule.log";
const FILTER_ENV_VAR: &str = "UNSCHEDULE_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingDestination {
    /// JSON lines in the log file plus human-readable records on stderr.
    FileAndStderr,
    /// JSON lines in the log file only.
    FileOnly,
    /// Human-readable records on stderr only.
    StderrOnly,
}

impl LoggingDestination {
    fn writes_file(self) -> bool {
        matches!(self, Self::FileAndStderr | Self::FileOnly)
    }

    fn writes_stderr(self) -> bool {
        matches!(self, Self::FileAndStderr | Self::StderrOnly)
    }
}

#[derive(Debug)]
struct LoggingState {
    _guard: Option<WorkerGuard>,
    log_path: Option<PathBuf>,
}

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to prepare log directory: {0}")]
    Io(#[from] io::Error),
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber and return the log file path, if any.
///
/// Only the first call installs anything; later calls report the path chosen
/// by the first.
pub fn init_logging(destination: LoggingDestination) -> Result<Option<&'static Path>, LoggingError> {
    if LOGGING_STATE.get().is_none() {
        let state = install(destination)?;
        // A racing caller may have won; its state stays.
        let _ = LOGGING_STATE.set(state);
    }
    Ok(current_log_path())
}

pub fn current_log_path() -> Option<&'static Path> {
    LOGGING_STATE
        .get()
        .and_then(|state| state.log_path.as_deref())
}

/// Directory holding `unschedule.log`.
pub fn log_directory() -> PathBuf {
    config_directory().join("logs")
}

fn install(destination: LoggingDestination) -> Result<LoggingState, LoggingError> {
    let filter = build_filter(env::var(FILTER_ENV_VAR).ok().as_deref())?;

    let mut guard = None;
    let mut log_path = None;
    let file_layer = if destination.writes_file() {
        let dir = log_directory();
        fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);
        log_path = Some(dir.join(LOG_FILE_NAME));
        Some(
            tracing_subscriber::fmt::layer()
                .event_format(
                    tracing_subscriber::fmt::format()
                        .json()
                        .with_timer(UtcTime::rfc_3339())
                        .with_level(true)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
        )
    } else {
        None
    };

    let stderr_layer = destination.writes_stderr().then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(
                tracing_subscriber::fmt::format()
                    .with_timer(LocalTime::rfc_3339())
                    .with_level(true)
                    .with_target(true)
                    .with_ansi(false),
            )
            .with_writer(io::stderr)
            .with_ansi(false)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    if let Some(path) = log_path.as_ref() {
        debug!(path = %path.display(), "structured logging enabled");
    }

    Ok(LoggingState {
        _guard: guard,
        log_path,
    })
}

/// `UNSCHEDULE_LOG` wins, then `RUST_LOG`, then the `warn` default.
fn build_filter(explicit: Option<&str>) -> Result<EnvFilter, ParseError> {
    if let Some(spec) = explicit.map(str::trim).filter(|spec| !spec.is_empty()) {
        return EnvFilter::try_new(spec);
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER),
    }
}
