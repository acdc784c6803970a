//! Logging bootstrap.
//!
//! Libraries in this workspace only emit `tracing` events; binaries call
//! [`init_logging`] once at startup to install a subscriber.

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Output style for the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed
    Silent,
    /// Compact stderr output
    Development,
    /// Pretty output with thread ids and source locations
    Debug,
    /// One JSON object per event, for log shippers
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Unknown logging mode: {0}")]
    InvalidMode(String),
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            "json" => Ok(LoggingMode::Json),
            other => Err(LoggingError::InvalidMode(other.to_string())),
        }
    }
}

/// Install a global subscriber for `mode`.
///
/// The filter comes from `COURTSIDE_LOG_LEVEL`, then `RUST_LOG`, then a
/// per-mode default.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let result = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => Registry::default()
            .with(fmt::layer().with_target(false).compact())
            .with(env_filter("info"))
            .try_init(),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(env_filter("debug"))
            .try_init(),
        LoggingMode::Json => Registry::default()
            .with(fmt::layer().json().with_current_span(false))
            .with(env_filter("info"))
            .try_init(),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Read the mode from `COURTSIDE_LOG_MODE`, defaulting to development output.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("COURTSIDE_LOG_MODE")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LoggingMode::Development);

    init_logging(mode)
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("COURTSIDE_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[rstest]
    #[case("silent", LoggingMode::Silent)]
    #[case("dev", LoggingMode::Development)]
    #[case("Development", LoggingMode::Development)]
    #[case("debug", LoggingMode::Debug)]
    #[case(" JSON ", LoggingMode::Json)]
    fn test_parse_mode(#[case] raw: &str, #[case] expected: LoggingMode) {
        assert_eq!(raw.parse::<LoggingMode>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_mode() {
        assert!(matches!(
            "verbose".parse::<LoggingMode>(),
            Err(LoggingError::InvalidMode(_))
        ));
    }
}
