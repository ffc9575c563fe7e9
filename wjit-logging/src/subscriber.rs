//! Subscriber setup for runtime events.

use core::str::FromStr;
use std::env;

use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use wjit_error::Error;

use crate::level::LogLevel;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented output
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(Error::config_error("Invalid log format")),
        }
    }
}

impl LogFormat {
    /// Reads `RUST_LOG_FORMAT`, falling back to [`LogFormat::Pretty`] when it
    /// is unset or unrecognised.
    #[must_use]
    pub fn from_env() -> Self {
        env::var("RUST_LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` directives take precedence; `level` is the default directive
/// when `RUST_LOG` is absent. Returns `false` if a global subscriber was
/// already installed, which leaves the existing one in place.
pub fn init_tracing(level: LogLevel, format: LogFormat) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.to_tracing_level()).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = match format {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Compact => subscriber.compact().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
    };

    if installed.is_err() {
        return false;
    }
    tracing::debug!(level = level.as_str(), ?format, "tracing initialised");
    true
}
