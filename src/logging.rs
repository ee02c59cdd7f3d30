// Bookworm - Personal Library Tracker
// Copyright (C) 2025 Bookworm contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Structured logging
//!
//! The library only emits `tracing` events. Installing a subscriber is up to
//! the host: the CLI calls [`init_logging`], mobile hosts call it through the
//! bridges once at startup, tests usually don't bother.
//!
//! Events go to stderr so `--json` output on stdout stays parseable.

use crate::error::{BookwormError, Result};
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither a custom filter nor `RUST_LOG` is given
pub const DEFAULT_FILTER: &str = "bookworm_core=info,sqlx=warn";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for this crate, e.g. `debug`
    pub level: Option<String>,
    /// Full filter directive string, wins over `level` and `RUST_LOG`
    pub filter: Option<String>,
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: None,
            filter: None,
            display_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    /// Directive string this configuration resolves to
    ///
    /// Precedence: explicit filter, then level, then `RUST_LOG`, then
    /// [`DEFAULT_FILTER`].
    pub fn filter_directives(&self) -> String {
        if let Some(filter) = &self.filter {
            return filter.clone();
        }
        if let Some(level) = &self.level {
            return format!("bookworm_core={},sqlx=warn", level);
        }
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string())
    }
}

/// Install the global subscriber
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let directives = config.filter_directives();
    let filter = EnvFilter::try_new(&directives).map_err(|e| {
        BookwormError::InvalidConfiguration(format!("Invalid log filter '{}': {}", directives, e))
    })?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.display_target)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.display_target)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_target(config.display_target)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| BookwormError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        let config = LoggingConfig::default()
            .with_level("debug")
            .with_filter("bookworm_core=trace");
        assert_eq!(config.filter_directives(), "bookworm_core=trace");

        let config = LoggingConfig::default().with_level("warn");
        assert_eq!(config.filter_directives(), "bookworm_core=warn,sqlx=warn");
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default().with_format(LogFormat::Json).with_level("debug");

        // Another test may have installed a subscriber already
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(BookwormError::LoggingInit(_))));
    }
}
