//! Logging setup shared by the relay and the CLI.
//!
//! ```ignore
//! use dayboard_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::server())?;
//! ```
//!
//! `RUST_LOG` wins over the profile's level unless an explicit directive is
//! set with [`TracingConfig::with_directive`].

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Every crate in the workspace logs under a `dayboard*` target.
const TARGET_PREFIX: &str = "dayboard";

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),
}

/// Line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, for reading by eye.
    #[default]
    Pretty,
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for `dayboard*` targets.
    pub level: Level,
    pub format: TracingOutputFormat,
    pub show_source: bool,
    pub show_target: bool,
    pub timestamps: bool,
    /// Log span open/close, e.g. around refresh attempts.
    pub span_events: bool,
    /// Filter directive replacing both `level` and `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Pretty,
            show_source: false,
            show_target: true,
            timestamps: true,
            span_events: false,
            directive: None,
        }
    }
}

impl TracingConfig {
    /// Interactive commands: compact, warnings only unless `debug`.
    #[must_use]
    pub fn cli(debug: bool) -> Self {
        Self {
            level: if debug { Level::DEBUG } else { Level::WARN },
            format: TracingOutputFormat::Compact,
            show_source: debug,
            show_target: false,
            timestamps: false,
            ..Self::default()
        }
    }

    /// The long-running relay.
    #[must_use]
    pub fn server() -> Self {
        Self {
            format: TracingOutputFormat::Compact,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: TracingOutputFormat) -> Self {
        Self { format, ..self }
    }

    #[must_use]
    pub fn with_directive(self, directive: impl Into<String>) -> Self {
        Self {
            directive: Some(directive.into()),
            ..self
        }
    }

    /// Filter applied when neither a directive nor `RUST_LOG` is given.
    pub fn fallback_directive(&self) -> String {
        format!("{TARGET_PREFIX}={}", self.level)
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.fallback_directive())))
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails when a subscriber is already installed or the directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_target(config.show_target)
        .with_file(config.show_source)
        .with_line_number(config.show_source)
        .with_span_events(spans);

    let layer = match config.format {
        TracingOutputFormat::Json => base.json().boxed(),
        TracingOutputFormat::Pretty if config.timestamps => base.pretty().boxed(),
        TracingOutputFormat::Pretty => base.pretty().without_time().boxed(),
        TracingOutputFormat::Compact if config.timestamps => base.compact().boxed(),
        TracingOutputFormat::Compact => base.compact().without_time().boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_profile_is_quiet_unless_debug() {
        let quiet = TracingConfig::cli(false);
        assert_eq!(quiet.level, Level::WARN);
        assert_eq!(quiet.format, TracingOutputFormat::Compact);
        assert!(!quiet.timestamps);

        let debug = TracingConfig::cli(true);
        assert_eq!(debug.level, Level::DEBUG);
        assert!(debug.show_source);
    }

    #[test]
    fn server_profile_keeps_timestamps() {
        let server = TracingConfig::server();
        assert_eq!(server.level, Level::INFO);
        assert!(server.timestamps);
        assert!(server.show_target);
        assert_eq!(server.fallback_directive(), "dayboard=INFO");
    }

    #[test]
    fn builders_only_touch_their_field() {
        let config = TracingConfig::server()
            .with_format(TracingOutputFormat::Json)
            .with_level(Level::DEBUG);
        assert_eq!(config.format, TracingOutputFormat::Json);
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.timestamps);
        assert!(config.directive.is_none());
    }

    #[test]
    fn explicit_directive_is_validated() {
        let ok = TracingConfig::default().with_directive("dayboard_server=trace,tower_http=debug");
        assert!(ok.filter().is_ok());

        let bad = TracingConfig::default().with_directive("dayboard=notalevel");
        assert!(matches!(bad.filter(), Err(TracingError::Directive(_))));
    }
}
