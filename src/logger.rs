//! Initialization of the application logger.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config;

// Keep nonblocking file appender work guard
static NONBLOCKING_WORK_GUARD_KEEP: OnceLock<WorkerGuard> = OnceLock::new();

const MODULE_WHITELIST: &[&str] = &["biblioteca", "tower_http", "reqwest"];

/// All log levels
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum LogLevel {
    /// The "off" level.
    #[serde(rename = "off")]
    Off,
    /// The "trace" level.
    #[serde(rename = "trace")]
    Trace,
    /// The "debug" level.
    #[serde(rename = "debug")]
    Debug,
    /// The "info" level.
    #[serde(rename = "info")]
    #[default]
    Info,
    /// The "warn" level.
    #[serde(rename = "warn")]
    Warn,
    /// The "error" level.
    #[serde(rename = "error")]
    Error,
}

/// Log output formats
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

/// Rotation policy of the file appender
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum Rotation {
    #[serde(rename = "minutely")]
    Minutely,
    #[serde(rename = "hourly")]
    #[default]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "never")]
    Never,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
        .fmt(f)
    }
}

impl From<Rotation> for tracing_appender::rolling::Rotation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Minutely => Self::MINUTELY,
            Rotation::Hourly => Self::HOURLY,
            Rotation::Daily => Self::DAILY,
            Rotation::Never => Self::NEVER,
        }
    }
}

/// Builds the filter directive: `RUST_LOG` wins, then the configured
/// override, then the configured level applied to the whitelisted modules.
fn env_filter(config: &config::Logger) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            config.override_filter.as_ref().map_or_else(
                || {
                    EnvFilter::try_new(
                        MODULE_WHITELIST
                            .iter()
                            .map(|m| format!("{m}={}", config.level))
                            .collect::<Vec<_>>()
                            .join(","),
                    )
                },
                EnvFilter::try_new,
            )
        })
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().to_string()))
}

fn init_layer<W2>(
    make_writer: W2,
    format: Format,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W2: for<'writer> MakeWriter<'writer> + Sync + Send + 'static,
{
    match format {
        Format::Compact => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .compact()
            .boxed(),
        Format::Pretty => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .pretty()
            .boxed(),
        Format::Json => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .json()
            .boxed(),
    }
}

/// Sets up the global tracing subscriber from the logger configuration.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init(config: &config::Logger) {
    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

    if let Some(file_appender_config) = config.file_appender.as_ref() {
        if file_appender_config.enable {
            let dir = file_appender_config
                .dir
                .as_ref()
                .map_or_else(|| "./logs".to_string(), ToString::to_string);

            let mut rolling_builder = tracing_appender::rolling::Builder::default()
                .max_log_files(file_appender_config.max_log_files)
                .rotation(file_appender_config.rotation.into());
            if let Some(prefix) = file_appender_config.filename_prefix.as_ref() {
                rolling_builder = rolling_builder.filename_prefix(prefix);
            }
            if let Some(suffix) = file_appender_config.filename_suffix.as_ref() {
                rolling_builder = rolling_builder.filename_suffix(suffix);
            }

            match rolling_builder.build(&dir) {
                Ok(file_appender) => {
                    if file_appender_config.non_blocking {
                        let (non_blocking_file_appender, work_guard) =
                            tracing_appender::non_blocking(file_appender);
                        if NONBLOCKING_WORK_GUARD_KEEP.set(work_guard).is_err() {
                            eprintln!("cannot lock for appender");
                        }
                        layers.push(init_layer(
                            non_blocking_file_appender,
                            file_appender_config.format,
                            false,
                        ));
                    } else {
                        layers.push(init_layer(
                            file_appender,
                            file_appender_config.format,
                            false,
                        ));
                    }
                }
                Err(err) => eprintln!("cannot create log file appender in `{dir}`: {err}"),
            }
        }
    }

    if config.enable {
        layers.push(init_layer(std::io::stdout, config.format, true));
    }

    if !layers.is_empty() {
        let _ = tracing_subscriber::registry()
            .with(layers)
            .with(env_filter(config))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_applied_to_whitelisted_modules() {
        let config = config::Logger {
            level: LogLevel::Debug,
            ..config::Logger::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            let filter = env_filter(&config).to_string();
            assert!(filter.contains("biblioteca=debug"));
            assert!(filter.contains("tower_http=debug"));
        }
    }

    #[test]
    fn configuration_names_deserialize() {
        let level: LogLevel = serde_yaml::from_str("warn").unwrap();
        assert_eq!(level, LogLevel::Warn);
        let format: Format = serde_yaml::from_str("json").unwrap();
        assert_eq!(format, Format::Json);
        let rotation: Rotation = serde_yaml::from_str("daily").unwrap();
        assert_eq!(rotation, Rotation::Daily);
    }
}
