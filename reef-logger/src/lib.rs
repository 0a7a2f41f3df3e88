//! Structured-logging bootstrap shared by services embedding the Reef SDK.
//!
//! The SDK itself only emits `tracing` events; installing a subscriber is
//! the embedding service's call. This crate offers the one everyone uses:
//! level directives via `EnvFilter`, plain or JSON output, stdout or file.

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*, Registry};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// An `EnvFilter` directive string, e.g. `info` or `reef_sdk=debug,info`.
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: Option<String>,
}

/// Installs the global subscriber described by `config`.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter);

    match config.output {
        LogOutput::File => {
            let path = config
                .file_path
                .as_deref()
                .context("log output is 'file' but 'file_path' is not set")?;
            let log_file =
                File::create(path).with_context(|| format!("creating log file {path}"))?;
            let writer = Arc::new(log_file);
            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(writer).with_ansi(false).json())
                    .init(),
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .init(),
            }
        }
        LogOutput::Stdout => match config.format {
            LogFormat::Json => subscriber.with(fmt::layer().json()).init(),
            LogFormat::Plain => subscriber.with(fmt::layer().compact()).init(),
        },
    }

    Ok(())
}
