//! ---
//! kcs_section: "01-core-functionality"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Shared primitives and utilities for the console backend."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Filter directive variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "KCS_LOG";

static GUARDS: OnceCell<Vec<WorkerGuard>> = OnceCell::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console log rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// One JSON object per event, for collectors.
    StructuredJson,
    /// Human-readable lines.
    #[default]
    Pretty,
}

/// Build the event filter: `KCS_LOG`, then `RUST_LOG`, then `info`.
///
/// An unparsable `KCS_LOG` is reported on stderr and ignored.
pub fn env_filter() -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_ENV) {
        match EnvFilter::try_new(&directive) {
            Ok(filter) => return filter,
            Err(err) => eprintln!("ignoring {}={:?}: {}", LOG_ENV, directive, err),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn console_layer(format: LogFormat, guards: &mut Vec<WorkerGuard>) -> BoxedLayer {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(guard);
    let layer = fmt::layer()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(writer);
    match format {
        LogFormat::StructuredJson => layer.with_target(false).json().boxed(),
        LogFormat::Pretty => layer.with_target(true).boxed(),
    }
}

fn file_layer(directory: &Path, prefix: &str, guards: &mut Vec<WorkerGuard>) -> Result<BoxedLayer> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("cannot create log directory {}", directory.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(daily(directory, format!("{}.log", prefix)));
    guards.push(guard);
    Ok(fmt::layer()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .with_writer(writer)
        .boxed())
}

/// Install the global subscriber for `service_name`.
///
/// Events go to stderr in the configured format so stdout stays free for
/// command output. With `config.directory` set, a daily rolling JSON file
/// named after `file_prefix` (or the service) is written there as well.
/// A subscriber installed earlier is left in place.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let mut guards = Vec::new();
    let mut layers = vec![console_layer(config.format, &mut guards)];
    if let Some(directory) = &config.directory {
        let prefix = config.file_prefix.as_deref().unwrap_or(service_name);
        layers.push(file_layer(directory, prefix, &mut guards)?);
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter())
        .try_init()
        .is_ok();
    if installed {
        let _ = GUARDS.set(guards);
        info!(
            service = %service_name,
            format = ?config.format,
            log_dir = ?config.directory,
            "tracing initialised"
        );
    }
    Ok(())
}
