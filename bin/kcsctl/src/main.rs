//! ---
//! kcs_section: "05-external-interfaces"
//! kcs_subsection: "binary"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Control CLI for administrators inspecting console access control."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kcs_common::config::AppConfig;
use kcs_common::init_tracing;
use kcs_iam::{Catalog, CatalogSource, IamMetrics};
use kcs_logging::{log_system_event, SystemEventOutcome};
use tracing::debug;

mod catalog;
mod resolve;

const CONFIG_CANDIDATES: [&str; 2] = ["kcs.toml", "/etc/kcs/kcs.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "KCS access-control inspection utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to KCS_CONFIG, ./kcs.toml, then /etc/kcs/kcs.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Capability catalog inspection")]
    Catalog(catalog::CatalogCommand),
    #[command(about = "Resolve a principal's capabilities against a cluster snapshot")]
    Resolve(resolve::ResolveArgs),
    #[command(about = "Show the capabilities conferred by a single role")]
    Role(resolve::RoleArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = AppConfig::discover(cli.config.as_deref(), &CONFIG_CANDIDATES[..])?;
    init_tracing("kcsctl", &loaded.config.logging)?;
    debug!(source = %loaded.source, "configuration loaded");
    let config = loaded.config;
    match cli.command {
        Commands::Catalog(cmd) => catalog::run(cmd, &config)?,
        Commands::Resolve(args) => resolve::run(args, &config)?,
        Commands::Role(args) => resolve::run_role(args, &config)?,
    }
    Ok(())
}

/// Build the catalog once, reporting how each list was sourced.
pub(crate) fn build_catalog(config: &AppConfig, metrics: Option<&IamMetrics>) -> Catalog {
    let (catalog, report) = Catalog::load_with_report(&config.catalog);
    for list in [&report.namespace, &report.cluster] {
        let (message, outcome) = match &list.source {
            CatalogSource::Override { path } => (
                format!("{} catalog loaded from {}", list.scope, path.display()),
                SystemEventOutcome::Success,
            ),
            CatalogSource::Missing { .. } | CatalogSource::Empty { .. } => (
                format!("{} catalog using compiled defaults", list.scope),
                SystemEventOutcome::Success,
            ),
            CatalogSource::Invalid { path, reason } => (
                format!(
                    "{} catalog override {} ignored: {}",
                    list.scope,
                    path.display(),
                    reason
                ),
                SystemEventOutcome::Degraded,
            ),
        };
        log_system_event(None, "catalog.load", &message, outcome);
    }
    if let Some(metrics) = metrics {
        metrics.record_catalog_overrides(report.overrides_applied());
    }
    catalog
}
