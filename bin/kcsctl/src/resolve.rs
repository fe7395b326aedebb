//! ---
//! kcs_section: "05-external-interfaces"
//! kcs_subsection: "binary"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Control CLI for administrators inspecting console access control."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use kcs_common::config::AppConfig;
use kcs_iam::{ClusterSnapshot, GrantAggregator, IamMetrics, InMemoryBindingStore, Principal, Scope};
use kcs_logging::{kcs_info, LogContext};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::build_catalog;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Cluster snapshot (YAML or JSON) holding roles and bindings.
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Username whose bindings are resolved.
    #[arg(long)]
    user: String,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Print the metrics registry after resolving.
    #[arg(long)]
    print_metrics: bool,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ScopeArgs {
    /// Resolve role bindings inside one namespace.
    #[arg(long)]
    namespace: Option<String>,

    /// Resolve cluster role bindings owned by one workspace.
    #[arg(long)]
    workspace: Option<String>,

    /// Resolve cluster role bindings.
    #[arg(long)]
    cluster: bool,

    /// Resolve every namespace holding at least one capability.
    #[arg(long)]
    all_namespaces: bool,
}

#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Cluster snapshot (YAML or JSON) holding roles and bindings.
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    /// Role name.
    #[arg(long)]
    name: String,

    /// Namespace of the role; omit for a cluster role.
    #[arg(long)]
    namespace: Option<String>,
}

enum Target {
    Single(Scope),
    AllNamespaces,
}

impl ScopeArgs {
    fn target(&self) -> Result<Target> {
        match (&self.namespace, &self.workspace, self.cluster, self.all_namespaces) {
            (Some(namespace), None, false, false) => Ok(Target::Single(Scope::Namespace(namespace.clone()))),
            (None, Some(workspace), false, false) => Ok(Target::Single(Scope::Workspace(workspace.clone()))),
            (None, None, true, false) => Ok(Target::Single(Scope::Cluster)),
            (None, None, false, true) => Ok(Target::AllNamespaces),
            _ => Err(anyhow!(
                "exactly one of --namespace, --workspace, --cluster or --all-namespaces is required"
            )),
        }
    }
}

fn aggregator_from(
    snapshot: &Path,
    config: &AppConfig,
    metrics: Option<&IamMetrics>,
) -> Result<GrantAggregator> {
    let snapshot = ClusterSnapshot::from_path(snapshot)?;
    let store = InMemoryBindingStore::from_snapshot(snapshot).context("snapshot rejected")?;
    let catalog = build_catalog(config, metrics);
    let aggregator = GrantAggregator::new(Arc::new(store), Arc::new(catalog));
    Ok(match metrics {
        Some(metrics) => aggregator.with_metrics(metrics.clone()),
        None => aggregator,
    })
}

pub fn run(args: ResolveArgs, config: &AppConfig) -> Result<()> {
    let metrics = if config.metrics.enabled || args.print_metrics {
        Some(IamMetrics::new(Arc::new(Registry::new()))?)
    } else {
        None
    };
    let aggregator = aggregator_from(&args.snapshot, config, metrics.as_ref())?;
    let principal = Principal::new(args.user.as_str());

    let output = match args.scope.target()? {
        Target::Single(scope) => {
            let rules = aggregator.capabilities(&principal, &scope)?;
            let ctx = LogContext::new().with_principal(&principal.username);
            kcs_info!(context = ctx, "resolved {} categories in {}", rules.len(), scope);
            serde_json::to_value(rules)?
        }
        Target::AllNamespaces => serde_json::to_value(aggregator.namespace_capabilities(&principal)?)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    if args.print_metrics {
        if let Some(metrics) = &metrics {
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&metrics.registry().gather(), &mut buffer)?;
            print!("{}", String::from_utf8(buffer)?);
        }
    }
    Ok(())
}

pub fn run_role(args: RoleArgs, config: &AppConfig) -> Result<()> {
    let aggregator = aggregator_from(&args.snapshot, config, None)?;
    let rules = aggregator.role_capabilities(args.namespace.as_deref(), &args.name)?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}
