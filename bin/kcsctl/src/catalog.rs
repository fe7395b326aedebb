//! ---
//! kcs_section: "05-external-interfaces"
//! kcs_subsection: "binary"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Control CLI for administrators inspecting console access control."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand, ValueEnum};
use kcs_common::config::AppConfig;
use kcs_iam::{expand, CatalogScope, SimpleRule};
use serde_json::json;

use crate::build_catalog;

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// Print the effective catalog as JSON.
    Show(ShowArgs),
    /// Expand capability selections into the policy rules they require.
    Expand(ExpandArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Namespace,
    Cluster,
}

impl From<ScopeArg> for CatalogScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Namespace => CatalogScope::Namespace,
            ScopeArg::Cluster => CatalogScope::Cluster,
        }
    }
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Limit output to one catalog list.
    #[arg(long, value_enum)]
    scope: Option<ScopeArg>,
}

#[derive(Debug, Args)]
pub struct ExpandArgs {
    /// Catalog list the selections refer to.
    #[arg(long, value_enum, default_value_t = ScopeArg::Namespace)]
    scope: ScopeArg,

    /// Selection expressed as CATEGORY=ACTION[,ACTION].
    #[arg(long = "select", value_name = "SELECTION", required = true, num_args = 1..)]
    selections: Vec<String>,
}

pub fn run(command: CatalogCommand, config: &AppConfig) -> Result<()> {
    let catalog = build_catalog(config, None);
    let output = match command {
        CatalogCommand::Show(args) => match args.scope {
            Some(scope) => serde_json::to_value(catalog.categories(scope.into()))?,
            None => json!({
                "namespace": catalog.namespace_categories(),
                "cluster": catalog.cluster_categories(),
            }),
        },
        CatalogCommand::Expand(args) => {
            let selections = args
                .selections
                .iter()
                .map(|selection| parse_selection(selection))
                .collect::<Result<Vec<_>>>()?;
            let rules = expand(&selections, catalog.categories(args.scope.into()))?;
            serde_json::to_value(rules)?
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_selection(selection: &str) -> Result<SimpleRule> {
    let (category, actions) = selection
        .split_once('=')
        .ok_or_else(|| anyhow!("selection '{}' must be CATEGORY=ACTION[,ACTION]", selection))?;
    let category = category.trim();
    let actions: Vec<String> = actions
        .split(',')
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .map(str::to_owned)
        .collect();
    if category.is_empty() || actions.is_empty() {
        return Err(anyhow!("selection '{}' names no category or action", selection));
    }
    Ok(SimpleRule {
        name: category.to_owned(),
        actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_actions() {
        let rule = parse_selection("deployments=view, scale").unwrap();
        assert_eq!(rule, SimpleRule::new("deployments", &["view", "scale"]));
    }

    #[test]
    fn malformed_selection_is_rejected() {
        assert!(parse_selection("deployments").is_err());
        assert!(parse_selection("=view").is_err());
        assert!(parse_selection("deployments=").is_err());
    }
}
