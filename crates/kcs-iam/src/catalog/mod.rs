//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Capability catalog mapping categories and actions to required rules."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
//! The capability catalog: an ordered table of categories, each holding
//! ordered actions, each requiring a list of policy rules.
//!
//! Two lists exist: namespace-scoped categories and cluster/workspace-scoped
//! categories. A [`Catalog`] is built once at startup and shared read-only.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::policy::{PolicyRule, Scope};

pub mod defaults;
pub mod loader;

pub use loader::{CatalogListReport, CatalogLoadReport, CatalogSource};

/// Named product capability and the rules it requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action name, e.g. `view` or `scale`.
    pub name: String,
    /// Required rules; all of them must be satisfied.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl Action {
    /// Construct an action.
    pub fn new(name: impl Into<String>, rules: Vec<PolicyRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

/// Group of actions on one kind of object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name, e.g. `deployments`.
    pub name: String,
    /// Actions in display order.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Category {
    /// Construct a category.
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    /// Look up an action by name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name == name)
    }
}

/// Selects one of the two catalog lists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CatalogScope {
    /// Categories evaluated against namespace grants.
    Namespace,
    /// Categories evaluated against cluster or workspace grants.
    Cluster,
}

impl From<&Scope> for CatalogScope {
    fn from(scope: &Scope) -> Self {
        match scope {
            Scope::Namespace(_) => CatalogScope::Namespace,
            Scope::Cluster | Scope::Workspace(_) => CatalogScope::Cluster,
        }
    }
}

/// Errors raised when looking entries up in the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No category with this name in the selected list.
    #[error("unknown capability category: {0}")]
    UnknownCategory(String),
    /// Category exists but has no such action.
    #[error("unknown action {action} in category {category}")]
    UnknownAction {
        /// Category searched.
        category: String,
        /// Action requested.
        action: String,
    },
    /// Override document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Override document is not a valid category list.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable capability catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    namespace_categories: Vec<Category>,
    cluster_categories: Vec<Category>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            defaults::namespace_categories(),
            defaults::cluster_categories(),
        )
    }
}

impl Catalog {
    /// Build a catalog from explicit lists.
    pub fn new(namespace_categories: Vec<Category>, cluster_categories: Vec<Category>) -> Self {
        Self {
            namespace_categories,
            cluster_categories,
        }
    }

    /// Namespace-scoped categories.
    pub fn namespace_categories(&self) -> &[Category] {
        &self.namespace_categories
    }

    /// Cluster and workspace scoped categories.
    pub fn cluster_categories(&self) -> &[Category] {
        &self.cluster_categories
    }

    /// Categories for the given list.
    pub fn categories(&self, scope: CatalogScope) -> &[Category] {
        match scope {
            CatalogScope::Namespace => &self.namespace_categories,
            CatalogScope::Cluster => &self.cluster_categories,
        }
    }

    /// Look up a category by name.
    pub fn category(&self, scope: CatalogScope, name: &str) -> Option<&Category> {
        self.categories(scope)
            .iter()
            .find(|category| category.name == name)
    }
}

/// Find an action in a category list, distinguishing the two lookup failures.
pub fn find_action<'a>(
    categories: &'a [Category],
    category: &str,
    action: &str,
) -> Result<&'a Action, CatalogError> {
    let found = categories
        .iter()
        .find(|candidate| candidate.name == category)
        .ok_or_else(|| CatalogError::UnknownCategory(category.to_owned()))?;
    found
        .action(action)
        .ok_or_else(|| CatalogError::UnknownAction {
            category: category.to_owned(),
            action: action.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_document_schema() {
        let categories: Vec<Category> = serde_json::from_value(json!([
            {
                "name": "deployments",
                "actions": [
                    {
                        "name": "view",
                        "rules": [
                            {"verbs": ["get", "list"], "apiGroups": ["apps"], "resources": ["deployments"]}
                        ]
                    }
                ]
            }
        ]))
        .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].actions[0].name, "view");
        assert_eq!(
            categories[0].actions[0].rules,
            vec![PolicyRule::new(&["get", "list"], &["apps"], &["deployments"])]
        );
    }

    #[test]
    fn default_lists_survive_json_round_trip() {
        let catalog = Catalog::default();
        for list in [catalog.namespace_categories(), catalog.cluster_categories()] {
            let document = serde_json::to_string(list).unwrap();
            let parsed: Vec<Category> = serde_json::from_str(&document).unwrap();
            assert_eq!(parsed.as_slice(), list);
        }
    }

    #[test]
    fn scope_selects_catalog_list() {
        assert_eq!(
            CatalogScope::from(&Scope::Namespace("demo".into())),
            CatalogScope::Namespace
        );
        assert_eq!(CatalogScope::from(&Scope::Cluster), CatalogScope::Cluster);
        assert_eq!(
            CatalogScope::from(&Scope::Workspace("ws".into())),
            CatalogScope::Cluster
        );
        assert_eq!("cluster".parse::<CatalogScope>().unwrap(), CatalogScope::Cluster);
        assert_eq!(CatalogScope::Namespace.to_string(), "namespace");
    }

    #[test]
    fn find_action_reports_missing_entries() {
        let catalog = Catalog::default();
        let categories = catalog.namespace_categories();
        assert!(find_action(categories, "deployments", "scale").is_ok());
        assert!(matches!(
            find_action(categories, "unicorns", "view"),
            Err(CatalogError::UnknownCategory(name)) if name == "unicorns"
        ));
        assert!(matches!(
            find_action(categories, "deployments", "teleport"),
            Err(CatalogError::UnknownAction { .. })
        ));
    }
}
