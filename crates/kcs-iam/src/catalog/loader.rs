//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Capability catalog mapping categories and actions to required rules."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use kcs_common::config::CatalogConfig;
use tracing::{debug, warn};

use super::{defaults, Catalog, CatalogError, CatalogScope, Category};

/// Where one catalog list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Override document replaced the compiled-in list.
    Override {
        /// Document path.
        path: PathBuf,
    },
    /// Override document absent or unreadable; defaults kept.
    Missing {
        /// Document path.
        path: PathBuf,
    },
    /// Override document did not parse; defaults kept.
    Invalid {
        /// Document path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
    /// Override document parsed to an empty list; defaults kept.
    Empty {
        /// Document path.
        path: PathBuf,
    },
}

impl CatalogSource {
    /// Whether the override was applied.
    pub fn is_override(&self) -> bool {
        matches!(self, CatalogSource::Override { .. })
    }
}

/// Outcome for one catalog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogListReport {
    /// Which list.
    pub scope: CatalogScope,
    /// Where it came from.
    pub source: CatalogSource,
    /// Number of categories in the effective list.
    pub categories: usize,
}

/// Diagnostics produced while building a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLoadReport {
    /// Namespace list outcome.
    pub namespace: CatalogListReport,
    /// Cluster list outcome.
    pub cluster: CatalogListReport,
}

impl CatalogLoadReport {
    /// Number of lists replaced by override documents.
    pub fn overrides_applied(&self) -> usize {
        [&self.namespace, &self.cluster]
            .iter()
            .filter(|list| list.source.is_override())
            .count()
    }
}

impl Catalog {
    /// Build the catalog from compiled defaults and optional override documents.
    ///
    /// A document that reads and parses into a non-empty list replaces the
    /// corresponding default list wholesale. Any other outcome keeps the
    /// defaults without surfacing an error.
    pub fn load(config: &CatalogConfig) -> Self {
        Self::load_with_report(config).0
    }

    /// Same as [`Catalog::load`], also returning what happened to each list.
    pub fn load_with_report(config: &CatalogConfig) -> (Self, CatalogLoadReport) {
        let (namespace_categories, namespace) = load_list(
            CatalogScope::Namespace,
            &config.namespace_rules,
            defaults::namespace_categories,
        );
        let (cluster_categories, cluster) = load_list(
            CatalogScope::Cluster,
            &config.cluster_rules,
            defaults::cluster_categories,
        );
        (
            Catalog::new(namespace_categories, cluster_categories),
            CatalogLoadReport { namespace, cluster },
        )
    }
}

fn load_list(
    scope: CatalogScope,
    path: &Path,
    defaults: fn() -> Vec<Category>,
) -> (Vec<Category>, CatalogListReport) {
    let (categories, source) = match read_categories(path) {
        Ok(categories) if !categories.is_empty() => {
            debug!(%scope, path = %path.display(), categories = categories.len(), "catalog override applied");
            (
                categories,
                CatalogSource::Override {
                    path: path.to_path_buf(),
                },
            )
        }
        Ok(_) => {
            debug!(%scope, path = %path.display(), "catalog override empty; keeping defaults");
            (
                defaults(),
                CatalogSource::Empty {
                    path: path.to_path_buf(),
                },
            )
        }
        Err(CatalogError::Json(err)) => {
            warn!(%scope, path = %path.display(), error = %err, "catalog override unparsable; keeping defaults");
            (
                defaults(),
                CatalogSource::Invalid {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                },
            )
        }
        Err(err) => {
            debug!(%scope, path = %path.display(), error = %err, "catalog override not readable; keeping defaults");
            (
                defaults(),
                CatalogSource::Missing {
                    path: path.to_path_buf(),
                },
            )
        }
    };
    let report = CatalogListReport {
        scope,
        source,
        categories: categories.len(),
    };
    (categories, report)
}

fn read_categories(path: &Path) -> Result<Vec<Category>, CatalogError> {
    let contents = fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}
