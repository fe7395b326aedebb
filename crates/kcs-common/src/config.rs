//! ---
//! kcs_section: "01-core-functionality"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Shared primitives and utilities for the console backend."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

const DEFAULT_NAMESPACE_RULES: &str = "/etc/kubesphere/rules/rules.json";
const DEFAULT_CLUSTER_RULES: &str = "/etc/kubesphere/rules/clusterrules.json";

fn default_namespace_rules() -> PathBuf {
    PathBuf::from(DEFAULT_NAMESPACE_RULES)
}

fn default_cluster_rules() -> PathBuf {
    PathBuf::from(DEFAULT_CLUSTER_RULES)
}

/// Settings shared by the access-control core and its tooling.
///
/// Every section is optional in the TOML document; an empty document is a
/// valid configuration equal to [`AppConfig::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given explicitly by the caller.
    Explicit(PathBuf),
    /// Path named by `KCS_CONFIG`.
    Environment(PathBuf),
    /// First existing well-known location.
    Discovered(PathBuf),
    /// No document found; compiled defaults.
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path)
            | ConfigSource::Environment(path)
            | ConfigSource::Discovered(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "{}", path.display()),
            ConfigSource::Environment(path) => {
                write!(f, "{} (via {})", path.display(), AppConfig::ENV_CONFIG_PATH)
            }
            ConfigSource::Discovered(path) => write!(f, "{} (discovered)", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Configuration together with its [`ConfigSource`].
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: ConfigSource,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "KCS_CONFIG";

    /// Resolve the configuration document.
    ///
    /// Precedence: `explicit`, then `KCS_CONFIG`, then the first candidate
    /// that exists. Falling through all three yields the defaults. A path
    /// that was asked for explicitly (argument or variable) must be readable.
    pub fn discover<P: AsRef<Path>>(
        explicit: Option<&Path>,
        candidates: &[P],
    ) -> Result<LoadedAppConfig> {
        if let Some(path) = explicit {
            return Self::loaded(ConfigSource::Explicit(path.to_path_buf()));
        }
        if let Some(path) = env_path() {
            return Self::loaded(ConfigSource::Environment(path));
        }
        let discovered = candidates
            .iter()
            .map(|candidate| candidate.as_ref())
            .find(|path| path.is_file());
        match discovered {
            Some(path) => Self::loaded(ConfigSource::Discovered(path.to_path_buf())),
            None => {
                debug!("no configuration document found; using defaults");
                Ok(LoadedAppConfig {
                    config: AppConfig::default(),
                    source: ConfigSource::Defaults,
                })
            }
        }
    }

    fn loaded(source: ConfigSource) -> Result<LoadedAppConfig> {
        let path = source
            .path()
            .ok_or_else(|| anyhow!("configuration source {} has no path", source))?;
        let config = Self::from_file(path)?;
        Ok(LoadedAppConfig { config, source })
    }

    /// Parse and validate one TOML document.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "reading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("invalid configuration {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.logging.validate()
    }
}

fn env_path() -> Option<PathBuf> {
    std::env::var_os(AppConfig::ENV_CONFIG_PATH)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: AppConfig = toml::from_str(content).context("malformed configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Locations of the optional capability catalog override documents.
///
/// Each document is read once at process start. A missing or unusable
/// document leaves the compiled-in defaults for that scope in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Override for namespace-scoped categories.
    #[serde(default = "default_namespace_rules")]
    pub namespace_rules: PathBuf,
    /// Override for cluster and workspace scoped categories.
    #[serde(default = "default_cluster_rules")]
    pub cluster_rules: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            namespace_rules: default_namespace_rules(),
            cluster_rules: default_cluster_rules(),
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        for (key, path) in [
            ("catalog.namespace_rules", &self.namespace_rules),
            ("catalog.cluster_rules", &self.cluster_rules),
        ] {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("{} must name a file", key));
            }
        }
        Ok(())
    }
}

/// Log output. Events always go to stderr; a rolling file is added when
/// `directory` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    /// File name prefix; the service name when unset.
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.file_prefix, Some(prefix) if prefix.trim().is_empty()) {
            return Err(anyhow!("logging.file_prefix must not be blank"));
        }
        Ok(())
    }
}

/// Prometheus counters for resolutions, stale bindings and catalog overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.catalog, CatalogConfig::default());
        assert_eq!(
            config.catalog.namespace_rules,
            PathBuf::from(DEFAULT_NAMESPACE_RULES)
        );
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.directory.is_none());
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn catalog_paths_can_be_overridden() {
        let config: AppConfig = r#"
            [catalog]
            namespace_rules = "/opt/kcs/rules.json"

            [logging]
            format = "structured-json"
            directory = "/var/log/kcs"
        "#
        .parse()
        .unwrap();
        assert_eq!(
            config.catalog.namespace_rules,
            PathBuf::from("/opt/kcs/rules.json")
        );
        assert_eq!(
            config.catalog.cluster_rules,
            PathBuf::from(DEFAULT_CLUSTER_RULES)
        );
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
        assert_eq!(config.logging.directory, Some(PathBuf::from("/var/log/kcs")));
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!("[catalog]\ncluster_rules = \"\"\n".parse::<AppConfig>().is_err());
        assert!("[logging]\nfile_prefix = \" \"\n".parse::<AppConfig>().is_err());
        assert!("[catalogue]\n".parse::<AppConfig>().is_err());
    }

    #[test]
    fn explicit_path_wins_over_candidates() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let candidate = dir.path().join("kcs.toml");
        fs::write(&explicit, "[metrics]\nenabled = true\n").unwrap();
        fs::write(&candidate, "").unwrap();

        let loaded = AppConfig::discover(Some(explicit.as_path()), &[&candidate]).unwrap();
        assert_eq!(loaded.source, ConfigSource::Explicit(explicit));
        assert!(loaded.config.metrics.enabled);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = AppConfig::discover::<&Path>(Some(missing.as_path()), &[]).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn first_existing_candidate_is_used() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("kcs.toml");
        fs::write(&present, "[metrics]\nenabled = true\n").unwrap();

        let loaded = AppConfig::discover(None, &[&missing, &present]).unwrap();
        if loaded.source == ConfigSource::Discovered(present.clone()) {
            assert!(loaded.config.metrics.enabled);
        } else {
            // KCS_CONFIG set in the surrounding environment takes precedence.
            assert!(matches!(loaded.source, ConfigSource::Environment(_)));
        }
    }

    #[test]
    fn source_display_names_origin() {
        assert_eq!(ConfigSource::Defaults.to_string(), "built-in defaults");
        assert_eq!(
            ConfigSource::Discovered(PathBuf::from("kcs.toml")).to_string(),
            "kcs.toml (discovered)"
        );
    }
}
