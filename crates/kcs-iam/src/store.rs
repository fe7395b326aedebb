//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Binding and role lookups backing grant aggregation."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{Binding, ClusterRole, Role, ScopedBinding};

/// Errors returned by binding/role lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced object does not exist.
    #[error("{kind} {name} not found")]
    NotFound {
        /// Object kind.
        kind: &'static str,
        /// Object name, namespace-qualified for roles.
        name: String,
    },
    /// Backing store cannot serve reads.
    #[error("binding store unavailable: {0}")]
    Unavailable(String),
    /// Object rejected on insertion.
    #[error("invalid object: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Whether the error is a missing object rather than a backend failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Read access to role bindings, cluster role bindings, and the roles they reference.
///
/// Implementations are expected to serve from an externally synchronised
/// cache; every method is a read.
pub trait BindingStore: Send + Sync {
    /// Namespaces known to the store.
    fn list_namespaces(&self) -> Result<Vec<String>, StoreError>;

    /// Role bindings inside `namespace`.
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Binding>, StoreError>;

    /// All cluster role bindings, tagged with their scope.
    fn list_cluster_role_bindings(&self) -> Result<Vec<ScopedBinding>, StoreError>;

    /// Cluster role bindings owned by `workspace`.
    fn list_workspace_role_bindings(
        &self,
        workspace: &str,
    ) -> Result<Vec<ScopedBinding>, StoreError> {
        Ok(self
            .list_cluster_role_bindings()?
            .into_iter()
            .filter(|binding| binding.owned_by_workspace(workspace))
            .collect())
    }

    /// Role `name` in `namespace`.
    fn get_role(&self, namespace: &str, name: &str) -> Result<Role, StoreError>;

    /// Cluster role `name`.
    fn get_cluster_role(&self, name: &str) -> Result<ClusterRole, StoreError>;
}

/// Serialized cluster state used to seed an [`InMemoryBindingStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    /// Namespaces without bindings can be listed explicitly.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Namespaced roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Cluster roles.
    #[serde(default)]
    pub cluster_roles: Vec<ClusterRole>,
    /// Role bindings; each must carry a namespace.
    #[serde(default)]
    pub role_bindings: Vec<Binding>,
    /// Cluster role bindings.
    #[serde(default)]
    pub cluster_role_bindings: Vec<Binding>,
}

impl ClusterSnapshot {
    /// Load a snapshot from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read snapshot {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let snapshot = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse snapshot {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse snapshot {}", path.display()))?
        };
        Ok(snapshot)
    }
}

/// In-memory binding store suitable for development, tests, and offline tooling.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBindingStore {
    namespaces: Arc<RwLock<IndexSet<String>>>,
    roles: Arc<RwLock<HashMap<(String, String), Role>>>,
    cluster_roles: Arc<RwLock<HashMap<String, ClusterRole>>>,
    role_bindings: Arc<RwLock<HashMap<String, Vec<Binding>>>>,
    cluster_role_bindings: Arc<RwLock<Vec<ScopedBinding>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryBindingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding every object in the snapshot.
    pub fn from_snapshot(snapshot: ClusterSnapshot) -> Result<Self, StoreError> {
        let store = Self::new();
        for namespace in snapshot.namespaces {
            store.insert_namespace(namespace);
        }
        for role in snapshot.roles {
            store.insert_role(role);
        }
        for role in snapshot.cluster_roles {
            store.insert_cluster_role(role);
        }
        for binding in snapshot.role_bindings {
            store.insert_role_binding(binding)?;
        }
        for binding in snapshot.cluster_role_bindings {
            store.insert_cluster_role_binding(binding);
        }
        Ok(store)
    }

    /// Register a namespace.
    pub fn insert_namespace(&self, namespace: impl Into<String>) {
        self.namespaces.write().insert(namespace.into());
    }

    /// Insert or replace a role.
    pub fn insert_role(&self, role: Role) {
        self.insert_namespace(role.namespace.clone());
        self.roles
            .write()
            .insert((role.namespace.clone(), role.name.clone()), role);
    }

    /// Remove a role, leaving bindings that reference it dangling.
    pub fn remove_role(&self, namespace: &str, name: &str) -> bool {
        self.roles
            .write()
            .remove(&(namespace.to_owned(), name.to_owned()))
            .is_some()
    }

    /// Insert or replace a cluster role.
    pub fn insert_cluster_role(&self, role: ClusterRole) {
        self.cluster_roles.write().insert(role.name.clone(), role);
    }

    /// Remove a cluster role, leaving bindings that reference it dangling.
    pub fn remove_cluster_role(&self, name: &str) -> bool {
        self.cluster_roles.write().remove(name).is_some()
    }

    /// Add a namespaced role binding.
    pub fn insert_role_binding(&self, binding: Binding) -> Result<(), StoreError> {
        let namespace = binding.namespace.clone().ok_or_else(|| {
            StoreError::Invalid(format!("role binding {} has no namespace", binding.name))
        })?;
        self.insert_namespace(namespace.clone());
        self.role_bindings
            .write()
            .entry(namespace)
            .or_default()
            .push(binding);
        Ok(())
    }

    /// Add a cluster role binding, tagging its scope from owner references.
    pub fn insert_cluster_role_binding(&self, binding: Binding) {
        self.cluster_role_bindings
            .write()
            .push(ScopedBinding::from(binding));
    }

    /// Simulate the backing cache becoming unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }
}

impl BindingStore for InMemoryBindingStore {
    fn list_namespaces(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_online()?;
        Ok(self.namespaces.read().iter().cloned().collect())
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Binding>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .role_bindings
            .read()
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn list_cluster_role_bindings(&self) -> Result<Vec<ScopedBinding>, StoreError> {
        self.ensure_online()?;
        Ok(self.cluster_role_bindings.read().clone())
    }

    fn get_role(&self, namespace: &str, name: &str) -> Result<Role, StoreError> {
        self.ensure_online()?;
        self.roles
            .read()
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "Role",
                name: format!("{}/{}", namespace, name),
            })
    }

    fn get_cluster_role(&self, name: &str) -> Result<ClusterRole, StoreError> {
        self.ensure_online()?;
        self.cluster_roles
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind: "ClusterRole",
                name: name.to_owned(),
            })
    }
}
