//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
//! Collects the rules bound to a principal within one scope and projects
//! them onto the capability catalog.

use std::sync::Arc;

use indexmap::IndexMap;
use kcs_logging::{kcs_debug, kcs_warn, LogContext};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogScope};
use crate::metrics::IamMetrics;
use crate::policy::{Binding, PolicyRule, Principal, RoleRefKind, Scope, ScopedBinding, SimpleRule};
use crate::resolver::{resolve, resolve_role};
use crate::store::{BindingStore, StoreError};

/// Errors surfaced by grant aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Binding or role lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregates grants from a [`BindingStore`] and resolves them against a [`Catalog`].
#[derive(Clone)]
pub struct GrantAggregator {
    store: Arc<dyn BindingStore>,
    catalog: Arc<Catalog>,
    metrics: Option<IamMetrics>,
}

impl GrantAggregator {
    /// Create an aggregator over the given store and catalog.
    pub fn new(store: Arc<dyn BindingStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            catalog,
            metrics: None,
        }
    }

    /// Record resolution activity into `metrics`.
    pub fn with_metrics(mut self, metrics: IamMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Catalog used for projections.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rules bound to `principal` within `scope`.
    ///
    /// Bindings whose role no longer exists are skipped. Any other lookup
    /// failure aborts the aggregation.
    pub fn aggregate(
        &self,
        principal: &Principal,
        scope: &Scope,
    ) -> Result<Vec<PolicyRule>, AggregateError> {
        let grants = match scope {
            Scope::Namespace(namespace) => self.namespace_grants(principal, namespace)?,
            Scope::Cluster => {
                let ctx = LogContext::new().with_principal(&principal.username);
                let bindings = self.store.list_cluster_role_bindings()?;
                self.cluster_grants(principal, bindings, &ctx)?
            }
            Scope::Workspace(workspace) => {
                let ctx = LogContext::new()
                    .with_principal(&principal.username)
                    .with_workspace(workspace);
                let bindings = self.store.list_workspace_role_bindings(workspace)?;
                self.cluster_grants(principal, bindings, &ctx)?
            }
        };
        if let Some(metrics) = &self.metrics {
            metrics.inc_resolution();
        }
        Ok(grants)
    }

    /// Capabilities `principal` holds within `scope`.
    pub fn capabilities(
        &self,
        principal: &Principal,
        scope: &Scope,
    ) -> Result<Vec<SimpleRule>, AggregateError> {
        let grants = self.aggregate(principal, scope)?;
        let categories = self.catalog.categories(CatalogScope::from(scope));
        Ok(resolve(&grants, categories))
    }

    /// Capabilities per namespace, for every namespace where `principal`
    /// holds at least one.
    pub fn namespace_capabilities(
        &self,
        principal: &Principal,
    ) -> Result<IndexMap<String, Vec<SimpleRule>>, AggregateError> {
        let mut result = IndexMap::new();
        for namespace in self.store.list_namespaces()? {
            let rules = self.capabilities(principal, &Scope::Namespace(namespace.clone()))?;
            if !rules.is_empty() {
                result.insert(namespace, rules);
            }
        }
        Ok(result)
    }

    /// Capabilities conferred by one role, looked up by name.
    ///
    /// `namespace` selects a namespaced role; `None` selects a cluster role
    /// projected onto the cluster catalog. A missing role is an error here.
    pub fn role_capabilities(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Vec<SimpleRule>, AggregateError> {
        let (rules, scope) = match namespace {
            Some(namespace) => (
                self.store.get_role(namespace, name)?.rules,
                CatalogScope::Namespace,
            ),
            None => (
                self.store.get_cluster_role(name)?.rules,
                CatalogScope::Cluster,
            ),
        };
        Ok(resolve_role(&rules, self.catalog.categories(scope)))
    }

    fn namespace_grants(
        &self,
        principal: &Principal,
        namespace: &str,
    ) -> Result<Vec<PolicyRule>, AggregateError> {
        let ctx = LogContext::new()
            .with_principal(&principal.username)
            .with_namespace(namespace);
        let mut grants = Vec::new();
        for binding in self.store.list_role_bindings(namespace)? {
            if !binding.binds_user(&principal.username) {
                continue;
            }
            let lookup = match binding.role_ref.kind {
                RoleRefKind::Role => self.store.get_role(namespace, &binding.role_ref.name),
                RoleRefKind::ClusterRole => self
                    .store
                    .get_cluster_role(&binding.role_ref.name)
                    .map(|role| role.bind_to_namespace(namespace)),
            };
            if let Some(role) = self.tolerate_missing(lookup, &binding, &ctx)? {
                kcs_debug!(context = ctx, "binding {} grants role {}", binding.name, role.name);
                grants.extend(role.rules);
            }
        }
        Ok(grants)
    }

    fn cluster_grants(
        &self,
        principal: &Principal,
        bindings: Vec<ScopedBinding>,
        ctx: &LogContext,
    ) -> Result<Vec<PolicyRule>, AggregateError> {
        let mut grants = Vec::new();
        for scoped in bindings {
            let binding = scoped.binding;
            if !binding.binds_user(&principal.username) {
                continue;
            }
            if binding.role_ref.kind != RoleRefKind::ClusterRole {
                kcs_warn!(
                    context = ctx,
                    "skipping binding {}: cluster role binding references {} {}",
                    binding.name,
                    binding.role_ref.kind,
                    binding.role_ref.name
                );
                continue;
            }
            let lookup = self.store.get_cluster_role(&binding.role_ref.name);
            if let Some(role) = self.tolerate_missing(lookup, &binding, ctx)? {
                kcs_debug!(context = ctx, "binding {} grants cluster role {}", binding.name, role.name);
                grants.extend(role.rules);
            }
        }
        Ok(grants)
    }

    fn tolerate_missing<T>(
        &self,
        lookup: Result<T, StoreError>,
        binding: &Binding,
        ctx: &LogContext,
    ) -> Result<Option<T>, StoreError> {
        match lookup {
            Ok(role) => Ok(Some(role)),
            Err(err) if err.is_not_found() => {
                kcs_warn!(context = ctx, "skipping binding {}: {}", binding.name, err);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_stale_binding();
                }
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for GrantAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantAggregator")
            .field("catalog", &self.catalog)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
