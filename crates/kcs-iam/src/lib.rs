//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
#![warn(missing_docs)]

//! Capability resolution for the console backend.
//!
//! Kubernetes-style policy rules bound to a principal are aggregated per
//! scope (namespace, cluster, workspace) and projected onto a catalog of
//! named product capabilities such as "view deployments" or "scale
//! statefulsets".

pub mod aggregator;
pub mod catalog;
pub mod expander;
pub mod matcher;
pub mod metrics;
pub mod policy;
pub mod resolver;
pub mod store;

pub use aggregator::{AggregateError, GrantAggregator};
pub use catalog::{Action, Catalog, CatalogError, CatalogLoadReport, CatalogScope, CatalogSource, Category};
pub use expander::expand;
pub use matcher::{satisfies, satisfies_all};
pub use metrics::IamMetrics;
pub use policy::{
    Binding, BindingScope, ClusterRole, OwnerReference, PolicyRule, Principal, Role, RoleRef,
    RoleRefKind, Scope, ScopedBinding, SimpleRule, Subject,
};
pub use resolver::{resolve, resolve_role};
pub use store::{BindingStore, ClusterSnapshot, InMemoryBindingStore, StoreError};
