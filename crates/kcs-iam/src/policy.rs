//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Value matching anything in a rule dimension.
pub const WILDCARD: &str = "*";

/// Subject kind identifying an individual user.
pub const USER_KIND: &str = "User";

/// Owner reference kind marking a cluster role binding as workspace-scoped.
pub const WORKSPACE_KIND: &str = "Workspace";

/// A grant or requirement unit in the Kubernetes RBAC shape.
///
/// `"*"` in any dimension matches every value of that dimension. An empty
/// `resource_names` list places no restriction on resource names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// Verbs such as `get`, `list`, `create`.
    #[serde(default)]
    pub verbs: Vec<String>,
    /// API groups; `""` is the core group.
    #[serde(default)]
    pub api_groups: Vec<String>,
    /// Resources, optionally with a `/subresource` suffix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Resource names the rule is restricted to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,
    /// Non-resource URL paths such as `/healthz`.
    #[serde(
        default,
        rename = "nonResourceURLs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub non_resource_urls: Vec<String>,
}

impl PolicyRule {
    /// Build a resource rule from verb, group, and resource lists.
    pub fn new(verbs: &[&str], api_groups: &[&str], resources: &[&str]) -> Self {
        Self {
            verbs: to_strings(verbs),
            api_groups: to_strings(api_groups),
            resources: to_strings(resources),
            ..Self::default()
        }
    }

    /// Build a non-resource URL rule.
    pub fn non_resource(verbs: &[&str], api_groups: &[&str], urls: &[&str]) -> Self {
        Self {
            verbs: to_strings(verbs),
            api_groups: to_strings(api_groups),
            non_resource_urls: to_strings(urls),
            ..Self::default()
        }
    }

    /// Restrict the rule to the given resource names.
    pub fn with_resource_names(mut self, names: &[&str]) -> Self {
        self.resource_names = to_strings(names);
        self
    }

    /// Rule granting every verb on every resource in every group.
    pub fn wildcard() -> Self {
        Self::new(&[WILDCARD], &[WILDCARD], &[WILDCARD])
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Namespaced role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, unique within its namespace.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Granted rules.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Cluster-wide role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRole {
    /// Role name, unique in the cluster.
    pub name: String,
    /// Granted rules.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl ClusterRole {
    /// Project the cluster role onto a namespace, as a role binding that
    /// references a cluster role only grants its rules inside that namespace.
    pub fn bind_to_namespace(&self, namespace: &str) -> Role {
        Role {
            name: self.name.clone(),
            namespace: namespace.to_owned(),
            rules: self.rules.clone(),
        }
    }
}

/// Kind of role a binding points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum RoleRefKind {
    /// Namespaced role.
    Role,
    /// Cluster role.
    ClusterRole,
}

/// Reference from a binding to the role it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// Referenced kind.
    pub kind: RoleRefKind,
    /// Referenced name.
    pub name: String,
}

/// Identity a binding applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// `User`, `Group` or `ServiceAccount`.
    pub kind: String,
    /// Subject name.
    pub name: String,
}

impl Subject {
    /// Construct a user subject.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: USER_KIND.to_owned(),
            name: name.into(),
        }
    }
}

/// Owner reference attached to a binding's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    /// Owner kind, e.g. `Workspace`.
    pub kind: String,
    /// Owner name.
    pub name: String,
}

impl OwnerReference {
    /// Construct an owner reference pointing at a workspace.
    pub fn workspace(name: impl Into<String>) -> Self {
        Self {
            kind: WORKSPACE_KIND.to_owned(),
            name: name.into(),
        }
    }
}

/// Role binding or cluster role binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Binding name.
    pub name: String,
    /// Namespace for role bindings; absent for cluster role bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Subjects granted the referenced role.
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Granted role.
    pub role_ref: RoleRef,
    /// Metadata owner references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl Binding {
    /// Whether the binding names the user as one of its subjects.
    pub fn binds_user(&self, username: &str) -> bool {
        self.subjects
            .iter()
            .any(|subject| subject.kind == USER_KIND && subject.name == username)
    }

    /// Workspaces listed among the owner references, in listed order.
    pub fn workspace_owners(&self) -> impl Iterator<Item = &str> {
        self.owner_references
            .iter()
            .filter(|owner| owner.kind == WORKSPACE_KIND)
            .map(|owner| owner.name.as_str())
    }
}

/// Scope tag derived from a cluster role binding's owner references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingScope {
    /// Not owned by any workspace.
    Cluster,
    /// Owned by every named workspace; never empty.
    Workspace(Vec<String>),
}

/// Cluster role binding tagged with its scope at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedBinding {
    /// The binding itself.
    pub binding: Binding,
    /// Scope computed from the owner references.
    pub scope: BindingScope,
}

impl ScopedBinding {
    /// Whether the binding is owned by the given workspace.
    pub fn owned_by_workspace(&self, workspace: &str) -> bool {
        match &self.scope {
            BindingScope::Workspace(owners) => owners.iter().any(|owner| owner == workspace),
            BindingScope::Cluster => false,
        }
    }
}

impl From<Binding> for ScopedBinding {
    fn from(binding: Binding) -> Self {
        let mut owners: Vec<String> = Vec::new();
        for owner in binding.workspace_owners() {
            if !owners.iter().any(|known| known == owner) {
                owners.push(owner.to_owned());
            }
        }
        let scope = if owners.is_empty() {
            BindingScope::Cluster
        } else {
            BindingScope::Workspace(owners)
        };
        Self { binding, scope }
    }
}

/// Identity whose effective grants are being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Login name matched against `User` subjects.
    pub username: String,
}

impl Principal {
    /// Construct a principal from a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Scope a principal's grants are aggregated over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Cluster role bindings.
    Cluster,
    /// Role bindings inside one namespace.
    Namespace(String),
    /// Cluster role bindings owned by one workspace.
    Workspace(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Cluster => write!(f, "cluster"),
            Scope::Namespace(namespace) => write!(f, "namespace/{}", namespace),
            Scope::Workspace(workspace) => write!(f, "workspace/{}", workspace),
        }
    }
}

/// Named category with the actions permitted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleRule {
    /// Category name, e.g. `deployments`.
    pub name: String,
    /// Permitted action names in catalog order.
    pub actions: Vec<String>,
}

impl SimpleRule {
    /// Construct a simple rule from a category and its action names.
    pub fn new(name: impl Into<String>, actions: &[&str]) -> Self {
        Self {
            name: name.into(),
            actions: to_strings(actions),
        }
    }

    /// Whether the action is listed.
    pub fn permits(&self, action: &str) -> bool {
        self.actions.iter().any(|candidate| candidate == action)
    }
}
