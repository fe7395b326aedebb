//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Capability catalog mapping categories and actions to required rules."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
//! Compiled-in capability catalog.
//!
//! Category and action order here is the order the console renders them in.

use super::{Action, Category};
use crate::policy::PolicyRule;

const CORE: &str = "";
const APPS: &str = "apps";
const BATCH: &str = "batch";
const EXTENSIONS: &str = "extensions";
const AUTOSCALING: &str = "autoscaling";
const RBAC: &str = "rbac.authorization.k8s.io";
const STORAGE: &str = "storage.k8s.io";
const APPLICATION: &str = "app.k8s.io";
const KUBESPHERE: &str = "kubesphere.io";
const TENANT: &str = "tenant.kubesphere.io";
const IAM: &str = "iam.kubesphere.io";
const MONITORING: &str = "monitoring.kubesphere.io";
const LOGGING: &str = "logging.kubesphere.io";
const ALERTING: &str = "alerting.kubesphere.io";
const OPENPITRIX: &str = "openpitrix.io";
const DEVOPS: &str = "devops.kubesphere.io";

const READ: &[&str] = &["get", "list", "watch"];
const CREATE: &[&str] = &["create"];
const EDIT: &[&str] = &["update", "patch"];
const DELETE: &[&str] = &["delete", "deletecollection"];
const ALL: &[&str] = &["*"];

fn rule(verbs: &[&str], api_group: &str, resources: &[&str]) -> PolicyRule {
    PolicyRule::new(verbs, &[api_group], resources)
}

fn action(name: &str, rules: Vec<PolicyRule>) -> Action {
    Action::new(name, rules)
}

/// Standard view/create/edit/delete actions over one resource list.
fn crud(name: &str, api_group: &str, resources: &[&str]) -> Category {
    Category::new(
        name,
        vec![
            action("view", vec![rule(READ, api_group, resources)]),
            action("create", vec![rule(CREATE, api_group, resources)]),
            action("edit", vec![rule(EDIT, api_group, resources)]),
            action("delete", vec![rule(DELETE, api_group, resources)]),
        ],
    )
}

/// Categories evaluated against a principal's grants inside one namespace.
pub fn namespace_categories() -> Vec<Category> {
    vec![
        Category::new(
            "projects",
            vec![
                action("view", vec![rule(&["get", "list"], CORE, &["namespaces"])]),
                action("edit", vec![rule(EDIT, CORE, &["namespaces"])]),
                action("delete", vec![rule(&["delete"], CORE, &["namespaces"])]),
                action(
                    "members_manage",
                    vec![rule(ALL, RBAC, &["rolebindings"])],
                ),
            ],
        ),
        Category::new(
            "monitoring",
            vec![action("view", vec![rule(&["get", "list"], MONITORING, &["*"])])],
        ),
        Category::new(
            "alerting",
            vec![
                action("view", vec![rule(READ, ALERTING, &["*"])]),
                action("create", vec![rule(CREATE, ALERTING, &["*"])]),
                action("delete", vec![rule(&["delete"], ALERTING, &["*"])]),
            ],
        ),
        Category::new(
            "members",
            vec![
                action("view", vec![rule(READ, RBAC, &["rolebindings"])]),
                action("create", vec![rule(CREATE, RBAC, &["rolebindings"])]),
                action("edit", vec![rule(EDIT, RBAC, &["rolebindings"])]),
                action("delete", vec![rule(&["delete"], RBAC, &["rolebindings"])]),
            ],
        ),
        crud("roles", RBAC, &["roles"]),
        Category::new(
            "deployments",
            vec![
                action(
                    "view",
                    vec![
                        rule(READ, APPS, &["deployments", "replicasets"]),
                        rule(READ, CORE, &["pods"]),
                    ],
                ),
                action("create", vec![rule(CREATE, APPS, &["deployments"])]),
                action("edit", vec![rule(EDIT, APPS, &["deployments"])]),
                action(
                    "delete",
                    vec![rule(DELETE, APPS, &["deployments", "replicasets"])],
                ),
                action(
                    "scale",
                    vec![rule(EDIT, APPS, &["deployments", "deployments/scale"])],
                ),
            ],
        ),
        Category::new(
            "statefulsets",
            vec![
                action(
                    "view",
                    vec![
                        rule(READ, APPS, &["statefulsets", "controllerrevisions"]),
                        rule(READ, CORE, &["pods"]),
                    ],
                ),
                action("create", vec![rule(CREATE, APPS, &["statefulsets"])]),
                action("edit", vec![rule(EDIT, APPS, &["statefulsets"])]),
                action("delete", vec![rule(DELETE, APPS, &["statefulsets"])]),
                action(
                    "scale",
                    vec![rule(EDIT, APPS, &["statefulsets", "statefulsets/scale"])],
                ),
            ],
        ),
        Category::new(
            "daemonsets",
            vec![
                action(
                    "view",
                    vec![
                        rule(READ, APPS, &["daemonsets", "controllerrevisions"]),
                        rule(READ, CORE, &["pods"]),
                    ],
                ),
                action("create", vec![rule(CREATE, APPS, &["daemonsets"])]),
                action("edit", vec![rule(EDIT, APPS, &["daemonsets"])]),
                action("delete", vec![rule(DELETE, APPS, &["daemonsets"])]),
            ],
        ),
        Category::new(
            "pods",
            vec![
                action("view", vec![rule(READ, CORE, &["pods", "pods/log"])]),
                action("terminal", vec![rule(CREATE, CORE, &["pods/exec"])]),
                action("delete", vec![rule(&["delete"], CORE, &["pods"])]),
            ],
        ),
        crud("services", CORE, &["services"]),
        Category::new(
            "routes",
            vec![
                action("view", vec![rule(READ, EXTENSIONS, &["ingresses"])]),
                action("create", vec![rule(CREATE, EXTENSIONS, &["ingresses"])]),
                action("edit", vec![rule(EDIT, EXTENSIONS, &["ingresses"])]),
                action("delete", vec![rule(&["delete"], EXTENSIONS, &["ingresses"])]),
            ],
        ),
        crud("volumes", CORE, &["persistentvolumeclaims"]),
        crud("applications", APPLICATION, &["applications"]),
        Category::new(
            "jobs",
            vec![
                action(
                    "view",
                    vec![rule(READ, BATCH, &["jobs"]), rule(READ, CORE, &["pods"])],
                ),
                action("create", vec![rule(CREATE, BATCH, &["jobs"])]),
                action("edit", vec![rule(EDIT, BATCH, &["jobs"])]),
                action("delete", vec![rule(DELETE, BATCH, &["jobs"])]),
            ],
        ),
        Category::new(
            "cronjobs",
            vec![
                action(
                    "view",
                    vec![rule(READ, BATCH, &["cronjobs", "jobs"])],
                ),
                action("create", vec![rule(CREATE, BATCH, &["cronjobs"])]),
                action("edit", vec![rule(EDIT, BATCH, &["cronjobs"])]),
                action("delete", vec![rule(DELETE, BATCH, &["cronjobs"])]),
            ],
        ),
        crud("secrets", CORE, &["secrets"]),
        crud("configmaps", CORE, &["configmaps"]),
        crud(
            "horizontalpodautoscalers",
            AUTOSCALING,
            &["horizontalpodautoscalers"],
        ),
    ]
}

/// Categories evaluated against a principal's cluster or workspace grants.
pub fn cluster_categories() -> Vec<Category> {
    vec![
        Category::new(
            "workspaces",
            vec![
                action("view", vec![rule(READ, TENANT, &["workspaces"])]),
                action("create", vec![rule(CREATE, TENANT, &["workspaces"])]),
                action("edit", vec![rule(EDIT, TENANT, &["workspaces"])]),
                action("delete", vec![rule(&["delete"], TENANT, &["workspaces"])]),
                action(
                    "manage",
                    vec![rule(ALL, TENANT, &["workspaces", "workspaces/*"])],
                ),
            ],
        ),
        Category::new(
            "projects",
            vec![
                action("view", vec![rule(READ, CORE, &["namespaces"])]),
                action("create", vec![rule(CREATE, CORE, &["namespaces"])]),
                action("delete", vec![rule(&["delete"], CORE, &["namespaces"])]),
            ],
        ),
        Category::new(
            "devops",
            vec![
                action("view", vec![rule(READ, DEVOPS, &["devopsprojects"])]),
                action("create", vec![rule(CREATE, DEVOPS, &["devopsprojects"])]),
                action("delete", vec![rule(&["delete"], DEVOPS, &["devopsprojects"])]),
            ],
        ),
        Category::new(
            "monitoring",
            vec![action("view", vec![rule(&["get", "list"], MONITORING, &["*"])])],
        ),
        Category::new(
            "alerting",
            vec![
                action("view", vec![rule(READ, ALERTING, &["*"])]),
                action("create", vec![rule(CREATE, ALERTING, &["*"])]),
                action("delete", vec![rule(&["delete"], ALERTING, &["*"])]),
            ],
        ),
        Category::new(
            "logging",
            vec![action("view", vec![rule(&["get", "list"], LOGGING, &["*"])])],
        ),
        Category::new(
            "accounts",
            vec![
                action("view", vec![rule(READ, IAM, &["users", "users/*"])]),
                action("create", vec![rule(CREATE, IAM, &["users"])]),
                action("edit", vec![rule(EDIT, IAM, &["users"])]),
                action("delete", vec![rule(&["delete"], IAM, &["users"])]),
            ],
        ),
        crud("roles", RBAC, &["clusterroles"]),
        crud("storageclasses", STORAGE, &["storageclasses"]),
        Category::new(
            "nodes",
            vec![
                action(
                    "view",
                    vec![rule(READ, CORE, &["nodes"]), rule(READ, CORE, &["events"])],
                ),
                action("edit", vec![rule(EDIT, CORE, &["nodes"])]),
            ],
        ),
        Category::new(
            "repos",
            vec![
                action("view", vec![rule(READ, OPENPITRIX, &["repos"])]),
                action("manage", vec![rule(ALL, OPENPITRIX, &["repos"])]),
            ],
        ),
        Category::new(
            "apps",
            vec![
                action("view", vec![rule(READ, OPENPITRIX, &["apps", "app_versions"])]),
                action("manage", vec![rule(ALL, OPENPITRIX, &["apps", "app_versions"])]),
            ],
        ),
        Category::new(
            "components",
            vec![action("view", vec![rule(&["get", "list"], KUBESPHERE, &["components"])])],
        ),
    ]
}
