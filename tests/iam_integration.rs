//! ---
//! kcs_section: "15-testing-qa-runbook"
//! kcs_subsection: "integration-tests"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Integration and validation tests for the KCS access-control stack."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use std::sync::Arc;

use kcs_iam::{
    resolve, Binding, BindingStore, Catalog, ClusterRole, ClusterSnapshot, GrantAggregator,
    IamMetrics, InMemoryBindingStore, OwnerReference, PolicyRule, Principal, Role, RoleRef,
    RoleRefKind, Scope, SimpleRule, Subject,
};
use tempfile::tempdir;

fn role_binding(name: &str, namespace: &str, user: &str, kind: RoleRefKind, role: &str) -> Binding {
    Binding {
        name: name.into(),
        namespace: Some(namespace.into()),
        subjects: vec![Subject::user(user)],
        role_ref: RoleRef {
            kind,
            name: role.into(),
        },
        owner_references: Vec::new(),
    }
}

fn cluster_binding(name: &str, user: &str, role: &str, workspace: Option<&str>) -> Binding {
    Binding {
        name: name.into(),
        namespace: None,
        subjects: vec![Subject::user(user)],
        role_ref: RoleRef {
            kind: RoleRefKind::ClusterRole,
            name: role.into(),
        },
        owner_references: workspace.map(OwnerReference::workspace).into_iter().collect(),
    }
}

#[test]
fn namespace_view_is_granted_but_create_is_not() {
    let catalog = Catalog::default();
    let grants = vec![PolicyRule::new(&["get", "list"], &[""], &["namespaces"])];

    let rules = resolve(&grants, catalog.namespace_categories());

    assert_eq!(rules, vec![SimpleRule::new("projects", &["view"])]);
}

#[test]
fn wildcard_grant_permits_every_action() {
    let catalog = Catalog::default();
    let grants = vec![PolicyRule::wildcard()];

    for categories in [catalog.namespace_categories(), catalog.cluster_categories()] {
        let rules = resolve(&grants, categories);
        assert_eq!(rules.len(), categories.len());
        for (rule, category) in rules.iter().zip(categories) {
            assert_eq!(rule.name, category.name);
            let expected: Vec<&str> = category.actions.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(rule.actions, expected);
        }
    }
}

#[test]
fn roles_in_one_namespace_merge_into_one_category() {
    let store = InMemoryBindingStore::new();
    store.insert_namespace("demo");
    store.insert_role(Role {
        name: "viewer".into(),
        namespace: "demo".into(),
        rules: vec![
            PolicyRule::new(&["get", "list", "watch"], &["apps"], &["deployments", "replicasets"]),
            PolicyRule::new(&["get", "list", "watch"], &[""], &["pods"]),
        ],
    });
    store.insert_role(Role {
        name: "creator".into(),
        namespace: "demo".into(),
        rules: vec![PolicyRule::new(&["create"], &["apps"], &["deployments"])],
    });
    store
        .insert_role_binding(role_binding("a", "demo", "alice", RoleRefKind::Role, "viewer"))
        .unwrap();
    store
        .insert_role_binding(role_binding("b", "demo", "alice", RoleRefKind::Role, "creator"))
        .unwrap();

    let aggregator = GrantAggregator::new(Arc::new(store), Arc::new(Catalog::default()));
    let rules = aggregator
        .capabilities(&Principal::new("alice"), &Scope::Namespace("demo".into()))
        .unwrap();

    let deployments = rules.iter().find(|rule| rule.name == "deployments").unwrap();
    assert_eq!(deployments.actions, vec!["view".to_string(), "create".to_string()]);
}

#[test]
fn workspace_scope_ignores_other_workspaces() {
    let store = InMemoryBindingStore::new();
    store.insert_cluster_role(ClusterRole {
        name: "ws-viewer".into(),
        rules: vec![PolicyRule::new(
            &["get", "list", "watch"],
            &["tenant.kubesphere.io"],
            &["workspaces"],
        )],
    });
    store.insert_cluster_role(ClusterRole {
        name: "ws-admin".into(),
        rules: vec![PolicyRule::new(&["*"], &["tenant.kubesphere.io"], &["*"])],
    });
    store.insert_cluster_role_binding(cluster_binding("own", "alice", "ws-viewer", Some("ws1")));
    store.insert_cluster_role_binding(cluster_binding("other", "alice", "ws-admin", Some("ws2")));

    let aggregator = GrantAggregator::new(Arc::new(store), Arc::new(Catalog::default()));
    let principal = Principal::new("alice");

    let ws1 = aggregator
        .capabilities(&principal, &Scope::Workspace("ws1".into()))
        .unwrap();
    assert_eq!(ws1, vec![SimpleRule::new("workspaces", &["view"])]);

    let ws1_grants = aggregator
        .aggregate(&principal, &Scope::Workspace("ws1".into()))
        .unwrap();
    assert_eq!(ws1_grants.len(), 1);

    let cluster = aggregator.capabilities(&principal, &Scope::Cluster).unwrap();
    let workspaces = cluster.iter().find(|rule| rule.name == "workspaces").unwrap();
    assert!(workspaces.permits("manage"));
}

#[test]
fn snapshot_drives_end_to_end_resolution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cluster.json");
    let snapshot = serde_json::json!({
        "namespaces": ["demo", "empty"],
        "roles": [{
            "name": "operator",
            "namespace": "demo",
            "rules": [
                {"verbs": ["get", "list", "watch"], "apiGroups": [""], "resources": ["pods", "pods/log"]},
                {"verbs": ["delete", "deletecollection"], "apiGroups": [""], "resources": ["pods"]}
            ]
        }],
        "clusterRoles": [{
            "name": "auditor",
            "rules": [{"verbs": ["get", "list", "watch"], "apiGroups": [""], "resources": ["configmaps"]}]
        }],
        "roleBindings": [
            {
                "name": "op",
                "namespace": "demo",
                "subjects": [{"kind": "User", "name": "bob"}],
                "roleRef": {"kind": "Role", "name": "operator"}
            },
            {
                "name": "audit",
                "namespace": "demo",
                "subjects": [{"kind": "User", "name": "bob"}],
                "roleRef": {"kind": "ClusterRole", "name": "auditor"}
            },
            {
                "name": "stale",
                "namespace": "demo",
                "subjects": [{"kind": "User", "name": "bob"}],
                "roleRef": {"kind": "Role", "name": "deleted"}
            }
        ],
        "clusterRoleBindings": []
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&snapshot).unwrap()).unwrap();

    let snapshot = ClusterSnapshot::from_path(&path).unwrap();
    let store = InMemoryBindingStore::from_snapshot(snapshot).unwrap();
    assert_eq!(store.list_namespaces().unwrap(), vec!["demo", "empty"]);

    let registry = Arc::new(prometheus::Registry::new());
    let metrics = IamMetrics::new(registry.clone()).unwrap();
    let aggregator = GrantAggregator::new(Arc::new(store), Arc::new(Catalog::default()))
        .with_metrics(metrics.clone());

    let by_namespace = aggregator
        .namespace_capabilities(&Principal::new("bob"))
        .unwrap();
    assert_eq!(by_namespace.len(), 1);
    let demo = &by_namespace["demo"];
    let pods = demo.iter().find(|rule| rule.name == "pods").unwrap();
    assert!(pods.permits("view"));
    assert!(pods.permits("delete"));
    let configmaps = demo.iter().find(|rule| rule.name == "configmaps").unwrap();
    assert_eq!(configmaps.actions, vec!["view".to_string()]);

    assert_eq!(metrics.stale_bindings(), 1);
    assert_eq!(metrics.resolutions(), 2);
}

#[test]
fn unavailable_store_fails_instead_of_returning_partial_results() {
    let store = Arc::new(InMemoryBindingStore::new());
    store.insert_namespace("demo");
    store.set_offline(true);

    let aggregator = GrantAggregator::new(store, Arc::new(Catalog::default()));
    assert!(aggregator
        .capabilities(&Principal::new("alice"), &Scope::Namespace("demo".into()))
        .is_err());
}
