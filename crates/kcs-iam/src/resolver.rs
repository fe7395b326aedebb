//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use crate::catalog::Category;
use crate::matcher::satisfies_all;
use crate::policy::{PolicyRule, SimpleRule};

/// Project a grant set onto the catalog.
///
/// Categories keep catalog order and actions keep category order.
/// Categories without a permitted action are left out.
pub fn resolve(grants: &[PolicyRule], categories: &[Category]) -> Vec<SimpleRule> {
    categories
        .iter()
        .filter_map(|category| {
            let actions: Vec<String> = category
                .actions
                .iter()
                .filter(|action| satisfies_all(grants, &action.rules))
                .map(|action| action.name.clone())
                .collect();
            (!actions.is_empty()).then(|| SimpleRule {
                name: category.name.clone(),
                actions,
            })
        })
        .collect()
}

/// Capabilities conferred by a single role's rules, for role detail views.
pub fn resolve_role(rules: &[PolicyRule], categories: &[Category]) -> Vec<SimpleRule> {
    resolve(rules, categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Action, Catalog};

    fn namespaces_catalog() -> Vec<Category> {
        vec![Category::new(
            "projects",
            vec![
                Action::new(
                    "view",
                    vec![PolicyRule::new(&["get", "list"], &[""], &["namespaces"])],
                ),
                Action::new(
                    "create",
                    vec![PolicyRule::new(&["create"], &[""], &["namespaces"])],
                ),
            ],
        )]
    }

    #[test]
    fn view_only_grant_permits_view() {
        let grants = vec![PolicyRule::new(&["get", "list"], &[""], &["namespaces"])];
        let rules = resolve(&grants, &namespaces_catalog());
        assert_eq!(rules, vec![SimpleRule::new("projects", &["view"])]);
    }

    #[test]
    fn wildcard_grant_permits_every_default_action() {
        let grants = vec![PolicyRule::wildcard()];
        let catalog = Catalog::default();
        for categories in [catalog.namespace_categories(), catalog.cluster_categories()] {
            let rules = resolve(&grants, categories);
            assert_eq!(rules.len(), categories.len());
            for (rule, category) in rules.iter().zip(categories) {
                assert_eq!(rule.name, category.name);
                let expected: Vec<_> = category.actions.iter().map(|a| a.name.clone()).collect();
                assert_eq!(rule.actions, expected);
            }
        }
    }

    #[test]
    fn categories_without_permitted_actions_are_omitted() {
        let grants = vec![PolicyRule::new(&["get", "list", "watch"], &[""], &["secrets"])];
        let catalog = Catalog::default();
        let rules = resolve(&grants, catalog.namespace_categories());
        assert_eq!(rules, vec![SimpleRule::new("secrets", &["view"])]);
        assert!(resolve(&[], catalog.namespace_categories()).is_empty());
    }

    #[test]
    fn actions_follow_catalog_order() {
        let grants = vec![
            PolicyRule::new(&["update", "patch"], &["apps"], &["*"]),
            PolicyRule::new(&["get", "list", "watch"], &["apps"], &["*"]),
            PolicyRule::new(&["get", "list", "watch"], &[""], &["pods"]),
        ];
        let catalog = Catalog::default();
        let rules = resolve(&grants, catalog.namespace_categories());
        let deployments = rules.iter().find(|rule| rule.name == "deployments").unwrap();
        assert_eq!(deployments.actions, vec!["view", "edit", "scale"]);
    }

    #[test]
    fn adding_grants_never_removes_actions() {
        let catalog = Catalog::default();
        let base = vec![
            PolicyRule::new(&["get", "list", "watch"], &["apps"], &["deployments", "replicasets"]),
            PolicyRule::new(&["get", "list", "watch"], &[""], &["pods"]),
        ];
        let mut extended = base.clone();
        extended.push(PolicyRule::new(&["create"], &["apps"], &["deployments"]));

        let before = resolve(&base, catalog.namespace_categories());
        let after = resolve(&extended, catalog.namespace_categories());
        assert_eq!(before, vec![SimpleRule::new("deployments", &["view"])]);
        for rule in &before {
            let grown = after.iter().find(|candidate| candidate.name == rule.name).unwrap();
            for action in &rule.actions {
                assert!(grown.permits(action));
            }
        }
        let deployments = after.iter().find(|rule| rule.name == "deployments").unwrap();
        assert_eq!(deployments.actions, vec!["view", "create"]);
    }
}
