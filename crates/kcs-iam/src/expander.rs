//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
use crate::catalog::{find_action, CatalogError, Category};
use crate::policy::{PolicyRule, SimpleRule};

/// Expand selected capabilities into the policy rules they require.
///
/// Used when a role is authored by ticking categories and actions. Rules
/// are emitted in selection order with exact duplicates dropped, so the
/// resulting role resolves back to at least the selected actions.
pub fn expand(
    selections: &[SimpleRule],
    categories: &[Category],
) -> Result<Vec<PolicyRule>, CatalogError> {
    let mut rules: Vec<PolicyRule> = Vec::new();
    for selection in selections {
        for action_name in &selection.actions {
            let action = find_action(categories, &selection.name, action_name)?;
            for rule in &action.rules {
                if !rules.contains(rule) {
                    rules.push(rule.clone());
                }
            }
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::resolver::resolve;

    #[test]
    fn expanded_rules_resolve_back_to_selection() {
        let catalog = Catalog::default();
        let selections = vec![
            SimpleRule::new("deployments", &["view", "scale"]),
            SimpleRule::new("services", &["view", "create"]),
        ];
        let rules = expand(&selections, catalog.namespace_categories()).unwrap();
        let resolved = resolve(&rules, catalog.namespace_categories());
        for selection in &selections {
            let found = resolved
                .iter()
                .find(|rule| rule.name == selection.name)
                .unwrap();
            for action in &selection.actions {
                assert!(found.permits(action), "{}/{}", selection.name, action);
            }
        }
    }

    #[test]
    fn shared_rules_are_emitted_once() {
        let catalog = Catalog::default();
        let selections = vec![
            SimpleRule::new("deployments", &["view"]),
            SimpleRule::new("jobs", &["view"]),
        ];
        let rules = expand(&selections, catalog.namespace_categories()).unwrap();
        let pods_read = PolicyRule::new(&["get", "list", "watch"], &[""], &["pods"]);
        assert_eq!(rules.iter().filter(|rule| **rule == pods_read).count(), 1);
    }

    #[test]
    fn unknown_entries_are_rejected() {
        let catalog = Catalog::default();
        let err = expand(
            &[SimpleRule::new("deployments", &["fly"])],
            catalog.namespace_categories(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownAction { .. }));

        let err = expand(
            &[SimpleRule::new("nodes", &["view"])],
            catalog.namespace_categories(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory(_)));
    }
}
