//! ---
//! kcs_section: "06-security-access-control"
//! kcs_subsection: "module"
//! kcs_type: "source"
//! kcs_scope: "code"
//! kcs_description: "Policy rules, roles, bindings, and capability projections."
//! kcs_version: "v0.0.0-prealpha"
//! kcs_owner: "tbd"
//! ---
//! Wildcard-aware evaluation of required rules against granted rules.
//!
//! A required rule expands into the cross product of its own dimensions
//! (group × resource × name × verb, or group × url × verb). Every
//! combination must be granted by at least one rule of the grant set;
//! different combinations may be granted by different rules.

use crate::policy::{PolicyRule, WILDCARD};

fn contains(values: &[String], value: &str) -> bool {
    values.iter().any(|candidate| candidate == value)
}

fn contains_or_wildcard(values: &[String], value: &str) -> bool {
    contains(values, value) || contains(values, WILDCARD)
}

/// Whether the grant covers the verb.
pub fn verb_matches(grant: &PolicyRule, verb: &str) -> bool {
    contains_or_wildcard(&grant.verbs, verb)
}

/// Whether a single grant covers one resource combination.
///
/// `resource_name` is `None` when the requirement places no restriction on
/// names; a grant limited to specific names still covers such a combination.
pub fn grant_allows_resource(
    grant: &PolicyRule,
    api_group: &str,
    resource: &str,
    resource_name: Option<&str>,
    verb: &str,
) -> bool {
    contains_or_wildcard(&grant.api_groups, api_group)
        && verb_matches(grant, verb)
        && contains_or_wildcard(&grant.resources, resource)
        && resource_name_matches(grant, resource_name)
}

fn resource_name_matches(grant: &PolicyRule, resource_name: Option<&str>) -> bool {
    match resource_name {
        None => true,
        Some(name) => {
            grant.resource_names.is_empty()
                || contains(&grant.resource_names, name)
                || contains(&grant.resources, WILDCARD)
        }
    }
}

/// Whether a single grant covers one non-resource URL combination.
pub fn grant_allows_url(grant: &PolicyRule, api_group: &str, url: &str, verb: &str) -> bool {
    contains_or_wildcard(&grant.api_groups, api_group)
        && verb_matches(grant, verb)
        && contains_or_wildcard(&grant.non_resource_urls, url)
}

/// Whether the grant set satisfies every combination implied by `required`.
///
/// An empty `api_groups` on the requirement is vacuously satisfied. The
/// first ungranted combination short-circuits to `false`.
pub fn satisfies(grants: &[PolicyRule], required: &PolicyRule) -> bool {
    let names: Vec<Option<&str>> = if required.resource_names.is_empty() {
        vec![None]
    } else {
        required
            .resource_names
            .iter()
            .map(|name| Some(name.as_str()))
            .collect()
    };

    for api_group in &required.api_groups {
        if required.non_resource_urls.is_empty() {
            for resource in &required.resources {
                for name in &names {
                    for verb in &required.verbs {
                        let granted = grants.iter().any(|grant| {
                            grant_allows_resource(grant, api_group, resource, *name, verb)
                        });
                        if !granted {
                            return false;
                        }
                    }
                }
            }
        } else {
            for url in &required.non_resource_urls {
                for verb in &required.verbs {
                    let granted = grants
                        .iter()
                        .any(|grant| grant_allows_url(grant, api_group, url, verb));
                    if !granted {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Whether the grant set satisfies every rule in `required`.
pub fn satisfies_all(grants: &[PolicyRule], required: &[PolicyRule]) -> bool {
    required.iter().all(|rule| satisfies(grants, rule))
}
