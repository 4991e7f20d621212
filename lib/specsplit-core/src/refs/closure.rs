use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::ComponentBucket;

use super::{ComponentRef, collect_refs};

/// The components transitively reachable from a set of seed pointers.
///
/// `components` holds a deep copy of every reachable fragment, keyed by
/// bucket then name; `unresolved` lists the component-shaped pointers that
/// could not be found in the source document. Dangling pointers are
/// non-fatal: the destination document stays structurally valid, and callers
/// decide whether incompleteness matters.
#[derive(Debug, Clone, Default)]
pub struct ComponentClosure {
    /// Deep copies of every component reachable from the seeds.
    pub components: BTreeMap<ComponentBucket, BTreeMap<String, Value>>,
    /// Component pointers that did not resolve in the source document.
    pub unresolved: Vec<String>,
}

/// Computes the transitive closure of components reachable from `seeds`
/// against a source document's `components` mapping.
///
/// Worklist algorithm: every pointer is processed at most once, so
/// self-referential or mutually-referential components terminate and are
/// copied exactly once each. Resolved values are deep-copied into the result
/// (copy, not reference), so later mutation of one destination document never
/// affects another destination or the source. Pointers that are not
/// component references (e.g. `#/paths/...`) are skipped.
#[must_use]
pub fn compute_closure<I>(seeds: I, source_components: &Value) -> ComponentClosure
where
    I: IntoIterator<Item = String>,
{
    let mut closure = ComponentClosure::default();
    let mut processed: BTreeSet<String> = BTreeSet::new();
    let mut frontier: BTreeSet<String> = seeds.into_iter().collect();

    while !frontier.is_empty() {
        let mut next = BTreeSet::new();

        for pointer in frontier {
            if !processed.insert(pointer.clone()) {
                continue;
            }

            let Some(reference) = ComponentRef::parse(&pointer) else {
                debug!(%pointer, "not a component reference, skipping");
                continue;
            };

            let Some(resolved) = reference.resolve(source_components) else {
                warn!(%pointer, "could not find referenced component in source document");
                closure.unresolved.push(pointer);
                continue;
            };

            let members = closure.components.entry(reference.bucket).or_default();
            if members.contains_key(&reference.name) {
                // Another pointer spelling already pulled this component in.
                continue;
            }

            let copy = resolved.clone();
            for found in collect_refs(&copy) {
                if !processed.contains(&found) {
                    next.insert(found);
                }
            }

            debug!(bucket = %reference.bucket, name = %reference.name, "added component to closure");
            members.insert(reference.name, copy);
        }

        if !next.is_empty() {
            debug!(count = next.len(), "found additional refs to resolve");
        }
        frontier = next;
    }

    closure
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_components() -> Value {
        json!({
            "schemas": {
                "User": {
                    "type": "object",
                    "properties": {
                        "address": {"$ref": "#/components/schemas/Address"}
                    }
                },
                "Address": {
                    "type": "object",
                    "properties": {"city": {"type": "string"}}
                },
                "Node": {
                    "type": "object",
                    "properties": {"peer": {"$ref": "#/components/schemas/Peer"}}
                },
                "Peer": {
                    "type": "object",
                    "properties": {"node": {"$ref": "#/components/schemas/Node"}}
                }
            },
            "parameters": {
                "Page": {"name": "page", "in": "query", "schema": {"type": "integer"}}
            }
        })
    }

    fn seeds(pointers: &[&str]) -> Vec<String> {
        pointers.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn should_follow_transitive_references() {
        let closure = compute_closure(
            seeds(&["#/components/schemas/User"]),
            &sample_components(),
        );

        let schemas = closure
            .components
            .get(&ComponentBucket::Schemas)
            .expect("should have schemas");
        assert!(schemas.contains_key("User"));
        assert!(schemas.contains_key("Address"));
        assert_eq!(schemas.len(), 2);
        assert!(closure.unresolved.is_empty());
    }

    #[test]
    fn should_terminate_on_mutual_references() {
        let closure = compute_closure(
            seeds(&["#/components/schemas/Node"]),
            &sample_components(),
        );

        let schemas = closure
            .components
            .get(&ComponentBucket::Schemas)
            .expect("should have schemas");
        assert!(schemas.contains_key("Node"));
        assert!(schemas.contains_key("Peer"));
        assert_eq!(schemas.len(), 2);
    }

    #[test]
    fn should_report_unresolved_pointers() {
        let closure = compute_closure(
            seeds(&["#/components/schemas/Ghost", "#/components/parameters/Page"]),
            &sample_components(),
        );

        assert_eq!(closure.unresolved, ["#/components/schemas/Ghost"]);
        assert!(
            closure
                .components
                .get(&ComponentBucket::Parameters)
                .is_some_and(|members| members.contains_key("Page"))
        );
    }

    #[test]
    fn should_skip_non_component_pointers() {
        let closure = compute_closure(
            seeds(&["#/paths/~1users/get", "#/components/schemas/Address"]),
            &sample_components(),
        );

        assert!(closure.unresolved.is_empty());
        let schemas = closure
            .components
            .get(&ComponentBucket::Schemas)
            .expect("should have schemas");
        assert_eq!(schemas.len(), 1);
    }

    #[test]
    fn should_resolve_deep_pointer_to_containing_component() {
        let closure = compute_closure(
            seeds(&["#/components/schemas/Address/properties/city"]),
            &sample_components(),
        );

        let schemas = closure
            .components
            .get(&ComponentBucket::Schemas)
            .expect("should have schemas");
        assert!(schemas.contains_key("Address"));
    }

    #[test]
    fn should_copy_without_aliasing_the_source() {
        let source = sample_components();
        let closure = compute_closure(seeds(&["#/components/schemas/Address"]), &source);

        let mut copy = closure
            .components
            .get(&ComponentBucket::Schemas)
            .and_then(|members| members.get("Address"))
            .cloned()
            .expect("should have Address");
        copy.as_object_mut()
            .expect("should be an object")
            .insert("mutated".to_string(), json!(true));

        // The source document must be untouched by mutation of the copy.
        assert_eq!(
            source.get("schemas").and_then(|schemas| schemas.get("Address")),
            Some(&json!({
                "type": "object",
                "properties": {"city": {"type": "string"}}
            }))
        );
    }
}
