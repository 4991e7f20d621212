use std::collections::BTreeSet;

use serde_json::Value;

use crate::document::ComponentBucket;

/// The key that marks a map as a reference node.
const REF_KEY: &str = "$ref";

/// Pointers of this shape designate a component; everything after the name
/// segment only narrows the location *inside* that component.
const COMPONENTS_PREFIX: &str = "#/components/";

/// Recursively extracts every pointer string contained in `node`.
///
/// A map carrying a string-valued `$ref` key contributes that string and is
/// not descended into further (a pointer node supersedes its siblings). The
/// result is deduplicated and ordered; malformed pointers are collected as
/// opaque strings and fail later, at resolution time.
#[must_use]
pub fn collect_refs(node: &Value) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    collect_into(node, &mut refs);
    refs
}

fn collect_into(node: &Value, refs: &mut BTreeSet<String>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get(REF_KEY) {
                refs.insert(target.clone());
                return;
            }
            for entry in map.values() {
                collect_into(entry, refs);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_into(item, refs);
            }
        }
        _ => {}
    }
}

/// A parsed component reference: the `(bucket, name)` pair a pointer
/// designates under `components`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display("#/components/{bucket}/{name}")]
pub struct ComponentRef {
    /// Which `components` child the pointer targets.
    pub bucket: ComponentBucket,
    /// The component name inside that bucket.
    pub name: String,
}

impl ComponentRef {
    /// Parses a pointer of the form `#/components/<bucket>/<name>[/...]`.
    ///
    /// Deeper pointers yield the containing component; anything that does not
    /// match the shape (including an unknown bucket) is not a component
    /// reference and returns `None`.
    #[must_use]
    pub fn parse(pointer: &str) -> Option<Self> {
        let rest = pointer.strip_prefix(COMPONENTS_PREFIX)?;
        let mut segments = rest.split('/');
        let bucket = segments.next()?.parse().ok()?;
        let name = segments.next().filter(|segment| !segment.is_empty())?;
        Some(Self {
            bucket,
            name: name.to_string(),
        })
    }

    /// Looks this reference up in a document's `components` mapping.
    ///
    /// Absence is `None`, never an error; callers decide severity.
    #[must_use]
    pub fn resolve<'doc>(&self, components: &'doc Value) -> Option<&'doc Value> {
        components.get(self.bucket.as_str())?.get(&self.name)
    }
}
