//! Source document loading and the fixed OpenAPI vocabulary.
//!
//! A document is kept as a raw [`serde_json::Value`] tree (with source key
//! order preserved) rather than a typed OpenAPI model: partitioning must
//! round-trip vendor extensions and unknown keys untouched, and the closure
//! resolver needs to scan arbitrary subtrees for references.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SplitError;
use crate::yaml::from_yaml_str;

/// The HTTP verbs that mark a path-item entry as an operation.
///
/// Every other key under a path item (shared `parameters`, `servers`,
/// `summary`, `description`, vendor extensions) is a non-operation entry and
/// is copied into every service that uses the path.
pub const OPERATION_VERBS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "options", "head", "trace",
];

/// Returns `true` when `key` is one of the fixed operation verbs.
#[must_use]
pub fn is_operation_verb(key: &str) -> bool {
    OPERATION_VERBS.contains(&key)
}

/// The fixed set of `components` children a pointer may designate.
///
/// Declaration order is the canonical output order of component buckets in a
/// service document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentBucket {
    /// `#/components/schemas/*`
    Schemas,
    /// `#/components/responses/*`
    Responses,
    /// `#/components/parameters/*`
    Parameters,
    /// `#/components/examples/*`
    Examples,
    /// `#/components/requestBodies/*`
    RequestBodies,
    /// `#/components/headers/*`
    Headers,
    /// `#/components/securitySchemes/*`
    SecuritySchemes,
    /// `#/components/links/*`
    Links,
    /// `#/components/callbacks/*`
    Callbacks,
}

impl ComponentBucket {
    /// All buckets, in canonical output order.
    pub const ALL: [Self; 9] = [
        Self::Schemas,
        Self::Responses,
        Self::Parameters,
        Self::Examples,
        Self::RequestBodies,
        Self::Headers,
        Self::SecuritySchemes,
        Self::Links,
        Self::Callbacks,
    ];

    /// The bucket name as it appears inside a document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Responses => "responses",
            Self::Parameters => "parameters",
            Self::Examples => "examples",
            Self::RequestBodies => "requestBodies",
            Self::Headers => "headers",
            Self::SecuritySchemes => "securitySchemes",
            Self::Links => "links",
            Self::Callbacks => "callbacks",
        }
    }
}

impl fmt::Display for ComponentBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentBucket {
    type Err = UnknownBucket;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == value)
            .ok_or_else(|| UnknownBucket {
                name: value.to_string(),
            })
    }
}

/// A pointer named a `components` child outside the fixed bucket set.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown component bucket: {name}")]
pub struct UnknownBucket {
    /// The unrecognized bucket segment.
    pub name: String,
}

/// Reads a document from disk, by extension: `.json` is parsed as JSON,
/// anything else as YAML (YAML mapping keys are coerced to strings, so
/// unquoted numeric status codes survive the trip).
///
/// # Errors
///
/// Returns a [`SplitError`] when the file cannot be read or parsed; a parse
/// failure is fatal for the whole run.
pub fn load_document(path: &Path) -> Result<Value, SplitError> {
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => from_yaml_str(&content),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn should_recognize_operation_verbs() {
        assert!(is_operation_verb("get"));
        assert!(is_operation_verb("trace"));
        assert!(!is_operation_verb("parameters"));
        assert!(!is_operation_verb("summary"));
        assert!(!is_operation_verb("GET"));
    }

    #[rstest]
    #[case(ComponentBucket::Schemas, "schemas")]
    #[case(ComponentBucket::Responses, "responses")]
    #[case(ComponentBucket::Parameters, "parameters")]
    #[case(ComponentBucket::Examples, "examples")]
    #[case(ComponentBucket::RequestBodies, "requestBodies")]
    #[case(ComponentBucket::Headers, "headers")]
    #[case(ComponentBucket::SecuritySchemes, "securitySchemes")]
    #[case(ComponentBucket::Links, "links")]
    #[case(ComponentBucket::Callbacks, "callbacks")]
    fn should_round_trip_bucket_names(#[case] bucket: ComponentBucket, #[case] name: &str) {
        assert_eq!(bucket.as_str(), name);
        assert_eq!(name.parse::<ComponentBucket>(), Ok(bucket));
    }

    #[test]
    fn should_reject_unknown_bucket() {
        let error = "webhooks".parse::<ComponentBucket>().unwrap_err();
        assert_eq!(error.name, "webhooks");
    }

    #[test]
    fn should_order_buckets_by_declaration() {
        assert!(ComponentBucket::Schemas < ComponentBucket::Responses);
        assert!(ComponentBucket::Links < ComponentBucket::Callbacks);
    }
}
