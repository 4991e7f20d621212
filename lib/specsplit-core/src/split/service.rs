use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::ComponentBucket;
use crate::refs::ComponentRef;

/// The component subset carried by one service, keyed by bucket then name.
pub type Components = BTreeMap<ComponentBucket, BTreeMap<String, Value>>;

/// The `info` skeleton of a service document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    /// `"{service} API"`.
    pub title: String,
    /// Discriminator-dependent description.
    pub description: String,
    /// Version copied from the source document, `1.0.0` when absent.
    pub version: String,
}

/// One destination document: the subset of paths classified into a service
/// plus exactly the components those paths reference.
///
/// Invariant: after partitioning, every pointer appearing anywhere in
/// `paths` or `components` resolves within this document, except pointers
/// surfaced as unresolved in the [`SplitReport`](super::SplitReport).
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    /// OpenAPI version copied from the source, `3.0.0` when absent.
    pub openapi: String,
    /// Generated info block.
    pub info: ServiceInfo,
    /// Paths classified into this service (source key order preserved).
    pub paths: Map<String, Value>,
    /// The reference closure of `paths`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: Components,
    /// Servers block copied verbatim from the source document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Value>,
}

impl Service {
    /// Creates the empty skeleton for a service, seeded from the source
    /// document's root mapping.
    #[must_use]
    pub fn skeleton(name: &str, description: &str, source_root: &Map<String, Value>) -> Self {
        let openapi = source_root
            .get("openapi")
            .and_then(Value::as_str)
            .unwrap_or("3.0.0")
            .to_string();
        let version = source_root
            .get("info")
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .unwrap_or("1.0.0")
            .to_string();

        Self {
            openapi,
            info: ServiceInfo {
                title: format!("{name} API"),
                description: description.to_string(),
                version,
            },
            paths: Map::new(),
            components: BTreeMap::new(),
            servers: source_root.get("servers").cloned(),
        }
    }

    /// Looks a component reference up in this service's own components.
    #[must_use]
    pub fn resolve(&self, reference: &ComponentRef) -> Option<&Value> {
        self.components.get(&reference.bucket)?.get(&reference.name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::yaml::ToYaml;

    use super::*;

    fn source_root() -> Map<String, Value> {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Monolith", "version": "2.4.0"},
            "servers": [{"url": "https://api.example.com"}]
        })
        .as_object()
        .cloned()
        .expect("should be a mapping")
    }

    #[test]
    fn should_seed_skeleton_from_source() {
        let service = Service::skeleton("billing", "acme billing API", &source_root());

        assert_eq!(service.openapi, "3.0.3");
        assert_eq!(service.info.title, "billing API");
        assert_eq!(service.info.description, "acme billing API");
        assert_eq!(service.info.version, "2.4.0");
        assert_eq!(service.servers, Some(json!([{"url": "https://api.example.com"}])));
    }

    #[test]
    fn should_fall_back_to_default_versions() {
        let service = Service::skeleton("billing", "acme API", &Map::new());

        assert_eq!(service.openapi, "3.0.0");
        assert_eq!(service.info.version, "1.0.0");
        assert_eq!(service.servers, None);
    }

    #[test]
    fn should_serialize_in_document_order() {
        let mut service = Service::skeleton("billing", "acme billing API", &source_root());
        service
            .paths
            .insert("/invoices".to_string(), json!({"get": {"responses": {}}}));
        service
            .components
            .entry(ComponentBucket::Schemas)
            .or_default()
            .insert("Invoice".to_string(), json!({"type": "object"}));

        let yaml = service.to_yaml().expect("should serialize");

        insta::assert_snapshot!(yaml, @r"
        openapi: 3.0.3
        info:
          title: billing API
          description: acme billing API
          version: 2.4.0
        paths:
          /invoices:
            get:
              responses: {}
        components:
          schemas:
            Invoice:
              type: object
        servers:
        - url: https://api.example.com
        ");
    }
}
