use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::document::is_operation_verb;
use crate::error::SplitError;
use crate::refs::{collect_refs, compute_closure};

use super::options::{Discriminator, SKIP_SENTINEL, SplitOptions};
use super::postprocess::{add_missing_object_types, rename_hyphenated_path_params};
use super::service::Service;

/// Path segments like `v1`, `v2`, ... are version markers, not service names.
static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("a valid regex"));

/// How often the classification phase reports progress.
const PROGRESS_INTERVAL: usize = 100;

/// A component pointer that did not resolve while building a service.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{service}: {pointer}")]
pub struct UnresolvedRef {
    /// The service whose closure the pointer was discovered in.
    pub service: String,
    /// The pointer string as it appears in the document.
    pub pointer: String,
}

/// Counters and warnings accumulated over one partitioning run.
///
/// `unresolved` is the typed form of the "dangling reference" warnings: the
/// affected service documents are still produced (and written), but they are
/// semantically incomplete at those pointers.
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    /// Operations seen during classification.
    pub operations: usize,
    /// Operations dropped by the exclude list.
    pub excluded: usize,
    /// Operations dropped by the skip sentinel.
    pub skipped: usize,
    /// Component pointers that did not resolve in the source document.
    pub unresolved: Vec<UnresolvedRef>,
}

/// The result of one partitioning run: service documents keyed by service
/// name, plus the run report.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// One self-contained document per service.
    pub services: BTreeMap<String, Service>,
    /// Counters and dangling-reference warnings.
    pub report: SplitReport,
}

/// Partitions `document` into one service document per discriminator value.
///
/// Three phases over the document's paths: classification (discriminator +
/// override table + exclude list), per-service reference-closure resolution,
/// and post-processing normalization. The source document is never mutated;
/// every fragment placed into a service is a deep copy.
///
/// # Errors
///
/// Returns [`SplitError::MalformedDocument`] when the document root is not a
/// mapping. Dangling references are not errors; see [`SplitReport`].
pub fn partition(document: &Value, options: &SplitOptions) -> Result<SplitOutcome, SplitError> {
    let root = document
        .as_object()
        .ok_or_else(|| SplitError::MalformedDocument {
            reason: "document root must be a mapping".to_string(),
        })?;

    let empty_paths = Map::new();
    let paths = root
        .get("paths")
        .and_then(Value::as_object)
        .unwrap_or(&empty_paths);
    let document_tags = root.get("tags").and_then(Value::as_array);

    info!(provider = %options.provider, discriminator = %options.discriminator, count = paths.len(), "splitting document paths into services");

    let mut services: BTreeMap<String, Service> = BTreeMap::new();
    let mut report = SplitReport::default();

    // Phase 1: classify operations into services.
    for (path_key, path_item) in paths {
        let Some(path_map) = path_item.as_object() else {
            continue;
        };
        debug!(path = %path_key, "processing path");

        let mut path_services: BTreeSet<String> = BTreeSet::new();

        for (verb, operation) in path_map {
            if !is_operation_verb(verb) || operation.is_null() {
                continue;
            }

            report.operations += 1;
            if report.operations % PROGRESS_INTERVAL == 0 {
                info!(operations = report.operations, "operations processed");
            }

            if is_excluded(operation, &options.exclude) {
                debug!(path = %path_key, verb = %verb, "operation excluded by tag");
                report.excluded += 1;
                continue;
            }

            let (service_name, service_description) =
                classify(options, operation, path_key, document_tags);
            if service_name == SKIP_SENTINEL {
                warn!(path = %path_key, verb = %verb, "operation classified as skip, dropping");
                report.skipped += 1;
                continue;
            }

            let service = services.entry(service_name.clone()).or_insert_with(|| {
                debug!(service = %service_name, "first occurrence of service");
                Service::skeleton(&service_name, &service_description, root)
            });

            let entry = service
                .paths
                .entry(path_key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(entry) = entry.as_object_mut() {
                entry.insert(verb.clone(), operation.clone());
            }
            path_services.insert(service_name);
        }

        // Shared path-level entries go into every service using this path.
        for service_name in &path_services {
            let Some(entry) = services
                .get_mut(service_name)
                .and_then(|service| service.paths.get_mut(path_key))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };
            for (key, shared) in path_map {
                if !is_operation_verb(key) {
                    entry.insert(key.clone(), shared.clone());
                }
            }
        }
    }

    // Phase 2: compute each service's component closure.
    let empty_components = Value::Object(Map::new());
    let source_components = root.get("components").unwrap_or(&empty_components);

    for (service_name, service) in &mut services {
        let mut seeds: BTreeSet<String> = BTreeSet::new();
        for path_item in service.paths.values() {
            seeds.extend(collect_refs(path_item));
        }
        debug!(service = %service_name, refs = seeds.len(), "resolving component closure");

        let closure = compute_closure(seeds, source_components);
        service.components = closure.components;
        report
            .unresolved
            .extend(closure.unresolved.into_iter().map(|pointer| UnresolvedRef {
                service: service_name.clone(),
                pointer,
            }));
    }

    // Phase 3: normalize.
    for (service_name, service) in &mut services {
        debug!(service = %service_name, "post-processing service");
        rename_hyphenated_path_params(&mut service.paths);
        for path_item in service.paths.values_mut() {
            add_missing_object_types(path_item);
        }
        for members in service.components.values_mut() {
            for component in members.values_mut() {
                add_missing_object_types(component);
            }
        }
        service.components.retain(|_, members| !members.is_empty());
    }

    info!(
        services = services.len(),
        operations = report.operations,
        unresolved = report.unresolved.len(),
        "partitioned document"
    );
    Ok(SplitOutcome { services, report })
}

/// An operation is excluded when any of its tags appears in the exclude list.
fn is_excluded(operation: &Value, exclude: &[String]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    operation
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .any(|tag| exclude.iter().any(|excluded| excluded == tag))
        })
}

/// Computes the `(service_name, service_description)` pair for an operation
/// under the active discriminator, then applies the override table.
fn classify(
    options: &SplitOptions,
    operation: &Value,
    path_key: &str,
    document_tags: Option<&Vec<Value>>,
) -> (String, String) {
    let mut service = "default".to_string();
    let mut description = format!("{} API", options.provider);

    match options.discriminator {
        Discriminator::Tag => {
            if let Some(first_tag) = operation
                .get("tags")
                .and_then(Value::as_array)
                .and_then(|tags| tags.first())
                .and_then(Value::as_str)
            {
                service = service_name_from(first_tag);
                if let Some(tag_description) = lookup_tag_description(document_tags, &service) {
                    description = tag_description;
                }
            }
        }
        Discriminator::Path => {
            if let Some(segment) = significant_path_segment(path_key) {
                service = segment;
            }
            description = format!("{} {service} API", options.provider);
        }
    }

    // A computed `skip` short-circuits before overrides; an override *to*
    // `skip` is caught by the caller.
    if service == SKIP_SENTINEL {
        return (service, String::new());
    }

    if let Some(replacement) = options.name_overrides.get(&service) {
        debug!(from = %service, to = %replacement, "overriding service name");
        if options.discriminator == Discriminator::Path {
            description = format!("{} {replacement} API", options.provider);
        }
        service = replacement.clone();
    }

    (service, description)
}

/// Snake-cases a discriminator value into a service name. Dots become
/// underscores first so versioned segments like `ml.v2` stay one word.
fn service_name_from(raw: &str) -> String {
    use cruet::*;

    raw.replace('.', "_").to_snake_case()
}

/// Finds the description of the document tag whose name matches the
/// computed service name.
fn lookup_tag_description(document_tags: Option<&Vec<Value>>, service: &str) -> Option<String> {
    document_tags?.iter().find_map(|tag| {
        let name = tag.get("name").and_then(Value::as_str)?;
        if service_name_from(name) == service {
            tag.get("description")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        } else {
            None
        }
    })
}

/// First path segment that is neither `api` nor a version marker.
fn significant_path_segment(path_key: &str) -> Option<String> {
    path_key
        .trim_start_matches('/')
        .split('/')
        .map(str::to_lowercase)
        .find(|segment| {
            !segment.is_empty() && segment != "api" && !VERSION_SEGMENT.is_match(segment)
        })
        .map(|segment| service_name_from(&segment))
}
