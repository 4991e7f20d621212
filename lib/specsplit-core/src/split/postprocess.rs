//! Normalization passes applied to each service after closure resolution.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::is_operation_verb;

/// Matches a `{placeholder}` containing at least one hyphen.
static HYPHENATED_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*-[^{}]*)\}").expect("a valid regex"));

/// Rewrites hyphenated path placeholders to underscores, renaming the
/// matching path parameters alongside so template and declaration never
/// diverge: `/users/{user-id}` becomes `/users/{user_id}` and a path
/// parameter named `user-id` becomes `user_id`.
pub(super) fn rename_hyphenated_path_params(paths: &mut Map<String, Value>) {
    let path_keys: Vec<String> = paths.keys().cloned().collect();

    for path_key in path_keys {
        let mut renames: Vec<(String, String)> = Vec::new();
        let updated_key = HYPHENATED_PLACEHOLDER
            .replace_all(&path_key, |caps: &Captures<'_>| {
                let original = caps.get(1).map_or("", |placeholder| placeholder.as_str());
                let underscored = original.replace('-', "_");
                renames.push((original.to_string(), underscored.clone()));
                format!("{{{underscored}}}")
            })
            .into_owned();

        if updated_key == path_key {
            continue;
        }
        debug!(from = %path_key, to = %updated_key, "renaming hyphenated path placeholders");

        let Some(mut path_item) = paths.shift_remove(&path_key) else {
            continue;
        };
        rename_path_parameters(&mut path_item, &renames);
        paths.insert(updated_key, path_item);
    }
}

/// Renames path parameters declared at path level or on any operation.
fn rename_path_parameters(path_item: &mut Value, renames: &[(String, String)]) {
    let Some(item) = path_item.as_object_mut() else {
        return;
    };

    for (key, entry) in item.iter_mut() {
        if key == "parameters" {
            rename_parameter_list(entry, renames);
        } else if is_operation_verb(key)
            && let Some(parameters) = entry.get_mut("parameters")
        {
            rename_parameter_list(parameters, renames);
        }
    }
}

fn rename_parameter_list(parameters: &mut Value, renames: &[(String, String)]) {
    let Some(list) = parameters.as_array_mut() else {
        return;
    };

    for parameter in list {
        let Some(declaration) = parameter.as_object_mut() else {
            continue;
        };
        if declaration.get("in").and_then(Value::as_str) != Some("path") {
            continue;
        }
        let Some(name) = declaration.get("name").and_then(Value::as_str) else {
            continue;
        };
        if let Some((_, underscored)) = renames.iter().find(|(original, _)| original == name) {
            debug!(from = %name, to = %underscored, "renaming path parameter declaration");
            declaration.insert("name".to_string(), Value::String(underscored.clone()));
        }
    }
}

/// Injects `type: object` wherever a schema-shaped map declares
/// `properties` without a `type`; many downstream consumers require it.
pub(super) fn add_missing_object_types(node: &mut Value) {
    match node {
        Value::Object(map) => {
            if map.contains_key("properties") && !map.contains_key("type") {
                map.insert("type".to_string(), Value::String("object".to_string()));
            }
            for entry in map.values_mut() {
                add_missing_object_types(entry);
            }
        }
        Value::Array(items) => {
            for item in items {
                add_missing_object_types(item);
            }
        }
        _ => {}
    }
}
