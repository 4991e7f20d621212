use serde_json::{Map, Value};
use tracing::debug;

use super::guard::TraversalGuard;

/// Folds every `allOf` chain in `node` into one concrete shape, in place.
///
/// Branches are folded left to right: scalar keys shallow-merge with the
/// later branch overwriting the earlier one, `properties` maps deep-merge
/// per property (later wins), and `required` arrays union as a set. Each
/// branch is itself merged before being folded, so nested chains collapse
/// bottom-up.
pub fn merge_all_of(node: &mut Value) {
    let mut guard = TraversalGuard::default();
    merge_all_of_at(node, &mut guard);
}

/// Replaces every `anyOf`/`oneOf` in `node` with its first branch, in place.
///
/// This drops the alternative branches on purpose: downstream generators
/// need one concrete shape, not a sum type. Every collapse is logged at
/// debug level with the number of branches discarded.
pub fn resolve_union_first_branch(node: &mut Value) {
    let mut guard = TraversalGuard::default();
    resolve_union_at(node, &mut guard);
}

/// Deletes every property marked `readOnly: true` from `node`, in place,
/// leaving the writable shape.
pub fn strip_read_only(node: &mut Value) {
    let mut guard = TraversalGuard::default();
    strip_read_only_at(node, &mut guard);
}

fn merge_all_of_at(node: &mut Value, guard: &mut TraversalGuard) {
    if !node.is_object() {
        return;
    }
    if !guard.enter(node, "merge_all_of") {
        return;
    }

    let has_all_of = node.get("allOf").is_some_and(Value::is_array);
    if has_all_of
        && let Some(Value::Array(branches)) = node
            .as_object_mut()
            .and_then(|object| object.remove("allOf"))
    {
        let mut accumulator = Map::new();
        for mut branch in branches {
            merge_all_of_at(&mut branch, guard);
            fold_branch(&mut accumulator, branch);
        }
        *node = Value::Object(accumulator);
    }

    for_each_property(node, &mut |child| merge_all_of_at(child, guard));
    for_each_nested_schema(node, &mut |child| merge_all_of_at(child, guard));

    guard.exit();
}

/// Shallow-merges one `allOf` branch onto the accumulator.
fn fold_branch(accumulator: &mut Map<String, Value>, branch: Value) {
    let Value::Object(branch) = branch else {
        debug!("ignoring non-object allOf branch");
        return;
    };

    for (key, incoming) in branch {
        match key.as_str() {
            "properties" => {
                if let Value::Object(incoming_properties) = incoming {
                    let target = accumulator
                        .entry("properties")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Some(target) = target.as_object_mut() {
                        for (name, property) in incoming_properties {
                            target.insert(name, property);
                        }
                    }
                } else {
                    accumulator.insert(key, incoming);
                }
            }
            "required" => {
                if let Value::Array(incoming_required) = incoming {
                    let target = accumulator
                        .entry("required")
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Some(target) = target.as_array_mut() {
                        for name in incoming_required {
                            if !target.contains(&name) {
                                target.push(name);
                            }
                        }
                    }
                } else {
                    accumulator.insert(key, incoming);
                }
            }
            _ => {
                accumulator.insert(key, incoming);
            }
        }
    }
}

fn resolve_union_at(node: &mut Value, guard: &mut TraversalGuard) {
    if !node.is_object() {
        return;
    }
    if !guard.enter(node, "resolve_union_first_branch") {
        return;
    }

    for keyword in ["anyOf", "oneOf"] {
        let is_union = node.get(keyword).is_some_and(Value::is_array);
        if !is_union {
            continue;
        }
        if let Some(Value::Array(mut branches)) = node
            .as_object_mut()
            .and_then(|object| object.remove(keyword))
        {
            if branches.is_empty() {
                debug!(keyword, "dropping empty union keyword");
                continue;
            }
            debug!(
                keyword,
                discarded = branches.len() - 1,
                "collapsing union to its first branch"
            );
            let mut first = branches.swap_remove(0);
            resolve_union_at(&mut first, guard);
            *node = first;
            // The replacement was resolved in full by the recursive call.
            guard.exit();
            return;
        }
    }

    for_each_property(node, &mut |child| resolve_union_at(child, guard));
    for_each_nested_schema(node, &mut |child| resolve_union_at(child, guard));

    guard.exit();
}

fn strip_read_only_at(node: &mut Value, guard: &mut TraversalGuard) {
    if !node.is_object() {
        return;
    }
    if !guard.enter(node, "strip_read_only") {
        return;
    }

    if let Some(properties) = node
        .get_mut("properties")
        .and_then(Value::as_object_mut)
    {
        let read_only: Vec<String> = properties
            .iter()
            .filter(|(_, property)| {
                property.get("readOnly").and_then(Value::as_bool) == Some(true)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in &read_only {
            debug!(property = %name, "removing read-only property");
            properties.shift_remove(name);
        }
    }

    for_each_property(node, &mut |child| strip_read_only_at(child, guard));
    for_each_nested_schema(node, &mut |child| strip_read_only_at(child, guard));

    guard.exit();
}

/// Applies `visit` to every property value of `node`, if any.
fn for_each_property(node: &mut Value, visit: &mut dyn FnMut(&mut Value)) {
    if let Some(properties) = node
        .get_mut("properties")
        .and_then(Value::as_object_mut)
    {
        for property in properties.values_mut() {
            visit(property);
        }
    }
}

/// Applies `visit` to `items` (single node or list) and to an object-typed
/// `additionalProperties`, if present.
fn for_each_nested_schema(node: &mut Value, visit: &mut dyn FnMut(&mut Value)) {
    match node.get_mut("items") {
        Some(Value::Array(items)) => {
            for item in items {
                visit(item);
            }
        }
        Some(single @ Value::Object(_)) => visit(single),
        _ => {}
    }

    if let Some(additional @ Value::Object(_)) = node.get_mut("additionalProperties") {
        visit(additional);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_merge_with_later_branch_winning() {
        let mut node = json!({
            "allOf": [
                {"properties": {"x": {"type": "string"}}},
                {"properties": {"x": {"type": "integer"}}}
            ]
        });

        merge_all_of(&mut node);

        assert_eq!(
            node.get("properties")
                .and_then(|properties| properties.get("x"))
                .and_then(|x_schema| x_schema.get("type")),
            Some(&json!("integer"))
        );
        assert_eq!(node.get("allOf"), None);
    }

    #[test]
    fn should_union_required_as_set() {
        let mut node = json!({
            "allOf": [
                {"required": ["id", "name"]},
                {"required": ["name", "email"]}
            ]
        });

        merge_all_of(&mut node);

        assert_eq!(node.get("required"), Some(&json!(["id", "name", "email"])));
    }

    #[test]
    fn should_overwrite_scalar_keys_left_to_right() {
        let mut node = json!({
            "allOf": [
                {"type": "object", "description": "first"},
                {"description": "second"}
            ]
        });

        merge_all_of(&mut node);

        assert_eq!(node.get("type"), Some(&json!("object")));
        assert_eq!(node.get("description"), Some(&json!("second")));
    }

    #[test]
    fn should_collapse_nested_all_of_chains() {
        let mut node = json!({
            "allOf": [
                {
                    "allOf": [
                        {"properties": {"inner": {"type": "boolean"}}}
                    ]
                },
                {"properties": {"outer": {"type": "string"}}}
            ]
        });

        merge_all_of(&mut node);

        insta::assert_json_snapshot!(node, @r#"
        {
          "properties": {
            "inner": {
              "type": "boolean"
            },
            "outer": {
              "type": "string"
            }
          }
        }
        "#);
    }

    #[test]
    fn should_merge_inside_items_and_additional_properties() {
        let mut node = json!({
            "type": "array",
            "items": {
                "allOf": [
                    {"properties": {"id": {"type": "integer"}}},
                    {"properties": {"name": {"type": "string"}}}
                ]
            }
        });

        merge_all_of(&mut node);

        let items = node.get("items").expect("should keep items");
        assert!(items.get("allOf").is_none());
        assert!(
            items
                .get("properties")
                .is_some_and(|properties| properties.get("id").is_some()
                    && properties.get("name").is_some())
        );
    }

    #[test]
    fn should_return_deeply_nested_node_unmodified_past_ceiling() {
        // 30 levels of properties nesting; the deepest allOf sits past the
        // ceiling and must survive untouched.
        let mut node = json!({"allOf": [{"type": "object"}]});
        for _ in 0..30 {
            node = json!({"properties": {"child": node}});
        }
        let original = node.clone();

        merge_all_of(&mut node);

        let mut cursor = &node;
        for _ in 0..30 {
            cursor = cursor
                .get("properties")
                .and_then(|properties| properties.get("child"))
                .expect("nesting should be preserved");
        }
        assert_eq!(cursor.get("allOf"), original_deepest(&original));
    }

    fn original_deepest(node: &Value) -> Option<&Value> {
        let mut cursor = node;
        for _ in 0..30 {
            cursor = cursor.get("properties")?.get("child")?;
        }
        cursor.get("allOf")
    }

    #[test]
    fn should_resolve_any_of_to_first_branch() {
        let mut node = json!({
            "anyOf": [
                {"type": "integer", "format": "int64"},
                {"type": "string"}
            ]
        });

        resolve_union_first_branch(&mut node);

        assert_eq!(node, json!({"type": "integer", "format": "int64"}));
    }

    #[test]
    fn should_resolve_one_of_recursively() {
        let mut node = json!({
            "oneOf": [
                {
                    "oneOf": [
                        {"type": "boolean"},
                        {"type": "string"}
                    ]
                },
                {"type": "number"}
            ]
        });

        resolve_union_first_branch(&mut node);

        assert_eq!(node, json!({"type": "boolean"}));
    }

    #[test]
    fn should_resolve_unions_inside_properties() {
        let mut node = json!({
            "type": "object",
            "properties": {
                "size": {"anyOf": [{"type": "integer"}, {"type": "string"}]}
            }
        });

        resolve_union_first_branch(&mut node);

        assert_eq!(
            node.get("properties")
                .and_then(|properties| properties.get("size")),
            Some(&json!({"type": "integer"}))
        );
    }

    #[test]
    fn should_drop_empty_union_keyword() {
        let mut node = json!({"anyOf": [], "type": "object"});

        resolve_union_first_branch(&mut node);

        assert_eq!(node, json!({"type": "object"}));
    }

    #[test]
    fn should_strip_read_only_properties() {
        let mut node = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "readOnly": true},
                "name": {"type": "string"},
                "nested": {
                    "type": "object",
                    "properties": {
                        "created_at": {"type": "string", "readOnly": true},
                        "label": {"type": "string"}
                    }
                }
            }
        });

        strip_read_only(&mut node);

        insta::assert_json_snapshot!(node, @r#"
        {
          "type": "object",
          "properties": {
            "name": {
              "type": "string"
            },
            "nested": {
              "type": "object",
              "properties": {
                "label": {
                  "type": "string"
                }
              }
            }
          }
        }
        "#);
    }

    #[test]
    fn should_strip_read_only_inside_items() {
        let mut node = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "etag": {"type": "string", "readOnly": true},
                    "body": {"type": "string"}
                }
            }
        });

        strip_read_only(&mut node);

        let properties = node
            .get("items")
            .and_then(|items| items.get("properties"))
            .expect("should keep item properties");
        assert!(properties.get("etag").is_none());
        assert!(properties.get("body").is_some());
    }

    #[test]
    fn should_leave_scalars_untouched() {
        let mut node = json!("just a string");
        merge_all_of(&mut node);
        resolve_union_first_branch(&mut node);
        strip_read_only(&mut node);
        assert_eq!(node, json!("just a string"));
    }
}
