//! Type Resolution Rules
//!
//! - SchemaRefRule: entry point for any node; follows `$ref` and reuses
//!   types already compiled from the same node
//! - TypeRule: dispatches on `enum` and `type`
//! - ArrayRule: `array` schemas, keyed on `items` and `uniqueItems`
//! - FormatRule: refines string scalars by `format`

use serde_json::Value;

use super::{Generation, SchemaRule};
use crate::error::{GenerationError, Result};
use crate::model::{Container, ScalarKind, TypeRef};
use crate::naming;
use crate::schema::{self, SchemaType};

// =============================================================================
// Schema ($ref + memo)
// =============================================================================

/// Resolves `$ref` against the root document and memoizes node -> type, so
/// a node compiles at most once and reference cycles terminate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaRefRule;

impl SchemaRule<Container, TypeRef> for SchemaRefRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Container, cx: &mut Generation<'s>) -> Result<TypeRef> {
        if let Some(id) = cx.compiled(node) {
            return Ok(TypeRef::Declared(id));
        }

        let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
            return cx.rules().type_rule().apply(name, node, target, cx);
        };

        let resolved = schema::resolve_ref(cx.root(), reference).ok_or_else(|| {
            GenerationError::UnresolvedRef {
                reference: reference.to_string(),
            }
        })?;
        if let Some(id) = cx.compiled(resolved) {
            tracing::debug!("Reusing {} for $ref {}", cx.package()[id], reference);
            return Ok(TypeRef::Declared(id));
        }

        // Cycles end at the memo of an object or enum; one that passes
        // through neither (a `$ref` chain, an array of itself) never does.
        let Some(previous) = cx.begin_resolving(resolved) else {
            return Err(GenerationError::UnresolvedRef {
                reference: reference.to_string(),
            });
        };

        let target_name = schema::ref_name(reference).unwrap_or_else(|| name.to_string());
        tracing::debug!("Following $ref {} as {}", reference, target_name);
        let result = cx
            .rules()
            .schema_rule()
            .apply(&target_name, resolved, Container::Package, cx);
        cx.end_resolving(resolved, previous);
        result
    }
}

// =============================================================================
// Type dispatch
// =============================================================================

/// Chooses the rule for a node from its `enum` and `type` keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeRule;

impl SchemaRule<Container, TypeRef> for TypeRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Container, cx: &mut Generation<'s>) -> Result<TypeRef> {
        match node {
            Value::Object(_) => {}
            Value::Bool(_) => return Ok(TypeRef::any()),
            _ => return Err(GenerationError::malformed(name, "schema object", node)),
        }

        let rules = cx.rules();
        if is_string_enum(node) {
            return rules.enum_rule().apply(name, node, target, cx).map(TypeRef::Declared);
        }
        if node.get("enum").is_some() {
            tracing::warn!("Enum {} has non-string constants; using its declared type", name);
        }

        let Some(schema_type) = schema::declared_type(node) else {
            tracing::warn!("Unknown type {} on {}; treating as any", node["type"], name);
            return Ok(TypeRef::any());
        };

        let ty = match schema_type {
            SchemaType::Object => TypeRef::Declared(rules.object_rule().apply(name, node, target, cx)?),
            SchemaType::Array => rules.array_rule().apply(name, node, target, cx)?,
            SchemaType::String => match node.get("format") {
                Some(format) => TypeRef::Scalar(rules.format_rule().apply(name, format, ScalarKind::String, cx)?),
                None => TypeRef::Scalar(ScalarKind::String),
            },
            SchemaType::Integer => TypeRef::Scalar(ScalarKind::Integer),
            SchemaType::Number => TypeRef::Scalar(ScalarKind::Number),
            SchemaType::Boolean => TypeRef::Scalar(ScalarKind::Boolean),
            SchemaType::Null => TypeRef::Scalar(ScalarKind::Null),
            SchemaType::Any => TypeRef::any(),
        };
        Ok(ty)
    }
}

fn is_string_enum(node: &Value) -> bool {
    match node.get("enum") {
        Some(Value::Array(values)) => !values.is_empty() && values.iter().all(Value::is_string),
        _ => false,
    }
}

// =============================================================================
// Array
// =============================================================================

/// `array` schemas become lists, or sets with `uniqueItems: true`.
///
/// The item schema is compiled under the singular of the array's name, so
/// `addresses` items become `Address`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayRule;

impl SchemaRule<Container, TypeRef> for ArrayRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Container, cx: &mut Generation<'s>) -> Result<TypeRef> {
        let item_name = if cx.config().singularize_array_items {
            naming::singular(name)
        } else {
            name.to_string()
        };

        let item_type = match node.get("items") {
            None => TypeRef::any(),
            Some(Value::Array(_)) => {
                tracing::warn!("Tuple items on {} are not supported; treating items as any", name);
                TypeRef::any()
            }
            Some(items) => cx.rules().schema_rule().apply(&item_name, items, target, cx)?,
        };

        let unique = node.get("uniqueItems").and_then(Value::as_bool).unwrap_or(false);
        Ok(if unique {
            TypeRef::Set(Box::new(item_type))
        } else {
            TypeRef::List(Box::new(item_type))
        })
    }
}

// =============================================================================
// Format
// =============================================================================

/// Maps a `format` keyword onto a scalar kind. Unknown formats keep the base
/// kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatRule;

impl SchemaRule<ScalarKind, ScalarKind> for FormatRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: ScalarKind, _cx: &mut Generation<'s>) -> Result<ScalarKind> {
        let kind = match node.as_str() {
            Some("date-time") => ScalarKind::DateTime,
            Some("date") => ScalarKind::Date,
            Some("time") => ScalarKind::Time,
            Some("uri" | "uri-reference" | "url") => ScalarKind::Uri,
            Some("email") => ScalarKind::Email,
            Some("uuid") => ScalarKind::Uuid,
            Some("utc-millisec") => ScalarKind::Integer,
            Some(other) => {
                tracing::debug!("No mapping for format {} on {}", other, name);
                target
            }
            None => target,
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::model::{Package, TypeId};
    use crate::naming::Naming;
    use crate::rules::RuleFactory;

    fn resolve(root: &Value, name: &str) -> Result<(Package, TypeRef)> {
        let rules = RuleFactory::new();
        let config = GenerationConfig::default();
        let naming = Naming::default();
        let mut package = Package::new("test");
        let ty = {
            let mut cx = Generation::new(&rules, &config, &naming, root, &mut package);
            rules.schema_rule().apply(name, root, Container::Package, &mut cx)?
        };
        Ok((package, ty))
    }

    fn declared(ty: &TypeRef) -> TypeId {
        match ty {
            TypeRef::Declared(id) => *id,
            other => panic!("Expected declared type, got {:?}", other),
        }
    }

    #[test]
    fn test_scalars_and_formats() {
        let cases = [
            (json!({"type": "string"}), ScalarKind::String),
            (json!({"type": "integer"}), ScalarKind::Integer),
            (json!({"type": "number"}), ScalarKind::Number),
            (json!({"type": "boolean"}), ScalarKind::Boolean),
            (json!({"type": "null"}), ScalarKind::Null),
            (json!({}), ScalarKind::Any),
            (json!({"type": "string", "format": "date-time"}), ScalarKind::DateTime),
            (json!({"type": "string", "format": "uuid"}), ScalarKind::Uuid),
            (json!({"type": "string", "format": "hostname"}), ScalarKind::String),
        ];
        for (node, expected) in cases {
            let (_, ty) = resolve(&node, "value").unwrap();
            assert_eq!(ty, TypeRef::Scalar(expected), "schema {}", node);
        }
    }

    #[test]
    fn test_arrays() {
        let (_, ty) = resolve(&json!({"type": "array", "items": {"type": "string"}}), "tags").unwrap();
        assert_eq!(ty, TypeRef::List(Box::new(TypeRef::Scalar(ScalarKind::String))));

        let (_, ty) = resolve(&json!({"type": "array", "uniqueItems": true}), "tags").unwrap();
        assert_eq!(ty, TypeRef::Set(Box::new(TypeRef::any())));

        let node = json!({"type": "array", "items": {"type": "object"}});
        let (package, ty) = resolve(&node, "addresses").unwrap();
        let address = package.lookup("Address").unwrap();
        assert_eq!(ty, TypeRef::List(Box::new(TypeRef::Declared(address))));
    }

    #[test]
    fn test_string_enum_declares_type() {
        let (package, ty) = resolve(&json!({"enum": ["a", "b"]}), "letter").unwrap();
        assert!(package[declared(&ty)].is_enum());

        let (package, ty) = resolve(&json!({"type": "integer", "enum": [1, 2]}), "level").unwrap();
        assert_eq!(ty, TypeRef::Scalar(ScalarKind::Integer));
        assert!(package.is_empty());
    }

    #[test]
    fn test_local_ref_reuses_definition() {
        let root = json!({
            "type": "object",
            "properties": {
                "home": {"$ref": "#/definitions/address"},
                "work": {"$ref": "#/definitions/address"}
            },
            "definitions": {
                "address": {"type": "object", "properties": {"city": {"type": "string"}}}
            }
        });

        let (package, ty) = resolve(&root, "person").unwrap();
        let person = declared(&ty);
        let address = package.lookup("Address").unwrap();

        assert_eq!(package.len(), 2);
        assert_eq!(package[person].fields[0].ty, TypeRef::Declared(address));
        assert_eq!(package[person].fields[1].ty, TypeRef::Declared(address));
        assert_eq!(package[address].enclosing, None);
    }

    #[test]
    fn test_self_reference_terminates() {
        let root = json!({
            "type": "object",
            "properties": {
                "parent": {"$ref": "#"},
                "children": {"type": "array", "items": {"$ref": "#"}}
            }
        });

        let (package, ty) = resolve(&root, "node").unwrap();
        let node = declared(&ty);

        assert_eq!(package.len(), 1);
        assert_eq!(package[node].fields[0].ty, TypeRef::Declared(node));
        assert_eq!(package[node].fields[1].ty, TypeRef::List(Box::new(TypeRef::Declared(node))));
    }

    #[test]
    fn test_unresolvable_refs() {
        let root = json!({"properties": {"x": {"$ref": "#/definitions/missing"}}});
        let err = resolve(&root, "broken").unwrap_err();
        assert_eq!(err, GenerationError::UnresolvedRef { reference: "#/definitions/missing".to_string() });

        let root = json!({"properties": {"x": {"$ref": "http://example.com/other.json"}}});
        assert!(matches!(resolve(&root, "remote"), Err(GenerationError::UnresolvedRef { .. })));

        let root = json!({"definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"$ref": "#/definitions/a"}},
                          "properties": {"x": {"$ref": "#/definitions/a"}}});
        assert!(matches!(resolve(&root, "looped"), Err(GenerationError::UnresolvedRef { .. })));
    }

    #[test]
    fn test_recursion_through_array_definition() {
        let root = json!({
            "type": "object",
            "properties": {"nodes": {"$ref": "#/definitions/nodeList"}},
            "definitions": {
                "nodeList": {"type": "array", "items": {"$ref": "#/definitions/node"}},
                "node": {"type": "object", "properties": {"children": {"$ref": "#/definitions/nodeList"}}}
            }
        });

        let (package, ty) = resolve(&root, "graph").unwrap();
        let graph = declared(&ty);
        let node = package.lookup("Node").unwrap();

        assert_eq!(package.len(), 2);
        assert_eq!(package[graph].fields[0].ty, TypeRef::List(Box::new(TypeRef::Declared(node))));
        assert_eq!(package[node].fields[0].ty, TypeRef::List(Box::new(TypeRef::Declared(node))));
    }

    #[test]
    fn test_array_of_itself_is_unresolved() {
        let root = json!({
            "properties": {"nested": {"$ref": "#/definitions/nested"}},
            "definitions": {"nested": {"type": "array", "items": {"$ref": "#/definitions/nested"}}}
        });

        let err = resolve(&root, "deep").unwrap_err();
        assert_eq!(err, GenerationError::UnresolvedRef { reference: "#/definitions/nested".to_string() });
    }

    #[test]
    fn test_non_schema_node_is_malformed() {
        let err = resolve(&json!(42), "answer").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed { found: "number", .. }));
    }
}
