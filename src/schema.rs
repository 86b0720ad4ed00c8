//! Schema node helpers
//!
//! Schema nodes are plain `serde_json::Value`s parsed with `preserve_order`,
//! so object keys iterate in declared order. Everything here is read-only.

use serde_json::Value;

/// The `type` a schema node declares (or implies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Any,
}

impl SchemaType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

/// Identity of a node within the tree being compiled.
///
/// Two lookups of the same node (for example through two `$ref`s) yield the
/// same id for as long as the tree is borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn of(node: &Value) -> Self {
        Self(node as *const Value as usize)
    }
}

/// Short name of a node's JSON kind, for error messages
pub fn kind_name(node: &Value) -> &'static str {
    match node {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// Toggle semantics for marker keywords such as `optional` and `required`.
///
/// Only `true`, the string `"true"` and non-zero numbers count as set.
/// Objects, arrays and null are falsy.
pub fn is_truthy(node: &Value) -> bool {
    match node {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::Object(_) | Value::Array(_) | Value::Null => false,
    }
}

/// Resolve the type a node declares.
///
/// A `type` array resolves to its first non-null entry. Without `type`, a
/// node with `properties` or `additionalProperties` is an object, one with
/// `items` is an array, anything else is `Any`. Unknown type names yield
/// `None`.
pub fn declared_type(node: &Value) -> Option<SchemaType> {
    match node.get("type") {
        Some(Value::String(name)) => SchemaType::from_name(name),
        Some(Value::Array(names)) => {
            let mut names = names.iter().filter_map(Value::as_str);
            match names.find(|n| *n != "null") {
                Some(name) => SchemaType::from_name(name),
                None => Some(SchemaType::Null),
            }
        }
        Some(_) => None,
        None => {
            if node.get("properties").is_some() || node.get("additionalProperties").is_some() {
                Some(SchemaType::Object)
            } else if node.get("items").is_some() {
                Some(SchemaType::Array)
            } else {
                Some(SchemaType::Any)
            }
        }
    }
}

/// Whether a `type` array admits `null` next to another type
pub fn is_nullable(node: &Value) -> bool {
    match node.get("type") {
        Some(Value::Array(names)) => {
            names.len() > 1 && names.iter().any(|n| n.as_str() == Some("null"))
        }
        _ => false,
    }
}

/// Resolve a document-local `$ref` (`#` or `#/json/pointer`) against `root`.
///
/// References into other documents are not followed and yield `None`.
pub fn resolve_ref<'s>(root: &'s Value, reference: &str) -> Option<&'s Value> {
    let fragment = reference.strip_prefix('#')?;
    if fragment.is_empty() {
        return Some(root);
    }
    root.pointer(fragment)
}

/// Symbolic name for a `$ref` target: its last pointer segment.
pub fn ref_name(reference: &str) -> Option<String> {
    let fragment = reference.strip_prefix('#')?;
    fragment
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
}
