//! Schema bodies decoded into a closed set of node kinds.
//!
//! A schema body is JSON text. It is decoded once into a [`SchemaNode`]
//! tree; the synthesizer then matches on node kinds instead of probing
//! keys. Decoding never fails on an unrecognized or partial node: those
//! become [`SchemaNode::Unknown`]. Only a body that is not JSON at all is
//! an error.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// The schema body could not be parsed as JSON.
#[derive(Error, Debug)]
#[error("failed to decode schema body: {0}")]
pub struct SchemaDecodeError(#[from] serde_json::Error);

/// One node of a decoded schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `const`: always this literal
    Const(Value),

    /// `enum`: one of these literals
    Enum(Vec<Value>),

    /// `anyOf` / `oneOf`: one of these alternatives
    OneOf(Vec<SchemaNode>),

    /// `allOf`: every alternative, shallow-merged when they are objects
    AllOf(Vec<SchemaNode>),

    /// `type: object`, or bare `properties`. Keys iterate in sorted order.
    Object(BTreeMap<String, SchemaNode>),

    Array(ArraySchema),

    String(StringSchema),

    Integer(NumericBounds),

    Number(NumericBounds),

    Boolean,

    /// Anything else; synthesizes to null
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    /// `None` means the array has no item schema and is always empty
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<i64>,
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    pub examples: Vec<Value>,
    pub default: Option<Value>,
    pub format: Option<StringFormat>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
}

/// String formats with dedicated generators. Other formats are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Uuid,
    DateTime,
    Email,
}

impl StringFormat {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "uuid" => Some(Self::Uuid),
            "date-time" => Some(Self::DateTime),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericBounds {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl SchemaNode {
    /// Parse a schema body from JSON text.
    pub fn parse(body: &str) -> Result<Self, SchemaDecodeError> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&value))
    }

    /// Decode an already-parsed schema value.
    ///
    /// A bare list is shorthand for an array whose item schema is the
    /// list's first element.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Array(list) => Self::Array(ArraySchema {
                items: list.first().map(|first| Box::new(Self::from_value(first))),
                ..ArraySchema::default()
            }),
            _ => Self::Unknown,
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        if let Some(literal) = map.get("const") {
            return Self::Const(literal.clone());
        }

        if let Some(choices) = non_empty_list(map, "enum") {
            return Self::Enum(choices.to_vec());
        }

        if let Some(alternatives) =
            non_empty_list(map, "anyOf").or_else(|| non_empty_list(map, "oneOf"))
        {
            return Self::OneOf(alternatives.iter().map(Self::from_value).collect());
        }

        if let Some(parts) = non_empty_list(map, "allOf") {
            return Self::AllOf(parts.iter().map(Self::from_value).collect());
        }

        match map.get("type") {
            Some(type_value) => match type_name(type_value) {
                Some("object") => Self::Object(properties(map)),
                Some("array") => Self::Array(ArraySchema {
                    items: map.get("items").map(|items| Box::new(Self::from_value(items))),
                    min_items: int_field(map, "minItems"),
                    max_items: int_field(map, "maxItems"),
                }),
                Some("string") => Self::String(StringSchema {
                    examples: map
                        .get("examples")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default(),
                    default: map.get("default").cloned(),
                    format: map
                        .get("format")
                        .and_then(Value::as_str)
                        .and_then(StringFormat::parse),
                    min_length: int_field(map, "minLength"),
                    max_length: int_field(map, "maxLength"),
                }),
                Some("integer") => Self::Integer(bounds(map)),
                Some("number") => Self::Number(bounds(map)),
                Some("boolean") => Self::Boolean,
                _ => Self::Unknown,
            },
            None if map.get("properties").is_some_and(Value::is_object) => {
                Self::Object(properties(map))
            }
            None => Self::Unknown,
        }
    }
}

/// The node's type name. A list of types uses its first recognized entry.
fn type_name(value: &Value) -> Option<&str> {
    const KNOWN: [&str; 6] = ["object", "array", "string", "integer", "number", "boolean"];

    match value {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| KNOWN.contains(name)),
        _ => None,
    }
}

fn non_empty_list<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a [Value]> {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|list| !list.is_empty())
}

fn properties(map: &Map<String, Value>) -> BTreeMap<String, SchemaNode> {
    map.get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| (name.clone(), SchemaNode::from_value(schema)))
                .collect()
        })
        .unwrap_or_default()
}

fn int_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = map.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn bounds(map: &Map<String, Value>) -> NumericBounds {
    NumericBounds {
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_json_fails() {
        assert!(SchemaNode::parse("{ not json").is_err());
        assert!(SchemaNode::parse("").is_err());
    }

    #[test]
    fn test_scalar_body_is_unknown() {
        assert_eq!(SchemaNode::parse("42").unwrap(), SchemaNode::Unknown);
        assert_eq!(SchemaNode::parse(r#"{"type":"null"}"#).unwrap(), SchemaNode::Unknown);
    }

    #[test]
    fn test_const_wins_over_everything() {
        let node = SchemaNode::from_value(&json!({
            "const": "fixed",
            "enum": ["a", "b"],
            "type": "string"
        }));
        assert_eq!(node, SchemaNode::Const(json!("fixed")));
    }

    #[test]
    fn test_const_null_is_kept() {
        let node = SchemaNode::from_value(&json!({ "const": null }));
        assert_eq!(node, SchemaNode::Const(Value::Null));
    }

    #[test]
    fn test_empty_enum_falls_through_to_type() {
        let node = SchemaNode::from_value(&json!({ "enum": [], "type": "boolean" }));
        assert_eq!(node, SchemaNode::Boolean);
    }

    #[test]
    fn test_one_of_and_any_of() {
        let node = SchemaNode::from_value(&json!({ "oneOf": [{ "type": "integer" }] }));
        assert!(matches!(node, SchemaNode::OneOf(ref alts) if alts.len() == 1));

        let node = SchemaNode::from_value(&json!({ "anyOf": [], "type": "number" }));
        assert!(matches!(node, SchemaNode::Number(_)));
    }

    #[test]
    fn test_object_properties_are_sorted() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": { "zeta": { "type": "string" }, "alpha": { "type": "integer" } }
        }));
        let SchemaNode::Object(props) = node else {
            panic!("expected object");
        };
        let keys: Vec<&str> = props.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_bare_properties_is_implicit_object() {
        let node = SchemaNode::from_value(&json!({ "properties": { "x": { "type": "boolean" } } }));
        assert!(matches!(node, SchemaNode::Object(ref p) if p.contains_key("x")));
    }

    #[test]
    fn test_array_fields() {
        let node = SchemaNode::from_value(&json!({
            "type": "array",
            "items": { "type": "boolean" },
            "minItems": 3,
            "maxItems": 3.0
        }));
        let SchemaNode::Array(array) = node else {
            panic!("expected array");
        };
        assert_eq!(array.items.as_deref(), Some(&SchemaNode::Boolean));
        assert_eq!(array.min_items, Some(3));
        assert_eq!(array.max_items, Some(3));
    }

    #[test]
    fn test_list_shorthand() {
        let node = SchemaNode::from_value(&json!([{ "type": "integer" }, { "type": "string" }]));
        let SchemaNode::Array(array) = node else {
            panic!("expected array");
        };
        assert!(matches!(array.items.as_deref(), Some(SchemaNode::Integer(_))));

        let empty = SchemaNode::from_value(&json!([]));
        assert_eq!(empty, SchemaNode::Array(ArraySchema::default()));
    }

    #[test]
    fn test_type_list_uses_first_known() {
        let node = SchemaNode::from_value(&json!({ "type": ["null", "string"] }));
        assert!(matches!(node, SchemaNode::String(_)));
    }

    #[test]
    fn test_string_fields() {
        let node = SchemaNode::from_value(&json!({
            "type": "string",
            "format": "email",
            "minLength": 2,
            "examples": ["x"],
            "default": "d"
        }));
        let SchemaNode::String(string) = node else {
            panic!("expected string");
        };
        assert_eq!(string.format, Some(StringFormat::Email));
        assert_eq!(string.min_length, Some(2));
        assert_eq!(string.examples, vec![json!("x")]);
        assert_eq!(string.default, Some(json!("d")));
    }

    #[test]
    fn test_unknown_format_is_ignored() {
        let node = SchemaNode::from_value(&json!({ "type": "string", "format": "hostname" }));
        assert!(matches!(node, SchemaNode::String(StringSchema { format: None, .. })));
    }
}
