//! Passive description of the expected shape of the streamed object.
//!
//! The engine never validates against a schema. The descriptor's top-level
//! property names are the denominator for progress estimation; the nested
//! shape is kept for hosts that want to display what is still expected.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Primitive kinds a schema leaf may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

/// Recursively nested schema shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaDescriptor {
    Object {
        properties: BTreeMap<String, SchemaDescriptor>,
    },
    Array {
        items: Box<SchemaDescriptor>,
    },
    Scalar {
        scalar: ScalarKind,
    },
    /// Shape unknown or not described
    Any,
}

impl SchemaDescriptor {
    /// Build an object descriptor whose properties are all `Any`
    ///
    /// Convenient when only the top-level names matter.
    pub fn object_with<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaDescriptor::Object {
            properties: names
                .into_iter()
                .map(|n| (n.into(), SchemaDescriptor::Any))
                .collect(),
        }
    }

    /// Read a JSON-Schema-like document
    ///
    /// Recognises `properties` (object), `items` (array) and scalar `type`
    /// names. Anything else degrades to [`SchemaDescriptor::Any`]; this never
    /// fails, because a malformed schema must only weaken the progress
    /// estimate.
    pub fn from_json_schema(schema: &Value) -> Self {
        let Some(obj) = schema.as_object() else {
            return SchemaDescriptor::Any;
        };

        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            return SchemaDescriptor::Object {
                properties: props
                    .iter()
                    .map(|(k, v)| (k.clone(), SchemaDescriptor::from_json_schema(v)))
                    .collect(),
            };
        }

        if let Some(items) = obj.get("items") {
            return SchemaDescriptor::Array {
                items: Box::new(SchemaDescriptor::from_json_schema(items)),
            };
        }

        let scalar = match obj.get("type").and_then(Value::as_str) {
            Some("string") => ScalarKind::String,
            Some("number") => ScalarKind::Number,
            Some("integer") => ScalarKind::Integer,
            Some("boolean") => ScalarKind::Boolean,
            Some("null") => ScalarKind::Null,
            Some("object") => {
                return SchemaDescriptor::Object {
                    properties: BTreeMap::new(),
                }
            }
            _ => return SchemaDescriptor::Any,
        };
        SchemaDescriptor::Scalar { scalar }
    }

    /// Top-level property names, if this describes an object
    pub fn top_level_properties(&self) -> Option<impl Iterator<Item = &str>> {
        match self {
            SchemaDescriptor::Object { properties } => Some(properties.keys().map(String::as_str)),
            _ => None,
        }
    }

    /// Number of declared top-level properties (0 when not an object)
    pub fn top_level_count(&self) -> usize {
        match self {
            SchemaDescriptor::Object { properties } => properties.len(),
            _ => 0,
        }
    }

    /// Declared top-level properties not yet present in `snapshot`
    pub fn missing_properties<'a>(&'a self, snapshot: Option<&Value>) -> Vec<&'a str> {
        let present = snapshot.and_then(Value::as_object);
        match self.top_level_properties() {
            Some(names) => names
                .filter(|name| present.map_or(true, |obj| !obj.contains_key(*name)))
                .collect(),
            None => Vec::new(),
        }
    }
}
