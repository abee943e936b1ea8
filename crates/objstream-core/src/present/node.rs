//! Renderer-agnostic node tree produced by the presenter

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::FieldPath;

/// Runtime kind of a primitive leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    /// Kind of a JSON value, or `None` for null, arrays and objects
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(PrimitiveKind::String),
            Value::Number(_) => Some(PrimitiveKind::Number),
            Value::Bool(_) => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// What a node represents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Object { entries: usize },
    Array { len: usize },
    Primitive { primitive: PrimitiveKind },
    /// Explicit JSON null
    Null,
    /// Stand-in shown before any data has arrived
    Placeholder { message: String },
}

/// Which renderer handles a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKindTag {
    Object,
    Array,
    Primitive,
    Null,
}

impl NodeKindTag {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKindTag::Object,
            Value::Array(_) => NodeKindTag::Array,
            Value::Null => NodeKindTag::Null,
            _ => NodeKindTag::Primitive,
        }
    }
}

/// Selection event emitted when a host interacts with a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub path: FieldPath,
    pub value: Value,
}

/// One node of the presentation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub path: FieldPath,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// The node's own path is in the current update markers
    pub updated: bool,
    /// The host may emit a [`FieldSelection`] for this node
    pub selectable: bool,
    /// Leaf value (primitives and null only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Primitive { .. } | NodeKind::Null)
    }

    /// The selection event for this node, if it is a selectable leaf
    pub fn select(&self) -> Option<FieldSelection> {
        if !(self.selectable && self.is_leaf()) {
            return None;
        }
        Some(FieldSelection {
            path: self.path.clone(),
            value: self.value.clone().unwrap_or(Value::Null),
        })
    }

    /// Depth-first search for the node at `path`
    pub fn find(&self, path: &str) -> Option<&Node> {
        if self.path.as_str() == path && !matches!(self.kind, NodeKind::Placeholder { .. }) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Paths of every node flagged as updated, in depth-first order
    pub fn updated_paths(&self) -> Vec<&FieldPath> {
        let mut out = Vec::new();
        self.collect_updated(&mut out);
        out
    }

    fn collect_updated<'a>(&'a self, out: &mut Vec<&'a FieldPath>) {
        if self.updated {
            out.push(&self.path);
        }
        for child in &self.children {
            child.collect_updated(out);
        }
    }
}
