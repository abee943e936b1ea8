//! Pluggable node renderers
//!
//! The presenter walks the value and hands each location to the renderer
//! registered for its kind. Hosts override individual kinds through
//! [`RendererSet::with`]; everything else falls back to the built-ins.

use serde_json::Value;
use std::sync::Arc;

use crate::model::FieldPath;
use crate::present::node::{Node, NodeKind, NodeKindTag, PrimitiveKind};

/// Everything a renderer knows about the location being rendered
#[derive(Debug, Clone)]
pub struct NodeContext<'a> {
    pub path: &'a FieldPath,
    pub label: String,
    pub value: &'a Value,
    pub updated: bool,
    pub depth: usize,
    pub selectable: bool,
}

/// Builds the node for one location
///
/// `children` are already rendered (empty for leaves).
pub trait NodeRenderer: Send + Sync {
    fn render(&self, ctx: &NodeContext<'_>, children: Vec<Node>) -> Node;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectRenderer;

impl NodeRenderer for ObjectRenderer {
    fn render(&self, ctx: &NodeContext<'_>, children: Vec<Node>) -> Node {
        Node {
            path: ctx.path.clone(),
            label: ctx.label.clone(),
            kind: NodeKind::Object {
                entries: children.len(),
            },
            updated: ctx.updated,
            selectable: false,
            value: None,
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayRenderer;

impl NodeRenderer for ArrayRenderer {
    fn render(&self, ctx: &NodeContext<'_>, children: Vec<Node>) -> Node {
        Node {
            path: ctx.path.clone(),
            label: ctx.label.clone(),
            kind: NodeKind::Array {
                len: children.len(),
            },
            updated: ctx.updated,
            selectable: false,
            value: None,
            children,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveRenderer;

impl NodeRenderer for PrimitiveRenderer {
    fn render(&self, ctx: &NodeContext<'_>, _children: Vec<Node>) -> Node {
        // Non-primitive values only land here through a misregistered renderer.
        let primitive = PrimitiveKind::of(ctx.value).unwrap_or(PrimitiveKind::String);
        Node {
            path: ctx.path.clone(),
            label: ctx.label.clone(),
            kind: NodeKind::Primitive { primitive },
            updated: ctx.updated,
            selectable: ctx.selectable,
            value: Some(ctx.value.clone()),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl NodeRenderer for NullRenderer {
    fn render(&self, ctx: &NodeContext<'_>, _children: Vec<Node>) -> Node {
        Node {
            path: ctx.path.clone(),
            label: ctx.label.clone(),
            kind: NodeKind::Null,
            updated: ctx.updated,
            selectable: ctx.selectable,
            value: Some(Value::Null),
            children: Vec::new(),
        }
    }
}

/// One renderer per node kind
#[derive(Clone)]
pub struct RendererSet {
    object: Arc<dyn NodeRenderer>,
    array: Arc<dyn NodeRenderer>,
    primitive: Arc<dyn NodeRenderer>,
    null: Arc<dyn NodeRenderer>,
}

impl RendererSet {
    /// Replace the renderer for one kind
    pub fn with(mut self, tag: NodeKindTag, renderer: Arc<dyn NodeRenderer>) -> Self {
        match tag {
            NodeKindTag::Object => self.object = renderer,
            NodeKindTag::Array => self.array = renderer,
            NodeKindTag::Primitive => self.primitive = renderer,
            NodeKindTag::Null => self.null = renderer,
        }
        self
    }

    pub fn get(&self, tag: NodeKindTag) -> &dyn NodeRenderer {
        match tag {
            NodeKindTag::Object => self.object.as_ref(),
            NodeKindTag::Array => self.array.as_ref(),
            NodeKindTag::Primitive => self.primitive.as_ref(),
            NodeKindTag::Null => self.null.as_ref(),
        }
    }
}

impl Default for RendererSet {
    fn default() -> Self {
        Self {
            object: Arc::new(ObjectRenderer),
            array: Arc::new(ArrayRenderer),
            primitive: Arc::new(PrimitiveRenderer),
            null: Arc::new(NullRenderer),
        }
    }
}

impl std::fmt::Debug for RendererSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererSet").finish_non_exhaustive()
    }
}
