//! Tree presenter
//!
//! Turns a snapshot plus its update markers into a renderer-agnostic
//! [`Node`] tree. Presenting is a pure function of its inputs; the only data
//! flowing back out is the [`FieldSelection`] a host obtains from
//! [`Node::select`].

pub mod node;
pub mod renderer;
pub mod text;

pub use node::{FieldSelection, Node, NodeKind, NodeKindTag, PrimitiveKind};
pub use renderer::{
    ArrayRenderer, NodeContext, NodeRenderer, NullRenderer, ObjectRenderer, PrimitiveRenderer,
    RendererSet,
};
pub use text::render_text;

use serde_json::Value;

use crate::model::{ChangeSet, FieldPath};

/// Message of the placeholder shown before any data arrives
pub const NO_DATA_MESSAGE: &str = "no data yet";

/// Per-call presentation settings
#[derive(Debug, Clone)]
pub struct PresentOptions {
    pub renderers: RendererSet,
    /// Label of the root node
    pub root_label: String,
    /// Whether leaves emit selection events
    pub selectable_leaves: bool,
}

impl Default for PresentOptions {
    fn default() -> Self {
        Self {
            renderers: RendererSet::default(),
            root_label: "root".to_string(),
            selectable_leaves: true,
        }
    }
}

impl PresentOptions {
    pub fn with_renderer(
        mut self,
        tag: NodeKindTag,
        renderer: std::sync::Arc<dyn NodeRenderer>,
    ) -> Self {
        self.renderers = self.renderers.with(tag, renderer);
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn with_selectable_leaves(mut self, selectable: bool) -> Self {
        self.selectable_leaves = selectable;
        self
    }
}

/// Present `snapshot` as a node tree, flagging paths in `updated`.
///
/// An absent snapshot or an empty object yields a single placeholder node.
/// A non-object root is rendered as whatever it is (array, primitive, null)
/// rather than rejected.
pub fn present(snapshot: Option<&Value>, updated: &ChangeSet, options: &PresentOptions) -> Node {
    let is_empty = match snapshot {
        None => true,
        Some(Value::Object(members)) => members.is_empty(),
        Some(_) => false,
    };

    match snapshot {
        Some(value) if !is_empty => present_value(
            value,
            &FieldPath::root(),
            options.root_label.clone(),
            0,
            updated,
            options,
        ),
        _ => placeholder(&options.root_label),
    }
}

fn placeholder(label: &str) -> Node {
    Node {
        path: FieldPath::root(),
        label: label.to_string(),
        kind: NodeKind::Placeholder {
            message: NO_DATA_MESSAGE.to_string(),
        },
        updated: false,
        selectable: false,
        value: None,
        children: Vec::new(),
    }
}

fn present_value(
    value: &Value,
    path: &FieldPath,
    label: String,
    depth: usize,
    updated: &ChangeSet,
    options: &PresentOptions,
) -> Node {
    let children = match value {
        Value::Object(members) => {
            let mut keys: Vec<&String> = members.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|key| {
                    present_value(
                        &members[key],
                        &path.child_key(key),
                        key.clone(),
                        depth + 1,
                        updated,
                        options,
                    )
                })
                .collect()
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                present_value(
                    item,
                    &path.child_index(index),
                    format!("[{}]", index),
                    depth + 1,
                    updated,
                    options,
                )
            })
            .collect(),
        _ => Vec::new(),
    };

    let ctx = NodeContext {
        path,
        label,
        value,
        updated: updated.contains(path),
        depth,
        selectable: options.selectable_leaves,
    };
    options
        .renderers
        .get(NodeKindTag::of(value))
        .render(&ctx, children)
}
