//! Plain-text rendering of a node tree, one node per line

use crate::present::node::{Node, NodeKind};

const INDENT: &str = "  ";

/// Render `node` as indented text; updated nodes end with ` *`
///
/// ```text
/// root {2}
///   tags [1]
///     [0]: "a" (string) *
///   title: null
/// ```
pub fn render_text(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(&node.label);

    match &node.kind {
        NodeKind::Object { entries } => out.push_str(&format!(" {{{}}}", entries)),
        NodeKind::Array { len } => out.push_str(&format!(" [{}]", len)),
        NodeKind::Primitive { primitive } => {
            let value = node
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            out.push_str(&format!(": {} ({})", value, primitive.as_str()));
        }
        NodeKind::Null => out.push_str(": null"),
        NodeKind::Placeholder { message } => out.push_str(&format!(" ({})", message)),
    }

    if node.updated {
        out.push_str(" *");
    }
    out.push('\n');

    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeSet;
    use crate::present::{present, PresentOptions};
    use serde_json::json;

    #[test]
    fn test_render_text_marks_updates() {
        let snap = json!({ "tags": ["a"], "title": null });
        let updated: ChangeSet = ["tags[0]"].into_iter().collect();
        let tree = present(Some(&snap), &updated, &PresentOptions::default());

        assert_eq!(
            render_text(&tree),
            "root {2}\n  tags [1]\n    [0]: \"a\" (string) *\n  title: null\n"
        );
    }

    #[test]
    fn test_render_placeholder() {
        let tree = present(None, &ChangeSet::new(), &PresentOptions::default());
        assert_eq!(render_text(&tree), "root (no data yet)\n");
    }
}
