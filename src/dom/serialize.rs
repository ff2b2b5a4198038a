//! XML rendering for element subtrees
//!
//! Produces markup that re-parses to the same names, attributes, child
//! order and text. Text and attribute values are escaped; elements with
//! neither text nor children are written self-closing.

use super::document::XmlDocument;
use super::node::{NodeId, ROOT_ID};
use crate::core::entities::escape_xml_to_buf;

/// Render a node and its subtree
///
/// Rendering the synthetic root renders each top-level element, one per line.
pub fn render_node(doc: &XmlDocument, node_id: NodeId) -> String {
    let mut buf = String::with_capacity(256);
    if node_id == ROOT_ID {
        for (i, &child) in doc.children(ROOT_ID).iter().enumerate() {
            if i > 0 {
                buf.push('\n');
            }
            write_subtree(doc, child, &mut buf);
        }
    } else {
        write_subtree(doc, node_id, &mut buf);
    }
    buf
}

/// Render several nodes joined by newlines
pub fn render_nodes(doc: &XmlDocument, nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|&id| render_node(doc, id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write one subtree using an explicit stack so deep documents cannot
/// overflow the call stack
pub fn write_subtree(doc: &XmlDocument, node_id: NodeId, buf: &mut String) {
    enum StackEntry {
        Enter(NodeId),
        Close(NodeId),
    }

    let mut stack: Vec<StackEntry> = Vec::with_capacity(32);
    stack.push(StackEntry::Enter(node_id));

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(id) => {
                buf.push_str("</");
                buf.push_str(doc.node_name(id).unwrap_or(""));
                buf.push('>');
            }
            StackEntry::Enter(id) => {
                let Some(node) = doc.get_node(id) else {
                    continue;
                };

                buf.push('<');
                buf.push_str(doc.node_name(id).unwrap_or(""));
                for (name, value) in doc.get_attribute_values(id) {
                    buf.push(' ');
                    buf.push_str(name);
                    buf.push_str("=\"");
                    escape_xml_to_buf(value, buf);
                    buf.push('"');
                }

                if node.text.is_none() && !node.has_children() {
                    buf.push_str("/>");
                    continue;
                }

                buf.push('>');
                if let Some(text) = &node.text {
                    escape_xml_to_buf(text, buf);
                }

                stack.push(StackEntry::Close(id));
                for &child in node.children.iter().rev() {
                    stack.push(StackEntry::Enter(child));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let mut doc = XmlDocument::new();
        let item = doc.add_child(ROOT_ID, "item", vec![("id", "5")]);
        let title = doc.add_child(item, "title", Vec::new());
        doc.append_text(title, "Fish & Chips");
        doc.add_child(item, "enclosure", vec![("url", "a\"b.mp3")]);

        assert_eq!(
            render_node(&doc, item),
            "<item id=\"5\"><title>Fish &amp; Chips</title><enclosure url=\"a&quot;b.mp3\"/></item>"
        );
    }

    #[test]
    fn test_text_before_children() {
        let mut doc = XmlDocument::new();
        let p = doc.add_child(ROOT_ID, "p", Vec::new());
        doc.append_text(p, "a");
        doc.add_child(p, "br", Vec::new());
        doc.append_text(p, "b");

        assert_eq!(render_node(&doc, p), "<p>ab<br/></p>");
    }

    #[test]
    fn test_render_root_and_list() {
        let mut doc = XmlDocument::new();
        let a = doc.add_child(ROOT_ID, "a", Vec::new());
        let b = doc.add_child(ROOT_ID, "b", Vec::new());

        assert_eq!(render_node(&doc, ROOT_ID), "<a/>\n<b/>");
        assert_eq!(render_nodes(&doc, &[b, a]), "<b/>\n<a/>");
    }
}
