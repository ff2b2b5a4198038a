//! XML Document - Arena-based element tree
//!
//! Every node lives in a single `Vec<XmlNode>` owned by the document;
//! parents and children refer to each other by `NodeId`, and the parser
//! stacks hold ids too. Node 0 is the synthetic root that gives all
//! top-level elements a common parent.
//!
//! The tree is append-only while a parse runs and read-only afterwards.

use super::node::{NodeId, XmlAttribute, XmlNode, ROOT_ELEMENT_NAME, ROOT_ID};
use super::strings::StringPool;

/// An XML element tree stored in arena format
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    /// Interned names and attribute values
    pub strings: StringPool,
}

impl XmlDocument {
    /// Create a document holding only the synthetic root
    pub fn new() -> Self {
        let mut strings = StringPool::new();
        let root_name = strings.intern(ROOT_ELEMENT_NAME);

        let mut nodes = Vec::with_capacity(256);
        nodes.push(XmlNode::root(root_name));

        XmlDocument { nodes, strings }
    }

    /// Append a child element under `parent` and return its id
    ///
    /// The child gets the next sequence index of `parent`. Attribute values
    /// are stored verbatim; a repeated attribute name keeps the last value.
    pub fn add_child<'s, I>(&mut self, parent: NodeId, name: &str, attributes: I) -> NodeId
    where
        I: IntoIterator<Item = (&'s str, &'s str)>,
    {
        let name_id = self.strings.intern(name);
        let (index, depth) = match self.nodes.get(parent as usize) {
            Some(p) => (p.children.len() as u32, p.depth.saturating_add(1)),
            None => (0, 1),
        };

        let mut node = XmlNode::element(name_id, parent, index, depth);
        for (attr_name, attr_value) in attributes {
            let attr = XmlAttribute::new(
                self.strings.intern(attr_name),
                self.strings.intern(attr_value),
            );
            match node.attributes.iter_mut().find(|a| a.name_id == attr.name_id) {
                Some(existing) => existing.value_id = attr.value_id,
                None => node.attributes.push(attr),
            }
        }

        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent as usize) {
            p.children.push(id);
        }
        id
    }

    /// Append character data to a node's text, creating it on first use
    pub fn append_text(&mut self, id: NodeId, content: &str) {
        if let Some(node) = self.nodes.get_mut(id as usize) {
            node.text.get_or_insert_with(String::new).push_str(content);
        }
    }

    /// Id of the synthetic root
    #[inline]
    pub fn root_id(&self) -> NodeId {
        ROOT_ID
    }

    /// Get a node by ID
    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get node name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        self.strings.get_str(node.name_id)
    }

    /// Get a node's accumulated text
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get_node(id)?.text.as_deref()
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name_id = self.strings.find(name)?;
        let attr = self
            .get_node(id)?
            .attributes
            .iter()
            .find(|a| a.name_id == name_id)?;
        self.strings.get_str(attr.value_id)
    }

    /// Get all attribute names and values for a node
    pub fn get_attribute_values(&self, id: NodeId) -> Vec<(&str, &str)> {
        let Some(node) = self.get_node(id) else {
            return Vec::new();
        };
        node.attributes
            .iter()
            .filter_map(|attr| {
                let name = self.strings.get_str(attr.name_id)?;
                let value = self.strings.get_str(attr.value_id)?;
                Some((name, value))
            })
            .collect()
    }

    /// Child ids of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Child ids whose element name equals `name`, in document order
    pub fn children_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        let Some(name_id) = self.strings.find(name) else {
            return Vec::new();
        };
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.get_node(child).map(|n| n.name_id) == Some(name_id))
            .collect()
    }

    /// Get total number of nodes, including the root
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    #[test]
    fn test_new_has_root() {
        let doc = XmlDocument::new();
        assert_eq!(doc.node_count(), 1);
        assert_eq!(doc.node_name(doc.root_id()), Some(ROOT_ELEMENT_NAME));
    }

    #[test]
    fn test_add_child_sequence_index() {
        let mut doc = XmlDocument::new();
        let channel = doc.add_child(ROOT_ID, "channel", no_attrs());
        let a = doc.add_child(channel, "item", no_attrs());
        let b = doc.add_child(channel, "title", no_attrs());
        let c = doc.add_child(channel, "item", no_attrs());

        assert_eq!(doc.get_node(a).unwrap().index, 0);
        assert_eq!(doc.get_node(b).unwrap().index, 1);
        assert_eq!(doc.get_node(c).unwrap().index, 2);
        assert_eq!(doc.get_node(c).unwrap().depth, 2);
        assert_eq!(doc.children(channel), &[a, b, c]);
        assert_eq!(doc.children_named(channel, "item"), vec![a, c]);
        assert!(doc.children_named(channel, "missing").is_empty());
    }

    #[test]
    fn test_duplicate_attribute_last_write_wins() {
        let mut doc = XmlDocument::new();
        let id = doc.add_child(ROOT_ID, "enclosure", vec![("url", "a.mp3"), ("type", "audio"), ("url", "b.mp3")]);

        assert_eq!(doc.get_attribute(id, "url"), Some("b.mp3"));
        assert_eq!(doc.get_attribute_values(id), vec![("url", "b.mp3"), ("type", "audio")]);
        assert_eq!(doc.get_attribute(id, "length"), None);
    }

    #[test]
    fn test_text_becomes_present() {
        let mut doc = XmlDocument::new();
        let id = doc.add_child(ROOT_ID, "title", no_attrs());
        assert_eq!(doc.text(id), None);

        doc.append_text(id, "");
        assert_eq!(doc.text(id), Some(""));

        doc.append_text(id, "Ep");
        doc.append_text(id, "1");
        assert_eq!(doc.text(id), Some("Ep1"));
    }
}
