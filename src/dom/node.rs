//! XML Node representation
//!
//! Uses NodeId (u32) for compact node references into the document arena.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Arena id of the synthetic root every document starts with
pub const ROOT_ID: NodeId = 0;

/// Name of the synthetic root. `#` cannot start an XML name, so no parsed
/// element can collide with it.
pub const ROOT_ELEMENT_NAME: &str = "#document-root";

/// An element in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Index into string pool for the element name
    pub name_id: u32,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// Child elements in document order
    pub children: Vec<NodeId>,
    /// Attributes, one entry per distinct name
    pub attributes: Vec<XmlAttribute>,
    /// Character data; present once any content event was seen
    pub text: Option<String>,
    /// Position among the parent's children when it was created
    pub index: u32,
    /// Depth in document tree (root = 0)
    pub depth: u16,
}

impl XmlNode {
    /// Create the synthetic root node
    pub fn root(name_id: u32) -> Self {
        XmlNode {
            name_id,
            parent: None,
            children: Vec::new(),
            attributes: Vec::new(),
            text: None,
            index: 0,
            depth: 0,
        }
    }

    /// Create a new element node
    pub fn element(name_id: u32, parent: NodeId, index: u32, depth: u16) -> Self {
        XmlNode {
            name_id,
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
            text: None,
            index,
            depth,
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Index into string pool for attribute name
    pub name_id: u32,
    /// Index into string pool for attribute value
    pub value_id: u32,
}

impl XmlAttribute {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        XmlAttribute { name_id, value_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_node() {
        let root = XmlNode::root(1);
        assert!(root.parent.is_none());
        assert_eq!(root.depth, 0);
        assert!(root.text.is_none());
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element(3, ROOT_ID, 2, 1);
        assert_eq!(elem.parent, Some(ROOT_ID));
        assert_eq!(elem.index, 2);
        assert!(!elem.has_children());
        assert!(elem.attributes.is_empty());
    }
}
