//! Chained element lookup
//!
//! `XmlIndexer` is the result of every lookup step. Steps never fail
//! loudly: a failed step yields `XmlError`, and every later step keeps
//! that first error, so a whole chain can be written before checking.
//!
//! ```ignore
//! let title = feed.by_key("rss").by_key("channel").by_key("item").by_index(0).by_key("title");
//! match title.element() {
//!     Some(elem) => println!("{}", elem.text().unwrap_or("")),
//!     None => println!("{}", title.error().map(|e| e.to_string()).unwrap_or_default()),
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::dom::serialize::{render_node, render_nodes};
use crate::dom::{NodeId, XmlDocument, ROOT_ID};
use crate::error::{ErrorKind, IndexingError};

use super::path::IndexOps;

/// Handle to one element of a parsed tree
#[derive(Clone)]
pub struct XmlElement {
    doc: Arc<XmlDocument>,
    id: NodeId,
}

impl XmlElement {
    pub(crate) fn new(doc: Arc<XmlDocument>, id: NodeId) -> Self {
        XmlElement { doc, id }
    }

    /// The synthetic root of `doc`
    pub fn root(doc: Arc<XmlDocument>) -> Self {
        XmlElement { doc, id: ROOT_ID }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Arc<XmlDocument> {
        &self.doc
    }

    pub fn name(&self) -> &str {
        self.doc.node_name(self.id).unwrap_or("")
    }

    /// Character data; `None` if the element never received any
    pub fn text(&self) -> Option<&str> {
        self.doc.text(self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.doc.get_attribute(self.id, name)
    }

    pub fn attributes(&self) -> Vec<(&str, &str)> {
        self.doc.get_attribute_values(self.id)
    }

    /// Position among the parent's materialized children
    ///
    /// Lazy results only materialize siblings on the resolved path, so the
    /// same element can report a smaller index than in an eager tree.
    pub fn index(&self) -> usize {
        self.doc.get_node(self.id).map(|n| n.index as usize).unwrap_or(0)
    }

    pub fn children(&self) -> Vec<XmlElement> {
        self.doc
            .children(self.id)
            .iter()
            .map(|&id| XmlElement::new(Arc::clone(&self.doc), id))
            .collect()
    }

    pub fn children_named(&self, name: &str) -> Vec<XmlElement> {
        self.doc
            .children_named(self.id, name)
            .into_iter()
            .map(|id| XmlElement::new(Arc::clone(&self.doc), id))
            .collect()
    }
}

impl fmt::Debug for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlElement")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_node(&self.doc, self.id))
    }
}

/// Result of a lookup step
#[derive(Debug, Clone)]
pub enum XmlIndexer {
    /// Exactly one element
    Element(XmlElement),
    /// Several elements sharing a name, in document order
    List(Vec<XmlElement>),
    /// Unresolved lazy path; resolves to one of the other variants
    Stream(IndexOps),
    /// The first failure of the chain
    XmlError(IndexingError),
}

impl XmlIndexer {
    /// Wrap a freshly parsed tree, positioned at its root
    pub fn from_document(doc: XmlDocument) -> Self {
        XmlIndexer::Element(XmlElement::root(Arc::new(doc)))
    }

    /// Wrap an existing node of `doc`
    pub fn from_node(doc: Arc<XmlDocument>, id: NodeId) -> Self {
        if doc.get_node(id).is_some() {
            XmlIndexer::Element(XmlElement::new(doc, id))
        } else {
            XmlIndexer::XmlError(IndexingError::InitializationError {
                instance: format!("node {} of {}", id, doc.node_count()),
            })
        }
    }

    /// Select the children named `key`
    pub fn by_key(&self, key: &str) -> XmlIndexer {
        match self {
            XmlIndexer::Stream(ops) => {
                let mut ops = ops.clone();
                ops.push_key(key);
                XmlIndexer::Stream(ops)
            }
            XmlIndexer::Element(elem) => {
                let mut matches = elem.children_named(key);
                match matches.len() {
                    0 => XmlIndexer::XmlError(IndexingError::KeyNotFound {
                        key: key.to_string(),
                    }),
                    1 => XmlIndexer::Element(matches.remove(0)),
                    _ => XmlIndexer::List(matches),
                }
            }
            XmlIndexer::XmlError(err) => XmlIndexer::XmlError(err.clone()),
            XmlIndexer::List(_) => XmlIndexer::XmlError(IndexingError::KeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Select one element by position
    pub fn by_index(&self, index: usize) -> XmlIndexer {
        match self {
            XmlIndexer::Stream(ops) => {
                let mut ops = ops.clone();
                if ops.set_last_index(index) {
                    XmlIndexer::Stream(ops)
                } else {
                    ops.find_elements().by_index(index)
                }
            }
            XmlIndexer::List(list) => match list.get(index) {
                Some(elem) => XmlIndexer::Element(elem.clone()),
                None => XmlIndexer::XmlError(IndexingError::IndexOutOfRange { index }),
            },
            XmlIndexer::Element(elem) if index == 0 => XmlIndexer::Element(elem.clone()),
            XmlIndexer::Element(_) => XmlIndexer::XmlError(IndexingError::IndexOutOfRange { index }),
            XmlIndexer::XmlError(err) => XmlIndexer::XmlError(err.clone()),
        }
    }

    /// Select the element whose attribute `attr` equals `value`
    pub fn with_attr(&self, attr: &str, value: &str) -> XmlIndexer {
        match self {
            XmlIndexer::Stream(ops) => ops.clone().find_elements().with_attr(attr, value),
            XmlIndexer::List(list) => list
                .iter()
                .find(|elem| elem.attribute(attr) == Some(value))
                .map(|elem| XmlIndexer::Element(elem.clone()))
                .unwrap_or_else(|| {
                    XmlIndexer::XmlError(IndexingError::AttributeValueNotFound {
                        attr: attr.to_string(),
                        value: value.to_string(),
                    })
                }),
            XmlIndexer::Element(elem) => {
                if elem.attribute(attr) == Some(value) {
                    XmlIndexer::Element(elem.clone())
                } else {
                    XmlIndexer::XmlError(IndexingError::AttributeNotFound {
                        attr: attr.to_string(),
                    })
                }
            }
            XmlIndexer::XmlError(err) => XmlIndexer::XmlError(err.clone()),
        }
    }

    /// Run any pending lazy path; terminal variants are returned unchanged
    pub fn resolve(self) -> XmlIndexer {
        match self {
            XmlIndexer::Stream(ops) => ops.find_elements(),
            other => other,
        }
    }

    /// The single selected element, if there is exactly one
    pub fn element(&self) -> Option<XmlElement> {
        match self {
            XmlIndexer::Element(elem) => Some(elem.clone()),
            XmlIndexer::Stream(ops) => ops.clone().find_elements().element(),
            _ => None,
        }
    }

    /// Every selected element as its own result
    pub fn all(&self) -> Vec<XmlIndexer> {
        match self {
            XmlIndexer::Element(elem) => vec![XmlIndexer::Element(elem.clone())],
            XmlIndexer::List(list) => list.iter().cloned().map(XmlIndexer::Element).collect(),
            XmlIndexer::Stream(ops) => ops.clone().find_elements().all(),
            XmlIndexer::XmlError(_) => Vec::new(),
        }
    }

    /// Every child element of every selected element
    pub fn children(&self) -> Vec<XmlIndexer> {
        self.all()
            .into_iter()
            .filter_map(|indexer| indexer.element())
            .flat_map(|elem| elem.children())
            .map(XmlIndexer::Element)
            .collect()
    }

    /// False only for `XmlError`; an unresolved `Stream` counts as valid
    pub fn is_ok(&self) -> bool {
        !matches!(self, XmlIndexer::XmlError(_))
    }

    pub fn error(&self) -> Option<&IndexingError> {
        match self {
            XmlIndexer::XmlError(err) => Some(err),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.error().map(IndexingError::kind)
    }
}

impl fmt::Display for XmlIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlIndexer::Element(elem) => write!(f, "{}", elem),
            XmlIndexer::List(list) => {
                let Some(first) = list.first() else {
                    return Ok(());
                };
                let ids: Vec<NodeId> = list.iter().map(XmlElement::id).collect();
                f.write_str(&render_nodes(first.document(), &ids))
            }
            XmlIndexer::Stream(ops) => write!(f, "{}", ops.clone().find_elements()),
            XmlIndexer::XmlError(_) => Ok(()),
        }
    }
}

impl IntoIterator for XmlIndexer {
    type Item = XmlIndexer;
    type IntoIter = std::vec::IntoIter<XmlIndexer>;

    fn into_iter(self) -> Self::IntoIter {
        self.all().into_iter()
    }
}

impl IntoIterator for &XmlIndexer {
    type Item = XmlIndexer;
    type IntoIter = std::vec::IntoIter<XmlIndexer>;

    fn into_iter(self) -> Self::IntoIter {
        self.all().into_iter()
    }
}
