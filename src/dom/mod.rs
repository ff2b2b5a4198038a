//! DOM Module - Arena-based element tree
//!
//! Implements the element tree the parsers build:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for parent/child links and parser stacks
//! - String interning for element names and attributes
//! - Rendering back to markup

pub mod document;
pub mod node;
pub mod serialize;
pub mod strings;

pub use document::XmlDocument;
pub use node::{NodeId, XmlAttribute, XmlNode, ROOT_ELEMENT_NAME, ROOT_ID};
pub use strings::StringPool;
