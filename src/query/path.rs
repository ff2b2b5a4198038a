//! Accumulated key paths for unresolved lazy results

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::strategy::LazyParser;

use super::indexer::XmlIndexer;

/// One step of a path: an element name and an optional position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexOp {
    pub key: String,
    /// `None` selects every element named `key`
    pub index: Option<usize>,
}

impl IndexOp {
    pub fn new(key: impl Into<String>) -> Self {
        IndexOp {
            key: key.into(),
            index: None,
        }
    }

    pub fn with_index(key: impl Into<String>, index: usize) -> Self {
        IndexOp {
            key: key.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.key, index),
            None => f.write_str(&self.key),
        }
    }
}

/// Narrow `indexer` step by step: each key, then its position if set
pub fn apply_ops(indexer: XmlIndexer, ops: &[IndexOp]) -> XmlIndexer {
    ops.iter().fold(indexer, |current, op| {
        let next = current.by_key(&op.key);
        match op.index {
            Some(index) => next.by_index(index),
            None => next,
        }
    })
}

/// The path of a lazy result plus the parser that will resolve it
#[derive(Debug, Clone)]
pub struct IndexOps {
    ops: Vec<IndexOp>,
    parser: Arc<LazyParser>,
}

impl IndexOps {
    pub fn new(parser: Arc<LazyParser>) -> Self {
        IndexOps {
            ops: Vec::new(),
            parser,
        }
    }

    pub fn ops(&self) -> &[IndexOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub(crate) fn push_key(&mut self, key: &str) {
        self.ops.push(IndexOp::new(key));
    }

    /// Set the position of the last step
    ///
    /// Returns false when there is no step or its position is already set.
    pub(crate) fn set_last_index(&mut self, index: usize) -> bool {
        match self.ops.last_mut() {
            Some(op) if op.index.is_none() => {
                op.index = Some(index);
                true
            }
            _ => false,
        }
    }

    /// Run a pruned scan for this path and narrow the fresh tree along it
    pub fn find_elements(self) -> XmlIndexer {
        debug!("resolving lazy path {}", self);
        match self.parser.scan(&self.ops) {
            Ok(doc) => apply_ops(XmlIndexer::from_document(doc), &self.ops),
            Err(err) => XmlIndexer::XmlError(err.into()),
        }
    }
}

impl fmt::Display for IndexOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}
