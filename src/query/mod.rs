//! Query Module - path-based element lookup
//!
//! - `XmlIndexer`: chained `by_key` / `by_index` / `with_attr` lookups
//! - `IndexOps`: accumulated path of an unresolved lazy result
//! - `compiler`: `rss/channel/item[0]` path expressions and their cache

pub mod compiler;
pub mod indexer;
pub mod path;

pub use compiler::{compile, PathCache, DEFAULT_PATH_CACHE_CAPACITY};
pub use indexer::{XmlElement, XmlIndexer};
pub use path::{apply_ops, IndexOp, IndexOps};
