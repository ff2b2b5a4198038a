//! ResourceArc Wrappers
//!
//! Persistent per-document state held by the BEAM between NIF calls.

use std::sync::{Arc, Mutex};

use log::warn;
use rustler::ResourceArc;

use crate::error::IndexingError;
use crate::query::{apply_ops, compile, IndexOp, PathCache, XmlIndexer};
use crate::strategy::{evaluate_parallel, ParserOptions, XmlHash};

/// A parsed (or lazily parseable) document plus its compiled-path cache
pub struct DocumentResource {
    /// Root result: a tree for eager documents, an empty path for lazy ones
    root: XmlIndexer,
    paths: Mutex<PathCache>,
}

impl DocumentResource {
    pub fn new(input: &[u8], options: ParserOptions) -> Self {
        DocumentResource {
            root: XmlHash::new(options).parse(input),
            paths: Mutex::new(PathCache::default()),
        }
    }

    pub fn root(&self) -> &XmlIndexer {
        &self.root
    }

    fn compiled(&self, path: &str) -> Result<Arc<[IndexOp]>, IndexingError> {
        match self.paths.lock() {
            Ok(mut cache) => cache.get_or_compile(path),
            Err(_) => {
                warn!("path cache lock poisoned; compiling {:?} uncached", path);
                compile(path).map(Arc::from)
            }
        }
    }

    /// Evaluate a path expression and resolve the result
    pub fn query(&self, path: &str) -> XmlIndexer {
        match self.compiled(path) {
            Ok(ops) => apply_ops(self.root.clone(), &ops).resolve(),
            Err(err) => {
                warn!("rejected path expression {:?}: {}", path, err);
                XmlIndexer::XmlError(err)
            }
        }
    }

    /// Evaluate several path expressions in parallel
    pub fn query_parallel(&self, paths: &[&str]) -> Vec<XmlIndexer> {
        evaluate_parallel(&self.root, paths)
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const DOC: &[u8] = b"<rss><channel><item><title>Ep1</title></item><item><title>Ep2</title></item></channel></rss>";

    #[test]
    fn test_query_eager_and_lazy() {
        for lazy in [false, true] {
            let resource = DocumentResource::new(DOC, ParserOptions::new().lazy(lazy));
            let title = resource.query("rss/channel/item[1]/title");
            assert_eq!(title.element().unwrap().text(), Some("Ep2"));

            let items = resource.query("/rss/channel/item");
            assert_eq!(items.all().len(), 2);
            assert!(!matches!(items, XmlIndexer::Stream(_)));
        }
    }

    #[test]
    fn test_query_errors() {
        let resource = DocumentResource::new(DOC, ParserOptions::default());
        assert_eq!(resource.query("rss/feed").kind(), Some(ErrorKind::KeyNotFound));
        assert_eq!(resource.query("rss[").kind(), Some(ErrorKind::KeyNotFound));
        assert_eq!(
            resource.query("rss/channel/item[5]").kind(),
            Some(ErrorKind::IndexOutOfRange)
        );
    }

    #[test]
    fn test_paths_are_cached() {
        let resource = DocumentResource::new(DOC, ParserOptions::default());
        resource.query("rss/channel");
        resource.query("rss/channel");
        resource.query("rss");
        assert_eq!(resource.paths.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_document() {
        let resource = DocumentResource::new(b"<rss>", ParserOptions::default());
        assert_eq!(resource.query("rss").kind(), Some(ErrorKind::MalformedInput));
        assert_eq!(resource.root().kind(), Some(ErrorKind::MalformedInput));
    }
}
