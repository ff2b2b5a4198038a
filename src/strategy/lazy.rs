//! Lazy parsing: path-pruned scans on demand
//!
//! A `LazyParser` keeps the input and re-scans it every time a path is
//! resolved, materializing only the elements on that path. Each resolution
//! costs a full pass over the document, which suits small and medium feeds
//! queried along a few paths; large documents or many separate resolutions
//! are better served by the eager strategy.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::core::span::Span;
use crate::core::unified_scanner::{span_str, ScanHandler, UnifiedScanner};
use crate::dom::XmlDocument;
use crate::error::ParseError;
use crate::query::{IndexOp, IndexOps, XmlIndexer};

use super::eager::TreeBuilder;
use super::ParserOptions;

/// Owns the input bytes; every scan builds fresh state, so one parser can
/// be shared across threads and resolved concurrently
pub struct LazyParser {
    input: Arc<[u8]>,
    options: ParserOptions,
}

impl LazyParser {
    pub fn new(input: impl Into<Arc<[u8]>>, options: ParserOptions) -> Self {
        LazyParser {
            input: input.into(),
            options,
        }
    }

    /// Wrap the parser in an unresolved indexer with an empty path
    pub fn parse(self) -> XmlIndexer {
        XmlIndexer::Stream(IndexOps::new(Arc::new(self)))
    }

    /// Scan the input from the start, keeping only elements on `ops`' keys
    pub fn scan(&self, ops: &[IndexOp]) -> Result<XmlDocument, ParseError> {
        let keys: Vec<&str> = ops.iter().map(|op| op.key.as_str()).collect();
        debug!(
            "lazy scan of {} bytes for path [{}]",
            self.input.len(),
            keys.join("/")
        );

        let input: &[u8] = &self.input;
        let mut builder = FilteredTreeBuilder {
            input,
            tree: TreeBuilder::new(input, &self.options),
            element_stack: Vec::with_capacity(16),
            keys,
        };
        UnifiedScanner::new(input).scan(&mut builder)?;
        Ok(builder.tree.finish())
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }
}

impl fmt::Debug for LazyParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyParser")
            .field("input_len", &self.input.len())
            .field("options", &self.options)
            .finish()
    }
}

/// Tree builder gated by a key path
struct FilteredTreeBuilder<'a> {
    input: &'a [u8],
    tree: TreeBuilder<'a>,
    /// Reported names of every open element, matched or not
    element_stack: Vec<&'a str>,
    keys: Vec<&'a str>,
}

impl FilteredTreeBuilder<'_> {
    /// Whether the live descent lies on the filter path
    ///
    /// Above the filter depth the live stack must be a prefix of the keys;
    /// below it the keys must be a prefix of the live stack, so whole
    /// subtrees under the target are kept.
    fn on_match(&self) -> bool {
        if self.element_stack.len() > self.keys.len() {
            self.element_stack.starts_with(&self.keys)
        } else {
            self.keys.starts_with(&self.element_stack)
        }
    }
}

impl ScanHandler for FilteredTreeBuilder<'_> {
    fn start_element(
        &mut self,
        name: Span,
        attrs: &[(Span, Span)],
        _is_empty: bool,
    ) -> Result<(), ParseError> {
        let tag = self.tree.open_scope(name, attrs)?;
        self.element_stack.push(tag.name);
        if self.on_match() {
            trace!("materialize <{}> at depth {}", tag.name, self.element_stack.len());
            self.tree.materialize(&tag);
        }
        Ok(())
    }

    fn end_element(&mut self, name: Span) -> Result<(), ParseError> {
        let matched = self.on_match();
        if matched {
            trace!("close <{}>", span_str(self.input, name)?);
            self.tree.close_element();
        }
        self.element_stack.pop();
        self.tree.close_scope();
        Ok(())
    }

    fn text(&mut self, span: Span, needs_entity_decode: bool) -> Result<(), ParseError> {
        if self.on_match() {
            self.tree.append_text(span, needs_entity_decode)?;
        }
        Ok(())
    }

    fn cdata(&mut self, span: Span) -> Result<(), ParseError> {
        if self.on_match() {
            self.tree.append_cdata(span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ROOT_ID;

    const FEED: &str = "<rss><channel><title>Show</title>\
        <item><title>Ep1</title><link>http://a</link></item>\
        <item><title>Ep2</title></item></channel></rss>";

    fn ops(keys: &[&str]) -> Vec<IndexOp> {
        keys.iter().map(|k| IndexOp::new(*k)).collect()
    }

    #[test]
    fn test_only_path_is_materialized() {
        let parser = LazyParser::new(FEED.as_bytes(), ParserOptions::default());
        let doc = parser.scan(&ops(&["rss", "channel", "item", "title"])).unwrap();

        // root, rss, channel, 2 items, 2 titles
        assert_eq!(doc.node_count(), 7);
        let rss = doc.children(ROOT_ID)[0];
        let channel = doc.children(rss)[0];
        assert!(doc.children_named(channel, "title").is_empty());
        let items = doc.children_named(channel, "item");
        assert_eq!(items.len(), 2);
        assert!(doc.children_named(items[0], "link").is_empty());
        assert_eq!(doc.text(channel), None);
    }

    #[test]
    fn test_subtree_below_target_is_kept() {
        let parser = LazyParser::new(FEED.as_bytes(), ParserOptions::default());
        let doc = parser.scan(&ops(&["rss", "channel", "item"])).unwrap();

        let rss = doc.children(ROOT_ID)[0];
        let channel = doc.children(rss)[0];
        let items = doc.children_named(channel, "item");
        assert_eq!(doc.children_named(items[0], "link").len(), 1);
    }

    #[test]
    fn test_sequence_index_counts_materialized_siblings() {
        let parser = LazyParser::new(FEED.as_bytes(), ParserOptions::default());
        let doc = parser.scan(&ops(&["rss", "channel", "item"])).unwrap();

        let rss = doc.children(ROOT_ID)[0];
        let channel = doc.children(rss)[0];
        let items = doc.children_named(channel, "item");
        assert_eq!(doc.get_node(items[0]).unwrap().index, 0);
        assert_eq!(doc.get_node(items[1]).unwrap().index, 1);
    }

    #[test]
    fn test_malformed_input_fails_whole_scan() {
        let parser = LazyParser::new(&b"<rss><channel></rss>"[..], ParserOptions::default());
        assert!(parser.scan(&ops(&["rss"])).is_err());
    }

    #[test]
    fn test_namespaced_path() {
        let input = "<rss xmlns:itunes=\"urn:it\"><channel><itunes:author>Me</itunes:author></channel></rss>";
        let options = ParserOptions::new().process_namespaces(true);
        let parser = LazyParser::new(input.as_bytes(), options);
        let doc = parser.scan(&ops(&["rss", "channel", "author"])).unwrap();

        let rss = doc.children(ROOT_ID)[0];
        let channel = doc.children(rss)[0];
        let author = doc.children_named(channel, "author");
        assert_eq!(doc.text(author[0]), Some("Me"));
    }
}
