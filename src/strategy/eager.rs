//! Eager parsing: builds the complete element tree in one scan
//!
//! `TreeBuilder` is the `ScanHandler` that turns scan events into arena
//! nodes. The lazy strategy drives the same builder through a path filter,
//! so namespace handling and attribute decoding live here once.

use std::borrow::Cow;

use crate::core::entities::decode_text;
use crate::core::namespace::{declared_prefix, split_name, NamespaceResolver};
use crate::core::span::Span;
use crate::core::unified_scanner::{span_str, ScanHandler, UnifiedScanner};
use crate::dom::{NodeId, XmlDocument, ROOT_ID};
use crate::error::ParseError;
use crate::query::XmlIndexer;

use super::ParserOptions;

/// A start tag after namespace processing and attribute decoding
pub(crate) struct StartTag<'a> {
    /// Reported element name (local name when namespaces are processed)
    pub name: &'a str,
    pub attributes: Vec<(&'a str, Cow<'a, str>)>,
}

/// Builds an `XmlDocument` from scan events
pub(crate) struct TreeBuilder<'a> {
    input: &'a [u8],
    doc: XmlDocument,
    /// Materialized ancestors; the root sentinel sits at the bottom
    parent_stack: Vec<NodeId>,
    namespaces: Option<NamespaceResolver>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(input: &'a [u8], options: &ParserOptions) -> Self {
        TreeBuilder {
            input,
            doc: XmlDocument::new(),
            parent_stack: vec![ROOT_ID],
            namespaces: options.process_namespaces.then(NamespaceResolver::new),
        }
    }

    /// Take the finished tree
    pub fn finish(self) -> XmlDocument {
        self.doc
    }

    /// Enter the scope of a start tag and work out its reported form
    ///
    /// Must be called for every start tag, matched or not, so namespace
    /// scopes stay balanced.
    pub fn open_scope(
        &mut self,
        name: Span,
        attrs: &[(Span, Span)],
    ) -> Result<StartTag<'a>, ParseError> {
        let input = self.input;
        let qname = span_str(input, name)?;

        let mut attributes = Vec::with_capacity(attrs.len());
        for &(attr_name, attr_value) in attrs {
            let attr_name = span_str(input, attr_name)?;
            let raw_value = span_str(input, attr_value)?;
            attributes.push((attr_name, decode_text(raw_value)));
        }

        let Some(resolver) = self.namespaces.as_mut() else {
            return Ok(StartTag {
                name: qname,
                attributes,
            });
        };

        resolver.push_scope();
        for (attr_name, value) in &attributes {
            if let Some(prefix) = declared_prefix(attr_name) {
                resolver.declare(prefix, value);
            }
        }

        let (prefix, local) = split_name(qname);
        if let Some(prefix) = prefix {
            if resolver.resolve(prefix).is_none() {
                return Err(ParseError::new(
                    format!("Unbound namespace prefix: {}", prefix),
                    name.offset as usize,
                ));
            }
        }

        attributes.retain(|(attr_name, _)| declared_prefix(attr_name).is_none());
        Ok(StartTag {
            name: local,
            attributes,
        })
    }

    /// Leave the namespace scope entered by `open_scope`
    pub fn close_scope(&mut self) {
        if let Some(resolver) = self.namespaces.as_mut() {
            resolver.pop_scope();
        }
    }

    /// Append an element for `tag` under the current parent and descend into it
    pub fn materialize(&mut self, tag: &StartTag<'_>) {
        let parent = self.current();
        let attributes = tag.attributes.iter().map(|(n, v)| (*n, v.as_ref()));
        let id = self.doc.add_child(parent, tag.name, attributes);
        self.parent_stack.push(id);
    }

    /// Return to the parent of the current element
    pub fn close_element(&mut self) {
        if self.parent_stack.len() > 1 {
            self.parent_stack.pop();
        }
    }

    /// Append decoded character data to the current element
    pub fn append_text(&mut self, span: Span, needs_entity_decode: bool) -> Result<(), ParseError> {
        let raw = span_str(self.input, span)?;
        let current = self.current();
        if needs_entity_decode {
            self.doc.append_text(current, &decode_text(raw));
        } else {
            self.doc.append_text(current, raw);
        }
        Ok(())
    }

    /// Append CDATA content verbatim to the current element
    pub fn append_cdata(&mut self, span: Span) -> Result<(), ParseError> {
        let raw = span_str(self.input, span)?;
        let current = self.current();
        self.doc.append_text(current, raw);
        Ok(())
    }

    #[inline]
    fn current(&self) -> NodeId {
        self.parent_stack.last().copied().unwrap_or(ROOT_ID)
    }
}

impl ScanHandler for TreeBuilder<'_> {
    fn start_element(
        &mut self,
        name: Span,
        attrs: &[(Span, Span)],
        _is_empty: bool,
    ) -> Result<(), ParseError> {
        let tag = self.open_scope(name, attrs)?;
        self.materialize(&tag);
        Ok(())
    }

    fn end_element(&mut self, _name: Span) -> Result<(), ParseError> {
        self.close_scope();
        self.close_element();
        Ok(())
    }

    fn text(&mut self, span: Span, needs_entity_decode: bool) -> Result<(), ParseError> {
        self.append_text(span, needs_entity_decode)
    }

    fn cdata(&mut self, span: Span) -> Result<(), ParseError> {
        self.append_cdata(span)
    }
}

/// Full-tree parser
#[derive(Debug, Clone, Copy, Default)]
pub struct EagerParser {
    options: ParserOptions,
}

impl EagerParser {
    pub fn new(options: ParserOptions) -> Self {
        EagerParser { options }
    }

    /// Scan the whole input and return the complete tree
    pub fn parse_document(&self, input: &[u8]) -> Result<XmlDocument, ParseError> {
        let mut builder = TreeBuilder::new(input, &self.options);
        UnifiedScanner::new(input).scan(&mut builder)?;
        Ok(builder.finish())
    }

    /// Parse into an indexer positioned at the root
    pub fn parse(&self, input: &[u8]) -> XmlIndexer {
        match self.parse_document(input) {
            Ok(doc) => XmlIndexer::from_document(doc),
            Err(err) => XmlIndexer::XmlError(err.into()),
        }
    }
}
