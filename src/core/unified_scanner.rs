//! Unified Scanner with ScanHandler Trait
//!
//! Event-driven scanner shared by both parsing strategies. The scanner
//! walks the whole input once, checks well-formedness as it goes, and
//! dispatches each construct to a `ScanHandler`. Handlers receive spans
//! into the input rather than copies.
//!
//! Any violation stops the scan with a `ParseError`; there is no
//! partial-result contract.

use super::scanner::{is_name_start_char, Scanner};
use super::span::Span;
use crate::error::ParseError;

/// Trait for handling scan events
///
/// Every callback may fail, which aborts the scan with that error.
/// Self-closing elements (`<br/>`) are reported as `start_element` with
/// `is_empty = true` immediately followed by `end_element`.
pub trait ScanHandler {
    /// Called when an element starts
    ///
    /// # Arguments
    /// * `name` - Span of the element name in the input
    /// * `attrs` - Slice of (name_span, value_span) pairs, values still encoded
    /// * `is_empty` - True if this is a self-closing element
    fn start_element(
        &mut self,
        name: Span,
        attrs: &[(Span, Span)],
        is_empty: bool,
    ) -> Result<(), ParseError>;

    /// Called when an element ends
    fn end_element(&mut self, name: Span) -> Result<(), ParseError>;

    /// Called for character data inside the root element
    ///
    /// # Arguments
    /// * `span` - Span of the text in the input
    /// * `needs_entity_decode` - True if the text contains entity references
    fn text(&mut self, span: Span, needs_entity_decode: bool) -> Result<(), ParseError>;

    /// Called for CDATA sections (content excludes `<![CDATA[` and `]]>`)
    fn cdata(&mut self, span: Span) -> Result<(), ParseError>;

    /// Called for comments (optional, default does nothing)
    fn comment(&mut self, _span: Span) -> Result<(), ParseError> {
        Ok(())
    }

    /// Called for processing instructions other than the XML declaration
    fn processing_instruction(
        &mut self,
        _target: Span,
        _data: Option<Span>,
    ) -> Result<(), ParseError> {
        Ok(())
    }
}

/// Resolve a span to UTF-8, reporting invalid bytes as malformed input
pub fn span_str(input: &[u8], span: Span) -> Result<&str, ParseError> {
    std::str::from_utf8(span.slice(input))
        .map_err(|_| ParseError::new("Invalid UTF-8 sequence", span.offset as usize))
}

/// Unified scanner that uses ScanHandler for event dispatch
pub struct UnifiedScanner<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    /// Reusable attribute buffer to avoid per-element allocations
    attrs_buf: Vec<(Span, Span)>,
    /// Names of currently open elements
    open: Vec<Span>,
    seen_root: bool,
}

impl<'a> UnifiedScanner<'a> {
    /// Create a new unified scanner for the input
    pub fn new(input: &'a [u8]) -> Self {
        let mut scanner = Scanner::new(input);
        if input.starts_with(b"\xEF\xBB\xBF") {
            scanner.advance(3);
        }
        Self {
            input,
            scanner,
            attrs_buf: Vec::with_capacity(8),
            open: Vec::with_capacity(16),
            seen_root: false,
        }
    }

    /// Scan the entire document, calling handler methods for each construct
    pub fn scan<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        while !self.scanner.is_eof() {
            match self.scanner.peek() {
                Some(b'<') => self.scan_markup(handler)?,
                Some(_) => self.scan_text(handler)?,
                None => break,
            }
        }

        if let Some(unclosed) = self.open.last() {
            return Err(ParseError::new(
                format!("Unclosed tag: <{}>", self.lossy(*unclosed)),
                self.scanner.position(),
            ));
        }
        if !self.seen_root {
            return Err(ParseError::new(
                "Document has no root element",
                self.scanner.position(),
            ));
        }
        Ok(())
    }

    fn lossy(&self, span: Span) -> String {
        String::from_utf8_lossy(span.slice(self.input)).into_owned()
    }

    fn error<T>(&self, message: impl Into<String>, position: usize) -> Result<T, ParseError> {
        Err(ParseError::new(message, position))
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();

        match self.scanner.peek_at(1) {
            Some(b'/') => self.scan_end_tag(handler),
            Some(b'!') => {
                if self.scanner.starts_with(b"<!--") {
                    self.scan_comment(handler)
                } else if self.scanner.starts_with(b"<![CDATA[") {
                    self.scan_cdata(handler)
                } else if matches!(self.scanner.peek_at(2), Some(b'D') | Some(b'd')) {
                    self.scan_doctype()
                } else {
                    self.error("Invalid markup declaration", start)
                }
            }
            Some(b'?') => self.scan_pi(handler),
            Some(c) if is_name_start_char(c) => self.scan_start_tag(handler),
            _ => self.error("Invalid markup: '<' must start a tag", start),
        }
    }

    /// Scan a start tag or empty element tag
    fn scan_start_tag<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.open.is_empty() && self.seen_root {
            return self.error("Document has multiple root elements", start);
        }

        self.scanner.advance(1); // Skip '<'
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return self.error("Invalid element name", name_start);
        }
        let name = Span::between(name_start, self.scanner.position());

        self.attrs_buf.clear();
        loop {
            let before_ws = self.scanner.position();
            self.scanner.skip_whitespace();
            let had_whitespace = self.scanner.position() > before_ws;

            match self.scanner.peek() {
                None => {
                    return self.error(format!("Unterminated start tag <{}>", self.lossy(name)), start);
                }
                Some(b'>') => {
                    self.scanner.advance(1);
                    self.seen_root = true;
                    self.open.push(name);
                    return handler.start_element(name, &self.attrs_buf, false);
                }
                Some(b'/') => {
                    if self.scanner.peek_at(1) != Some(b'>') {
                        return self.error("Expected '>' after '/' in tag", self.scanner.position());
                    }
                    self.scanner.advance(2);
                    self.seen_root = true;
                    handler.start_element(name, &self.attrs_buf, true)?;
                    return handler.end_element(name);
                }
                Some(c) if is_name_start_char(c) => {
                    if !had_whitespace {
                        return self.error(
                            "Whitespace required before attribute",
                            self.scanner.position(),
                        );
                    }
                    let attr = self.scan_attribute()?;
                    self.attrs_buf.push(attr);
                }
                Some(_) => {
                    return self.error(
                        format!("Invalid character in tag <{}>", self.lossy(name)),
                        self.scanner.position(),
                    );
                }
            }
        }
    }

    /// Scan an attribute, returning (name_span, value_span)
    fn scan_attribute(&mut self) -> Result<(Span, Span), ParseError> {
        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return self.error("Invalid attribute name", name_start);
        }
        let name = Span::between(name_start, self.scanner.position());

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'=') {
            return self.error(
                format!("Attribute '{}' has no value", self.lossy(name)),
                self.scanner.position(),
            );
        }
        self.scanner.advance(1);
        self.scanner.skip_whitespace();

        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return self.error(
                    format!("Value of attribute '{}' must be quoted", self.lossy(name)),
                    self.scanner.position(),
                );
            }
        };
        self.scanner.advance(1);

        let value_start = self.scanner.position();
        let Some(value_end) = self.scanner.find_byte(quote) else {
            return self.error("Unterminated attribute value", value_start);
        };
        let value = Span::between(value_start, value_end);
        if memchr::memchr(b'<', value.slice(self.input)).is_some() {
            return self.error("'<' not allowed in attribute value", value_start);
        }
        self.scanner.set_position(value_end + 1);

        Ok((name, value))
    }

    /// Scan an end tag
    fn scan_end_tag<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(2); // Skip '</'

        let name_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return self.error("Invalid end tag", start);
        }
        let name = Span::between(name_start, self.scanner.position());

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return self.error(format!("Unterminated end tag </{}>", self.lossy(name)), start);
        }
        self.scanner.advance(1);

        match self.open.pop() {
            None => self.error(
                format!("Unexpected end tag: </{}> without matching start tag", self.lossy(name)),
                start,
            ),
            Some(open) if open.slice(self.input) != name.slice(self.input) => self.error(
                format!("Tag mismatch: <{}> closed with </{}>", self.lossy(open), self.lossy(name)),
                start,
            ),
            Some(_) => handler.end_element(name),
        }
    }

    /// Scan text content up to the next '<'
    fn scan_text<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(self.input.len());
        self.scanner.set_position(end);

        let span = Span::between(start, end);
        let content = span.slice(self.input);

        if self.open.is_empty() {
            let is_whitespace = content
                .iter()
                .all(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
            if is_whitespace {
                return Ok(());
            }
            return self.error("Text content not allowed outside the root element", start);
        }

        let needs_decode = memchr::memchr(b'&', content).is_some();
        handler.text(span, needs_decode)
    }

    /// Scan a comment
    fn scan_comment<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(4); // Skip '<!--'
        let content_start = self.scanner.position();

        let Some(content_end) = self.scanner.find_sequence(b"-->") else {
            return self.error("Unterminated comment", start);
        };
        self.scanner.set_position(content_end + 3);
        handler.comment(Span::between(content_start, content_end))
    }

    /// Scan a CDATA section
    fn scan_cdata<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.open.is_empty() {
            return self.error("CDATA section not allowed outside the root element", start);
        }
        self.scanner.advance(9); // Skip '<![CDATA['
        let content_start = self.scanner.position();

        let Some(content_end) = self.scanner.find_sequence(b"]]>") else {
            return self.error("Unterminated CDATA section", start);
        };
        self.scanner.set_position(content_end + 3);
        handler.cdata(Span::between(content_start, content_end))
    }

    /// Scan a processing instruction (the XML declaration is consumed silently)
    fn scan_pi<H: ScanHandler>(&mut self, handler: &mut H) -> Result<(), ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(2); // Skip '<?'

        let target_start = self.scanner.position();
        if self.scanner.read_name().is_none() {
            return self.error("Invalid processing instruction", start);
        }
        let target = Span::between(target_start, self.scanner.position());

        self.scanner.skip_whitespace();
        let data_start = self.scanner.position();
        let Some(data_end) = self.scanner.find_sequence(b"?>") else {
            return self.error("Unterminated processing instruction", start);
        };
        self.scanner.set_position(data_end + 2);

        if target.slice(self.input).eq_ignore_ascii_case(b"xml") {
            if start != 0 && !(start == 3 && self.input.starts_with(b"\xEF\xBB\xBF")) {
                return self.error("XML declaration must be at the start of the document", start);
            }
            return Ok(());
        }

        let data = (data_end > data_start).then(|| Span::between(data_start, data_end));
        handler.processing_instruction(target, data)
    }

    /// Skip a DOCTYPE declaration, including any internal subset
    fn scan_doctype(&mut self) -> Result<(), ParseError> {
        let start = self.scanner.position();
        if self.seen_root {
            return self.error("DOCTYPE must come before the root element", start);
        }
        if !self.scanner.starts_with(b"<!DOCTYPE") && !self.scanner.starts_with(b"<!doctype") {
            return self.error("Invalid markup declaration", start);
        }
        self.scanner.advance(9);

        let mut depth = 0usize;
        while let Some(c) = self.scanner.peek() {
            self.scanner.advance(1);
            match c {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        self.error("Unterminated DOCTYPE declaration", start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test handler that records events as strings
    struct TestHandler<'a> {
        input: &'a [u8],
        events: Vec<String>,
    }

    impl<'a> TestHandler<'a> {
        fn new(input: &'a [u8]) -> Self {
            Self {
                input,
                events: Vec::new(),
            }
        }

        fn s(&self, span: Span) -> String {
            String::from_utf8_lossy(span.slice(self.input)).into_owned()
        }
    }

    impl ScanHandler for TestHandler<'_> {
        fn start_element(
            &mut self,
            name: Span,
            attrs: &[(Span, Span)],
            is_empty: bool,
        ) -> Result<(), ParseError> {
            let attrs: Vec<String> = attrs
                .iter()
                .map(|(n, v)| format!("{}={}", self.s(*n), self.s(*v)))
                .collect();
            let event = format!("start:{}{:?}{}", self.s(name), attrs, if is_empty { "/" } else { "" });
            self.events.push(event);
            Ok(())
        }

        fn end_element(&mut self, name: Span) -> Result<(), ParseError> {
            let event = format!("end:{}", self.s(name));
            self.events.push(event);
            Ok(())
        }

        fn text(&mut self, span: Span, needs_decode: bool) -> Result<(), ParseError> {
            let event = format!("text:{}:{}", self.s(span), needs_decode);
            self.events.push(event);
            Ok(())
        }

        fn cdata(&mut self, span: Span) -> Result<(), ParseError> {
            let event = format!("cdata:{}", self.s(span));
            self.events.push(event);
            Ok(())
        }

        fn comment(&mut self, span: Span) -> Result<(), ParseError> {
            let event = format!("comment:{}", self.s(span));
            self.events.push(event);
            Ok(())
        }
    }

    fn scan(input: &[u8]) -> Result<Vec<String>, ParseError> {
        let mut handler = TestHandler::new(input);
        UnifiedScanner::new(input).scan(&mut handler)?;
        Ok(handler.events)
    }

    #[test]
    fn test_simple_element() {
        let events = scan(b"<root/>").unwrap();
        assert_eq!(events, vec!["start:root[]/", "end:root"]);
    }

    #[test]
    fn test_nested_with_text_and_attributes() {
        let events = scan(b"<?xml version=\"1.0\"?>\n<a x='1'><b>hi &amp; bye</b></a>\n").unwrap();
        assert_eq!(
            events,
            vec![
                "start:a[\"x=1\"]",
                "start:b[]",
                "text:hi &amp; bye:true",
                "end:b",
                "end:a",
            ]
        );
    }

    #[test]
    fn test_comment_cdata_doctype() {
        let input = b"<!DOCTYPE rss [<!ENTITY x \"y\">]><!-- c --><a><![CDATA[<raw>]]></a>";
        let events = scan(input).unwrap();
        assert_eq!(events, vec!["comment: c ", "start:a[]", "cdata:<raw>", "end:a"]);
    }

    #[test]
    fn test_bom_is_skipped() {
        let events = scan(b"\xEF\xBB\xBF<?xml version=\"1.0\"?><a/>").unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_tag_mismatch() {
        let err = scan(b"<a><b></a></b>").unwrap_err();
        assert!(err.message.starts_with("Tag mismatch"));
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_unclosed_and_unexpected() {
        assert!(scan(b"<a><b></b>").unwrap_err().message.starts_with("Unclosed tag"));
        assert!(scan(b"<a/></b>").unwrap_err().message.starts_with("Unexpected end tag"));
    }

    #[test]
    fn test_document_level_errors() {
        assert!(scan(b"").is_err());
        assert!(scan(b"   ").is_err());
        assert!(scan(b"<a/><b/>").is_err());
        assert!(scan(b"text<a/>").is_err());
        assert!(scan(b"<a/>trailing").is_err());
        assert!(scan(b"<![CDATA[x]]><a/>").is_err());
        assert!(scan(b"<a/><?xml version=\"1.0\"?>").is_err());
    }

    #[test]
    fn test_malformed_markup() {
        assert!(scan(b"<a><1bad/></a>").is_err());
        assert!(scan(b"<a><!-- open</a>").is_err());
        assert!(scan(b"<a x=1/>").is_err());
        assert!(scan(b"<a x/>").is_err());
        assert!(scan(b"<a x=\"1\"y=\"2\"/>").is_err());
        assert!(scan(b"<a x=\"<\"/>").is_err());
        assert!(scan(b"<a").is_err());
    }
}
