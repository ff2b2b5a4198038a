//! Parsing Strategy Module
//!
//! Two strategies build the element tree:
//! - Eager: one full scan, complete tree (default)
//! - Lazy: no scan until a path is observed, then a path-pruned scan
//!
//! plus parallel evaluation of many path expressions over one result.
//! `XmlHash` is the configured entry point that picks between them.

pub mod eager;
pub mod lazy;
pub mod parallel;

pub use eager::EagerParser;
pub use lazy::LazyParser;
pub use parallel::{evaluate_parallel, xmap};

use crate::query::XmlIndexer;

/// Parser configuration, copied into each parser when it is created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Defer parsing until a path is observed
    pub lazy: bool,
    /// Report element names by local name and drop `xmlns` declarations
    pub process_namespaces: bool,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn process_namespaces(mut self, process_namespaces: bool) -> Self {
        self.process_namespaces = process_namespaces;
        self
    }
}

/// Configured parsing entry point
///
/// ```ignore
/// let feed = XmlHash::config(|opts| opts.lazy = true).parse(xml);
/// let title = feed.by_key("rss").by_key("channel").by_key("title");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlHash {
    options: ParserOptions,
}

impl XmlHash {
    pub fn new(options: ParserOptions) -> Self {
        XmlHash { options }
    }

    /// Build an entry point by adjusting the default options
    pub fn config(configure: impl FnOnce(&mut ParserOptions)) -> Self {
        let mut options = ParserOptions::default();
        configure(&mut options);
        XmlHash { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse `input` with the configured strategy
    ///
    /// Lazy parsing copies the input so the returned indexer owns it.
    pub fn parse(&self, input: impl AsRef<[u8]>) -> XmlIndexer {
        let input = input.as_ref();
        if self.options.lazy {
            LazyParser::new(input, self.options).parse()
        } else {
            EagerParser::new(self.options).parse(input)
        }
    }

    /// Eager parse with default options
    pub fn parse_default(input: impl AsRef<[u8]>) -> XmlIndexer {
        XmlHash::default().parse(input)
    }

    /// Lazy parse with default options
    pub fn lazy(input: impl AsRef<[u8]>) -> XmlIndexer {
        XmlHash::new(ParserOptions::new().lazy(true)).parse(input)
    }
}
