//! Core XML parsing primitives
//!
//! This module contains the building blocks shared by both parsers:
//! - Scanner: delimiter detection using memchr
//! - UnifiedScanner: well-formedness checking event source (ScanHandler)
//! - Entities: entity decoding with Cow (zero-copy when possible) and escaping
//! - Namespace: prefix scopes for namespace processing
//! - Span: byte ranges into the input

pub mod entities;
pub mod namespace;
pub mod scanner;
pub mod span;
pub mod unified_scanner;
