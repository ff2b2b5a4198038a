//! XmlHash - XML parsing with chained, path-based element lookup
//!
//! Strategies:
//! - Eager: one scan builds the complete element tree (parse)
//! - Lazy: path-pruned scans run when a result is observed (parse with lazy)
//! - Parallel: many path expressions over one document (query_parallel)
//!
//! Lookups chain `by_key` / `by_index` / `with_attr` steps; failures are
//! carried through the chain as a value instead of aborting it.

pub mod core;
pub mod dom;
pub mod error;
pub mod feed;
pub mod memory;
pub mod query;
pub mod resource;
pub mod strategy;
pub mod term;

use log::debug;
use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub use error::{ErrorKind, IndexingError, ParseError};
pub use query::{XmlElement, XmlIndexer};
pub use strategy::{ParserOptions, XmlHash};

use resource::{DocumentRef, DocumentResource};
use term::{error_to_term, indexer_to_term, podcast_item_to_term, single_to_term, text_to_term};

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[rustler::nif]
fn get_rust_memory() -> usize {
    memory::current()
}

#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    memory::peak()
}

#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    memory::reset()
}

// ============================================================================
// Documents and Queries
// ============================================================================

/// Parse XML into a document resource
///
/// Eager documents are parsed here; parse errors surface on every query.
/// Lazy documents keep a copy of the input and scan per query.
#[rustler::nif]
fn parse<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    lazy: bool,
    process_namespaces: bool,
) -> NifResult<Term<'a>> {
    let options = ParserOptions::new()
        .lazy(lazy)
        .process_namespaces(process_namespaces);
    let resource = DocumentResource::new(input.as_slice(), options);
    Ok(ResourceArc::new(resource).encode(env))
}

/// Evaluate a path expression: `{:ok, [element]}` or `{:error, {kind, msg}}`
#[rustler::nif]
fn query<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    Ok(indexer_to_term(env, doc_ref.query(path)))
}

/// Text of the first element selected by a path, or nil
#[rustler::nif]
fn query_text<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    Ok(text_to_term(env, doc_ref.query(path)))
}

/// Narrow a path's selection to the element with `attr == value`
#[rustler::nif]
fn query_with_attr<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    path: &str,
    attr: &str,
    value: &str,
) -> NifResult<Term<'a>> {
    Ok(single_to_term(env, doc_ref.query(path).with_attr(attr, value)))
}

/// Evaluate many path expressions in parallel, one result per path
#[rustler::nif(schedule = "DirtyCpu")]
fn query_parallel<'a>(env: Env<'a>, doc_ref: DocumentRef, paths: Vec<&str>) -> NifResult<Term<'a>> {
    let results = doc_ref.query_parallel(&paths);

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(indexer_to_term(env, result));
    }
    Ok(list)
}

/// Render a path's selection back to XML
#[rustler::nif]
fn render(doc_ref: DocumentRef, path: &str) -> String {
    doc_ref.query(path).to_string()
}

// ============================================================================
// Podcast Feeds
// ============================================================================

/// Extract `{title, pub_date, link}` for every item of an RSS feed
#[rustler::nif]
fn feed_items<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match feed::parse_podcast_feed(input.as_slice()) {
        Ok(items) => {
            let mut list = Term::list_new_empty(env);
            for item in items.iter().rev() {
                list = list.list_prepend(podcast_item_to_term(env, item));
            }
            Ok((rustler::types::atom::ok(), list).encode(env))
        }
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

// ============================================================================
// NIF Initialization
// ============================================================================

fn load(_env: Env, _info: Term) -> bool {
    debug!("xmlhash NIF loaded");
    true
}

rustler::init!("Elixir.XmlHash.Native", load = load);
