//! Elixir Term Conversion Utilities
//!
//! Converts lookup results to Elixir terms:
//! - element: `{:element, name, [{attr, value}], text | nil, [children]}`
//! - error: `{:error, {kind, message}}`

use rustler::types::atom::{self, Atom};
use rustler::{Encoder, Env, NewBinary, Term};

use crate::error::IndexingError;
use crate::feed::PodcastItem;
use crate::query::{XmlElement, XmlIndexer};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    element,
    attribute_not_found,
    attribute_value_not_found,
    key_not_found,
    index_out_of_range,
    malformed_input,
    initialization_error,
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

fn optional_binary<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => atom::nil().encode(env),
    }
}

/// Convert an element and its subtree to an Elixir term
pub fn element_to_term<'a>(env: Env<'a>, elem: &XmlElement) -> Term<'a> {
    // Lists are built back to front with list_prepend
    let mut attrs = Term::list_new_empty(env);
    for (name, value) in elem.attributes().into_iter().rev() {
        let pair = (str_to_binary(env, name), str_to_binary(env, value));
        attrs = attrs.list_prepend(pair.encode(env));
    }

    let mut children = Term::list_new_empty(env);
    for child in elem.children().iter().rev() {
        children = children.list_prepend(element_to_term(env, child));
    }

    (
        element(),
        str_to_binary(env, elem.name()),
        attrs,
        optional_binary(env, elem.text()),
        children,
    )
        .encode(env)
}

fn error_kind_atom(err: &IndexingError) -> Atom {
    match err {
        IndexingError::AttributeNotFound { .. } => attribute_not_found(),
        IndexingError::AttributeValueNotFound { .. } => attribute_value_not_found(),
        IndexingError::KeyNotFound { .. } => key_not_found(),
        IndexingError::IndexOutOfRange { .. } => index_out_of_range(),
        IndexingError::MalformedInput(_) => malformed_input(),
        IndexingError::InitializationError { .. } => initialization_error(),
    }
}

/// `{:error, {kind, message}}`
pub fn error_to_term<'a>(env: Env<'a>, err: &IndexingError) -> Term<'a> {
    let reason = (error_kind_atom(err), str_to_binary(env, &err.to_string()));
    (atom::error(), reason).encode(env)
}

/// Elements selected by a result, as a list of element terms
fn elements_to_list<'a>(env: Env<'a>, indexer: &XmlIndexer) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for item in indexer.all().iter().rev() {
        if let Some(elem) = item.element() {
            list = list.list_prepend(element_to_term(env, &elem));
        }
    }
    list
}

/// `{:ok, [element]}` or `{:error, {kind, message}}`
pub fn indexer_to_term<'a>(env: Env<'a>, indexer: XmlIndexer) -> Term<'a> {
    let indexer = indexer.resolve();
    match indexer.error() {
        Some(err) => error_to_term(env, err),
        None => (atom::ok(), elements_to_list(env, &indexer)).encode(env),
    }
}

/// `{:ok, element}` for a single selection, `{:ok, nil}` for a list
pub fn single_to_term<'a>(env: Env<'a>, indexer: XmlIndexer) -> Term<'a> {
    let indexer = indexer.resolve();
    if let Some(err) = indexer.error() {
        return error_to_term(env, err);
    }
    let elem = indexer.element();
    (atom::ok(), optional_element(env, elem.as_ref())).encode(env)
}

fn optional_element<'a>(env: Env<'a>, elem: Option<&XmlElement>) -> Term<'a> {
    match elem {
        Some(elem) => element_to_term(env, elem),
        None => atom::nil().encode(env),
    }
}

/// Text of the first selected element, or nil
pub fn text_to_term<'a>(env: Env<'a>, indexer: XmlIndexer) -> Term<'a> {
    let first = indexer.by_index(0);
    let text = first.element();
    optional_binary(env, text.as_ref().and_then(XmlElement::text))
}

/// `{title, pub_date, link}` tuple
pub fn podcast_item_to_term<'a>(env: Env<'a>, item: &PodcastItem) -> Term<'a> {
    (
        str_to_binary(env, &item.title),
        str_to_binary(env, &item.pub_date),
        str_to_binary(env, &item.link),
    )
        .encode(env)
}
