//! Path expression compiler with LRU cache
//!
//! Expressions are `/`-separated steps, each `name` or `name[i]` with a
//! 0-based position: `rss/channel/item[2]/title`. Leading and trailing
//! slashes are ignored; the empty expression selects the root.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::error::IndexingError;

pub use super::path::apply_ops;
use super::path::IndexOp;

/// Compiled paths kept per document resource
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 64;

/// Compile a path expression into steps
///
/// A malformed step (empty, unterminated or non-numeric brackets, embedded
/// whitespace) fails as `KeyNotFound` carrying the whole offending step text,
/// e.g. `item[x]`. A step that is well formed but absent from the document
/// fails later as `KeyNotFound` carrying only the element name.
pub fn compile(expr: &str) -> Result<Vec<IndexOp>, IndexingError> {
    let trimmed = expr.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed.split('/').map(compile_step).collect()
}

fn compile_step(step: &str) -> Result<IndexOp, IndexingError> {
    let invalid = || IndexingError::KeyNotFound {
        key: step.to_string(),
    };

    let (key, index) = match step.split_once('[') {
        Some((key, rest)) => {
            let digits = rest.strip_suffix(']').ok_or_else(invalid)?;
            let index = digits.parse::<usize>().map_err(|_| invalid())?;
            (key, Some(index))
        }
        None => (step, None),
    };

    if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == ']') {
        return Err(invalid());
    }
    Ok(IndexOp {
        key: key.to_string(),
        index,
    })
}

/// LRU cache of compiled path expressions
pub struct PathCache {
    cache: LruCache<String, Arc<[IndexOp]>>,
}

impl PathCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        PathCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Return the compiled form of `expr`, compiling on a miss
    ///
    /// Failed compilations are not cached.
    pub fn get_or_compile(&mut self, expr: &str) -> Result<Arc<[IndexOp]>, IndexingError> {
        let key = expr.to_string();
        if let Some(ops) = self.cache.get(&key) {
            return Ok(Arc::clone(ops));
        }
        let ops: Arc<[IndexOp]> = compile(expr)?.into();
        self.cache.put(key, Arc::clone(&ops));
        Ok(ops)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for PathCache {
    fn default() -> Self {
        PathCache::new(NonZeroUsize::new(DEFAULT_PATH_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
