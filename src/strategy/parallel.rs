//! Parallel path evaluation
//!
//! Uses Rayon to evaluate many path expressions against one parse result.
//! Over a lazy result every query runs its own pruned scan; over an eager
//! result the queries share the immutable tree.

use rayon::prelude::*;

use crate::query::compiler::{apply_ops, compile};
use crate::query::XmlIndexer;

/// Evaluate one path expression, returning a resolved result
pub fn evaluate(root: &XmlIndexer, path: &str) -> XmlIndexer {
    match compile(path) {
        Ok(ops) => apply_ops(root.clone(), &ops).resolve(),
        Err(err) => XmlIndexer::XmlError(err),
    }
}

/// Evaluate multiple path expressions in parallel, results in input order
pub fn evaluate_parallel(root: &XmlIndexer, paths: &[&str]) -> Vec<XmlIndexer> {
    paths.par_iter().map(|path| evaluate(root, path)).collect()
}

/// Parallel xmap - evaluate keyed path expressions and collect results
pub fn xmap(root: &XmlIndexer, queries: &[(&str, &str)]) -> Vec<(String, XmlIndexer)> {
    queries
        .par_iter()
        .map(|(key, path)| (key.to_string(), evaluate(root, path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::strategy::XmlHash;

    const DOC: &str = "<root><a>1</a><b>2</b><b>3</b></root>";

    #[test]
    fn test_parallel_eval() {
        for root in [XmlHash::parse_default(DOC), XmlHash::lazy(DOC)] {
            let results = evaluate_parallel(&root, &["root/a", "root/b", "root/b[1]", "root/c"]);
            assert_eq!(results.len(), 4);
            assert_eq!(results[0].element().unwrap().text(), Some("1"));
            assert_eq!(results[1].all().len(), 2);
            assert_eq!(results[2].element().unwrap().text(), Some("3"));
            assert_eq!(results[3].error().map(|e| e.kind()), Some(ErrorKind::KeyNotFound));
            assert!(results.iter().all(|r| !matches!(r, XmlIndexer::Stream(_))));
        }
    }

    #[test]
    fn test_xmap() {
        let root = XmlHash::lazy(DOC);
        let queries = [("first", "root/a"), ("bad", "root/b[")];

        let results = xmap(&root, &queries);
        assert_eq!(results[0].0, "first");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "bad");
        assert!(!results[1].1.is_ok());
    }
}
