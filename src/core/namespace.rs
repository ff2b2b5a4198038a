//! Namespace Resolution
//!
//! Stack-based namespace resolver used when namespace processing is
//! enabled. Element names are then reported by local name, and `xmlns`
//! declarations are consumed instead of being reported as attributes.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI). The default namespace uses an empty prefix.
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: u32,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceResolver {
    bindings: Vec<NsBinding>,
    depth: u32,
}

impl NamespaceResolver {
    /// Create a new namespace resolver with pre-declared xml and xmlns namespaces
    pub fn new() -> Self {
        NamespaceResolver {
            bindings: vec![
                NsBinding {
                    prefix: "xml".to_string(),
                    uri: ns::XML.to_string(),
                    depth: 0,
                },
                NsBinding {
                    prefix: "xmlns".to_string(),
                    uri: ns::XMLNS.to_string(),
                    depth: 0,
                },
            ],
            depth: 0,
        }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a namespace binding for the current scope
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        // xml and xmlns are fixed
        if prefix == "xml" || prefix == "xmlns" {
            return;
        }
        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix to a namespace URI
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a qualified name into prefix and local name at the colon
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match memchr::memchr(b':', name.as_bytes()) {
        Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
        None => (None, name),
    }
}

/// If `attr` declares a namespace, return the declared prefix ("" for the default)
pub fn declared_prefix(attr: &str) -> Option<&str> {
    if attr == "xmlns" {
        Some("")
    } else {
        attr.strip_prefix("xmlns:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespaces() {
        let resolver = NamespaceResolver::new();
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_scope_pop() {
        let mut resolver = NamespaceResolver::new();

        resolver.push_scope();
        resolver.declare("itunes", "http://www.itunes.com/dtds/podcast-1.0.dtd");
        assert!(resolver.resolve("itunes").is_some());

        resolver.pop_scope();
        assert_eq!(resolver.resolve("itunes"), None);
    }

    #[test]
    fn test_shadow_binding() {
        let mut resolver = NamespaceResolver::new();

        resolver.push_scope();
        resolver.declare("ns", "http://example.com/ns1");
        resolver.push_scope();
        resolver.declare("ns", "http://example.com/ns2");
        assert_eq!(resolver.resolve("ns"), Some("http://example.com/ns2"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("ns"), Some("http://example.com/ns1"));
    }

    #[test]
    fn test_split_and_declared_prefix() {
        assert_eq!(split_name("media:content"), (Some("media"), "content"));
        assert_eq!(split_name("title"), (None, "title"));
        assert_eq!(declared_prefix("xmlns"), Some(""));
        assert_eq!(declared_prefix("xmlns:atom"), Some("atom"));
        assert_eq!(declared_prefix("href"), None);
    }
}
