//! XML namespace handling for the XML surface form
//!
//! This module tracks in-scope `xmlns` declarations while the XML reader
//! walks the element tree, so the keyword dispatcher can classify elements
//! by namespace membership.

use std::collections::HashMap;

/// Stack of namespace scopes, one frame per open element
#[derive(Debug, Clone, Default)]
pub struct NamespaceStack {
    scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    prefixes: HashMap<String, String>,
    default_namespace: Option<String>,
}

impl NamespaceStack {
    /// Create an empty namespace stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new scope for an element
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a prefix in the innermost scope
    pub fn declare_prefix(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.prefixes.insert(prefix.into(), uri.into());
        }
    }

    /// Declare the default namespace in the innermost scope
    pub fn declare_default(&mut self, uri: impl Into<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.default_namespace = Some(uri.into());
        }
    }

    /// Resolve a prefix against the in-scope declarations, innermost first
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.prefixes.get(prefix).map(|u| u.as_str()))
    }

    /// Resolve the in-scope default namespace, innermost first
    pub fn resolve_default(&self) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.default_namespace.as_deref())
    }

    /// Resolve an element name: a prefixed name uses its prefix binding,
    /// an unprefixed name the default namespace.
    pub fn resolve_element(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some(p) => self.resolve_prefix(p),
            None => self.resolve_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_resolution() {
        let mut ns = NamespaceStack::new();
        ns.push_scope();
        ns.declare_default("urn:outer");
        ns.declare_prefix("a", "urn:a");

        ns.push_scope();
        ns.declare_default("urn:inner");

        assert_eq!(ns.resolve_default(), Some("urn:inner"));
        assert_eq!(ns.resolve_prefix("a"), Some("urn:a"));

        ns.pop_scope();
        assert_eq!(ns.resolve_default(), Some("urn:outer"));
    }

    #[test]
    fn test_shadowing() {
        let mut ns = NamespaceStack::new();
        ns.push_scope();
        ns.declare_prefix("p", "urn:one");
        ns.push_scope();
        ns.declare_prefix("p", "urn:two");

        assert_eq!(ns.resolve_prefix("p"), Some("urn:two"));
        ns.pop_scope();
        assert_eq!(ns.resolve_prefix("p"), Some("urn:one"));
    }

    #[test]
    fn test_unknown_prefix() {
        let mut ns = NamespaceStack::new();
        ns.push_scope();
        assert_eq!(ns.resolve_prefix("nope"), None);
        assert_eq!(ns.resolve_element(None), None);
    }
}
