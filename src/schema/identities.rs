//! Identity derivation graph
//!
//! Identities form a DAG, not a tree: an identity may name several bases
//! (YANG 1.1). The graph spans every module in the Context; lookup keys
//! are `(module-name, identity-name)` pairs.

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Lookup key of an identity: `(module-name, identity-name)`
pub type IdentityKey = (String, String);

/// One node of the identity graph
#[derive(Debug, Clone, Default)]
pub struct IdentityNode {
    /// Direct bases
    pub bases: Vec<IdentityKey>,
    /// Direct derivations (reverse edges)
    pub derived: Vec<IdentityKey>,
}

/// The identity derivation DAG
#[derive(Debug, Clone, Default)]
pub struct IdentityGraph {
    nodes: HashMap<IdentityKey, IdentityNode>,
}

impl IdentityGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph holds an identity
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Declare an identity (bases are linked separately)
    pub fn declare(&mut self, key: IdentityKey) {
        self.nodes.entry(key).or_default();
    }

    /// Link an identity to one of its bases.
    ///
    /// Both ends must have been declared; an unknown base is an
    /// unresolved-reference error.
    pub fn link(&mut self, identity: &IdentityKey, base: &IdentityKey) -> Result<()> {
        if !self.nodes.contains_key(base) {
            return Err(Error::Unresolved(format!(
                "base identity '{}:{}' of '{}:{}' is not known",
                base.0, base.1, identity.0, identity.1
            )));
        }
        self.nodes
            .get_mut(identity)
            .ok_or_else(|| Error::Internal("identity linked before declaration".into()))?
            .bases
            .push(base.clone());
        self.nodes
            .get_mut(base)
            .unwrap()
            .derived
            .push(identity.clone());
        Ok(())
    }

    /// Detect derivation cycles. A cycle is fatal.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut finished: HashSet<&IdentityKey> = HashSet::new();

        for start in self.nodes.keys() {
            if finished.contains(start) {
                continue;
            }
            let mut on_path: HashSet<&IdentityKey> = HashSet::new();
            self.visit(start, &mut on_path, &mut finished)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        key: &'a IdentityKey,
        on_path: &mut HashSet<&'a IdentityKey>,
        finished: &mut HashSet<&'a IdentityKey>,
    ) -> Result<()> {
        if finished.contains(key) {
            return Ok(());
        }
        if !on_path.insert(key) {
            return Err(Error::Denied(format!(
                "identity '{}:{}' is cyclically derived",
                key.0, key.1
            )));
        }
        if let Some(node) = self.nodes.get(key) {
            for base in &node.bases {
                self.visit(base, on_path, finished)?;
            }
        }
        on_path.remove(key);
        finished.insert(key);
        Ok(())
    }

    /// Whether `identity` equals `base` or any of its ancestors equals
    /// `base`
    pub fn is_derived_from(&self, identity: &IdentityKey, base: &IdentityKey) -> bool {
        if identity == base {
            return true;
        }
        let mut stack: Vec<&IdentityKey> = match self.nodes.get(identity) {
            Some(node) => node.bases.iter().collect(),
            None => return false,
        };
        let mut seen: HashSet<&IdentityKey> = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == base {
                return true;
            }
            if seen.insert(current) {
                if let Some(node) = self.nodes.get(current) {
                    stack.extend(node.bases.iter());
                }
            }
        }
        false
    }

    /// All identities transitively derived from `base`, excluding `base`
    pub fn derived_of(&self, base: &IdentityKey) -> Vec<IdentityKey> {
        let mut result = Vec::new();
        let mut stack: Vec<&IdentityKey> = match self.nodes.get(base) {
            Some(node) => node.derived.iter().collect(),
            None => return result,
        };
        let mut seen: HashSet<&IdentityKey> = HashSet::new();
        while let Some(current) = stack.pop() {
            if seen.insert(current) {
                result.push(current.clone());
                if let Some(node) = self.nodes.get(current) {
                    stack.extend(node.derived.iter());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> IdentityKey {
        ("m".to_string(), name.to_string())
    }

    fn chain() -> IdentityGraph {
        // c -> b -> a
        let mut graph = IdentityGraph::new();
        graph.declare(key("a"));
        graph.declare(key("b"));
        graph.declare(key("c"));
        graph.link(&key("b"), &key("a")).unwrap();
        graph.link(&key("c"), &key("b")).unwrap();
        graph
    }

    #[test]
    fn test_derivation_chain() {
        let graph = chain();
        assert!(graph.is_derived_from(&key("c"), &key("a")));
        assert!(graph.is_derived_from(&key("c"), &key("b")));
        assert!(graph.is_derived_from(&key("a"), &key("a")));
        assert!(!graph.is_derived_from(&key("a"), &key("c")));
        assert!(!graph.is_derived_from(&key("b"), &key("c")));
    }

    #[test]
    fn test_multiple_bases() {
        let mut graph = chain();
        graph.declare(key("d"));
        graph.link(&key("d"), &key("a")).unwrap();
        graph.link(&key("d"), &key("c")).unwrap();

        assert!(graph.is_derived_from(&key("d"), &key("a")));
        assert!(graph.is_derived_from(&key("d"), &key("b")));
        assert!(graph.detect_cycles().is_ok());
    }

    #[test]
    fn test_unknown_base_rejected() {
        let mut graph = IdentityGraph::new();
        graph.declare(key("x"));
        let err = graph.link(&key("x"), &key("missing")).unwrap_err();
        assert!(matches!(err, Error::Unresolved(_)));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = chain();
        // close the loop: a -> c
        graph.link(&key("a"), &key("c")).unwrap();
        let err = graph.detect_cycles().unwrap_err();
        assert!(matches!(err, Error::Denied(_)));
        assert!(format!("{}", err).contains("cyclically derived"));
    }

    #[test]
    fn test_derived_of() {
        let graph = chain();
        let mut derived = graph.derived_of(&key("a"));
        derived.sort();
        assert_eq!(derived, vec![key("b"), key("c")]);
        assert!(graph.derived_of(&key("c")).is_empty());
    }
}
