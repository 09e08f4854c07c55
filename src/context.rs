//! Schema context
//!
//! A Context owns every parsed module registered into it, compiles
//! modules lazily (at most once each), records the most recent
//! diagnostic, and carries the custom-type registrar and the
//! enabled-feature set.
//!
//! A Context is single-threaded: all parsing, compiling, and typed-value
//! operations touching it must be serialized by the caller. Independent
//! Contexts may be used concurrently from independent threads.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result, ValidationError};
use crate::parser;
use crate::schema::compiled::CompiledModule;
use crate::schema::compiler;
use crate::schema::identities::{IdentityGraph, IdentityKey};
use crate::schema::parsed::Module;
use crate::types::value::IdentityResolver;
use crate::types::{CustomTypeCallbacks, CustomTypeHook};

/// Surface syntax of a module source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// The native compact form
    Yang,
    /// The XML-encoded form
    Yin,
}

/// Registry of parsed and compiled modules
#[derive(Debug, Default)]
pub struct Context {
    modules: Vec<Module>,
    compiled: RefCell<HashMap<String, Arc<CompiledModule>>>,
    identity_graph: RefCell<Option<Arc<IdentityGraph>>>,
    enabled_features: HashSet<(String, String)>,
    custom_types: HashMap<String, CustomTypeHook>,
    last_diagnostic: RefCell<Option<String>>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a module. The source must be a `module`;
    /// a `submodule` is rejected.
    pub fn parse_module(&mut self, source: &str, format: SchemaFormat) -> Result<&Module> {
        self.record(Self::ingest(source, format, false))
            .map(|index| &self.modules[index])
    }

    /// Parse and register a submodule. The source must be a
    /// `submodule`; a `module` is rejected.
    pub fn parse_submodule(&mut self, source: &str, format: SchemaFormat) -> Result<&Module> {
        self.record(Self::ingest(source, format, true))
            .map(|index| &self.modules[index])
    }

    fn ingest(source: &str, format: SchemaFormat, expect_submodule: bool) -> Result<Module> {
        let stmt = match format {
            SchemaFormat::Yang => parser::yang::parse_bytes(source.as_bytes())?,
            SchemaFormat::Yin => parser::yin::parse_bytes(source.as_bytes())?,
        };
        let module = parser::build::build_module(&stmt)?;
        if module.is_submodule() != expect_submodule {
            return Err(Error::Denied(if expect_submodule {
                format!("'{}' is a module where a submodule was expected", module.name)
            } else {
                format!("'{}' is a submodule where a module was expected", module.name)
            }));
        }
        Ok(module)
    }

    fn record(&mut self, result: Result<Module>) -> Result<usize> {
        match result {
            Ok(module) => {
                if self
                    .modules
                    .iter()
                    .any(|m| m.name == module.name && m.latest_revision() == module.latest_revision())
                {
                    let err = Error::Validation(
                        ValidationError::new("module is already registered")
                            .with_offending(&module.name),
                    );
                    *self.last_diagnostic.borrow_mut() = Some(err.to_string());
                    return Err(err);
                }
                // Registration invalidates caches derived from the set.
                self.compiled.borrow_mut().clear();
                self.identity_graph.borrow_mut().take();
                self.modules.push(module);
                Ok(self.modules.len() - 1)
            }
            Err(err) => {
                *self.last_diagnostic.borrow_mut() = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Every registered module and submodule
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// Look up a module by name. With several revisions registered, the
    /// most recent wins.
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules
            .iter()
            .filter(|m| m.name == name)
            .max_by(|a, b| a.latest_revision().cmp(&b.latest_revision()))
    }

    /// Look up a module by name and exact revision date
    pub fn find_module_revision(&self, name: &str, revision: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.name == name && m.latest_revision() == Some(revision))
    }

    /// Compile a registered module. Compiled trees are produced lazily,
    /// at most once per module, and are immutable afterwards.
    pub fn compile_module(&self, name: &str) -> Result<Arc<CompiledModule>> {
        if let Some(compiled) = self.compiled.borrow().get(name) {
            return Ok(compiled.clone());
        }
        match compiler::compile(self, name) {
            Ok(compiled) => {
                let compiled = Arc::new(compiled);
                self.compiled
                    .borrow_mut()
                    .insert(name.to_string(), compiled.clone());
                Ok(compiled)
            }
            Err(err) => {
                *self.last_diagnostic.borrow_mut() = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Enable a feature of a module. Nodes guarded by disabled features
    /// are pruned at compile time.
    pub fn enable_feature(&mut self, module: impl Into<String>, feature: impl Into<String>) {
        self.compiled.borrow_mut().clear();
        self.enabled_features.insert((module.into(), feature.into()));
    }

    /// Whether a feature is in the enabled set
    pub fn is_feature_enabled(&self, module: &str, feature: &str) -> bool {
        self.enabled_features
            .contains(&(module.to_string(), feature.to_string()))
    }

    /// Register a custom type by name. Unknown type names resolve
    /// against this registrar before failing.
    pub fn register_custom_type(
        &mut self,
        name: impl Into<String>,
        callbacks: CustomTypeCallbacks,
    ) {
        let name = name.into();
        self.custom_types.insert(
            name.clone(),
            CustomTypeHook {
                name,
                callbacks: Arc::new(callbacks),
            },
        );
    }

    /// Look up a registered custom type
    pub fn find_custom_type(&self, name: &str) -> Option<CustomTypeHook> {
        self.custom_types.get(name).cloned()
    }

    /// The most recent diagnostic recorded by a failed call
    pub fn last_diagnostic(&self) -> Option<String> {
        self.last_diagnostic.borrow().clone()
    }

    fn identity_graph(&self) -> Option<Arc<IdentityGraph>> {
        if let Some(graph) = self.identity_graph.borrow().as_ref() {
            return Some(graph.clone());
        }
        let graph = Arc::new(compiler::build_identity_graph(self).ok()?);
        *self.identity_graph.borrow_mut() = Some(graph.clone());
        Some(graph)
    }
}

/// The Context resolves identityref texts for external data-instance
/// decoders: a prefixed name uses the prefix as a module name (or a
/// registered module's prefix); an unprefixed name matches any module
/// defining the identity.
impl IdentityResolver for Context {
    fn resolve(&self, text: &str) -> Option<(String, String)> {
        let graph = self.identity_graph()?;
        let (prefix, local) = crate::names::split_prefixed(text);

        match prefix {
            Some(prefix) => {
                let module_name = if self.find_module(prefix).is_some() {
                    prefix.to_string()
                } else {
                    self.modules
                        .iter()
                        .find(|m| m.prefix.as_deref() == Some(prefix))?
                        .name
                        .clone()
                };
                let key = (module_name, local.to_string());
                graph.contains(&key).then_some(key)
            }
            None => self.modules.iter().find_map(|m| {
                let key = (m.name.clone(), local.to_string());
                graph.contains(&key).then_some(key)
            }),
        }
    }

    fn derived_from_or_self(&self, identity: &IdentityKey, base: &IdentityKey) -> bool {
        match self.identity_graph() {
            Some(graph) => graph.is_derived_from(identity, base),
            None => false,
        }
    }
}
