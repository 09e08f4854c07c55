//! Schema compiler
//!
//! Takes a Context-registered parsed module plus the parsed trees of its
//! imports and includes and produces a frozen [`CompiledModule`]:
//! dependencies resolved, submodule bodies spliced in, identities and
//! features compiled, typedef chains collapsed through the restriction
//! algebra, groupings expanded, augments grafted, defaults validated,
//! and deviations applied.

use std::collections::HashMap;

use crate::context::Context;
use crate::error::{Error, Result, ValidationError};
use crate::names::split_prefixed;
use crate::schema::compiled::{CompiledModule, CompiledNode, CompiledNodeKind, NodeId};
use crate::schema::features::FeatureExpr;
use crate::schema::identities::{IdentityGraph, IdentityKey};
use crate::schema::parsed::*;
use crate::types::restriction::{
    self, check_derived, parse_restriction, IntervalSet, RangeKind,
};
use crate::types::value::IdentityResolver;
use crate::types::{
    BuiltinType, CompiledBit, CompiledEnum, CompiledPattern, CompiledType,
};

/// Build the identity DAG over every module registered in the Context
pub fn build_identity_graph(ctx: &Context) -> Result<IdentityGraph> {
    let mut graph = IdentityGraph::new();

    // Declare everything first so cross-module bases link in any order.
    for module in ctx.modules() {
        let owner = identity_owner(module);
        for identity in &module.body.identities {
            graph.declare((owner.clone(), identity.name.clone()));
        }
    }
    for module in ctx.modules() {
        let owner = identity_owner(module);
        let prefixes = module_prefix_map(module);
        for identity in &module.body.identities {
            let key = (owner.clone(), identity.name.clone());
            for base in &identity.bases {
                let base_key = resolve_reference(&prefixes, &owner, base)?;
                graph.link(&key, &base_key)?;
            }
        }
    }

    graph.detect_cycles()?;
    Ok(graph)
}

/// Owner module name of definitions: a submodule's definitions belong to
/// its main module.
fn identity_owner(module: &Module) -> String {
    match &module.belongs_to {
        Some(belongs_to) => belongs_to.module.clone(),
        None => module.name.clone(),
    }
}

/// Prefix-to-module-name map of a parsed module
fn module_prefix_map(module: &Module) -> HashMap<String, String> {
    let mut prefixes = HashMap::new();
    if let Some(prefix) = &module.prefix {
        prefixes.insert(prefix.clone(), module.name.clone());
    }
    if let Some(belongs_to) = &module.belongs_to {
        prefixes.insert(belongs_to.prefix.clone(), belongs_to.module.clone());
    }
    for import in &module.imports {
        prefixes.insert(import.prefix.clone(), import.module.clone());
    }
    prefixes
}

/// Resolve a `(prefix:)?name` reference to a `(module, name)` key
fn resolve_reference(
    prefixes: &HashMap<String, String>,
    default_module: &str,
    reference: &str,
) -> Result<IdentityKey> {
    let (prefix, local) = split_prefixed(reference);
    match prefix {
        None => Ok((default_module.to_string(), local.to_string())),
        Some(prefix) => match prefixes.get(prefix) {
            Some(module) => Ok((module.clone(), local.to_string())),
            None => Err(Error::Unresolved(format!(
                "prefix '{}' of '{}' is not bound to any module",
                prefix, reference
            ))),
        },
    }
}

/// Identity resolver over the compile-time graph
pub(crate) struct GraphResolver<'a> {
    pub graph: &'a IdentityGraph,
    pub prefixes: &'a HashMap<String, String>,
    pub default_module: &'a str,
}

impl IdentityResolver for GraphResolver<'_> {
    fn resolve(&self, text: &str) -> Option<(String, String)> {
        let key = resolve_reference(self.prefixes, self.default_module, text).ok()?;
        if self.graph.contains(&key) {
            Some(key)
        } else {
            None
        }
    }

    fn derived_from_or_self(&self, identity: &IdentityKey, base: &IdentityKey) -> bool {
        self.graph.is_derived_from(identity, base)
    }
}

/// Compile a registered module
pub fn compile(ctx: &Context, module_name: &str) -> Result<CompiledModule> {
    let main = ctx
        .find_module(module_name)
        .ok_or_else(|| Error::Unresolved(format!("module '{}' is not known", module_name)))?;
    if main.is_submodule() {
        return Err(Error::Denied(format!(
            "'{}' is a submodule; only modules can be compiled",
            module_name
        )));
    }

    let namespace = main
        .namespace
        .clone()
        .ok_or_else(|| Error::Internal("module without namespace".into()))?;
    url::Url::parse(&namespace).map_err(|_| {
        Error::Validation(
            ValidationError::new("module namespace is not a valid URI")
                .with_offending(&namespace),
        )
    })?;

    // Step 1: resolve imports, honoring pinned revisions.
    for import in &main.imports {
        let imported = ctx.find_module(&import.module).ok_or_else(|| {
            Error::Unresolved(format!("unresolved import '{}'", import.module))
        })?;
        if let Some(requested) = &import.revision_date {
            if imported.latest_revision() != Some(requested.as_str()) {
                return Err(Error::Unresolved(format!(
                    "import '{}' requires revision {} which is not available",
                    import.module, requested
                )));
            }
        }
    }

    // Step 2: flatten includes; their bodies become visible to the module.
    let mut submodules: Vec<&Module> = Vec::new();
    for include in &main.includes {
        let submodule = ctx.find_module(&include.submodule).ok_or_else(|| {
            Error::Unresolved(format!("unresolved include '{}'", include.submodule))
        })?;
        match &submodule.belongs_to {
            Some(belongs_to) if belongs_to.module == main.name => {}
            Some(_) => {
                return Err(Error::Denied(format!(
                    "submodule '{}' belongs to a different module",
                    include.submodule
                )))
            }
            None => {
                return Err(Error::Denied(format!(
                    "'{}' is a module, not a submodule",
                    include.submodule
                )))
            }
        }
        if let Some(requested) = &include.revision_date {
            if submodule.latest_revision() != Some(requested.as_str()) {
                return Err(Error::Unresolved(format!(
                    "include '{}' requires revision {} which is not available",
                    include.submodule, requested
                )));
            }
        }
        submodules.push(submodule);
    }

    // Step 3: identities (the graph spans the whole Context).
    let identities = build_identity_graph(ctx)?;

    let mut prefixes = module_prefix_map(main);
    for submodule in &submodules {
        for (prefix, target) in module_prefix_map(submodule) {
            if let Some(existing) = prefixes.get(&prefix) {
                if *existing != target {
                    return Err(Error::Validation(
                        ValidationError::new("duplicate prefix").with_offending(prefix),
                    ));
                }
            }
            prefixes.insert(prefix, target);
        }
    }

    let mut compiler = Compiler {
        ctx,
        main,
        submodules,
        prefixes,
        identities,
        nodes: Vec::new(),
        roots: Vec::new(),
        rpcs: Vec::new(),
        notifications: Vec::new(),
        scopes: Vec::new(),
        typedef_chain: Vec::new(),
        grouping_chain: Vec::new(),
    };
    compiler.run()
}

struct Scope<'a> {
    typedefs: &'a [Typedef],
    groupings: &'a [Grouping],
}

struct Compiler<'a> {
    ctx: &'a Context,
    main: &'a Module,
    submodules: Vec<&'a Module>,
    prefixes: HashMap<String, String>,
    identities: IdentityGraph,
    nodes: Vec<CompiledNode>,
    roots: Vec<NodeId>,
    rpcs: Vec<NodeId>,
    notifications: Vec<NodeId>,
    scopes: Vec<Scope<'a>>,
    typedef_chain: Vec<usize>,
    grouping_chain: Vec<usize>,
}

impl<'a> Compiler<'a> {
    fn run(mut self) -> Result<CompiledModule> {
        let main = self.main;
        let submodules = self.submodules.clone();

        // Module-level scope: main body plus every included submodule body.
        self.scopes.push(Scope {
            typedefs: &main.body.typedefs,
            groupings: &main.body.groupings,
        });
        for submodule in submodules.iter().copied() {
            self.scopes.push(Scope {
                typedefs: &submodule.body.typedefs,
                groupings: &submodule.body.groupings,
            });
        }

        // Step 4 prerequisite: feature cycles are fatal before any pruning.
        self.check_feature_cycles()?;

        // Step 6: data nodes of the main module and its submodules.
        let bodies: Vec<&'a Body> = std::iter::once(&main.body)
            .chain(submodules.iter().copied().map(|s| &s.body))
            .collect();
        for body in &bodies {
            for node in &body.data {
                self.compile_data_node(node, None, true, Status::Current, false)?;
            }
        }
        for body in &bodies {
            for rpc in &body.rpcs {
                self.compile_operation(rpc, None)?;
            }
            for notification in &body.notifications {
                self.compile_notification(notification, None)?;
            }
        }

        // Step 7: top-level augments.
        for body in &bodies {
            for augment in &body.augments {
                self.apply_augment(augment)?;
            }
        }

        // Link leafrefs now that the whole tree exists.
        self.resolve_leafrefs()?;

        // Step 8: defaults must store through their compiled types.
        self.validate_defaults()?;

        // Step 9: deviations.
        for body in &bodies {
            for deviation in &body.deviations {
                self.apply_deviation(deviation)?;
            }
        }

        // Finalize: canonical revision order, then freeze.
        let mut revisions = main.revisions.clone();
        revisions.sort_by(|a, b| b.date.cmp(&a.date));

        let identities = std::iter::once(main)
            .chain(submodules.iter().copied())
            .flat_map(|m| {
                m.body
                    .identities
                    .iter()
                    .map(|i| (main.name.clone(), i.name.clone()))
            })
            .collect();
        let features = std::iter::once(main)
            .chain(submodules.iter().copied())
            .flat_map(|m| m.body.features.iter().map(|f| f.name.clone()))
            .collect();

        Ok(CompiledModule {
            name: main.name.clone(),
            namespace: main.namespace.clone().unwrap_or_default(),
            prefix: main.prefix.clone().unwrap_or_default(),
            version: main.version,
            revisions,
            identities,
            features,
            nodes: self.nodes,
            roots: self.roots,
            rpcs: self.rpcs,
            notifications: self.notifications,
        })
    }

    // ---------------------------------------------------------------
    // Features
    // ---------------------------------------------------------------

    fn find_feature(&self, module: &str, name: &str) -> Option<(&'a Module, &'a FeatureDef)> {
        let defining = self.ctx.find_module(module)?;
        let mut candidates: Vec<&'a Module> = vec![defining];
        for include in &defining.includes {
            if let Some(sub) = self.ctx.find_module(&include.submodule) {
                candidates.push(sub);
            }
        }
        for module in candidates {
            if let Some(feature) = module.body.features.iter().find(|f| f.name == name) {
                return Some((module, feature));
            }
        }
        None
    }

    fn check_feature_cycles(&self) -> Result<()> {
        let mut sources: Vec<(&str, &Body)> = vec![(self.main.name.as_str(), &self.main.body)];
        for submodule in &self.submodules {
            sources.push((submodule.name.as_str(), &submodule.body));
        }
        for (defining, body) in sources {
            for feature in &body.features {
                let mut chain = vec![(self.main.name.clone(), feature.name.clone())];
                self.walk_feature(defining, feature, &mut chain)?;
            }
        }
        Ok(())
    }

    fn walk_feature(
        &self,
        defining: &str,
        feature: &FeatureDef,
        chain: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let defining = match self.ctx.find_module(defining) {
            Some(module) => module,
            None => return Ok(()),
        };
        let prefixes = module_prefix_map(defining);
        let owner = identity_owner(defining);

        for expr_text in &feature.if_features {
            let expr = FeatureExpr::parse(expr_text)?;
            for reference in expr.referenced() {
                let key = resolve_reference(&prefixes, &owner, reference)?;
                if chain.contains(&key) {
                    return Err(Error::Denied(format!(
                        "feature '{}:{}' is cyclically referenced",
                        key.0, key.1
                    )));
                }
                if let Some((target_module, target)) = self.find_feature(&key.0, &key.1) {
                    chain.push(key);
                    self.walk_feature(target_module.name.as_str(), target, chain)?;
                    chain.pop();
                }
            }
        }
        Ok(())
    }

    /// Whether a feature reference is enabled: it must be in the
    /// Context's enabled set and its own if-feature guards must hold.
    fn feature_enabled(&self, module: &str, reference: &str) -> bool {
        let (prefixes, owner) = match self.ctx.find_module(module) {
            Some(m) => (
                module_prefix_map(m),
                identity_owner(m),
            ),
            None => return false,
        };
        let key = match resolve_reference(&prefixes, &owner, reference) {
            Ok(key) => key,
            Err(_) => return false,
        };
        if !self.ctx.is_feature_enabled(&key.0, &key.1) {
            return false;
        }
        let (defining, feature) = match self.find_feature(&key.0, &key.1) {
            Some(found) => found,
            None => return false,
        };
        feature.if_features.iter().all(|expr_text| {
            FeatureExpr::parse(expr_text)
                .map(|expr| expr.eval(&|name| self.feature_enabled(&defining.name, name)))
                .unwrap_or(false)
        })
    }

    /// Step 4: a node guarded by an unsatisfied if-feature is pruned.
    fn if_features_satisfied(&self, if_features: &[String]) -> Result<bool> {
        for expr_text in if_features {
            let expr = FeatureExpr::parse(expr_text)?;
            if !expr.eval(&|name| self.feature_enabled(&self.main.name, name)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Types (step 5: typedef chains collapsed on demand)
    // ---------------------------------------------------------------

    fn find_scoped_typedef(&self, name: &str) -> Option<&'a Typedef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.typedefs.iter().find(|t| t.name == name))
    }

    fn find_module_typedef(&self, module_name: &str, name: &str) -> Option<&'a Typedef> {
        let module = self.ctx.find_module(module_name)?;
        if let Some(typedef) = module.body.typedefs.iter().find(|t| t.name == name) {
            return Some(typedef);
        }
        for include in &module.includes {
            if let Some(submodule) = self.ctx.find_module(&include.submodule) {
                if let Some(typedef) =
                    submodule.body.typedefs.iter().find(|t| t.name == name)
                {
                    return Some(typedef);
                }
            }
        }
        None
    }

    /// Collapse a type reference to its compiled form. Returns the type
    /// plus the default and units inherited from the typedef chain.
    fn compile_type(
        &mut self,
        desc: &TypeDesc,
    ) -> Result<(CompiledType, Option<String>, Option<String>)> {
        let (prefix, local) = split_prefixed(&desc.name);
        let (prefix, local) = (prefix.map(str::to_string), local.to_string());

        if prefix.is_none() {
            if let Some(builtin) = BuiltinType::from_name(&local) {
                let base = CompiledType::plain(builtin);
                let compiled = self.apply_restrictions(desc, base, true)?;
                return Ok((compiled, None, None));
            }
        }

        let typedef = match &prefix {
            Some(prefix) => {
                let module = self.prefixes.get(prefix).cloned().ok_or_else(|| {
                    Error::Unresolved(format!(
                        "prefix '{}' of type '{}' is not bound to any module",
                        prefix, desc.name
                    ))
                })?;
                self.find_module_typedef(&module, &local)
            }
            None => self
                .find_scoped_typedef(&local)
                .or_else(|| self.find_module_typedef(&self.main.name, &local)),
        };

        let typedef = match typedef {
            Some(typedef) => typedef,
            None => {
                // The explicit extension point: a registered custom type.
                if let Some(hook) = self.ctx.find_custom_type(&desc.name) {
                    let mut compiled = CompiledType::plain(BuiltinType::String);
                    compiled.custom = Some(hook);
                    return Ok((compiled, None, None));
                }
                return Err(Error::Unresolved(format!(
                    "type '{}' is not defined",
                    desc.name
                )));
            }
        };

        // Typedef cycle detection by definition identity, not by name,
        // so shadowed names in nested scopes cannot confuse it.
        let marker = typedef as *const Typedef as usize;
        if self.typedef_chain.contains(&marker) {
            return Err(Error::Denied(format!(
                "typedef '{}' is cyclically derived",
                typedef.name
            )));
        }
        self.typedef_chain.push(marker);

        let result = (|| {
            let (base, base_default, base_units) = match &prefix {
                Some(prefix) => {
                    let module_name = self.prefixes.get(prefix).cloned().unwrap();
                    self.compile_foreign_typedef(&module_name, typedef)?
                }
                None => {
                    let (ty, d, u) = self.compile_type(&typedef.type_)?;
                    (ty, d, u)
                }
            };
            let compiled = self.apply_restrictions(desc, base, false)?;
            let default = typedef.default.clone().or(base_default);
            let units = typedef.units.clone().or(base_units);
            Ok((compiled, default, units))
        })();

        self.typedef_chain.pop();
        result
    }

    /// Compile a typedef that lives in another module: its own prefixes
    /// and module-level scope apply while walking its chain.
    fn compile_foreign_typedef(
        &mut self,
        module_name: &str,
        typedef: &'a Typedef,
    ) -> Result<(CompiledType, Option<String>, Option<String>)> {
        let module = self
            .ctx
            .find_module(module_name)
            .ok_or_else(|| Error::Unresolved(format!("module '{}' is not known", module_name)))?;

        let saved_prefixes =
            std::mem::replace(&mut self.prefixes, module_prefix_map(module));
        let saved_scopes = std::mem::take(&mut self.scopes);
        self.scopes.push(Scope {
            typedefs: &module.body.typedefs,
            groupings: &module.body.groupings,
        });

        let result = self.compile_type(&typedef.type_);

        self.scopes = saved_scopes;
        self.prefixes = saved_prefixes;
        result
    }

    fn restriction_error(&self, message: impl Into<String>, offending: &str) -> Error {
        Error::Validation(ValidationError::new(message).with_offending(offending))
    }

    /// Apply one derivation step's restrictions onto a compiled base.
    /// `first_level` is true when the base is the built-in itself.
    fn apply_restrictions(
        &mut self,
        desc: &TypeDesc,
        mut base: CompiledType,
        first_level: bool,
    ) -> Result<CompiledType> {
        let builtin = base.base;

        // fraction-digits is fixed at the first decimal64 derivation.
        if builtin == BuiltinType::Decimal64 {
            match (first_level, desc.fraction_digits) {
                (true, Some(fd)) => base.fraction_digits = fd,
                (true, None) => {
                    return Err(self.restriction_error(
                        "decimal64 requires fraction-digits",
                        &desc.name,
                    ))
                }
                (false, Some(_)) => {
                    return Err(self.restriction_error(
                        "fraction-digits cannot be changed along a derivation chain",
                        &desc.name,
                    ))
                }
                (false, None) => {}
            }
        } else if desc.fraction_digits.is_some() {
            return Err(self.restriction_error(
                format!("fraction-digits is not applicable to {}", builtin),
                &desc.name,
            ));
        }

        if let Some(range) = &desc.range {
            if !builtin.has_range() {
                return Err(self.restriction_error(
                    format!("range restriction is not applicable to {}", builtin),
                    &range.expr,
                ));
            }
            let (natural, kind) = if builtin == BuiltinType::Decimal64 {
                (
                    restriction::decimal64_bounds(),
                    RangeKind::Decimal64 {
                        fraction_digits: base.fraction_digits,
                    },
                )
            } else {
                (builtin.integer_bounds().unwrap(), RangeKind::Integer)
            };
            let parent = base
                .range
                .clone()
                .unwrap_or_else(|| IntervalSet::full(natural.0, natural.1));
            let compiled = parse_restriction(&range.expr, kind, natural, &parent)?;
            if base.range.is_some() {
                check_derived(&compiled, &parent, &range.expr)?;
            }
            base.range = Some(compiled);
            if range.error_message.is_some() {
                base.range_error_message = range.error_message.clone();
            }
        }

        if let Some(length) = &desc.length {
            if !builtin.has_length() {
                return Err(self.restriction_error(
                    format!("length restriction is not applicable to {}", builtin),
                    &length.expr,
                ));
            }
            let natural = restriction::length_bounds();
            let parent = base
                .length
                .clone()
                .unwrap_or_else(|| IntervalSet::full(natural.0, natural.1));
            let compiled =
                parse_restriction(&length.expr, RangeKind::Length, natural, &parent)?;
            if base.length.is_some() {
                check_derived(&compiled, &parent, &length.expr)?;
            }
            base.length = Some(compiled);
            if length.error_message.is_some() {
                base.length_error_message = length.error_message.clone();
            }
        }

        if !desc.patterns.is_empty() {
            if builtin != BuiltinType::String {
                return Err(self.restriction_error(
                    format!("pattern restriction is not applicable to {}", builtin),
                    &desc.patterns[0].expr,
                ));
            }
            for pattern in &desc.patterns {
                let mut compiled = CompiledPattern::compile(&pattern.expr, pattern.invert_match)?;
                compiled.error_message = pattern.error_message.clone();
                compiled.error_app_tag = pattern.error_app_tag.clone();
                base.patterns.push(compiled);
            }
        }

        if !desc.enums.is_empty() || (first_level && builtin == BuiltinType::Enumeration) {
            if builtin != BuiltinType::Enumeration {
                return Err(self.restriction_error(
                    format!("enum members are not applicable to {}", builtin),
                    &desc.name,
                ));
            }
            base.enums = self.compose_enums(desc, base.enums, first_level)?;
        }

        if !desc.bits.is_empty() || (first_level && builtin == BuiltinType::Bits) {
            if builtin != BuiltinType::Bits {
                return Err(self.restriction_error(
                    format!("bit members are not applicable to {}", builtin),
                    &desc.name,
                ));
            }
            base.bits = self.compose_bits(desc, base.bits, first_level)?;
        }

        if desc.path.is_some() || (first_level && builtin == BuiltinType::Leafref) {
            if builtin != BuiltinType::Leafref {
                return Err(self.restriction_error(
                    format!("path is not applicable to {}", builtin),
                    desc.path.as_deref().unwrap_or(&desc.name),
                ));
            }
            match (&desc.path, first_level) {
                (Some(path), _) if base.path.is_none() => base.path = Some(path.clone()),
                (Some(_), _) => {
                    return Err(self.restriction_error(
                        "leafref path cannot be changed along a derivation chain",
                        &desc.name,
                    ))
                }
                (None, true) => {
                    return Err(
                        self.restriction_error("leafref requires a path", &desc.name)
                    )
                }
                (None, false) => {}
            }
        }

        if !desc.bases.is_empty() || (first_level && builtin == BuiltinType::Identityref) {
            if builtin != BuiltinType::Identityref {
                return Err(self.restriction_error(
                    format!("base identities are not applicable to {}", builtin),
                    &desc.name,
                ));
            }
            if !first_level && !desc.bases.is_empty() && !base.bases.is_empty() {
                return Err(self.restriction_error(
                    "identityref bases cannot be restricted along a derivation chain",
                    &desc.name,
                ));
            }
            if desc.bases.is_empty() {
                return Err(self.restriction_error(
                    "identityref requires at least one base",
                    &desc.name,
                ));
            }
            for base_name in &desc.bases {
                let key = resolve_reference(&self.prefixes, &self.main.name, base_name)?;
                if !self.identities.contains(&key) {
                    return Err(Error::Unresolved(format!(
                        "base identity '{}' is not known",
                        base_name
                    )));
                }
                base.bases.push(key);
            }
        }

        if let Some(require_instance) = desc.require_instance {
            if !matches!(
                builtin,
                BuiltinType::Leafref | BuiltinType::InstanceIdentifier
            ) {
                return Err(self.restriction_error(
                    format!("require-instance is not applicable to {}", builtin),
                    &desc.name,
                ));
            }
            base.require_instance = require_instance;
        }

        if !desc.union_types.is_empty() || (first_level && builtin == BuiltinType::Union) {
            if builtin != BuiltinType::Union {
                return Err(self.restriction_error(
                    format!("member types are not applicable to {}", builtin),
                    &desc.name,
                ));
            }
            if !first_level && !desc.union_types.is_empty() {
                return Err(self.restriction_error(
                    "union member types cannot be changed along a derivation chain",
                    &desc.name,
                ));
            }
            if desc.union_types.is_empty() {
                return Err(self.restriction_error(
                    "union requires at least one member type",
                    &desc.name,
                ));
            }
            for member in &desc.union_types {
                let (compiled, _, _) = self.compile_type(member)?;
                base.members.push(compiled);
            }
        }

        Ok(base)
    }

    /// Compose enum members: first level assigns values, a derivation
    /// restricts to a subset without re-assigning.
    fn compose_enums(
        &self,
        desc: &TypeDesc,
        parent: Vec<CompiledEnum>,
        first_level: bool,
    ) -> Result<Vec<CompiledEnum>> {
        if first_level {
            if desc.enums.is_empty() {
                return Err(self.restriction_error(
                    "enumeration must define at least one member",
                    &desc.name,
                ));
            }
            let mut members: Vec<CompiledEnum> = Vec::new();
            let mut next_value: i64 = 0;
            for member in &desc.enums {
                if members.iter().any(|m| m.name == member.name) {
                    return Err(self.restriction_error(
                        "duplicate enum member name",
                        &member.name,
                    ));
                }
                let value = match member.value {
                    Some(value) => i64::from(value),
                    None => next_value,
                };
                if value > i64::from(i32::MAX) {
                    return Err(self.restriction_error(
                        "enum value overflows the 32-bit signed range",
                        &member.name,
                    ));
                }
                if members.iter().any(|m| i64::from(m.value) == value) {
                    return Err(self.restriction_error(
                        "duplicate enum member value",
                        &member.name,
                    ));
                }
                next_value = value + 1;
                members.push(CompiledEnum {
                    name: member.name.clone(),
                    value: value as i32,
                });
            }
            Ok(members)
        } else {
            if desc.enums.is_empty() {
                return Ok(parent);
            }
            let mut members = Vec::new();
            for member in &desc.enums {
                let inherited = parent.iter().find(|m| m.name == member.name).ok_or_else(
                    || {
                        self.restriction_error(
                            "enum member is not defined in the base type",
                            &member.name,
                        )
                    },
                )?;
                if let Some(value) = member.value {
                    if value != inherited.value {
                        return Err(self.restriction_error(
                            "enum member value cannot be re-assigned",
                            &member.name,
                        ));
                    }
                }
                if members.iter().any(|m: &CompiledEnum| m.name == member.name) {
                    return Err(self.restriction_error(
                        "duplicate enum member name",
                        &member.name,
                    ));
                }
                members.push(inherited.clone());
            }
            Ok(members)
        }
    }

    /// Compose bit members; uniqueness is checked against the bit set.
    fn compose_bits(
        &self,
        desc: &TypeDesc,
        parent: Vec<CompiledBit>,
        first_level: bool,
    ) -> Result<Vec<CompiledBit>> {
        if first_level {
            if desc.bits.is_empty() {
                return Err(self.restriction_error(
                    "bits must define at least one member",
                    &desc.name,
                ));
            }
            let mut members: Vec<CompiledBit> = Vec::new();
            let mut next_position: u64 = 0;
            for member in &desc.bits {
                if members.iter().any(|m| m.name == member.name) {
                    return Err(
                        self.restriction_error("duplicate bit member name", &member.name)
                    );
                }
                let position = match member.position {
                    Some(position) => u64::from(position),
                    None => next_position,
                };
                if position > u64::from(u32::MAX) {
                    return Err(self.restriction_error(
                        "bit position overflows the 32-bit unsigned range",
                        &member.name,
                    ));
                }
                if members.iter().any(|m| u64::from(m.position) == position) {
                    return Err(self.restriction_error(
                        "duplicate bit member position",
                        &member.name,
                    ));
                }
                next_position = position + 1;
                members.push(CompiledBit {
                    name: member.name.clone(),
                    position: position as u32,
                });
            }
            Ok(members)
        } else {
            if desc.bits.is_empty() {
                return Ok(parent);
            }
            let mut members = Vec::new();
            for member in &desc.bits {
                let inherited = parent.iter().find(|m| m.name == member.name).ok_or_else(
                    || {
                        self.restriction_error(
                            "bit member is not defined in the base type",
                            &member.name,
                        )
                    },
                )?;
                if let Some(position) = member.position {
                    if position != inherited.position {
                        return Err(self.restriction_error(
                            "bit member position cannot be re-assigned",
                            &member.name,
                        ));
                    }
                }
                if members.iter().any(|m: &CompiledBit| m.name == member.name) {
                    return Err(
                        self.restriction_error("duplicate bit member name", &member.name)
                    );
                }
                members.push(inherited.clone());
            }
            Ok(members)
        }
    }

    // ---------------------------------------------------------------
    // Data nodes (step 6)
    // ---------------------------------------------------------------

    fn add_node(&mut self, parent: Option<NodeId>, node: CompiledNode) -> Result<NodeId> {
        let siblings = match parent {
            Some(parent) => &self.nodes[parent.0].children,
            None => &self.roots,
        };
        if let Some(existing) = siblings
            .iter()
            .find(|s| self.nodes[s.0].name == node.name)
        {
            let path = self.node_path(*existing);
            return Err(Error::Validation(
                ValidationError::new(format!(
                    "duplicate child name '{}' under the same parent",
                    node.name
                ))
                .with_path(path),
            ));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    fn node_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            segments.push(self.nodes[node_id.0].name.clone());
            current = self.nodes[node_id.0].parent;
        }
        segments.reverse();
        format!("/{}:{}", self.main.name, segments.join("/"))
    }

    /// Effective status: an explicit child status must not be more alive
    /// than the parent's effective status.
    fn effective_status(
        &self,
        explicit: Option<Status>,
        parent: Status,
        name: &str,
    ) -> Result<Status> {
        match explicit {
            Some(status) if status.rank() < parent.rank() => Err(Error::Validation(
                ValidationError::new(format!(
                    "status '{}' conflicts with the parent's '{}' status",
                    status.as_str(),
                    parent.as_str()
                ))
                .with_offending(name),
            )),
            Some(status) => Ok(status),
            None => Ok(parent),
        }
    }

    /// Effective config; `config true` under `config false` is an error.
    fn effective_config(
        &self,
        explicit: Option<bool>,
        parent: bool,
        in_operation: bool,
        name: &str,
    ) -> Result<bool> {
        if in_operation {
            return Ok(false);
        }
        match explicit {
            Some(true) if !parent => Err(Error::Validation(
                ValidationError::new("config true cannot be under config false")
                    .with_offending(name),
            )),
            Some(config) => Ok(config),
            None => Ok(parent),
        }
    }

    fn common_node(
        &mut self,
        common: &NodeCommon,
        kind: CompiledNodeKind,
        parent: Option<NodeId>,
        parent_config: bool,
        parent_status: Status,
        in_operation: bool,
        musts: &[Must],
    ) -> Result<CompiledNode> {
        let status = self.effective_status(common.status, parent_status, &common.name)?;
        let config =
            self.effective_config(common.config, parent_config, in_operation, &common.name)?;
        Ok(CompiledNode {
            name: common.name.clone(),
            module: self.main.name.clone(),
            kind,
            parent,
            children: Vec::new(),
            config,
            status,
            whens: common.when.iter().map(|w| w.condition.clone()).collect(),
            musts: musts.to_vec(),
            description: common.description.clone(),
            reference: common.reference.clone(),
        })
    }

    fn compile_data_node(
        &mut self,
        node: &'a DataNode,
        parent: Option<NodeId>,
        parent_config: bool,
        parent_status: Status,
        in_operation: bool,
    ) -> Result<()> {
        if !self.if_features_satisfied(&node.common().if_features)? {
            return Ok(());
        }

        match node {
            DataNode::Container(container) => {
                let kind = CompiledNodeKind::Container {
                    presence: container.presence.clone(),
                };
                let compiled = self.common_node(
                    &container.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &container.musts,
                )?;
                let config = compiled.config;
                let status = compiled.status;
                let id = self.add_node(parent, compiled)?;

                self.scopes.push(Scope {
                    typedefs: &container.typedefs,
                    groupings: &container.groupings,
                });
                for child in &container.children {
                    self.compile_data_node(child, Some(id), config, status, in_operation)?;
                }
                for action in &container.actions {
                    self.compile_operation(action, Some(id))?;
                }
                for notification in &container.notifications {
                    self.compile_notification(notification, Some(id))?;
                }
                self.scopes.pop();
            }
            DataNode::List(list) => {
                let keys: Vec<String> = list
                    .key
                    .as_deref()
                    .map(|k| k.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                let kind = CompiledNodeKind::List {
                    keys: keys.clone(),
                    uniques: list.uniques.clone(),
                    min_elements: list.min_elements,
                    max_elements: list.max_elements,
                    ordered_by: list.ordered_by.unwrap_or_default(),
                };
                let compiled = self.common_node(
                    &list.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &list.musts,
                )?;
                let config = compiled.config;
                let status = compiled.status;
                let id = self.add_node(parent, compiled)?;

                self.scopes.push(Scope {
                    typedefs: &list.typedefs,
                    groupings: &list.groupings,
                });
                for child in &list.children {
                    self.compile_data_node(child, Some(id), config, status, in_operation)?;
                }
                for action in &list.actions {
                    self.compile_operation(action, Some(id))?;
                }
                for notification in &list.notifications {
                    self.compile_notification(notification, Some(id))?;
                }
                self.scopes.pop();

                if config && keys.is_empty() {
                    return Err(Error::Validation(
                        ValidationError::new("a configuration list must have a key")
                            .with_path(self.node_path(id)),
                    ));
                }
                for key in &keys {
                    let found = self.nodes[id.0].children.iter().any(|c| {
                        self.nodes[c.0].name == *key
                            && matches!(self.nodes[c.0].kind, CompiledNodeKind::Leaf { .. })
                    });
                    if !found {
                        return Err(Error::Validation(
                            ValidationError::new(format!(
                                "key '{}' does not name a child leaf",
                                key
                            ))
                            .with_path(self.node_path(id)),
                        ));
                    }
                }
            }
            DataNode::Leaf(leaf) => {
                let (type_, inherited_default, inherited_units) =
                    self.compile_type(&leaf.type_)?;
                let mandatory = leaf.mandatory.unwrap_or(false);
                let default = if mandatory {
                    None
                } else {
                    leaf.default.clone().or(inherited_default)
                };
                let kind = CompiledNodeKind::Leaf {
                    type_,
                    default,
                    default_value: None,
                    units: leaf.units.clone().or(inherited_units),
                    mandatory,
                };
                let compiled = self.common_node(
                    &leaf.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &leaf.musts,
                )?;
                self.add_node(parent, compiled)?;
            }
            DataNode::LeafList(leaf_list) => {
                let (type_, inherited_default, inherited_units) =
                    self.compile_type(&leaf_list.type_)?;
                let defaults = if leaf_list.defaults.is_empty() {
                    inherited_default.into_iter().collect()
                } else {
                    leaf_list.defaults.clone()
                };
                let kind = CompiledNodeKind::LeafList {
                    type_,
                    defaults,
                    units: leaf_list.units.clone().or(inherited_units),
                    min_elements: leaf_list.min_elements,
                    max_elements: leaf_list.max_elements,
                    ordered_by: leaf_list.ordered_by.unwrap_or_default(),
                };
                let compiled = self.common_node(
                    &leaf_list.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &leaf_list.musts,
                )?;
                self.add_node(parent, compiled)?;
            }
            DataNode::Choice(choice) => {
                let kind = CompiledNodeKind::Choice {
                    default: choice.default.clone(),
                    mandatory: choice.mandatory.unwrap_or(false),
                };
                let compiled = self.common_node(
                    &choice.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &[],
                )?;
                let config = compiled.config;
                let status = compiled.status;
                let id = self.add_node(parent, compiled)?;
                for child in &choice.children {
                    self.compile_data_node(child, Some(id), config, status, in_operation)?;
                }

                if let Some(default_case) = &choice.default {
                    let exists = self.nodes[id.0]
                        .children
                        .iter()
                        .any(|c| self.nodes[c.0].name == *default_case);
                    if !exists {
                        return Err(Error::Validation(
                            ValidationError::new(format!(
                                "default case '{}' does not exist",
                                default_case
                            ))
                            .with_path(self.node_path(id)),
                        ));
                    }
                }
            }
            DataNode::Case(case) => {
                let compiled = self.common_node(
                    &case.common,
                    CompiledNodeKind::Case,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &[],
                )?;
                let config = compiled.config;
                let status = compiled.status;
                let id = self.add_node(parent, compiled)?;
                for child in &case.children {
                    self.compile_data_node(child, Some(id), config, status, in_operation)?;
                }
            }
            DataNode::Anydata(any) | DataNode::Anyxml(any) => {
                let mandatory = any.mandatory.unwrap_or(false);
                let kind = if matches!(node, DataNode::Anydata(_)) {
                    CompiledNodeKind::Anydata { mandatory }
                } else {
                    CompiledNodeKind::Anyxml { mandatory }
                };
                let compiled = self.common_node(
                    &any.common,
                    kind,
                    parent,
                    parent_config,
                    parent_status,
                    in_operation,
                    &any.musts,
                )?;
                self.add_node(parent, compiled)?;
            }
            DataNode::Uses(uses) => {
                self.expand_uses(uses, parent, parent_config, parent_status, in_operation)?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Uses expansion, refines, augments
    // ---------------------------------------------------------------

    fn find_grouping(&self, reference: &str) -> Result<&'a Grouping> {
        let (prefix, local) = split_prefixed(reference);
        match prefix {
            Some(prefix) => {
                let module_name = self.prefixes.get(prefix).ok_or_else(|| {
                    Error::Unresolved(format!(
                        "prefix '{}' of grouping '{}' is not bound to any module",
                        prefix, reference
                    ))
                })?;
                let module = self.ctx.find_module(module_name).ok_or_else(|| {
                    Error::Unresolved(format!("module '{}' is not known", module_name))
                })?;
                module
                    .body
                    .groupings
                    .iter()
                    .find(|g| g.name == local)
                    .ok_or_else(|| {
                        Error::Unresolved(format!("grouping '{}' is not defined", reference))
                    })
            }
            None => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.groupings.iter().find(|g| g.name == local))
                .ok_or_else(|| {
                    Error::Unresolved(format!("grouping '{}' is not defined", reference))
                }),
        }
    }

    fn expand_uses(
        &mut self,
        uses: &'a UsesNode,
        parent: Option<NodeId>,
        parent_config: bool,
        parent_status: Status,
        in_operation: bool,
    ) -> Result<()> {
        let grouping = self.find_grouping(&uses.common.name)?;

        let marker = grouping as *const Grouping as usize;
        if self.grouping_chain.contains(&marker) {
            return Err(Error::Denied(format!(
                "grouping '{}' is cyclically referenced",
                grouping.name
            )));
        }
        self.grouping_chain.push(marker);

        let first_new = match parent {
            Some(parent) => self.nodes[parent.0].children.len(),
            None => self.roots.len(),
        };

        self.scopes.push(Scope {
            typedefs: &grouping.typedefs,
            groupings: &grouping.groupings,
        });
        let result = (|| -> Result<()> {
            for child in &grouping.children {
                self.compile_data_node(child, parent, parent_config, parent_status, in_operation)?;
            }
            for action in &grouping.actions {
                self.compile_operation(action, parent)?;
            }
            for notification in &grouping.notifications {
                self.compile_notification(notification, parent)?;
            }
            Ok(())
        })();
        self.scopes.pop();
        self.grouping_chain.pop();
        result?;

        let expanded: Vec<NodeId> = match parent {
            Some(parent) => self.nodes[parent.0].children[first_new..].to_vec(),
            None => self.roots[first_new..].to_vec(),
        };

        // The uses' own when applies to every node the expansion grafted.
        if let Some(when) = &uses.common.when {
            for id in &expanded {
                self.nodes[id.0].whens.push(when.condition.clone());
            }
        }

        for refine in &uses.refines {
            let target = self.resolve_descendant(&expanded, &refine.target)?;
            self.apply_refine(target, refine)?;
        }
        for augment in &uses.augments {
            if !self.if_features_satisfied(&augment.if_features)? {
                continue;
            }
            let target = self.resolve_descendant(&expanded, &augment.target)?;
            self.graft_augment(augment, target)?;
        }
        Ok(())
    }

    /// Resolve a descendant schema path among freshly expanded nodes
    fn resolve_descendant(&self, expanded: &[NodeId], path: &str) -> Result<NodeId> {
        let mut steps = path.split('/').filter(|s| !s.is_empty());
        let first = steps.next().ok_or_else(|| {
            Error::Unresolved(format!("empty descendant path '{}'", path))
        })?;
        let (_, first_name) = split_prefixed(first);

        let mut current = expanded
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].name == first_name)
            .ok_or_else(|| {
                Error::Unresolved(format!("descendant path target '{}' not found", path))
            })?;

        for step in steps {
            let (_, name) = split_prefixed(step);
            current = self.nodes[current.0]
                .children
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].name == name)
                .ok_or_else(|| {
                    Error::Unresolved(format!("descendant path target '{}' not found", path))
                })?;
        }
        Ok(current)
    }

    /// Refinements may tighten config, default, description, mandatory,
    /// min/max, must, and presence.
    fn apply_refine(&mut self, target: NodeId, refine: &Refine) -> Result<()> {
        let path = self.node_path(target);
        let reject = |property: &str| {
            Error::Validation(
                ValidationError::new(format!(
                    "refine property '{}' is not applicable to the target",
                    property
                ))
                .with_path(path.clone()),
            )
        };

        if let Some(config) = refine.config {
            self.set_config_recursive(target, config);
        }
        if let Some(description) = &refine.description {
            self.nodes[target.0].description = Some(description.clone());
        }
        if let Some(reference) = &refine.reference {
            self.nodes[target.0].reference = Some(reference.clone());
        }
        self.nodes[target.0].musts.extend(refine.musts.iter().cloned());

        let node = &mut self.nodes[target.0];
        match &mut node.kind {
            CompiledNodeKind::Container { presence } => {
                if let Some(new_presence) = &refine.presence {
                    *presence = Some(new_presence.clone());
                }
                if refine.mandatory.is_some() {
                    return Err(reject("mandatory"));
                }
            }
            CompiledNodeKind::Leaf {
                default, mandatory, ..
            } => {
                if let Some(new_mandatory) = refine.mandatory {
                    *mandatory = new_mandatory;
                }
                if let Some(new_default) = refine.defaults.first() {
                    if *mandatory {
                        return Err(reject("default"));
                    }
                    *default = Some(new_default.clone());
                }
            }
            CompiledNodeKind::LeafList {
                defaults,
                min_elements,
                max_elements,
                ..
            } => {
                if !refine.defaults.is_empty() {
                    *defaults = refine.defaults.clone();
                }
                if refine.min_elements.is_some() {
                    *min_elements = refine.min_elements;
                }
                if refine.max_elements.is_some() {
                    *max_elements = refine.max_elements;
                }
            }
            CompiledNodeKind::List {
                min_elements,
                max_elements,
                ..
            } => {
                if refine.min_elements.is_some() {
                    *min_elements = refine.min_elements;
                }
                if refine.max_elements.is_some() {
                    *max_elements = refine.max_elements;
                }
            }
            CompiledNodeKind::Choice {
                default, mandatory, ..
            } => {
                if let Some(new_mandatory) = refine.mandatory {
                    *mandatory = new_mandatory;
                }
                if let Some(new_default) = refine.defaults.first() {
                    *default = Some(new_default.clone());
                }
            }
            CompiledNodeKind::Anydata { mandatory }
            | CompiledNodeKind::Anyxml { mandatory } => {
                if let Some(new_mandatory) = refine.mandatory {
                    *mandatory = new_mandatory;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn set_config_recursive(&mut self, id: NodeId, config: bool) {
        self.nodes[id.0].config = config;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.set_config_recursive(child, config);
        }
    }

    /// Step 7: resolve a top-level augment target and graft its children
    fn apply_augment(&mut self, augment: &'a Augment) -> Result<()> {
        if !self.if_features_satisfied(&augment.if_features)? {
            return Ok(());
        }
        let target = self.resolve_absolute(&augment.target)?;
        self.graft_augment(augment, target)
    }

    fn graft_augment(&mut self, augment: &'a Augment, target: NodeId) -> Result<()> {
        let config = self.nodes[target.0].config;
        let status = self.nodes[target.0].status;
        let first_new = self.nodes[target.0].children.len();

        for child in &augment.children {
            self.compile_data_node(child, Some(target), config, status, false)?;
        }
        for action in &augment.actions {
            self.compile_operation(action, Some(target))?;
        }
        for notification in &augment.notifications {
            self.compile_notification(notification, Some(target))?;
        }

        if let Some(when) = &augment.when {
            let grafted = self.nodes[target.0].children[first_new..].to_vec();
            for id in grafted {
                self.nodes[id.0].whens.push(when.condition.clone());
            }
        }
        Ok(())
    }

    /// Resolve an absolute schema path within this module's compiled tree
    fn resolve_absolute(&self, path: &str) -> Result<NodeId> {
        if !path.starts_with('/') {
            return Err(Error::Unresolved(format!(
                "path '{}' is not absolute",
                path
            )));
        }
        let mut current: Option<NodeId> = None;
        for step in path.split('/').filter(|s| !s.is_empty()) {
            let step = strip_predicates(step);
            let (prefix, name) = split_prefixed(step);
            if let Some(prefix) = prefix {
                let module = self.prefixes.get(prefix).ok_or_else(|| {
                    Error::Unresolved(format!(
                        "prefix '{}' of path '{}' is not bound to any module",
                        prefix, path
                    ))
                })?;
                if *module != self.main.name {
                    return Err(Error::Unresolved(format!(
                        "path '{}' targets module '{}' which is outside this compile",
                        path, module
                    )));
                }
            }
            let candidates = match current {
                Some(id) => &self.nodes[id.0].children,
                None => &self.roots,
            };
            current = candidates
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].name == name);
            if current.is_none() {
                return Err(Error::Unresolved(format!(
                    "path target '{}' not found",
                    path
                )));
            }
        }
        current.ok_or_else(|| Error::Unresolved(format!("path target '{}' not found", path)))
    }

    // ---------------------------------------------------------------
    // Operations and notifications
    // ---------------------------------------------------------------

    fn compile_operation(
        &mut self,
        operation: &'a Operation,
        parent: Option<NodeId>,
    ) -> Result<()> {
        if !self.if_features_satisfied(&operation.if_features)? {
            return Ok(());
        }
        let status = self.effective_status(operation.status, Status::Current, &operation.name)?;
        let node = CompiledNode {
            name: operation.name.clone(),
            module: self.main.name.clone(),
            kind: CompiledNodeKind::Operation,
            parent,
            children: Vec::new(),
            config: false,
            status,
            whens: Vec::new(),
            musts: Vec::new(),
            description: operation.description.clone(),
            reference: operation.reference.clone(),
        };
        let id = match parent {
            Some(_) => self.add_node(parent, node)?,
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(node);
                self.rpcs.push(id);
                id
            }
        };

        self.scopes.push(Scope {
            typedefs: &operation.typedefs,
            groupings: &operation.groupings,
        });
        let result = (|| -> Result<()> {
            for (io, kind) in [
                (&operation.input, CompiledNodeKind::Input),
                (&operation.output, CompiledNodeKind::Output),
            ] {
                if let Some(io) = io {
                    let io_node = CompiledNode {
                        name: match kind {
                            CompiledNodeKind::Input => "input".to_string(),
                            _ => "output".to_string(),
                        },
                        module: self.main.name.clone(),
                        kind,
                        parent: Some(id),
                        children: Vec::new(),
                        config: false,
                        status,
                        whens: Vec::new(),
                        musts: io.musts.clone(),
                        description: None,
                        reference: None,
                    };
                    let io_id = self.add_node(Some(id), io_node)?;
                    self.scopes.push(Scope {
                        typedefs: &io.typedefs,
                        groupings: &io.groupings,
                    });
                    let inner = (|| -> Result<()> {
                        for child in &io.children {
                            self.compile_data_node(child, Some(io_id), false, status, true)?;
                        }
                        Ok(())
                    })();
                    self.scopes.pop();
                    inner?;
                }
            }
            Ok(())
        })();
        self.scopes.pop();
        result
    }

    fn compile_notification(
        &mut self,
        notification: &'a Notification,
        parent: Option<NodeId>,
    ) -> Result<()> {
        if !self.if_features_satisfied(&notification.if_features)? {
            return Ok(());
        }
        let status =
            self.effective_status(notification.status, Status::Current, &notification.name)?;
        let node = CompiledNode {
            name: notification.name.clone(),
            module: self.main.name.clone(),
            kind: CompiledNodeKind::Notification,
            parent,
            children: Vec::new(),
            config: false,
            status,
            whens: Vec::new(),
            musts: notification.musts.clone(),
            description: notification.description.clone(),
            reference: notification.reference.clone(),
        };
        let id = match parent {
            Some(_) => self.add_node(parent, node)?,
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(node);
                self.notifications.push(id);
                id
            }
        };

        self.scopes.push(Scope {
            typedefs: &notification.typedefs,
            groupings: &notification.groupings,
        });
        let result = (|| -> Result<()> {
            for child in &notification.children {
                self.compile_data_node(child, Some(id), false, status, true)?;
            }
            Ok(())
        })();
        self.scopes.pop();
        result
    }

    // ---------------------------------------------------------------
    // Leafref linking
    // ---------------------------------------------------------------

    fn resolve_leafrefs(&mut self) -> Result<()> {
        let ids: Vec<NodeId> = (0..self.nodes.len()).map(NodeId).collect();
        for id in ids {
            let type_ = match &self.nodes[id.0].kind {
                CompiledNodeKind::Leaf { type_, .. } => type_.clone(),
                CompiledNodeKind::LeafList { type_, .. } => type_.clone(),
                _ => continue,
            };
            let resolved = self.link_leafrefs_in_type(type_, id, &mut Vec::new())?;
            match &mut self.nodes[id.0].kind {
                CompiledNodeKind::Leaf { type_, .. } => *type_ = resolved,
                CompiledNodeKind::LeafList { type_, .. } => *type_ = resolved,
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn link_leafrefs_in_type(
        &self,
        mut type_: CompiledType,
        at: NodeId,
        visiting: &mut Vec<NodeId>,
    ) -> Result<CompiledType> {
        if type_.base == BuiltinType::Leafref && type_.realtype.is_none() {
            let path = type_.path.clone().ok_or_else(|| {
                Error::Internal("leafref compiled without a path".into())
            })?;
            let target = self.resolve_leafref_target(at, &path)?;
            if visiting.contains(&target) {
                return Err(Error::Denied(format!(
                    "leafref at '{}' is part of a reference cycle",
                    self.node_path(at)
                )));
            }
            visiting.push(at);
            let target_type = match &self.nodes[target.0].kind {
                CompiledNodeKind::Leaf { type_, .. } => type_.clone(),
                CompiledNodeKind::LeafList { type_, .. } => type_.clone(),
                _ => {
                    return Err(Error::Unresolved(format!(
                        "leafref path '{}' does not target a leaf",
                        path
                    )))
                }
            };
            let resolved = self.link_leafrefs_in_type(target_type, target, visiting)?;
            visiting.pop();
            type_.realtype = Some(Box::new(resolved));
        }

        let members = std::mem::take(&mut type_.members);
        for member in members {
            type_
                .members
                .push(self.link_leafrefs_in_type(member, at, visiting)?);
        }
        Ok(type_)
    }

    /// Evaluate a leafref path against the compiled schema tree
    fn resolve_leafref_target(&self, from: NodeId, path: &str) -> Result<NodeId> {
        let missing = || {
            Error::Unresolved(format!(
                "leafref target '{}' is missing from the schema",
                path
            ))
        };

        let mut current: Option<NodeId>;
        let steps: Vec<&str>;
        if let Some(absolute) = path.strip_prefix('/') {
            current = None;
            steps = absolute.split('/').filter(|s| !s.is_empty()).collect();
        } else {
            current = self.nodes[from.0].parent;
            steps = path.split('/').filter(|s| !s.is_empty()).collect();
        }

        for step in steps {
            let step = strip_predicates(step);
            if step == ".." {
                current = match current {
                    Some(id) => self.nodes[id.0].parent,
                    None => return Err(missing()),
                };
                continue;
            }
            let (_, name) = split_prefixed(step);
            let candidates = match current {
                Some(id) => &self.nodes[id.0].children,
                None => &self.roots,
            };
            current = candidates
                .iter()
                .copied()
                .find(|id| self.nodes[id.0].name == name);
            if current.is_none() {
                return Err(missing());
            }
        }
        current.ok_or_else(missing)
    }

    // ---------------------------------------------------------------
    // Defaults (step 8)
    // ---------------------------------------------------------------

    fn validate_defaults(&mut self) -> Result<()> {
        let resolver = GraphResolver {
            graph: &self.identities,
            prefixes: &self.prefixes,
            default_module: &self.main.name,
        };

        let mut stored: Vec<(NodeId, crate::types::Value)> = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            match &node.kind {
                CompiledNodeKind::Leaf {
                    type_,
                    default: Some(default),
                    ..
                } => {
                    let value = type_.store(default, &resolver).map_err(|e| {
                        Error::Validation(
                            ValidationError::new(format!(
                                "Invalid default - value does not fit the type ({})",
                                e
                            ))
                            .with_path(self.node_path(NodeId(index)))
                            .with_offending(default),
                        )
                    })?;
                    stored.push((NodeId(index), value));
                }
                CompiledNodeKind::LeafList {
                    type_, defaults, ..
                } => {
                    for default in defaults {
                        type_.store(default, &resolver).map_err(|e| {
                            Error::Validation(
                                ValidationError::new(format!(
                                    "Invalid default - value does not fit the type ({})",
                                    e
                                ))
                                .with_path(self.node_path(NodeId(index)))
                                .with_offending(default),
                            )
                        })?;
                    }
                }
                _ => {}
            }
        }

        for (id, value) in stored {
            if let CompiledNodeKind::Leaf { default_value, .. } = &mut self.nodes[id.0].kind {
                *default_value = Some(value);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Deviations (step 9)
    // ---------------------------------------------------------------

    fn apply_deviation(&mut self, deviation: &'a Deviation) -> Result<()> {
        let target = self.resolve_absolute(&deviation.target)?;

        for deviate in &deviation.deviates {
            match deviate {
                Deviate::NotSupported => {
                    self.remove_node(target);
                    return Ok(());
                }
                Deviate::Add(props) => self.deviate_add(target, props)?,
                Deviate::Replace(props) => self.deviate_replace(target, props)?,
                Deviate::Delete(props) => self.deviate_delete(target, props)?,
            }
        }
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) {
        match self.nodes[id.0].parent {
            Some(parent) => self.nodes[parent.0].children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
    }

    fn deviate_conflict(&self, target: NodeId, property: &str) -> Error {
        Error::Validation(
            ValidationError::new(format!(
                "deviate add conflicts with existing property '{}'",
                property
            ))
            .with_path(self.node_path(target)),
        )
    }

    fn deviate_add(&mut self, target: NodeId, props: &DeviateProps) -> Result<()> {
        // Conflicts are rejected before anything is mutated.
        if let CompiledNodeKind::Leaf { default, units, .. } = &self.nodes[target.0].kind {
            if !props.defaults.is_empty() && default.is_some() {
                return Err(self.deviate_conflict(target, "default"));
            }
            if props.units.is_some() && units.is_some() {
                return Err(self.deviate_conflict(target, "units"));
            }
        }

        if let Some(config) = props.config {
            self.set_config_recursive(target, config);
        }

        let node = &mut self.nodes[target.0];
        node.musts.extend(props.musts.iter().cloned());
        match &mut node.kind {
            CompiledNodeKind::Leaf {
                default, mandatory, units, ..
            } => {
                if let Some(new_default) = props.defaults.first() {
                    *default = Some(new_default.clone());
                }
                if let Some(new_mandatory) = props.mandatory {
                    *mandatory = new_mandatory;
                }
                if let Some(new_units) = &props.units {
                    *units = Some(new_units.clone());
                }
            }
            CompiledNodeKind::LeafList {
                defaults,
                min_elements,
                max_elements,
                ..
            } => {
                defaults.extend(props.defaults.iter().cloned());
                if props.min_elements.is_some() {
                    *min_elements = props.min_elements;
                }
                if props.max_elements.is_some() {
                    *max_elements = props.max_elements;
                }
            }
            CompiledNodeKind::List {
                uniques,
                min_elements,
                max_elements,
                ..
            } => {
                uniques.extend(props.uniques.iter().cloned());
                if props.min_elements.is_some() {
                    *min_elements = props.min_elements;
                }
                if props.max_elements.is_some() {
                    *max_elements = props.max_elements;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn deviate_replace(&mut self, target: NodeId, props: &DeviateProps) -> Result<()> {
        if let Some(type_desc) = &props.type_ {
            let (compiled, _, _) = self.compile_type(type_desc)?;
            let node = &mut self.nodes[target.0];
            match &mut node.kind {
                CompiledNodeKind::Leaf { type_, .. } => *type_ = compiled,
                CompiledNodeKind::LeafList { type_, .. } => *type_ = compiled,
                _ => {
                    return Err(Error::Validation(
                        ValidationError::new("deviate replace type targets a non-leaf")
                            .with_path(self.node_path(target)),
                    ))
                }
            }
        }
        if let Some(config) = props.config {
            self.set_config_recursive(target, config);
        }

        let node = &mut self.nodes[target.0];
        match &mut node.kind {
            CompiledNodeKind::Leaf {
                default, mandatory, units, ..
            } => {
                if let Some(new_default) = props.defaults.first() {
                    *default = Some(new_default.clone());
                }
                if let Some(new_mandatory) = props.mandatory {
                    *mandatory = new_mandatory;
                }
                if let Some(new_units) = &props.units {
                    *units = Some(new_units.clone());
                }
            }
            CompiledNodeKind::LeafList {
                defaults,
                min_elements,
                max_elements,
                units,
                ..
            } => {
                if !props.defaults.is_empty() {
                    *defaults = props.defaults.clone();
                }
                if props.min_elements.is_some() {
                    *min_elements = props.min_elements;
                }
                if props.max_elements.is_some() {
                    *max_elements = props.max_elements;
                }
                if let Some(new_units) = &props.units {
                    *units = Some(new_units.clone());
                }
            }
            CompiledNodeKind::List {
                min_elements,
                max_elements,
                ..
            } => {
                if props.min_elements.is_some() {
                    *min_elements = props.min_elements;
                }
                if props.max_elements.is_some() {
                    *max_elements = props.max_elements;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn deviate_delete(&mut self, target: NodeId, props: &DeviateProps) -> Result<()> {
        let node = &mut self.nodes[target.0];
        for must in &props.musts {
            node.musts.retain(|m| m.condition != must.condition);
        }
        match &mut node.kind {
            CompiledNodeKind::Leaf { default, units, .. } => {
                if props.defaults.iter().any(|d| Some(d) == default.as_ref()) {
                    *default = None;
                }
                if props.units.is_some() && props.units == *units {
                    *units = None;
                }
            }
            CompiledNodeKind::LeafList {
                defaults, units, ..
            } => {
                defaults.retain(|d| !props.defaults.contains(d));
                if props.units.is_some() && props.units == *units {
                    *units = None;
                }
            }
            CompiledNodeKind::List { uniques, .. } => {
                uniques.retain(|u| !props.uniques.contains(u));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Strip `[...]` predicates from a path step
fn strip_predicates(step: &str) -> &str {
    match step.find('[') {
        Some(index) => &step[..index],
        None => step,
    }
}
