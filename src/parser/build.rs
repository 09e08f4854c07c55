//! Statement-tree builder
//!
//! Turns the generic statement tree into the typed parsed schema tree,
//! enforcing per-keyword argument kinds, sub-statement multiplicity,
//! mandatory and must-be-first rules, version gates, and the relative
//! ordering of module-body groups.

use crate::error::{Error, Result, ValidationError};
use crate::keywords::{ArgKind, BodyGroup, Keyword};
use crate::names;
use crate::parser::stmt::Statement;
use crate::parser::tables::{substmt_rules, FIRST, MANDATORY, UNIQUE, V11};
use crate::schema::parsed::*;

/// Build a parsed module or submodule from its top-level statement
pub fn build_module(stmt: &Statement) -> Result<Module> {
    let root = stmt.fixed_keyword();
    if root != Some(Keyword::Module) && root != Some(Keyword::Submodule) {
        return Err(Error::Denied(format!(
            "expected a module or submodule, got '{}'",
            stmt.keyword
        )));
    }

    let version = scan_version(stmt)?;
    let mut builder = Builder {
        version,
        path: Vec::new(),
    };
    builder.parse_module(stmt)
}

/// Determine the language version before the main pass, so version gates
/// can be enforced while walking.
fn scan_version(stmt: &Statement) -> Result<YangVersion> {
    match stmt.child_arg(Keyword::YangVersion) {
        None => Ok(YangVersion::V1_0),
        Some("1") => Ok(YangVersion::V1_0),
        Some("1.1") => Ok(YangVersion::V1_1),
        Some(other) => Err(Error::Validation(
            ValidationError::new("unsupported yang-version").with_offending(other),
        )),
    }
}

struct Builder {
    version: YangVersion,
    path: Vec<String>,
}

impl Builder {
    fn path(&self) -> String {
        match self.path.split_first() {
            None => "/".to_string(),
            Some((module, rest)) if rest.is_empty() => format!("/{}", module),
            Some((module, rest)) => format!("/{}:{}", module, rest.join("/")),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::Validation(ValidationError::new(message).with_path(self.path()))
    }

    /// Enforce the sub-statement table of a keyword over a statement
    fn check_substatements(&self, stmt: &Statement, parent: Keyword) -> Result<()> {
        let rules = substmt_rules(parent);

        let mut seen_any = false;
        let mut counts = vec![0usize; rules.len()];

        for child in &stmt.children {
            let kw = match child.fixed_keyword() {
                Some(kw) => kw,
                None => continue, // extension instances are always permitted
            };
            let idx = match rules.iter().position(|(k, _)| *k == kw) {
                Some(idx) => idx,
                None => {
                    return Err(self.invalid(format!(
                        "unexpected sub-statement '{}' of '{}'",
                        kw, parent
                    )))
                }
            };
            let flags = rules[idx].1;

            if flags & V11 != 0 && self.version == YangVersion::V1_0 {
                return Err(self.invalid(format!(
                    "sub-statement '{}' of '{}' requires YANG 1.1",
                    kw, parent
                )));
            }
            if flags & UNIQUE != 0 && counts[idx] > 0 {
                return Err(self.invalid(format!(
                    "sub-statement '{}' of '{}' given more than once",
                    kw, parent
                )));
            }
            if flags & FIRST != 0 && seen_any {
                return Err(self.invalid(format!(
                    "sub-statement '{}' of '{}' must appear first",
                    kw, parent
                )));
            }
            counts[idx] += 1;
            seen_any = true;
        }

        for (idx, (kw, flags)) in rules.iter().enumerate() {
            if flags & MANDATORY != 0 && counts[idx] == 0 {
                return Err(self.invalid(format!(
                    "missing mandatory sub-statement '{}' of '{}'",
                    kw, parent
                )));
            }
        }

        Ok(())
    }

    /// Validate and fetch the statement argument per the keyword's kind
    fn argument(&self, stmt: &Statement, kw: Keyword) -> Result<String> {
        match kw.argument_kind() {
            ArgKind::None => {
                if stmt.arg.is_some() {
                    return Err(self.invalid(format!("'{}' takes no argument", kw)));
                }
                Ok(String::new())
            }
            kind => {
                let arg = stmt.arg.as_deref().ok_or_else(|| {
                    self.invalid(format!("'{}' is missing its argument", kw))
                })?;
                match kind {
                    ArgKind::Identifier => {
                        if !names::is_identifier(arg) {
                            return Err(self.invalid(format!(
                                "argument of '{}' is not a valid identifier",
                                kw
                            ))
                            .into_offending(arg));
                        }
                        if Keyword::from_name(arg).is_some() {
                            return Err(self
                                .invalid("identifier collides with a reserved keyword")
                                .into_offending(arg));
                        }
                    }
                    ArgKind::PrefixedIdentifier => {
                        if !names::is_prefixed_identifier(arg) {
                            return Err(self.invalid(format!(
                                "argument of '{}' is not a valid prefixed identifier",
                                kw
                            ))
                            .into_offending(arg));
                        }
                    }
                    ArgKind::String => {
                        names::validate_yang_string(arg)?;
                    }
                    ArgKind::None => unreachable!(),
                }
                Ok(arg.to_string())
            }
        }
    }

    fn parse_module(&mut self, stmt: &Statement) -> Result<Module> {
        let root_kw = stmt.fixed_keyword().unwrap();
        let name = self.argument(stmt, root_kw)?;
        self.path.push(name.clone());

        self.check_substatements(stmt, root_kw)?;
        self.check_body_order(stmt)?;

        let mut module = Module {
            name,
            version: self.version,
            ..Module::default()
        };

        for child in &stmt.children {
            let kw = match child.fixed_keyword() {
                Some(kw) => kw,
                None => {
                    module.body.extension_instances.push(child.clone());
                    continue;
                }
            };
            match kw {
                Keyword::YangVersion => {} // consumed by scan_version
                Keyword::Namespace => {
                    module.namespace = Some(self.argument(child, kw)?);
                }
                Keyword::Prefix => {
                    let prefix = self.argument(child, kw)?;
                    self.require_identifier(kw, &prefix)?;
                    module.prefix = Some(prefix);
                }
                Keyword::BelongsTo => {
                    module.belongs_to = Some(self.parse_belongs_to(child)?);
                }
                Keyword::Import => {
                    let import = self.parse_import(child)?;
                    module.imports.push(import);
                }
                Keyword::Include => {
                    let include = self.parse_include(child)?;
                    module.includes.push(include);
                }
                Keyword::Revision => {
                    module.revisions.push(self.parse_revision(child)?);
                }
                Keyword::Organization => module.organization = Some(self.argument(child, kw)?),
                Keyword::Contact => module.contact = Some(self.argument(child, kw)?),
                Keyword::Description => module.description = Some(self.argument(child, kw)?),
                Keyword::Reference => module.reference = Some(self.argument(child, kw)?),
                Keyword::Extension => module.body.extensions.push(self.parse_extension(child)?),
                Keyword::Feature => module.body.features.push(self.parse_feature(child)?),
                Keyword::Identity => module.body.identities.push(self.parse_identity(child)?),
                Keyword::Typedef => module.body.typedefs.push(self.parse_typedef(child)?),
                Keyword::Grouping => module.body.groupings.push(self.parse_grouping(child)?),
                Keyword::Augment => module.body.augments.push(self.parse_augment(child)?),
                Keyword::Rpc => module.body.rpcs.push(self.parse_operation(child)?),
                Keyword::Notification => {
                    module.body.notifications.push(self.parse_notification(child)?)
                }
                Keyword::Deviation => module.body.deviations.push(self.parse_deviation(child)?),
                _ => module.body.data.push(self.parse_data_node(child)?),
            }
        }

        self.check_prefixes(&module)?;
        self.path.pop();
        Ok(module)
    }

    /// Direct children of module/submodule must keep their groups in
    /// header -> linkage -> meta -> revision -> body order.
    fn check_body_order(&self, stmt: &Statement) -> Result<()> {
        let mut current = BodyGroup::Header;
        for child in &stmt.children {
            let kw = match child.fixed_keyword() {
                Some(kw) => kw,
                None => continue,
            };
            let group = kw.body_group();
            if group < current {
                return Err(self.invalid(format!(
                    "ordering violation: '{}' must precede the {} statements",
                    kw,
                    match current {
                        BodyGroup::Header => "header",
                        BodyGroup::Linkage => "linkage",
                        BodyGroup::Meta => "meta",
                        BodyGroup::Revision => "revision",
                        BodyGroup::Body => "body",
                    }
                )));
            }
            current = group;
        }
        Ok(())
    }

    /// Import prefixes must not collide with each other or the module's own
    fn check_prefixes(&self, module: &Module) -> Result<()> {
        let mut prefixes: Vec<&str> = Vec::new();
        if let Some(prefix) = module.prefix.as_deref() {
            prefixes.push(prefix);
        }
        if let Some(bt) = &module.belongs_to {
            prefixes.push(&bt.prefix);
        }
        for import in &module.imports {
            if prefixes.contains(&import.prefix.as_str()) {
                return Err(self
                    .invalid("duplicate prefix")
                    .into_offending(&import.prefix));
            }
            prefixes.push(&import.prefix);
        }
        Ok(())
    }

    fn require_identifier(&self, kw: Keyword, value: &str) -> Result<()> {
        if names::is_identifier(value) {
            Ok(())
        } else {
            Err(self
                .invalid(format!("argument of '{}' is not a valid identifier", kw))
                .into_offending(value))
        }
    }

    fn parse_belongs_to(&mut self, stmt: &Statement) -> Result<BelongsTo> {
        self.check_substatements(stmt, Keyword::BelongsTo)?;
        let module = self.argument(stmt, Keyword::BelongsTo)?;
        let prefix = stmt
            .child_arg(Keyword::Prefix)
            .unwrap_or_default()
            .to_string();
        self.require_identifier(Keyword::Prefix, &prefix)?;
        Ok(BelongsTo { module, prefix })
    }

    fn parse_import(&mut self, stmt: &Statement) -> Result<Import> {
        self.check_substatements(stmt, Keyword::Import)?;
        let module = self.argument(stmt, Keyword::Import)?;
        let prefix = stmt
            .child_arg(Keyword::Prefix)
            .unwrap_or_default()
            .to_string();
        self.require_identifier(Keyword::Prefix, &prefix)?;
        let revision_date = self.parse_revision_date(stmt)?;
        Ok(Import {
            module,
            prefix,
            revision_date,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_include(&mut self, stmt: &Statement) -> Result<Include> {
        self.check_substatements(stmt, Keyword::Include)?;
        let submodule = self.argument(stmt, Keyword::Include)?;
        let revision_date = self.parse_revision_date(stmt)?;
        Ok(Include {
            submodule,
            revision_date,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_revision_date(&self, stmt: &Statement) -> Result<Option<String>> {
        match stmt.child_arg(Keyword::RevisionDate) {
            None => Ok(None),
            Some(date) => {
                if !names::is_revision_date(date) {
                    return Err(self
                        .invalid("revision date is not of the form YYYY-MM-DD")
                        .into_offending(date));
                }
                Ok(Some(date.to_string()))
            }
        }
    }

    fn parse_revision(&mut self, stmt: &Statement) -> Result<Revision> {
        self.check_substatements(stmt, Keyword::Revision)?;
        let date = self.argument(stmt, Keyword::Revision)?;
        if !names::is_revision_date(&date) {
            return Err(self
                .invalid("revision date is not of the form YYYY-MM-DD")
                .into_offending(&date));
        }
        Ok(Revision {
            date,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_extension(&mut self, stmt: &Statement) -> Result<ExtensionDef> {
        self.check_substatements(stmt, Keyword::Extension)?;
        let name = self.argument(stmt, Keyword::Extension)?;

        let argument = match stmt.child(Keyword::Argument) {
            None => None,
            Some(arg_stmt) => {
                self.check_substatements(arg_stmt, Keyword::Argument)?;
                let arg_name = self.argument(arg_stmt, Keyword::Argument)?;
                let yin_element = match arg_stmt.child_arg(Keyword::YinElement) {
                    None => false,
                    Some(v) => self.parse_bool(Keyword::YinElement, v)?,
                };
                Some((arg_name, yin_element))
            }
        };

        Ok(ExtensionDef {
            name,
            argument,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_feature(&mut self, stmt: &Statement) -> Result<FeatureDef> {
        self.check_substatements(stmt, Keyword::Feature)?;
        Ok(FeatureDef {
            name: self.argument(stmt, Keyword::Feature)?,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_identity(&mut self, stmt: &Statement) -> Result<IdentityDef> {
        self.check_substatements(stmt, Keyword::Identity)?;
        let bases: Vec<String> = stmt
            .children_of(Keyword::Base)
            .map(|b| self.argument(b, Keyword::Base))
            .collect::<Result<_>>()?;
        if bases.len() > 1 && self.version == YangVersion::V1_0 {
            return Err(self.invalid("multiple 'base' statements require YANG 1.1"));
        }
        Ok(IdentityDef {
            name: self.argument(stmt, Keyword::Identity)?,
            bases,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_typedef(&mut self, stmt: &Statement) -> Result<Typedef> {
        let name = self.argument(stmt, Keyword::Typedef)?;
        self.path.push(name.clone());
        self.check_substatements(stmt, Keyword::Typedef)?;
        let type_ = self.parse_type(stmt.child(Keyword::Type).unwrap())?;
        let typedef = Typedef {
            name,
            type_,
            units: stmt.child_arg(Keyword::Units).map(String::from),
            default: stmt.child_arg(Keyword::Default).map(String::from),
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        };
        self.path.pop();
        Ok(typedef)
    }

    fn parse_grouping(&mut self, stmt: &Statement) -> Result<Grouping> {
        let name = self.argument(stmt, Keyword::Grouping)?;
        self.path.push(name.clone());
        self.check_substatements(stmt, Keyword::Grouping)?;

        let mut grouping = Grouping {
            name,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
            ..Grouping::default()
        };
        self.parse_scoped_children(
            stmt,
            &mut grouping.typedefs,
            &mut grouping.groupings,
            &mut grouping.children,
            Some(&mut grouping.actions),
            Some(&mut grouping.notifications),
        )?;
        self.path.pop();
        Ok(grouping)
    }

    /// Collect the typedef/grouping/data/action/notification children shared
    /// by grouping-like scopes.
    fn parse_scoped_children(
        &mut self,
        stmt: &Statement,
        typedefs: &mut Vec<Typedef>,
        groupings: &mut Vec<Grouping>,
        data: &mut Vec<DataNode>,
        mut actions: Option<&mut Vec<Operation>>,
        mut notifications: Option<&mut Vec<Notification>>,
    ) -> Result<()> {
        for child in &stmt.children {
            match child.fixed_keyword() {
                Some(Keyword::Typedef) => typedefs.push(self.parse_typedef(child)?),
                Some(Keyword::Grouping) => groupings.push(self.parse_grouping(child)?),
                Some(Keyword::Action) => {
                    if let Some(actions) = actions.as_deref_mut() {
                        actions.push(self.parse_operation(child)?);
                    }
                }
                Some(Keyword::Notification) => {
                    if let Some(notifications) = notifications.as_deref_mut() {
                        notifications.push(self.parse_notification(child)?);
                    }
                }
                Some(kw) if is_data_keyword(kw) => data.push(self.parse_data_node(child)?),
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_data_node(&mut self, stmt: &Statement) -> Result<DataNode> {
        match stmt.fixed_keyword() {
            Some(Keyword::Container) => Ok(DataNode::Container(self.parse_container(stmt)?)),
            Some(Keyword::List) => Ok(DataNode::List(self.parse_list(stmt)?)),
            Some(Keyword::Leaf) => Ok(DataNode::Leaf(self.parse_leaf(stmt)?)),
            Some(Keyword::LeafList) => Ok(DataNode::LeafList(self.parse_leaf_list(stmt)?)),
            Some(Keyword::Choice) => Ok(DataNode::Choice(self.parse_choice(stmt)?)),
            Some(Keyword::Case) => Ok(DataNode::Case(self.parse_case(stmt)?)),
            Some(Keyword::Anydata) => Ok(DataNode::Anydata(self.parse_any(stmt)?)),
            Some(Keyword::Anyxml) => Ok(DataNode::Anyxml(self.parse_any(stmt)?)),
            Some(Keyword::Uses) => Ok(DataNode::Uses(self.parse_uses(stmt)?)),
            _ => Err(Error::Internal(format!(
                "statement '{}' is not a data definition",
                stmt.keyword
            ))),
        }
    }

    /// Shared fields of a schema node. The caller has already validated the
    /// sub-statement table.
    fn parse_common(&mut self, stmt: &Statement, kw: Keyword) -> Result<NodeCommon> {
        let name = self.argument(stmt, kw)?;
        let mut common = NodeCommon {
            name,
            ..NodeCommon::default()
        };
        common.when = self.parse_when(stmt)?;
        common.if_features = self.collect_if_features(stmt)?;
        common.status = self.parse_status(stmt)?;
        common.config = match stmt.child_arg(Keyword::Config) {
            None => None,
            Some(v) => Some(self.parse_bool(Keyword::Config, v)?),
        };
        common.description = stmt.child_arg(Keyword::Description).map(String::from);
        common.reference = stmt.child_arg(Keyword::Reference).map(String::from);
        common.extension_instances = stmt
            .children
            .iter()
            .filter(|c| c.is_custom())
            .cloned()
            .collect();
        Ok(common)
    }

    fn parse_container(&mut self, stmt: &Statement) -> Result<ContainerNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::Container)?;

        let mut container = ContainerNode {
            common: self.parse_common(stmt, Keyword::Container)?,
            presence: stmt.child_arg(Keyword::Presence).map(String::from),
            musts: self.collect_musts(stmt)?,
            ..ContainerNode::default()
        };
        self.parse_scoped_children(
            stmt,
            &mut container.typedefs,
            &mut container.groupings,
            &mut container.children,
            Some(&mut container.actions),
            Some(&mut container.notifications),
        )?;
        self.path.pop();
        Ok(container)
    }

    fn parse_list(&mut self, stmt: &Statement) -> Result<ListNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::List)?;

        let mut list = ListNode {
            common: self.parse_common(stmt, Keyword::List)?,
            key: stmt.child_arg(Keyword::Key).map(String::from),
            uniques: stmt
                .children_of(Keyword::Unique)
                .filter_map(|u| u.arg.clone())
                .collect(),
            musts: self.collect_musts(stmt)?,
            min_elements: self.parse_min_elements(stmt)?,
            max_elements: self.parse_max_elements(stmt)?,
            ordered_by: self.parse_ordered_by(stmt)?,
            ..ListNode::default()
        };
        self.parse_scoped_children(
            stmt,
            &mut list.typedefs,
            &mut list.groupings,
            &mut list.children,
            Some(&mut list.actions),
            Some(&mut list.notifications),
        )?;
        self.path.pop();
        Ok(list)
    }

    fn parse_leaf(&mut self, stmt: &Statement) -> Result<LeafNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::Leaf)?;

        let mandatory = match stmt.child_arg(Keyword::Mandatory) {
            None => None,
            Some(v) => Some(self.parse_bool(Keyword::Mandatory, v)?),
        };
        let default = stmt.child_arg(Keyword::Default).map(String::from);
        if mandatory == Some(true) && default.is_some() {
            return Err(self.invalid("a leaf with a default must not be mandatory"));
        }

        let leaf = LeafNode {
            common: self.parse_common(stmt, Keyword::Leaf)?,
            type_: self.parse_type(stmt.child(Keyword::Type).unwrap())?,
            units: stmt.child_arg(Keyword::Units).map(String::from),
            musts: self.collect_musts(stmt)?,
            default,
            mandatory,
        };
        self.path.pop();
        Ok(leaf)
    }

    fn parse_leaf_list(&mut self, stmt: &Statement) -> Result<LeafListNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::LeafList)?;

        let leaf_list = LeafListNode {
            common: self.parse_common(stmt, Keyword::LeafList)?,
            type_: self.parse_type(stmt.child(Keyword::Type).unwrap())?,
            units: stmt.child_arg(Keyword::Units).map(String::from),
            musts: self.collect_musts(stmt)?,
            defaults: stmt
                .children_of(Keyword::Default)
                .filter_map(|d| d.arg.clone())
                .collect(),
            min_elements: self.parse_min_elements(stmt)?,
            max_elements: self.parse_max_elements(stmt)?,
            ordered_by: self.parse_ordered_by(stmt)?,
        };
        self.path.pop();
        Ok(leaf_list)
    }

    fn parse_choice(&mut self, stmt: &Statement) -> Result<ChoiceNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::Choice)?;

        let mandatory = match stmt.child_arg(Keyword::Mandatory) {
            None => None,
            Some(v) => Some(self.parse_bool(Keyword::Mandatory, v)?),
        };
        let default = stmt.child_arg(Keyword::Default).map(String::from);
        if mandatory == Some(true) && default.is_some() {
            return Err(self.invalid("a choice with a default must not be mandatory"));
        }

        let mut choice = ChoiceNode {
            common: self.parse_common(stmt, Keyword::Choice)?,
            default,
            mandatory,
            ..ChoiceNode::default()
        };
        for child in &stmt.children {
            if let Some(kw) = child.fixed_keyword() {
                if is_data_keyword(kw) || kw == Keyword::Case {
                    choice.children.push(self.parse_data_node(child)?);
                }
            }
        }
        self.path.pop();
        Ok(choice)
    }

    fn parse_case(&mut self, stmt: &Statement) -> Result<CaseNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::Case)?;

        let mut case = CaseNode {
            common: self.parse_common(stmt, Keyword::Case)?,
            ..CaseNode::default()
        };
        for child in &stmt.children {
            if let Some(kw) = child.fixed_keyword() {
                if is_data_keyword(kw) {
                    case.children.push(self.parse_data_node(child)?);
                }
            }
        }
        self.path.pop();
        Ok(case)
    }

    fn parse_any(&mut self, stmt: &Statement) -> Result<AnyNode> {
        let kw = stmt.fixed_keyword().unwrap();
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, kw)?;

        let any = AnyNode {
            common: self.parse_common(stmt, kw)?,
            musts: self.collect_musts(stmt)?,
            mandatory: match stmt.child_arg(Keyword::Mandatory) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::Mandatory, v)?),
            },
        };
        self.path.pop();
        Ok(any)
    }

    fn parse_uses(&mut self, stmt: &Statement) -> Result<UsesNode> {
        let name = stmt.arg.clone().unwrap_or_default();
        self.path.push(name);
        self.check_substatements(stmt, Keyword::Uses)?;

        let mut uses = UsesNode {
            common: self.parse_common(stmt, Keyword::Uses)?,
            ..UsesNode::default()
        };
        for refine in stmt.children_of(Keyword::Refine) {
            uses.refines.push(self.parse_refine(refine)?);
        }
        for augment in stmt.children_of(Keyword::Augment) {
            uses.augments.push(self.parse_augment(augment)?);
        }
        self.path.pop();
        Ok(uses)
    }

    fn parse_refine(&mut self, stmt: &Statement) -> Result<Refine> {
        self.check_substatements(stmt, Keyword::Refine)?;
        if stmt.children_of(Keyword::Default).count() > 1 && self.version == YangVersion::V1_0 {
            return Err(self.invalid("multiple 'default' statements require YANG 1.1"));
        }
        Ok(Refine {
            target: self.argument(stmt, Keyword::Refine)?,
            if_features: self.collect_if_features(stmt)?,
            musts: self.collect_musts(stmt)?,
            presence: stmt.child_arg(Keyword::Presence).map(String::from),
            defaults: stmt
                .children_of(Keyword::Default)
                .filter_map(|d| d.arg.clone())
                .collect(),
            config: match stmt.child_arg(Keyword::Config) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::Config, v)?),
            },
            mandatory: match stmt.child_arg(Keyword::Mandatory) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::Mandatory, v)?),
            },
            min_elements: self.parse_min_elements(stmt)?,
            max_elements: self.parse_max_elements(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_augment(&mut self, stmt: &Statement) -> Result<Augment> {
        let target = self.argument(stmt, Keyword::Augment)?;
        self.path.push(target.clone());
        self.check_substatements(stmt, Keyword::Augment)?;

        let mut augment = Augment {
            target,
            when: self.parse_when(stmt)?,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
            ..Augment::default()
        };
        for child in &stmt.children {
            match child.fixed_keyword() {
                Some(Keyword::Action) => augment.actions.push(self.parse_operation(child)?),
                Some(Keyword::Notification) => {
                    augment.notifications.push(self.parse_notification(child)?)
                }
                Some(kw) if is_data_keyword(kw) || kw == Keyword::Case => {
                    augment.children.push(self.parse_data_node(child)?)
                }
                _ => {}
            }
        }
        self.path.pop();
        Ok(augment)
    }

    fn parse_operation(&mut self, stmt: &Statement) -> Result<Operation> {
        let kw = stmt.fixed_keyword().unwrap();
        let name = self.argument(stmt, kw)?;
        self.path.push(name.clone());
        self.check_substatements(stmt, kw)?;

        let mut operation = Operation {
            name,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
            extension_instances: stmt
                .children
                .iter()
                .filter(|c| c.is_custom())
                .cloned()
                .collect(),
            ..Operation::default()
        };
        for child in &stmt.children {
            match child.fixed_keyword() {
                Some(Keyword::Typedef) => operation.typedefs.push(self.parse_typedef(child)?),
                Some(Keyword::Grouping) => operation.groupings.push(self.parse_grouping(child)?),
                Some(Keyword::Input) => operation.input = Some(self.parse_inout(child)?),
                Some(Keyword::Output) => operation.output = Some(self.parse_inout(child)?),
                _ => {}
            }
        }
        self.path.pop();
        Ok(operation)
    }

    fn parse_inout(&mut self, stmt: &Statement) -> Result<OperationIo> {
        let kw = stmt.fixed_keyword().unwrap();
        self.path.push(kw.name().to_string());
        self.argument(stmt, kw)?;
        self.check_substatements(stmt, kw)?;

        let mut inout = OperationIo {
            musts: self.collect_musts(stmt)?,
            ..OperationIo::default()
        };
        self.parse_scoped_children(
            stmt,
            &mut inout.typedefs,
            &mut inout.groupings,
            &mut inout.children,
            None,
            None,
        )?;
        self.path.pop();
        Ok(inout)
    }

    fn parse_notification(&mut self, stmt: &Statement) -> Result<Notification> {
        let name = self.argument(stmt, Keyword::Notification)?;
        self.path.push(name.clone());
        self.check_substatements(stmt, Keyword::Notification)?;

        let mut notification = Notification {
            name,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            musts: self.collect_musts(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
            extension_instances: stmt
                .children
                .iter()
                .filter(|c| c.is_custom())
                .cloned()
                .collect(),
            ..Notification::default()
        };
        self.parse_scoped_children(
            stmt,
            &mut notification.typedefs,
            &mut notification.groupings,
            &mut notification.children,
            None,
            None,
        )?;
        self.path.pop();
        Ok(notification)
    }

    fn parse_deviation(&mut self, stmt: &Statement) -> Result<Deviation> {
        let target = self.argument(stmt, Keyword::Deviation)?;
        self.path.push(target.clone());
        self.check_substatements(stmt, Keyword::Deviation)?;

        let mut deviation = Deviation {
            target,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
            ..Deviation::default()
        };
        for child in stmt.children_of(Keyword::Deviate) {
            deviation.deviates.push(self.parse_deviate(child)?);
        }
        self.path.pop();
        Ok(deviation)
    }

    fn parse_deviate(&mut self, stmt: &Statement) -> Result<Deviate> {
        let kind = self.argument(stmt, Keyword::Deviate)?;
        self.check_substatements(stmt, Keyword::Deviate)?;

        let props = DeviateProps {
            type_: match stmt.child(Keyword::Type) {
                None => None,
                Some(t) => Some(self.parse_type(t)?),
            },
            units: stmt.child_arg(Keyword::Units).map(String::from),
            musts: self.collect_musts(stmt)?,
            uniques: stmt
                .children_of(Keyword::Unique)
                .filter_map(|u| u.arg.clone())
                .collect(),
            defaults: stmt
                .children_of(Keyword::Default)
                .filter_map(|d| d.arg.clone())
                .collect(),
            config: match stmt.child_arg(Keyword::Config) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::Config, v)?),
            },
            mandatory: match stmt.child_arg(Keyword::Mandatory) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::Mandatory, v)?),
            },
            min_elements: self.parse_min_elements(stmt)?,
            max_elements: self.parse_max_elements(stmt)?,
        };

        let reject = |property: &str| -> Error {
            Error::Validation(
                ValidationError::new(format!(
                    "property '{}' cannot appear in 'deviate {}'",
                    property, kind
                ))
                .with_path(self.path()),
            )
        };

        match kind.as_str() {
            "not-supported" => {
                if stmt.children.iter().any(|c| !c.is_custom()) {
                    return Err(self.invalid("'deviate not-supported' takes no properties"));
                }
                Ok(Deviate::NotSupported)
            }
            "add" => {
                if props.type_.is_some() {
                    return Err(reject("type"));
                }
                Ok(Deviate::Add(props))
            }
            "replace" => {
                if !props.musts.is_empty() {
                    return Err(reject("must"));
                }
                if !props.uniques.is_empty() {
                    return Err(reject("unique"));
                }
                Ok(Deviate::Replace(props))
            }
            "delete" => {
                if props.type_.is_some() {
                    return Err(reject("type"));
                }
                if props.config.is_some() {
                    return Err(reject("config"));
                }
                if props.mandatory.is_some() {
                    return Err(reject("mandatory"));
                }
                if props.min_elements.is_some() {
                    return Err(reject("min-elements"));
                }
                if props.max_elements.is_some() {
                    return Err(reject("max-elements"));
                }
                Ok(Deviate::Delete(props))
            }
            other => Err(self
                .invalid("deviate kind must be not-supported, add, replace, or delete")
                .into_offending(other)),
        }
    }

    fn parse_type(&mut self, stmt: &Statement) -> Result<TypeDesc> {
        self.check_substatements(stmt, Keyword::Type)?;
        let name = self.argument(stmt, Keyword::Type)?;

        let mut desc = TypeDesc {
            name,
            fraction_digits: match stmt.child_arg(Keyword::FractionDigits) {
                None => None,
                Some(v) => Some(self.parse_fraction_digits(v)?),
            },
            range: self.parse_restr(stmt.child(Keyword::Range))?,
            length: self.parse_restr(stmt.child(Keyword::Length))?,
            path: stmt.child_arg(Keyword::Path).map(String::from),
            require_instance: match stmt.child_arg(Keyword::RequireInstance) {
                None => None,
                Some(v) => Some(self.parse_bool(Keyword::RequireInstance, v)?),
            },
            extension_instances: stmt
                .children
                .iter()
                .filter(|c| c.is_custom())
                .cloned()
                .collect(),
            ..TypeDesc::default()
        };

        for base in stmt.children_of(Keyword::Base) {
            desc.bases.push(self.argument(base, Keyword::Base)?);
        }
        if desc.bases.len() > 1 && self.version == YangVersion::V1_0 {
            return Err(self.invalid("multiple 'base' statements require YANG 1.1"));
        }

        for pattern in stmt.children_of(Keyword::Pattern) {
            desc.patterns.push(self.parse_pattern(pattern)?);
        }
        for enum_stmt in stmt.children_of(Keyword::Enum) {
            desc.enums.push(self.parse_enum(enum_stmt)?);
        }
        for bit_stmt in stmt.children_of(Keyword::Bit) {
            desc.bits.push(self.parse_bit(bit_stmt)?);
        }
        for member in stmt.children_of(Keyword::Type) {
            desc.union_types.push(self.parse_type(member)?);
        }

        Ok(desc)
    }

    fn parse_restr(&mut self, stmt: Option<&Statement>) -> Result<Option<Restr>> {
        let stmt = match stmt {
            Some(stmt) => stmt,
            None => return Ok(None),
        };
        let kw = stmt.fixed_keyword().unwrap();
        self.check_substatements(stmt, kw)?;
        Ok(Some(Restr {
            expr: self.argument(stmt, kw)?,
            error_message: stmt.child_arg(Keyword::ErrorMessage).map(String::from),
            error_app_tag: stmt.child_arg(Keyword::ErrorAppTag).map(String::from),
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        }))
    }

    fn parse_pattern(&mut self, stmt: &Statement) -> Result<PatternRestr> {
        self.check_substatements(stmt, Keyword::Pattern)?;
        let invert_match = match stmt.child_arg(Keyword::Modifier) {
            None => false,
            Some("invert-match") => true,
            Some(other) => {
                return Err(self
                    .invalid("pattern modifier must be 'invert-match'")
                    .into_offending(other))
            }
        };
        Ok(PatternRestr {
            expr: self.argument(stmt, Keyword::Pattern)?,
            invert_match,
            error_message: stmt.child_arg(Keyword::ErrorMessage).map(String::from),
            error_app_tag: stmt.child_arg(Keyword::ErrorAppTag).map(String::from),
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_enum(&mut self, stmt: &Statement) -> Result<EnumMember> {
        self.check_substatements(stmt, Keyword::Enum)?;
        let name = self.argument(stmt, Keyword::Enum)?;
        if name.is_empty() || name.trim() != name {
            return Err(self
                .invalid("enum name must be non-empty without surrounding whitespace")
                .into_offending(&name));
        }
        let value = match stmt.child_arg(Keyword::Value) {
            None => None,
            Some(v) => {
                let parsed: i64 = v.parse().map_err(|_| {
                    self.invalid("enum value is not an integer").into_offending(v)
                })?;
                if i32::try_from(parsed).is_err() {
                    return Err(self
                        .invalid("enum value is outside the 32-bit signed range")
                        .into_offending(v));
                }
                Some(parsed as i32)
            }
        };
        Ok(EnumMember {
            name,
            value,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_bit(&mut self, stmt: &Statement) -> Result<BitMember> {
        self.check_substatements(stmt, Keyword::Bit)?;
        let name = self.argument(stmt, Keyword::Bit)?;
        let position = match stmt.child_arg(Keyword::Position) {
            None => None,
            Some(v) => {
                let parsed: u64 = v.parse().map_err(|_| {
                    self.invalid("bit position is not a non-negative integer")
                        .into_offending(v)
                })?;
                if u32::try_from(parsed).is_err() {
                    return Err(self
                        .invalid("bit position is outside the 32-bit unsigned range")
                        .into_offending(v));
                }
                Some(parsed as u32)
            }
        };
        Ok(BitMember {
            name,
            position,
            if_features: self.collect_if_features(stmt)?,
            status: self.parse_status(stmt)?,
            description: stmt.child_arg(Keyword::Description).map(String::from),
            reference: stmt.child_arg(Keyword::Reference).map(String::from),
        })
    }

    fn parse_when(&mut self, stmt: &Statement) -> Result<Option<When>> {
        let when = match stmt.child(Keyword::When) {
            Some(when) => when,
            None => return Ok(None),
        };
        self.check_substatements(when, Keyword::When)?;
        Ok(Some(When {
            condition: self.argument(when, Keyword::When)?,
            description: when.child_arg(Keyword::Description).map(String::from),
            reference: when.child_arg(Keyword::Reference).map(String::from),
        }))
    }

    fn collect_musts(&mut self, stmt: &Statement) -> Result<Vec<Must>> {
        stmt.children_of(Keyword::Must)
            .map(|must| {
                self.check_substatements(must, Keyword::Must)?;
                Ok(Must {
                    condition: self.argument(must, Keyword::Must)?,
                    error_message: must.child_arg(Keyword::ErrorMessage).map(String::from),
                    error_app_tag: must.child_arg(Keyword::ErrorAppTag).map(String::from),
                    description: must.child_arg(Keyword::Description).map(String::from),
                    reference: must.child_arg(Keyword::Reference).map(String::from),
                })
            })
            .collect()
    }

    fn collect_if_features(&mut self, stmt: &Statement) -> Result<Vec<String>> {
        stmt.children_of(Keyword::IfFeature)
            .map(|f| self.argument(f, Keyword::IfFeature))
            .collect()
    }

    fn parse_status(&self, stmt: &Statement) -> Result<Option<Status>> {
        match stmt.child_arg(Keyword::Status) {
            None => Ok(None),
            Some("current") => Ok(Some(Status::Current)),
            Some("deprecated") => Ok(Some(Status::Deprecated)),
            Some("obsolete") => Ok(Some(Status::Obsolete)),
            Some(other) => Err(self
                .invalid("status must be current, deprecated, or obsolete")
                .into_offending(other)),
        }
    }

    fn parse_ordered_by(&self, stmt: &Statement) -> Result<Option<OrderedBy>> {
        match stmt.child_arg(Keyword::OrderedBy) {
            None => Ok(None),
            Some("system") => Ok(Some(OrderedBy::System)),
            Some("user") => Ok(Some(OrderedBy::User)),
            Some(other) => Err(self
                .invalid("ordered-by must be system or user")
                .into_offending(other)),
        }
    }

    fn parse_bool(&self, kw: Keyword, value: &str) -> Result<bool> {
        match value {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self
                .invalid(format!("argument of '{}' must be 'true' or 'false'", kw))
                .into_offending(other)),
        }
    }

    fn parse_fraction_digits(&self, value: &str) -> Result<u8> {
        let parsed: u8 = value.parse().map_err(|_| {
            self.invalid("fraction-digits is not an integer")
                .into_offending(value)
        })?;
        if !(1..=18).contains(&parsed) {
            return Err(self
                .invalid("fraction-digits must be between 1 and 18")
                .into_offending(value));
        }
        Ok(parsed)
    }

    fn parse_min_elements(&self, stmt: &Statement) -> Result<Option<u32>> {
        match stmt.child_arg(Keyword::MinElements) {
            None => Ok(None),
            Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
                self.invalid("min-elements is not a non-negative integer")
                    .into_offending(v)
            }),
        }
    }

    fn parse_max_elements(&self, stmt: &Statement) -> Result<Option<MaxElements>> {
        match stmt.child_arg(Keyword::MaxElements) {
            None => Ok(None),
            Some("unbounded") => Ok(Some(MaxElements::Unbounded)),
            Some(v) => {
                let parsed: u32 = v.parse().map_err(|_| {
                    self.invalid("max-elements must be 'unbounded' or a positive integer")
                        .into_offending(v)
                })?;
                if parsed == 0 {
                    return Err(self
                        .invalid("max-elements must be 'unbounded' or a positive integer")
                        .into_offending(v));
                }
                Ok(Some(MaxElements::Count(parsed)))
            }
        }
    }
}

fn is_data_keyword(kw: Keyword) -> bool {
    matches!(
        kw,
        Keyword::Container
            | Keyword::Leaf
            | Keyword::LeafList
            | Keyword::List
            | Keyword::Choice
            | Keyword::Anydata
            | Keyword::Anyxml
            | Keyword::Uses
    )
}

trait IntoOffending {
    fn into_offending(self, offending: &str) -> Error;
}

impl IntoOffending for Error {
    fn into_offending(self, offending: &str) -> Error {
        match self {
            Error::Validation(e) => Error::Validation(e.with_offending(offending)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::yang::parse_text;

    fn build(text: &str) -> Result<Module> {
        build_module(&parse_text(text)?)
    }

    const HEADER: &str = "yang-version 1.1; namespace \"urn:tests:m\"; prefix m;";

    fn module_with(body: &str) -> String {
        format!("module m {{ {} {} }}", HEADER, body)
    }

    #[test]
    fn test_minimal_module() {
        let module = build(&module_with("")).unwrap();
        assert_eq!(module.name, "m");
        assert_eq!(module.version, YangVersion::V1_1);
        assert_eq!(module.namespace.as_deref(), Some("urn:tests:m"));
        assert_eq!(module.prefix.as_deref(), Some("m"));
        assert!(!module.is_submodule());
    }

    #[test]
    fn test_missing_namespace() {
        let err = build("module m { prefix m; }").unwrap_err();
        assert!(format!("{}", err).contains("missing mandatory sub-statement 'namespace'"));
    }

    #[test]
    fn test_submodule() {
        let module =
            build("submodule s { belongs-to m { prefix m; } }").unwrap();
        assert!(module.is_submodule());
        assert_eq!(module.belongs_to.as_ref().unwrap().module, "m");
    }

    #[test]
    fn test_leaf_with_type() {
        let module = build(&module_with(
            "leaf port { type int8 { range \"0 .. 50 | 127\"; } default \"20\"; }",
        ))
        .unwrap();
        match &module.body.data[0] {
            DataNode::Leaf(leaf) => {
                assert_eq!(leaf.common.name, "port");
                assert_eq!(leaf.type_.name, "int8");
                assert_eq!(
                    leaf.type_.range.as_ref().unwrap().expr,
                    "0 .. 50 | 127"
                );
                assert_eq!(leaf.default.as_deref(), Some("20"));
            }
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_unique_substmt() {
        let err = build(&module_with(
            "leaf x { type string; default \"a\"; default \"b\"; }",
        ))
        .unwrap_err();
        assert!(format!("{}", err).contains("given more than once"));
    }

    #[test]
    fn test_missing_mandatory_type() {
        let err = build(&module_with("leaf x { }")).unwrap_err();
        assert!(format!("{}", err).contains("missing mandatory sub-statement 'type'"));
    }

    #[test]
    fn test_unexpected_substatement() {
        let err = build(&module_with("leaf x { type string; key \"k\"; }")).unwrap_err();
        assert!(format!("{}", err).contains("unexpected sub-statement 'key'"));
    }

    #[test]
    fn test_version_gate() {
        let err = build(
            "module m { namespace \"urn:m\"; prefix m; \
             anydata blob;  }",
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("requires YANG 1.1"));
    }

    #[test]
    fn test_body_ordering_violation() {
        let err = build(
            "module m { namespace \"urn:m\"; prefix m; \
             revision 2020-01-01; import other { prefix o; } }",
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("ordering violation"));
    }

    #[test]
    fn test_leaf_default_and_mandatory_conflict() {
        let err = build(&module_with(
            "leaf x { type string; default \"a\"; mandatory true; }",
        ))
        .unwrap_err();
        assert!(format!("{}", err).contains("must not be mandatory"));
    }

    #[test]
    fn test_duplicate_import_prefix() {
        let err = build(
            "module m { namespace \"urn:m\"; prefix m; \
             import a { prefix m; } }",
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("duplicate prefix"));
    }

    #[test]
    fn test_list_details() {
        let module = build(&module_with(
            "list server { key \"name\"; unique \"ip port\"; min-elements 1; \
             max-elements unbounded; ordered-by user; \
             leaf name { type string; } leaf ip { type string; } leaf port { type string; } }",
        ))
        .unwrap();
        match &module.body.data[0] {
            DataNode::List(list) => {
                assert_eq!(list.key.as_deref(), Some("name"));
                assert_eq!(list.uniques, vec!["ip port"]);
                assert_eq!(list.min_elements, Some(1));
                assert_eq!(list.max_elements, Some(MaxElements::Unbounded));
                assert_eq!(list.ordered_by, Some(OrderedBy::User));
                assert_eq!(list.children.len(), 3);
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_collision_with_keyword() {
        let err = build(&module_with("container list { }")).unwrap_err();
        assert!(format!("{}", err).contains("reserved keyword"));
    }

    #[test]
    fn test_enum_value_bounds() {
        let err = build(&module_with(
            "leaf x { type enumeration { enum a { value 2147483648; } } }",
        ))
        .unwrap_err();
        assert!(format!("{}", err).contains("32-bit signed range"));
    }

    #[test]
    fn test_union_members() {
        let module = build(&module_with(
            "leaf x { type union { type int8; type string; } }",
        ))
        .unwrap();
        match &module.body.data[0] {
            DataNode::Leaf(leaf) => {
                assert_eq!(leaf.type_.name, "union");
                assert_eq!(leaf.type_.union_types.len(), 2);
            }
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_deviate_property_rules() {
        let err = build(&module_with(
            "deviation \"/m:x\" { deviate add { type string; } }",
        ))
        .unwrap_err();
        assert!(format!("{}", err).contains("cannot appear in 'deviate add'"));
    }

    #[test]
    fn test_pattern_modifier() {
        let module = build(&module_with(
            "leaf x { type string { pattern \"[a-z]*\" { modifier invert-match; } } }",
        ))
        .unwrap();
        match &module.body.data[0] {
            DataNode::Leaf(leaf) => {
                assert!(leaf.type_.patterns[0].invert_match);
            }
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_choice_with_shorthand_case() {
        let module = build(&module_with(
            "choice transport { case tcp { leaf tcp-port { type string; } } leaf udp-port { type string; } }",
        ))
        .unwrap();
        match &module.body.data[0] {
            DataNode::Choice(choice) => {
                assert_eq!(choice.children.len(), 2);
                assert!(matches!(choice.children[0], DataNode::Case(_)));
                assert!(matches!(choice.children[1], DataNode::Leaf(_)));
            }
            other => panic!("expected choice, got {:?}", other),
        }
    }

    #[test]
    fn test_rpc_with_input_output() {
        let module = build(&module_with(
            "rpc activate { input { leaf id { type string; } } output { leaf ok { type string; } } }",
        ))
        .unwrap();
        let rpc = &module.body.rpcs[0];
        assert_eq!(rpc.name, "activate");
        assert_eq!(rpc.input.as_ref().unwrap().children.len(), 1);
        assert_eq!(rpc.output.as_ref().unwrap().children.len(), 1);
    }
}
