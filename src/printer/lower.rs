//! Lowering from the parsed tree back to statements
//!
//! Reconstructs the statement tree a parser would have produced, with
//! sub-statements in the canonical relative order (header, linkage, meta,
//! revision, body).

use crate::keywords::Keyword;
use crate::parser::stmt::Statement;
use crate::schema::parsed::*;

/// Lower a parsed module or submodule to its statement tree
pub fn module_to_statement(module: &Module) -> Statement {
    let root_kw = if module.is_submodule() {
        Keyword::Submodule
    } else {
        Keyword::Module
    };
    let mut root = Statement::new(root_kw, Some(module.name.clone()));

    root.children.push(Statement::new(
        Keyword::YangVersion,
        Some(module.version.as_str().to_string()),
    ));
    if let Some(namespace) = &module.namespace {
        root.children
            .push(Statement::new(Keyword::Namespace, Some(namespace.clone())));
    }
    if let Some(prefix) = &module.prefix {
        root.children
            .push(Statement::new(Keyword::Prefix, Some(prefix.clone())));
    }
    if let Some(belongs_to) = &module.belongs_to {
        let mut stmt = Statement::new(Keyword::BelongsTo, Some(belongs_to.module.clone()));
        stmt.children.push(Statement::new(
            Keyword::Prefix,
            Some(belongs_to.prefix.clone()),
        ));
        root.children.push(stmt);
    }

    for import in &module.imports {
        let mut stmt = Statement::new(Keyword::Import, Some(import.module.clone()));
        stmt.children
            .push(Statement::new(Keyword::Prefix, Some(import.prefix.clone())));
        push_opt(&mut stmt, Keyword::RevisionDate, &import.revision_date);
        push_opt(&mut stmt, Keyword::Description, &import.description);
        push_opt(&mut stmt, Keyword::Reference, &import.reference);
        root.children.push(stmt);
    }
    for include in &module.includes {
        let mut stmt = Statement::new(Keyword::Include, Some(include.submodule.clone()));
        push_opt(&mut stmt, Keyword::RevisionDate, &include.revision_date);
        push_opt(&mut stmt, Keyword::Description, &include.description);
        push_opt(&mut stmt, Keyword::Reference, &include.reference);
        root.children.push(stmt);
    }

    push_opt(&mut root, Keyword::Organization, &module.organization);
    push_opt(&mut root, Keyword::Contact, &module.contact);
    push_opt(&mut root, Keyword::Description, &module.description);
    push_opt(&mut root, Keyword::Reference, &module.reference);

    for revision in &module.revisions {
        let mut stmt = Statement::new(Keyword::Revision, Some(revision.date.clone()));
        push_opt(&mut stmt, Keyword::Description, &revision.description);
        push_opt(&mut stmt, Keyword::Reference, &revision.reference);
        root.children.push(stmt);
    }

    for extension in &module.body.extensions {
        root.children.push(extension_to_statement(extension));
    }
    for feature in &module.body.features {
        root.children.push(feature_to_statement(feature));
    }
    for identity in &module.body.identities {
        root.children.push(identity_to_statement(identity));
    }
    for typedef in &module.body.typedefs {
        root.children.push(typedef_to_statement(typedef));
    }
    for grouping in &module.body.groupings {
        root.children.push(grouping_to_statement(grouping));
    }
    for node in &module.body.data {
        root.children.push(data_node_to_statement(node));
    }
    for augment in &module.body.augments {
        root.children.push(augment_to_statement(augment));
    }
    for rpc in &module.body.rpcs {
        root.children.push(operation_to_statement(rpc, Keyword::Rpc));
    }
    for notification in &module.body.notifications {
        root.children.push(notification_to_statement(notification));
    }
    for deviation in &module.body.deviations {
        root.children.push(deviation_to_statement(deviation));
    }
    root.children
        .extend(module.body.extension_instances.iter().cloned());

    root
}

fn push_opt(stmt: &mut Statement, kw: Keyword, value: &Option<String>) {
    if let Some(value) = value {
        stmt.children.push(Statement::new(kw, Some(value.clone())));
    }
}

fn push_bool(stmt: &mut Statement, kw: Keyword, value: Option<bool>) {
    if let Some(value) = value {
        stmt.children
            .push(Statement::new(kw, Some(value.to_string())));
    }
}

fn push_status(stmt: &mut Statement, status: Option<Status>) {
    if let Some(status) = status {
        stmt.children.push(Statement::new(
            Keyword::Status,
            Some(status.as_str().to_string()),
        ));
    }
}

fn push_if_features(stmt: &mut Statement, if_features: &[String]) {
    for expr in if_features {
        stmt.children
            .push(Statement::new(Keyword::IfFeature, Some(expr.clone())));
    }
}

fn push_when(stmt: &mut Statement, when: &Option<When>) {
    if let Some(when) = when {
        let mut w = Statement::new(Keyword::When, Some(when.condition.clone()));
        push_opt(&mut w, Keyword::Description, &when.description);
        push_opt(&mut w, Keyword::Reference, &when.reference);
        stmt.children.push(w);
    }
}

fn push_musts(stmt: &mut Statement, musts: &[Must]) {
    for must in musts {
        let mut m = Statement::new(Keyword::Must, Some(must.condition.clone()));
        push_opt(&mut m, Keyword::ErrorMessage, &must.error_message);
        push_opt(&mut m, Keyword::ErrorAppTag, &must.error_app_tag);
        push_opt(&mut m, Keyword::Description, &must.description);
        push_opt(&mut m, Keyword::Reference, &must.reference);
        stmt.children.push(m);
    }
}

fn push_min_max(stmt: &mut Statement, min: Option<u32>, max: Option<MaxElements>) {
    if let Some(min) = min {
        stmt.children
            .push(Statement::new(Keyword::MinElements, Some(min.to_string())));
    }
    if let Some(max) = max {
        let text = match max {
            MaxElements::Unbounded => "unbounded".to_string(),
            MaxElements::Count(n) => n.to_string(),
        };
        stmt.children
            .push(Statement::new(Keyword::MaxElements, Some(text)));
    }
}

fn push_ordered_by(stmt: &mut Statement, ordered_by: Option<OrderedBy>) {
    if let Some(ordered_by) = ordered_by {
        let text = match ordered_by {
            OrderedBy::System => "system",
            OrderedBy::User => "user",
        };
        stmt.children
            .push(Statement::new(Keyword::OrderedBy, Some(text.to_string())));
    }
}

/// Common trailer shared by every node: when/if-feature first, meta last
fn finish_common(stmt: &mut Statement, common: &NodeCommon) {
    push_status(stmt, common.status);
    push_opt(stmt, Keyword::Description, &common.description);
    push_opt(stmt, Keyword::Reference, &common.reference);
    stmt.children.extend(common.extension_instances.iter().cloned());
}

fn start_common(stmt: &mut Statement, common: &NodeCommon) {
    push_when(stmt, &common.when);
    push_if_features(stmt, &common.if_features);
    push_bool(stmt, Keyword::Config, common.config);
}

fn data_node_to_statement(node: &DataNode) -> Statement {
    match node {
        DataNode::Container(container) => {
            let mut stmt =
                Statement::new(Keyword::Container, Some(container.common.name.clone()));
            start_common(&mut stmt, &container.common);
            push_musts(&mut stmt, &container.musts);
            push_opt(&mut stmt, Keyword::Presence, &container.presence);
            push_scope(&mut stmt, &container.typedefs, &container.groupings);
            stmt.children
                .extend(container.children.iter().map(data_node_to_statement));
            stmt.children.extend(
                container
                    .actions
                    .iter()
                    .map(|a| operation_to_statement(a, Keyword::Action)),
            );
            stmt.children
                .extend(container.notifications.iter().map(notification_to_statement));
            finish_common(&mut stmt, &container.common);
            stmt
        }
        DataNode::List(list) => {
            let mut stmt = Statement::new(Keyword::List, Some(list.common.name.clone()));
            start_common(&mut stmt, &list.common);
            push_musts(&mut stmt, &list.musts);
            push_opt(&mut stmt, Keyword::Key, &list.key);
            for unique in &list.uniques {
                stmt.children
                    .push(Statement::new(Keyword::Unique, Some(unique.clone())));
            }
            push_min_max(&mut stmt, list.min_elements, list.max_elements);
            push_ordered_by(&mut stmt, list.ordered_by);
            push_scope(&mut stmt, &list.typedefs, &list.groupings);
            stmt.children
                .extend(list.children.iter().map(data_node_to_statement));
            stmt.children.extend(
                list.actions
                    .iter()
                    .map(|a| operation_to_statement(a, Keyword::Action)),
            );
            stmt.children
                .extend(list.notifications.iter().map(notification_to_statement));
            finish_common(&mut stmt, &list.common);
            stmt
        }
        DataNode::Leaf(leaf) => {
            let mut stmt = Statement::new(Keyword::Leaf, Some(leaf.common.name.clone()));
            start_common(&mut stmt, &leaf.common);
            stmt.children.push(type_to_statement(&leaf.type_));
            push_opt(&mut stmt, Keyword::Units, &leaf.units);
            push_musts(&mut stmt, &leaf.musts);
            push_opt(&mut stmt, Keyword::Default, &leaf.default);
            push_bool(&mut stmt, Keyword::Mandatory, leaf.mandatory);
            finish_common(&mut stmt, &leaf.common);
            stmt
        }
        DataNode::LeafList(leaf_list) => {
            let mut stmt =
                Statement::new(Keyword::LeafList, Some(leaf_list.common.name.clone()));
            start_common(&mut stmt, &leaf_list.common);
            stmt.children.push(type_to_statement(&leaf_list.type_));
            push_opt(&mut stmt, Keyword::Units, &leaf_list.units);
            push_musts(&mut stmt, &leaf_list.musts);
            for default in &leaf_list.defaults {
                stmt.children
                    .push(Statement::new(Keyword::Default, Some(default.clone())));
            }
            push_min_max(&mut stmt, leaf_list.min_elements, leaf_list.max_elements);
            push_ordered_by(&mut stmt, leaf_list.ordered_by);
            finish_common(&mut stmt, &leaf_list.common);
            stmt
        }
        DataNode::Choice(choice) => {
            let mut stmt = Statement::new(Keyword::Choice, Some(choice.common.name.clone()));
            start_common(&mut stmt, &choice.common);
            push_opt(&mut stmt, Keyword::Default, &choice.default);
            push_bool(&mut stmt, Keyword::Mandatory, choice.mandatory);
            stmt.children
                .extend(choice.children.iter().map(data_node_to_statement));
            finish_common(&mut stmt, &choice.common);
            stmt
        }
        DataNode::Case(case) => {
            let mut stmt = Statement::new(Keyword::Case, Some(case.common.name.clone()));
            start_common(&mut stmt, &case.common);
            stmt.children
                .extend(case.children.iter().map(data_node_to_statement));
            finish_common(&mut stmt, &case.common);
            stmt
        }
        DataNode::Anydata(any) | DataNode::Anyxml(any) => {
            let kw = if matches!(node, DataNode::Anydata(_)) {
                Keyword::Anydata
            } else {
                Keyword::Anyxml
            };
            let mut stmt = Statement::new(kw, Some(any.common.name.clone()));
            start_common(&mut stmt, &any.common);
            push_musts(&mut stmt, &any.musts);
            push_bool(&mut stmt, Keyword::Mandatory, any.mandatory);
            finish_common(&mut stmt, &any.common);
            stmt
        }
        DataNode::Uses(uses) => {
            let mut stmt = Statement::new(Keyword::Uses, Some(uses.common.name.clone()));
            start_common(&mut stmt, &uses.common);
            for refine in &uses.refines {
                stmt.children.push(refine_to_statement(refine));
            }
            for augment in &uses.augments {
                stmt.children.push(augment_to_statement(augment));
            }
            finish_common(&mut stmt, &uses.common);
            stmt
        }
    }
}

fn push_scope(stmt: &mut Statement, typedefs: &[Typedef], groupings: &[Grouping]) {
    stmt.children.extend(typedefs.iter().map(typedef_to_statement));
    stmt.children.extend(groupings.iter().map(grouping_to_statement));
}

fn type_to_statement(desc: &TypeDesc) -> Statement {
    let mut stmt = Statement::new(Keyword::Type, Some(desc.name.clone()));

    if let Some(fd) = desc.fraction_digits {
        stmt.children.push(Statement::new(
            Keyword::FractionDigits,
            Some(fd.to_string()),
        ));
    }
    if let Some(range) = &desc.range {
        stmt.children.push(restr_to_statement(Keyword::Range, range));
    }
    if let Some(length) = &desc.length {
        stmt.children
            .push(restr_to_statement(Keyword::Length, length));
    }
    for pattern in &desc.patterns {
        let mut p = Statement::new(Keyword::Pattern, Some(pattern.expr.clone()));
        if pattern.invert_match {
            p.children.push(Statement::new(
                Keyword::Modifier,
                Some("invert-match".to_string()),
            ));
        }
        push_opt(&mut p, Keyword::ErrorMessage, &pattern.error_message);
        push_opt(&mut p, Keyword::ErrorAppTag, &pattern.error_app_tag);
        push_opt(&mut p, Keyword::Description, &pattern.description);
        push_opt(&mut p, Keyword::Reference, &pattern.reference);
        stmt.children.push(p);
    }
    for member in &desc.enums {
        let mut e = Statement::new(Keyword::Enum, Some(member.name.clone()));
        if let Some(value) = member.value {
            e.children
                .push(Statement::new(Keyword::Value, Some(value.to_string())));
        }
        push_if_features(&mut e, &member.if_features);
        push_status(&mut e, member.status);
        push_opt(&mut e, Keyword::Description, &member.description);
        push_opt(&mut e, Keyword::Reference, &member.reference);
        stmt.children.push(e);
    }
    for member in &desc.bits {
        let mut b = Statement::new(Keyword::Bit, Some(member.name.clone()));
        if let Some(position) = member.position {
            b.children
                .push(Statement::new(Keyword::Position, Some(position.to_string())));
        }
        push_if_features(&mut b, &member.if_features);
        push_status(&mut b, member.status);
        push_opt(&mut b, Keyword::Description, &member.description);
        push_opt(&mut b, Keyword::Reference, &member.reference);
        stmt.children.push(b);
    }
    if let Some(path) = &desc.path {
        stmt.children
            .push(Statement::new(Keyword::Path, Some(path.clone())));
    }
    for base in &desc.bases {
        stmt.children
            .push(Statement::new(Keyword::Base, Some(base.clone())));
    }
    if let Some(ri) = desc.require_instance {
        stmt.children.push(Statement::new(
            Keyword::RequireInstance,
            Some(ri.to_string()),
        ));
    }
    stmt.children
        .extend(desc.union_types.iter().map(type_to_statement));
    stmt.children.extend(desc.extension_instances.iter().cloned());

    stmt
}

fn restr_to_statement(kw: Keyword, restr: &Restr) -> Statement {
    let mut stmt = Statement::new(kw, Some(restr.expr.clone()));
    push_opt(&mut stmt, Keyword::ErrorMessage, &restr.error_message);
    push_opt(&mut stmt, Keyword::ErrorAppTag, &restr.error_app_tag);
    push_opt(&mut stmt, Keyword::Description, &restr.description);
    push_opt(&mut stmt, Keyword::Reference, &restr.reference);
    stmt
}

fn typedef_to_statement(typedef: &Typedef) -> Statement {
    let mut stmt = Statement::new(Keyword::Typedef, Some(typedef.name.clone()));
    stmt.children.push(type_to_statement(&typedef.type_));
    push_opt(&mut stmt, Keyword::Units, &typedef.units);
    push_opt(&mut stmt, Keyword::Default, &typedef.default);
    push_status(&mut stmt, typedef.status);
    push_opt(&mut stmt, Keyword::Description, &typedef.description);
    push_opt(&mut stmt, Keyword::Reference, &typedef.reference);
    stmt
}

fn grouping_to_statement(grouping: &Grouping) -> Statement {
    let mut stmt = Statement::new(Keyword::Grouping, Some(grouping.name.clone()));
    push_scope(&mut stmt, &grouping.typedefs, &grouping.groupings);
    stmt.children
        .extend(grouping.children.iter().map(data_node_to_statement));
    stmt.children.extend(
        grouping
            .actions
            .iter()
            .map(|a| operation_to_statement(a, Keyword::Action)),
    );
    stmt.children
        .extend(grouping.notifications.iter().map(notification_to_statement));
    push_status(&mut stmt, grouping.status);
    push_opt(&mut stmt, Keyword::Description, &grouping.description);
    push_opt(&mut stmt, Keyword::Reference, &grouping.reference);
    stmt
}

fn identity_to_statement(identity: &IdentityDef) -> Statement {
    let mut stmt = Statement::new(Keyword::Identity, Some(identity.name.clone()));
    for base in &identity.bases {
        stmt.children
            .push(Statement::new(Keyword::Base, Some(base.clone())));
    }
    push_if_features(&mut stmt, &identity.if_features);
    push_status(&mut stmt, identity.status);
    push_opt(&mut stmt, Keyword::Description, &identity.description);
    push_opt(&mut stmt, Keyword::Reference, &identity.reference);
    stmt
}

fn feature_to_statement(feature: &FeatureDef) -> Statement {
    let mut stmt = Statement::new(Keyword::Feature, Some(feature.name.clone()));
    push_if_features(&mut stmt, &feature.if_features);
    push_status(&mut stmt, feature.status);
    push_opt(&mut stmt, Keyword::Description, &feature.description);
    push_opt(&mut stmt, Keyword::Reference, &feature.reference);
    stmt
}

fn extension_to_statement(extension: &ExtensionDef) -> Statement {
    let mut stmt = Statement::new(Keyword::Extension, Some(extension.name.clone()));
    if let Some((arg_name, yin_element)) = &extension.argument {
        let mut arg = Statement::new(Keyword::Argument, Some(arg_name.clone()));
        if *yin_element {
            arg.children.push(Statement::new(
                Keyword::YinElement,
                Some("true".to_string()),
            ));
        }
        stmt.children.push(arg);
    }
    push_status(&mut stmt, extension.status);
    push_opt(&mut stmt, Keyword::Description, &extension.description);
    push_opt(&mut stmt, Keyword::Reference, &extension.reference);
    stmt
}

fn refine_to_statement(refine: &Refine) -> Statement {
    let mut stmt = Statement::new(Keyword::Refine, Some(refine.target.clone()));
    push_if_features(&mut stmt, &refine.if_features);
    push_musts(&mut stmt, &refine.musts);
    push_opt(&mut stmt, Keyword::Presence, &refine.presence);
    for default in &refine.defaults {
        stmt.children
            .push(Statement::new(Keyword::Default, Some(default.clone())));
    }
    push_bool(&mut stmt, Keyword::Config, refine.config);
    push_bool(&mut stmt, Keyword::Mandatory, refine.mandatory);
    push_min_max(&mut stmt, refine.min_elements, refine.max_elements);
    push_opt(&mut stmt, Keyword::Description, &refine.description);
    push_opt(&mut stmt, Keyword::Reference, &refine.reference);
    stmt
}

fn augment_to_statement(augment: &Augment) -> Statement {
    let mut stmt = Statement::new(Keyword::Augment, Some(augment.target.clone()));
    push_when(&mut stmt, &augment.when);
    push_if_features(&mut stmt, &augment.if_features);
    push_status(&mut stmt, augment.status);
    stmt.children
        .extend(augment.children.iter().map(data_node_to_statement));
    stmt.children.extend(
        augment
            .actions
            .iter()
            .map(|a| operation_to_statement(a, Keyword::Action)),
    );
    stmt.children
        .extend(augment.notifications.iter().map(notification_to_statement));
    push_opt(&mut stmt, Keyword::Description, &augment.description);
    push_opt(&mut stmt, Keyword::Reference, &augment.reference);
    stmt
}

fn operation_to_statement(operation: &Operation, kw: Keyword) -> Statement {
    let mut stmt = Statement::new(kw, Some(operation.name.clone()));
    push_if_features(&mut stmt, &operation.if_features);
    push_status(&mut stmt, operation.status);
    push_opt(&mut stmt, Keyword::Description, &operation.description);
    push_opt(&mut stmt, Keyword::Reference, &operation.reference);
    push_scope(&mut stmt, &operation.typedefs, &operation.groupings);
    if let Some(input) = &operation.input {
        stmt.children.push(inout_to_statement(input, Keyword::Input));
    }
    if let Some(output) = &operation.output {
        stmt.children
            .push(inout_to_statement(output, Keyword::Output));
    }
    stmt.children
        .extend(operation.extension_instances.iter().cloned());
    stmt
}

fn inout_to_statement(inout: &OperationIo, kw: Keyword) -> Statement {
    let mut stmt = Statement::new(kw, None);
    push_musts(&mut stmt, &inout.musts);
    push_scope(&mut stmt, &inout.typedefs, &inout.groupings);
    stmt.children
        .extend(inout.children.iter().map(data_node_to_statement));
    stmt
}

fn notification_to_statement(notification: &Notification) -> Statement {
    let mut stmt = Statement::new(Keyword::Notification, Some(notification.name.clone()));
    push_if_features(&mut stmt, &notification.if_features);
    push_status(&mut stmt, notification.status);
    push_musts(&mut stmt, &notification.musts);
    push_opt(&mut stmt, Keyword::Description, &notification.description);
    push_opt(&mut stmt, Keyword::Reference, &notification.reference);
    push_scope(&mut stmt, &notification.typedefs, &notification.groupings);
    stmt.children
        .extend(notification.children.iter().map(data_node_to_statement));
    stmt.children
        .extend(notification.extension_instances.iter().cloned());
    stmt
}

fn deviation_to_statement(deviation: &Deviation) -> Statement {
    let mut stmt = Statement::new(Keyword::Deviation, Some(deviation.target.clone()));
    push_opt(&mut stmt, Keyword::Description, &deviation.description);
    push_opt(&mut stmt, Keyword::Reference, &deviation.reference);
    for deviate in &deviation.deviates {
        stmt.children.push(deviate_to_statement(deviate));
    }
    stmt
}

fn deviate_to_statement(deviate: &Deviate) -> Statement {
    let (kind, props) = match deviate {
        Deviate::NotSupported => {
            return Statement::new(Keyword::Deviate, Some("not-supported".to_string()))
        }
        Deviate::Add(props) => ("add", props),
        Deviate::Replace(props) => ("replace", props),
        Deviate::Delete(props) => ("delete", props),
    };
    let mut stmt = Statement::new(Keyword::Deviate, Some(kind.to_string()));
    if let Some(type_) = &props.type_ {
        stmt.children.push(type_to_statement(type_));
    }
    push_opt(&mut stmt, Keyword::Units, &props.units);
    push_musts(&mut stmt, &props.musts);
    for unique in &props.uniques {
        stmt.children
            .push(Statement::new(Keyword::Unique, Some(unique.clone())));
    }
    for default in &props.defaults {
        stmt.children
            .push(Statement::new(Keyword::Default, Some(default.clone())));
    }
    push_bool(&mut stmt, Keyword::Config, props.config);
    push_bool(&mut stmt, Keyword::Mandatory, props.mandatory);
    push_min_max(&mut stmt, props.min_elements, props.max_elements);
    stmt
}
