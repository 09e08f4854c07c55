//! Parsed schema tree
//!
//! The data model produced by the statement builder: a faithful record of
//! every statement of a module, lexically resolved but not yet checked
//! against other modules. Cross-module references are plain names here;
//! the compiler binds them.

use crate::parser::stmt::Statement;

/// YANG language version of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YangVersion {
    /// YANG 1.0 (RFC 6020)
    #[default]
    V1_0,
    /// YANG 1.1 (RFC 7950)
    V1_1,
}

impl YangVersion {
    /// The version string as written in `yang-version`
    pub fn as_str(&self) -> &'static str {
        match self {
            YangVersion::V1_0 => "1",
            YangVersion::V1_1 => "1.1",
        }
    }
}

/// Definition lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Definition is current and valid
    #[default]
    Current,
    /// Obsolete in the future, still valid
    Deprecated,
    /// No longer valid
    Obsolete,
}

impl Status {
    /// The status string as written in `status`
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Current => "current",
            Status::Deprecated => "deprecated",
            Status::Obsolete => "obsolete",
        }
    }

    /// Order used for "child must not be more alive than parent":
    /// current < deprecated < obsolete.
    pub fn rank(&self) -> u8 {
        match self {
            Status::Current => 0,
            Status::Deprecated => 1,
            Status::Obsolete => 2,
        }
    }
}

/// `ordered-by` mode of a list or leaf-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderedBy {
    /// Ordered by the system
    #[default]
    System,
    /// Ordered by the user
    User,
}

/// `max-elements` bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxElements {
    /// No upper bound
    Unbounded,
    /// At most this many entries
    Count(u32),
}

/// A parsed module or submodule
#[derive(Debug, Clone, Default)]
pub struct Module {
    /// Module (or submodule) name
    pub name: String,
    /// Language version; defaults to 1.0 when `yang-version` is absent
    pub version: YangVersion,
    /// Namespace URI; `None` for submodules
    pub namespace: Option<String>,
    /// The module's own prefix; `None` for submodules
    pub prefix: Option<String>,
    /// `belongs-to` linkage; `Some` exactly for submodules
    pub belongs_to: Option<BelongsTo>,
    /// Imports, in source order
    pub imports: Vec<Import>,
    /// Includes, in source order
    pub includes: Vec<Include>,
    /// Revision history, in source order
    pub revisions: Vec<Revision>,
    /// `organization` text
    pub organization: Option<String>,
    /// `contact` text
    pub contact: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Body definitions
    pub body: Body,
}

impl Module {
    /// Whether this record is a submodule
    pub fn is_submodule(&self) -> bool {
        self.belongs_to.is_some()
    }

    /// The most recent revision date, if any revision is recorded
    pub fn latest_revision(&self) -> Option<&str> {
        self.revisions
            .iter()
            .map(|r| r.date.as_str())
            .max()
    }
}

/// `belongs-to` of a submodule
#[derive(Debug, Clone)]
pub struct BelongsTo {
    /// Name of the main module
    pub module: String,
    /// Prefix the submodule uses for the main module
    pub prefix: String,
}

/// A module import
#[derive(Debug, Clone)]
pub struct Import {
    /// Referenced module name
    pub module: String,
    /// Local prefix bound to the import
    pub prefix: String,
    /// Required revision, if pinned
    pub revision_date: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A submodule include
#[derive(Debug, Clone)]
pub struct Include {
    /// Included submodule name
    pub submodule: String,
    /// Required revision, if pinned
    pub revision_date: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// One entry of the revision history
#[derive(Debug, Clone)]
pub struct Revision {
    /// Revision date (`YYYY-MM-DD`)
    pub date: String,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// Body definitions of a module, submodule, or nested scope
#[derive(Debug, Clone, Default)]
pub struct Body {
    /// Extension definitions
    pub extensions: Vec<ExtensionDef>,
    /// Feature definitions
    pub features: Vec<FeatureDef>,
    /// Identity definitions
    pub identities: Vec<IdentityDef>,
    /// Typedefs
    pub typedefs: Vec<Typedef>,
    /// Groupings
    pub groupings: Vec<Grouping>,
    /// Data definition statements, in source order
    pub data: Vec<DataNode>,
    /// Top-level augments
    pub augments: Vec<Augment>,
    /// RPCs
    pub rpcs: Vec<Operation>,
    /// Notifications
    pub notifications: Vec<Notification>,
    /// Deviations
    pub deviations: Vec<Deviation>,
    /// Extension instances attached to the module statement itself
    pub extension_instances: Vec<Statement>,
}

/// Fields shared by every schema node
#[derive(Debug, Clone, Default)]
pub struct NodeCommon {
    /// Node name
    pub name: String,
    /// `when` condition, held as an opaque expression
    pub when: Option<When>,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// Tri-state config: `None` inherits from the parent
    pub config: Option<bool>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Extension instances
    pub extension_instances: Vec<Statement>,
}

/// A `when` condition with its own meta statements
#[derive(Debug, Clone)]
pub struct When {
    /// The XPath expression, opaque to the core
    pub condition: String,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A `must` constraint
#[derive(Debug, Clone)]
pub struct Must {
    /// The XPath expression, opaque to the core
    pub condition: String,
    /// `error-message` text
    pub error_message: Option<String>,
    /// `error-app-tag` value
    pub error_app_tag: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A data definition statement
#[derive(Debug, Clone)]
pub enum DataNode {
    /// `container`
    Container(ContainerNode),
    /// `list`
    List(ListNode),
    /// `leaf`
    Leaf(LeafNode),
    /// `leaf-list`
    LeafList(LeafListNode),
    /// `choice`
    Choice(ChoiceNode),
    /// `case`
    Case(CaseNode),
    /// `anydata` (1.1 only)
    Anydata(AnyNode),
    /// `anyxml`
    Anyxml(AnyNode),
    /// `uses`
    Uses(UsesNode),
}

impl DataNode {
    /// The node's common fields
    pub fn common(&self) -> &NodeCommon {
        match self {
            DataNode::Container(n) => &n.common,
            DataNode::List(n) => &n.common,
            DataNode::Leaf(n) => &n.common,
            DataNode::LeafList(n) => &n.common,
            DataNode::Choice(n) => &n.common,
            DataNode::Case(n) => &n.common,
            DataNode::Anydata(n) => &n.common,
            DataNode::Anyxml(n) => &n.common,
            DataNode::Uses(n) => &n.common,
        }
    }

    /// The node name; for `uses`, the referenced grouping name
    pub fn name(&self) -> &str {
        &self.common().name
    }
}

/// `container` node
#[derive(Debug, Clone, Default)]
pub struct ContainerNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// `presence` text; a presence container when set
    pub presence: Option<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// Child data nodes
    pub children: Vec<DataNode>,
    /// Actions (1.1 only)
    pub actions: Vec<Operation>,
    /// Notifications (1.1 only)
    pub notifications: Vec<Notification>,
}

/// `list` node
#[derive(Debug, Clone, Default)]
pub struct ListNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// Space-separated key leaf names
    pub key: Option<String>,
    /// `unique` tags, each a space-separated descendant path list
    pub uniques: Vec<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// Minimum number of entries
    pub min_elements: Option<u32>,
    /// Maximum number of entries
    pub max_elements: Option<MaxElements>,
    /// Entry ordering
    pub ordered_by: Option<OrderedBy>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// Child data nodes
    pub children: Vec<DataNode>,
    /// Actions (1.1 only)
    pub actions: Vec<Operation>,
    /// Notifications (1.1 only)
    pub notifications: Vec<Notification>,
}

/// `leaf` node
#[derive(Debug, Clone)]
pub struct LeafNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// The leaf type
    pub type_: TypeDesc,
    /// `units` text
    pub units: Option<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// Default value text
    pub default: Option<String>,
    /// `mandatory` flag
    pub mandatory: Option<bool>,
}

/// `leaf-list` node
#[derive(Debug, Clone)]
pub struct LeafListNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// The entry type
    pub type_: TypeDesc,
    /// `units` text
    pub units: Option<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// Default value texts (more than one is 1.1 only)
    pub defaults: Vec<String>,
    /// Minimum number of entries
    pub min_elements: Option<u32>,
    /// Maximum number of entries
    pub max_elements: Option<MaxElements>,
    /// Entry ordering
    pub ordered_by: Option<OrderedBy>,
}

/// `choice` node
#[derive(Debug, Clone, Default)]
pub struct ChoiceNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// Default case name
    pub default: Option<String>,
    /// `mandatory` flag
    pub mandatory: Option<bool>,
    /// Cases and shorthand case members
    pub children: Vec<DataNode>,
}

/// `case` node
#[derive(Debug, Clone, Default)]
pub struct CaseNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// Child data nodes
    pub children: Vec<DataNode>,
}

/// `anydata` / `anyxml` node
#[derive(Debug, Clone, Default)]
pub struct AnyNode {
    /// Shared node fields
    pub common: NodeCommon,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// `mandatory` flag
    pub mandatory: Option<bool>,
}

/// `uses` node: a reference to a grouping, expanded at compile time
#[derive(Debug, Clone, Default)]
pub struct UsesNode {
    /// Shared node fields; `name` is the (possibly prefixed) grouping name
    pub common: NodeCommon,
    /// Refinements scoped to this expansion
    pub refines: Vec<Refine>,
    /// Augments scoped to this expansion
    pub augments: Vec<Augment>,
}

/// A `refine` under `uses`
#[derive(Debug, Clone, Default)]
pub struct Refine {
    /// Descendant path of the refined node
    pub target: String,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Added `must` constraints
    pub musts: Vec<Must>,
    /// Replacement presence text
    pub presence: Option<String>,
    /// Replacement defaults
    pub defaults: Vec<String>,
    /// Replacement config flag
    pub config: Option<bool>,
    /// Replacement mandatory flag
    pub mandatory: Option<bool>,
    /// Replacement minimum element count
    pub min_elements: Option<u32>,
    /// Replacement maximum element count
    pub max_elements: Option<MaxElements>,
    /// Replacement description
    pub description: Option<String>,
    /// Replacement reference
    pub reference: Option<String>,
}

/// An `augment`, either top-level or scoped to a `uses`
#[derive(Debug, Clone, Default)]
pub struct Augment {
    /// Target path (absolute for top-level, descendant for uses-scoped)
    pub target: String,
    /// `when` condition
    pub when: Option<When>,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Grafted data nodes
    pub children: Vec<DataNode>,
    /// Grafted actions (1.1 only)
    pub actions: Vec<Operation>,
    /// Grafted notifications (1.1 only)
    pub notifications: Vec<Notification>,
}

/// `rpc` or `action`
#[derive(Debug, Clone, Default)]
pub struct Operation {
    /// Operation name
    pub name: String,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// `input` block
    pub input: Option<OperationIo>,
    /// `output` block
    pub output: Option<OperationIo>,
    /// Extension instances
    pub extension_instances: Vec<Statement>,
}

/// `input` or `output` of an operation
#[derive(Debug, Clone, Default)]
pub struct OperationIo {
    /// `must` constraints
    pub musts: Vec<Must>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// Child data nodes
    pub children: Vec<DataNode>,
}

/// `notification`
#[derive(Debug, Clone, Default)]
pub struct Notification {
    /// Notification name
    pub name: String,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// Child data nodes
    pub children: Vec<DataNode>,
    /// Extension instances
    pub extension_instances: Vec<Statement>,
}

/// A named derived type
#[derive(Debug, Clone)]
pub struct Typedef {
    /// Typedef name
    pub name: String,
    /// The restricted type
    pub type_: TypeDesc,
    /// `units` text
    pub units: Option<String>,
    /// Default value text
    pub default: Option<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A `grouping`
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Grouping name
    pub name: String,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Scoped typedefs
    pub typedefs: Vec<Typedef>,
    /// Scoped groupings
    pub groupings: Vec<Grouping>,
    /// Member data nodes
    pub children: Vec<DataNode>,
    /// Member actions (1.1 only)
    pub actions: Vec<Operation>,
    /// Member notifications (1.1 only)
    pub notifications: Vec<Notification>,
}

/// An `identity` definition
#[derive(Debug, Clone, Default)]
pub struct IdentityDef {
    /// Identity name
    pub name: String,
    /// Base identity names (more than one is 1.1 only)
    pub bases: Vec<String>,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A `feature` definition
#[derive(Debug, Clone, Default)]
pub struct FeatureDef {
    /// Feature name
    pub name: String,
    /// `if-feature` expressions
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// An `extension` definition
#[derive(Debug, Clone, Default)]
pub struct ExtensionDef {
    /// Extension name
    pub name: String,
    /// `argument` name and its `yin-element` flag
    pub argument: Option<(String, bool)>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A `deviation`
#[derive(Debug, Clone, Default)]
pub struct Deviation {
    /// Absolute target path
    pub target: String,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
    /// Deviate clauses, in source order
    pub deviates: Vec<Deviate>,
}

/// One `deviate` clause
#[derive(Debug, Clone)]
pub enum Deviate {
    /// `deviate not-supported`: the target node is removed
    NotSupported,
    /// `deviate add`: new sub-properties are merged in
    Add(DeviateProps),
    /// `deviate replace`: existing sub-properties are overwritten
    Replace(DeviateProps),
    /// `deviate delete`: matching sub-properties are removed
    Delete(DeviateProps),
}

/// Properties carried by an `add`/`replace`/`delete` deviate
#[derive(Debug, Clone, Default)]
pub struct DeviateProps {
    /// Replacement type (replace only)
    pub type_: Option<TypeDesc>,
    /// `units` text
    pub units: Option<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// `unique` tags
    pub uniques: Vec<String>,
    /// Default values
    pub defaults: Vec<String>,
    /// Config flag
    pub config: Option<bool>,
    /// Mandatory flag
    pub mandatory: Option<bool>,
    /// Minimum element count
    pub min_elements: Option<u32>,
    /// Maximum element count
    pub max_elements: Option<MaxElements>,
}

/// A parsed (unresolved) type reference with its restriction bag
#[derive(Debug, Clone, Default)]
pub struct TypeDesc {
    /// Type name, possibly prefixed
    pub name: String,
    /// `range` restriction
    pub range: Option<Restr>,
    /// `length` restriction
    pub length: Option<Restr>,
    /// `pattern` restrictions, conjunctive
    pub patterns: Vec<PatternRestr>,
    /// `fraction-digits` for decimal64
    pub fraction_digits: Option<u8>,
    /// Enum members
    pub enums: Vec<EnumMember>,
    /// Bit members
    pub bits: Vec<BitMember>,
    /// Leafref path
    pub path: Option<String>,
    /// Base identities for identityref (more than one is 1.1 only)
    pub bases: Vec<String>,
    /// `require-instance` flag
    pub require_instance: Option<bool>,
    /// Member types of a union
    pub union_types: Vec<TypeDesc>,
    /// Extension instances
    pub extension_instances: Vec<Statement>,
}

/// A `range` or `length` restriction with its diagnostics
#[derive(Debug, Clone, Default)]
pub struct Restr {
    /// The restriction expression text
    pub expr: String,
    /// `error-message` text
    pub error_message: Option<String>,
    /// `error-app-tag` value
    pub error_app_tag: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// One `pattern` restriction
#[derive(Debug, Clone, Default)]
pub struct PatternRestr {
    /// The regular expression text
    pub expr: String,
    /// `modifier "invert-match"` (1.1 only)
    pub invert_match: bool,
    /// `error-message` text
    pub error_message: Option<String>,
    /// `error-app-tag` value
    pub error_app_tag: Option<String>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// One `enum` member
#[derive(Debug, Clone, Default)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Assigned value; auto-assigned by the compiler when absent
    pub value: Option<i32>,
    /// `if-feature` expressions (1.1 only)
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// One `bit` member
#[derive(Debug, Clone, Default)]
pub struct BitMember {
    /// Member name
    pub name: String,
    /// Assigned position; auto-assigned by the compiler when absent
    pub position: Option<u32>,
    /// `if-feature` expressions (1.1 only)
    pub if_features: Vec<String>,
    /// Definition status
    pub status: Option<Status>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_revision() {
        let mut module = Module::default();
        assert_eq!(module.latest_revision(), None);

        module.revisions.push(Revision {
            date: "2019-04-01".into(),
            description: None,
            reference: None,
        });
        module.revisions.push(Revision {
            date: "2021-11-12".into(),
            description: None,
            reference: None,
        });
        module.revisions.push(Revision {
            date: "2020-06-30".into(),
            description: None,
            reference: None,
        });
        assert_eq!(module.latest_revision(), Some("2021-11-12"));
    }

    #[test]
    fn test_status_rank() {
        assert!(Status::Current.rank() < Status::Deprecated.rank());
        assert!(Status::Deprecated.rank() < Status::Obsolete.rank());
    }
}
