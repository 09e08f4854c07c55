//! Compiled schema tree
//!
//! The fully resolved schema a compile produces: `uses` expansions are
//! materialized, augments merged into their targets, typedef chains
//! collapsed into compiled built-in types. Nodes live in an arena owned
//! by the module; references between nodes are indices, so reallocation
//! never invalidates the tree. A compiled module is immutable once the
//! compile call returns.

use crate::schema::identities::IdentityKey;
use crate::schema::parsed::{MaxElements, Must, OrderedBy, Revision, Status, YangVersion};
use crate::types::{CompiledType, Value};

/// Index of a node in its module's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Kind-specific payload of a compiled node
#[derive(Debug, Clone)]
pub enum CompiledNodeKind {
    /// `container`; presence text when it is a presence container
    Container {
        /// `presence` text
        presence: Option<String>,
    },
    /// `list`
    List {
        /// Key leaf names, in key-statement order
        keys: Vec<String>,
        /// `unique` tags
        uniques: Vec<String>,
        /// Minimum entries
        min_elements: Option<u32>,
        /// Maximum entries
        max_elements: Option<MaxElements>,
        /// Entry ordering
        ordered_by: OrderedBy,
    },
    /// `leaf`
    Leaf {
        /// The collapsed type
        type_: CompiledType,
        /// Effective default text (own or inherited from a typedef)
        default: Option<String>,
        /// The default, stored through the compiled type
        default_value: Option<Value>,
        /// `units` text
        units: Option<String>,
        /// Whether the leaf is mandatory
        mandatory: bool,
    },
    /// `leaf-list`
    LeafList {
        /// The collapsed type
        type_: CompiledType,
        /// Effective default texts
        defaults: Vec<String>,
        /// `units` text
        units: Option<String>,
        /// Minimum entries
        min_elements: Option<u32>,
        /// Maximum entries
        max_elements: Option<MaxElements>,
        /// Entry ordering
        ordered_by: OrderedBy,
    },
    /// `choice`
    Choice {
        /// Default case name
        default: Option<String>,
        /// Whether a case must be present
        mandatory: bool,
    },
    /// `case`
    Case,
    /// `anydata`
    Anydata {
        /// Whether the node is mandatory
        mandatory: bool,
    },
    /// `anyxml`
    Anyxml {
        /// Whether the node is mandatory
        mandatory: bool,
    },
    /// `rpc` or `action`
    Operation,
    /// `input` of an operation
    Input,
    /// `output` of an operation
    Output,
    /// `notification`
    Notification,
}

/// One node of the compiled tree
#[derive(Debug, Clone)]
pub struct CompiledNode {
    /// Node name
    pub name: String,
    /// Name of the module that defined the node (augments keep their
    /// source module)
    pub module: String,
    /// Kind-specific payload
    pub kind: CompiledNodeKind,
    /// Parent node, if any
    pub parent: Option<NodeId>,
    /// Children, in schema order
    pub children: Vec<NodeId>,
    /// Resolved config: true is config, false is state
    pub config: bool,
    /// Effective status (inherited when not set on the node)
    pub status: Status,
    /// `when` expressions rooted at this node, opaque to the core
    pub whens: Vec<String>,
    /// `must` constraints
    pub musts: Vec<Must>,
    /// `description` text
    pub description: Option<String>,
    /// `reference` text
    pub reference: Option<String>,
}

/// A compiled module: the frozen output of the schema compiler
#[derive(Debug, Clone)]
pub struct CompiledModule {
    /// Module name
    pub name: String,
    /// Namespace URI
    pub namespace: String,
    /// Module prefix
    pub prefix: String,
    /// Language version
    pub version: YangVersion,
    /// Revision history, sorted descending by date
    pub revisions: Vec<Revision>,
    /// Identities the module (and its submodules) defined
    pub identities: Vec<IdentityKey>,
    /// Feature names the module defined
    pub features: Vec<String>,
    /// The node arena
    pub(crate) nodes: Vec<CompiledNode>,
    /// Top-level data nodes, in schema order
    pub roots: Vec<NodeId>,
    /// RPC nodes
    pub rpcs: Vec<NodeId>,
    /// Top-level notification nodes
    pub notifications: Vec<NodeId>,
}

impl CompiledModule {
    /// Access a node by id
    pub fn node(&self, id: NodeId) -> &CompiledNode {
        &self.nodes[id.0]
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the module compiled to an empty tree
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// First child of a node, or the first root when `id` is `None`
    pub fn first_child(&self, id: Option<NodeId>) -> Option<NodeId> {
        match id {
            Some(id) => self.node(id).children.first().copied(),
            None => self.roots.first().copied(),
        }
    }

    /// Next sibling of a node
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = match self.node(id).parent {
            Some(parent) => &self.node(parent).children,
            None => &self.roots,
        };
        let index = siblings.iter().position(|s| *s == id)?;
        siblings.get(index + 1).copied()
    }

    /// Child of a node by name, or a root by name when `id` is `None`
    pub fn child_by_name(&self, id: Option<NodeId>, name: &str) -> Option<NodeId> {
        let children = match id {
            Some(id) => &self.node(id).children,
            None => &self.roots,
        };
        children
            .iter()
            .copied()
            .find(|c| self.node(*c).name == name)
    }

    /// Schema path of a node: `/<module>:<node>/<node>/...`
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            segments.push(node.name.clone());
            current = node.parent;
        }
        segments.reverse();
        format!("/{}:{}", self.name, segments.join("/"))
    }

    /// Iterate the whole tree depth-first
    pub fn iter_depth_first(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self
            .roots
            .iter()
            .chain(self.rpcs.iter())
            .chain(self.notifications.iter())
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order.into_iter()
    }
}
