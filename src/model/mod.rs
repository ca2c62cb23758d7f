//! The tree model. Defines what a node is ([`Node`]), how its structure is described ([`Feature`]), and the
//! bookkeeping every node carries ([`NodeData`]).
//!
//! Nodes are shared through [`NodeRef`] (`Rc<dyn Node>`). A parent owns its children through its containment
//! features; children point back at their parent weakly.

#[cfg(test)]
mod tests;

mod describe;
mod equality;
mod feature;
mod generic;
mod reference;
mod span;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Display};
use std::rc::{Rc, Weak};

use crate::util::next_id;

pub use describe::{all_features, derived_features, describe_features, original_features, RESERVED_NAMES};
pub use equality::{structural_diff, structurally_equal};
pub use feature::{
    Classification, ElementValue, Feature, FeatureElement, FeatureTags, FeatureType, FeatureValue, Multiplicity,
    ReferenceValue, TypeDescription, Value,
};
pub use generic::GenericNode;
pub use reference::{PossiblyNamed, ReferenceByName};
pub use span::{Point, Span};

pub type NodeRef = Rc<dyn Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The capabilities every tree element provides. Usually implemented with [`crate::impl_node`].
pub trait Node: Any + Debug {
    /// Identifies the kind of node. Factories are registered and looked up by this exact string.
    fn node_type(&self) -> &str;

    /// The node's structural members, in declaration order, as they are right now. Not validated, see
    /// [`describe_features`].
    fn declared_features(&self) -> Vec<Feature>;

    fn node_data(&self) -> &NodeData;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl dyn Node {
    pub fn id(&self) -> NodeId {
        self.node_data().id()
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.node_data().parent()
    }

    pub fn span(&self) -> Option<Span> {
        self.node_data().span()
    }

    /// The last path segment of [`Node::node_type`], e.g. `Sum` for `my_crate::ast::Sum`.
    pub fn simple_type_name(&self) -> &str {
        let node_type = self.node_type();
        node_type.rsplit("::").next().unwrap_or(node_type)
    }

    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Casts a shared node to its concrete type. Gives the node back on failure.
pub fn downcast_node<T: Node>(node: NodeRef) -> Result<Rc<T>, NodeRef> {
    let original = Rc::clone(&node);
    node.into_any().downcast::<T>().map_err(|_| original)
}

/* Node Data */

/// Bookkeeping shared by all nodes: identity, location, where the node was transformed from, and its parent.
#[derive(Debug)]
pub struct NodeData {
    id: NodeId,
    span: Cell<Option<Span>>,
    origin: Cell<Option<NodeId>>,
    parent: RefCell<Option<Weak<dyn Node>>>,
}

impl NodeData {
    pub fn new() -> NodeData {
        NodeData {
            id: NodeId(next_id()),
            span: Cell::new(None),
            origin: Cell::new(None),
            parent: RefCell::new(None),
        }
    }

    pub fn at(span: Span) -> NodeData {
        let data = NodeData::new();
        data.set_span(Some(span));
        data
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn span(&self) -> Option<Span> {
        self.span.get()
    }

    pub fn set_span(&self, span: Option<Span>) {
        self.span.set(span);
    }

    /// The id of the node this one was transformed from, if any.
    pub fn origin(&self) -> Option<NodeId> {
        self.origin.get()
    }

    pub fn set_origin(&self, origin: Option<NodeId>) {
        self.origin.set(origin);
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Replaces any previous parent link.
    pub fn set_parent(&self, parent: &NodeRef) {
        *self.parent.borrow_mut() = Some(Rc::downgrade(parent));
    }

    pub fn clear_parent(&self) {
        *self.parent.borrow_mut() = None;
    }
}

impl Default for NodeData {
    fn default() -> Self {
        NodeData::new()
    }
}

/// A copy is a new node: it gets a fresh id and no parent, but keeps the location and origin.
impl Clone for NodeData {
    fn clone(&self) -> Self {
        let data = NodeData::new();
        data.set_span(self.span());
        data.set_origin(self.origin());
        data
    }
}

/* Tree Structure */

/// The node's children: the values of its original containment features, feature by feature, in order.
pub fn children(node: &dyn Node) -> Vec<NodeRef> {
    describe::structural_features(node)
        .into_iter()
        .filter(|feature| feature.is_containment() && !feature.derived)
        .flat_map(|feature| feature.nodes())
        .collect()
}

/// Wraps a freshly built node and makes it the parent of its direct children. Building a tree bottom up with
/// `adopt` at every level links the whole tree.
pub fn adopt<T: Node>(node: T) -> Rc<T> {
    let node = Rc::new(node);
    let parent: NodeRef = node.clone();

    for child in children(&*parent) {
        child.node_data().set_parent(&parent);
    }

    node
}

/// Relinks every node under `root` to its parent.
pub fn assign_parents(root: &NodeRef) {
    let mut stack = vec![Rc::clone(root)];

    while let Some(node) = stack.pop() {
        for child in children(&*node) {
            child.node_data().set_parent(&node);
            stack.push(child);
        }
    }
}
