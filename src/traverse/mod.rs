//! Walks over a tree. Every walk is a lazy iterator that starts fresh on each call and holds nothing but the nodes it
//! still has to visit, so callers may stop early at no cost.
//!
//! Only containment children are followed. References and derived features are never walked into.

#[cfg(test)]
mod tests;

mod by_span;

use std::rc::Rc;

use crate::model::{children, downcast_node, Node, NodeRef};

pub use by_span::{find_by_point, find_by_span, search_by_span, walk_within, walk_within_all, WalkWithin};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Parents before children.
    #[default]
    PreOrder,
    /// Children before parents.
    LeavesFirst,
}

/* Pre-order */

/// Yields `node`, then each child's subtree in order.
pub fn walk(node: &NodeRef) -> Walk {
    Walk { stack: vec![Rc::clone(node)] }
}

pub struct Walk {
    stack: Vec<NodeRef>,
}

impl Iterator for Walk {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.stack.pop()?;
        self.stack.extend(children(&*node).into_iter().rev());
        Some(node)
    }
}

/* Post-order */

/// Yields each child's subtree in order, then `node` itself.
pub fn walk_leaves_first(node: &NodeRef) -> WalkLeavesFirst {
    WalkLeavesFirst { stack: vec![(Rc::clone(node), children(&**node).into_iter())] }
}

pub struct WalkLeavesFirst {
    /// Each frame is a node still waiting to be yielded, with the children not yet visited.
    stack: Vec<(NodeRef, std::vec::IntoIter<NodeRef>)>,
}

impl Iterator for WalkLeavesFirst {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        loop {
            let (_, remaining) = self.stack.last_mut()?;

            match remaining.next() {
                Some(child) => {
                    let grandchildren = children(&*child).into_iter();
                    self.stack.push((child, grandchildren));
                }
                None => return self.stack.pop().map(|(node, _)| node),
            }
        }
    }
}

/* Ancestors */

/// Yields the parent of `node`, then its parent, and so on up to the root.
pub fn walk_ancestors(node: &dyn Node) -> Ancestors {
    Ancestors { next: node.parent() }
}

pub struct Ancestors {
    next: Option<NodeRef>,
}

impl Iterator for Ancestors {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

pub fn find_ancestor(node: &dyn Node, mut predicate: impl FnMut(&NodeRef) -> bool) -> Option<NodeRef> {
    walk_ancestors(node).find(|ancestor| predicate(ancestor))
}

pub fn find_ancestor_of_type<T: Node>(node: &dyn Node) -> Option<Rc<T>> {
    walk_ancestors(node).find_map(|ancestor| downcast_node::<T>(ancestor).ok())
}

/* Descendants */

pub fn walk_children(node: &dyn Node) -> std::vec::IntoIter<NodeRef> {
    children(node).into_iter()
}

/// `node` and everything below it, in the order `strategy` dictates.
pub fn walk_descendants(node: &NodeRef, strategy: Strategy) -> Descendants {
    match strategy {
        Strategy::PreOrder => Descendants::PreOrder(walk(node)),
        Strategy::LeavesFirst => Descendants::LeavesFirst(walk_leaves_first(node)),
    }
}

pub enum Descendants {
    PreOrder(Walk),
    LeavesFirst(WalkLeavesFirst),
}

impl Iterator for Descendants {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        match self {
            Descendants::PreOrder(walk) => walk.next(),
            Descendants::LeavesFirst(walk) => walk.next(),
        }
    }
}

pub fn walk_descendants_matching<P>(node: &NodeRef, strategy: Strategy, predicate: P) -> impl Iterator<Item = NodeRef>
where
    P: FnMut(&NodeRef) -> bool,
{
    walk_descendants(node, strategy).filter(predicate)
}

/// Descendants (and `node` itself) of concrete type `T`.
pub fn search_by_type<T: Node>(node: &NodeRef, strategy: Strategy) -> impl Iterator<Item = Rc<T>> {
    walk_descendants(node, strategy).filter_map(|descendant| downcast_node::<T>(descendant).ok())
}

pub fn collect_by_type<T: Node>(node: &NodeRef) -> Vec<Rc<T>> {
    search_by_type(node, Strategy::PreOrder).collect()
}
