//! Walks restricted to a region of the source text. Nodes without a span never match.

use std::rc::Rc;

use super::walk;
use crate::model::{children, NodeRef, Point, Span};

/// The pre-order walk of `node`, keeping only nodes lying inside `boundary`. Subtrees that merely overlap the boundary
/// are searched but not yielded; subtrees outside it are skipped entirely.
pub fn walk_within(node: &NodeRef, boundary: Span) -> WalkWithin {
    walk_within_all(std::slice::from_ref(node), boundary)
}

/// [`walk_within`] applied to each root in turn.
pub fn walk_within_all(nodes: &[NodeRef], boundary: Span) -> WalkWithin {
    WalkWithin { stack: nodes.iter().rev().map(Rc::clone).collect(), boundary }
}

pub struct WalkWithin {
    stack: Vec<NodeRef>,
    boundary: Span,
}

impl Iterator for WalkWithin {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        loop {
            let node = self.stack.pop()?;
            let Some(span) = node.span() else { continue };

            if self.boundary.contains(&span) {
                self.stack.extend(children(&*node).into_iter().rev());
                return Some(node);
            } else if self.boundary.overlaps(&span) {
                self.stack.extend(children(&*node).into_iter().rev());
            }
        }
    }
}

/// Every node under `root` whose span contains `span`, outermost first.
pub fn search_by_span(root: &NodeRef, span: Span) -> impl Iterator<Item = NodeRef> {
    walk(root).filter(move |node| node.span().is_some_and(|own| own.contains(&span)))
}

/// The most specific node containing `span`.
pub fn find_by_span(root: &NodeRef, span: Span) -> Option<NodeRef> {
    search_by_span(root, span).last()
}

/// The most specific node containing `point`.
pub fn find_by_point(root: &NodeRef, point: Point) -> Option<NodeRef> {
    walk(root).filter(|node| node.span().is_some_and(|own| own.contains_point(point))).last()
}
