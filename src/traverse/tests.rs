use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::impl_node;
use crate::model::{adopt, NodeData, Point, Span};

#[derive(Debug)]
struct Root {
    node_data: NodeData,
    name: String,
    children: Vec<NodeRef>,
}

impl_node!(Root { name, children });

#[derive(Debug)]
struct Branch {
    node_data: NodeData,
    name: String,
    children: Vec<NodeRef>,
}

impl_node!(Branch { name, children });

#[derive(Debug)]
struct Leaf {
    node_data: NodeData,
    name: String,
}

impl_node!(Leaf { name });

fn leaf(name: &str) -> NodeRef {
    adopt(Leaf { node_data: NodeData::new(), name: name.to_string() })
}

fn branch(name: &str, children: Vec<NodeRef>) -> NodeRef {
    adopt(Branch { node_data: NodeData::new(), name: name.to_string(), children })
}

fn root(children: Vec<NodeRef>) -> NodeRef {
    adopt(Root { node_data: NodeData::new(), name: "R".to_string(), children })
}

/// Every test node type has a `name` attribute, which is all the tests need to look at.
fn name_of(node: &NodeRef) -> String {
    node.declared_features()
        .into_iter()
        .find(|feature| feature.name == "name")
        .map(|feature| feature.value_to_string().trim_matches('"').to_string())
        .expect("Test nodes are named")
}

fn names(nodes: impl Iterator<Item = NodeRef>) -> Vec<String> {
    nodes.map(|node| name_of(&node)).collect()
}

/// R has children [A, B], and A has children [C, D].
fn sample_tree() -> NodeRef {
    root(vec![branch("A", vec![leaf("C"), leaf("D")]), leaf("B")])
}

#[test]
fn pre_order() {
    assert_eq!(names(walk(&sample_tree())), ["R", "A", "C", "D", "B"]);
}

#[test]
fn leaves_first() {
    assert_eq!(names(walk_leaves_first(&sample_tree())), ["C", "D", "A", "B", "R"]);
}

#[test]
fn lone_leaf_appears_once_in_both_orders() {
    let lone = leaf("X");

    assert_eq!(names(walk(&lone)), ["X"]);
    assert_eq!(names(walk_leaves_first(&lone)), ["X"]);
}

#[test]
fn walks_restart_on_each_call() {
    let tree = sample_tree();

    let mut first = walk(&tree);
    first.next();
    first.next();

    assert_eq!(names(walk(&tree)), ["R", "A", "C", "D", "B"]);
    assert_eq!(names(first), ["C", "D", "B"]);
}

#[test]
fn ancestors_up_to_root() {
    let tree = sample_tree();
    let c = walk(&tree).find(|node| name_of(node) == "C").unwrap();

    assert_eq!(names(walk_ancestors(&*c)), ["A", "R"]);
    assert_eq!(walk_ancestors(&*tree).count(), 0);
}

#[test]
fn ancestor_of_type() {
    let c = leaf("C");
    let a = branch("A", vec![c.clone()]);
    let r = root(vec![a.clone()]);

    let found = find_ancestor_of_type::<Root>(&*c).expect("R is above C");
    assert_eq!(found.name, "R");
    assert!(Rc::ptr_eq(&(found as NodeRef), &r));

    assert!(find_ancestor_of_type::<Branch>(&*r).is_none());
}

#[test]
fn ancestor_by_predicate() {
    let tree = sample_tree();
    let d = walk(&tree).find(|node| name_of(node) == "D").unwrap();

    let found = find_ancestor(&*d, |node| name_of(node) == "R").unwrap();
    assert!(Rc::ptr_eq(&found, &tree));
}

#[test]
fn descendants_by_strategy() {
    let tree = sample_tree();

    assert_eq!(names(walk_descendants(&tree, Strategy::PreOrder)), ["R", "A", "C", "D", "B"]);
    assert_eq!(names(walk_descendants(&tree, Strategy::LeavesFirst)), ["C", "D", "A", "B", "R"]);
}

#[test]
fn descendants_filtered_by_type() {
    let tree = sample_tree();

    let leaves = search_by_type::<Leaf>(&tree, Strategy::LeavesFirst).map(|l| l.name.clone()).collect::<Vec<_>>();
    assert_eq!(leaves, ["C", "D", "B"]);

    let roots = collect_by_type::<Root>(&tree);
    assert_eq!(roots.len(), 1);

    let matching = walk_descendants_matching(&tree, Strategy::PreOrder, |node| node.is::<Branch>());
    assert_eq!(names(matching), ["A"]);
}

#[test]
fn children_in_order() {
    let tree = sample_tree();

    assert_eq!(names(walk_children(&*tree)), ["A", "B"]);
}

#[test]
fn early_stop_is_fine() {
    let tree = sample_tree();

    assert_eq!(names(walk(&tree).take(2)), ["R", "A"]);
}

/* Spans */

fn at(node: NodeRef, span: Span) -> NodeRef {
    node.node_data().set_span(Some(span));
    node
}

/// R spans lines 1-10. A (2-5) holds C (2-3) and D (4-5). B spans 7-9.
fn located_tree() -> NodeRef {
    let c = at(leaf("C"), Span::of(2, 0, 3, 0));
    let d = at(leaf("D"), Span::of(4, 0, 5, 0));
    let a = at(branch("A", vec![c, d]), Span::of(2, 0, 5, 0));
    let b = at(leaf("B"), Span::of(7, 0, 9, 0));
    at(root(vec![a, b]), Span::of(1, 0, 10, 0))
}

#[test]
fn within_boundary() {
    let tree = located_tree();

    assert_eq!(names(walk_within(&tree, Span::of(1, 0, 10, 0))), ["R", "A", "C", "D", "B"]);
    assert_eq!(names(walk_within(&tree, Span::of(2, 0, 5, 0))), ["A", "C", "D"]);
    assert_eq!(names(walk_within(&tree, Span::of(3, 5, 9, 0))), ["D", "B"]);
    assert_eq!(names(walk_within(&tree, Span::of(20, 0, 21, 0))), Vec::<String>::new());
}

#[test]
fn within_boundary_over_several_roots() {
    let first = located_tree();
    let second = located_tree();

    let found = names(walk_within_all(&[first, second], Span::of(7, 0, 9, 0)));
    assert_eq!(found, ["B", "B"]);
}

#[test]
fn nodes_without_spans_are_skipped() {
    let tree = root(vec![leaf("A")]);

    assert_eq!(walk_within(&tree, Span::of(1, 0, 100, 0)).count(), 0);
}

#[test]
fn search_and_find_by_span() {
    let tree = located_tree();

    assert_eq!(names(search_by_span(&tree, Span::of(4, 1, 4, 5))), ["R", "A", "D"]);
    assert_eq!(find_by_span(&tree, Span::of(4, 1, 4, 5)).map(|n| name_of(&n)).as_deref(), Some("D"));
    assert_eq!(find_by_point(&tree, Point::new(6, 0)).map(|n| name_of(&n)).as_deref(), Some("R"));
    assert_eq!(find_by_point(&tree, Point::new(8, 3)).map(|n| name_of(&n)).as_deref(), Some("B"));
    assert!(find_by_point(&tree, Point::new(11, 0)).is_none());
}
