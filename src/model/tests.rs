use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::error::ModelError;
use crate::{impl_attribute, impl_node};

/* Test Nodes */

#[derive(Debug, Clone, Copy, PartialEq)]
enum Visibility {
    Public,
}

impl_attribute!(Visibility);

#[derive(Debug)]
struct TypeDecl {
    node_data: NodeData,
    name: String,
}

impl_node!(TypeDecl { name });

impl PossiblyNamed for TypeDecl {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Debug)]
struct Param {
    node_data: NodeData,
    name: String,
}

impl_node!(Param { name });

#[derive(Debug)]
struct Block {
    node_data: NodeData,
    statements: Vec<NodeRef>,
    statement_count: usize,
}

impl_node!(Block { statements, #[derived] statement_count });

#[derive(Debug)]
struct Function {
    node_data: NodeData,
    name: String,
    visibility: Visibility,
    params: Vec<Rc<Param>>,
    body: Option<Rc<Block>>,
    returns: ReferenceByName<TypeDecl>,
    #[allow(unused)]
    cache: RefCell<Option<String>>,
}

impl_node!(Function {
    name,
    visibility,
    params,
    #[mandatory] body,
    returns,
    #[internal] cache,
} derived { arity });

impl Function {
    fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug)]
struct Misnamed {
    node_data: NodeData,
    parent: Option<NodeRef>,
    id: String,
}

impl_node!(Misnamed { parent, id });

#[derive(Debug)]
struct Repeated {
    node_data: NodeData,
    value: i32,
}

impl_node!(Repeated { value, value });

/* Helpers */

fn param(name: &str) -> Rc<Param> {
    adopt(Param { node_data: NodeData::new(), name: name.to_string() })
}

fn block(statements: Vec<NodeRef>) -> Rc<Block> {
    let statement_count = statements.len();
    adopt(Block { node_data: NodeData::new(), statements, statement_count })
}

fn function(name: &str, params: &[&str], body: Option<Rc<Block>>, returns: &str) -> Rc<Function> {
    adopt(Function {
        node_data: NodeData::new(),
        name: name.to_string(),
        visibility: Visibility::Public,
        params: params.iter().map(|p| param(p)).collect(),
        body,
        returns: ReferenceByName::new(returns),
        cache: RefCell::new(None),
    })
}

fn names(features: &[Feature]) -> Vec<&str> {
    features.iter().map(|feature| feature.name.as_str()).collect()
}

/* Classifier */

#[test]
fn features_follow_declaration_order() {
    let f = function("main", &["argc", "argv"], Some(block(vec![])), "Int");
    let features = describe_features(&*f).unwrap();

    assert_eq!(names(&features), ["name", "visibility", "params", "body", "returns", "arity"]);
}

#[test]
fn classification_and_multiplicity() {
    let f = function("main", &["argc"], None, "Int");
    let features = describe_features(&*f).unwrap();

    let shape = features.iter().map(|f| (f.classification, f.multiplicity)).collect::<Vec<_>>();

    assert_eq!(
        shape,
        [
            (Classification::Attribute, Multiplicity::Singular),
            (Classification::Attribute, Multiplicity::Singular),
            (Classification::Containment, Multiplicity::Many),
            (Classification::Containment, Multiplicity::Singular),
            (Classification::Reference, Multiplicity::Singular),
            (Classification::Attribute, Multiplicity::Singular),
        ]
    );
}

#[test]
fn optional_without_mandatory_tag_is_optional() {
    #[derive(Debug)]
    struct Holder {
        node_data: NodeData,
        maybe: Option<Rc<Param>>,
        label: Option<String>,
    }

    impl_node!(Holder { maybe, label });

    let holder = Holder { node_data: NodeData::new(), maybe: None, label: Some("x".to_string()) };
    let features = describe_features(&holder).unwrap();

    assert_eq!(features[0].multiplicity, Multiplicity::Optional);
    assert!(matches!(features[0].value, FeatureValue::Absent));
    assert_eq!(features[1].multiplicity, Multiplicity::Optional);
    assert!(matches!(&features[1].value, FeatureValue::One(ElementValue::Attribute(Value::Text(s))) if s == "x"));
}

#[test]
fn declared_types_unwrap_containers_and_references() {
    let f = function("main", &[], None, "Int");
    let features = describe_features(&*f).unwrap();

    assert_eq!(features[1].declared_type, TypeDescription::of::<Visibility>());
    assert_eq!(features[2].declared_type, TypeDescription::of::<Param>());
    assert_eq!(features[3].declared_type, TypeDescription::of::<Block>());
    assert_eq!(features[4].declared_type, TypeDescription::of::<TypeDecl>());
    assert_eq!(features[4].declared_type.simple_name(), "TypeDecl");
}

#[test]
fn enum_attributes_are_symbols() {
    let f = function("main", &[], None, "Int");
    let features = describe_features(&*f).unwrap();

    assert_eq!(features[1].value_to_string(), "Public");
    assert_eq!(features[4].value_to_string(), "ref(Int, unresolved)");
    assert_eq!(features[3].value_to_string(), "<absent>");
}

#[test]
fn original_and_derived_partition_all() {
    let f = function("main", &["a"], Some(block(vec![])), "Int");

    let all = all_features(&*f).unwrap();
    let original = original_features(&*f).unwrap();
    let derived = derived_features(&*f).unwrap();

    assert_eq!(names(&original), ["name", "visibility", "params", "body", "returns"]);
    assert_eq!(names(&derived), ["arity"]);
    assert_eq!(original.len() + derived.len(), all.len());
    assert!(names(&original).iter().all(|name| !names(&derived).contains(name)));
}

#[test]
fn describing_twice_gives_same_list() {
    let f = function("main", &["a", "b"], Some(block(vec![])), "Int");

    let first = describe_features(&*f).unwrap();
    let second = describe_features(&*f).unwrap();

    assert_eq!(names(&first), names(&second));
    assert_eq!(
        first.iter().map(Feature::value_to_string).collect::<Vec<_>>(),
        second.iter().map(Feature::value_to_string).collect::<Vec<_>>()
    );
}

#[test]
fn reserved_names_are_skipped_everywhere() {
    let node = Misnamed { node_data: NodeData::new(), parent: Some(param("x") as NodeRef), id: "a".to_string() };
    let other = Misnamed { node_data: NodeData::new(), parent: None, id: "a".to_string() };

    assert_eq!(names(&describe_features(&node).unwrap()), ["id"]);
    assert!(children(&node).is_empty());
    assert!(structurally_equal(&node, &other));
}

#[test]
fn duplicate_names_are_rejected() {
    let node = Repeated { node_data: NodeData::new(), value: 1 };

    assert!(matches!(describe_features(&node), Err(ModelError::DuplicateFeature { .. })));
    assert!(structural_diff(&node, &node).is_some_and(|diff| diff.contains("more than once")));
}

/* Parents */

#[test]
fn adopt_links_children_to_parent() {
    let f = function("main", &["a", "b"], None, "Int");
    let f_ref: NodeRef = f.clone();

    for p in &f.params {
        let parent = p.node_data.parent().expect("Param should have a parent");
        assert_eq!(parent.id(), f_ref.id());
    }
}

#[test]
fn reparenting_replaces_link() {
    let shared = param("x");
    let first: NodeRef = block(vec![shared.clone() as NodeRef]);
    let second: NodeRef = block(vec![shared.clone() as NodeRef]);

    let parent = shared.node_data.parent().expect("Has a parent");
    assert_eq!(parent.id(), second.id());
    assert_ne!(parent.id(), first.id());
}

#[test]
fn children_skip_references_and_attributes() {
    let body = block(vec![param("inner") as NodeRef]);
    let f = function("main", &["a"], Some(body.clone()), "Int");

    let kids = children(&*f);

    assert_eq!(kids.len(), 2);
    assert!(kids[0].is::<Param>());
    assert!(kids[1].is::<Block>());
}

#[test]
fn assign_parents_relinks_whole_tree() {
    let inner = param("inner");
    let body = block(vec![inner.clone() as NodeRef]);
    let root: NodeRef = function("main", &[], Some(body), "Int");

    inner.node_data.clear_parent();
    assign_parents(&root);

    let grandparent = inner.node_data.parent().and_then(|p| p.parent()).expect("Linked up to root");
    assert_eq!(grandparent.id(), root.id());
}

/* Equality */

#[test]
fn equal_trees_compare_equal() {
    let a = function("main", &["x"], Some(block(vec![param("y") as NodeRef])), "Int");
    let b = function("main", &["x"], Some(block(vec![param("y") as NodeRef])), "Int");

    assert!(structurally_equal(&*a, &*b));
}

#[test]
fn derived_values_are_ignored() {
    let a = Block { node_data: NodeData::new(), statements: vec![], statement_count: 0 };
    let b = Block { node_data: NodeData::new(), statements: vec![], statement_count: 99 };

    assert!(structurally_equal(&a, &b));
}

#[test]
fn attribute_difference_is_reported_with_path() {
    let a = function("main", &["x"], None, "Int");
    let b = function("main", &["z"], None, "Int");

    assert_eq!(structural_diff(&*a, &*b).as_deref(), Some("Function.params[0].name: \"x\" differs from \"z\""));
}

#[test]
fn references_compare_by_name_only() {
    let target = adopt(TypeDecl { node_data: NodeData::new(), name: "Int".to_string() });

    let a = function("main", &[], None, "Int");
    let b = function("main", &[], None, "Int");
    b.returns.resolve(&target);

    assert!(structurally_equal(&*a, &*b));

    let c = function("main", &[], None, "Float");
    assert!(!structurally_equal(&*a, &*c));
}

#[test]
fn different_types_are_unequal() {
    let a = param("x");
    let b = adopt(TypeDecl { node_data: NodeData::new(), name: "x".to_string() });

    assert!(!structurally_equal(&*a, &*b));
}

/* References */

#[test]
fn resolve_by_name() {
    let int = adopt(TypeDecl { node_data: NodeData::new(), name: "Int".to_string() });
    let float = adopt(TypeDecl { node_data: NodeData::new(), name: "Float".to_string() });
    let candidates = [int.clone(), float.clone()];

    let reference: ReferenceByName<TypeDecl> = ReferenceByName::new("float");
    assert!(!reference.try_to_resolve(&candidates, false));
    assert!(!reference.is_resolved());

    assert!(reference.try_to_resolve(&candidates, true));
    assert!(Rc::ptr_eq(&reference.referred().unwrap(), &float));
    assert_eq!(format!("{reference:?}"), "Ref(float)[Solved]");
}

#[test]
fn references_do_not_keep_targets_alive() {
    let reference: ReferenceByName<TypeDecl> = ReferenceByName::new("Int");
    {
        let int = adopt(TypeDecl { node_data: NodeData::new(), name: "Int".to_string() });
        reference.resolve(&int);
        assert!(reference.is_resolved());
    }
    assert!(!reference.is_resolved());
}

/* Spans */

#[test]
fn span_containment() {
    let outer = Span::of(1, 0, 5, 10);
    let inner = Span::of(2, 4, 3, 0);
    let straddling = Span::of(4, 0, 7, 0);
    let after = Span::of(6, 0, 7, 0);

    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert!(outer.overlaps(&straddling));
    assert!(!outer.overlaps(&after));
    assert!(inner.overlaps(&outer));
    assert!(outer.contains_point(Point::new(5, 10)));
    assert_eq!(Span::combine_all(&[inner, straddling]), Span::of(2, 4, 7, 0));
    assert_eq!(outer.to_string(), "1:0-5:10");
}

#[test]
fn node_data_copies_are_new_nodes() {
    let data = NodeData::at(Span::of(1, 0, 1, 4));
    let copy = data.clone();

    assert_ne!(data.id(), copy.id());
    assert_eq!(copy.span(), Some(Span::of(1, 0, 1, 4)));
}

#[test]
fn downcasting_shared_nodes() {
    let node: NodeRef = param("x");

    let node = downcast_node::<TypeDecl>(node).expect_err("Not a TypeDecl");
    let p = downcast_node::<Param>(node).expect("Is a Param");
    assert_eq!(p.name, "x");
}

#[test]
fn generic_nodes_expose_given_features() {
    let original = param("x");
    let features = original_features(&*original).unwrap();
    let generic = GenericNode::new(original.node_type(), features);

    assert_eq!(generic.source_type, original.node_type());
    assert_eq!(generic.feature("name").map(Feature::value_to_string).as_deref(), Some("\"x\""));
    assert!(!structurally_equal(&*original, &generic));
}
