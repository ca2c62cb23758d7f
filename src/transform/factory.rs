//! The registry of node factories. A factory says how to build a destination node from one type of source node, and
//! which of the destination's children are filled in from which source children.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::Transformation;
use crate::error::TransformError;
use crate::model::{downcast_node, Node, NodeRef};

pub(crate) type Constructor<S, D> = Box<dyn Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError>>;
pub(crate) type Getter<S> = Box<dyn for<'s> Fn(&'s S) -> ChildSource<'s>>;
pub(crate) type Setter<D> = Box<dyn Fn(&mut D, ChildValue) -> Result<(), TransformError>>;
pub(crate) type Finalizer<D> = Box<dyn Fn(&mut D, &mut Transformation<'_>) -> Result<(), TransformError>>;

/* Child Wiring */

/// What a child getter found on the source node.
pub enum ChildSource<'s> {
    Absent,
    One(&'s dyn Node),
    Many(Vec<&'s dyn Node>),
}

impl<'s> ChildSource<'s> {
    pub fn one(node: &'s dyn Node) -> ChildSource<'s> {
        ChildSource::One(node)
    }

    pub fn optional(node: Option<&'s dyn Node>) -> ChildSource<'s> {
        node.map_or(ChildSource::Absent, ChildSource::One)
    }

    pub fn many<N: Node>(nodes: &'s [Rc<N>]) -> ChildSource<'s> {
        ChildSource::Many(nodes.iter().map(|node| &**node as &dyn Node).collect())
    }

    pub fn many_refs(nodes: &'s [NodeRef]) -> ChildSource<'s> {
        ChildSource::Many(nodes.iter().map(|node| &**node).collect())
    }

    /// Every source node, whatever the shape.
    pub(crate) fn into_nodes(self) -> Vec<&'s dyn Node> {
        match self {
            ChildSource::Absent => vec![],
            ChildSource::One(node) => vec![node],
            ChildSource::Many(nodes) => nodes,
        }
    }
}

/// The transformed children handed to a child setter. Shaped by the multiplicity of the destination feature:
/// `Many` for collections, `One` or `Absent` otherwise.
#[derive(Debug)]
pub enum ChildValue {
    Absent,
    One(NodeRef),
    Many(Vec<NodeRef>),
}

impl ChildValue {
    pub fn into_node<T: Node>(self) -> Result<Rc<T>, TransformError> {
        expect_node_type(self.into_node_ref()?)
    }

    pub fn into_optional<T: Node>(self) -> Result<Option<Rc<T>>, TransformError> {
        self.into_optional_ref()?.map(expect_node_type).transpose()
    }

    pub fn into_nodes<T: Node>(self) -> Result<Vec<Rc<T>>, TransformError> {
        self.into_node_refs()?.into_iter().map(expect_node_type).collect()
    }

    pub fn into_node_ref(self) -> Result<NodeRef, TransformError> {
        match self {
            ChildValue::One(node) => Ok(node),
            ChildValue::Absent => Err("expected a child node, found none".into()),
            ChildValue::Many(nodes) => Err(format!("expected a single child node, found {}", nodes.len()).into()),
        }
    }

    pub fn into_optional_ref(self) -> Result<Option<NodeRef>, TransformError> {
        match self {
            ChildValue::One(node) => Ok(Some(node)),
            ChildValue::Absent => Ok(None),
            ChildValue::Many(nodes) => Err(format!("expected at most one child node, found {}", nodes.len()).into()),
        }
    }

    pub fn into_node_refs(self) -> Result<Vec<NodeRef>, TransformError> {
        Ok(match self {
            ChildValue::Absent => vec![],
            ChildValue::One(node) => vec![node],
            ChildValue::Many(nodes) => nodes,
        })
    }
}

pub(crate) fn expect_node_type<T: Node>(node: NodeRef) -> Result<Rc<T>, TransformError> {
    downcast_node::<T>(node).map_err(|node| TransformError::UnexpectedNodeType {
        expected: type_name::<T>().to_string(),
        found: node.node_type().to_string(),
    })
}

pub(crate) struct ChildRule<S, D> {
    pub(crate) label: String,
    pub(crate) getter: Getter<S>,
    pub(crate) setter: Setter<D>,
}

/* Factories */

/// How to build a `D` out of an `S`. Returned by the registration methods so child rules can be added fluently.
pub struct NodeFactory<S, D> {
    pub(crate) label: Option<String>,
    pub(crate) constructor: Constructor<S, D>,
    pub(crate) children: Vec<ChildRule<S, D>>,
    pub(crate) finalizer: Option<Finalizer<D>>,
    pub(crate) skip_children: bool,
}

impl<S: Node, D: Node> NodeFactory<S, D> {
    /// After construction, the feature of `D` named `label` is filled in by transforming whatever `getter` returns and
    /// passing the result to `setter`. The feature's multiplicity decides how absent or repeated children are treated.
    ///
    /// # Panics
    ///
    /// If a child rule for `label` was already added to this factory.
    pub fn with_child<G, P>(&mut self, getter: G, setter: P, label: &str) -> &mut Self
    where
        G: for<'s> Fn(&'s S) -> ChildSource<'s> + 'static,
        P: Fn(&mut D, ChildValue) -> Result<(), TransformError> + 'static,
    {
        assert!(
            self.children.iter().all(|rule| rule.label != label),
            "Child `{label}` of {} is wired more than once",
            type_name::<D>()
        );

        self.children.push(ChildRule { label: label.to_string(), getter: Box::new(getter), setter: Box::new(setter) });
        self
    }

    /// Runs once the children are wired, before the node is handed to its parent.
    pub fn with_finalizer<F>(&mut self, finalizer: F) -> &mut Self
    where
        F: Fn(&mut D, &mut Transformation<'_>) -> Result<(), TransformError> + 'static,
    {
        self.finalizer = Some(Box::new(finalizer));
        self
    }

    /// The constructor builds the whole node; child rules are ignored.
    pub fn skip_children(&mut self) -> &mut Self {
        self.skip_children = true;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn child_labels(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|rule| rule.label.as_str())
    }
}

/// A factory with its source and destination types erased, so factories for different types can share a map.
pub(crate) trait ErasedFactory {
    fn produce(&self, source: &dyn Node, transformation: &mut Transformation<'_>) -> Result<NodeRef, TransformError>;

    fn destination_type(&self) -> &'static str;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/* Registry */

/// Maps source node types to factories. Lookup is by exact [`Node::node_type`]; there is no fallback to related types.
#[derive(Default)]
pub struct NodeFactoryRegistry {
    factories: HashMap<String, Box<dyn ErasedFactory>>,
}

impl NodeFactoryRegistry {
    pub fn new() -> NodeFactoryRegistry {
        NodeFactoryRegistry::default()
    }

    /// Registers a factory for source type `S`, keyed by its type name (the key [`crate::impl_node`] uses). Replaces
    /// any factory already registered for `S`.
    pub fn register<S, D, F>(&mut self, constructor: F) -> &mut NodeFactory<S, D>
    where
        S: Node,
        D: Node,
        F: Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        self.register_keyed(type_name::<S>(), None, constructor)
    }

    /// Same as [`NodeFactoryRegistry::register`], with a description of the factory for diagnostics.
    pub fn register_labelled<S, D, F>(&mut self, label: &str, constructor: F) -> &mut NodeFactory<S, D>
    where
        S: Node,
        D: Node,
        F: Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        self.register_keyed(type_name::<S>(), Some(label), constructor)
    }

    /// Registers under an explicit node type. Needed for node types whose `node_type` is not their Rust type name,
    /// such as parse tree rules.
    pub fn register_keyed<S, D, F>(&mut self, key: impl Into<String>, label: Option<&str>, constructor: F) -> &mut NodeFactory<S, D>
    where
        S: Node,
        D: Node,
        F: Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        let key = key.into();

        let factory: NodeFactory<S, D> = NodeFactory {
            label: label.map(str::to_string),
            constructor: Box::new(constructor),
            children: vec![],
            finalizer: None,
            skip_children: false,
        };

        if self.factories.insert(key.clone(), Box::new(factory)).is_some() {
            debug!(source = %key, destination = type_name::<D>(), "replaced factory");
        } else {
            debug!(source = %key, destination = type_name::<D>(), "registered factory");
        }

        self.factories
            .get_mut(&key)
            .and_then(|factory| factory.as_any_mut().downcast_mut::<NodeFactory<S, D>>())
            .expect("Factory was just inserted with this type")
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// The type produced by the factory registered for `node_type`.
    pub fn destination_of(&self, node_type: &str) -> Option<&'static str> {
        self.factories.get(node_type).map(|factory| factory.destination_type())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn get(&self, node_type: &str) -> Option<&dyn ErasedFactory> {
        self.factories.get(node_type).map(|factory| &**factory)
    }
}

impl std::fmt::Debug for NodeFactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.factories.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("NodeFactoryRegistry").field("sources", &keys).finish()
    }
}
