//! Runs factories against a source tree.
//!
//! Each source node goes through: resolve its factory, construct the destination, wire the children, finalize. A node
//! with no factory falls to the unmapped policy instead. Errors that fault tolerant mode may recover from are turned
//! into issues at the node that raised them, which drops that node's subtree and nothing else.

use std::any::type_name;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::factory::{expect_node_type, ChildSource, ChildValue, ErasedFactory, NodeFactory};
use super::{Issue, IssueSeverity, TransformOptions, Transformer};
use crate::error::TransformError;
use crate::model::{
    adopt, original_features, ElementValue, Feature, FeatureValue, GenericNode, Multiplicity, Node, NodeRef,
    ReferenceValue,
};
use crate::util::OutStream;

const RED_ZONE: usize = 32 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// The state of one transformation run. Constructors, setters, and finalizers receive it so they can transform nested
/// source nodes themselves and report issues.
pub struct Transformation<'a> {
    transformer: &'a Transformer,
    issues: OutStream<'a, Issue>,
}

impl<'a> Transformation<'a> {
    pub(crate) fn new(transformer: &'a Transformer, issues: &'a mut Vec<Issue>) -> Transformation<'a> {
        Transformation { transformer, issues: OutStream::new(issues) }
    }

    pub fn options(&self) -> &TransformOptions {
        self.transformer.options()
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Issues reported so far in this run, counting any the caller's list already held.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Transforms `source` into at most one node.
    pub fn transform(&mut self, source: &dyn Node) -> Result<Option<NodeRef>, TransformError> {
        let mut nodes = self.transform_into_nodes(source)?;

        match nodes.len() {
            0 | 1 => Ok(nodes.pop()),
            count => Err(TransformError::MultipleNodesProduced { node_type: source.node_type().to_string(), count }),
        }
    }

    /// Transforms `source` into exactly one node.
    pub fn transform_required(&mut self, source: &dyn Node) -> Result<NodeRef, TransformError> {
        self.transform(source)?.ok_or_else(|| TransformError::NoNodeProduced { node_type: source.node_type().to_string() })
    }

    /// Transforms `source` into exactly one node of type `T`.
    pub fn transform_as<T: Node>(&mut self, source: &dyn Node) -> Result<Rc<T>, TransformError> {
        expect_node_type(self.transform_required(source)?)
    }

    /// Transforms each source in order, keeping every node produced. All must be of type `T`.
    pub fn transform_all<T: Node, N: Node>(&mut self, sources: &[Rc<N>]) -> Result<Vec<Rc<T>>, TransformError> {
        let mut nodes = Vec::new();

        for source in sources {
            for node in self.transform_into_nodes(&**source)? {
                nodes.push(expect_node_type(node)?);
            }
        }

        Ok(nodes)
    }

    /// Transforms `source` into any number of nodes. This is where fault tolerant mode catches recoverable errors.
    pub fn transform_into_nodes(&mut self, source: &dyn Node) -> Result<Vec<NodeRef>, TransformError> {
        match self.transform_node(source) {
            Err(fault) if fault.is_recoverable() && self.options().fault_tolerant => {
                warn!(source = source.node_type(), %fault, "dropping subtree");
                self.add_issue(Issue::semantic(fault.to_string(), IssueSeverity::Error, source.span()));
                Ok(vec![])
            }
            result => result,
        }
    }

    fn transform_node(&mut self, source: &dyn Node) -> Result<Vec<NodeRef>, TransformError> {
        stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
            let transformer = self.transformer;

            match transformer.registry().get(source.node_type()) {
                Some(factory) => {
                    trace!(source = source.node_type(), destination = factory.destination_type(), "transforming");
                    Ok(vec![factory.produce(source, self)?])
                }
                None => self.unmapped(source),
            }
        })
    }

    /* Unmapped Nodes */

    fn unmapped(&mut self, source: &dyn Node) -> Result<Vec<NodeRef>, TransformError> {
        let transformer = self.transformer;

        if let Some(default_transformation) = transformer.default_transformation() {
            debug!(source = source.node_type(), "applying default transformation");
            let nodes = default_transformation(source, self)?;
            for node in &nodes {
                record_origin(node, source);
            }
            return Ok(nodes);
        }

        let options = *transformer.options();

        if options.allow_generic_node {
            debug!(source = source.node_type(), "building generic node");
            return Ok(vec![self.generic_node(source)?]);
        }

        let fault = TransformError::UnmappedNode { node_type: source.node_type().to_string() };

        if options.throw_on_unmapped_node {
            return Err(fault);
        }

        debug!(source = source.node_type(), "skipping unmapped node");
        self.add_issue(Issue::semantic(fault.to_string(), IssueSeverity::Error, source.span()));
        Ok(vec![])
    }

    fn generic_node(&mut self, source: &dyn Node) -> Result<NodeRef, TransformError> {
        let mut features = Vec::new();

        for feature in original_features(source)? {
            let value = if feature.is_containment() {
                let mut nodes = Vec::new();
                for child in feature.nodes() {
                    nodes.extend(self.transform_into_nodes(&*child)?);
                }

                match feature.multiplicity {
                    Multiplicity::Many => FeatureValue::Many(nodes.into_iter().map(ElementValue::Node).collect()),
                    _ if nodes.len() > 1 => {
                        return Err(TransformError::MultipleNodesProduced {
                            node_type: source.node_type().to_string(),
                            count: nodes.len(),
                        })
                    }
                    _ => nodes.pop().map_or(FeatureValue::Absent, |node| FeatureValue::One(ElementValue::Node(node))),
                }
            } else if feature.is_reference() {
                unresolved(feature.value)
            } else {
                feature.value
            };

            features.push(Feature { value, ..feature });
        }

        self.add_issue(Issue::semantic(
            format!("no factory is registered for {}, kept as a generic node", source.node_type()),
            IssueSeverity::Warning,
            source.span(),
        ));

        let node: NodeRef = adopt(GenericNode::new(source.node_type(), features));
        record_origin(&node, source);
        Ok(node)
    }

    /* Child Wiring */

    /// Transforms the children a getter found, shaped by the multiplicity of the destination feature named `label`.
    /// Derived features are never wiring targets.
    fn wire_child(&mut self, destination: &dyn Node, label: &str, source: ChildSource<'_>) -> Result<ChildValue, TransformError> {
        let node_type = || destination.node_type().to_string();

        let feature = original_features(destination)?
            .into_iter()
            .find(|feature| feature.name == label)
            .ok_or_else(|| TransformError::UnknownFeature { node_type: node_type(), feature: label.to_string() })?;

        if !feature.is_containment() {
            return Err(TransformError::NotAContainment { node_type: node_type(), feature: label.to_string() });
        }

        let missing = || TransformError::MissingMandatoryChild { node_type: node_type(), feature: label.to_string() };
        let collection = || TransformError::UnexpectedCollection { node_type: node_type(), feature: label.to_string() };

        match (feature.multiplicity, source) {
            (Multiplicity::Many, source) => {
                let mut nodes = Vec::new();
                for child in source.into_nodes() {
                    nodes.extend(self.transform_into_nodes(child)?);
                }
                Ok(ChildValue::Many(nodes))
            }
            (_, ChildSource::Many(_)) => Err(collection()),
            (Multiplicity::Optional, ChildSource::Absent) => Ok(ChildValue::Absent),
            (Multiplicity::Optional, ChildSource::One(child)) => {
                Ok(self.transform(child)?.map_or(ChildValue::Absent, ChildValue::One))
            }
            (Multiplicity::Singular, ChildSource::Absent) => Err(missing()),
            (Multiplicity::Singular, ChildSource::One(child)) => {
                self.transform(child)?.map(ChildValue::One).ok_or_else(missing)
            }
        }
    }
}

fn unresolved(value: FeatureValue) -> FeatureValue {
    let strip = |element: ElementValue| match element {
        ElementValue::Reference(ReferenceValue { name, .. }) => ElementValue::Reference(ReferenceValue { name, target: None }),
        other => other,
    };

    match value {
        FeatureValue::Absent => FeatureValue::Absent,
        FeatureValue::One(element) => FeatureValue::One(strip(element)),
        FeatureValue::Many(elements) => FeatureValue::Many(elements.into_iter().map(strip).collect()),
    }
}

/// Produced nodes remember their source, and take its span unless they were given one.
fn record_origin(node: &NodeRef, source: &dyn Node) {
    let data = node.node_data();

    if data.origin().is_none() {
        data.set_origin(Some(source.id()));
    }

    if data.span().is_none() {
        data.set_span(source.span());
    }
}

/* Factory Execution */

impl<S: Node, D: Node> ErasedFactory for NodeFactory<S, D> {
    fn produce(&self, source: &dyn Node, transformation: &mut Transformation<'_>) -> Result<NodeRef, TransformError> {
        let typed = source.downcast_ref::<S>().ok_or_else(|| TransformError::SourceTypeMismatch {
            expected: type_name::<S>().to_string(),
            found: source.node_type().to_string(),
        })?;

        let mut node = (self.constructor)(typed, transformation)?;

        if !self.skip_children {
            self.wire_children(typed, &mut node, transformation)?;
        }

        if let Some(finalizer) = &self.finalizer {
            finalizer(&mut node, transformation)?;
        }

        let node: NodeRef = adopt(node);
        record_origin(&node, source);
        Ok(node)
    }

    fn destination_type(&self) -> &'static str {
        type_name::<D>()
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl<S: Node, D: Node> NodeFactory<S, D> {
    fn wire_children(&self, source: &S, destination: &mut D, transformation: &mut Transformation<'_>) -> Result<(), TransformError> {
        for rule in &self.children {
            let value = transformation.wire_child(&*destination, &rule.label, (rule.getter)(source))?;
            (rule.setter)(destination, value)?;
        }

        Ok(())
    }
}
