use std::any::Any;
use std::rc::Rc;

use super::{Feature, Node, NodeData};

/// Stands in for a source node that had no factory. It mirrors the source's original features: attributes are
/// copied, children are the transformed source children, and references keep only their names.
#[derive(Debug)]
pub struct GenericNode {
    pub node_data: NodeData,
    /// The `node_type` of the source node this was made from.
    pub source_type: String,
    pub features: Vec<Feature>,
}

impl GenericNode {
    pub fn new(source_type: impl Into<String>, features: Vec<Feature>) -> GenericNode {
        GenericNode { node_data: NodeData::new(), source_type: source_type.into(), features }
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.name == name)
    }
}

impl Node for GenericNode {
    fn node_type(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn declared_features(&self) -> Vec<Feature> {
        self.features.clone()
    }

    fn node_data(&self) -> &NodeData {
        &self.node_data
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
