//! Tree transformation. A [`Transformer`] holds a registry of node factories and turns a source tree (for example a
//! parse tree) into a destination tree, collecting [`Issue`]s along the way.
//!
//! ```ignore
//! let mut transformer = Transformer::new(TransformOptions::default());
//!
//! transformer
//!     .register(|_: &SourceSum, _| Ok(Sum { node_data: NodeData::new(), left: None, right: None }))
//!     .with_child(|s| ChildSource::one(&*s.left), |d, v| { d.left = v.into_optional_ref()?; Ok(()) }, "left")
//!     .with_child(|s| ChildSource::one(&*s.right), |d, v| { d.right = v.into_optional_ref()?; Ok(()) }, "right");
//!
//! let mut issues = vec![];
//! let ast = transformer.transform(&*parse_tree, &mut issues)?;
//! ```


mod engine;
mod factory;
mod issue;
mod options;

use tracing::debug;

use crate::error::TransformError;
use crate::model::{Node, NodeRef};

pub use engine::Transformation;
pub use factory::{ChildSource, ChildValue, NodeFactory, NodeFactoryRegistry};
pub use issue::{Issue, IssueSeverity, IssueType};
pub use options::TransformOptions;

/// Called for source nodes without a factory, before any other unmapped node policy.
pub type DefaultTransformation = dyn Fn(&dyn Node, &mut Transformation<'_>) -> Result<Vec<NodeRef>, TransformError>;

#[derive(Default)]
pub struct Transformer {
    registry: NodeFactoryRegistry,
    options: TransformOptions,
    default_transformation: Option<Box<DefaultTransformation>>,
}

impl Transformer {
    pub fn new(options: TransformOptions) -> Transformer {
        Transformer { registry: NodeFactoryRegistry::new(), options, default_transformation: None }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn registry(&self) -> &NodeFactoryRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeFactoryRegistry {
        &mut self.registry
    }

    /// See [`NodeFactoryRegistry::register`].
    pub fn register<S, D, F>(&mut self, constructor: F) -> &mut NodeFactory<S, D>
    where
        S: Node,
        D: Node,
        F: Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        self.registry.register(constructor)
    }

    /// See [`NodeFactoryRegistry::register_labelled`].
    pub fn register_labelled<S, D, F>(&mut self, label: &str, constructor: F) -> &mut NodeFactory<S, D>
    where
        S: Node,
        D: Node,
        F: Fn(&S, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        self.registry.register_labelled(label, constructor)
    }

    pub fn set_default_transformation<F>(&mut self, default_transformation: F) -> &mut Self
    where
        F: Fn(&dyn Node, &mut Transformation<'_>) -> Result<Vec<NodeRef>, TransformError> + 'static,
    {
        self.default_transformation = Some(Box::new(default_transformation));
        self
    }

    pub(crate) fn default_transformation(&self) -> Option<&DefaultTransformation> {
        self.default_transformation.as_deref()
    }

    /// Transforms a whole tree. Issues found anywhere in the tree are appended to `issues`.
    ///
    /// Returns `None` when the root itself was dropped (see [`TransformOptions`]).
    pub fn transform(&self, source: &dyn Node, issues: &mut Vec<Issue>) -> Result<Option<NodeRef>, TransformError> {
        debug!(root = source.node_type(), "starting transformation");
        let result = Transformation::new(self, issues).transform(source);
        debug!(issues = issues.len(), succeeded = result.is_ok(), "finished transformation");
        result
    }

    /// Like [`Transformer::transform`], for roots that may become several nodes.
    pub fn transform_into_nodes(&self, source: &dyn Node, issues: &mut Vec<Issue>) -> Result<Vec<NodeRef>, TransformError> {
        Transformation::new(self, issues).transform_into_nodes(source)
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("has_default_transformation", &self.default_transformation.is_some())
            .finish()
    }
}
