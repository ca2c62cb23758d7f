//! Feature discovery: the `impl_node!` declaration macro, and validated access to the feature list.

use std::collections::HashSet;

use super::{Feature, Node};
use crate::error::ModelError;

/// Member names that belong to node bookkeeping. Members declared under these names are skipped, never described.
pub const RESERVED_NAMES: &[&str] = &["node_data", "parent"];

/// The declared features, minus any with a reserved name. Walks read children through this as well.
pub(crate) fn structural_features(node: &dyn Node) -> Vec<Feature> {
    node.declared_features()
        .into_iter()
        .filter(|feature| !RESERVED_NAMES.contains(&feature.name.as_str()))
        .collect()
}

/// Every feature of `node`, in declaration order, after checking the declaration is well formed.
pub fn describe_features(node: &dyn Node) -> Result<Vec<Feature>, ModelError> {
    let features = structural_features(node);

    let mut seen = HashSet::new();
    for feature in &features {
        if !seen.insert(feature.name.as_str()) {
            return Err(ModelError::DuplicateFeature {
                node_type: node.node_type().to_string(),
                name: feature.name.clone(),
            });
        }
    }

    Ok(features)
}

pub fn all_features(node: &dyn Node) -> Result<Vec<Feature>, ModelError> {
    describe_features(node)
}

/// Features that are not derived. These take part in equality and traversal.
pub fn original_features(node: &dyn Node) -> Result<Vec<Feature>, ModelError> {
    Ok(describe_features(node)?.into_iter().filter(|feature| !feature.derived).collect())
}

pub fn derived_features(node: &dyn Node) -> Result<Vec<Feature>, ModelError> {
    Ok(describe_features(node)?.into_iter().filter(|feature| feature.derived).collect())
}

/// Implements [`Node`] for a struct with a `node_data: NodeData` field.
///
/// List the fields that make up the node's structure in the braces. Each may be tagged:
/// - `#[derived]`: computed from other fields, so skipped by equality and traversal.
/// - `#[mandatory]`: an `Option` field that must be filled in, reported as singular.
/// - `#[internal]` or `#[link]`: not a feature at all (caches, back references). Same as leaving it out.
///
/// Methods computing derived features can be listed in a trailing `derived { ... }` block.
///
/// ```ignore
/// impl_node!(Function {
///     name,
///     params,
///     #[mandatory] body,
///     #[internal] cache,
/// } derived { arity });
/// ```
#[macro_export]
macro_rules! impl_node {
    ($node:ident { $( $(#[$tag:ident])* $field:ident ),* $(,)? } $( derived { $( $method:ident ),* $(,)? } )?) => {
        impl $crate::model::Node for $node {
            fn node_type(&self) -> &str {
                ::std::any::type_name::<Self>()
            }

            #[allow(unused_mut, unused_variables)]
            fn declared_features(&self) -> ::std::vec::Vec<$crate::model::Feature> {
                let node = self;
                let mut features = ::std::vec::Vec::new();
                $(
                    $crate::__describe_field!(features, node, $field; [] $($tag)*);
                )*
                $($(
                    features.push($crate::model::FeatureType::describe(
                        &node.$method(),
                        stringify!($method),
                        $crate::model::FeatureTags { derived: true, mandatory: false },
                    ));
                )*)?
                features
            }

            fn node_data(&self) -> &$crate::model::NodeData {
                &self.node_data
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::rc::Rc<Self>) -> ::std::rc::Rc<dyn ::std::any::Any> {
                self
            }
        }
    };
}

/// Munches the tags of one field. Excluded fields produce nothing, the rest push a feature.
#[doc(hidden)]
#[macro_export]
macro_rules! __describe_field {
    ($features:ident, $node:ident, $field:ident; [$($seen:ident)*] internal $($rest:ident)*) => {};
    ($features:ident, $node:ident, $field:ident; [$($seen:ident)*] link $($rest:ident)*) => {};
    ($features:ident, $node:ident, $field:ident; [$($seen:ident)*] $tag:ident $($rest:ident)*) => {
        $crate::__describe_field!($features, $node, $field; [$($seen)* $tag] $($rest)*)
    };
    ($features:ident, $node:ident, $field:ident; [$($seen:ident)*]) => {
        $features.push($crate::model::FeatureType::describe(
            &$node.$field,
            stringify!($field),
            $crate::model::FeatureTags {
                derived: $crate::__has_tag!(derived; $($seen)*),
                mandatory: $crate::__has_tag!(mandatory; $($seen)*),
            },
        ))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __has_tag {
    ($wanted:ident;) => { false };
    (derived; derived $($rest:ident)*) => { true };
    (mandatory; mandatory $($rest:ident)*) => { true };
    ($wanted:ident; $other:ident $($rest:ident)*) => { $crate::__has_tag!($wanted; $($rest)*) };
}
