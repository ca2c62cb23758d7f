//! Typed abstract syntax trees that can describe themselves.
//!
//! Every node reports its structure as a list of [`Feature`]s (attributes, children, and references), which lets
//! generic code walk, compare, and search any tree without knowing its node types. On top of that sit lazy
//! traversals ([`traverse`]) and a registry driven transformation engine ([`transform`]) for turning one tree (often a
//! parse tree, see [`parse_tree`]) into another.
//!
//! Node types are usually declared with [`impl_node!`]:
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Assignment {
//!     node_data: NodeData,
//!     target: ReferenceByName<Variable>,
//!     value: NodeRef,
//! }
//!
//! impl_node!(Assignment { target, value });
//! ```

// I use `cargo clippy -- -D clippy::pedantic`
#![allow(
    clippy::missing_errors_doc,  // Every fallible function returns one of two error types.
    clippy::missing_panics_doc,  // Only on broken invariants.
    clippy::must_use_candidate,  // Noise on every getter.
    clippy::module_name_repetitions,  // `TransformError` in `transform` reads fine.
)]

pub mod error;
pub mod model;
pub mod parse_tree;
pub mod transform;
pub mod traverse;

mod util;

pub use error::{ConfigError, ModelError, TransformError};
pub use model::{Feature, Node, NodeData, NodeId, NodeRef, ReferenceByName, Span};
pub use transform::{Issue, TransformOptions, Transformer};
