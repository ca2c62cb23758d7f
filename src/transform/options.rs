use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the engine treats source nodes without a factory, and whether faults stop the whole run.
///
/// Unmapped nodes are handled by the first policy that applies: the transformer's default transformation, a generic
/// node (`allow_generic_node`), a fatal error (`throw_on_unmapped_node`), or else an issue and an omitted subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformOptions {
    pub allow_generic_node: bool,
    pub throw_on_unmapped_node: bool,
    /// Turns unmapped node and missing child errors into issues, dropping the offending subtree.
    pub fault_tolerant: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions { allow_generic_node: true, throw_on_unmapped_node: false, fault_tolerant: false }
    }
}

impl TransformOptions {
    /// Every node must be mapped, and any fault ends the run.
    pub fn strict() -> TransformOptions {
        TransformOptions { allow_generic_node: false, throw_on_unmapped_node: true, fault_tolerant: false }
    }

    /// Produce whatever can be produced, reporting the rest as issues.
    pub fn tolerant() -> TransformOptions {
        TransformOptions { allow_generic_node: false, throw_on_unmapped_node: false, fault_tolerant: true }
    }

    /// Reads options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<TransformOptions, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}
