//! Structural equality: same node type, and equal values for every original feature. Children are compared
//! recursively, references only by name.

use super::{original_features, ElementValue, FeatureValue, Node};

const RED_ZONE: usize = 32 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

pub fn structurally_equal(a: &dyn Node, b: &dyn Node) -> bool {
    structural_diff(a, b).is_none()
}

/// Describes the first difference found between `a` and `b`, as a path from `a` followed by what differs. `None` means
/// the trees are structurally equal.
pub fn structural_diff(a: &dyn Node, b: &dyn Node) -> Option<String> {
    diff_nodes(a, b, a.simple_type_name())
}

fn diff_nodes(a: &dyn Node, b: &dyn Node, path: &str) -> Option<String> {
    stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || {
        if a.node_type() != b.node_type() || a.as_any().type_id() != b.as_any().type_id() {
            return Some(format!("{path}: {} differs from {}", a.node_type(), b.node_type()));
        }

        let (left, right) = match (original_features(a), original_features(b)) {
            (Ok(left), Ok(right)) => (left, right),
            (Err(problem), _) | (_, Err(problem)) => return Some(format!("{path}: {problem}")),
        };

        if left.len() != right.len() {
            return Some(format!("{path}: {} features differ from {}", left.len(), right.len()));
        }

        left.iter().zip(&right).find_map(|(l, r)| {
            if l.name != r.name {
                return Some(format!("{path}: feature `{}` differs from `{}`", l.name, r.name));
            }

            diff_values(&l.value, &r.value, &format!("{path}.{}", l.name))
        })
    })
}

fn diff_values(l: &FeatureValue, r: &FeatureValue, path: &str) -> Option<String> {
    match (l, r) {
        (FeatureValue::Absent, FeatureValue::Absent) => None,
        (FeatureValue::One(x), FeatureValue::One(y)) => diff_elements(x, y, path),
        (FeatureValue::Many(xs), FeatureValue::Many(ys)) => {
            if xs.len() != ys.len() {
                return Some(format!("{path}: {} elements differ from {}", xs.len(), ys.len()));
            }

            xs.iter()
                .zip(ys)
                .enumerate()
                .find_map(|(i, (x, y))| diff_elements(x, y, &format!("{path}[{i}]")))
        }
        _ => Some(format!("{path}: {} differs from {}", shape(l), shape(r))),
    }
}

fn diff_elements(x: &ElementValue, y: &ElementValue, path: &str) -> Option<String> {
    match (x, y) {
        (ElementValue::Attribute(v), ElementValue::Attribute(w)) => {
            (v != w).then(|| format!("{path}: {v} differs from {w}"))
        }
        (ElementValue::Node(m), ElementValue::Node(n)) => diff_nodes(&**m, &**n, path),
        // Following the target could loop forever through cyclic references.
        (ElementValue::Reference(p), ElementValue::Reference(q)) => {
            (p.name != q.name).then(|| format!("{path}: reference to {} differs from {}", p.name, q.name))
        }
        _ => Some(format!("{path}: values of different kinds")),
    }
}

fn shape(value: &FeatureValue) -> &'static str {
    match value {
        FeatureValue::Absent => "absent",
        FeatureValue::One(_) => "a single value",
        FeatureValue::Many(_) => "a collection",
    }
}
