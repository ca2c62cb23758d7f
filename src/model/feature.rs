//! Feature descriptions, and the traits that let a field's Rust type decide how it is classified.
//!
//! A field of type `E` where `E: FeatureElement` is singular, `Option<E>` is optional (or singular when tagged
//! mandatory), and `Vec<E>` is many. The element type picks the classification: nodes are containments,
//! [`ReferenceByName`] is a reference, and everything else is an attribute.

use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use std::rc::Rc;

use super::{Node, NodeRef, ReferenceByName};

/* Descriptions */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Plain data.
    Attribute,
    /// Child nodes owned by this node.
    Containment,
    /// A named link to a node elsewhere in the tree. Never owned.
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    Singular,
    Optional,
    Many,
}

/// The static type of a feature's elements. For references this is the referenced node type, not the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescription {
    pub name: &'static str,
    pub id: TypeId,
}

impl TypeDescription {
    pub fn of<T: ?Sized + Any>() -> TypeDescription {
        TypeDescription { name: type_name::<T>(), id: TypeId::of::<T>() }
    }

    /// The last path segment of the type name, e.g. `Sum` for `my_crate::ast::Sum`.
    pub fn simple_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

/// Attribute values, flattened into a handful of shapes so that tools can display and compare them without knowing
/// the node type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// User enums, rendered through their `Debug` output. See [`crate::impl_attribute`].
    Symbol(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => f.write_str(s),
        }
    }
}

/// A snapshot of a reference: the name it was written with, and its target if it has been resolved.
#[derive(Debug, Clone)]
pub struct ReferenceValue {
    pub name: String,
    pub target: Option<NodeRef>,
}

#[derive(Debug, Clone)]
pub enum ElementValue {
    Attribute(Value),
    Node(NodeRef),
    Reference(ReferenceValue),
}

#[derive(Debug, Clone)]
pub enum FeatureValue {
    Absent,
    One(ElementValue),
    Many(Vec<ElementValue>),
}

/// One structural member of a node, as it was at the moment it was described. Descriptions are never cached, so
/// describing a node again after mutating it gives fresh values.
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub classification: Classification,
    pub multiplicity: Multiplicity,
    pub value: FeatureValue,
    /// Derived features are computed from other features. They are skipped by structural equality and traversal.
    pub derived: bool,
    pub declared_type: TypeDescription,
}

/// Metadata attached to a field in [`crate::impl_node`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureTags {
    pub derived: bool,
    pub mandatory: bool,
}

impl Feature {
    pub fn singular<E: FeatureElement>(element: &E, name: &str, tags: FeatureTags) -> Feature {
        Feature::of_element::<E>(name, Multiplicity::Singular, FeatureValue::One(element.element_value()), tags)
    }

    pub fn optional<E: FeatureElement>(element: Option<&E>, name: &str, tags: FeatureTags) -> Feature {
        // Tagging an optional field mandatory promises it is filled in by the time anyone looks.
        let multiplicity = if tags.mandatory { Multiplicity::Singular } else { Multiplicity::Optional };
        let value = match element {
            Some(element) => FeatureValue::One(element.element_value()),
            None => FeatureValue::Absent,
        };
        Feature::of_element::<E>(name, multiplicity, value, tags)
    }

    pub fn many<E: FeatureElement>(elements: &[E], name: &str, tags: FeatureTags) -> Feature {
        let values = elements.iter().map(FeatureElement::element_value).collect();
        Feature::of_element::<E>(name, Multiplicity::Many, FeatureValue::Many(values), tags)
    }

    fn of_element<E: FeatureElement>(name: &str, multiplicity: Multiplicity, value: FeatureValue, tags: FeatureTags) -> Feature {
        Feature {
            name: name.to_string(),
            classification: E::CLASSIFICATION,
            multiplicity,
            value,
            derived: tags.derived,
            declared_type: E::declared_type(),
        }
    }

    pub fn is_attribute(&self) -> bool {
        self.classification == Classification::Attribute
    }

    pub fn is_containment(&self) -> bool {
        self.classification == Classification::Containment
    }

    pub fn is_reference(&self) -> bool {
        self.classification == Classification::Reference
    }

    pub fn is_many(&self) -> bool {
        self.multiplicity == Multiplicity::Many
    }

    /// The nodes held by this feature, in order. Empty unless this is a containment.
    pub fn nodes(&self) -> Vec<NodeRef> {
        let node_of = |element: &ElementValue| match element {
            ElementValue::Node(node) => Some(Rc::clone(node)),
            _ => None,
        };

        match &self.value {
            FeatureValue::Absent => vec![],
            FeatureValue::One(element) => node_of(element).into_iter().collect(),
            FeatureValue::Many(elements) => elements.iter().filter_map(node_of).collect(),
        }
    }

    /// Renders the value without any knowledge of the node type. Child nodes are shown by type only.
    pub fn value_to_string(&self) -> String {
        match &self.value {
            FeatureValue::Absent => "<absent>".to_string(),
            FeatureValue::One(element) => element_to_string(element),
            FeatureValue::Many(elements) => {
                format!("[{}]", elements.iter().map(element_to_string).collect::<Vec<_>>().join(", "))
            }
        }
    }
}

fn element_to_string(element: &ElementValue) -> String {
    match element {
        ElementValue::Attribute(value) => value.to_string(),
        ElementValue::Node(node) => node.simple_type_name().to_string(),
        ElementValue::Reference(ReferenceValue { name, target }) => {
            let state = if target.is_some() { "resolved" } else { "unresolved" };
            format!("ref({name}, {state})")
        }
    }
}

/* Classification by type */

/// A type that can be held by a feature, either alone or inside an `Option` or `Vec`.
pub trait FeatureElement {
    const CLASSIFICATION: Classification;

    fn declared_type() -> TypeDescription;

    fn element_value(&self) -> ElementValue;
}

/// A field type that can describe itself as a feature.
pub trait FeatureType {
    fn describe(&self, name: &str, tags: FeatureTags) -> Feature;
}

impl<E: FeatureElement> FeatureType for Option<E> {
    fn describe(&self, name: &str, tags: FeatureTags) -> Feature {
        Feature::optional(self.as_ref(), name, tags)
    }
}

impl<E: FeatureElement> FeatureType for Vec<E> {
    fn describe(&self, name: &str, tags: FeatureTags) -> Feature {
        Feature::many(self, name, tags)
    }
}

macro_rules! singular_feature_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FeatureType for $ty {
                fn describe(&self, name: &str, tags: FeatureTags) -> Feature {
                    Feature::singular(self, name, tags)
                }
            }
        )*
    };
}

macro_rules! scalar_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FeatureElement for $ty {
                const CLASSIFICATION: Classification = Classification::Attribute;

                fn declared_type() -> TypeDescription {
                    TypeDescription::of::<$ty>()
                }

                fn element_value(&self) -> ElementValue {
                    ElementValue::Attribute(Value::$variant(From::from(self.clone())))
                }
            }

            singular_feature_type!($ty);
        )*
    };
}

scalar_element!(
    bool => Bool,
    char => Char,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => UInt,
    u16 => UInt,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Float,
    String => Text,
);

impl FeatureElement for isize {
    const CLASSIFICATION: Classification = Classification::Attribute;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<isize>()
    }

    fn element_value(&self) -> ElementValue {
        ElementValue::Attribute(Value::Int(*self as i64))
    }
}

impl FeatureElement for usize {
    const CLASSIFICATION: Classification = Classification::Attribute;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<usize>()
    }

    fn element_value(&self) -> ElementValue {
        ElementValue::Attribute(Value::UInt(*self as u64))
    }
}

impl FeatureElement for &'static str {
    const CLASSIFICATION: Classification = Classification::Attribute;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<&'static str>()
    }

    fn element_value(&self) -> ElementValue {
        ElementValue::Attribute(Value::Text((*self).to_string()))
    }
}

singular_feature_type!(isize, usize, &'static str, NodeRef);

impl<T: Node> FeatureElement for Rc<T> {
    const CLASSIFICATION: Classification = Classification::Containment;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<T>()
    }

    fn element_value(&self) -> ElementValue {
        let node: NodeRef = Rc::<T>::clone(self);
        ElementValue::Node(node)
    }
}

impl<T: Node> FeatureType for Rc<T> {
    fn describe(&self, name: &str, tags: FeatureTags) -> Feature {
        Feature::singular(self, name, tags)
    }
}

/// Children whose type is only known at runtime.
impl FeatureElement for NodeRef {
    const CLASSIFICATION: Classification = Classification::Containment;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<dyn Node>()
    }

    fn element_value(&self) -> ElementValue {
        ElementValue::Node(Rc::clone(self))
    }
}

impl<T: Node> FeatureElement for ReferenceByName<T> {
    const CLASSIFICATION: Classification = Classification::Reference;

    fn declared_type() -> TypeDescription {
        TypeDescription::of::<T>()
    }

    fn element_value(&self) -> ElementValue {
        ElementValue::Reference(ReferenceValue {
            name: self.name.clone(),
            target: self.referred().map(|target| target as NodeRef),
        })
    }
}

impl<T: Node> FeatureType for ReferenceByName<T> {
    fn describe(&self, name: &str, tags: FeatureTags) -> Feature {
        Feature::singular(self, name, tags)
    }
}

/// Lets enums (or any `Debug` type) be used as attribute fields in [`crate::impl_node`]. The value is recorded as a
/// [`Value::Symbol`] holding the `Debug` output.
#[macro_export]
macro_rules! impl_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::model::FeatureElement for $ty {
                const CLASSIFICATION: $crate::model::Classification = $crate::model::Classification::Attribute;

                fn declared_type() -> $crate::model::TypeDescription {
                    $crate::model::TypeDescription::of::<$ty>()
                }

                fn element_value(&self) -> $crate::model::ElementValue {
                    $crate::model::ElementValue::Attribute($crate::model::Value::Symbol(format!("{:?}", self)))
                }
            }

            impl $crate::model::FeatureType for $ty {
                fn describe(&self, name: &str, tags: $crate::model::FeatureTags) -> $crate::model::Feature {
                    $crate::model::Feature::singular(self, name, tags)
                }
            }
        )+
    };
}
