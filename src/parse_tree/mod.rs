//! This module provides a wrapper around Parsley's syntax tree, so that a parse can be walked and transformed like any
//! other tree. Also has convenience functions for querying a parse node from inside a factory.
//!
//! Parse nodes are keyed by their rule name (or token kind), so factories for them are registered with
//! [`Transformer::register_rule`] rather than [`Transformer::register`].


use std::any::Any;
use std::rc::Rc;

use parsley::SyntaxTree as ST;

use crate::error::TransformError;
use crate::model::{adopt, Feature, FeatureTags, Node, NodeData, Span};
use crate::transform::{ChildSource, NodeFactory, Transformation, Transformer};

/// What a parse tree needs to know about a token.
pub trait ParseToken {
    /// Becomes the `node_type` of the token's node.
    fn kind(&self) -> String;

    fn text(&self) -> String;

    fn span(&self) -> Option<Span> {
        None
    }
}

#[derive(Debug)]
pub struct ParseNode {
    pub node_data: NodeData,
    /// The rule name for rule nodes, the token kind for token nodes.
    pub rule: String,
    /// Only token nodes have text.
    pub text: Option<String>,
    pub children: Vec<Rc<ParseNode>>,
}

impl ParseNode {
    /// Copies a syntax tree. Rule nodes span all of their tokens.
    pub fn from_syntax_tree<T>(tree: &ST<T>) -> Rc<ParseNode>
    where
        T: parsley::Token + ParseToken,
    {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || match tree {
            ST::RuleNode { rule_name, subexpressions } => {
                let children = subexpressions.iter().map(ParseNode::from_syntax_tree).collect::<Vec<_>>();

                let spans = children.iter().filter_map(|child| child.node_data.span()).collect::<Vec<_>>();
                let node_data = NodeData::new();
                if !spans.is_empty() {
                    node_data.set_span(Some(Span::combine_all(&spans)));
                }

                adopt(ParseNode { node_data, rule: rule_name.to_string(), text: None, children })
            }
            ST::TokenNode(token) => {
                let node_data = NodeData::new();
                node_data.set_span(token.span());

                adopt(ParseNode { node_data, rule: token.kind(), text: Some(token.text()), children: vec![] })
            }
        })
    }

    pub fn is_token(&self) -> bool {
        self.text.is_some()
    }

    /// The text of a token node. Rule nodes error instead.
    pub fn token_text(&self) -> Result<&str, TransformError> {
        match &self.text {
            Some(text) => Ok(text),
            None => Err(format!("Expected token node, found {} rule node instead", self.rule).into()),
        }
    }

    /// It is common to want the children of a rule node, and to want to assert its rule, at the start of a
    /// constructor. We combine this into one operation.
    pub fn assert_rule_get_children(&self, expected_rule: &str) -> Result<&[Rc<ParseNode>], TransformError> {
        if self.is_token() {
            Err(format!("Expected {expected_rule} node, found {} token node", self.rule).into())
        } else if self.rule != expected_rule {
            Err(format!("Expected {expected_rule} node, found {} node", self.rule).into())
        } else {
            Ok(&self.children)
        }
    }

    /// The first child with the given rule or token kind.
    pub fn child_rule(&self, rule: &str) -> Option<&Rc<ParseNode>> {
        self.children.iter().find(|child| child.rule == rule)
    }

    pub fn children_of_rule<'a, 'r>(&'a self, rule: &'r str) -> impl Iterator<Item = &'a Rc<ParseNode>> + use<'a, 'r> {
        self.children.iter().filter(move |child| child.rule == rule)
    }

    /// For child getters: the first child of the given rule, if any.
    pub fn child_source(&self, rule: &str) -> ChildSource<'_> {
        ChildSource::optional(self.child_rule(rule).map(|child| &**child as &dyn Node))
    }

    /// For child getters: every child of the given rule.
    pub fn children_source(&self, rule: &str) -> ChildSource<'_> {
        ChildSource::Many(self.children_of_rule(rule).map(|child| &**child as &dyn Node).collect())
    }

    /// Tests whether this is a token with exactly this text.
    pub fn holds(&self, text: &str) -> bool {
        self.text.as_deref() == Some(text)
    }

    /// Assertion form of holds, which yields an error if holds is not true.
    pub fn expect_holds(&self, text: &str) -> Result<(), TransformError> {
        if self.holds(text) {
            Ok(())
        } else {
            Err(format!("Expected {text}").into())
        }
    }
}

impl Node for ParseNode {
    fn node_type(&self) -> &str {
        &self.rule
    }

    fn declared_features(&self) -> Vec<Feature> {
        vec![
            Feature::optional(self.text.as_ref(), "text", FeatureTags::default()),
            Feature::many(&self.children, "children", FeatureTags::default()),
        ]
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

impl Transformer {
    /// Registers a factory for parse nodes of one rule (or token kind). Replaces any factory already registered for
    /// that rule.
    pub fn register_rule<D, F>(&mut self, rule: &str, constructor: F) -> &mut NodeFactory<ParseNode, D>
    where
        D: Node,
        F: Fn(&ParseNode, &mut Transformation<'_>) -> Result<D, TransformError> + 'static,
    {
        self.registry_mut().register_keyed(rule, Some(rule), constructor)
    }
}
