use serde::{Deserialize, Serialize};

use crate::registry::PropertyName;

/// Span information for source location tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span for nodes created by construction calls rather than a parser.
    pub const fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }
}

/// Value-level separator between terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorKind {
    Comma,
    Slash,
}

impl OperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Comma => ",",
            OperatorKind::Slash => "/",
        }
    }
}

/// A single term inside a property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TermKind {
    /// Bare identifier (`solid`, `flex-start`, `-webkit-box`).
    Word { text: String },

    /// Numeric term with an optional unit (`1`, `16px`, `100%`).
    Number { value: f64, unit: Option<String> },

    /// Function call; arguments live in the node's child collection.
    Function { name: String },

    /// Hash literal (`#ff0000`).
    Hash { text: String },

    /// Quoted string, stored with its quotes.
    Quoted { text: String },
}

/// Raw property text plus the structured form produced by refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationData {
    pub raw_name: String,
    pub raw_value: String,
    pub refined: Option<RefinedDeclaration>,
}

impl DeclarationData {
    pub fn new(raw_name: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            raw_value: raw_value.into(),
            refined: None,
        }
    }
}

/// Structured declaration form. The parsed value graph is the declaration
/// node's child collection; only the name and the important flag live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedDeclaration {
    pub name: PropertyName,
    pub important: bool,
}

/// The closed set of syntax-unit kinds handled by this library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Stylesheet root; rules and at-rules are its children.
    Root,

    /// Style rule with a raw selector; declarations are its children.
    Rule { selector: String },

    /// At-rule (`@keyframes spin`); an optional body is its child collection.
    AtRule { name: String, params: String },

    Declaration(DeclarationData),

    Term(TermKind),

    Operator(OperatorKind),
}

impl NodeKind {
    pub fn is_declaration(&self) -> bool {
        matches!(self, NodeKind::Declaration(_))
    }

    pub fn as_declaration(&self) -> Option<&DeclarationData> {
        match self {
            NodeKind::Declaration(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_declaration_mut(&mut self) -> Option<&mut DeclarationData> {
        match self {
            NodeKind::Declaration(data) => Some(data),
            _ => None,
        }
    }
}
