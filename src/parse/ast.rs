use crate::common::*;
use crate::roll::Modifier;
use std::fmt;

/// A parsed script. Owns its source so that it can be cached and shared
/// between evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub source: String,
    pub body: Vec<Node>,
    /// Free text trailing a lone dice expression.
    pub comment: Option<String>,
}

impl Program {
    pub(crate) fn new(source: impl Into<String>, body: Vec<Node>) -> Self {
        Self {
            source: source.into(),
            body,
            comment: None,
        }
    }

    pub(crate) fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn slice(&self, span: &Span) -> &str {
        self.source.get(span.clone()).unwrap_or_default()
    }

    /// True when the program is one expression built only from literals,
    /// dice, arithmetic, comparisons, grouping and annotations.
    pub fn is_dice_expression(&self) -> bool {
        match self.body.as_slice() {
            [node] => super::visit::is_dice_expression(node),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal(Literal),
    Dice(DiceTerm),
    Unary(UnaryOperator, Box<Node>),
    Binary(Box<Node>, BinaryOperator, Box<Node>),
    Grouping(Box<Node>),
    Annotated(Box<Node>, Vec<String>),
    Identifier(String),
    Call {
        name: String,
        args: Vec<Node>,
    },
    If {
        condition: Box<Node>,
        then: Block,
        otherwise: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Block,
    },
    For {
        var: String,
        start: Box<Node>,
        end: Box<Node>,
        body: Block,
    },
    Assign {
        target: String,
        op: Option<BinaryOperator>,
        value: Box<Node>,
    },
    Block(Block),
    Break,
    Continue,
    Return(Option<Box<Node>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(Int),
    Float(Float),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub body: Vec<Node>,
}

/// `NdM` followed by its modifiers, in source order.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DiceTerm {
    pub count: Int,
    pub sides: Int,
    pub modifiers: Vec<Modifier>,
}

impl DiceTerm {
    pub fn new(count: Int, sides: Int, modifiers: Vec<Modifier>) -> Self {
        Self {
            count,
            sides,
            modifiers,
        }
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        for modifier in &self.modifiers {
            write!(f, "{}", modifier)?;
        }
        Ok(())
    }
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn new_literal(x: impl Into<Literal>, span: Span) -> Self {
        Self::new(NodeKind::Literal(x.into()), span)
    }

    pub fn new_unary(op: UnaryOperator, operand: Node, span: Span) -> Self {
        Self::new(NodeKind::Unary(op, Box::new(operand)), span)
    }

    /// Spans from the start of `lhs` to the end of `rhs`.
    pub fn new_binary(lhs: Node, op: BinaryOperator, rhs: Node) -> Self {
        let span = lhs.span.start..rhs.span.end;
        Self::new(NodeKind::Binary(Box::new(lhs), op, Box::new(rhs)), span)
    }

    pub fn new_grouping(inner: Node, span: Span) -> Self {
        Self::new(NodeKind::Grouping(Box::new(inner)), span)
    }

    pub fn new_annotated(inner: Node, annotations: Vec<String>, span: Span) -> Self {
        Self::new(NodeKind::Annotated(Box::new(inner), annotations), span)
    }
}

impl From<Int> for Literal {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Literal {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Literal {
    fn from(x: bool) -> Self {
        Self::Boolean(x)
    }
}

impl From<&str> for Literal {
    fn from(x: &str) -> Self {
        Self::String(x.to_string())
    }
}
