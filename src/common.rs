use std::fmt::{self, Write};

pub use vec1::vec1;

pub type Int = i64;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Byte range into the source text a node or token was read from.
pub type Span = std::ops::Range<usize>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pos => f.write_char('+'),
            Self::Neg => f.write_char('-'),
            Self::Not => f.write_str("not "),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Flr,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOperator {
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Eq | Self::Ne
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Flr => "//",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "and",
            Self::Or => "or",
        };
        f.write_str(s)
    }
}

/// Comparison used by dice selectors and conditional rerolls/explosions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Comparison {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
}

impl Comparison {
    pub fn test(self, lhs: Int, rhs: Int) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
            Self::Le => lhs <= rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            // Equality is written as a bare number
            Self::Eq => "",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Condition {
    pub cmp: Comparison,
    pub value: Int,
}

impl Condition {
    pub const fn new(cmp: Comparison, value: Int) -> Self {
        Self { cmp, value }
    }

    pub const fn equal_to(value: Int) -> Self {
        Self::new(Comparison::Eq, value)
    }

    pub fn matches(&self, x: Int) -> bool {
        self.cmp.test(x, self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.cmp, self.value)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Selector {
    Highest(usize),
    Lowest(usize),
    Matching(Condition),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}
