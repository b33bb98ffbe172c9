use super::lexer::TokenKind;
use crate::common::Span;
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub slice: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
    },
    UnexpectedEnd {
        expected: Vec<TokenKind>,
    },
    InvalidToken,
    EmptyAnnotation,
    InvalidDiceNotation(String),
    NumberOutOfRange,
    LoopControlOutsideLoop(TokenKind),
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of input, expected ")?;
                fmt_expected(expected, f)
            }
            Self::InvalidToken => f.write_str("unrecognized input"),
            Self::EmptyAnnotation => f.write_str("annotations cannot be empty"),
            Self::InvalidDiceNotation(why) => write!(f, "invalid dice notation: {}", why),
            Self::NumberOutOfRange => f.write_str("number out of range"),
            Self::LoopControlOutsideLoop(kind) => write!(f, "{} outside of a loop", kind),
            Self::NestingTooDeep { limit } => {
                write!(f, "expression nested more than {} levels deep", limit)
            }
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let len = expected.len();

    if expected.is_empty() {
        f.write_str("nothing")
    } else if len == 1 {
        f.write_str(expected[0].as_str())
    } else if len == 2 {
        write!(f, "{} or {}", expected[0], expected[1])
    } else {
        for exp in &expected[..len - 1] {
            write!(f, "{}, ", exp)?;
        }
        write!(f, "or {}", expected[len - 1])
    }
}
