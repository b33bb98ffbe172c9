use crate::budget::BudgetError;
use crate::common::Span;
use crate::context::ContextError;
use crate::parse::ParseError;
use crate::roll::{RollError, SourceError};
use thiserror::Error;

/// Everything that can go wrong while evaluating a script. Runtime
/// variants carry the span of the node that failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{source} (at {span:?})")]
    Roll { source: RollError, span: Span },
    #[error("{source} (at {span:?})")]
    Budget { source: BudgetError, span: Span },
    #[error("unknown identifier `{name}` (at {span:?})")]
    UnknownIdentifier { name: String, span: Span },
    #[error("`{name}` rejected its arguments: {source} (at {span:?})")]
    Context {
        name: String,
        source: ContextError,
        span: Span,
    },
    #[error("{message} (at {span:?})")]
    Type { message: String, span: Span },
    #[error("division by zero (at {span:?})")]
    ZeroDivision { span: Span },
}

/// Flat classification of [`Error`], for hosts that only need to branch on
/// what went wrong.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Parse,
    InvalidDice,
    RerollLimitExceeded,
    ExplodeLimitExceeded,
    ExhaustedSource,
    InvalidSource,
    UnknownIdentifier,
    BudgetExceeded,
    StackDepthExceeded,
    Timeout,
    MemoryExceeded,
    Context,
    Type,
    ZeroDivision,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Roll { source, .. } => match source {
                RollError::InvalidDice { .. } => ErrorKind::InvalidDice,
                RollError::RerollLimitExceeded { .. } => ErrorKind::RerollLimitExceeded,
                RollError::ExplodeLimitExceeded { .. } => ErrorKind::ExplodeLimitExceeded,
                RollError::Source(SourceError::Exhausted { .. }) => ErrorKind::ExhaustedSource,
                RollError::Source(SourceError::OutOfRange { .. }) => ErrorKind::InvalidSource,
                RollError::Budget(e) => budget_kind(e),
            },
            Self::Budget { source, .. } => budget_kind(source),
            Self::UnknownIdentifier { .. } => ErrorKind::UnknownIdentifier,
            Self::Context { .. } => ErrorKind::Context,
            Self::Type { .. } => ErrorKind::Type,
            Self::ZeroDivision { .. } => ErrorKind::ZeroDivision,
        }
    }

    /// Location in the source text, if the error has one.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Parse(e) => Some(&e.span),
            Self::Roll { span, .. }
            | Self::Budget { span, .. }
            | Self::UnknownIdentifier { span, .. }
            | Self::Context { span, .. }
            | Self::Type { span, .. }
            | Self::ZeroDivision { span } => Some(span),
        }
    }

    /// Move a runtime error to `to`. Used when an error raised inside a
    /// `roll("...")` string has to point at the call instead.
    pub(crate) fn relocate(self, to: &Span) -> Self {
        let span = to.clone();
        match self {
            Self::Parse(_) => self,
            Self::Roll { source, .. } => Self::Roll { source, span },
            Self::Budget { source, .. } => Self::Budget { source, span },
            Self::UnknownIdentifier { name, .. } => Self::UnknownIdentifier { name, span },
            Self::Context { name, source, .. } => Self::Context { name, source, span },
            Self::Type { message, .. } => Self::Type { message, span },
            Self::ZeroDivision { .. } => Self::ZeroDivision { span },
        }
    }

    pub(crate) fn from_roll(source: RollError, span: &Span) -> Self {
        match source {
            RollError::Budget(source) => Self::Budget {
                source,
                span: span.clone(),
            },
            source => Self::Roll {
                source,
                span: span.clone(),
            },
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, span: &Span) -> Self {
        Self::Type {
            message: message.into(),
            span: span.clone(),
        }
    }
}

fn budget_kind(e: &BudgetError) -> ErrorKind {
    match e {
        BudgetError::Steps { .. } => ErrorKind::BudgetExceeded,
        BudgetError::Depth { .. } => ErrorKind::StackDepthExceeded,
        BudgetError::Timeout { .. } => ErrorKind::Timeout,
        BudgetError::Memory { .. } => ErrorKind::MemoryExceeded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::DiceBound;

    #[test]
    fn test_kinds() {
        let e = Error::from_roll(RollError::Budget(BudgetError::Steps { limit: 5 }), &(0..3));
        assert_eq!(e.kind(), ErrorKind::BudgetExceeded);
        assert!(matches!(e, Error::Budget { .. }));

        let e = Error::from_roll(
            RollError::InvalidDice {
                count: 0,
                sides: 6,
                bound: DiceBound::NonPositiveCount,
            },
            &(0..3),
        );
        assert_eq!(e.kind(), ErrorKind::InvalidDice);

        let e = Error::Budget {
            source: BudgetError::Depth { limit: 64 },
            span: 0..1,
        };
        assert_eq!(e.kind(), ErrorKind::StackDepthExceeded);
    }

    #[test]
    fn test_relocate() {
        let e = Error::ZeroDivision { span: 2..5 }.relocate(&(10..20));
        assert_eq!(e.span(), Some(&(10..20)));
    }

    #[test]
    fn test_display_carries_limit() {
        let e = Error::Budget {
            source: BudgetError::Steps { limit: 100 },
            span: 0..4,
        };
        assert_eq!(e.to_string(), "step budget of 100 exhausted (at 0..4)");
    }
}
