use super::roller::SourceError;
use crate::budget::BudgetError;
use crate::common::Int;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("invalid dice {count}d{sides}: {bound}")]
    InvalidDice {
        count: Int,
        sides: Int,
        bound: DiceBound,
    },
    #[error("a die was rerolled more than {limit} times")]
    RerollLimitExceeded { limit: u32 },
    #[error("exploding dice grew past {limit} dice")]
    ExplodeLimitExceeded { limit: u32 },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
}

/// Which dice parameter was out of range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiceBound {
    NonPositiveCount,
    NonPositiveSides,
    TooManyDice { max: u32 },
    TooManySides { max: u32 },
    /// `mi`/`ma` outside `1..=max`.
    ClampOutOfRange { value: Int, max: u32 },
}

impl fmt::Display for DiceBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveCount => f.write_str("at least one die must be rolled"),
            Self::NonPositiveSides => f.write_str("dice must have at least one side"),
            Self::TooManyDice { max } => write!(f, "at most {} dice may be rolled at once", max),
            Self::TooManySides { max } => write!(f, "dice may have at most {} sides", max),
            Self::ClampOutOfRange { value, max } => {
                write!(f, "cannot clamp dice to {}, expected 1 to {}", value, max)
            }
        }
    }
}
