use super::{
    error::DiceBound,
    ops::{ApplyModifier, Maximum, Minimum, Modifier},
    result::{Die, RollResult},
    roller::Roller,
    RResult, RollError,
};
use crate::budget::Budget;
use crate::common::*;
use crate::config::ExecutionLimits;
use crate::parse::ast::DiceTerm;
use std::num::NonZeroU32;
use tracing::trace;

/// Rolls dice terms against a roll source, charging every die to the
/// evaluation's budget.
pub struct DiceContext<'a> {
    roller: &'a mut dyn Roller,
    budget: &'a mut Budget,
    limits: &'a ExecutionLimits,
}

impl<'a> DiceContext<'a> {
    pub fn new(
        roller: &'a mut dyn Roller,
        budget: &'a mut Budget,
        limits: &'a ExecutionLimits,
    ) -> Self {
        Self {
            roller,
            budget,
            limits,
        }
    }

    pub fn limits(&self) -> &ExecutionLimits {
        self.limits
    }

    /// Roll one die. Costs a step.
    pub fn roll_die(&mut self, sides: Int) -> RResult<Int> {
        self.budget.step()?;
        let faces = u32::try_from(sides)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(RollError::InvalidDice {
                count: 1,
                sides,
                bound: DiceBound::NonPositiveSides,
            })?;
        Ok(Int::from(self.roller.roll(faces)?))
    }

    fn validate(&self, term: &DiceTerm) -> RResult<()> {
        let bound = if term.count <= 0 {
            DiceBound::NonPositiveCount
        } else if term.sides <= 0 {
            DiceBound::NonPositiveSides
        } else if term.count > Int::from(self.limits.max_dice_count) {
            DiceBound::TooManyDice {
                max: self.limits.max_dice_count,
            }
        } else if term.sides > Int::from(self.limits.max_dice_sides) {
            DiceBound::TooManySides {
                max: self.limits.max_dice_sides,
            }
        } else if let Some(value) = term.modifiers.iter().find_map(|m| match *m {
            Modifier::Minimum(Minimum(n)) | Modifier::Maximum(Maximum(n))
                if !(1..=Int::from(self.limits.max_dice_sides)).contains(&n) =>
            {
                Some(n)
            }
            _ => None,
        }) {
            DiceBound::ClampOutOfRange {
                value,
                max: self.limits.max_dice_sides,
            }
        } else {
            return Ok(());
        };

        Err(RollError::InvalidDice {
            count: term.count,
            sides: term.sides,
            bound,
        })
    }

    /// Roll `term`, then apply its modifiers in source order.
    pub fn evaluate(&mut self, term: &DiceTerm) -> RResult<RollResult> {
        self.validate(term)?;
        self.budget.step()?;

        // `validate` bounds count by a u32
        let count = term.count as usize;
        let mut dice = Vec::with_capacity(count);
        for index in 0..count {
            let value = self.roll_die(term.sides)?;
            dice.push(Die::new(index, term.sides, value));
        }

        let mut ret = RollResult::new(term.count, term.sides, dice);
        for modifier in &term.modifiers {
            modifier.apply(self, &mut ret)?;
        }
        ret.retotal();

        trace!(term = %term, total = ret.total, dice = ret.dice.len(), "rolled dice term");
        Ok(ret)
    }
}
