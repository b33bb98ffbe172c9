use super::{ctx::DiceContext, result::*, RResult, RollError};
use crate::common::*;
use std::fmt;

/// A post-processing step over the dice of one term. Modifiers run in the
/// order they are written and only look at dice that are still kept.
#[enum_dispatch::enum_dispatch]
pub trait ApplyModifier {
    fn apply(&self, ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()>;
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[enum_dispatch::enum_dispatch(ApplyModifier)]
pub enum Modifier {
    Keep(Keep),
    Drop(Drop),
    Reroll(Reroll),
    RerollOnce(RerollOnce),
    Explode(Explode),
    ExplodeOnce(ExplodeOnce),
    Minimum(Minimum),
    Maximum(Maximum),
    Sort(Sort),
}

/// Keep the selected dice, drop the rest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Keep(pub Selector);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Drop(pub Selector);

/// Reroll while the condition holds, `=1` when absent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Reroll(pub Option<Condition>);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RerollOnce(pub Option<Condition>);

/// Roll an extra die for each match, the highest face when absent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Explode(pub Option<Condition>);

/// Like [`Explode`], but the added dice never explode themselves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ExplodeOnce(pub Option<Condition>);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Minimum(pub Int);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Maximum(pub Int);

/// Reorders the dice for display. Totals are unaffected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Sort(pub SortOrder);

const REROLL_DEFAULT: Condition = Condition::equal_to(1);

impl ApplyModifier for Keep {
    fn apply(&self, _ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        let selected = select(&target.dice, &self.0);
        for (i, die) in target.dice.iter_mut().enumerate() {
            if die.kept && !selected.contains(&i) {
                die.drop();
            }
        }
        Ok(())
    }
}

impl ApplyModifier for Drop {
    fn apply(&self, _ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        for i in select(&target.dice, &self.0) {
            target.dice[i].drop();
        }
        Ok(())
    }
}

impl ApplyModifier for Reroll {
    fn apply(&self, ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        let cond = self.0.unwrap_or(REROLL_DEFAULT);
        let limit = ctx.limits().max_reroll_iterations;
        let mut rerolls = vec![0u32; target.dice.len()];

        // One reroll per offending die per pass, left to right
        loop {
            let offending = matching(&target.dice, &cond);
            if offending.is_empty() {
                return Ok(());
            }
            for i in offending {
                if rerolls[i] >= limit {
                    return Err(RollError::RerollLimitExceeded { limit });
                }
                rerolls[i] += 1;
                let value = ctx.roll_die(target.sides)?;
                target.dice[i].reroll(value);
            }
        }
    }
}

impl ApplyModifier for RerollOnce {
    fn apply(&self, ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        let cond = self.0.unwrap_or(REROLL_DEFAULT);
        for i in matching(&target.dice, &cond) {
            let value = ctx.roll_die(target.sides)?;
            target.dice[i].reroll(value);
        }
        Ok(())
    }
}

impl ApplyModifier for Explode {
    fn apply(&self, ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        let cond = self.0.unwrap_or(Condition::equal_to(target.sides));

        // Dice appended here are visited by the same walk
        let mut i = 0;
        while i < target.dice.len() {
            let die = &target.dice[i];
            if die.kept && !die.exploded() && cond.matches(die.value()) {
                explode(ctx, target, i)?;
            }
            i += 1;
        }
        Ok(())
    }
}

impl ApplyModifier for ExplodeOnce {
    fn apply(&self, ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        let cond = self.0.unwrap_or(Condition::equal_to(target.sides));
        for i in matching(&target.dice, &cond) {
            if !target.dice[i].exploded() {
                explode(ctx, target, i)?;
            }
        }
        Ok(())
    }
}

/// Mark die `i` exploded and append one fresh die. The term may hold at
/// most `max_explode_iterations` dice in total.
fn explode(ctx: &mut DiceContext<'_>, target: &mut RollResult, i: usize) -> RResult<()> {
    let limit = ctx.limits().max_explode_iterations;
    if target.dice.len() >= limit as usize {
        return Err(RollError::ExplodeLimitExceeded { limit });
    }
    target.dice[i].explode();
    let value = ctx.roll_die(target.sides)?;
    let index = target.dice.len();
    target.dice.push(Die::new(index, target.sides, value));
    Ok(())
}

impl ApplyModifier for Minimum {
    fn apply(&self, _ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        for die in target.dice.iter_mut().filter(|d| d.kept) {
            if die.value() < self.0 {
                die.force_value(self.0);
            }
        }
        Ok(())
    }
}

impl ApplyModifier for Maximum {
    fn apply(&self, _ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        for die in target.dice.iter_mut().filter(|d| d.kept) {
            if die.value() > self.0 {
                die.force_value(self.0);
            }
        }
        Ok(())
    }
}

impl ApplyModifier for Sort {
    fn apply(&self, _ctx: &mut DiceContext<'_>, target: &mut RollResult) -> RResult<()> {
        match self.0 {
            SortOrder::Ascending => target
                .dice
                .sort_by(|a, b| a.value().cmp(&b.value()).then(a.index.cmp(&b.index))),
            SortOrder::Descending => target
                .dice
                .sort_by(|a, b| b.value().cmp(&a.value()).then(a.index.cmp(&b.index))),
        }
        Ok(())
    }
}

/// Positions of kept dice matching `cond`, left to right.
fn matching(dice: &[Die], cond: &Condition) -> Vec<usize> {
    dice.iter()
        .enumerate()
        .filter(|(_, d)| d.kept && cond.matches(d.value()))
        .map(|(i, _)| i)
        .collect()
}

/// Positions of kept dice picked by `selector`. Ranked selections break
/// ties by roll order, earliest first.
fn select(dice: &[Die], selector: &Selector) -> Vec<usize> {
    let mut kept: Vec<(usize, &Die)> = dice.iter().enumerate().filter(|(_, d)| d.kept).collect();

    match *selector {
        Selector::Highest(n) => {
            kept.sort_by(|(_, a), (_, b)| b.value().cmp(&a.value()).then(a.index.cmp(&b.index)));
            kept.truncate(n);
        }
        Selector::Lowest(n) => {
            kept.sort_by(|(_, a), (_, b)| a.value().cmp(&b.value()).then(a.index.cmp(&b.index)));
            kept.truncate(n);
        }
        Selector::Matching(cond) => kept.retain(|(_, d)| cond.matches(d.value())),
    }

    kept.into_iter().map(|(i, _)| i).collect()
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_cond(f: &mut fmt::Formatter<'_>, cond: &Option<Condition>) -> fmt::Result {
            match cond {
                Some(cond) => fmt::Display::fmt(cond, f),
                None => Ok(()),
            }
        }

        match self {
            Self::Keep(Keep(Selector::Highest(n))) => write!(f, "kh{}", n),
            Self::Keep(Keep(Selector::Lowest(n))) => write!(f, "kl{}", n),
            Self::Keep(Keep(Selector::Matching(cond))) => write!(f, "k{}", cond),
            Self::Drop(Drop(Selector::Highest(n))) => write!(f, "dh{}", n),
            Self::Drop(Drop(Selector::Lowest(n))) => write!(f, "dl{}", n),
            Self::Drop(Drop(Selector::Matching(cond))) => write!(f, "p{}", cond),
            Self::Reroll(Reroll(cond)) => {
                f.write_str("r")?;
                fmt_cond(f, cond)
            }
            Self::RerollOnce(RerollOnce(cond)) => {
                f.write_str("ro")?;
                fmt_cond(f, cond)
            }
            Self::Explode(Explode(cond)) => {
                f.write_str("!")?;
                fmt_cond(f, cond)
            }
            Self::ExplodeOnce(ExplodeOnce(cond)) => {
                f.write_str("ra")?;
                fmt_cond(f, cond)
            }
            Self::Minimum(Minimum(n)) => write!(f, "mi{}", n),
            Self::Maximum(Maximum(n)) => write!(f, "ma{}", n),
            Self::Sort(Sort(SortOrder::Ascending)) => f.write_str("sa"),
            Self::Sort(Sort(SortOrder::Descending)) => f.write_str("sd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::config::ExecutionLimits;
    use crate::roll::roller::ScriptedRoller;

    fn dice(values: &[Int]) -> RollResult {
        let dice = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Die::new(i, 6, v))
            .collect();
        RollResult::new(values.len() as Int, 6, dice)
    }

    fn apply(modifier: impl Into<Modifier>, target: &mut RollResult, script: &[u32]) -> RResult<usize> {
        let limits = ExecutionLimits::default().with_max_reroll_iterations(3).with_max_explode_iterations(4);
        let mut budget = Budget::new(&limits);
        let mut roller = ScriptedRoller::new(script.iter().copied());
        let mut ctx = DiceContext::new(&mut roller, &mut budget, &limits);
        modifier.into().apply(&mut ctx, target)?;
        target.retotal();
        Ok(roller.calls())
    }

    fn kept(target: &RollResult) -> Vec<Int> {
        target.kept().map(|o| o.value).collect()
    }

    #[test]
    fn test_keep_highest_ties_to_earliest() {
        let mut target = dice(&[5, 2, 5, 5]);
        apply(Keep(Selector::Highest(2)), &mut target, &[]).unwrap();
        let kept: Vec<_> = target.dice.iter().filter(|d| d.kept).map(|d| d.index).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn test_drop_lowest() {
        let mut target = dice(&[3, 1, 4, 1]);
        apply(Drop(Selector::Lowest(1)), &mut target, &[]).unwrap();
        assert_eq!(kept(&target), vec![3, 4, 1]);
        assert_eq!(target.total, 8);
    }

    #[test]
    fn test_keep_matching() {
        let mut target = dice(&[3, 6, 4, 1]);
        apply(Keep(Selector::Matching(Condition::new(Comparison::Ge, 4))), &mut target, &[]).unwrap();
        assert_eq!(kept(&target), vec![6, 4]);
    }

    #[test]
    fn test_keep_only_sees_kept_dice() {
        let mut target = dice(&[6, 5, 4, 3]);
        apply(Drop(Selector::Highest(1)), &mut target, &[]).unwrap();
        apply(Keep(Selector::Highest(1)), &mut target, &[]).unwrap();
        assert_eq!(kept(&target), vec![5]);
    }

    #[test]
    fn test_reroll_passes() {
        let mut target = dice(&[1, 1]);
        let calls = apply(Reroll(None), &mut target, &[1, 3, 2]).unwrap();
        assert_eq!(calls, 3);
        assert_eq!(kept(&target), vec![2, 3]);
        assert_eq!(target.dice[0].rolls.len(), 3);
        assert_eq!(target.dice[1].rolls.len(), 2);
    }

    #[test]
    fn test_reroll_limit() {
        let mut target = dice(&[1]);
        assert_eq!(
            apply(Reroll(None), &mut target, &[1, 1, 1, 1]),
            Err(RollError::RerollLimitExceeded { limit: 3 })
        );
    }

    #[test]
    fn test_reroll_once() {
        let mut target = dice(&[1, 2]);
        let calls = apply(RerollOnce(Some(Condition::new(Comparison::Lt, 3))), &mut target, &[1, 1]).unwrap();
        assert_eq!(calls, 2);
        assert_eq!(kept(&target), vec![1, 1]);
    }

    #[test]
    fn test_explode_chains() {
        let mut target = dice(&[6, 2]);
        apply(Explode(None), &mut target, &[6, 3]).unwrap();
        assert_eq!(kept(&target), vec![6, 2, 6, 3]);
        assert!(target.dice[0].exploded());
        assert!(target.dice[2].exploded());
        assert_eq!(target.dice[3].index, 3);
    }

    #[test]
    fn test_explode_limit_counts_every_die() {
        let mut target = dice(&[6]);
        assert_eq!(
            apply(Explode(None), &mut target, &[6, 6, 6, 6]),
            Err(RollError::ExplodeLimitExceeded { limit: 4 })
        );

        // Already at the limit, so the first explosion fails
        let mut target = dice(&[1, 2, 3, 6]);
        assert_eq!(
            apply(Explode(None), &mut target, &[1]),
            Err(RollError::ExplodeLimitExceeded { limit: 4 })
        );
    }

    #[test]
    fn test_explode_once_does_not_chain() {
        let mut target = dice(&[6, 2]);
        let calls = apply(ExplodeOnce(None), &mut target, &[6, 6]).unwrap();
        assert_eq!(calls, 1);
        assert_eq!(kept(&target), vec![6, 2, 6]);
        assert!(target.dice[0].exploded());
        assert!(!target.dice[2].exploded());
        assert_eq!(target.total, 14);
    }

    #[test]
    fn test_minimum_maximum() {
        let mut target = dice(&[1, 4, 6]);
        apply(Minimum(3), &mut target, &[]).unwrap();
        apply(Maximum(5), &mut target, &[]).unwrap();
        assert_eq!(kept(&target), vec![3, 4, 5]);
        assert_eq!(target.dice[0].rolls[0].values.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_sort_is_display_only() {
        let mut target = dice(&[2, 6, 4]);
        apply(Sort(SortOrder::Descending), &mut target, &[]).unwrap();
        assert_eq!(kept(&target), vec![6, 4, 2]);
        assert_eq!(target.total, 12);
    }

    #[test]
    fn test_display() {
        let mods: Vec<Modifier> = vec![
            Keep(Selector::Highest(3)).into(),
            Drop(Selector::Matching(Condition::new(Comparison::Lt, 2))).into(),
            Reroll(None).into(),
            RerollOnce(Some(Condition::equal_to(2))).into(),
            Explode(Some(Condition::new(Comparison::Ge, 5))).into(),
            ExplodeOnce(None).into(),
            Minimum(2).into(),
            Sort(SortOrder::Ascending).into(),
        ];
        let s: String = mods.iter().map(ToString::to_string).collect();
        assert_eq!(s, "kh3p<2rro2!>=5rami2sa");
    }
}
