use crate::common::*;
use serde::Serialize;

/// One physical roll of a die, plus any values forced onto it afterwards
/// by `mi`/`ma`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DieRoll {
    pub values: NonEmpty<Int>,
    pub kept: bool,
    pub exploded: bool,
}

impl DieRoll {
    pub fn new(value: Int) -> Self {
        Self {
            values: vec1![value],
            kept: true,
            exploded: false,
        }
    }

    pub fn value(&self) -> Int {
        *self.values.last()
    }
}

/// A single die and its history. Rerolls push a new [`DieRoll`] and mark
/// the previous one dropped.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Die {
    /// Position in roll order. Ties between equal values go to the lower
    /// index.
    pub index: usize,
    pub sides: Int,
    pub rolls: NonEmpty<DieRoll>,
    pub kept: bool,
}

impl Die {
    pub fn new(index: usize, sides: Int, value: Int) -> Self {
        Self {
            index,
            sides,
            rolls: vec1![DieRoll::new(value)],
            kept: true,
        }
    }

    pub fn value(&self) -> Int {
        self.rolls.last().value()
    }

    pub fn exploded(&self) -> bool {
        self.rolls.last().exploded
    }

    pub fn reroll(&mut self, value: Int) {
        self.rolls.last_mut().kept = false;
        self.rolls.push(DieRoll::new(value));
    }

    pub fn explode(&mut self) {
        self.rolls.last_mut().exploded = true;
    }

    pub fn force_value(&mut self, value: Int) {
        self.rolls.last_mut().values.push(value);
    }

    pub fn drop(&mut self) {
        self.kept = false;
    }

    pub fn is_critical(&self) -> bool {
        let value = self.value();
        value == 1 || value == self.sides
    }
}

/// Final value of one die, tagged kept or dropped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct Outcome {
    pub value: Int,
    pub kept: bool,
}

/// Every die of one dice term, in display order, plus the total of the
/// kept ones.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RollResult {
    pub count: Int,
    pub sides: Int,
    pub dice: Vec<Die>,
    pub total: Int,
}

impl RollResult {
    pub(crate) fn new(count: Int, sides: Int, dice: Vec<Die>) -> Self {
        let mut ret = Self {
            count,
            sides,
            dice,
            total: 0,
        };
        ret.retotal();
        ret
    }

    // Every value is at most `max_dice_sides`, faces and clamps alike
    pub(crate) fn retotal(&mut self) {
        self.total = self.kept().map(|o| o.value).sum();
    }

    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.dice.iter().map(|d| Outcome {
            value: d.value(),
            kept: d.kept,
        })
    }

    pub fn kept(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.outcomes().filter(|o| o.kept)
    }

    pub fn dropped(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.outcomes().filter(|o| !o.kept)
    }
}

/// One entry of an evaluation trace.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RollRecord {
    /// The dice notation as written.
    pub notation: String,
    pub span: Span,
    pub result: RollResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_history() {
        let mut die = Die::new(0, 6, 1);
        die.reroll(4);
        die.force_value(5);
        assert_eq!(die.value(), 5);
        assert_eq!(die.rolls.len(), 2);
        assert!(!die.rolls[0].kept);
        assert_eq!(die.rolls[1].values.as_slice(), &[4, 5]);
    }

    #[test]
    fn test_total_counts_kept_only() {
        let mut dice = vec![Die::new(0, 6, 2), Die::new(1, 6, 6)];
        dice[0].drop();
        let mut result = RollResult::new(2, 6, dice);
        assert_eq!(result.total, 6);
        result.dice[0].kept = true;
        result.retotal();
        assert_eq!(result.total, 8);
        assert_eq!(result.dropped().count(), 0);
    }

    #[test]
    fn test_critical() {
        assert!(Die::new(0, 20, 20).is_critical());
        assert!(Die::new(0, 20, 1).is_critical());
        assert!(!Die::new(0, 20, 7).is_critical());
    }
}
