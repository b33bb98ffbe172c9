use rand::Rng;
use std::collections::VecDeque;
use std::num::NonZeroU32;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SourceError {
    #[error("roll source exhausted after {calls} rolls")]
    Exhausted { calls: usize },
    #[error("scripted roll {value} does not fit a d{sides}")]
    OutOfRange { value: u32, sides: u32 },
}

/// Source of die outcomes. Implementations return a value in
/// `1..=sides`.
pub trait Roller {
    fn roll(&mut self, sides: NonZeroU32) -> Result<u32, SourceError>;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroU32) -> Result<u32, SourceError> {
        Ok(self.gen_range(1..=sides.get()))
    }
}

/// Replays a fixed list of outcomes in call order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    values: VecDeque<u32>,
    calls: usize,
}

impl ScriptedRoller {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            calls: 0,
        }
    }

    /// Number of outcomes handed out so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl Roller for ScriptedRoller {
    fn roll(&mut self, sides: NonZeroU32) -> Result<u32, SourceError> {
        let value = self
            .values
            .pop_front()
            .ok_or(SourceError::Exhausted { calls: self.calls })?;
        if value == 0 || value > sides.get() {
            return Err(SourceError::OutOfRange {
                value,
                sides: sides.get(),
            });
        }
        self.calls += 1;
        Ok(value)
    }
}
