//! Resource limits for a single evaluation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to one top-level evaluation. Every field has a default,
/// so hosts only need to name the limits they want to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionLimits {
    /// Node dispatches and physical die rolls allowed before the
    /// evaluation fails.
    pub max_steps: u64,
    /// Nested blocks and calls allowed at once.
    pub max_call_depth: usize,
    /// Largest dice count a single term may request.
    pub max_dice_count: u32,
    /// Largest number of faces a single term may request.
    pub max_dice_sides: u32,
    /// Rerolls allowed per die before `r` gives up.
    pub max_reroll_iterations: u32,
    /// Dice one term may hold once explosions have added to it.
    pub max_explode_iterations: u32,
    /// Wall-clock budget.
    pub timeout_millis: u64,
    /// Longest string a script may build.
    pub max_string_length: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_call_depth: 64,
            max_dice_count: 1_000,
            max_dice_sides: 10_000,
            max_reroll_iterations: 1_000,
            max_explode_iterations: 1_000,
            timeout_millis: 1_000,
            max_string_length: 10_000,
        }
    }
}

impl ExecutionLimits {
    /// Parse limits from a (possibly partial) JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_dice_count(mut self, count: u32) -> Self {
        self.max_dice_count = count;
        self
    }

    pub fn with_max_dice_sides(mut self, sides: u32) -> Self {
        self.max_dice_sides = sides;
        self
    }

    pub fn with_max_reroll_iterations(mut self, iterations: u32) -> Self {
        self.max_reroll_iterations = iterations;
        self
    }

    pub fn with_max_explode_iterations(mut self, iterations: u32) -> Self {
        self.max_explode_iterations = iterations;
        self
    }

    pub fn with_timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = millis;
        self
    }

    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }
}
