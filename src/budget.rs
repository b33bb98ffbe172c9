//! Per-evaluation execution budget.

use crate::config::ExecutionLimits;
use std::time::Instant;
use thiserror::Error;
use tracing::warn;

/// A sandbox guard that tripped, with the limit that was hit.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum BudgetError {
    #[error("step budget of {limit} exhausted")]
    Steps { limit: u64 },
    #[error("call depth exceeded the maximum of {limit}")]
    Depth { limit: usize },
    #[error("evaluation timed out after {limit_millis} ms")]
    Timeout { limit_millis: u64 },
    #[error("string length exceeded the maximum of {limit}")]
    Memory { limit: usize },
}

/// Steps remaining, call depth in use and the wall-clock deadline for one
/// evaluation. Created fresh for every top-level request.
#[derive(Debug)]
pub struct Budget {
    max_steps: u64,
    steps_remaining: u64,
    max_depth: usize,
    depth: usize,
    deadline: Instant,
    timeout_millis: u64,
    max_string_length: usize,
}

impl Budget {
    pub fn new(limits: &ExecutionLimits) -> Self {
        Self {
            max_steps: limits.max_steps,
            steps_remaining: limits.max_steps,
            max_depth: limits.max_call_depth,
            depth: 0,
            deadline: Instant::now() + limits.timeout(),
            timeout_millis: limits.timeout_millis,
            max_string_length: limits.max_string_length,
        }
    }

    /// Spend one step. Also checks the deadline.
    pub fn step(&mut self) -> Result<(), BudgetError> {
        if self.steps_remaining == 0 {
            warn!(limit = self.max_steps, "step budget exhausted");
            return Err(BudgetError::Steps {
                limit: self.max_steps,
            });
        }
        self.steps_remaining -= 1;
        self.check_deadline()
    }

    pub fn check_deadline(&self) -> Result<(), BudgetError> {
        if Instant::now() >= self.deadline {
            warn!(limit_millis = self.timeout_millis, "evaluation deadline passed");
            Err(BudgetError::Timeout {
                limit_millis: self.timeout_millis,
            })
        } else {
            Ok(())
        }
    }

    /// Push a frame.
    pub fn enter(&mut self) -> Result<(), BudgetError> {
        if self.depth >= self.max_depth {
            warn!(limit = self.max_depth, "call depth exceeded");
            return Err(BudgetError::Depth {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Pop a frame pushed by [`Budget::enter`].
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn check_string(&self, len: usize) -> Result<(), BudgetError> {
        if len > self.max_string_length {
            warn!(len, limit = self.max_string_length, "string too long");
            Err(BudgetError::Memory {
                limit: self.max_string_length,
            })
        } else {
            Ok(())
        }
    }

    pub fn steps_used(&self) -> u64 {
        self.max_steps - self.steps_remaining
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
