//! Dice notation and a small sandboxed scripting language for automating
//! tabletop rules.
//!
//! ```
//! use dicescript::{Engine, MarkdownStringifier};
//!
//! let engine = Engine::default();
//! let eval = engine.evaluate("4d6kh3 + 2").unwrap();
//! println!("{}", eval.render(&mut MarkdownStringifier::new()));
//! ```

pub mod budget;
pub mod cache;
pub mod common;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod parse;
pub mod roll;
pub mod sandbox;

pub use budget::BudgetError;
pub use cache::AstCache;
pub use config::ExecutionLimits;
pub use context::{AutomationContext, ContextBuilder, ContextError, Handler};
pub use engine::Engine;
pub use error::{Error, ErrorKind};
pub use parse::{parse, ParseError, ParseErrorKind};
pub use roll::{MarkdownStringifier, RollRecord, RollResult, Roller, ScriptedRoller, SimpleStringifier, Stringify};
pub use sandbox::{Evaluation, Value};

pub(crate) type DefaultRng = rand::rngs::ThreadRng;

/// Evaluate `source` once with the standard library, a fresh cache and
/// default limits.
pub fn evaluate(source: &str) -> Result<Evaluation, Error> {
    Engine::default().evaluate(source)
}
