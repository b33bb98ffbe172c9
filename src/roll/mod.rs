mod ctx;
mod error;
mod num;
pub mod ops;
mod result;
mod roller;
mod stringify;

pub(crate) type RResult<T> = Result<T, RollError>;

pub use ctx::DiceContext;
pub use error::{DiceBound, RollError};
pub use num::Number;
pub use ops::{ApplyModifier, Modifier};
pub use result::{Die, DieRoll, Outcome, RollRecord, RollResult};
pub use roller::{Roller, ScriptedRoller, SourceError};
pub use stringify::{render, MarkdownStringifier, SimpleStringifier, Stringify};
