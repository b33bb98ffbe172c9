//! The script interpreter and the values it works with.

mod interp;
mod scope;
mod value;

pub use scope::Scopes;
pub use value::Value;

use crate::config::ExecutionLimits;
use crate::context::AutomationContext;
use crate::error::Error;
use crate::parse::ast::Program;
use crate::roll::{self, RollRecord, Roller, Stringify};
use interp::Interpreter;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The result of a successful evaluation: the final value and every dice
/// term rolled along the way, in roll order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(skip)]
    program: Arc<Program>,
    pub value: Value,
    pub rolls: Vec<RollRecord>,
    pub steps_used: u64,
    /// Free text written after a lone dice expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Evaluation {
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Human-readable breakdown of the rolls and the result.
    pub fn render<S: Stringify>(&self, stringifier: &mut S) -> String {
        roll::render(&self.program, &self.rolls, &self.value, stringifier)
    }
}

/// Run `program` to completion under `limits`. Each call gets a fresh
/// budget and scope chain; nothing is shared with other runs except the
/// program and the context, which are only read.
pub fn run(
    program: &Arc<Program>,
    context: &AutomationContext,
    roller: &mut dyn Roller,
    limits: &ExecutionLimits,
) -> Result<Evaluation, Error> {
    debug!(source = %program.source, "evaluating");
    let mut interp = Interpreter::new(program, context, roller, limits);
    let value = match interp.execute() {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, kind = ?e.kind(), "evaluation failed");
            return Err(e);
        }
    };
    let (rolls, steps_used) = interp.finish();
    debug!(%value, rolls = rolls.len(), steps_used, "evaluation finished");

    Ok(Evaluation {
        program: Arc::clone(program),
        value,
        rolls,
        steps_used,
        comment: program.comment.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{ScriptedRoller, SimpleStringifier};

    fn evaluate(source: &str, script: &[u32]) -> Evaluation {
        let program = Arc::new(crate::parse::parse(source).unwrap());
        let mut roller = ScriptedRoller::new(script.iter().copied());
        run(
            &program,
            &AutomationContext::standard(),
            &mut roller,
            &ExecutionLimits::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_steps_are_counted() {
        // literal, literal, binary
        assert_eq!(evaluate("1 + 2", &[]).steps_used, 3);
        // node, term, one per die
        assert_eq!(evaluate("3d6", &[1, 2, 3]).steps_used, 5);
    }

    #[test]
    fn test_render() {
        let eval = evaluate("x = 2d6\nx + 1", &[3, 4]);
        assert_eq!(eval.value, Value::from(8));
        assert_eq!(
            eval.render(&mut SimpleStringifier::new()),
            "2d6 (3, 4) = 7\n= 8"
        );
    }

    #[test]
    fn test_serialize() {
        let eval = evaluate("1d20", &[20]);
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["value"], serde_json::json!({"type": "number", "value": 20}));
        assert_eq!(json["stepsUsed"], 3);
        assert_eq!(json["rolls"][0]["notation"], "1d20");
        assert_eq!(json["rolls"][0]["result"]["total"], 20);
        assert!(json.get("comment").is_none());
    }

    #[test]
    fn test_comment_is_kept() {
        let eval = evaluate("1d20 + 2 initiative", &[7]);
        assert_eq!(eval.value, Value::from(9));
        assert_eq!(eval.comment.as_deref(), Some("initiative"));
        assert_eq!(eval.render(&mut SimpleStringifier::new()), "1d20 (7) + 2 = 9 # initiative");
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["comment"], "initiative");
    }
}
