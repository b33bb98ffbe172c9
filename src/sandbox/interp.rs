use super::{Scopes, Value};
use crate::budget::{Budget, BudgetError};
use crate::common::*;
use crate::config::ExecutionLimits;
use crate::context::{AutomationContext, ContextError, Handler};
use crate::error::Error;
use crate::parse::ast::*;
use crate::parse::visit::{Accept, Visitor};
use crate::roll::{self, DiceContext, MarkdownStringifier, Number, RollRecord, Roller};
use std::cmp::Ordering;
use tracing::trace;

/// Why evaluation of a node stopped early.
pub(crate) enum Flow {
    Break,
    Continue,
    Return(Value),
    Error(Error),
}

impl From<Error> for Flow {
    fn from(e: Error) -> Self {
        Self::Error(e)
    }
}

type Exec = Result<Value, Flow>;

fn budget_error(span: &Span) -> impl FnOnce(BudgetError) -> Error + '_ {
    move |source| Error::Budget {
        source,
        span: span.clone(),
    }
}

/// Tree-walking interpreter for one evaluation. Owns the budget and the
/// scope chain, so nothing it mutates outlives the run.
pub(crate) struct Interpreter<'a> {
    program: &'a Program,
    context: &'a AutomationContext,
    roller: &'a mut dyn Roller,
    limits: &'a ExecutionLimits,
    budget: Budget,
    scopes: Scopes,
    rolls: Vec<RollRecord>,
    // Source of the `roll("...")` string being evaluated, if any
    inner_source: Option<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        program: &'a Program,
        context: &'a AutomationContext,
        roller: &'a mut dyn Roller,
        limits: &'a ExecutionLimits,
    ) -> Self {
        Self {
            program,
            context,
            roller,
            limits,
            budget: Budget::new(limits),
            scopes: Scopes::new(),
            rolls: Vec::new(),
            inner_source: None,
        }
    }

    /// Run the program's statements in the outermost scope.
    pub fn execute(&mut self) -> Result<Value, Error> {
        let program = self.program;
        let mut last = Value::Undefined;
        for node in &program.body {
            match self.visit(node) {
                Ok(value) => last = value,
                Err(Flow::Return(value)) => return Ok(value),
                Err(Flow::Error(e)) => return Err(e),
                // rejected by the parser outside loops
                Err(Flow::Break | Flow::Continue) => break,
            }
        }
        Ok(last)
    }

    pub fn finish(self) -> (Vec<RollRecord>, u64) {
        (self.rolls, self.budget.steps_used())
    }

    fn slice(&self, span: &Span) -> &str {
        match &self.inner_source {
            Some(source) => source.get(span.clone()).unwrap_or_default(),
            None => self.program.slice(span),
        }
    }

    fn step(&mut self, span: &Span) -> Result<(), Error> {
        self.budget.step().map_err(budget_error(span))
    }

    fn lookup(&self, name: &str, span: &Span) -> Result<Value, Error> {
        self.scopes
            .get(name)
            .or_else(|| self.context.variable(name))
            .cloned()
            .ok_or_else(|| Error::UnknownIdentifier {
                name: name.to_string(),
                span: span.clone(),
            })
    }

    fn check_string(&self, value: &Value, span: &Span) -> Result<(), Error> {
        match value {
            Value::String(s) => self.budget.check_string(s.len()).map_err(budget_error(span)),
            _ => Ok(()),
        }
    }

    fn number(&self, value: &Value, what: impl std::fmt::Display, span: &Span) -> Result<Number, Error> {
        value.as_number().ok_or_else(|| {
            Error::type_error(
                format!("bad operand type for {}: {}", what, value.type_name()),
                span,
            )
        })
    }

    fn binary(&mut self, lhs: Value, op: BinaryOperator, rhs: Value, span: &Span) -> Result<Value, Error> {
        use BinaryOperator::*;

        match (op, &lhs, &rhs) {
            (Add, Value::String(_), _) | (Add, _, Value::String(_)) => {
                let joined = Value::String(format!("{}{}", lhs, rhs));
                self.check_string(&joined, span)?;
                return Ok(joined);
            }
            (Eq, ..) => return Ok(Value::Boolean(lhs == rhs)),
            (Ne, ..) => return Ok(Value::Boolean(lhs != rhs)),
            (_, Value::String(a), Value::String(b)) if op.is_comparison() => {
                return Ok(Value::Boolean(compare(op, a.cmp(b))));
            }
            _ => {}
        }

        let (x, y) = match (lhs.as_number(), rhs.as_number()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(Error::type_error(
                    format!(
                        "unsupported operand types for {}: {} and {}",
                        op,
                        lhs.type_name(),
                        rhs.type_name()
                    ),
                    span,
                ))
            }
        };
        let zero = || Error::ZeroDivision { span: span.clone() };

        let value = match op {
            Add => x + y,
            Sub => x - y,
            Mul => x * y,
            Div => x.checked_div(y).ok_or_else(zero)?,
            Flr => x.checked_floor_div(y).ok_or_else(zero)?,
            Rem => x.checked_rem(y).ok_or_else(zero)?,
            Lt | Gt | Le | Ge => {
                // NaN compares false on every side
                let b = x.partial_cmp(&y).map_or(false, |ord| compare(op, ord));
                return Ok(Value::Boolean(b));
            }
            Eq | Ne | And | Or => {
                return Err(Error::type_error(format!("`{}` is not arithmetic", op), span))
            }
        };
        Ok(Value::Number(value))
    }

    fn exec_block(&mut self, block: &Block, span: &Span) -> Exec {
        self.budget.enter().map_err(budget_error(span))?;
        self.scopes.push();
        let result = self.exec_statements(&block.body);
        self.scopes.pop();
        self.budget.exit();
        result
    }

    fn exec_statements(&mut self, body: &[Node]) -> Exec {
        let mut last = Value::Undefined;
        for node in body {
            last = self.visit(node)?;
        }
        Ok(last)
    }

    /// Run a loop body once. `Ok(false)` means the loop should stop.
    fn iterate(&mut self, body: &Block, span: &Span) -> Result<bool, Flow> {
        match self.exec_block(body, span) {
            Ok(_) | Err(Flow::Continue) => Ok(true),
            Err(Flow::Break) => Ok(false),
            Err(flow) => Err(flow),
        }
    }

    fn loop_bound(&mut self, node: &Node) -> Result<Int, Flow> {
        let value = self.visit(node)?;
        match value.as_number().and_then(Number::to_int) {
            Some(x) => Ok(x),
            None => Err(Error::type_error(
                format!("loop bounds must be integers, found {}", value),
                &node.span,
            )
            .into()),
        }
    }

    fn call_handler(&mut self, name: &str, handler: &dyn Handler, args: &[Node], span: &Span) -> Exec {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.visit(arg)?);
        }
        trace!(name, args = values.len(), "calling handler");
        let value = handler.call(&values).map_err(|source| Error::Context {
            name: name.to_string(),
            source,
            span: span.clone(),
        })?;
        self.check_string(&value, span)?;
        Ok(value)
    }

    /// `roll("...")` and `vroll("...")`: evaluate a dice-only string,
    /// adding its dice to this evaluation's trace.
    fn call_roll(&mut self, name: &str, args: &[Node], span: &Span) -> Exec {
        let rejected = |source| Error::Context {
            name: name.to_string(),
            source,
            span: span.clone(),
        };

        if args.len() != 1 {
            return Err(rejected(ContextError::Arity {
                expected: 1,
                found: args.len(),
            })
            .into());
        }
        let text = match self.visit(&args[0])? {
            Value::String(s) => s,
            other => {
                return Err(rejected(ContextError::ArgumentType {
                    index: 0,
                    expected: "string",
                    found: other.type_name(),
                })
                .into())
            }
        };

        let program = crate::parse::parse(&text)
            .map_err(|e| rejected(ContextError::Rejected(e.to_string())))?;
        let node = match program.body.as_slice() {
            [node] if program.is_dice_expression() => node,
            _ => {
                return Err(Error::type_error(
                    format!("`{}` only accepts dice expressions, found {:?}", name, text),
                    span,
                )
                .into())
            }
        };

        let first = self.rolls.len();
        let outer = self.inner_source.replace(text);
        let result = self.visit(node);
        self.inner_source = outer;
        let value = result.map_err(|flow| match flow {
            Flow::Error(e) => Flow::Error(e.relocate(span)),
            flow => flow,
        })?;

        let value = if name == "vroll" {
            let breakdown = roll::render(&program, &self.rolls[first..], &value, &mut MarkdownStringifier::new());
            Value::String(breakdown)
        } else {
            value
        };
        for record in &mut self.rolls[first..] {
            record.span = span.clone();
        }
        self.check_string(&value, span)?;
        Ok(value)
    }
}

fn compare(op: BinaryOperator, ord: Ordering) -> bool {
    match op {
        BinaryOperator::Lt => ord == Ordering::Less,
        BinaryOperator::Gt => ord == Ordering::Greater,
        BinaryOperator::Le => ord != Ordering::Greater,
        BinaryOperator::Ge => ord != Ordering::Less,
        BinaryOperator::Eq => ord == Ordering::Equal,
        BinaryOperator::Ne => ord != Ordering::Equal,
        _ => false,
    }
}

impl Visitor for Interpreter<'_> {
    type Output = Exec;

    fn visit(&mut self, node: &Node) -> Exec {
        self.step(&node.span)?;
        node.accept(self)
    }

    fn visit_literal(&mut self, lit: &Literal, _: &Span) -> Exec {
        Ok(match lit {
            Literal::Int(x) => Value::from(*x),
            Literal::Float(x) => Value::from(*x),
            Literal::String(s) => Value::from(s.as_str()),
            Literal::Boolean(b) => Value::from(*b),
        })
    }

    fn visit_dice(&mut self, term: &DiceTerm, span: &Span) -> Exec {
        let result = DiceContext::new(&mut *self.roller, &mut self.budget, self.limits)
            .evaluate(term)
            .map_err(|e| Error::from_roll(e, span))?;
        let total = result.total;
        self.rolls.push(RollRecord {
            notation: self.slice(span).to_string(),
            span: span.clone(),
            result,
        });
        Ok(Value::from(total))
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Node, span: &Span) -> Exec {
        let value = self.visit(operand)?;
        match op {
            UnaryOperator::Not => Ok(Value::Boolean(!value.truthy())),
            UnaryOperator::Pos => Ok(Value::Number(self.number(&value, "unary +", span)?)),
            UnaryOperator::Neg => Ok(Value::Number(-self.number(&value, "unary -", span)?)),
        }
    }

    fn visit_binary(&mut self, lhs: &Node, op: BinaryOperator, rhs: &Node, span: &Span) -> Exec {
        match op {
            BinaryOperator::And => {
                if !self.visit(lhs)?.truthy() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.visit(rhs)?.truthy()))
            }
            BinaryOperator::Or => {
                if self.visit(lhs)?.truthy() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.visit(rhs)?.truthy()))
            }
            _ => {
                let lhs = self.visit(lhs)?;
                let rhs = self.visit(rhs)?;
                Ok(self.binary(lhs, op, rhs, span)?)
            }
        }
    }

    fn visit_grouping(&mut self, inner: &Node, _: &Span) -> Exec {
        self.visit(inner)
    }

    fn visit_annotated(&mut self, inner: &Node, _: &[String], _: &Span) -> Exec {
        self.visit(inner)
    }

    fn visit_identifier(&mut self, name: &str, span: &Span) -> Exec {
        Ok(self.lookup(name, span)?)
    }

    fn visit_call(&mut self, name: &str, args: &[Node], span: &Span) -> Exec {
        let context = self.context;
        let intrinsic = matches!(name, "roll" | "vroll");
        let handler = match context.handler(name) {
            _ if intrinsic => None,
            Some(handler) => Some(handler),
            None => {
                return Err(Error::UnknownIdentifier {
                    name: name.to_string(),
                    span: span.clone(),
                }
                .into())
            }
        };

        self.budget.enter().map_err(budget_error(span))?;
        let result = match handler {
            Some(handler) => self.call_handler(name, handler, args, span),
            None => self.call_roll(name, args, span),
        };
        self.budget.exit();
        result
    }

    fn visit_if(&mut self, condition: &Node, then: &Block, otherwise: Option<&Node>, span: &Span) -> Exec {
        if self.visit(condition)?.truthy() {
            self.exec_block(then, span)
        } else if let Some(otherwise) = otherwise {
            self.visit(otherwise)
        } else {
            Ok(Value::Undefined)
        }
    }

    fn visit_while(&mut self, condition: &Node, body: &Block, span: &Span) -> Exec {
        while self.visit(condition)?.truthy() {
            if !self.iterate(body, span)? {
                break;
            }
        }
        Ok(Value::Undefined)
    }

    fn visit_for(&mut self, var: &str, start: &Node, end: &Node, body: &Block, span: &Span) -> Exec {
        let start = self.loop_bound(start)?;
        let end = self.loop_bound(end)?;
        for i in start..end {
            // an empty body dispatches no nodes, so each iteration pays here
            self.step(span)?;
            self.scopes.assign(var, Value::from(i));
            if !self.iterate(body, span)? {
                break;
            }
        }
        Ok(Value::Undefined)
    }

    fn visit_assign(&mut self, target: &str, op: Option<BinaryOperator>, value: &Node, span: &Span) -> Exec {
        let value = self.visit(value)?;
        let value = match op {
            Some(op) => {
                let current = self.lookup(target, span)?;
                self.binary(current, op, value, span)?
            }
            None => value,
        };
        self.scopes.assign(target, value.clone());
        Ok(value)
    }

    fn visit_block(&mut self, block: &Block, span: &Span) -> Exec {
        self.exec_block(block, span)
    }

    fn visit_break(&mut self, _: &Span) -> Exec {
        Err(Flow::Break)
    }

    fn visit_continue(&mut self, _: &Span) -> Exec {
        Err(Flow::Continue)
    }

    fn visit_return(&mut self, value: Option<&Node>, _: &Span) -> Exec {
        let value = match value {
            Some(node) => self.visit(node)?,
            None => Value::Undefined,
        };
        Err(Flow::Return(value))
    }
}
