use super::{expect_arity, ContextError, Handler};
use crate::roll::Number;
use crate::sandbox::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Native = fn(&[Value]) -> Result<Value, ContextError>;

const FUNCTIONS: &[(&str, Native)] = &[
    ("str", to_str),
    ("int", int),
    ("float", float),
    ("abs", abs),
    ("min", min),
    ("max", max),
    ("floor", floor),
    ("ceil", ceil),
    ("round", round),
    ("len", len),
    ("typeof", type_of),
];

pub(super) fn register(handlers: &mut HashMap<String, Arc<dyn Handler>>) {
    for &(name, f) in FUNCTIONS {
        handlers.insert(name.to_string(), Arc::new(f));
    }
}

fn number(args: &[Value], index: usize) -> Result<Number, ContextError> {
    args[index]
        .as_number()
        .ok_or_else(|| ContextError::ArgumentType {
            index,
            expected: "number",
            found: args[index].type_name(),
        })
}

fn to_str(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::String(args[0].to_string()))
}

fn int(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::Number(Number::Int(x)) => Ok(Value::from(*x)),
        Value::Number(Number::Float(x)) => Number::Float(x.trunc())
            .to_int()
            .map(Value::from)
            .ok_or_else(|| ContextError::Rejected(format!("cannot convert {} to int", x))),
        Value::Boolean(b) => Ok(Value::from(*b as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ContextError::Rejected(format!("cannot convert {:?} to int", s))),
        other => Err(ContextError::ArgumentType {
            index: 0,
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn float(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::Number(x) => Ok(Value::from(x.as_float())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| ContextError::Rejected(format!("cannot convert {:?} to float", s))),
        other => Err(ContextError::ArgumentType {
            index: 0,
            expected: "number",
            found: other.type_name(),
        }),
    }
}

fn abs(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::Number(number(args, 0)?.abs()))
}

fn floor(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::Number(number(args, 0)?.floor()))
}

fn ceil(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::Number(number(args, 0)?.ceil()))
}

fn round(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::Number(number(args, 0)?.round()))
}

fn extremum(args: &[Value], pick_rhs: fn(&Number, &Number) -> bool) -> Result<Value, ContextError> {
    if args.is_empty() {
        return Err(ContextError::Arity {
            expected: 1,
            found: 0,
        });
    }
    let mut best = number(args, 0)?;
    for index in 1..args.len() {
        let x = number(args, index)?;
        if pick_rhs(&best, &x) {
            best = x;
        }
    }
    Ok(Value::Number(best))
}

fn min(args: &[Value]) -> Result<Value, ContextError> {
    extremum(args, |best, x| x < best)
}

fn max(args: &[Value]) -> Result<Value, ContextError> {
    extremum(args, |best, x| x > best)
}

fn len(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    match &args[0] {
        Value::String(s) => Ok(Value::from(s.chars().count() as i64)),
        other => Err(ContextError::ArgumentType {
            index: 0,
            expected: "string",
            found: other.type_name(),
        }),
    }
}

fn type_of(args: &[Value]) -> Result<Value, ContextError> {
    expect_arity(args, 1)?;
    Ok(Value::from(args[0].type_name()))
}
