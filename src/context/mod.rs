//! The host-supplied functions and read-only variables a script may use.

mod stdlib;

use crate::sandbox::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Names the interpreter resolves itself before consulting the context.
pub const INTRINSICS: &[&str] = &["roll", "vroll"];

/// A handler refused its arguments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("expected {expected} argument(s), found {found}")]
    Arity { expected: usize, found: usize },
    #[error("argument {index} must be a {expected}, found a {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{0}")]
    Rejected(String),
}

/// A native function exposed to scripts. Handlers get copies of the
/// argument values and cannot reach the interpreter.
pub trait Handler: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, ContextError>;
}

impl<F> Handler for F
where
    F: Fn(&[Value]) -> Result<Value, ContextError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, ContextError> {
        self(args)
    }
}

/// Closed set of capabilities for one bot configuration. Immutable once
/// built; share it between evaluations through an `Arc`.
#[derive(Clone, Default)]
pub struct AutomationContext {
    handlers: HashMap<String, Arc<dyn Handler>>,
    variables: HashMap<String, Value>,
}

impl AutomationContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// A context with only the standard library.
    pub fn standard() -> Self {
        Self::builder().with_standard_library().build()
    }

    pub fn handler(&self, name: &str) -> Option<&dyn Handler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for AutomationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handler_names().collect();
        handlers.sort_unstable();
        f.debug_struct("AutomationContext")
            .field("handlers", &handlers)
            .field("variables", &self.variables)
            .finish()
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    handlers: HashMap<String, Arc<dyn Handler>>,
    variables: HashMap<String, Value>,
}

impl ContextBuilder {
    /// Register `handler` under `name`, replacing any earlier one.
    pub fn handler(mut self, name: impl Into<String>, handler: impl Handler + 'static) -> Self {
        let name = name.into();
        if INTRINSICS.contains(&name.as_str()) {
            debug!(%name, "handler is shadowed by an intrinsic");
        }
        self.handlers.insert(name, Arc::new(handler));
        self
    }

    /// Bind a read-only variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_standard_library(mut self) -> Self {
        stdlib::register(&mut self.handlers);
        self
    }

    pub fn build(self) -> AutomationContext {
        debug!(
            handlers = self.handlers.len(),
            variables = self.variables.len(),
            "built automation context"
        );
        AutomationContext {
            handlers: self.handlers,
            variables: self.variables,
        }
    }
}

/// Fails unless exactly `expected` arguments were passed.
pub fn expect_arity(args: &[Value], expected: usize) -> Result<(), ContextError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ContextError::Arity {
            expected,
            found: args.len(),
        })
    }
}
