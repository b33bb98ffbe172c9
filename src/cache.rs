//! Parsed programs keyed by their source text.

use crate::parse::{self, ast::Program, ParseError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Shared cache of parsed programs. Entries are never mutated after
/// insertion, so lookups only take the read lock. A program lost to an
/// insertion race is dropped and the winner's copy returned.
#[derive(Debug, Default)]
pub struct AstCache {
    programs: RwLock<HashMap<String, Arc<Program>>>,
    capacity: Option<usize>,
}

impl AstCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that stops inserting after `capacity` programs. Programs
    /// parsed after that are still returned, just not kept.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            programs: RwLock::new(HashMap::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    pub fn get(&self, source: &str) -> Option<Arc<Program>> {
        // Entries are complete once inserted, so a poisoned lock still
        // holds a usable map
        let programs = self.programs.read().unwrap_or_else(PoisonError::into_inner);
        programs.get(source).cloned()
    }

    /// Look up `source`, parsing and inserting it on a miss. Parse errors
    /// are returned but never cached.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<Program>, ParseError> {
        if let Some(program) = self.get(source) {
            debug!(len = source.len(), "ast cache hit");
            return Ok(program);
        }

        debug!(len = source.len(), "ast cache miss");
        let program = Arc::new(parse::parse(source)?);

        let mut programs = self.programs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = programs.get(source) {
            return Ok(Arc::clone(existing));
        }
        if self.capacity.map_or(true, |cap| programs.len() < cap) {
            programs.insert(source.to_string(), Arc::clone(&program));
        }
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.programs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.programs.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
