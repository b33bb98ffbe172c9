use super::Value;
use std::collections::BTreeMap;

/// Lexical scope chain. The outermost frame lives for the whole program;
/// each block pushes a frame that is discarded on exit.
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<BTreeMap<String, Value>>,
}

impl Scopes {
    pub fn new() -> Self {
        Self {
            frames: vec![BTreeMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(BTreeMap::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Rebind `name` in the nearest frame that has it, or bind it in the
    /// innermost frame.
    pub fn assign(&mut self, name: &str, value: Value) {
        let index = self
            .frames
            .iter()
            .rposition(|frame| frame.contains_key(name))
            .unwrap_or(self.frames.len() - 1);
        self.frames[index].insert(name.to_string(), value);
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_nearest_enclosing() {
        let mut scopes = Scopes::new();
        scopes.assign("hp", Value::from(10));
        scopes.push();
        scopes.assign("hp", Value::from(7));
        scopes.assign("tmp", Value::from(1));
        assert_eq!(scopes.get("tmp"), Some(&Value::from(1)));
        scopes.pop();
        assert_eq!(scopes.get("hp"), Some(&Value::from(7)));
        assert_eq!(scopes.get("tmp"), None);
    }

    #[test]
    fn test_outer_frame_survives_pop() {
        let mut scopes = Scopes::new();
        scopes.pop();
        assert_eq!(scopes.depth(), 1);
        scopes.assign("x", Value::from(1));
        assert_eq!(scopes.get("x"), Some(&Value::from(1)));
    }
}
