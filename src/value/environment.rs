use std::collections::HashMap;

use super::Value;

/// The variables mapping active during evaluation (spec.md §3 "Environment").
///
/// A single flat `name -> value` map. Blocks, `if`/`while`/`for` bodies do
/// NOT get their own scope frame — only a function activation saves and
/// restores the whole mapping (spec.md §4.5), which is why a plain
/// assignment inside a loop body is visible after the loop ends.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Overlays `other`'s bindings onto this environment, `other` winning on
    /// conflicts. Used to apply a function's captured closure snapshot on
    /// top of the caller's current variables at call time.
    pub fn overlay(&mut self, other: &Environment) {
        for (k, v) in &other.variables {
            self.variables.insert(k.clone(), v.clone());
        }
    }
}
