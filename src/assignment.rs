//! A complete mapping from variable name to concrete value.

use fnv::FnvHashMap;

use crate::value::Value;

/// A complete mapping from every variable name to a concrete value. Produced atomically by the
/// solver: partial assignments are never observable outside the solver pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    values: FnvHashMap<String, Value>,
}

impl Assignment {
    pub fn new() -> Self {
        Assignment::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let _ = self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}
