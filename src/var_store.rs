//! Insertion-ordered storage keyed by variable name.
//!
//! The solver pipeline must traverse variables in insertion order for a given problem — this is
//! load-bearing for seed reproducibility ("Ordering guarantees"). A plain hash map does not
//! promise that, so variables are kept in a `Vec` alongside an index for name lookup: storage and
//! lookup are split into two structures rather than relying on a hash map's iteration order.

use fnv::FnvHashMap;

use crate::rand_var::RandVar;

/// Storage for a problem's variables, preserving the order in which they were added.
#[derive(Debug, Default)]
pub struct VarStore {
    order: Vec<RandVar>,
    index: FnvHashMap<String, usize>,
}

impl VarStore {
    pub fn new() -> Self {
        VarStore::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Inserts a new variable. Returns `false` without modifying storage if the name is already
    /// present.
    pub fn insert(&mut self, var: RandVar) -> bool {
        if self.index.contains_key(&var.name) {
            return false;
        }
        let idx = self.order.len();
        let _ = self.index.insert(var.name.clone(), idx);
        self.order.push(var);
        true
    }

    pub fn get(&self, name: &str) -> Option<&RandVar> {
        self.index.get(name).map(|&idx| &self.order[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RandVar> {
        if let Some(&idx) = self.index.get(name) {
            Some(&mut self.order[idx])
        } else {
            None
        }
    }

    /// Iterates variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RandVar> {
        self.order.iter()
    }

    /// Mutably iterates variables in insertion order. Used to adjust ordering hints; variable
    /// identity (name, domain, constraints) must not be changed through this.
    pub fn iter_mut_for_ordering(&mut self) -> impl Iterator<Item = &mut RandVar> {
        self.order.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|var| var.name.as_str())
    }
}
