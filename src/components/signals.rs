// Per-entity signals: traits write them, the animation router reads them.

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub scalars: FxHashMap<String, f64>,
    pub integers: FxHashMap<String, i32>,
    pub flags: FxHashSet<String>,
}

impl Signals {
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.set_flag(key);
        self
    }
    pub fn set_scalar(&mut self, key: impl Into<String>, value: f64) {
        self.scalars.insert(key.into(), value);
    }
    pub fn get_scalar(&self, key: &str) -> Option<f64> {
        self.scalars.get(key).copied()
    }
    pub fn set_integer(&mut self, key: impl Into<String>, value: i32) {
        self.integers.insert(key.into(), value);
    }
    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.integers.get(key).copied()
    }
    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.flags.insert(key.into());
    }
    /// Set or clear a flag from a boolean.
    pub fn toggle_flag(&mut self, key: &str, on: bool) {
        if on {
            self.flags.insert(key.to_string());
        } else {
            self.flags.remove(key);
        }
    }
    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
    pub fn clear(&mut self) {
        self.scalars.clear();
        self.integers.clear();
        self.flags.clear();
    }
}
