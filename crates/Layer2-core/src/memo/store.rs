//! Per-instance cache store
//!
//! One slot per (declaring scope, method, identifier). Niladic methods get a
//! single box that tells "never computed" apart from a cached `null`;
//! variadic methods get a map from argument key to value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::key::CacheKey;
use super::spec::{SlotKey, WrappedMethodSpec};

/// Cached values of one memoized method on one instance
#[derive(Debug, Clone, PartialEq)]
pub enum CacheSlot {
    Single(Option<Value>),
    Keyed(HashMap<CacheKey, Value>),
}

impl CacheSlot {
    fn empty_for(spec: &WrappedMethodSpec) -> Self {
        if spec.is_niladic() {
            CacheSlot::Single(None)
        } else {
            CacheSlot::Keyed(HashMap::new())
        }
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        match self {
            CacheSlot::Single(value) => usize::from(value.is_some()),
            CacheSlot::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The niladic value, if cached
    pub fn single(&self) -> Option<&Value> {
        match self {
            CacheSlot::Single(value) => value.as_ref(),
            CacheSlot::Keyed(_) => None,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Value> {
        match self {
            CacheSlot::Keyed(map) => map.get(key),
            CacheSlot::Single(_) => None,
        }
    }

    fn clear(&mut self) {
        match self {
            CacheSlot::Single(value) => *value = None,
            CacheSlot::Keyed(map) => map.clear(),
        }
    }
}

/// Counters of one instance's store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub reloads: u64,
    pub writes: u64,
    /// Writes dropped because the instance was frozen
    pub skipped_writes: u64,
    pub flushes: u64,
}

impl MemoStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Every memoized value of one instance
#[derive(Debug, Default)]
pub struct CacheStore {
    slots: HashMap<SlotKey, CacheSlot>,
    frozen: bool,
    stats: MemoStats,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key` (`None` key for niladic specs)
    pub fn read(&mut self, spec: &WrappedMethodSpec, key: Option<&CacheKey>) -> Option<Value> {
        let found = self.slots.get(&spec.slot_key()).and_then(|slot| match key {
            None => slot.single().cloned(),
            Some(key) => slot.get(key).cloned(),
        });
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    pub fn peek(&self, spec: &WrappedMethodSpec) -> Option<&CacheSlot> {
        self.slots.get(&spec.slot_key())
    }

    /// Store a value; returns false when the store is frozen
    pub fn write(&mut self, spec: &WrappedMethodSpec, key: Option<CacheKey>, value: Value) -> bool {
        if self.frozen {
            self.stats.skipped_writes += 1;
            return false;
        }

        let slot = self
            .slots
            .entry(spec.slot_key())
            .or_insert_with(|| CacheSlot::empty_for(spec));
        match (slot, key) {
            (CacheSlot::Single(cell), _) => *cell = Some(value),
            (CacheSlot::Keyed(map), Some(key)) => {
                map.insert(key, value);
            }
            (CacheSlot::Keyed(_), None) => return false,
        }
        self.stats.writes += 1;
        true
    }

    /// Create an empty slot if none exists yet
    pub fn ensure_slot(&mut self, spec: &WrappedMethodSpec) -> bool {
        if self.frozen {
            return false;
        }
        self.slots
            .entry(spec.slot_key())
            .or_insert_with(|| CacheSlot::empty_for(spec));
        true
    }

    /// Empty the slot of `spec`; the slot itself stays
    pub fn clear(&mut self, spec: &WrappedMethodSpec) -> bool {
        if self.frozen {
            return false;
        }
        if let Some(slot) = self.slots.get_mut(&spec.slot_key()) {
            slot.clear();
        }
        self.stats.flushes += 1;
        true
    }

    pub fn record_reload(&mut self) {
        self.stats.reloads += 1;
    }

    /// Refuse every later mutation
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }

    /// Number of slots created so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
