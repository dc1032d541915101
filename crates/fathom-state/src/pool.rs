//! Append-only value pool
//!
//! Datastates never embed values. They bind variable identifiers to
//! [`PoolRef`]s handed out by the pool, so taking a snapshot costs one entry
//! per changed variable regardless of how large the values are.

use crate::{PoolRef, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Append-only content store keyed by [`PoolRef`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPool {
    values: IndexMap<PoolRef, Value>,
    next_ref: u64,
}

impl DataPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value and return its reference
    pub fn put(&mut self, value: impl Into<Value>) -> PoolRef {
        let pool_ref = PoolRef::new(self.next_ref);
        self.next_ref += 1;
        self.values.insert(pool_ref, value.into());
        pool_ref
    }

    /// Resolve a reference
    pub fn get(&self, pool_ref: PoolRef) -> Option<&Value> {
        self.values.get(&pool_ref)
    }

    /// Check if a reference is stored
    pub fn contains(&self, pool_ref: PoolRef) -> bool {
        self.values.contains_key(&pool_ref)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
