//! DataState - one named, maskable snapshot of variable bindings

use crate::{PoolRef, VariableId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A snapshot binding variables to values held in the pool
///
/// A state is immutable once appended to a [`Simulation`](crate::Simulation),
/// apart from its mask flag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataState {
    level: Option<String>,
    masked: bool,
    bindings: IndexMap<VariableId, PoolRef>,
}

impl DataState {
    /// Create an empty, unlevelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state at the given level
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: Some(level.into()),
            ..Self::default()
        }
    }

    /// Builder-style binding, handy when assembling a state before appending
    pub fn bind(mut self, id: impl Into<VariableId>, pool_ref: PoolRef) -> Self {
        self.insert(id, pool_ref);
        self
    }

    /// Bind a variable to a pool entry, replacing any earlier binding
    pub fn insert(&mut self, id: impl Into<VariableId>, pool_ref: PoolRef) {
        self.bindings.insert(id.into(), pool_ref);
    }

    /// Get the level name
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    /// Check whether the level contains the search string
    pub fn level_contains(&self, search_str: &str) -> bool {
        self.level
            .as_deref()
            .is_some_and(|level| level.contains(search_str))
    }

    /// Check if the state is masked
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub(crate) fn mask(&mut self) {
        self.masked = true;
    }

    pub(crate) fn unmask(&mut self) {
        self.masked = false;
    }

    /// Get the bindings of this state
    pub fn bindings(&self) -> &IndexMap<VariableId, PoolRef> {
        &self.bindings
    }

    /// Get the binding for one variable
    pub fn get(&self, id: &str) -> Option<PoolRef> {
        self.bindings.get(id).copied()
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if no variables are bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
