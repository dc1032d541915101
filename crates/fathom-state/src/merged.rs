//! MergedState - the flattened view of all unmasked active datastates

use crate::{DataPool, DataState, Error, PoolRef, Result, Value, VariableId};
use indexmap::IndexMap;

/// Union of the bindings of a sequence of datastates
///
/// Later states override earlier ones. Masked states are skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedState {
    bindings: IndexMap<VariableId, PoolRef>,
}

impl MergedState {
    /// Merge the given states in order
    pub fn from_states<'a>(states: impl IntoIterator<Item = &'a DataState>) -> Self {
        let mut bindings = IndexMap::new();
        for state in states.into_iter().filter(|s| !s.is_masked()) {
            for (id, pool_ref) in state.bindings() {
                bindings.insert(id.clone(), *pool_ref);
            }
        }
        Self { bindings }
    }

    /// Check if a variable has a binding
    pub fn has_data(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    /// Get the binding for a variable
    pub fn binding(&self, id: &str) -> Option<PoolRef> {
        self.bindings.get(id).copied()
    }

    /// Resolve a variable against the pool
    pub fn value<'p>(&self, pool: &'p DataPool, id: &str) -> Result<&'p Value> {
        let pool_ref = self
            .binding(id)
            .ok_or_else(|| Error::VariableNotFound(VariableId::new(id)))?;
        pool.get(pool_ref).ok_or(Error::RefNotFound(pool_ref))
    }

    /// Iterate over the bound variable identifiers
    pub fn identifiers(&self) -> impl Iterator<Item = &VariableId> {
        self.bindings.keys()
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
