//! Identity types for variables and pool entries

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a value stored in the [`DataPool`](crate::DataPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolRef(pub u64);

impl PoolRef {
    /// Create a new pool reference
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw reference value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool:{}", self.0)
    }
}

/// Identifier of a variable, e.g. `"bathymetry.layers"`
///
/// Uses a string-based ID so definitions can name variables directly
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub String);

impl VariableId {
    /// Create a new variable ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariableId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VariableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for VariableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
