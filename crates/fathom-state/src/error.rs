//! Error types for fathom-state

use crate::{PoolRef, VariableId};
use thiserror::Error;

/// Snapshot store error type
///
/// The stack operations themselves are total; errors only arise when a
/// reference is resolved against the pool.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Pool reference not found: {0}")]
    RefNotFound(PoolRef),

    #[error("Variable not found in the active datastates: {0}")]
    VariableNotFound(VariableId),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
