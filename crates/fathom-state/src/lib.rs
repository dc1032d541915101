//! Fathom State - Versioned datastate store
//!
//! This crate provides the bottom layer of the fathom engine:
//! - Pool values (`Value`, `Point`) and the append-only `DataPool`
//! - Variable and pool identifiers (`VariableId`, `PoolRef`)
//! - `DataState` snapshots binding variables to pool entries
//! - `Simulation`, an undo/redo history of datastates with masking
//! - `MergedState`, the lazily cached union of the unmasked active states
//!
//! ## Masking
//!
//! ```text
//! levels:  initial  m1 register  m1 output  m2 register  m2 output
//!                                    ^
//! mask_states(Some("output"), Some("m1 output"))
//!                                                           masked
//! ```
//!
//! Masked states stay in the history and can be unmasked again. They are
//! only removed by `Simulation::pop_masked_states`.

mod datastate;
mod error;
mod identity;
mod merged;
mod pool;
mod simulation;
mod value;

pub use datastate::DataState;
pub use error::{Error, Result};
pub use identity::{PoolRef, VariableId};
pub use merged::MergedState;
pub use pool::DataPool;
pub use simulation::Simulation;
pub use value::{Point, Value};

// Re-export IndexMap for downstream crates
pub use indexmap::{IndexMap, IndexSet};
