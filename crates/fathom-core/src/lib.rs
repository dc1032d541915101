//! Fathom Core - Orchestrator for design-optimisation simulations
//!
//! This crate drives interfaces (external computational units) over the
//! simulations of a project. It owns no data itself: a [`Project`] holds
//! the simulations and their shared pool, [`Core`] holds the configuration
//! and the [`InterfaceCatalog`].
//!
//! ## Architecture
//!
//! ```text
//! Core (config + catalogue)
//!  │
//!  ├── Connector(hub) ← activate / execute / auto_execute
//!  │    └── Interface ← put_data → connect → get_data
//!  │
//!  ├── Branch(hub, interface) ← inspect / reset by level
//!  │
//!  └── Project
//!       ├── DataPool ← shared, append-only
//!       └── OrderedSim[] (one active)
//!            ├── Simulation ← datastates at levels
//!            └── Hub[] ← scheduled and completed interfaces
//! ```
//!
//! ## Execution
//!
//! Executing an interface appends a `"<level> register"` datastate, marks
//! the interface completed and appends its outputs at `"<level> output"`.
//! Inspecting or resetting to an earlier level works on those names.
//!
//! ## Design Principles
//!
//! 1. **Validate, then mutate** - a failing operation leaves the project as it was
//! 2. **Status is recomputed** - after every change to data, hubs or masks
//! 3. **Core is stateless across projects** - every call takes the project it acts on

mod branch;
mod config;
mod connector;
mod core;
mod error;
mod interface;
mod project;

pub use crate::core::Core;
pub use branch::Branch;
pub use config::{CoreConfig, Markers};
pub use connector::Connector;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use interface::{Interface, InterfaceCatalog, InterfaceFactory};
pub use project::Project;

pub use fathom_hub::{
    HubDefinition, HubKind, InterfaceDeclaration, InterfaceStatus, OrderedSim, OutputScope,
    Status,
};
pub use fathom_state::{DataPool, Point, Value, VariableId};
