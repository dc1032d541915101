//! Fathom Hub - Hub registry and interface scheduling
//!
//! This crate sits between the snapshot store (`fathom-state`) and the
//! orchestrator (`fathom-core`).
//!
//! ## Architecture
//!
//! ```text
//! OrderedSim
//!  │
//!  ├── Simulation ← datastates, masking, merged state
//!  │
//!  ├── Hub[] (hub_order) ← created from the HubDefinition queue
//!  │    └── InterfaceSlot[] ← Scheduled / Completed
//!  │
//!  ├── level map ← level → owning interface
//!  │
//!  └── status caches ← recomputed wholesale by refresh_status
//! ```
//!
//! ## Key Components
//!
//! - [`Hub`]: ordered (pipeline) or unordered registry of interfaces
//! - [`HubDefinition`]: one entry of the hub creation queue, loadable from RON
//! - [`InterfaceDeclaration`]: declared inputs and outputs of an interface
//! - [`OrderedSim`]: a simulation with hubs, levels and status caches
//!
//! ## Design Principles
//!
//! 1. **Status is derived** - recomputed from hubs and the merged state, never patched
//! 2. **fathom-state is standalone** - it does NOT know about hubs
//! 3. **Interfaces are ids** - the registry only sees declarations, never interface objects

mod config;
mod declaration;
mod error;
mod hub;
mod registry;
pub mod status;

pub use config::{
    default_hub_definitions, load_hub_definitions_file, load_hub_definitions_str, HubDefinition,
};
pub use declaration::{DeclarationLookup, InterfaceDeclaration};
pub use error::{Error, Result};
pub use hub::{Hub, HubKind, InterfaceSlot, SlotStatus};
pub use registry::{OrderedSim, OutputScope};
pub use status::{HubStatus, InterfaceStatus, Status, StatusMap};
