//! Error types for fathom-core
//!
//! Every error classifies into one of three kinds through [`Error::kind`]:
//! malformed arguments, operations invoked in a state that forbids them,
//! and unknown identifiers.

use fathom_state::VariableId;
use thiserror::Error;

/// Result type for fathom-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by interface computations
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed argument
    Validation,
    /// Operation not allowed in the current state
    Precondition,
    /// Unknown identifier
    NotFound,
}

/// Errors that can occur in the orchestrator
#[derive(Debug, Error)]
pub enum Error {
    /// Hub definition carries an unrecognised type tag
    #[error("hub {name:?} has unknown type {hub_type:?}")]
    UnknownHubType { name: String, hub_type: String },

    /// Level is not among the active levels of the simulation
    #[error("level {level:?} is not available, active levels are {active:?}")]
    LevelNotActive { level: String, active: Vec<String> },

    /// Level has not been registered in the level map
    #[error("level {0:?} is not registered")]
    LevelNotFound(String),

    /// Interface inputs are not satisfied
    #[error("not all inputs of interface {0:?} have been satisfied")]
    InputsNotSatisfied(String),

    /// Interface is not offered for the interface kind of the hub
    #[error("interface {interface:?} is not available to hub {hub:?}")]
    InterfaceUnavailable { hub: String, interface: String },

    /// Interface is not registered in the catalogue
    #[error("interface {0:?} not found")]
    InterfaceNotFound(String),

    /// Interface id registered twice in the catalogue
    #[error("interface {0:?} is already registered")]
    DuplicateInterface(String),

    /// No simulation with the given title
    #[error("simulation {0:?} not found")]
    SimulationNotFound(String),

    /// Simulation title already in use
    #[error("simulation with title {0:?} already exists")]
    DuplicateTitle(String),

    /// Simulation index out of range
    #[error("simulation index {index} out of range for {len} simulations")]
    IndexOutOfRange { index: usize, len: usize },

    /// Project has no active simulation
    #[error("project {0:?} has no active simulation")]
    NoActiveSimulation(String),

    /// Variable has no data in the active datastate
    #[error("variable {0} is not contained in the active datastate")]
    VariableNotFound(VariableId),

    /// Interface computation failed
    #[error("interface {interface:?} failed: {source}")]
    Connect {
        interface: String,
        #[source]
        source: BoxError,
    },

    /// RON parse error in configuration
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hub registry error
    #[error("hub error: {0}")]
    Hub(#[from] fathom_hub::Error),

    /// Snapshot store error
    #[error("state error: {0}")]
    State(#[from] fathom_state::Error),
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownHubType { .. }
            | Error::LevelNotActive { .. }
            | Error::DuplicateInterface(_)
            | Error::DuplicateTitle(_)
            | Error::IndexOutOfRange { .. }
            | Error::Ron(_)
            | Error::Io(_) => ErrorKind::Validation,

            Error::InputsNotSatisfied(_)
            | Error::InterfaceUnavailable { .. }
            | Error::NoActiveSimulation(_)
            | Error::Connect { .. } => ErrorKind::Precondition,

            Error::LevelNotFound(_)
            | Error::InterfaceNotFound(_)
            | Error::SimulationNotFound(_)
            | Error::VariableNotFound(_)
            | Error::State(_) => ErrorKind::NotFound,

            Error::Hub(err) => match err {
                fathom_hub::Error::DuplicateHub(_)
                | fathom_hub::Error::DuplicateInterface { .. }
                | fathom_hub::Error::Ron(_)
                | fathom_hub::Error::Io(_) => ErrorKind::Validation,
                fathom_hub::Error::NoHubsQueued
                | fathom_hub::Error::InterfaceNotScheduled { .. }
                | fathom_hub::Error::NotNextInPipeline { .. }
                | fathom_hub::Error::InterfaceNotFoundInAnyHub(_) => ErrorKind::Precondition,
                fathom_hub::Error::HubNotFound(_)
                | fathom_hub::Error::DeclarationNotFound(_)
                | fathom_hub::Error::State(_) => ErrorKind::NotFound,
            },
        }
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
