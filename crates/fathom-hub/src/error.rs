//! Error types for fathom-hub

use thiserror::Error;

/// Result type for fathom-hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the hub registry
#[derive(Debug, Error)]
pub enum Error {
    /// The hub definition queue is exhausted
    #[error("no hubs are queued for creation")]
    NoHubsQueued,

    /// Hub not found
    #[error("hub {0:?} not found")]
    HubNotFound(String),

    /// A hub with the same id already exists
    #[error("hub {0:?} already exists")]
    DuplicateHub(String),

    /// The interface is not scheduled in the hub
    #[error("interface {interface:?} is not scheduled in hub {hub:?}")]
    InterfaceNotScheduled { hub: String, interface: String },

    /// The interface is already sequenced in the hub
    #[error("interface {interface:?} is already sequenced in hub {hub:?}")]
    DuplicateInterface { hub: String, interface: String },

    /// Ordered hubs only complete their next scheduled interface
    #[error("interface {interface:?} is not the next interface in pipeline {hub:?}")]
    NotNextInPipeline { hub: String, interface: String },

    /// No hub holds the interface
    #[error("interface {0:?} not in any hub")]
    InterfaceNotFoundInAnyHub(String),

    /// No input/output declaration is known for the interface
    #[error("no declaration for interface {0:?}")]
    DeclarationNotFound(String),

    /// RON parse error in hub definitions
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// IO error while reading hub definitions
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot store error
    #[error("state error: {0}")]
    State(#[from] fathom_state::Error),
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
