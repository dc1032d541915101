//! Hub - a named registry of interfaces admitted into the pipeline
//!
//! A hub never runs anything itself. It records which interfaces are
//! scheduled, which have completed and in what order they completed.
//!
//! ```text
//! slots:       [ hydro (Completed) | elec (Completed) | moorings (Scheduled) ]
//! completion:  [ hydro, elec ]
//! next:        moorings            (ordered hubs only complete this one)
//! ```

use crate::config::HubDefinition;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordering discipline of a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HubKind {
    /// Interfaces complete strictly in slot order ("Pipeline")
    Ordered,
    /// Any scheduled interface may complete ("Hub")
    Unordered,
}

impl HubKind {
    /// Parse a hub type tag as it appears in hub definitions
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Pipeline" => Some(HubKind::Ordered),
            "Hub" => Some(HubKind::Unordered),
            _ => None,
        }
    }

    /// Get the hub type tag
    pub fn tag(&self) -> &'static str {
        match self {
            HubKind::Ordered => "Pipeline",
            HubKind::Unordered => "Hub",
        }
    }
}

/// Status of an interface held in a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Scheduled,
    Completed,
}

/// One interface admitted into a hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSlot {
    pub interface_id: String,
    pub status: SlotStatus,
}

/// A named, ordered registry of interfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    id: String,
    kind: HubKind,
    interface_kind: String,
    force_completed: bool,
    no_complete: bool,
    force_unavailable: Vec<String>,
    slots: Vec<InterfaceSlot>,
    completion_order: Vec<String>,
}

impl Hub {
    /// Create an empty hub
    pub fn new(id: impl Into<String>, kind: HubKind, interface_kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            interface_kind: interface_kind.into(),
            force_completed: false,
            no_complete: false,
            force_unavailable: Vec::new(),
            slots: Vec::new(),
            completion_order: Vec::new(),
        }
    }

    /// Create a hub from its definition
    ///
    /// The type tag has already been parsed into `kind` by the caller.
    pub fn from_definition(definition: &HubDefinition, kind: HubKind) -> Self {
        Self::new(&definition.name, kind, &definition.interface)
            .with_no_complete(definition.no_complete)
            .with_force_unavailable(definition.force_unavailable.clone().unwrap_or_default())
    }

    /// Builder-style setter for the no-complete flag
    pub fn with_no_complete(mut self, no_complete: bool) -> Self {
        self.no_complete = no_complete;
        self
    }

    /// Builder-style setter for the hubs whose pending outputs are unavailable here
    pub fn with_force_unavailable(mut self, hub_ids: Vec<String>) -> Self {
        self.force_unavailable = hub_ids;
        self
    }

    /// Get the hub id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the hub kind
    pub fn kind(&self) -> HubKind {
        self.kind
    }

    /// Get the interface kind this hub draws from
    pub fn interface_kind(&self) -> &str {
        &self.interface_kind
    }

    /// Check if every input of this hub is forced unavailable
    pub fn force_completed(&self) -> bool {
        self.force_completed
    }

    /// Set the force-completed flag
    pub fn set_force_completed(&mut self, force_completed: bool) {
        self.force_completed = force_completed;
    }

    /// Check if completion is a no-op for this hub
    pub fn no_complete(&self) -> bool {
        self.no_complete
    }

    /// Get the hubs whose scheduled outputs are unavailable to this hub
    pub fn force_unavailable(&self) -> &[String] {
        &self.force_unavailable
    }

    /// Get the slots in scheduling order
    pub fn slots(&self) -> &[InterfaceSlot] {
        &self.slots
    }

    /// Check if the interface has been sequenced, completed or not
    pub fn has_interface(&self, interface_id: &str) -> bool {
        self.position(interface_id).is_some()
    }

    /// Append an interface as scheduled
    pub fn sequence(&mut self, interface_id: impl Into<String>) -> Result<()> {
        let interface_id = interface_id.into();
        if self.has_interface(&interface_id) {
            return Err(Error::DuplicateInterface {
                hub: self.id.clone(),
                interface: interface_id,
            });
        }

        debug!(hub = %self.id, interface = %interface_id, "sequencing interface");
        self.slots.push(InterfaceSlot {
            interface_id,
            status: SlotStatus::Scheduled,
        });
        Ok(())
    }

    /// Interface ids in slot order
    pub fn sequenced_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.interface_id.as_str()).collect()
    }

    /// Scheduled (not completed) interface ids in slot order
    pub fn scheduled_ids(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.status == SlotStatus::Scheduled)
            .map(|s| s.interface_id.as_str())
            .collect()
    }

    /// Completed interface ids in completion order
    pub fn completed_ids(&self) -> Vec<&str> {
        self.completion_order.iter().map(String::as_str).collect()
    }

    /// Check if any interface is still scheduled
    pub fn any_scheduled(&self) -> bool {
        self.slots.iter().any(|s| s.status == SlotStatus::Scheduled)
    }

    /// First scheduled interface in slot order
    pub fn next_scheduled(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.status == SlotStatus::Scheduled)
            .map(|s| s.interface_id.as_str())
    }

    /// Most recently completed interface
    pub fn last_completed(&self) -> Option<&str> {
        self.completion_order.last().map(String::as_str)
    }

    /// Check if the interface has completed
    pub fn is_completed(&self, interface_id: &str) -> bool {
        self.slots
            .iter()
            .any(|s| s.interface_id == interface_id && s.status == SlotStatus::Completed)
    }

    /// Check that the interface may be completed now, without changing anything
    pub fn check_completable(&self, interface_id: &str) -> Result<()> {
        let scheduled = self
            .slots
            .iter()
            .any(|s| s.interface_id == interface_id && s.status == SlotStatus::Scheduled);
        if !scheduled {
            return Err(Error::InterfaceNotScheduled {
                hub: self.id.clone(),
                interface: interface_id.to_string(),
            });
        }

        if self.kind == HubKind::Ordered && self.next_scheduled() != Some(interface_id) {
            return Err(Error::NotNextInPipeline {
                hub: self.id.clone(),
                interface: interface_id.to_string(),
            });
        }

        Ok(())
    }

    /// Transition a slot from scheduled to completed
    ///
    /// A no-complete hub validates the request but keeps the slot scheduled.
    pub fn set_completed(&mut self, interface_id: &str) -> Result<()> {
        self.check_completable(interface_id)?;

        if self.no_complete {
            debug!(hub = %self.id, interface = %interface_id, "completion suppressed");
            return Ok(());
        }

        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.interface_id == interface_id)
        {
            slot.status = SlotStatus::Completed;
        }
        self.completion_order.push(interface_id.to_string());
        debug!(hub = %self.id, interface = %interface_id, "interface completed");
        Ok(())
    }

    /// Remove the interface and every slot after it
    ///
    /// Returns the number of slots removed.
    pub fn truncate_from(&mut self, interface_id: &str) -> Result<usize> {
        let position = self
            .position(interface_id)
            .ok_or_else(|| Error::InterfaceNotScheduled {
                hub: self.id.clone(),
                interface: interface_id.to_string(),
            })?;

        let removed: Vec<InterfaceSlot> = self.slots.drain(position..).collect();
        self.completion_order
            .retain(|id| !removed.iter().any(|s| &s.interface_id == id));

        debug!(hub = %self.id, interface = %interface_id, removed = removed.len(), "truncating hub");
        Ok(removed.len())
    }

    /// Remove every slot
    pub fn reset(&mut self) {
        debug!(hub = %self.id, "resetting hub");
        self.slots.clear();
        self.completion_order.clear();
    }

    /// Scheduled interfaces that precede the interface in an ordered hub
    ///
    /// Empty for unordered hubs and for interfaces that are not scheduled.
    pub fn preceding_scheduled(&self, interface_id: &str) -> Vec<&str> {
        if self.kind == HubKind::Unordered {
            return Vec::new();
        }

        let scheduled = self.scheduled_ids();
        match scheduled.iter().position(|id| *id == interface_id) {
            Some(index) => scheduled[..index].to_vec(),
            None => Vec::new(),
        }
    }

    fn position(&self, interface_id: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.interface_id == interface_id)
    }
}
