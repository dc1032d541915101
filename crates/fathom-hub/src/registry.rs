//! OrderedSim - a simulation with hubs, levels and status caches
//!
//! `OrderedSim` wraps a [`Simulation`] and adds everything the
//! orchestrator needs to schedule interfaces against it:
//!
//! - the hub creation queue and the created hubs in `hub_order`
//! - the level map, linking each level to the interface that produced it
//! - the execution and inspection levels
//! - the cached input/output status of every sequenced interface

use crate::config::HubDefinition;
use crate::declaration::DeclarationLookup;
use crate::error::{Error, Result};
use crate::hub::Hub;
use crate::status::{self, HubStatus, InterfaceStatus, Status, StatusMap};
use fathom_state::{DataState, IndexMap, IndexSet, Simulation, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Which theme results are shown alongside an inspected interface
///
/// Themes run twice after a module: once on that module's outputs alone
/// (`Local`) and once on all data (`Global`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputScope {
    Local,
    #[default]
    Global,
}

/// A simulation together with its hub registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderedSim {
    simulation: Simulation,
    hubs: IndexMap<String, Hub>,
    hub_queue: VecDeque<HubDefinition>,
    level_map: IndexMap<String, Option<String>>,
    execution_level: Option<String>,
    inspection_level: Option<String>,
    output_scope: Option<OutputScope>,
    input_status: StatusMap,
    output_status: StatusMap,
    unavailable_variables: Option<Vec<VariableId>>,
}

impl OrderedSim {
    /// Create a simulation with the given hub creation queue
    pub fn new(title: Option<String>, definitions: impl IntoIterator<Item = HubDefinition>) -> Self {
        Self {
            simulation: Simulation::new(title),
            hub_queue: definitions.into_iter().collect(),
            ..Self::default()
        }
    }

    // ========================================================================
    // Snapshot store
    // ========================================================================

    /// Get the underlying snapshot store
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Get mutable access to the underlying snapshot store
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Get the simulation title
    pub fn title(&self) -> Option<&str> {
        self.simulation.title()
    }

    /// Set the simulation title
    pub fn set_title(&mut self, title: Option<String>) {
        self.simulation.set_title(title);
    }

    /// Permanently remove every masked datastate
    ///
    /// Unlike masking this cannot be undone. The removed states are returned.
    pub fn delete_masked_states(&mut self) -> Vec<DataState> {
        let removed = self.simulation.pop_masked_states();
        if !removed.is_empty() {
            info!(count = removed.len(), "deleting masked datastates");
        }
        removed
    }

    // ========================================================================
    // Hubs
    // ========================================================================

    /// Pop the next definition from the hub creation queue
    pub fn next_hub_definition(&mut self) -> Result<HubDefinition> {
        self.hub_queue.pop_front().ok_or(Error::NoHubsQueued)
    }

    /// Peek at the remaining hub definitions
    pub fn queued_definitions(&self) -> impl Iterator<Item = &HubDefinition> {
        self.hub_queue.iter()
    }

    /// Register a hub at the end of `hub_order`
    pub fn set_hub(&mut self, hub: Hub) -> Result<()> {
        if self.hubs.contains_key(hub.id()) {
            return Err(Error::DuplicateHub(hub.id().to_string()));
        }

        debug!(hub = %hub.id(), kind = hub.kind().tag(), "registering hub");
        self.hubs.insert(hub.id().to_string(), hub);
        Ok(())
    }

    /// Get a hub
    pub fn hub(&self, hub_id: &str) -> Result<&Hub> {
        self.hubs
            .get(hub_id)
            .ok_or_else(|| Error::HubNotFound(hub_id.to_string()))
    }

    /// Get a hub mutably
    pub fn hub_mut(&mut self, hub_id: &str) -> Result<&mut Hub> {
        self.hubs
            .get_mut(hub_id)
            .ok_or_else(|| Error::HubNotFound(hub_id.to_string()))
    }

    /// Check if a hub exists
    pub fn has_hub(&self, hub_id: &str) -> bool {
        self.hubs.contains_key(hub_id)
    }

    /// Hub ids in creation order
    pub fn hub_order(&self) -> Vec<&str> {
        self.hubs.keys().map(String::as_str).collect()
    }

    /// Hubs in creation order
    pub fn hubs(&self) -> impl Iterator<Item = &Hub> {
        self.hubs.values()
    }

    /// Check if the interface is sequenced in the hub
    pub fn has_interface(&self, hub_id: &str, interface_id: &str) -> Result<bool> {
        Ok(self.hub(hub_id)?.has_interface(interface_id))
    }

    /// Schedule an interface at the end of a hub
    pub fn sequence_interface(&mut self, hub_id: &str, interface_id: &str) -> Result<()> {
        self.hub_mut(hub_id)?.sequence(interface_id)
    }

    /// Mark a scheduled interface completed
    pub fn set_interface_completed(&mut self, hub_id: &str, interface_id: &str) -> Result<()> {
        self.hub_mut(hub_id)?.set_completed(interface_id)
    }

    /// Remove every slot of a hub
    pub fn reset_hub(&mut self, hub_id: &str) -> Result<()> {
        self.hub_mut(hub_id)?.reset();
        Ok(())
    }

    /// Unschedule an interface and everything that depends on it
    ///
    /// Hubs are visited in `hub_order`:
    /// - `None` resets every hub
    /// - a hub id resets that hub and every later hub
    /// - an interface id truncates its hub from the interface onwards and
    ///   resets every later hub
    pub fn cascade_reset(&mut self, interface_id: Option<&str>) -> Result<()> {
        let Some(interface_id) = interface_id else {
            info!("resetting all hubs");
            for hub in self.hubs.values_mut() {
                hub.reset();
            }
            return Ok(());
        };

        let found = match self.hubs.get_index_of(interface_id) {
            Some(index) => {
                info!(hub = %interface_id, "resetting hub and later hubs");
                index
            }
            None => {
                let index = self
                    .hubs
                    .values()
                    .position(|hub| hub.has_interface(interface_id))
                    .ok_or_else(|| Error::InterfaceNotFoundInAnyHub(interface_id.to_string()))?;
                info!(interface = %interface_id, "rescheduling interface");
                index
            }
        };

        for (index, hub) in self.hubs.values_mut().enumerate().skip(found) {
            if index == found && hub.id() != interface_id {
                hub.truncate_from(interface_id)?;
            } else {
                hub.reset();
            }
        }

        Ok(())
    }

    // ========================================================================
    // Levels
    // ========================================================================

    /// Append an empty datastate at `level` and record its owner
    ///
    /// Returns the redo states discarded by the append.
    pub fn register_level(&mut self, level: &str, interface_id: Option<&str>) -> Vec<DataState> {
        debug!(level = %level, interface = ?interface_id, "registering level");
        let removed = self
            .simulation
            .add_state(DataState::with_level(level), false);
        self.level_map
            .insert(level.to_string(), interface_id.map(str::to_string));
        removed
    }

    /// Get the level map
    pub fn level_map(&self) -> &IndexMap<String, Option<String>> {
        &self.level_map
    }

    /// Check if a level has been registered
    pub fn has_level(&self, level: &str) -> bool {
        self.level_map.contains_key(level)
    }

    /// Get the interface that registered a level
    ///
    /// `None` when the level is unknown, `Some(None)` when it has no owner.
    pub fn level_owner(&self, level: &str) -> Option<Option<&str>> {
        self.level_map.get(level).map(Option::as_deref)
    }

    /// Get the level execution will continue from
    pub fn execution_level(&self) -> Option<&str> {
        self.execution_level.as_deref()
    }

    /// Set the execution level
    pub fn set_execution_level(&mut self, level: Option<String>) {
        debug!(level = ?level, "setting execution level");
        self.execution_level = level;
    }

    /// Get the level currently being inspected
    pub fn inspection_level(&self) -> Option<&str> {
        self.inspection_level.as_deref()
    }

    /// Set the inspection level
    pub fn set_inspection_level(&mut self, level: Option<String>) {
        debug!(level = ?level, "setting inspection level");
        self.inspection_level = level;
    }

    /// Get the last applied theme output scope
    pub fn output_scope(&self) -> Option<OutputScope> {
        self.output_scope
    }

    /// Record the theme output scope
    pub fn set_output_scope(&mut self, scope: Option<OutputScope>) {
        self.output_scope = scope;
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Get the globally forced-unavailable variables
    pub fn unavailable_variables(&self) -> Option<&[VariableId]> {
        self.unavailable_variables.as_deref()
    }

    /// Force variables unavailable as inputs of every hub
    pub fn set_unavailable_variables(&mut self, variables: Option<Vec<VariableId>>) {
        self.unavailable_variables = variables;
    }

    /// Cached input status of every sequenced interface
    pub fn input_statuses(&self) -> &StatusMap {
        &self.input_status
    }

    /// Cached output status of every sequenced interface
    pub fn output_statuses(&self) -> &StatusMap {
        &self.output_status
    }

    /// Cached input status of one interface
    pub fn input_status(&self, hub_id: &str, interface_id: &str) -> Option<&InterfaceStatus> {
        self.input_status.get(hub_id)?.get(interface_id)
    }

    /// Cached output status of one interface
    pub fn output_status(&self, hub_id: &str, interface_id: &str) -> Option<&InterfaceStatus> {
        self.output_status.get(hub_id)?.get(interface_id)
    }

    /// Input variable ids filtered by hub, interface and status
    pub fn input_ids(
        &self,
        hub_id: Option<&str>,
        interface_id: Option<&str>,
        valid_statuses: Option<&[Status]>,
    ) -> IndexSet<VariableId> {
        filter_ids(&self.input_status, hub_id, interface_id, valid_statuses)
    }

    /// Output variable ids filtered by hub, interface and status
    pub fn output_ids(
        &self,
        hub_id: Option<&str>,
        interface_id: Option<&str>,
        valid_statuses: Option<&[Status]>,
    ) -> IndexSet<VariableId> {
        filter_ids(&self.output_status, hub_id, interface_id, valid_statuses)
    }

    /// Variables a hub must treat as unavailable inputs
    ///
    /// The declared outputs of the still scheduled interfaces of every hub
    /// the hub names as force unavailable, plus the global list.
    pub fn force_unavailable_for(&self, hub_id: &str) -> Result<IndexSet<VariableId>> {
        self.force_unavailable_in(&self.output_status, hub_id)
    }

    fn force_unavailable_in(
        &self,
        outputs: &StatusMap,
        hub_id: &str,
    ) -> Result<IndexSet<VariableId>> {
        let hub = self.hub(hub_id)?;
        let mut unavailable = IndexSet::new();

        for other_id in hub.force_unavailable() {
            let Some(other) = self.hubs.get(other_id) else {
                continue;
            };
            let Some(statuses) = outputs.get(other_id) else {
                continue;
            };
            for interface_id in other.scheduled_ids() {
                if let Some(status) = statuses.get(interface_id) {
                    unavailable.extend(status.keys().cloned());
                }
            }
        }

        if let Some(global) = &self.unavailable_variables {
            unavailable.extend(global.iter().cloned());
        }

        Ok(unavailable)
    }

    /// Recompute every cached status, outputs first
    ///
    /// Outputs of the hub named `as_of_hub` are evaluated as of the
    /// interface owning the inspection level. Nothing is replaced unless the
    /// whole recomputation succeeds.
    pub fn refresh_status(
        &mut self,
        declarations: &dyn DeclarationLookup,
        as_of_hub: Option<&str>,
    ) -> Result<()> {
        let merged = self.simulation.merged_state();
        let forced_last = self
            .inspection_level
            .as_deref()
            .and_then(|level| self.level_map.get(level))
            .and_then(Option::as_deref);

        let mut outputs = StatusMap::new();
        for hub in self.hubs.values() {
            let force_last_completed = if as_of_hub == Some(hub.id()) {
                forced_last
            } else {
                None
            };

            let mut hub_status = HubStatus::new();
            for interface_id in hub.sequenced_ids() {
                let status = status::output_status(
                    hub,
                    interface_id,
                    declarations,
                    merged,
                    force_last_completed,
                )?;
                hub_status.insert(interface_id.to_string(), status);
            }
            outputs.insert(hub.id().to_string(), hub_status);
        }

        let mut inputs = StatusMap::new();
        for hub in self.hubs.values() {
            let unavailable = self.force_unavailable_in(&outputs, hub.id())?;

            let mut hub_status = HubStatus::new();
            for interface_id in hub.sequenced_ids() {
                let status =
                    status::input_status(hub, interface_id, declarations, merged, &unavailable)?;
                hub_status.insert(interface_id.to_string(), status);
            }
            inputs.insert(hub.id().to_string(), hub_status);
        }

        debug!(hubs = self.hubs.len(), "interface status refreshed");
        self.output_status = outputs;
        self.input_status = inputs;
        Ok(())
    }
}

fn filter_ids(
    statuses: &StatusMap,
    hub_id: Option<&str>,
    interface_id: Option<&str>,
    valid_statuses: Option<&[Status]>,
) -> IndexSet<VariableId> {
    statuses
        .iter()
        .filter(|(hub, _)| hub_id.map_or(true, |id| id == hub.as_str()))
        .flat_map(|(_, interfaces)| interfaces.iter())
        .filter(|(interface, _)| interface_id.map_or(true, |id| id == interface.as_str()))
        .flat_map(|(_, variables)| variables.iter())
        .filter(|(_, status)| valid_statuses.map_or(true, |valid| valid.contains(status)))
        .map(|(id, _)| id.clone())
        .collect()
}
