//! Project - the simulations of one design study and their shared pool

use crate::error::{Error, Result};
use fathom_hub::OrderedSim;
use fathom_state::DataPool;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A set of simulations sharing one data pool
///
/// At most one simulation is active. Orchestrator calls act on the active
/// simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    title: String,
    pool: DataPool,
    simulations: Vec<OrderedSim>,
    active_index: Option<usize>,
}

impl Project {
    /// Create a project with no simulations
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pool: DataPool::new(),
            simulations: Vec::new(),
            active_index: None,
        }
    }

    /// Get the project title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the shared data pool
    pub fn pool(&self) -> &DataPool {
        &self.pool
    }

    /// Get the shared data pool mutably
    pub fn pool_mut(&mut self) -> &mut DataPool {
        &mut self.pool
    }

    /// Check if a simulation is active
    pub fn is_active(&self) -> bool {
        self.active_index.is_some()
    }

    /// Get the index of the active simulation
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Activate the simulation at `index`
    pub fn set_active_index(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if self.active_index != Some(index) {
            debug!(project = %self.title, index, "activating simulation");
            self.active_index = Some(index);
        }
        Ok(())
    }

    /// Activate the simulation with the given title
    pub fn set_active_title(&mut self, title: &str) -> Result<()> {
        let index = self
            .index_of(title)
            .ok_or_else(|| Error::SimulationNotFound(title.to_string()))?;
        self.set_active_index(index)
    }

    /// Add a simulation and return its index
    ///
    /// A simulation carrying the title of an existing one replaces it. The
    /// added simulation becomes active when `set_active` is given or when no
    /// simulation was active.
    pub fn add_simulation(&mut self, simulation: OrderedSim, set_active: bool) -> usize {
        let existing = simulation.title().and_then(|title| self.index_of(title));
        let index = match existing {
            Some(index) => {
                self.simulations[index] = simulation;
                index
            }
            None => {
                self.simulations.push(simulation);
                self.simulations.len() - 1
            }
        };

        if set_active || self.active_index.is_none() {
            self.active_index = Some(index);
        }
        index
    }

    /// Remove the simulation at `index`
    ///
    /// `active_index` (default 0) selects the active simulation afterwards,
    /// indexed into the remaining simulations.
    pub fn remove_simulation(
        &mut self,
        index: usize,
        active_index: Option<usize>,
    ) -> Result<OrderedSim> {
        self.check_index(index)?;
        let remaining = self.simulations.len() - 1;
        let active_index = active_index.unwrap_or(0);
        if remaining > 0 && active_index >= remaining {
            return Err(Error::IndexOutOfRange {
                index: active_index,
                len: remaining,
            });
        }

        let simulation = self.simulations.remove(index);
        self.active_index = (remaining > 0).then_some(active_index);
        Ok(simulation)
    }

    /// Get the active simulation
    pub fn simulation(&self) -> Result<&OrderedSim> {
        let index = self.require_active()?;
        Ok(&self.simulations[index])
    }

    /// Get the active simulation mutably
    pub fn simulation_mut(&mut self) -> Result<&mut OrderedSim> {
        let index = self.require_active()?;
        Ok(&mut self.simulations[index])
    }

    /// Split borrow of the pool and the active simulation
    pub fn active_parts_mut(&mut self) -> Result<(&mut DataPool, &mut OrderedSim)> {
        let index = self.require_active()?;
        Ok((&mut self.pool, &mut self.simulations[index]))
    }

    /// Get the simulation at `index`
    pub fn simulation_at(&self, index: usize) -> Result<&OrderedSim> {
        self.check_index(index)?;
        Ok(&self.simulations[index])
    }

    /// Get the simulation with the given title
    pub fn simulation_by_title(&self, title: &str) -> Result<&OrderedSim> {
        self.index_of(title)
            .map(|index| &self.simulations[index])
            .ok_or_else(|| Error::SimulationNotFound(title.to_string()))
    }

    /// Get the index of the simulation with the given title
    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.simulations
            .iter()
            .position(|sim| sim.title() == Some(title))
    }

    /// Titles of all titled simulations
    pub fn simulation_titles(&self) -> Vec<&str> {
        self.simulations.iter().filter_map(OrderedSim::title).collect()
    }

    /// Retitle the simulation at `index`
    ///
    /// `None` removes the title. Titles are unique within a project.
    pub fn set_simulation_title(&mut self, index: usize, title: Option<String>) -> Result<()> {
        self.check_index(index)?;
        if self.simulations[index].title() == title.as_deref() {
            return Ok(());
        }

        if let Some(title) = &title {
            if self.index_of(title).is_some() {
                return Err(Error::DuplicateTitle(title.clone()));
            }
        }

        self.simulations[index].set_title(title);
        Ok(())
    }

    /// Number of simulations
    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    /// Check if the project has no simulations
    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.simulations.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.simulations.len(),
            });
        }
        Ok(())
    }

    fn require_active(&self) -> Result<usize> {
        self.active_index
            .ok_or_else(|| Error::NoActiveSimulation(self.title.clone()))
    }
}
