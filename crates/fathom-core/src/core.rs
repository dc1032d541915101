//! Core - orchestration of projects, simulations, levels and hubs
//!
//! Core owns the configuration and the interface catalogue. It never owns
//! a project: every call takes the project it acts on, and acts on that
//! project's active simulation.
//!
//! ## Levels
//!
//! ```text
//! initial | hydro register | hydro output | elec register | elec output
//!                                 ^
//! inspect_level("hydro output")   └ outputs after this are masked
//! reset_level("elec register")    └ elec is unscheduled, its states deleted
//! ```

use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::interface::InterfaceCatalog;
use crate::project::Project;
use fathom_hub::{Hub, OrderedSim, OutputScope};
use fathom_state::{DataPool, DataState, IndexMap, IndexSet, Simulation, Value, VariableId};
use tracing::{debug, info};

/// The orchestrator
#[derive(Debug, Default)]
pub struct Core {
    config: CoreConfig,
    catalog: InterfaceCatalog,
}

impl Core {
    /// Create a core with the default configuration
    pub fn new(catalog: InterfaceCatalog) -> Self {
        Self::with_config(CoreConfig::default(), catalog)
    }

    /// Create a core with the given configuration
    pub fn with_config(config: CoreConfig, catalog: InterfaceCatalog) -> Self {
        Self { config, catalog }
    }

    /// Get the configuration
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Get the interface catalogue
    pub fn catalog(&self) -> &InterfaceCatalog {
        &self.catalog
    }

    /// Get the interface catalogue mutably
    pub fn catalog_mut(&mut self) -> &mut InterfaceCatalog {
        &mut self.catalog
    }

    // ========================================================================
    // Projects and simulations
    // ========================================================================

    /// Create a project holding one new, active simulation
    pub fn new_project(&self, title: &str, simulation_title: &str) -> Result<Project> {
        let mut project = Project::new(title);
        self.new_simulation(&mut project, Some(simulation_title.to_string()))?;
        info!(project = %title, "created project");
        Ok(project)
    }

    /// Add a new simulation at the initial level and return its index
    ///
    /// The simulation becomes active only when no other simulation is.
    pub fn new_simulation(&self, project: &mut Project, title: Option<String>) -> Result<usize> {
        if let Some(title) = &title {
            if project.index_of(title).is_some() {
                return Err(Error::DuplicateTitle(title.clone()));
            }
        }

        let initial = self.config.markers.initial.clone();
        let mut simulation = OrderedSim::new(title, self.config.hubs.iter().cloned());
        simulation.register_level(&initial, None);
        simulation.set_execution_level(Some(initial.clone()));
        simulation.set_inspection_level(Some(initial));

        Ok(project.add_simulation(simulation, false))
    }

    /// Copy the simulation at `index` and return the index of the copy
    ///
    /// The copy shares the project pool. A `None` title leaves it untitled.
    pub fn clone_simulation(
        &self,
        project: &mut Project,
        index: usize,
        title: Option<String>,
        set_active: bool,
    ) -> Result<usize> {
        if let Some(title) = &title {
            if project.index_of(title).is_some() {
                return Err(Error::DuplicateTitle(title.clone()));
            }
        }

        let mut simulation = project.simulation_at(index)?.clone();
        simulation.set_title(title);
        info!(source = index, title = ?simulation.title(), "cloned simulation");
        Ok(project.add_simulation(simulation, set_active))
    }

    /// Remove the simulation at `index`
    pub fn remove_simulation(
        &self,
        project: &mut Project,
        index: usize,
        active_index: Option<usize>,
    ) -> Result<OrderedSim> {
        let simulation = project.remove_simulation(index, active_index)?;
        info!(index, title = ?simulation.title(), "removed simulation");
        Ok(simulation)
    }

    // ========================================================================
    // Hubs
    // ========================================================================

    /// Create the next hub in the queue of the active simulation
    pub fn new_hub(&self, project: &mut Project) -> Result<()> {
        let simulation = project.simulation_mut()?;

        if let Some(definition) = simulation.queued_definitions().next() {
            if definition.kind().is_none() {
                return Err(Error::UnknownHubType {
                    name: definition.name.clone(),
                    hub_type: definition.hub_type.clone(),
                });
            }
        }

        let definition = simulation.next_hub_definition()?;
        let kind = definition.kind().ok_or_else(|| Error::UnknownHubType {
            name: definition.name.clone(),
            hub_type: definition.hub_type.clone(),
        })?;

        simulation.set_hub(Hub::from_definition(&definition, kind))?;
        info!(hub = %definition.name, hub_type = %definition.hub_type, "created hub");
        Ok(())
    }

    /// Unschedule an interface and reset every hub after it
    ///
    /// `None` resets all hubs, a hub id resets that hub and every later one.
    pub fn schedule_interface(
        &self,
        project: &mut Project,
        interface_id: Option<&str>,
    ) -> Result<()> {
        project.simulation_mut()?.cascade_reset(interface_id)?;
        Ok(())
    }

    /// Recompute the input and output status of every sequenced interface
    pub fn set_interface_status(&self, project: &mut Project) -> Result<()> {
        self.refresh_status(project.simulation_mut()?)
    }

    fn refresh_status(&self, simulation: &mut OrderedSim) -> Result<()> {
        simulation.refresh_status(&self.catalog, self.config.inspection_hub.as_deref())?;
        Ok(())
    }

    // ========================================================================
    // Datastates
    // ========================================================================

    /// Store values in the pool and append them as one datastate
    pub fn add_datastate<I, K, V>(
        &self,
        project: &mut Project,
        level: Option<&str>,
        data: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<VariableId>,
        V: Into<Value>,
    {
        let (pool, simulation) = project.active_parts_mut()?;

        let mut state = match level {
            Some(level) => DataState::with_level(level),
            None => DataState::new(),
        };
        for (id, value) in data {
            let pool_ref = pool.put(value);
            state.insert(id, pool_ref);
        }

        info!(level = ?level, count = state.len(), "data added");
        simulation.simulation_mut().add_state(state, false);
        self.refresh_status(simulation)
    }

    /// Mask datastates, recomputing status if anything changed
    pub fn mask_states(
        &self,
        project: &mut Project,
        search_str: Option<&str>,
        mask_after: Option<&str>,
    ) -> Result<usize> {
        let simulation = project.simulation_mut()?;
        let count = simulation
            .simulation_mut()
            .mask_states(search_str, mask_after);
        if count > 0 {
            self.refresh_status(simulation)?;
        }
        Ok(count)
    }

    /// Unmask datastates, recomputing status if anything changed
    pub fn unmask_states(&self, project: &mut Project, search_str: Option<&str>) -> Result<usize> {
        let simulation = project.simulation_mut()?;
        let count = simulation.simulation_mut().unmask_states(search_str);
        if count > 0 {
            self.refresh_status(simulation)?;
        }
        Ok(count)
    }

    // ========================================================================
    // Levels
    // ========================================================================

    /// Append an empty datastate at `level`, owned by `interface_id`
    pub fn register_level(
        &self,
        project: &mut Project,
        level: &str,
        interface_id: Option<&str>,
    ) -> Result<()> {
        project
            .simulation_mut()?
            .register_level(level, interface_id);
        Ok(())
    }

    /// Distinct active levels of the active simulation, oldest first
    pub fn get_levels(&self, project: &Project, show_masked: bool) -> Result<IndexSet<String>> {
        Ok(project
            .simulation()?
            .simulation()
            .get_active_levels(false, show_masked)
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }

    /// Show the data as of `level`, masking every output level after it
    ///
    /// `inspection_level` (default `level`) must be a registered level; it
    /// selects the interface whose outputs are inspected.
    pub fn inspect_level(
        &self,
        project: &mut Project,
        level: &str,
        inspection_level: Option<&str>,
        force: bool,
        skip_missing: bool,
    ) -> Result<()> {
        let level = level.to_lowercase();
        let simulation = project.simulation_mut()?;

        if !force && simulation.inspection_level() == Some(level.as_str()) {
            return Ok(());
        }

        check_active_level(simulation.simulation(), &level)?;

        let inspection_level = inspection_level.unwrap_or(&level).to_string();
        if !simulation.has_level(&inspection_level) {
            if skip_missing {
                debug!(level = %inspection_level, "level not valid for inspection, skipping");
                return Ok(());
            }
            return Err(Error::LevelNotFound(inspection_level));
        }

        info!(level = %level, "inspecting level");
        self.mask_outputs_after(simulation, &level);
        simulation.set_inspection_level(Some(inspection_level));
        self.refresh_status(simulation)
    }

    /// Prepare the simulation for re-execution from `level`
    ///
    /// Interfaces after the level are unscheduled and their datastates are
    /// deleted for good. `None` resets to the inspection level. Unless
    /// `preserve_level` is given the level's own datastates go too.
    /// `force_scheduled` names a hub whose force-completed flag is cleared.
    pub fn reset_level(
        &self,
        project: &mut Project,
        level: Option<&str>,
        preserve_level: bool,
        force_scheduled: Option<&str>,
        skip_missing: bool,
    ) -> Result<()> {
        let simulation = project.simulation_mut()?;

        if level == simulation.execution_level() {
            return Ok(());
        }

        let level = match level {
            Some(level) => level.to_lowercase(),
            None => simulation
                .inspection_level()
                .map(str::to_string)
                .ok_or_else(|| Error::LevelNotFound(String::new()))?,
        };

        let owner = match simulation.level_owner(&level) {
            Some(owner) => owner.map(str::to_string),
            None if skip_missing => {
                debug!(level = %level, "level not valid for execution, skipping");
                return Ok(());
            }
            None => return Err(Error::LevelNotFound(level)),
        };

        check_active_level(simulation.simulation(), &level)?;
        if let Some(hub_id) = force_scheduled {
            simulation.hub(hub_id)?;
        }
        if let Some(interface_id) = owner.as_deref() {
            let known = simulation.has_hub(interface_id)
                || simulation.hubs().any(|hub| hub.has_interface(interface_id));
            if !known {
                let err = fathom_hub::Error::InterfaceNotFoundInAnyHub(interface_id.to_string());
                return Err(err.into());
            }
        }

        self.mask_outputs_after(simulation, &level);
        simulation.set_inspection_level(Some(level.clone()));

        info!(level = %level, "resetting to level");
        let store = simulation.simulation_mut();
        store.mask_states(Some(&self.config.markers.register), Some(&level));
        if !preserve_level {
            store.mask_states(Some(&level), None);
        }

        simulation.cascade_reset(owner.as_deref())?;
        simulation.delete_masked_states();
        simulation.set_execution_level(Some(level));

        if let Some(hub_id) = force_scheduled {
            simulation.hub_mut(hub_id)?.set_force_completed(false);
        }

        self.refresh_status(simulation)
    }

    /// Show the theme results of one output scope for the inspected interface
    ///
    /// `None` reapplies the recorded scope, global when none was recorded.
    /// Theme levels of the other scope, and of other interfaces, are masked.
    pub fn set_output_scope(
        &self,
        project: &mut Project,
        scope: Option<OutputScope>,
    ) -> Result<()> {
        let simulation = project.simulation_mut()?;
        let scope = scope.or(simulation.output_scope()).unwrap_or_default();
        simulation.set_output_scope(Some(scope));

        let owner = simulation
            .inspection_level()
            .and_then(|level| simulation.level_owner(level))
            .flatten();
        let Some(owner) = owner else {
            debug!(scope = ?scope, "no inspected interface, output scope recorded");
            return Ok(());
        };
        let unmask_level = format!("{} {}", owner.to_lowercase(), self.config.scope_marker(scope));

        info!(level = %unmask_level, "setting output scope");
        let store = simulation.simulation_mut();
        store.mask_states(Some(self.config.markers.local.as_str()), None);
        store.mask_states(Some(self.config.markers.global.as_str()), None);
        store.unmask_states(Some(&unmask_level));
        self.refresh_status(simulation)
    }

    fn mask_outputs_after(&self, simulation: &mut OrderedSim, level: &str) {
        let store = simulation.simulation_mut();
        store.unmask_states(None);
        store.mask_states(Some(&self.config.markers.output), Some(level));
    }

    // ========================================================================
    // Data
    // ========================================================================

    /// Check if a variable has data in the active simulation
    pub fn has_data(&self, project: &Project, id: &str) -> Result<bool> {
        Ok(project.simulation()?.simulation().has_data(id))
    }

    /// Get the value of a variable, optionally as of an active level
    pub fn get_data_value<'p>(
        &self,
        project: &'p Project,
        id: &str,
        level: Option<&str>,
    ) -> Result<&'p Value> {
        let simulation = project.simulation()?.simulation();
        let value = match level {
            None => simulation.merged_state().value(project.pool(), id),
            Some(level) => {
                let level = level.to_lowercase();
                check_active_level(simulation, &level)?;
                as_of_level(simulation, &level, &[])
                    .merged_state()
                    .value(project.pool(), id)
            }
        };

        value.map_err(|err| match err {
            fathom_state::Error::VariableNotFound(id) => Error::VariableNotFound(id),
            other => Error::State(other),
        })
    }

    /// Get the value of a variable as of each level
    ///
    /// `levels` defaults to every active level. Levels at which the variable
    /// has no data are left out. `force_masks` hides every datastate whose
    /// level contains one of the given strings, except the level itself.
    pub fn get_level_values<'p>(
        &self,
        project: &'p Project,
        id: &str,
        levels: Option<&[&str]>,
        force_masks: Option<&[&str]>,
    ) -> Result<IndexMap<String, &'p Value>> {
        let simulation = project.simulation()?.simulation();
        let levels: Vec<String> = match levels {
            Some(levels) => levels.iter().map(|level| level.to_lowercase()).collect(),
            None => self.get_levels(project, true)?.into_iter().collect(),
        };
        for level in &levels {
            check_active_level(simulation, level)?;
        }

        let force_masks = force_masks.unwrap_or_default();
        let mut values = IndexMap::new();
        for level in levels {
            let view = as_of_level(simulation, &level, force_masks);
            if let Some(value) = value_in(&view, project.pool(), id)? {
                values.insert(level, value);
            }
        }

        Ok(values)
    }

    /// Get the value of a variable in every simulation of the project
    ///
    /// Entries pair the simulation title with its value, optionally read as
    /// of `level`. A simulation without the level or without data yields
    /// `None`, and such entries are dropped unless `allow_none` is given.
    /// `indexes` selects and orders the simulations read.
    pub fn get_project_values<'p>(
        &self,
        project: &'p Project,
        id: &str,
        level: Option<&str>,
        indexes: Option<&[usize]>,
        allow_none: bool,
    ) -> Result<Vec<(Option<&'p str>, Option<&'p Value>)>> {
        let indexes: Vec<usize> = match indexes {
            Some(indexes) => indexes.to_vec(),
            None => (0..project.len()).collect(),
        };
        let level = level.map(str::to_lowercase);

        let mut values = Vec::new();
        for index in indexes {
            let simulation = project.simulation_at(index)?;
            let store = simulation.simulation();
            let value = match &level {
                None => value_in(store, project.pool(), id)?,
                Some(level) if store.has_active_level(level, true) => {
                    value_in(&as_of_level(store, level, &[]), project.pool(), id)?
                }
                Some(_) => None,
            };

            if value.is_some() || allow_none {
                values.push((simulation.title(), value));
            }
        }

        Ok(values)
    }
}

fn check_active_level(simulation: &Simulation, level: &str) -> Result<()> {
    if simulation.has_active_level(level, true) {
        return Ok(());
    }

    let active = simulation
        .get_active_levels(false, true)
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Err(Error::LevelNotActive {
        level: level.to_string(),
        active,
    })
}

fn as_of_level(simulation: &Simulation, level: &str, force_masks: &[&str]) -> Simulation {
    let mut view = simulation.clone();
    view.unmask_states(None);
    view.mask_states(None, Some(level));

    if !force_masks.is_empty() {
        for mask in force_masks {
            view.mask_states(Some(mask), None);
        }
        view.unmask_states(Some(level));
    }
    view
}

fn value_in<'p>(view: &Simulation, pool: &'p DataPool, id: &str) -> Result<Option<&'p Value>> {
    if !view.has_data(id) {
        return Ok(None);
    }
    Ok(Some(view.merged_state().value(pool, id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::testing::TableInterface;
    use crate::ErrorKind;

    fn core() -> Core {
        let mut catalog = InterfaceCatalog::new();
        catalog
            .register(
                "ProjectInterface",
                TableInterface::factory("Site", &[], &[], &["site.depth"]),
            )
            .unwrap();
        catalog
            .register(
                "ModuleInterface",
                TableInterface::factory("Hydro", &["site.depth"], &[], &["array.layout"]),
            )
            .unwrap();
        catalog
            .register(
                "ModuleInterface",
                TableInterface::factory("Elec", &["array.layout"], &[], &["cable.route"]),
            )
            .unwrap();
        catalog
            .register(
                "ThemeInterface",
                TableInterface::factory("Economics", &["array.layout"], &["cable.route"], &["lcoe"]),
            )
            .unwrap();
        Core::new(catalog)
    }

    fn project_with_hubs(core: &Core) -> Project {
        let mut project = core.new_project("Array study", "Default").unwrap();
        for _ in 0..3 {
            core.new_hub(&mut project).unwrap();
        }
        project
    }

    fn levels(core: &Core, project: &Project, show_masked: bool) -> Vec<String> {
        core.get_levels(project, show_masked)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_new_project_registers_initial_level() {
        let core = core();
        let project = core.new_project("Array study", "Default").unwrap();

        let simulation = project.simulation().unwrap();
        assert_eq!(simulation.title(), Some("Default"));
        assert_eq!(simulation.execution_level(), Some("initial"));
        assert_eq!(simulation.inspection_level(), Some("initial"));
        assert_eq!(simulation.level_owner("initial"), Some(None));
        assert_eq!(levels(&core, &project, true), vec!["initial"]);
    }

    #[test]
    fn test_new_simulation_duplicate_title() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();

        let result = core.new_simulation(&mut project, Some("Default".to_string()));
        assert!(matches!(result, Err(Error::DuplicateTitle(_))));

        let index = core
            .new_simulation(&mut project, Some("Variant".to_string()))
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(project.active_index(), Some(0));
        assert!(project.simulation_at(1).unwrap().has_level("initial"));
    }

    #[test]
    fn test_new_hub_queue() {
        let core = core();
        let mut project = project_with_hubs(&core);

        let simulation = project.simulation().unwrap();
        assert_eq!(simulation.hub_order(), vec!["project", "modules", "themes"]);
        assert!(simulation.hub("themes").unwrap().no_complete());

        let err = core.new_hub(&mut project).unwrap_err();
        assert!(matches!(err, Error::Hub(fathom_hub::Error::NoHubsQueued)));
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_new_hub_unknown_type_keeps_queue() {
        let mut config = CoreConfig::default();
        config.hubs[0].hub_type = "Queue".to_string();
        let core = Core::with_config(config, InterfaceCatalog::new());
        let mut project = core.new_project("Array study", "Default").unwrap();

        let result = core.new_hub(&mut project);
        assert!(matches!(result, Err(Error::UnknownHubType { .. })));
        assert_eq!(
            project.simulation().unwrap().queued_definitions().count(),
            3
        );
    }

    #[test]
    fn test_add_datastate_updates_status() {
        let core = core();
        let mut project = project_with_hubs(&core);
        project
            .simulation_mut()
            .unwrap()
            .sequence_interface("modules", "Hydro")
            .unwrap();
        core.set_interface_status(&mut project).unwrap();

        let status = project.simulation().unwrap().input_status("modules", "Hydro");
        assert_eq!(status.unwrap()["site.depth"], fathom_hub::Status::Required);

        core.add_datastate(&mut project, None, [("site.depth", 50.0)])
            .unwrap();

        let status = project.simulation().unwrap().input_status("modules", "Hydro");
        assert_eq!(status.unwrap()["site.depth"], fathom_hub::Status::Satisfied);
        assert!(core.has_data(&project, "site.depth").unwrap());
        assert_eq!(
            core.get_data_value(&project, "site.depth", None).unwrap(),
            &Value::Float(50.0)
        );
    }

    #[test]
    fn test_get_data_value_missing() {
        let core = core();
        let project = core.new_project("Array study", "Default").unwrap();

        let err = core.get_data_value(&project, "site.depth", None).unwrap_err();
        assert!(matches!(err, Error::VariableNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_values_as_of_level() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.add_datastate(&mut project, Some("survey a"), [("site.depth", 40.0)])
            .unwrap();
        core.add_datastate(&mut project, Some("survey b"), [("site.depth", 45.0)])
            .unwrap();

        assert_eq!(
            core.get_data_value(&project, "site.depth", Some("survey a"))
                .unwrap(),
            &Value::Float(40.0)
        );
        assert_eq!(
            core.get_data_value(&project, "site.depth", None).unwrap(),
            &Value::Float(45.0)
        );

        let values = core.get_level_values(&project, "site.depth", None, None).unwrap();
        assert!(!values.contains_key("initial"));
        assert_eq!(values["survey a"], &Value::Float(40.0));
        assert_eq!(values["survey b"], &Value::Float(45.0));

        let result = core.get_data_value(&project, "site.depth", Some("survey c"));
        assert!(matches!(result, Err(Error::LevelNotActive { .. })));
    }

    #[test]
    fn test_mask_and_unmask_counts() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.add_datastate(&mut project, Some("hydro output"), [("array.layout", "grid")])
            .unwrap();

        assert_eq!(core.mask_states(&mut project, Some("output"), None).unwrap(), 1);
        assert!(!core.has_data(&project, "array.layout").unwrap());
        assert_eq!(core.mask_states(&mut project, Some("output"), None).unwrap(), 0);
        assert_eq!(core.unmask_states(&mut project, None).unwrap(), 1);
        assert!(core.has_data(&project, "array.layout").unwrap());
    }

    #[test]
    fn test_inspect_level_masks_later_outputs() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.register_level(&mut project, "hydro register", Some("Hydro"))
            .unwrap();
        core.add_datastate(&mut project, Some("hydro output"), [("array.layout", "grid")])
            .unwrap();
        core.register_level(&mut project, "elec register", Some("Elec"))
            .unwrap();
        core.add_datastate(&mut project, Some("elec output"), [("cable.route", "radial")])
            .unwrap();

        core.inspect_level(
            &mut project,
            "Hydro Output",
            Some("hydro register"),
            false,
            false,
        )
        .unwrap();
        assert_eq!(
            levels(&core, &project, false),
            vec!["initial", "hydro register", "hydro output", "elec register"]
        );
        assert!(!core.has_data(&project, "cable.route").unwrap());

        // Masked levels can still be inspected
        core.inspect_level(
            &mut project,
            "elec output",
            Some("elec register"),
            false,
            false,
        )
        .unwrap();
        assert!(core.has_data(&project, "cable.route").unwrap());
        assert_eq!(
            project.simulation().unwrap().inspection_level(),
            Some("elec register")
        );
    }

    #[test]
    fn test_inspect_level_errors() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.register_level(&mut project, "hydro register", Some("Hydro"))
            .unwrap();

        let err = core
            .inspect_level(&mut project, "elec output", None, false, false)
            .unwrap_err();
        assert!(matches!(err, Error::LevelNotActive { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = core
            .inspect_level(&mut project, "hydro register", Some("hydro scope"), false, false)
            .unwrap_err();
        assert!(matches!(err, Error::LevelNotFound(_)));

        core.inspect_level(&mut project, "hydro register", Some("hydro scope"), false, true)
            .unwrap();
        assert_eq!(
            project.simulation().unwrap().inspection_level(),
            Some("initial")
        );
    }

    #[test]
    fn test_reset_level_unknown_leaves_state() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.add_datastate(&mut project, Some("hydro output"), [("array.layout", "grid")])
            .unwrap();

        let result = core.reset_level(&mut project, Some("elec register"), false, None, false);
        assert!(matches!(result, Err(Error::LevelNotFound(_))));
        core.reset_level(&mut project, Some("elec register"), false, None, true)
            .unwrap();

        let simulation = project.simulation().unwrap();
        assert_eq!(simulation.simulation().count_states(), 2);
        assert_eq!(simulation.execution_level(), Some("initial"));
    }

    #[test]
    fn test_reset_level_to_initial_clears_hubs() {
        let core = core();
        let mut project = project_with_hubs(&core);
        core.add_datastate(&mut project, Some("site output"), [("site.depth", 30.0)])
            .unwrap();
        {
            let simulation = project.simulation_mut().unwrap();
            simulation.sequence_interface("project", "Site").unwrap();
            simulation.sequence_interface("modules", "Hydro").unwrap();
            simulation.set_execution_level(Some("site output".to_string()));
        }

        core.reset_level(&mut project, Some("initial"), true, None, false)
            .unwrap();

        let simulation = project.simulation().unwrap();
        assert!(simulation.hubs().all(|hub| hub.slots().is_empty()));
        assert_eq!(simulation.execution_level(), Some("initial"));
        assert_eq!(levels(&core, &project, true), vec!["initial"]);
        assert!(!core.has_data(&project, "site.depth").unwrap());
    }

    #[test]
    fn test_schedule_interface_unknown() {
        let core = core();
        let mut project = project_with_hubs(&core);
        let err = core
            .schedule_interface(&mut project, Some("Moorings"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Hub(fathom_hub::Error::InterfaceNotFoundInAnyHub(_))
        ));
    }

    #[test]
    fn test_clone_simulation_shares_pool() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.add_datastate(&mut project, None, [("site.depth", 30.0)])
            .unwrap();

        let index = core
            .clone_simulation(&mut project, 0, Some("Variant".to_string()), true)
            .unwrap();
        assert_eq!(project.active_index(), Some(index));
        assert!(core.has_data(&project, "site.depth").unwrap());
        assert_eq!(project.pool().len(), 1);

        let result = core.clone_simulation(&mut project, 0, Some("Variant".to_string()), false);
        assert!(matches!(result, Err(Error::DuplicateTitle(_))));

        let removed = core.remove_simulation(&mut project, index, None).unwrap();
        assert_eq!(removed.title(), Some("Variant"));
        assert_eq!(project.len(), 1);
    }

    fn theme_scopes(core: &Core) -> Project {
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.register_level(&mut project, "hydro register", Some("Hydro"))
            .unwrap();
        core.add_datastate(&mut project, Some("hydro output"), [("array.layout", "grid")])
            .unwrap();
        core.add_datastate(
            &mut project,
            Some("hydro local output"),
            [("lcoe", 10.0), ("lcoe.local", 1.0)],
        )
        .unwrap();
        core.add_datastate(&mut project, Some("hydro global output"), [("lcoe", 20.0)])
            .unwrap();
        project
    }

    #[test]
    fn test_set_output_scope() {
        let core = core();
        let mut project = theme_scopes(&core);
        core.inspect_level(&mut project, "hydro output", Some("hydro register"), false, false)
            .unwrap();
        assert!(!core.has_data(&project, "lcoe").unwrap());

        core.set_output_scope(&mut project, Some(OutputScope::Local))
            .unwrap();
        assert_eq!(core.get_data_value(&project, "lcoe", None).unwrap(), &Value::Float(10.0));
        assert_eq!(
            project.simulation().unwrap().output_scope(),
            Some(OutputScope::Local)
        );

        core.set_output_scope(&mut project, Some(OutputScope::Global))
            .unwrap();
        assert_eq!(core.get_data_value(&project, "lcoe", None).unwrap(), &Value::Float(20.0));
        assert!(!core.has_data(&project, "lcoe.local").unwrap());
        assert!(core.has_data(&project, "array.layout").unwrap());

        // The recorded scope is reapplied
        core.set_output_scope(&mut project, Some(OutputScope::Local))
            .unwrap();
        core.unmask_states(&mut project, None).unwrap();
        core.set_output_scope(&mut project, None).unwrap();
        assert_eq!(core.get_data_value(&project, "lcoe", None).unwrap(), &Value::Float(10.0));
    }

    #[test]
    fn test_set_output_scope_without_owner_records_only() {
        let core = core();
        let mut project = theme_scopes(&core);
        assert_eq!(project.simulation().unwrap().inspection_level(), Some("initial"));

        core.set_output_scope(&mut project, None).unwrap();

        assert_eq!(
            project.simulation().unwrap().output_scope(),
            Some(OutputScope::Global)
        );
        assert_eq!(levels(&core, &project, false), levels(&core, &project, true));
    }

    #[test]
    fn test_level_values_selected_levels_and_force_masks() {
        let core = core();
        let project = theme_scopes(&core);

        let values = core.get_level_values(&project, "lcoe", None, None).unwrap();
        assert_eq!(
            values.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["hydro local output", "hydro global output"]
        );
        assert_eq!(values["hydro local output"], &Value::Float(10.0));

        let levels = ["Hydro Global Output"];
        let values = core
            .get_level_values(&project, "lcoe.local", Some(&levels), None)
            .unwrap();
        assert_eq!(values["hydro global output"], &Value::Float(1.0));

        let values = core
            .get_level_values(&project, "lcoe.local", Some(&levels), Some(&["local"]))
            .unwrap();
        assert!(values.is_empty());

        let values = core
            .get_level_values(&project, "lcoe", Some(&levels), Some(&["output"]))
            .unwrap();
        assert_eq!(values["hydro global output"], &Value::Float(20.0));

        let result = core.get_level_values(&project, "lcoe", Some(&["elec output"]), None);
        assert!(matches!(result, Err(Error::LevelNotActive { .. })));
    }

    #[test]
    fn test_project_values() {
        let core = core();
        let mut project = core.new_project("Array study", "Default").unwrap();
        core.add_datastate(&mut project, Some("survey"), [("site.depth", 30.0)])
            .unwrap();
        core.add_datastate(&mut project, None, [("site.depth", 35.0)])
            .unwrap();
        core.new_simulation(&mut project, Some("Variant".to_string()))
            .unwrap();

        let values = core
            .get_project_values(&project, "site.depth", None, None, false)
            .unwrap();
        assert_eq!(values, vec![(Some("Default"), Some(&Value::Float(35.0)))]);

        let values = core
            .get_project_values(&project, "site.depth", Some("Survey"), None, true)
            .unwrap();
        assert_eq!(
            values,
            vec![
                (Some("Default"), Some(&Value::Float(30.0))),
                (Some("Variant"), None),
            ]
        );

        let values = core
            .get_project_values(&project, "site.depth", None, Some(&[1, 0]), true)
            .unwrap();
        assert_eq!(values[0], (Some("Variant"), None));
        assert_eq!(values[1].0, Some("Default"));

        let result = core.get_project_values(&project, "site.depth", None, Some(&[5]), false);
        assert!(result.is_err());
    }
}
