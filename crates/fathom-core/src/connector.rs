//! Connector - scheduling and execution of interfaces in one hub

use crate::core::Core;
use crate::error::{Error, Result};
use crate::project::Project;
use fathom_hub::{InterfaceStatus, Status};
use fathom_state::{Value, VariableId};
use tracing::info;

/// Works with the interfaces of one hub of the active simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    hub_id: String,
}

impl Connector {
    /// Create a connector for a hub
    pub fn new(hub_id: impl Into<String>) -> Self {
        Self {
            hub_id: hub_id.into(),
        }
    }

    /// Get the hub id
    pub fn hub_id(&self) -> &str {
        &self.hub_id
    }

    /// Check if the hub forces all inputs unavailable
    pub fn force_completed(&self, project: &Project) -> Result<bool> {
        Ok(project.simulation()?.hub(&self.hub_id)?.force_completed())
    }

    /// Set the force-completed flag of the hub and recompute status
    pub fn set_force_completed(
        &self,
        core: &Core,
        project: &mut Project,
        value: bool,
    ) -> Result<()> {
        project
            .simulation_mut()?
            .hub_mut(&self.hub_id)?
            .set_force_completed(value);
        core.set_interface_status(project)
    }

    /// Interfaces the catalogue offers for the hub's interface kind
    pub fn available_interfaces<'c>(
        &self,
        core: &'c Core,
        project: &Project,
    ) -> Result<Vec<&'c str>> {
        let simulation = project.simulation()?;
        let kind = simulation.hub(&self.hub_id)?.interface_kind();
        Ok(core.catalog().interface_ids(kind))
    }

    /// Interfaces sequenced in the hub, completed or not
    pub fn active_interface_ids(&self, project: &Project) -> Result<Vec<String>> {
        let hub = project.simulation()?.hub(&self.hub_id)?;
        Ok(hub.sequenced_ids().into_iter().map(str::to_string).collect())
    }

    /// Check if the interface is sequenced in the hub
    pub fn has_interface(&self, project: &Project, interface_id: &str) -> Result<bool> {
        Ok(project
            .simulation()?
            .has_interface(&self.hub_id, interface_id)?)
    }

    /// Interfaces scheduled but not completed, in slot order
    pub fn scheduled_interface_ids(&self, project: &Project) -> Result<Vec<String>> {
        let hub = project.simulation()?.hub(&self.hub_id)?;
        Ok(hub.scheduled_ids().into_iter().map(str::to_string).collect())
    }

    /// Check if any interface is still scheduled
    pub fn any_scheduled(&self, project: &Project) -> Result<bool> {
        Ok(project.simulation()?.hub(&self.hub_id)?.any_scheduled())
    }

    /// Next interface to run
    pub fn current_interface_id(&self, project: &Project) -> Result<Option<String>> {
        let hub = project.simulation()?.hub(&self.hub_id)?;
        Ok(hub.next_scheduled().map(str::to_string))
    }

    /// Completed interfaces, in completion order
    pub fn completed_interface_ids(&self, project: &Project) -> Result<Vec<String>> {
        let hub = project.simulation()?.hub(&self.hub_id)?;
        Ok(hub.completed_ids().into_iter().map(str::to_string).collect())
    }

    /// Check if the interface has completed
    pub fn is_interface_completed(&self, project: &Project, interface_id: &str) -> Result<bool> {
        Ok(project
            .simulation()?
            .hub(&self.hub_id)?
            .is_completed(interface_id))
    }

    /// Cached input status of an interface
    pub fn interface_inputs_status<'p>(
        &self,
        project: &'p Project,
        interface_id: &str,
    ) -> Result<&'p InterfaceStatus> {
        project
            .simulation()?
            .input_status(&self.hub_id, interface_id)
            .ok_or_else(|| self.not_scheduled(interface_id))
    }

    /// Cached output status of an interface
    pub fn interface_outputs_status<'p>(
        &self,
        project: &'p Project,
        interface_id: &str,
    ) -> Result<&'p InterfaceStatus> {
        project
            .simulation()?
            .output_status(&self.hub_id, interface_id)
            .ok_or_else(|| self.not_scheduled(interface_id))
    }

    /// Check if the inputs of an interface allow it to run
    ///
    /// A `required` input always blocks. An `unavailable` input blocks
    /// unless `allow_unavailable` is given.
    pub fn is_interface_executable(
        &self,
        project: &Project,
        interface_id: &str,
        allow_unavailable: bool,
    ) -> Result<bool> {
        let status = self.interface_inputs_status(project, interface_id)?;
        Ok(status.values().all(|s| match s {
            Status::Required => false,
            Status::Unavailable => allow_unavailable,
            Status::Optional | Status::Satisfied => true,
        }))
    }

    /// Check if every scheduled interface could run
    pub fn is_auto_executable(&self, project: &Project, allow_unavailable: bool) -> Result<bool> {
        for interface_id in self.scheduled_interface_ids(project)? {
            if !self.is_interface_executable(project, &interface_id, allow_unavailable)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Schedule an interface offered for the hub's interface kind
    pub fn activate_interface(
        &self,
        core: &Core,
        project: &mut Project,
        interface_id: &str,
    ) -> Result<()> {
        let simulation = project.simulation_mut()?;
        let kind = simulation.hub(&self.hub_id)?.interface_kind();
        if !core.catalog().offers(kind, interface_id) {
            return Err(Error::InterfaceUnavailable {
                hub: self.hub_id.clone(),
                interface: interface_id.to_string(),
            });
        }

        simulation.sequence_interface(&self.hub_id, interface_id)?;
        info!(hub = %self.hub_id, interface = %interface_id, "activated interface");
        core.set_interface_status(project)
    }

    /// Run an interface and store its outputs
    ///
    /// The level name defaults to the lower-cased interface id. With
    /// `register_level` a `"<level> register"` datastate is added first and
    /// the execution level moves to `"<level> output"` afterwards. Nothing
    /// is stored when validation or the computation fails.
    pub fn execute_interface(
        &self,
        core: &Core,
        project: &mut Project,
        interface_id: &str,
        level: Option<&str>,
        register_level: bool,
        allow_unavailable: bool,
    ) -> Result<()> {
        if !self.is_interface_executable(project, interface_id, allow_unavailable)? {
            return Err(Error::InputsNotSatisfied(interface_id.to_string()));
        }

        let simulation = project.simulation()?;
        simulation.hub(&self.hub_id)?.check_completable(interface_id)?;

        let mut interface = core.catalog().create(interface_id)?;
        let merged = simulation.simulation().merged_state();
        for id in interface.required_inputs() {
            let value = merged
                .value(project.pool(), id.as_str())
                .map_err(|_| Error::InputsNotSatisfied(interface_id.to_string()))?
                .clone();
            interface.put_data(&id, value);
        }
        for id in interface.optional_inputs() {
            if let Ok(value) = merged.value(project.pool(), id.as_str()) {
                interface.put_data(&id, value.clone());
            }
        }

        info!(hub = %self.hub_id, interface = %interface_id, "executing interface");
        interface.connect().map_err(|source| Error::Connect {
            interface: interface_id.to_string(),
            source,
        })?;

        let outputs: Vec<(VariableId, Value)> = interface
            .outputs()
            .into_iter()
            .filter_map(|id| interface.get_data(&id).map(|value| (id, value)))
            .collect();

        let level = level.unwrap_or(interface_id).to_lowercase();
        let output_level = core.config().output_level(&level);

        let simulation = project.simulation_mut()?;
        if register_level {
            let registered = core.config().register_level(&level);
            simulation.set_inspection_level(Some(registered.clone()));
            simulation.register_level(&registered, Some(interface_id));
        }
        simulation.set_interface_completed(&self.hub_id, interface_id)?;

        core.add_datastate(project, Some(&output_level), outputs)?;

        if register_level {
            project
                .simulation_mut()?
                .set_execution_level(Some(output_level));
        }
        Ok(())
    }

    /// Run every scheduled interface in order
    ///
    /// A non-executable interface fails the run unless
    /// `allow_non_execution` is given, in which case it is skipped.
    pub fn auto_execute(
        &self,
        core: &Core,
        project: &mut Project,
        force_level: Option<&str>,
        register_level: bool,
        allow_non_execution: bool,
    ) -> Result<()> {
        for interface_id in self.scheduled_interface_ids(project)? {
            if !self.is_interface_executable(project, &interface_id, false)? {
                if !allow_non_execution {
                    return Err(Error::InputsNotSatisfied(interface_id));
                }
                info!(interface = %interface_id, "skipping interface");
                continue;
            }

            info!(interface = %interface_id, "auto executing interface");
            self.execute_interface(
                core,
                project,
                &interface_id,
                force_level,
                register_level,
                false,
            )?;
        }
        Ok(())
    }

    fn not_scheduled(&self, interface_id: &str) -> Error {
        fathom_hub::Error::InterfaceNotScheduled {
            hub: self.hub_id.clone(),
            interface: interface_id.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::testing::TableInterface;
    use crate::interface::InterfaceCatalog;
    use crate::ErrorKind;

    fn core() -> Core {
        let mut catalog = InterfaceCatalog::new();
        let entries = [
            ("ProjectInterface", TableInterface::factory("Site", &[], &[], &["site.depth"])),
            ("ModuleInterface", TableInterface::factory("M1", &[], &[], &["v1"])),
            (
                "ModuleInterface",
                TableInterface::factory("Hydro", &["site.depth"], &["site.current"], &["array.layout"]),
            ),
            (
                "ModuleInterface",
                TableInterface::factory("Elec", &["array.layout"], &[], &["cable.route"]),
            ),
            (
                "ThemeInterface",
                TableInterface::factory("Economics", &["array.layout"], &["cable.route"], &["lcoe"]),
            ),
        ];
        for (kind, factory) in entries {
            catalog.register(kind, factory).unwrap();
        }
        catalog
            .register("ModuleInterface", TableInterface::failing("Broken"))
            .unwrap();
        Core::new(catalog)
    }

    fn project(core: &Core) -> Project {
        let mut project = core.new_project("Array study", "Default").unwrap();
        for _ in 0..3 {
            core.new_hub(&mut project).unwrap();
        }
        project
    }

    fn active_levels(project: &Project) -> Vec<String> {
        project
            .simulation()
            .unwrap()
            .simulation()
            .get_active_levels(false, false)
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_execute_registers_and_outputs() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");

        modules.activate_interface(&core, &mut project, "M1").unwrap();
        assert!(modules.is_interface_executable(&project, "M1", false).unwrap());

        let before = project.simulation().unwrap().simulation().count_states();
        modules
            .execute_interface(&core, &mut project, "M1", None, true, false)
            .unwrap();

        let simulation = project.simulation().unwrap();
        assert_eq!(simulation.simulation().count_states(), before + 2);
        assert_eq!(
            active_levels(&project),
            vec!["initial", "m1 register", "m1 output"]
        );
        assert!(core.has_data(&project, "v1").unwrap());
        assert!(modules.is_interface_completed(&project, "M1").unwrap());
        assert_eq!(simulation.execution_level(), Some("m1 output"));
        assert_eq!(simulation.inspection_level(), Some("m1 register"));
        assert_eq!(simulation.level_owner("m1 register"), Some(Some("M1")));
    }

    #[test]
    fn test_execute_without_register_level() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "M1").unwrap();

        modules
            .execute_interface(&core, &mut project, "M1", Some("First Run"), false, false)
            .unwrap();

        assert_eq!(active_levels(&project), vec!["initial", "first run output"]);
        assert_eq!(
            project.simulation().unwrap().execution_level(),
            Some("initial")
        );
    }

    #[test]
    fn test_required_input_blocks_execution() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "Hydro").unwrap();

        let status = modules.interface_inputs_status(&project, "Hydro").unwrap();
        assert_eq!(status["site.depth"], Status::Required);
        assert_eq!(status["site.current"], Status::Optional);
        assert!(!modules.is_interface_executable(&project, "Hydro", true).unwrap());

        let count = project.simulation().unwrap().simulation().count_states();
        let err = modules
            .execute_interface(&core, &mut project, "Hydro", None, true, true)
            .unwrap_err();
        assert!(matches!(err, Error::InputsNotSatisfied(_)));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(project.simulation().unwrap().simulation().count_states(), count);

        core.add_datastate(&mut project, None, [("site.depth", 30.0)])
            .unwrap();
        assert!(modules.is_interface_executable(&project, "Hydro", false).unwrap());
    }

    #[test]
    fn test_unavailable_input_allowed_on_request() {
        let core = core();
        let mut project = project(&core);
        core.add_datastate(&mut project, None, [("array.layout", "grid")])
            .unwrap();
        Connector::new("modules")
            .activate_interface(&core, &mut project, "Elec")
            .unwrap();
        let themes = Connector::new("themes");
        themes
            .activate_interface(&core, &mut project, "Economics")
            .unwrap();

        let status = themes.interface_inputs_status(&project, "Economics").unwrap();
        assert_eq!(status["array.layout"], Status::Satisfied);
        // Elec is still scheduled in the modules hub
        assert_eq!(status["cable.route"], Status::Unavailable);
        assert!(!themes.is_interface_executable(&project, "Economics", false).unwrap());
        assert!(themes.is_interface_executable(&project, "Economics", true).unwrap());

        themes
            .execute_interface(&core, &mut project, "Economics", None, true, true)
            .unwrap();
        assert!(core.has_data(&project, "lcoe").unwrap());
        // Themes never complete
        assert!(!themes.is_interface_completed(&project, "Economics").unwrap());
    }

    #[test]
    fn test_failed_connect_stores_nothing() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "Broken").unwrap();

        let err = modules
            .execute_interface(&core, &mut project, "Broken", None, true, false)
            .unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));

        let simulation = project.simulation().unwrap();
        assert_eq!(simulation.simulation().count_states(), 1);
        assert!(!simulation.has_level("broken register"));
        assert_eq!(
            modules.scheduled_interface_ids(&project).unwrap(),
            vec!["Broken"]
        );
    }

    #[test]
    fn test_pipeline_order_enforced() {
        let core = core();
        let mut project = project(&core);
        core.add_datastate(&mut project, None, [("site.depth", 30.0)])
            .unwrap();
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "Hydro").unwrap();
        modules.activate_interface(&core, &mut project, "Elec").unwrap();

        assert!(modules.is_interface_executable(&project, "Elec", false).unwrap());
        let err = modules
            .execute_interface(&core, &mut project, "Elec", None, true, false)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Hub(fathom_hub::Error::NotNextInPipeline { .. })
        ));
        assert_eq!(
            modules.current_interface_id(&project).unwrap().as_deref(),
            Some("Hydro")
        );
    }

    #[test]
    fn test_activate_checks_interface_kind() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");

        let err = modules
            .activate_interface(&core, &mut project, "Economics")
            .unwrap_err();
        assert!(matches!(err, Error::InterfaceUnavailable { .. }));

        modules.activate_interface(&core, &mut project, "M1").unwrap();
        let err = modules
            .activate_interface(&core, &mut project, "M1")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Hub(fathom_hub::Error::DuplicateInterface { .. })
        ));

        let available = modules.available_interfaces(&core, &project).unwrap();
        assert_eq!(available, vec!["M1", "Hydro", "Elec", "Broken"]);
        assert!(modules.has_interface(&project, "M1").unwrap());
        assert_eq!(modules.active_interface_ids(&project).unwrap(), vec!["M1"]);
    }

    #[test]
    fn test_auto_execute_runs_pipeline() {
        let core = core();
        let mut project = project(&core);
        core.add_datastate(&mut project, None, [("site.depth", 30.0)])
            .unwrap();
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "Hydro").unwrap();
        modules.activate_interface(&core, &mut project, "Elec").unwrap();
        assert!(modules.is_auto_executable(&project, false).unwrap());

        modules
            .auto_execute(&core, &mut project, None, true, false)
            .unwrap();

        assert!(!modules.any_scheduled(&project).unwrap());
        assert_eq!(
            modules.completed_interface_ids(&project).unwrap(),
            vec!["Hydro", "Elec"]
        );
        assert_eq!(
            core.get_data_value(&project, "cable.route", None).unwrap(),
            &Value::Float(32.0)
        );
        assert_eq!(
            project.simulation().unwrap().execution_level(),
            Some("elec output")
        );
    }

    #[test]
    fn test_auto_execute_non_executable() {
        let core = core();
        let mut project = project(&core);
        let project_hub = Connector::new("project");
        project_hub
            .activate_interface(&core, &mut project, "Site")
            .unwrap();
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "Hydro").unwrap();
        assert!(!modules.is_auto_executable(&project, false).unwrap());

        let err = modules
            .auto_execute(&core, &mut project, None, true, false)
            .unwrap_err();
        assert!(matches!(err, Error::InputsNotSatisfied(_)));

        modules
            .auto_execute(&core, &mut project, None, true, true)
            .unwrap();
        assert_eq!(modules.scheduled_interface_ids(&project).unwrap(), vec!["Hydro"]);

        project_hub
            .auto_execute(&core, &mut project, None, true, false)
            .unwrap();
        assert!(modules.is_interface_executable(&project, "Hydro", false).unwrap());
    }

    #[test]
    fn test_force_completed_blocks_inputs() {
        let core = core();
        let mut project = project(&core);
        let modules = Connector::new("modules");
        modules.activate_interface(&core, &mut project, "M1").unwrap();
        modules.activate_interface(&core, &mut project, "Hydro").unwrap();
        core.add_datastate(&mut project, None, [("site.depth", 30.0)])
            .unwrap();

        modules
            .set_force_completed(&core, &mut project, true)
            .unwrap();
        assert!(modules.force_completed(&project).unwrap());
        let status = modules.interface_inputs_status(&project, "Hydro").unwrap();
        assert!(status.values().all(|s| *s == Status::Unavailable));
        assert!(!modules.is_interface_executable(&project, "Hydro", false).unwrap());
    }
}
