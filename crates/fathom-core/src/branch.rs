//! Branch - inspection and reset of one interface's levels

use crate::connector::Connector;
use crate::core::Core;
use crate::error::Result;
use crate::project::Project;
use fathom_hub::{InterfaceStatus, OutputScope};
use tracing::debug;

/// One interface of one hub, addressed by its level names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    hub_id: String,
    interface_id: String,
}

impl Branch {
    pub fn new(hub_id: impl Into<String>, interface_id: impl Into<String>) -> Self {
        Self {
            hub_id: hub_id.into(),
            interface_id: interface_id.into(),
        }
    }

    pub fn hub_id(&self) -> &str {
        &self.hub_id
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    /// Level name derived from the interface id
    pub fn level(&self) -> String {
        self.interface_id.to_lowercase()
    }

    pub fn input_status<'p>(&self, project: &'p Project) -> Result<&'p InterfaceStatus> {
        self.connector().interface_inputs_status(project, &self.interface_id)
    }

    pub fn output_status<'p>(&self, project: &'p Project) -> Result<&'p InterfaceStatus> {
        self.connector().interface_outputs_status(project, &self.interface_id)
    }

    /// Inspect the data as of the interface's output level
    ///
    /// Theme results of `scope` are shown alongside. Does nothing unless the
    /// interface has completed.
    pub fn inspect(
        &self,
        core: &Core,
        project: &mut Project,
        scope: Option<OutputScope>,
    ) -> Result<()> {
        if !self.is_completed(project)? {
            debug!(interface = %self.interface_id, "not completed, nothing to inspect");
            return Ok(());
        }

        let level = self.level();
        let output = core.config().output_level(&level);
        let register = core.config().register_level(&level);
        core.inspect_level(project, &output, Some(&register), false, false)?;
        core.set_output_scope(project, scope)
    }

    /// Reset the simulation to just before the interface ran
    ///
    /// Does nothing unless the interface has completed.
    pub fn reset(
        &self,
        core: &Core,
        project: &mut Project,
        force_scheduled: Option<&str>,
    ) -> Result<()> {
        if !self.is_completed(project)? {
            debug!(interface = %self.interface_id, "not completed, nothing to reset");
            return Ok(());
        }

        let register = core.config().register_level(&self.level());
        core.reset_level(project, Some(&register), false, force_scheduled, true)
    }

    fn is_completed(&self, project: &Project) -> Result<bool> {
        self.connector().is_interface_completed(project, &self.interface_id)
    }

    fn connector(&self) -> Connector {
        Connector::new(self.hub_id.clone())
    }
}
