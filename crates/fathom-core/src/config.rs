//! Core configuration - hub queue, level markers and inspection hub
//!
//! ```
//! use fathom_core::CoreConfig;
//!
//! let config = CoreConfig::from_ron_str(r#"(markers: (register: "start"))"#).unwrap();
//! assert_eq!(config.markers.register, "start");
//! assert_eq!(config.markers.output, "output");
//! assert_eq!(config.hubs.len(), 3);
//! ```

use crate::error::Result;
use fathom_hub::{default_hub_definitions, HubDefinition, OutputScope};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Suffixes used to name the levels the orchestrator creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Level registered when a simulation is created
    pub initial: String,
    /// Suffix of the level registered before an interface runs
    pub register: String,
    /// Suffix of the level holding an interface's outputs
    pub output: String,
    /// Suffix of theme levels computed on one module's outputs
    pub local: String,
    /// Suffix of theme levels computed on all data
    pub global: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            initial: "initial".to_string(),
            register: "register".to_string(),
            output: "output".to_string(),
            local: "local".to_string(),
            global: "global".to_string(),
        }
    }
}

/// Configuration of a [`Core`](crate::Core)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Hub creation queue given to every new simulation
    pub hubs: Vec<HubDefinition>,
    /// Level markers
    pub markers: Markers,
    /// Hub whose outputs are evaluated as of the inspected interface
    pub inspection_hub: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            hubs: default_hub_definitions(),
            markers: Markers::default(),
            inspection_hub: Some("modules".to_string()),
        }
    }
}

impl CoreConfig {
    /// Parse a configuration from RON, missing fields take their defaults
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load a configuration from a RON file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Name the register level of an interface level
    pub fn register_level(&self, level: &str) -> String {
        format!("{} {}", level, self.markers.register)
    }

    /// Name the output level of an interface level
    pub fn output_level(&self, level: &str) -> String {
        format!("{} {}", level, self.markers.output)
    }

    /// Marker selecting the theme levels of an output scope
    pub fn scope_marker(&self, scope: OutputScope) -> &str {
        match scope {
            OutputScope::Local => &self.markers.local,
            OutputScope::Global => &self.markers.global,
        }
    }
}
