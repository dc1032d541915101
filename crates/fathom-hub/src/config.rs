//! Hub definitions - the fixed creation queue of hubs
//!
//! Definitions are plain serde records so they can be read from RON:
//!
//! ```text
//! (
//!     hubs: [
//!         (name: "project", interface: "ProjectInterface", hub_type: "Hub"),
//!         (name: "modules", interface: "ModuleInterface", hub_type: "Pipeline"),
//!         (
//!             name: "themes",
//!             interface: "ThemeInterface",
//!             hub_type: "Hub",
//!             force_unavailable: Some(["modules"]),
//!             no_complete: true,
//!         ),
//!     ],
//! )
//! ```

use crate::error::Result;
use crate::hub::HubKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Definition of one hub in the creation queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDefinition {
    /// Hub id
    pub name: String,
    /// Interface kind the hub draws its interfaces from
    pub interface: String,
    /// Type tag, `"Pipeline"` or `"Hub"`
    pub hub_type: String,
    /// Hubs whose scheduled outputs are unavailable as inputs here
    #[serde(default)]
    pub force_unavailable: Option<Vec<String>>,
    /// Suppress completion of interfaces in this hub
    #[serde(default)]
    pub no_complete: bool,
}

impl HubDefinition {
    /// Create a definition with no forced-unavailable hubs
    pub fn new(
        name: impl Into<String>,
        interface: impl Into<String>,
        hub_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            interface: interface.into(),
            hub_type: hub_type.into(),
            force_unavailable: None,
            no_complete: false,
        }
    }

    /// Parse the type tag
    pub fn kind(&self) -> Option<HubKind> {
        HubKind::from_tag(&self.hub_type)
    }
}

/// The standard `project -> modules -> themes` queue
pub fn default_hub_definitions() -> Vec<HubDefinition> {
    let mut themes = HubDefinition::new("themes", "ThemeInterface", "Hub");
    themes.force_unavailable = Some(vec!["modules".to_string()]);
    themes.no_complete = true;

    vec![
        HubDefinition::new("project", "ProjectInterface", "Hub"),
        HubDefinition::new("modules", "ModuleInterface", "Pipeline"),
        themes,
    ]
}

#[derive(Deserialize)]
struct HubFile {
    hubs: Vec<HubDefinition>,
}

/// Load hub definitions from a RON string
pub fn load_hub_definitions_str(content: &str) -> Result<Vec<HubDefinition>> {
    let file: HubFile = ron::from_str(content)?;
    Ok(file.hubs)
}

/// Load hub definitions from a RON file
pub fn load_hub_definitions_file(path: impl AsRef<Path>) -> Result<Vec<HubDefinition>> {
    let content = fs::read_to_string(path)?;
    load_hub_definitions_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_queue_order() {
        let defs = default_hub_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["project", "modules", "themes"]);
        assert_eq!(defs[1].kind(), Some(HubKind::Ordered));
        assert!(defs[2].no_complete);
        assert_eq!(defs[2].force_unavailable, Some(vec!["modules".to_string()]));
    }

    #[test]
    fn test_load_from_ron() {
        let ron = r#"
            (
                hubs: [
                    (name: "project", interface: "ProjectInterface", hub_type: "Hub"),
                    (
                        name: "themes",
                        interface: "ThemeInterface",
                        hub_type: "Hub",
                        force_unavailable: Some(["modules"]),
                        no_complete: true,
                    ),
                ],
            )
        "#;

        let defs = load_hub_definitions_str(ron).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].force_unavailable, None);
        assert!(!defs[0].no_complete);
        assert!(defs[1].no_complete);
    }

    #[test]
    fn test_unknown_tag_survives_loading() {
        let ron = r#"(hubs: [(name: "x", interface: "XInterface", hub_type: "Queue")])"#;
        let defs = load_hub_definitions_str(ron).unwrap();
        assert_eq!(defs[0].kind(), None);
    }

    #[test]
    fn test_malformed_ron() {
        assert!(matches!(
            load_hub_definitions_str("(hubs: [(name: )])"),
            Err(Error::Ron(_))
        ));
    }
}
