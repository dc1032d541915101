//! Input and output status derivation
//!
//! Status is derived data. Nothing here mutates a hub or the store, the
//! registry recomputes every map wholesale after each change.

use crate::declaration::{DeclarationLookup, InterfaceDeclaration};
use crate::error::{Error, Result};
use crate::hub::{Hub, HubKind};
use fathom_state::{IndexMap, IndexSet, MergedState, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Satisfaction status of one variable of one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Input is required and has no data
    Required,
    /// Input is optional and has no data
    Optional,
    /// Data is present, or will be produced upstream first
    Satisfied,
    /// The variable cannot be used
    Unavailable,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Required => "required",
            Status::Optional => "optional",
            Status::Satisfied => "satisfied",
            Status::Unavailable => "unavailable",
        };
        write!(f, "{}", name)
    }
}

/// Status of every variable of one interface
pub type InterfaceStatus = IndexMap<VariableId, Status>;
/// Interface statuses of one hub, keyed by interface id
pub type HubStatus = IndexMap<String, InterfaceStatus>;
/// Hub statuses keyed by hub id
pub type StatusMap = IndexMap<String, HubStatus>;

fn lookup<'a>(
    declarations: &'a dyn DeclarationLookup,
    interface_id: &str,
) -> Result<&'a InterfaceDeclaration> {
    declarations
        .declaration(interface_id)
        .ok_or_else(|| Error::DeclarationNotFound(interface_id.to_string()))
}

/// Derive the output status of an interface in a hub
///
/// `force_last_completed` evaluates the outputs as if the named interface
/// were the most recently completed one.
pub fn output_status(
    hub: &Hub,
    interface_id: &str,
    declarations: &dyn DeclarationLookup,
    merged: &MergedState,
    force_last_completed: Option<&str>,
) -> Result<InterfaceStatus> {
    let declaration = lookup(declarations, interface_id)?;
    let mut status: InterfaceStatus = declaration
        .outputs
        .iter()
        .map(|id| (id.clone(), Status::Unavailable))
        .collect();

    let completed = hub.completed_ids();
    let last_completed = force_last_completed.or_else(|| hub.last_completed());
    let mut overwritten: IndexSet<VariableId> = IndexSet::new();

    match completed.iter().position(|id| *id == interface_id) {
        Some(index) if last_completed != Some(interface_id) => {
            let start = index + 1;
            let mut end = completed.len();

            if let Some(forced) = force_last_completed {
                if let Some(forced_index) = completed.iter().position(|id| *id == forced) {
                    if forced_index < index {
                        return Ok(status);
                    }
                    end = forced_index + 1;
                }
            }

            for later in &completed[start..end] {
                overwritten.extend(lookup(declarations, later)?.outputs.iter().cloned());
            }
        }
        Some(_) => {}
        None if hub.kind() == HubKind::Ordered => return Ok(status),
        None => {}
    }

    for (id, value) in status.iter_mut() {
        if merged.has_data(id.as_str()) && !overwritten.contains(id) {
            *value = Status::Satisfied;
        }
    }

    Ok(status)
}

/// Derive the input status of an interface in a hub
///
/// Variables in `unavailable` are reported unavailable whatever their data.
pub fn input_status(
    hub: &Hub,
    interface_id: &str,
    declarations: &dyn DeclarationLookup,
    merged: &MergedState,
    unavailable: &IndexSet<VariableId>,
) -> Result<InterfaceStatus> {
    let declaration = lookup(declarations, interface_id)?;

    if hub.force_completed() || hub.is_completed(interface_id) {
        return Ok(declaration
            .inputs()
            .map(|id| (id.clone(), Status::Unavailable))
            .collect());
    }

    let mut status: InterfaceStatus = declaration
        .required
        .iter()
        .map(|id| (id.clone(), Status::Required))
        .chain(
            declaration
                .optional
                .iter()
                .map(|id| (id.clone(), Status::Optional)),
        )
        .collect();

    for preceding in hub.preceding_scheduled(interface_id) {
        for id in &lookup(declarations, preceding)?.outputs {
            if let Some(value) = status.get_mut(id) {
                *value = Status::Satisfied;
            }
        }
    }

    for id in unavailable {
        if let Some(value) = status.get_mut(id) {
            *value = Status::Unavailable;
        }
    }

    for (id, value) in status.iter_mut() {
        if matches!(value, Status::Required | Status::Optional) && merged.has_data(id.as_str()) {
            *value = Status::Satisfied;
        }
    }

    Ok(status)
}
