//! Interface declarations - what an interface reads and writes

use fathom_state::{IndexMap, IndexSet, VariableId};
use serde::{Deserialize, Serialize};

/// Declared inputs and outputs of one interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub id: String,
    pub required: IndexSet<VariableId>,
    pub optional: IndexSet<VariableId>,
    pub outputs: IndexSet<VariableId>,
}

impl InterfaceDeclaration {
    /// Create a declaration with no inputs or outputs
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for required inputs
    pub fn with_required<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VariableId>,
    {
        for id in ids {
            let id = id.into();
            if !self.optional.contains(&id) {
                self.required.insert(id);
            }
        }
        self
    }

    /// Builder-style setter for optional inputs
    ///
    /// An input declared optional is no longer required.
    pub fn with_optional<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VariableId>,
    {
        for id in ids {
            let id = id.into();
            self.required.shift_remove(&id);
            self.optional.insert(id);
        }
        self
    }

    /// Builder-style setter for outputs
    pub fn with_outputs<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VariableId>,
    {
        self.outputs.extend(ids.into_iter().map(Into::into));
        self
    }

    /// All inputs, required first
    pub fn inputs(&self) -> impl Iterator<Item = &VariableId> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Check if an input is optional
    pub fn is_optional(&self, id: &str) -> bool {
        self.optional.contains(id)
    }
}

/// Resolves interface ids to their declarations
pub trait DeclarationLookup {
    fn declaration(&self, interface_id: &str) -> Option<&InterfaceDeclaration>;
}

impl DeclarationLookup for IndexMap<String, InterfaceDeclaration> {
    fn declaration(&self, interface_id: &str) -> Option<&InterfaceDeclaration> {
        self.get(interface_id)
    }
}
