//! Interface trait and the interface catalogue
//!
//! An interface is an external computational unit. The orchestrator only
//! knows what it declares; it populates the declared inputs, calls
//! [`Interface::connect`] and reads the declared outputs back.

use crate::error::{BoxError, Error, Result};
use fathom_hub::{DeclarationLookup, InterfaceDeclaration};
use fathom_state::{IndexMap, IndexSet, Value, VariableId};
use std::fmt;

/// A computational unit with declared inputs and outputs
pub trait Interface: Send {
    /// Get the unique interface id
    fn id(&self) -> &str;

    /// Inputs that must have data before the interface can run
    fn required_inputs(&self) -> Vec<VariableId>;

    /// Inputs that are passed only when data exists
    fn optional_inputs(&self) -> Vec<VariableId> {
        Vec::new()
    }

    /// Variables produced by [`connect`](Interface::connect)
    fn outputs(&self) -> Vec<VariableId>;

    /// Provide the value of an input
    fn put_data(&mut self, id: &VariableId, value: Value);

    /// Run the computation
    fn connect(&mut self) -> std::result::Result<(), BoxError>;

    /// Read an output after connecting
    ///
    /// `None` means the interface produced nothing for the variable.
    fn get_data(&self, id: &VariableId) -> Option<Value>;

    /// Build the declaration used for status derivation
    fn declaration(&self) -> InterfaceDeclaration {
        InterfaceDeclaration::new(self.id())
            .with_required(self.required_inputs())
            .with_optional(self.optional_inputs())
            .with_outputs(self.outputs())
    }
}

/// Factory producing fresh interface instances
pub type InterfaceFactory = Box<dyn Fn() -> Box<dyn Interface> + Send + Sync>;

/// Interfaces grouped by interface kind
///
/// Each interface is instantiated once at registration to record its id
/// and declaration. [`create`](InterfaceCatalog::create) hands out a new
/// instance per execution.
#[derive(Default)]
pub struct InterfaceCatalog {
    kinds: IndexMap<String, IndexSet<String>>,
    factories: IndexMap<String, InterfaceFactory>,
    declarations: IndexMap<String, InterfaceDeclaration>,
}

impl InterfaceCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface factory under an interface kind
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Interface> + Send + Sync + 'static,
    {
        let declaration = factory().declaration();
        let id = declaration.id.clone();
        if self.factories.contains_key(&id) {
            return Err(Error::DuplicateInterface(id));
        }

        self.kinds.entry(kind.into()).or_default().insert(id.clone());
        self.factories.insert(id.clone(), Box::new(factory));
        self.declarations.insert(id, declaration);
        Ok(())
    }

    /// Interface ids offered for a kind, in registration order
    pub fn interface_ids(&self, kind: &str) -> Vec<&str> {
        self.kinds
            .get(kind)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check if the catalogue offers the interface for a kind
    pub fn offers(&self, kind: &str, interface_id: &str) -> bool {
        self.kinds
            .get(kind)
            .is_some_and(|ids| ids.contains(interface_id))
    }

    /// Check if the interface is registered under any kind
    pub fn contains(&self, interface_id: &str) -> bool {
        self.factories.contains_key(interface_id)
    }

    /// Create a fresh instance of an interface
    pub fn create(&self, interface_id: &str) -> Result<Box<dyn Interface>> {
        self.factories
            .get(interface_id)
            .map(|factory| factory())
            .ok_or_else(|| Error::InterfaceNotFound(interface_id.to_string()))
    }

    /// Number of registered interfaces
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl DeclarationLookup for InterfaceCatalog {
    fn declaration(&self, interface_id: &str) -> Option<&InterfaceDeclaration> {
        self.declarations.get(interface_id)
    }
}

impl fmt::Debug for InterfaceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceCatalog")
            .field("kinds", &self.kinds)
            .field("declarations", &self.declarations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Table-driven interfaces for tests

    use super::*;

    fn ids(names: &[&str]) -> Vec<VariableId> {
        names.iter().map(|name| VariableId::new(*name)).collect()
    }

    /// Computes each output as the sum of its numeric inputs plus a seed
    pub struct TableInterface {
        pub id: String,
        pub required: Vec<VariableId>,
        pub optional: Vec<VariableId>,
        pub outputs: Vec<VariableId>,
        pub seed: f64,
        pub fail: bool,
        inputs: IndexMap<VariableId, Value>,
        results: IndexMap<VariableId, Value>,
    }

    impl TableInterface {
        pub fn new(id: &str, required: &[&str], optional: &[&str], outputs: &[&str]) -> Self {
            Self {
                id: id.to_string(),
                required: ids(required),
                optional: ids(optional),
                outputs: ids(outputs),
                seed: 1.0,
                fail: false,
                inputs: IndexMap::new(),
                results: IndexMap::new(),
            }
        }

        pub fn factory(
            id: &'static str,
            required: &'static [&'static str],
            optional: &'static [&'static str],
            outputs: &'static [&'static str],
        ) -> impl Fn() -> Box<dyn Interface> + Send + Sync + 'static {
            move || -> Box<dyn Interface> {
                Box::new(TableInterface::new(id, required, optional, outputs))
            }
        }

        pub fn failing(
            id: &'static str,
        ) -> impl Fn() -> Box<dyn Interface> + Send + Sync + 'static {
            move || -> Box<dyn Interface> {
                let mut interface = TableInterface::new(id, &[], &[], &["never.written"]);
                interface.fail = true;
                Box::new(interface)
            }
        }
    }

    impl Interface for TableInterface {
        fn id(&self) -> &str {
            &self.id
        }

        fn required_inputs(&self) -> Vec<VariableId> {
            self.required.clone()
        }

        fn optional_inputs(&self) -> Vec<VariableId> {
            self.optional.clone()
        }

        fn outputs(&self) -> Vec<VariableId> {
            self.outputs.clone()
        }

        fn put_data(&mut self, id: &VariableId, value: Value) {
            self.inputs.insert(id.clone(), value);
        }

        fn connect(&mut self) -> std::result::Result<(), BoxError> {
            if self.fail {
                return Err("solver diverged".into());
            }
            let sum: f64 = self.inputs.values().filter_map(Value::as_float).sum();
            for id in &self.outputs {
                self.results.insert(id.clone(), Value::Float(sum + self.seed));
            }
            Ok(())
        }

        fn get_data(&self, id: &VariableId) -> Option<Value> {
            self.results.get(id).cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::TableInterface;
    use super::*;

    #[test]
    fn test_register_and_create() {
        let mut catalog = InterfaceCatalog::new();
        catalog
            .register(
                "ModuleInterface",
                TableInterface::factory(
                    "Hydro",
                    &["site.depth"],
                    &["site.current"],
                    &["array.layout"],
                ),
            )
            .unwrap();

        assert_eq!(catalog.interface_ids("ModuleInterface"), vec!["Hydro"]);
        assert!(catalog.offers("ModuleInterface", "Hydro"));
        assert!(!catalog.offers("ThemeInterface", "Hydro"));
        assert!(catalog.create("Hydro").is_ok());
        assert!(matches!(catalog.create("Elec"), Err(Error::InterfaceNotFound(_))));

        let declaration = catalog.declaration("Hydro").unwrap();
        assert!(declaration.required.contains("site.depth"));
        assert!(declaration.is_optional("site.current"));
        assert!(declaration.outputs.contains("array.layout"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = InterfaceCatalog::new();
        catalog
            .register("ModuleInterface", TableInterface::factory("Hydro", &[], &[], &[]))
            .unwrap();
        let result =
            catalog.register("ThemeInterface", TableInterface::factory("Hydro", &[], &[], &[]));
        assert!(matches!(result, Err(Error::DuplicateInterface(_))));
        assert!(catalog.interface_ids("ThemeInterface").is_empty());
        assert_eq!(catalog.len(), 1);
    }
}
