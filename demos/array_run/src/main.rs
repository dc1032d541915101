//! Array Run Demo
//!
//! Lays out a small tidal array with three interfaces: a site survey,
//! a hydrodynamic layout and an electrical network. Costs are computed on
//! the layout alone and on the whole array; the run is then inspected and
//! reset to the layout stage.
//!
//! Set `RUST_LOG=debug` to follow the orchestrator. An optional first
//! argument names a RON configuration file.

use fathom_core::{
    BoxError, Branch, Connector, Core, CoreConfig, Interface, InterfaceCatalog, OutputScope,
    Point, Value, VariableId,
};
use std::collections::HashMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Compute = fn(&HashMap<String, Value>) -> Vec<(&'static str, Value)>;

/// Interface backed by a plain function
struct FnInterface {
    id: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
    outputs: &'static [&'static str],
    compute: Compute,
    inputs: HashMap<String, Value>,
    results: HashMap<String, Value>,
}

impl FnInterface {
    fn boxed(
        id: &'static str,
        required: &'static [&'static str],
        optional: &'static [&'static str],
        outputs: &'static [&'static str],
        compute: Compute,
    ) -> impl Fn() -> Box<dyn Interface> + Send + Sync + 'static {
        move || -> Box<dyn Interface> {
            Box::new(FnInterface {
                id,
                required,
                optional,
                outputs,
                compute,
                inputs: HashMap::new(),
                results: HashMap::new(),
            })
        }
    }
}

fn ids(names: &[&str]) -> Vec<VariableId> {
    names.iter().map(|name| VariableId::new(*name)).collect()
}

impl Interface for FnInterface {
    fn id(&self) -> &str {
        self.id
    }

    fn required_inputs(&self) -> Vec<VariableId> {
        ids(self.required)
    }

    fn optional_inputs(&self) -> Vec<VariableId> {
        ids(self.optional)
    }

    fn outputs(&self) -> Vec<VariableId> {
        ids(self.outputs)
    }

    fn put_data(&mut self, id: &VariableId, value: Value) {
        self.inputs.insert(id.as_str().to_string(), value);
    }

    fn connect(&mut self) -> Result<(), BoxError> {
        for (id, value) in (self.compute)(&self.inputs) {
            self.results.insert(id.to_string(), value);
        }
        Ok(())
    }

    fn get_data(&self, id: &VariableId) -> Option<Value> {
        self.results.get(id.as_str()).cloned()
    }
}

fn float(inputs: &HashMap<String, Value>, id: &str) -> f64 {
    inputs.get(id).and_then(Value::as_float).unwrap_or_default()
}

fn total(inputs: &HashMap<String, Value>, id: &str) -> f64 {
    inputs
        .get(id)
        .and_then(Value::as_series)
        .map(|series| series.iter().sum())
        .unwrap_or_default()
}

fn site(_: &HashMap<String, Value>) -> Vec<(&'static str, Value)> {
    vec![("site.depth", Value::Float(42.0))]
}

fn hydro(inputs: &HashMap<String, Value>) -> Vec<(&'static str, Value)> {
    let depth = float(inputs, "site.depth");
    let spacing = inputs
        .get("array.spacing")
        .and_then(Value::as_float)
        .unwrap_or(60.0);

    // Two staggered rows of six devices
    let layout: Vec<Point> = (0..12)
        .map(|i| {
            let row = f64::from(i / 6);
            let column = f64::from(i % 6);
            Point::new(column * spacing + row * spacing / 2.0, row * spacing, -depth)
        })
        .collect();
    let energy: Vec<f64> = layout
        .iter()
        .enumerate()
        .map(|(i, _)| if i < 6 { 1_800.0 } else { 1_650.0 })
        .collect();

    vec![
        ("array.layout", Value::from(layout)),
        ("array.energy", Value::from(energy)),
    ]
}

fn elec(inputs: &HashMap<String, Value>) -> Vec<(&'static str, Value)> {
    let Some(layout) = inputs.get("array.layout").and_then(Value::as_layout) else {
        return Vec::new();
    };
    let cable: f64 = layout
        .windows(2)
        .map(|pair| pair[0].distance_2d(&pair[1]))
        .sum();
    let losses = total(inputs, "array.energy") * (0.01 + cable / 100_000.0);
    vec![
        ("cable.length", Value::Float(cable)),
        ("cable.losses", Value::Float(losses)),
    ]
}

fn economics(inputs: &HashMap<String, Value>) -> Vec<(&'static str, Value)> {
    let energy = total(inputs, "array.energy") - float(inputs, "cable.losses");
    if energy <= 0.0 {
        return Vec::new();
    }
    vec![("lcoe", Value::Float(2_500_000.0 / energy))]
}

fn catalog() -> fathom_core::Result<InterfaceCatalog> {
    let mut catalog = InterfaceCatalog::new();
    catalog.register(
        "ProjectInterface",
        FnInterface::boxed("Site", &[], &[], &["site.depth"], site),
    )?;
    catalog.register(
        "ModuleInterface",
        FnInterface::boxed(
            "Hydrodynamics",
            &["site.depth"],
            &["array.spacing"],
            &["array.layout", "array.energy"],
            hydro,
        ),
    )?;
    catalog.register(
        "ModuleInterface",
        FnInterface::boxed(
            "Electrical",
            &["array.layout", "array.energy"],
            &[],
            &["cable.length", "cable.losses"],
            elec,
        ),
    )?;
    catalog.register(
        "ThemeInterface",
        FnInterface::boxed(
            "Economics",
            &["array.energy"],
            &["cable.losses"],
            &["lcoe"],
            economics,
        ),
    )?;
    Ok(catalog)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Fathom Array Run Demo ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load_file(path)?,
        None => CoreConfig::default(),
    };
    let core = Core::with_config(config, catalog()?);

    let mut project = core.new_project("Tidal array", "Baseline")?;
    for _ in 0..core.config().hubs.len() {
        core.new_hub(&mut project)?;
    }
    core.add_datastate(&mut project, None, [("array.spacing", 80.0)])?;

    let project_hub = Connector::new("project");
    let modules = Connector::new("modules");
    let themes = Connector::new("themes");

    project_hub.activate_interface(&core, &mut project, "Site")?;
    project_hub.auto_execute(&core, &mut project, None, true, false)?;

    for id in modules.available_interfaces(&core, &project)? {
        modules.activate_interface(&core, &mut project, id)?;
    }
    themes.activate_interface(&core, &mut project, "Economics")?;

    println!("Scheduled modules: {:?}", modules.scheduled_interface_ids(&project)?);
    modules.auto_execute(&core, &mut project, None, true, false)?;
    themes.auto_execute(&core, &mut project, None, true, false)?;

    println!("Levels: {:?}", core.get_levels(&project, false)?);
    println!("LCOE: {}", core.get_data_value(&project, "lcoe", None)?);

    // Themes on the layout alone, then on everything
    core.mask_states(&mut project, Some("output"), None)?;
    core.unmask_states(&mut project, Some("hydrodynamics"))?;
    themes.auto_execute(&core, &mut project, Some("hydrodynamics local"), false, true)?;
    core.unmask_states(&mut project, None)?;
    themes.auto_execute(&core, &mut project, Some("hydrodynamics global"), false, true)?;

    // Look at the data as it stood after the layout
    Branch::new("modules", "Hydrodynamics").inspect(
        &core,
        &mut project,
        Some(OutputScope::Local),
    )?;
    println!(
        "Cable losses visible after inspect: {}",
        core.has_data(&project, "cable.losses")?
    );
    println!("Layout-only LCOE: {}", core.get_data_value(&project, "lcoe", None)?);
    for (level, value) in core.get_level_values(&project, "lcoe", None, None)? {
        println!("  {level}: {value}");
    }

    // Re-run the electrical network from scratch
    Branch::new("modules", "Electrical").reset(&core, &mut project, None)?;
    info!(
        scheduled = ?modules.scheduled_interface_ids(&project)?,
        "electrical reset"
    );
    println!("Levels after reset: {:?}", core.get_levels(&project, false)?);
    for (title, value) in core.get_project_values(&project, "lcoe", None, None, true)? {
        println!("  {}: {:?}", title.unwrap_or("untitled"), value.map(Value::to_string));
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
