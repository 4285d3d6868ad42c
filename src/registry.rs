use super::*;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Every chip definition known to the simulator, keyed by name.
///
/// A registry starts out holding the intrinsic gates.
/// Composite chips are added during the load phase with [`ChipRegistry::register`]
/// or one of the `load_*` methods. After that it is only read:
/// an [`Evaluator`] borrows it immutably, so any number of evaluations may share it.
#[derive(Debug, Clone)]
pub struct ChipRegistry {
    chips: BTreeMap<ChipName, ChipDef>,
    order: Vec<ChipName>,
}

impl ChipRegistry {
    pub fn new() -> ChipRegistry {
        let mut registry = ChipRegistry::empty();
        for intrinsic in intrinsics() {
            let name = intrinsic.name.clone();
            registry.chips.insert(name.clone(), intrinsic.clone().into());
            registry.order.push(name);
        }
        registry
    }

    /// A registry without the built-in gates.
    pub fn empty() -> ChipRegistry {
        ChipRegistry {
            chips: BTreeMap::new(),
            order: vec![],
        }
    }

    pub fn register(&mut self, chip: ChipDef) -> Result<(), HdlError> {
        let name = chip.name().to_string();
        if self.chips.contains_key(&name) {
            return Err(HdlError::DuplicateChip(name));
        }
        chip.check_pins()?;

        info!("Registered chip {name}");
        self.chips.insert(name.clone(), chip);
        self.order.push(name);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ChipDef, HdlError> {
        self.chips.get(name).ok_or_else(|| HdlError::ChipNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chips.contains_key(name)
    }

    pub fn is_intrinsic(&self, name: &str) -> bool {
        self.chips.get(name).map(|chip| chip.is_intrinsic()).unwrap_or(false)
    }

    /// Chip names in registration order, so the intrinsics come first.
    pub fn list_known_chip_names(&self) -> Vec<ChipName> {
        self.order.clone()
    }

    pub fn composites(&self) -> Vec<Arc<Composite>> {
        let mut results = vec![];
        for name in &self.order {
            if let Some(ChipDef::Composite(composite)) = self.chips.get(name) {
                results.push(composite.clone());
            }
        }
        results
    }

    /// Parses every `CHIP` block in `text` and registers it. Returns the new chip names.
    pub fn load_from_string(&mut self, text: &str) -> Result<Vec<ChipName>, HdlError> {
        let chips = parse_chips(text)?;
        self.register_all(chips)
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<Vec<ChipName>, HdlError> {
        let chips = parse_chips_file(path.as_ref())?;
        self.register_all(chips)
    }

    /// Loads every `*.hdl` file in `dir`, in file name order.
    pub fn load_dir<P: AsRef<std::path::Path>>(&mut self, dir: P) -> Result<Vec<ChipName>, HdlError> {
        let dir = dir.as_ref();
        let io_error = |e: std::io::Error| HdlError::Io(dir.display().to_string(), e.to_string());

        let mut paths = vec![];
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().map(|ext| ext == "hdl").unwrap_or(false) {
                paths.push(path);
            }
        }
        paths.sort();

        info!("Loading {} chip files from {}", paths.len(), dir.display());
        let mut names = vec![];
        for path in paths {
            names.extend(self.load_from_file(&path)?);
        }
        Ok(names)
    }

    fn register_all(&mut self, chips: Vec<Composite>) -> Result<Vec<ChipName>, HdlError> {
        let mut names = vec![];
        for chip in chips {
            names.push(chip.name.clone());
            self.register(chip.into())?;
        }
        Ok(names)
    }

    /// Validates every composite up front instead of waiting for evaluation to trip over it.
    ///
    /// Checks that referenced chips exist, that pin maps fit their callees,
    /// that each signal has one producer and every consumed signal has one,
    /// that parts contain no combinational cycle, and that no chip reaches itself through its parts.
    /// All problems found are returned together.
    pub fn check(&self) -> Result<(), Vec<HdlError>> {
        let mut errors = vec![];
        for composite in self.composites() {
            if let Err(error) = schedule(self, &composite) {
                errors.push(error);
            }
        }
        errors.extend(self.definition_cycles());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// One error per group of chips that reach themselves through their parts, including a chip that uses itself.
    fn definition_cycles(&self) -> Vec<HdlError> {
        let composites = self.composites();
        let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();
        let mut graph: DiGraph<ChipName, ()> = DiGraph::new();

        for composite in &composites {
            nodes.insert(&composite.name, graph.add_node(composite.name.clone()));
        }

        for composite in &composites {
            let node = nodes[composite.name.as_str()];
            for dependency in composite.dependencies() {
                if let Some(dependency) = nodes.get(dependency) {
                    graph.add_edge(node, *dependency, ());
                }
            }
        }

        let mut cycles = vec![];
        for component in kosaraju_scc(&graph) {
            let node = component[0];
            if component.len() > 1 || graph.contains_edge(node, node) {
                let mut chips: Vec<ChipName> = component.iter().map(|n| graph[*n].clone()).collect();
                chips.sort();
                cycles.push(chips);
            }
        }
        cycles.sort();

        cycles.into_iter().map(|chips| HdlError::CombinationalCycle(Cycle::Definitions(chips))).collect()
    }
}

impl Default for ChipRegistry {
    fn default() -> ChipRegistry {
        ChipRegistry::new()
    }
}
