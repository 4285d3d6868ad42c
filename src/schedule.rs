use super::*;

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

/// The order in which a composite's parts run, with each part's pin map resolved.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub order: Vec<usize>,
    pub bindings: Vec<Binding>,
}

/// Orders the parts of `composite` so that every part runs after the producers of all the signals it reads.
///
/// The order comes from the signal-producer graph, never from the textual order of the parts.
/// Every referenced chip must be registered and every pin map must fit its callee.
pub fn schedule(registry: &ChipRegistry, composite: &Composite) -> Result<Schedule, HdlError> {
    let mut bindings = Vec::with_capacity(composite.parts.len());
    for part in &composite.parts {
        let callee = registry.lookup(&part.chip)?;
        bindings.push(part.bind(callee)?);
    }

    let mut producers: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, binding) in bindings.iter().enumerate() {
        for (_pin, signal) in &binding.outputs {
            if composite.is_input(signal) || producers.insert(signal.as_str(), i).is_some() {
                return Err(HdlError::DuplicateAssignment(composite.name.clone(), signal.clone()));
            }
        }
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..bindings.len()).map(|i| graph.add_node(i)).collect();

    for (i, binding) in bindings.iter().enumerate() {
        for (_pin, signal) in &binding.inputs {
            if let Some(producer) = producers.get(signal.as_str()) {
                graph.add_edge(nodes[*producer], nodes[i], ());
            } else if !composite.is_input(signal) {
                return Err(HdlError::UnresolvedSignal(composite.name.clone(), signal.clone()));
            }
        }
    }

    let sorted = match toposort(&graph, None) {
        Ok(sorted) => sorted,
        Err(cycle) => {
            let members = cycle_members(&graph, cycle.node_id());
            let parts = members.iter().map(|i| composite.parts[*i].name().to_string()).collect();
            return Err(HdlError::CombinationalCycle(Cycle::Parts(composite.name.clone(), parts)));
        },
    };

    let order: Vec<usize> = sorted.into_iter().map(|node| graph[node]).collect();
    debug!("{}: part order {:?}", composite.name, order);
    Ok(Schedule {
        order,
        bindings,
    })
}

/// The weights of the strongly connected component holding `node`, sorted.
fn cycle_members<N: Clone + Ord, E>(graph: &DiGraph<N, E>, node: NodeIndex) -> Vec<N> {
    for component in kosaraju_scc(graph) {
        if component.contains(&node) {
            let mut members: Vec<N> = component.iter().map(|n| graph[*n].clone()).collect();
            members.sort();
            return members;
        }
    }
    vec![graph[node].clone()]
}
