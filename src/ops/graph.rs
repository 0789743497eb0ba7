//! Graphviz rendering of resolved dependency graphs.

use crate::core::{ComponentId, DescriptorSet};
use crate::resolver::{Graph, Resolution};

/// Every component and every resolved edge, internal and cross-group, as
/// DOT. Nodes are labeled `group::Name`.
pub fn component_dot(set: &DescriptorSet, resolution: &Resolution) -> String {
    let mut graph: Graph<ComponentId> = Graph::new();
    for id in set.ids() {
        graph.add_node(id);
    }
    for id in set.ids() {
        for target in resolution.edges(id).iter().filter_map(|e| e.target()) {
            graph.add_edge(&id, &target);
        }
    }

    graph.to_dot(|&id| format!("{}::{}", set.group_name_of(id), set.get(id).name))
}

/// The group dependency graph as DOT.
pub fn group_dot(set: &DescriptorSet, resolution: &Resolution) -> String {
    resolution
        .group_graph()
        .to_dot(|&g| set.group_name(g).to_string())
}
