//! Group-level resolution.
//!
//! A group depends on another group when any of its components has a
//! resolved edge into it. Groups are ordered with the same sorter used for
//! components, and a group cycle is fatal even when no single component is
//! part of a component cycle.

use crate::core::{DescriptorSet, GroupId};
use crate::resolver::graph::{EdgeTable, Graph, ResolvedEdge};
use crate::resolver::sort::{topological_sort, SortResult};

/// Build the group dependency graph. Every group is a node, in
/// first-appearance order; edges follow component and slot order.
pub fn group_graph(set: &DescriptorSet, edges: &EdgeTable) -> Graph<GroupId> {
    let mut graph = Graph::new();
    for group in set.group_ids() {
        graph.add_node(group);
    }

    for group in set.group_ids() {
        for &id in set.members(group) {
            for edge in edges.get(id) {
                if let ResolvedEdge::CrossGroup { group: owner, .. } = edge {
                    if *owner != group {
                        graph.add_edge(&group, owner);
                    }
                }
            }
        }
    }

    graph
}

/// Groups each group depends on, in the order the dependencies were found.
pub fn group_dependencies(graph: &Graph<GroupId>, group: GroupId) -> Vec<GroupId> {
    graph.deps(&group).into_iter().copied().collect()
}

/// Order groups dependency-first.
pub fn resolve_groups(set: &DescriptorSet, edges: &EdgeTable) -> (Graph<GroupId>, SortResult<GroupId>) {
    let graph = group_graph(set, edges);
    let sort = topological_sort(&graph);
    tracing::debug!(
        "group order: {}",
        sort.order
            .iter()
            .map(|&g| set.group_name(g))
            .collect::<Vec<_>>()
            .join(", ")
    );
    (graph, sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::contracts::ContractMap;
    use crate::resolver::graph::{GraphBuilder, ResolveOptions};
    use crate::test_support::{component, grouped};

    fn edges_for(set: &DescriptorSet) -> EdgeTable {
        let contracts = ContractMap::build(set);
        let (edges, errors) = GraphBuilder::new(set, &contracts, ResolveOptions::default()).build();
        assert!(errors.is_empty(), "{:?}", errors);
        edges
    }

    fn names(set: &DescriptorSet, groups: &[GroupId]) -> Vec<String> {
        groups.iter().map(|&g| set.group_name(g).to_string()).collect()
    }

    #[test]
    fn test_provider_group_first() {
        let set = grouped(vec![
            ("x", vec![component("Consumer").depends_on("IProvider")]),
            ("y", vec![component("Provider").contract("IProvider")]),
        ]);

        let edges = edges_for(&set);
        let (graph, sort) = resolve_groups(&set, &edges);

        assert!(sort.is_acyclic());
        assert_eq!(names(&set, &sort.order), vec!["y", "x"]);
        assert_eq!(names(&set, &group_dependencies(&graph, GroupId(0))), vec!["y"]);
        assert!(group_dependencies(&graph, GroupId(1)).is_empty());
    }

    #[test]
    fn test_group_cycle_without_component_cycle() {
        let set = grouped(vec![
            (
                "a",
                vec![
                    component("AConsumer").depends_on("IB"),
                    component("AProvider").contract("IA"),
                ],
            ),
            (
                "b",
                vec![
                    component("BConsumer").depends_on("IA"),
                    component("BProvider").contract("IB"),
                ],
            ),
        ]);

        let edges = edges_for(&set);
        let (_, sort) = resolve_groups(&set, &edges);

        assert_eq!(sort.cycles.len(), 1);
        assert_eq!(names(&set, &sort.cycles[0]), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_internal_edges_do_not_link_groups() {
        let set = grouped(vec![
            ("a", vec![component("A1").depends_on("A2"), component("A2")]),
            ("b", vec![component("B1")]),
        ]);

        let graph = group_graph(&set, &edges_for(&set));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }
}
