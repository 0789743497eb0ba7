//! Dependency resolution.
//!
//! Contract resolution, graph construction and cycle-checked sorting at
//! component and group granularity. The resolver is pure and
//! deterministic: the same descriptor set always yields the same
//! [`Resolution`].

pub mod contracts;
pub mod errors;
pub mod graph;
pub mod groups;
pub mod sort;

pub use contracts::{resolve_contracts, ContractMap};
pub use errors::{Candidate, ResolveError, ResolveErrors};
pub use graph::{EdgeTable, Graph, GraphBuilder, ResolveOptions, ResolvedEdge};
pub use sort::{topological_sort, SortResult};

use serde::Serialize;

use crate::core::{ComponentId, DescriptorSet, GroupId};

/// The resolved dependency structure of one descriptor set.
#[derive(Debug, Clone)]
pub struct Resolution {
    edges: EdgeTable,
    group_graph: Graph<GroupId>,
    component_graphs: Vec<Graph<ComponentId>>,
    components: Vec<SortResult<ComponentId>>,
    groups: SortResult<GroupId>,
}

/// Name-rendered form of a [`Resolution`], for display and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub groups: SortResult<String>,
    pub components: Vec<GroupReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub group: String,
    pub depends_on: Vec<String>,
    #[serde(flatten)]
    pub sort: SortResult<String>,
}

impl Resolution {
    /// Resolved edges of a component, one per dependency slot.
    pub fn edges(&self, id: ComponentId) -> &[ResolvedEdge] {
        self.edges.get(id)
    }

    pub fn component_sort(&self, group: GroupId) -> &SortResult<ComponentId> {
        &self.components[group.index()]
    }

    pub fn component_graph(&self, group: GroupId) -> &Graph<ComponentId> {
        &self.component_graphs[group.index()]
    }

    pub fn group_sort(&self) -> &SortResult<GroupId> {
        &self.groups
    }

    pub fn group_graph(&self) -> &Graph<GroupId> {
        &self.group_graph
    }

    /// Groups a group's composition function takes as parameters.
    pub fn group_dependencies(&self, group: GroupId) -> Vec<GroupId> {
        groups::group_dependencies(&self.group_graph, group)
    }

    pub fn is_acyclic(&self) -> bool {
        self.groups.is_acyclic() && self.components.iter().all(SortResult::is_acyclic)
    }

    /// Groups in group order, each with its members in component order.
    pub fn planning_order(&self) -> Vec<(GroupId, &[ComponentId])> {
        self.groups
            .order
            .iter()
            .map(|&g| (g, self.components[g.index()].order.as_slice()))
            .collect()
    }

    /// Every cycle, as errors naming the components or groups involved.
    pub fn cycle_errors(&self, set: &DescriptorSet) -> Vec<ResolveError> {
        let mut errors = Vec::new();

        for group in set.group_ids() {
            let sort = &self.components[group.index()];
            if !sort.is_acyclic() {
                errors.push(ResolveError::CircularDependency {
                    group: set.group_name(group).to_string(),
                    cycles: sort.map(|&id| set.get(id).name.clone()).cycles,
                });
            }
        }

        if !self.groups.is_acyclic() {
            errors.push(ResolveError::CircularGroupDependency {
                cycles: self.groups.map(|&g| set.group_name(g).to_string()).cycles,
            });
        }

        errors
    }

    /// Fail if any cycle exists at either granularity.
    pub fn validate(&self, set: &DescriptorSet) -> Result<(), ResolveErrors> {
        ResolveErrors(self.cycle_errors(set)).into_result()
    }

    pub fn report(&self, set: &DescriptorSet) -> ResolutionReport {
        let components = self
            .groups
            .order
            .iter()
            .map(|&g| GroupReport {
                group: set.group_name(g).to_string(),
                depends_on: self
                    .group_dependencies(g)
                    .into_iter()
                    .map(|d| set.group_name(d).to_string())
                    .collect(),
                sort: self.components[g.index()].map(|&id| set.get(id).name.clone()),
            })
            .collect();

        ResolutionReport {
            groups: self.groups.map(|&g| set.group_name(g).to_string()),
            components,
        }
    }
}

/// Resolve a descriptor set.
///
/// Every ambiguity (contract, component name, base type) and every cycle is
/// collected before returning. Ambiguities are fatal and returned as
/// `Err` together with any cycles found; without ambiguities the
/// [`Resolution`] is returned even if it contains cycles, leaving the
/// caller to [`Resolution::validate`] it.
pub fn resolve(set: &DescriptorSet, options: &ResolveOptions) -> Result<Resolution, ResolveErrors> {
    let contracts = ContractMap::build(set);
    let mut errors = ResolveErrors(contracts.errors(set));

    let (edges, slot_errors) = GraphBuilder::new(set, &contracts, *options).build();
    errors.extend(slot_errors);

    let mut component_graphs = Vec::with_capacity(set.group_count());
    let mut components = Vec::with_capacity(set.group_count());
    for group in set.group_ids() {
        let graph = graph::component_graph(set, &edges, group);
        components.push(topological_sort(&graph));
        component_graphs.push(graph);
    }

    let (group_graph, groups) = groups::resolve_groups(set, &edges);

    let resolution = Resolution {
        edges,
        group_graph,
        component_graphs,
        components,
        groups,
    };

    tracing::debug!(
        "resolved {} components in {} groups ({} contracts)",
        set.len(),
        set.group_count(),
        contracts.len()
    );

    if errors.is_empty() {
        Ok(resolution)
    } else {
        errors.extend(resolution.cycle_errors(set));
        Err(errors)
    }
}
