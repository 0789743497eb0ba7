//! Dependency graph construction.
//!
//! Every dependency slot is matched against the components known to the
//! engine and turned into a [`ResolvedEdge`]. Internal edges then form one
//! [`Graph`] per group; cross-group edges feed the group resolver.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::core::{
    ComponentId, DependencyReference, DependencySlot, DescriptorSet, GroupId, ReferenceKind,
};
use crate::resolver::contracts::ContractMap;
use crate::resolver::errors::{Candidate, ResolveError};

/// A directed graph whose iteration order is insertion order.
///
/// An edge `a -> b` means "a depends on b".
#[derive(Debug, Clone)]
pub struct Graph<N> {
    graph: DiGraph<N, ()>,
    index: HashMap<N, NodeIndex>,
}

impl<N: Clone + Eq + Hash> Graph<N> {
    pub fn new() -> Self {
        Graph {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node, returning the existing index if already present.
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Add an edge between two known nodes. Unknown endpoints and repeated
    /// edges are ignored; returns whether an edge was added.
    pub fn add_edge(&mut self, from: &N, to: &N) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.graph.node_indices().map(move |i| &self.graph[i])
    }

    /// Direct dependencies of a node in the order the edges were added.
    pub fn deps(&self, node: &N) -> Vec<&N> {
        match self.index.get(node) {
            Some(&idx) => self
                .dep_indices(idx)
                .into_iter()
                .map(|i| &self.graph[i])
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn weight(&self, idx: NodeIndex) -> &N {
        &self.graph[idx]
    }

    /// petgraph walks adjacency lists newest-first, so sort by edge id to
    /// recover insertion order.
    pub(crate) fn dep_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Render as Graphviz DOT with node labels produced by `label`.
    pub fn to_dot(&self, label: impl Fn(&N) -> String) -> String {
        let labeled = self.graph.map(|_, n| label(n), |_, _| "");
        format!("{}", Dot::with_config(&labeled, &[Config::EdgeNoLabel]))
    }
}

impl<N: Clone + Eq + Hash> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A dependency slot after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEdge {
    /// Target lives in the requester's group.
    Internal(DependencyReference),
    /// Target lives in another group and is reached through that group's
    /// composition result.
    CrossGroup {
        group: GroupId,
        reference: DependencyReference,
    },
    /// No known component satisfies the slot.
    Unmanaged,
}

impl ResolvedEdge {
    pub fn target(&self) -> Option<ComponentId> {
        match self {
            ResolvedEdge::Internal(r) | ResolvedEdge::CrossGroup { reference: r, .. } => {
                Some(r.target)
            }
            ResolvedEdge::Unmanaged => None,
        }
    }
}

impl fmt::Display for ResolvedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedEdge::Internal(r) => write!(f, "{} `{}`", r.kind, r.value),
            ResolvedEdge::CrossGroup { reference, .. } => {
                write!(f, "{} `{}` (cross-group)", reference.kind, reference.value)
            }
            ResolvedEdge::Unmanaged => write!(f, "unmanaged"),
        }
    }
}

/// Options controlling slot resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Break same-name ties by preferring the candidate whose source
    /// directory shares the longest prefix with the requester's.
    pub colocated_tiebreak: bool,
}

/// Resolved edges of every component, one entry per slot.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    edges: Vec<Vec<ResolvedEdge>>,
}

impl EdgeTable {
    pub fn get(&self, id: ComponentId) -> &[ResolvedEdge] {
        self.edges.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Matches dependency slots against the descriptor set.
pub struct GraphBuilder<'a> {
    set: &'a DescriptorSet,
    contracts: &'a ContractMap,
    names: HashMap<&'a str, Vec<ComponentId>>,
    base_types: HashMap<&'a str, Vec<ComponentId>>,
    options: ResolveOptions,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(set: &'a DescriptorSet, contracts: &'a ContractMap, options: ResolveOptions) -> Self {
        let mut names: HashMap<&str, Vec<ComponentId>> = HashMap::new();
        let mut base_types: HashMap<&str, Vec<ComponentId>> = HashMap::new();

        for (id, desc) in set.iter() {
            names.entry(desc.name.as_str()).or_default().push(id);
            if let Some(base) = desc.base_type() {
                base_types.entry(base).or_default().push(id);
            }
        }

        GraphBuilder {
            set,
            contracts,
            names,
            base_types,
            options,
        }
    }

    /// Resolve one slot.
    ///
    /// Precedence:
    /// 1. component name in the requester's group
    /// 2. contract name
    /// 3. base type name (must be unique)
    /// 4. component name in any other group (must be unique)
    /// 5. unmanaged
    pub fn resolve_slot(
        &self,
        requester: ComponentId,
        slot: &DependencySlot,
    ) -> Result<ResolvedEdge, ResolveError> {
        let wanted = slot.declared_type_name.as_str();
        let home = self.set.group_of(requester);
        let by_name = self.names.get(wanted).map(Vec::as_slice).unwrap_or(&[]);

        let local: Vec<_> = by_name
            .iter()
            .copied()
            .filter(|&id| self.set.group_of(id) == home)
            .collect();
        if !local.is_empty() {
            let target = self.pick_by_name(requester, wanted, &local)?;
            return Ok(self.edge(requester, ReferenceKind::ComponentName, wanted, target));
        }

        if let Some(target) = self.contracts.get(wanted) {
            return Ok(self.edge(requester, ReferenceKind::Contract, wanted, target));
        }
        if self.contracts.is_ambiguous(wanted) {
            // Already reported by the contract resolver.
            tracing::trace!("slot `{}` hits an ambiguous contract", wanted);
            return Ok(ResolvedEdge::Unmanaged);
        }

        if let Some(extenders) = self.base_types.get(wanted) {
            return match extenders.as_slice() {
                [target] => Ok(self.edge(requester, ReferenceKind::BaseType, wanted, *target)),
                many => Err(ResolveError::AmbiguousBaseType {
                    requester: Candidate::of(self.set, requester),
                    base_type: wanted.to_string(),
                    candidates: many.iter().map(|&id| Candidate::of(self.set, id)).collect(),
                }),
            };
        }

        if !by_name.is_empty() {
            let target = self.pick_by_name(requester, wanted, by_name)?;
            return Ok(self.edge(requester, ReferenceKind::ComponentName, wanted, target));
        }

        Ok(ResolvedEdge::Unmanaged)
    }

    fn pick_by_name(
        &self,
        requester: ComponentId,
        name: &str,
        candidates: &[ComponentId],
    ) -> Result<ComponentId, ResolveError> {
        if let [only] = candidates {
            return Ok(*only);
        }

        if self.options.colocated_tiebreak {
            let home = self.set.get(requester).source_dir();
            let scored: Vec<_> = candidates
                .iter()
                .map(|&id| (id, shared_prefix_len(home, self.set.get(id).source_dir())))
                .collect();
            let best = scored.iter().map(|(_, s)| *s).max().unwrap_or(0);
            let winners: Vec<_> = scored.iter().filter(|(_, s)| *s == best).collect();
            if let [(winner, _)] = winners.as_slice() {
                tracing::debug!(
                    "`{}` resolved to {} by source colocation",
                    name,
                    self.set.get(*winner).source_locator.display()
                );
                return Ok(*winner);
            }
        }

        Err(ResolveError::AmbiguousComponentName {
            requester: Candidate::of(self.set, requester),
            name: name.to_string(),
            candidates: candidates.iter().map(|&id| Candidate::of(self.set, id)).collect(),
        })
    }

    fn edge(
        &self,
        requester: ComponentId,
        kind: ReferenceKind,
        value: &str,
        target: ComponentId,
    ) -> ResolvedEdge {
        let reference = DependencyReference {
            kind,
            value: value.to_string(),
            target,
        };
        let target_group = self.set.group_of(target);
        if target_group == self.set.group_of(requester) {
            ResolvedEdge::Internal(reference)
        } else {
            ResolvedEdge::CrossGroup {
                group: target_group,
                reference,
            }
        }
    }

    /// Resolve every slot of every component. Slots that fail resolution
    /// are recorded as unmanaged alongside the error.
    pub fn build(&self) -> (EdgeTable, Vec<ResolveError>) {
        let mut errors = Vec::new();
        let mut edges = Vec::with_capacity(self.set.len());

        for (id, desc) in self.set.iter() {
            let mut resolved = Vec::with_capacity(desc.dependency_slots.len());
            for slot in &desc.dependency_slots {
                match self.resolve_slot(id, slot) {
                    Ok(edge) => {
                        tracing::trace!("{}: `{}` -> {}", desc.name, slot.declared_type_name, edge);
                        resolved.push(edge);
                    }
                    Err(err) => {
                        errors.push(err);
                        resolved.push(ResolvedEdge::Unmanaged);
                    }
                }
            }
            edges.push(resolved);
        }

        (EdgeTable { edges }, errors)
    }
}

/// Build the internal component graph of one group.
///
/// Every member becomes a node, including leaves with no resolvable slots.
pub fn component_graph(set: &DescriptorSet, edges: &EdgeTable, group: GroupId) -> Graph<ComponentId> {
    let mut graph = Graph::new();
    for &id in set.members(group) {
        graph.add_node(id);
    }
    for &id in set.members(group) {
        for edge in edges.get(id) {
            if let ResolvedEdge::Internal(reference) = edge {
                graph.add_edge(&id, &reference.target);
            }
        }
    }
    graph
}

fn shared_prefix_len(a: &Path, b: &Path) -> usize {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .count()
}
