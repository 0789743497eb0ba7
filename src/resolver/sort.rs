//! Cycle-checked topological sort.
//!
//! One algorithm serves both granularities: components within a group and
//! groups within a run. Cycles are reported, never broken silently.

use std::collections::HashSet;
use std::hash::Hash;

use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::resolver::graph::Graph;

/// Outcome of a sort.
///
/// `order` holds every node exactly once, dependencies before dependents
/// (best effort when cycles exist). Each entry of `cycles` is closed: its
/// first and last elements are the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortResult<N> {
    pub order: Vec<N>,
    pub cycles: Vec<Vec<N>>,
}

impl<N> SortResult<N> {
    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn map<M>(&self, mut f: impl FnMut(&N) -> M) -> SortResult<M> {
        SortResult {
            order: self.order.iter().map(&mut f).collect(),
            cycles: self
                .cycles
                .iter()
                .map(|cycle| cycle.iter().map(&mut f).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Dfs<'g, N> {
    graph: &'g Graph<N>,
    marks: Vec<Mark>,
    path: Vec<NodeIndex>,
    order: Vec<NodeIndex>,
    cycles: Vec<Vec<NodeIndex>>,
    seen_cycles: HashSet<Vec<NodeIndex>>,
}

impl<N: Clone + Eq + Hash> Dfs<'_, N> {
    fn visit(&mut self, node: NodeIndex) {
        self.marks[node.index()] = Mark::InProgress;
        self.path.push(node);

        for dep in self.graph.dep_indices(node) {
            match self.marks[dep.index()] {
                Mark::Unvisited => self.visit(dep),
                Mark::InProgress => self.record_cycle(dep),
                Mark::Done => {}
            }
        }

        self.path.pop();
        self.marks[node.index()] = Mark::Done;
        self.order.push(node);
    }

    fn record_cycle(&mut self, start: NodeIndex) {
        let Some(pos) = self.path.iter().position(|&n| n == start) else {
            return;
        };
        let members = &self.path[pos..];

        // Rotate so the smallest index leads; rotations of one cycle are one cycle.
        let lead = members
            .iter()
            .enumerate()
            .min_by_key(|(_, n)| n.index())
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut key = members[lead..].to_vec();
        key.extend_from_slice(&members[..lead]);
        if !self.seen_cycles.insert(key) {
            return;
        }

        let mut cycle = members.to_vec();
        cycle.push(start);
        self.cycles.push(cycle);
    }
}

/// Sort a graph whose edges point from dependent to dependency.
///
/// Every node is used as a traversal start, in insertion order, and each
/// node's edges are followed in insertion order, so identical input yields
/// identical output. Nodes are emitted as the traversal unwinds, which with
/// this edge direction is already dependency-first.
pub fn topological_sort<N: Clone + Eq + Hash>(graph: &Graph<N>) -> SortResult<N> {
    let mut dfs = Dfs {
        graph,
        marks: vec![Mark::Unvisited; graph.node_count()],
        path: Vec::new(),
        order: Vec::with_capacity(graph.node_count()),
        cycles: Vec::new(),
        seen_cycles: HashSet::new(),
    };

    for node in graph.node_indices() {
        if dfs.marks[node.index()] == Mark::Unvisited {
            dfs.visit(node);
        }
    }

    SortResult {
        order: dfs.order.iter().map(|&i| graph.weight(i).clone()).collect(),
        cycles: dfs
            .cycles
            .iter()
            .map(|cycle| cycle.iter().map(|&i| graph.weight(i).clone()).collect())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&'static str], edges: &[(&'static str, &'static str)]) -> Graph<&'static str> {
        let mut g = Graph::new();
        for n in nodes {
            g.add_node(*n);
        }
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    fn pos(order: &[&str], n: &str) -> usize {
        order.iter().position(|x| *x == n).unwrap()
    }

    #[test]
    fn test_simple_chain() {
        let result = topological_sort(&graph(&["A", "B"], &[("A", "B")]));
        assert_eq!(result.order, vec!["B", "A"]);
        assert!(result.cycles.is_empty());
    }

    #[test]
    fn test_two_node_cycle_terminates() {
        let result = topological_sort(&graph(&["A", "B"], &[("A", "B"), ("B", "A")]));
        assert_eq!(result.cycles, vec![vec!["A", "B", "A"]]);
        assert_eq!(result.order.len(), 2);
    }

    #[test]
    fn test_diamond() {
        let g = graph(
            &["Top", "Left", "Right", "Bottom"],
            &[("Top", "Left"), ("Top", "Right"), ("Left", "Bottom"), ("Right", "Bottom")],
        );
        let result = topological_sort(&g);

        assert!(result.is_acyclic());
        let order = &result.order;
        assert!(pos(order, "Bottom") < pos(order, "Left"));
        assert!(pos(order, "Bottom") < pos(order, "Right"));
        assert!(pos(order, "Left") < pos(order, "Top"));
        assert!(pos(order, "Right") < pos(order, "Top"));
    }

    #[test]
    fn test_self_dependency() {
        let result = topological_sort(&graph(&["X"], &[("X", "X")]));
        assert_eq!(result.cycles, vec![vec!["X", "X"]]);
        assert_eq!(result.order, vec!["X"]);
    }

    #[test]
    fn test_finds_every_cycle_in_one_run() {
        let g = graph(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "E"), ("E", "C"), ("E", "E")],
        );
        let result = topological_sort(&g);

        assert_eq!(
            result.cycles,
            vec![vec!["A", "B", "A"], vec!["C", "D", "E", "C"], vec!["E", "E"]]
        );
        assert_eq!(result.order.len(), 5);
    }

    #[test]
    fn test_order_independent_of_roots() {
        // Declared leaf-first; every node still appears exactly once.
        let g = graph(&["C", "B", "A"], &[("A", "B"), ("B", "C")]);
        let result = topological_sort(&g);
        assert_eq!(result.order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_deterministic() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "C"), ("A", "B"), ("B", "D"), ("C", "D"), ("D", "A")],
        );
        let first = topological_sort(&g);
        let second = topological_sort(&g);
        assert_eq!(first, second);
        assert_eq!(first.order, vec!["D", "C", "B", "A"]);
    }

    #[test]
    fn test_every_edge_respected_when_acyclic() {
        let edges = [
            ("app", "http"),
            ("app", "db"),
            ("http", "log"),
            ("db", "log"),
            ("db", "config"),
            ("log", "config"),
        ];
        let g = graph(&["app", "http", "db", "log", "config"], &edges);
        let result = topological_sort(&g);

        assert!(result.is_acyclic());
        for (dependent, dependency) in edges {
            assert!(pos(&result.order, dependency) < pos(&result.order, dependent));
        }
    }

    #[test]
    fn test_map_names() {
        let result = topological_sort(&graph(&["a"], &[])).map(|n| n.to_uppercase());
        assert_eq!(result.order, vec!["A".to_string()]);
    }
}
