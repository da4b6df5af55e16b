//! Deployment dependency graph.
//!
//! Graph structure and algorithms for ordering contract templates so every
//! producer deploys before its consumers: deterministic topological ordering
//! and exhaustive cycle reporting.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Sort key for deterministic ordering: the template's optional
/// `deployment_order` hint (absent hints sort last), then its catalog
/// declaration position.
pub type OrderKey = (u32, usize);

#[derive(Debug, Clone)]
struct PlanNode {
    name: String,
    key: OrderKey,
}

/// Directed graph over requested templates; an edge runs from producer to
/// consumer, so a topological order deploys producers first.
pub struct DependencyGraph {
    graph: DiGraph<PlanNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a template node if not already present.
    pub fn ensure_node(&mut self, name: &str, key: OrderKey) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            index
        } else {
            let index = self.graph.add_node(PlanNode {
                name: name.to_string(),
                key,
            });
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    /// Record that `consumer` requires `producer` deployed first. Both nodes
    /// must already exist; duplicate edges collapse to one.
    pub fn add_dependency(&mut self, producer: &str, consumer: &str) {
        let (Some(&from), Some(&to)) = (self.node_map.get(producer), self.node_map.get(consumer))
        else {
            return;
        };
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every template participating in a cycle, in sort-key order.
    ///
    /// A strongly connected component of more than one node is a cycle, as
    /// is a single node with a self-edge. All participants are reported, not
    /// just the first repeat encountered.
    pub fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<&PlanNode> = Vec::new();
        for component in tarjan_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| self.graph.contains_edge(n, n));
            if is_cycle {
                members.extend(component.iter().map(|&n| &self.graph[n]));
            }
        }
        members.sort_by_key(|node| node.key);
        members.into_iter().map(|node| node.name.clone()).collect()
    }

    /// Stable topological order: producers before consumers, ties broken by
    /// sort key so identical inputs always order identically.
    ///
    /// Returns `Err` with every cycle participant when no order exists.
    pub fn stable_topo_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| {
                (
                    n,
                    self.graph
                        .neighbors_directed(n, petgraph::Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        // Min-heap on (sort key, name) so the ready set drains
        // deterministically.
        let mut ready: BinaryHeap<Reverse<(OrderKey, String, NodeIndex)>> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n] == 0)
            .map(|n| {
                let node = &self.graph[n];
                Reverse((node.key, node.name.clone(), n))
            })
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse((_, name, index))) = ready.pop() {
            order.push(name);
            for neighbor in self.graph.neighbors(index) {
                let degree = in_degree
                    .get_mut(&neighbor)
                    .expect("neighbor tracked in in-degree map");
                *degree -= 1;
                if *degree == 0 {
                    let node = &self.graph[neighbor];
                    ready.push(Reverse((node.key, node.name.clone(), neighbor)));
                }
            }
        }

        if order.len() == self.graph.node_count() {
            Ok(order)
        } else {
            Err(self.cycle_members())
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
