//! Relative-import dependency graph
//!
//! Only relative imports that resolve to project files become edges;
//! packages and built-ins are leaves outside the graph.

use super::ImportAnalyzer;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    fn node(&mut self, file: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(file) {
            return *idx;
        }
        let idx = self.graph.add_node(file.to_string());
        self.index.insert(file.to_string(), idx);
        idx
    }

    /// Follow relative imports from `entries` until no new file turns up.
    /// A visited set keeps cycles from looping.
    pub fn build(analyzer: &ImportAnalyzer, entries: &[String]) -> Self {
        let mut graph = Self::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = entries.iter().cloned().collect();

        while let Some(file) = queue.pop_front() {
            if !visited.insert(file.clone()) {
                continue;
            }
            let from = graph.node(&file);
            for dep in analyzer.local_dependencies(&file) {
                let to = graph.node(&dep);
                if graph.graph.find_edge(from, to).is_none() {
                    graph.graph.add_edge(from, to, ());
                }
                if !visited.contains(&dep) {
                    queue.push_back(dep);
                }
            }
        }
        graph
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, file: &str) -> bool {
        self.index.contains_key(file)
    }

    /// Direct local dependencies of `file`, sorted
    pub fn dependencies_of(&self, file: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(file) else {
            return Vec::new();
        };
        let mut deps: Vec<String> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect();
        deps.sort();
        deps
    }

    /// Every file reachable from `file` through one or more edges.
    /// `file` itself is included only when it sits on a cycle.
    pub fn closure(&self, file: &str) -> HashSet<String> {
        let mut reached = HashSet::new();
        let Some(&start) = self.index.get(file) else {
            return reached;
        };
        let mut stack: Vec<NodeIndex> = self.graph.neighbors(start).collect();
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            reached.insert(self.graph[idx].clone());
            stack.extend(self.graph.neighbors(idx));
        }
        reached
    }

    pub fn has_cycle_through(&self, file: &str) -> bool {
        self.closure(file).contains(file)
    }

    /// Import cycles as sorted file lists, largest first
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.into_iter().map(|idx| self.graph[idx].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles.sort_by_key(|c| std::cmp::Reverse(c.len()));
        cycles
    }
}
