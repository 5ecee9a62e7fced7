//! Simple-path enumeration over the page graph

use crate::graph::AppGraph;
use std::collections::{HashMap, VecDeque};

impl AppGraph {
    /// Enumerates every simple path from `from` to `to`, breadth-first
    ///
    /// Paths are node-id sequences returned in the order they are discovered,
    /// so shorter paths come first. A candidate next node already present in
    /// the partial path is pruned, which keeps cyclic graphs finite. Parallel
    /// edges between the same two nodes yield a single path.
    ///
    /// Unknown endpoints produce no paths; `from == to` yields the one-node path.
    pub fn find_paths(&self, from: &str, to: &str) -> Vec<Vec<String>> {
        if !self.contains_node(from) || !self.contains_node(to) {
            return Vec::new();
        }

        if from == to {
            return vec![vec![from.to_string()]];
        }

        let adjacency = self.adjacency();
        let mut paths = Vec::new();
        let mut queue: VecDeque<Vec<&str>> = VecDeque::new();
        queue.push_back(vec![from]);

        while let Some(path) = queue.pop_front() {
            let Some(&last) = path.last() else {
                continue;
            };

            let Some(neighbors) = adjacency.get(last) else {
                continue;
            };

            for &next in neighbors {
                if path.contains(&next) {
                    continue;
                }

                let mut extended = path.clone();
                extended.push(next);

                if next == to {
                    paths.push(extended.into_iter().map(str::to_string).collect());
                } else {
                    queue.push_back(extended);
                }
            }
        }

        paths
    }

    /// Distinct successors per node, in edge insertion order
    fn adjacency(&self) -> HashMap<&str, Vec<&str>> {
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            let targets = adjacency.entry(edge.source_id.as_str()).or_default();
            if !targets.contains(&edge.target_id.as_str()) {
                targets.push(edge.target_id.as_str());
            }
        }
        adjacency
    }
}
