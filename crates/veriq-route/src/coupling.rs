//! Device coupling maps.

use std::collections::VecDeque;

use petgraph::graph::UnGraph;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// Which pairs of physical qubits can interact with two-qubit gates.
///
/// Edges are undirected. All-pairs BFS distances and predecessors are
/// precomputed by the factory methods, so `distance()` is O(1) and
/// `shortest_path()` is O(distance).
///
/// After deserialization, call [`rebuild_caches()`](Self::rebuild_caches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingMap {
    edges: Vec<(u32, u32)>,
    num_qubits: u32,
    #[serde(skip)]
    adjacency: FxHashMap<u32, Vec<u32>>,
    #[serde(skip)]
    dist_matrix: Vec<Vec<u32>>,
    #[serde(skip)]
    pred_matrix: Vec<Vec<u32>>,
}

impl PartialEq for CouplingMap {
    fn eq(&self, other: &Self) -> bool {
        self.num_qubits == other.num_qubits && self.edges == other.edges
    }
}

impl CouplingMap {
    /// An edgeless map on `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            edges: vec![],
            num_qubits,
            adjacency: FxHashMap::default(),
            dist_matrix: vec![],
            pred_matrix: vec![],
        }
    }

    /// Add an undirected edge. Duplicates, in either direction, are ignored.
    pub fn add_edge(&mut self, q1: u32, q2: u32) {
        if self
            .edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
        {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency.entry(q1).or_default().push(q2);
        self.adjacency.entry(q2).or_default().push(q1);
    }

    /// Build from an edge list, rejecting self-loops and out-of-range qubits.
    pub fn from_edges(num_qubits: u32, edges: &[(u32, u32)]) -> RouteResult<Self> {
        let mut map = Self::new(num_qubits);
        for &(a, b) in edges {
            if a == b || a >= num_qubits || b >= num_qubits {
                return Err(RouteError::InvalidCouplingMap(format!(
                    "edge ({a}, {b}) on a {num_qubits}-qubit device"
                )));
            }
            map.add_edge(a, b);
        }
        map.precompute_distances();
        Ok(map)
    }

    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src as u32);

            while let Some(current) = queue.pop_front() {
                let cur = current as usize;
                for &neighbor in self.adjacency.get(&current).into_iter().flatten() {
                    let nb = neighbor as usize;
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = current;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Rebuild adjacency and distance caches from the edge list.
    pub fn rebuild_caches(&mut self) {
        self.adjacency.clear();
        for &(q1, q2) in &self.edges {
            self.adjacency.entry(q1).or_default().push(q2);
            self.adjacency.entry(q2).or_default().push(q1);
        }
        self.precompute_distances();
    }

    /// Whether two qubits share an edge.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(&q1)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(&qubit)
            .map(|v| v.iter().copied())
            .into_iter()
            .flatten()
    }

    pub fn degree(&self, qubit: u32) -> usize {
        self.adjacency.get(&qubit).map_or(0, Vec::len)
    }

    /// Whether every qubit can reach every other.
    pub fn is_connected_graph(&self) -> bool {
        if self.num_qubits <= 1 {
            return true;
        }
        let mut graph = UnGraph::<(), ()>::with_capacity(self.num_qubits as usize, self.edges.len());
        for _ in 0..self.num_qubits {
            graph.add_node(());
        }
        graph.extend_with_edges(self.edges.iter().map(|&(a, b)| (a, b)));
        petgraph::algo::connected_components(&graph) == 1
    }

    /// Linear chain 0-1-2-...
    pub fn linear(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            map.add_edge(i, i + 1);
        }
        map.precompute_distances();
        map
    }

    /// Linear chain closed into a ring.
    pub fn ring(n: u32) -> Self {
        let mut map = Self::linear(n);
        if n > 2 {
            map.add_edge(n - 1, 0);
            map.precompute_distances();
        }
        map
    }

    /// Rectangular grid, row-major numbering.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut map = Self::new(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let q = r * cols + c;
                if c + 1 < cols {
                    map.add_edge(q, q + 1);
                }
                if r + 1 < rows {
                    map.add_edge(q, q + cols);
                }
            }
        }
        map.precompute_distances();
        map
    }

    /// Fully connected map.
    pub fn full(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                map.add_edge(i, j);
            }
        }
        map.precompute_distances();
        map
    }

    /// The 5-qubit IBM Tenerife device (bow tie).
    pub fn tenerife() -> Self {
        let mut map = Self::new(5);
        for (a, b) in [(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (4, 2)] {
            map.add_edge(a, b);
        }
        map.precompute_distances();
        map
    }

    /// Shortest-path distance, `None` when unreachable.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let d = *self.dist_matrix.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// Shortest path from `from` to `to`, both inclusive.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        if from == to {
            return Some(vec![from]);
        }
        self.distance(from, to)?;

        let f = from as usize;
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            let pred = self.pred_matrix[f][current as usize];
            if pred == u32::MAX {
                return None;
            }
            path.push(pred);
            current = pred;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_distances() {
        let map = CouplingMap::linear(5);
        assert_eq!(map.distance(0, 4), Some(4));
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
        assert!(map.is_connected(2, 1));
        assert!(!map.is_connected(0, 2));
    }

    #[test]
    fn test_ring_and_grid() {
        assert_eq!(CouplingMap::ring(6).distance(0, 5), Some(1));
        let grid = CouplingMap::grid(2, 3);
        assert_eq!(grid.edges().len(), 7);
        assert_eq!(grid.distance(0, 5), Some(3));
    }

    #[test]
    fn test_tenerife() {
        let map = CouplingMap::tenerife();
        assert_eq!(map.num_qubits(), 5);
        assert_eq!(map.degree(2), 4);
        assert!(map.is_connected_graph());
    }

    #[test]
    fn test_disconnected() {
        let map = CouplingMap::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        assert!(!map.is_connected_graph());
        assert_eq!(map.distance(0, 3), None);
        assert_eq!(map.shortest_path(0, 3), None);
    }

    #[test]
    fn test_from_edges_validates() {
        assert!(CouplingMap::from_edges(2, &[(0, 0)]).is_err());
        assert!(CouplingMap::from_edges(2, &[(0, 2)]).is_err());
    }

    #[test]
    fn test_serde_roundtrip_rebuilds() {
        let map = CouplingMap::linear(3);
        let json = serde_json::to_string(&map).unwrap();
        let mut back: CouplingMap = serde_json::from_str(&json).unwrap();
        back.rebuild_caches();
        assert_eq!(back, map);
        assert_eq!(back.distance(0, 2), Some(2));
    }
}
