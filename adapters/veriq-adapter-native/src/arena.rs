//! Object storage behind raw handles.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use veriq_engine::{EngineError, EngineResult, HandleKind, RawHandle};

use crate::program::Program;

/// A connectivity graph. Edges are stored as given and queried undirected.
#[derive(Debug, Clone)]
pub(crate) struct Graph {
    pub num_qubits: u32,
    edges: FxHashSet<(u32, u32)>,
}

impl Graph {
    pub fn new(num_qubits: u32, edges: &[(u32, u32)]) -> EngineResult<Self> {
        for &(a, b) in edges {
            if a == b {
                return Err(EngineError::InvalidGraph(format!("self-loop on qubit {a}")));
            }
            if a >= num_qubits || b >= num_qubits {
                return Err(EngineError::InvalidGraph(format!(
                    "edge ({a}, {b}) outside {num_qubits} qubits"
                )));
            }
        }
        Ok(Self {
            num_qubits,
            edges: edges.iter().copied().collect(),
        })
    }

    pub fn has_directed(&self, a: u32, b: u32) -> bool {
        self.edges.contains(&(a, b))
    }

    pub fn adjacent(&self, a: u32, b: u32) -> bool {
        self.has_directed(a, b) || self.has_directed(b, a)
    }

    pub fn is_well_formed(&self) -> bool {
        self.edges
            .iter()
            .all(|&(a, b)| a != b && a < self.num_qubits && b < self.num_qubits)
    }

    fn neighbors(&self, q: u32) -> impl Iterator<Item = u32> + '_ {
        (0..self.num_qubits).filter(move |&p| p != q && self.adjacent(q, p))
    }

    /// Breadth-first shortest path from `from` to `to`, both inclusive.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        let n = self.num_qubits as usize;
        let mut parent: Vec<Option<u32>> = vec![None; n];
        let mut seen = vec![false; n];
        let mut queue = VecDeque::from([from]);
        seen[from as usize] = true;
        while let Some(q) = queue.pop_front() {
            if q == to {
                let mut path = vec![to];
                let mut cur = to;
                while let Some(p) = parent[cur as usize] {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbors(q) {
                if !seen[next as usize] {
                    seen[next as usize] = true;
                    parent[next as usize] = Some(q);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

/// Whether `list` is a permutation of `0..list.len()`.
pub(crate) fn is_bijection(list: &[u32]) -> bool {
    let mut seen = vec![false; list.len()];
    list.iter().all(|&v| {
        let slot = seen.get_mut(v as usize);
        match slot {
            Some(s) if !*s => {
                *s = true;
                true
            }
            _ => false,
        }
    })
}

#[derive(Debug)]
pub(crate) enum Object {
    Circuit(Program),
    Layout(Vec<u32>),
    Graph(Graph),
}

impl Object {
    fn kind(&self) -> HandleKind {
        match self {
            Object::Circuit(_) => HandleKind::Circuit,
            Object::Layout(_) => HandleKind::Layout,
            Object::Graph(_) => HandleKind::Graph,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    next: u64,
    objects: FxHashMap<RawHandle, Object>,
}

impl Arena {
    pub fn insert(&mut self, object: Object) -> RawHandle {
        loop {
            self.next = self.next.wrapping_add(1);
            if let Some(handle) = RawHandle::new(self.next) {
                if !self.objects.contains_key(&handle) {
                    self.objects.insert(handle, object);
                    return handle;
                }
            }
        }
    }

    fn mismatch(handle: RawHandle, expected: HandleKind, found: Option<&Object>) -> EngineError {
        match found {
            None => EngineError::UnknownHandle {
                handle,
                kind: expected,
            },
            Some(object) => EngineError::WrongHandleKind {
                handle,
                expected,
                actual: object.kind(),
            },
        }
    }

    pub fn circuit(&self, handle: RawHandle) -> EngineResult<&Program> {
        match self.objects.get(&handle) {
            Some(Object::Circuit(p)) => Ok(p),
            other => Err(Self::mismatch(handle, HandleKind::Circuit, other)),
        }
    }

    pub fn layout(&self, handle: RawHandle) -> EngineResult<&[u32]> {
        match self.objects.get(&handle) {
            Some(Object::Layout(l)) => Ok(l),
            other => Err(Self::mismatch(handle, HandleKind::Layout, other)),
        }
    }

    pub fn graph(&self, handle: RawHandle) -> EngineResult<&Graph> {
        match self.objects.get(&handle) {
            Some(Object::Graph(g)) => Ok(g),
            other => Err(Self::mismatch(handle, HandleKind::Graph, other)),
        }
    }

    /// Remove and return a circuit. Objects of another kind stay put.
    pub fn take_circuit(&mut self, handle: RawHandle) -> EngineResult<Program> {
        match self.objects.remove(&handle) {
            Some(Object::Circuit(p)) => Ok(p),
            Some(other) => {
                let err = Self::mismatch(handle, HandleKind::Circuit, Some(&other));
                self.objects.insert(handle, other);
                Err(err)
            }
            None => Err(Self::mismatch(handle, HandleKind::Circuit, None)),
        }
    }

    /// Remove and return a layout. Objects of another kind stay put.
    pub fn take_layout(&mut self, handle: RawHandle) -> EngineResult<Vec<u32>> {
        match self.objects.remove(&handle) {
            Some(Object::Layout(l)) => Ok(l),
            Some(other) => {
                let err = Self::mismatch(handle, HandleKind::Layout, Some(&other));
                self.objects.insert(handle, other);
                Err(err)
            }
            None => Err(Self::mismatch(handle, HandleKind::Layout, None)),
        }
    }

    pub fn remove(&mut self, handle: RawHandle) -> bool {
        self.objects.remove(&handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bijection() {
        assert!(is_bijection(&[]));
        assert!(is_bijection(&[2, 0, 1]));
        assert!(!is_bijection(&[0, 0, 1]));
        assert!(!is_bijection(&[0, 3, 1]));
    }

    #[test]
    fn test_graph_validation() {
        assert!(Graph::new(3, &[(0, 1), (1, 2)]).is_ok());
        assert!(matches!(
            Graph::new(2, &[(0, 0)]),
            Err(EngineError::InvalidGraph(_))
        ));
        assert!(Graph::new(2, &[(0, 2)]).is_err());
    }

    #[test]
    fn test_shortest_path_undirected() {
        let g = Graph::new(4, &[(1, 0), (2, 1), (2, 3)]).unwrap();
        assert_eq!(g.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
        let split = Graph::new(4, &[(0, 1), (2, 3)]).unwrap();
        assert_eq!(split.shortest_path(0, 3), None);
    }

    #[test]
    fn test_kind_mismatch() {
        let mut arena = Arena::default();
        let h = arena.insert(Object::Layout(vec![0, 1]));
        assert!(matches!(
            arena.take_circuit(h),
            Err(EngineError::WrongHandleKind { .. })
        ));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.take_layout(h).unwrap(), vec![0, 1]);
        assert_eq!(arena.len(), 0);
    }
}
