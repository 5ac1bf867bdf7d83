//! Exact placement: find a placement under which every interacting pair of
//! qubits sits on a coupler, so that no routing is needed.
//!
//! The search is a VF2-style backtracking subgraph monomorphism from the
//! circuit's interaction graph into the coupling map. It is bounded by a call
//! limit and a wall-clock limit and reports which bound stopped it.

use std::time::Instant;

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;
use veriq_ir::{Circuit, InstructionKind};

use crate::coupling::CouplingMap;
use crate::error::{RouteError, RouteResult};
use crate::layout::Placement;
use crate::methods::{ExactLimits, ExactOutcome, ExactStatus};

/// Weighted graph of which virtual qubits share multi-qubit gates.
///
/// Node `i` is virtual qubit `i`; edge weights count the shared gates.
pub fn interaction_graph(circuit: &Circuit) -> UnGraph<u32, u32> {
    let mut graph = UnGraph::with_capacity(circuit.num_qubits() as usize, 0);
    for q in 0..circuit.num_qubits() {
        graph.add_node(q);
    }
    for inst in circuit.instructions() {
        if !matches!(inst.kind, InstructionKind::Gate(_)) {
            continue;
        }
        for (i, a) in inst.qubits.iter().enumerate() {
            for b in &inst.qubits[i + 1..] {
                let (na, nb) = (NodeIndex::new(a.index()), NodeIndex::new(b.index()));
                match graph.find_edge(na, nb) {
                    Some(e) => graph[e] += 1,
                    None => {
                        graph.add_edge(na, nb, 1);
                    }
                }
            }
        }
    }
    graph
}

enum Flow {
    Found,
    Exhausted,
    Stopped(ExactStatus),
}

struct Search<'a> {
    interactions: &'a UnGraph<u32, u32>,
    coupling: &'a CouplingMap,
    order: Vec<usize>,
    assigned: Vec<Option<u32>>,
    used: Vec<bool>,
    calls: u64,
    limits: ExactLimits,
    started: Instant,
}

impl Search<'_> {
    fn degree(&self, v: usize) -> usize {
        self.interactions.neighbors(NodeIndex::new(v)).count()
    }

    fn feasible(&self, v: usize, p: u32) -> bool {
        if self.used[p as usize] || self.coupling.degree(p) < self.degree(v) {
            return false;
        }
        self.interactions
            .neighbors(NodeIndex::new(v))
            .filter_map(|w| self.assigned[w.index()])
            .all(|pw| self.coupling.is_connected(p, pw))
    }

    fn candidates(&self, v: usize) -> Vec<u32> {
        let anchor = self
            .interactions
            .neighbors(NodeIndex::new(v))
            .find_map(|w| self.assigned[w.index()]);
        let mut out: Vec<u32> = match anchor {
            Some(p) => self.coupling.neighbors(p).collect(),
            None => (0..self.coupling.num_qubits()).collect(),
        };
        out.sort_unstable();
        out.retain(|&p| self.feasible(v, p));
        out
    }

    fn step(&mut self, depth: usize) -> Flow {
        self.calls += 1;
        if self.calls > self.limits.call_limit {
            return Flow::Stopped(ExactStatus::CallLimitReached);
        }
        if self.calls % 256 == 0 && self.started.elapsed() > self.limits.time_limit {
            return Flow::Stopped(ExactStatus::TimeLimitReached);
        }
        let Some(&v) = self.order.get(depth) else {
            return Flow::Found;
        };
        for p in self.candidates(v) {
            self.assigned[v] = Some(p);
            self.used[p as usize] = true;
            match self.step(depth + 1) {
                Flow::Exhausted => {}
                done => return done,
            }
            self.assigned[v] = None;
            self.used[p as usize] = false;
        }
        Flow::Exhausted
    }
}

/// Visit order for the search: start from the busiest qubit and keep
/// extending through already ordered neighbors. Isolated qubits are left out.
fn search_order(interactions: &UnGraph<u32, u32>) -> Vec<usize> {
    let n = interactions.node_count();
    let degree = |v: usize| interactions.neighbors(NodeIndex::new(v)).count();
    let mut in_order = vec![false; n];
    let mut order = Vec::new();
    loop {
        let next = (0..n)
            .filter(|&v| !in_order[v] && degree(v) > 0)
            .max_by_key(|&v| {
                let linked = interactions
                    .neighbors(NodeIndex::new(v))
                    .filter(|w| in_order[w.index()])
                    .count();
                (linked, degree(v), std::cmp::Reverse(v))
            });
        match next {
            Some(v) => {
                in_order[v] = true;
                order.push(v);
            }
            None => return order,
        }
    }
}

/// Search for a placement that needs no routing.
pub fn exact_layout(
    circuit: &Circuit,
    coupling: &CouplingMap,
    limits: ExactLimits,
) -> RouteResult<ExactOutcome> {
    let n = circuit.num_qubits();
    let available = coupling.num_qubits();
    if n > available {
        return Err(RouteError::CircuitTooLarge {
            required: n,
            available,
        });
    }

    let interactions = interaction_graph(circuit);
    let mut search = Search {
        interactions: &interactions,
        coupling,
        order: search_order(&interactions),
        assigned: vec![None; n as usize],
        used: vec![false; available as usize],
        calls: 0,
        limits,
        started: Instant::now(),
    };

    let status = match search.step(0) {
        Flow::Found => ExactStatus::SolutionFound,
        Flow::Exhausted => ExactStatus::NoSolutionFound,
        Flow::Stopped(status) => status,
    };
    debug!("Exact layout: {} after {} calls", status, search.calls);
    if status != ExactStatus::SolutionFound {
        return Ok(ExactOutcome {
            status,
            placement: None,
        });
    }

    let mut free = (0..available).filter(|&p| !search.used[p as usize]);
    let mut mapping = Vec::with_capacity(n as usize);
    for slot in search.assigned {
        let p = match slot {
            Some(p) => p,
            None => free.next().ok_or(RouteError::CircuitTooLarge {
                required: n,
                available,
            })?,
        };
        mapping.push(p);
    }
    Ok(ExactOutcome {
        status,
        placement: Some(Placement::new(mapping, available)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use veriq_ir::QubitId;

    fn limits() -> ExactLimits {
        ExactLimits::default()
    }

    fn uses_couplers(circuit: &Circuit, coupling: &CouplingMap, placement: &Placement) -> bool {
        circuit
            .instructions()
            .iter()
            .filter(|i| i.qubits.len() == 2)
            .all(|i| {
                let a = placement.physical(i.qubits[0].0).unwrap();
                let b = placement.physical(i.qubits[1].0).unwrap();
                coupling.is_connected(a, b)
            })
    }

    #[test]
    fn test_chain_fits_on_line() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        circuit.cx(QubitId(2), QubitId(1)).unwrap();
        let coupling = CouplingMap::linear(4);

        let outcome = exact_layout(&circuit, &coupling, limits()).unwrap();
        assert_eq!(outcome.status, ExactStatus::SolutionFound);
        assert!(uses_couplers(&circuit, &coupling, outcome.placement.as_ref().unwrap()));
    }

    #[test]
    fn test_triangle_does_not_fit_on_line() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(2)).unwrap();
        circuit.cx(QubitId(2), QubitId(0)).unwrap();

        let outcome = exact_layout(&circuit, &CouplingMap::linear(5), limits()).unwrap();
        assert_eq!(outcome.status, ExactStatus::NoSolutionFound);
        assert!(outcome.placement.is_none());

        let outcome = exact_layout(&circuit, &CouplingMap::tenerife(), limits()).unwrap();
        assert_eq!(outcome.status, ExactStatus::SolutionFound);
    }

    #[test]
    fn test_no_interactions_is_trivially_solved() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(QubitId(1)).unwrap();
        let outcome = exact_layout(&circuit, &CouplingMap::linear(3), limits()).unwrap();
        assert_eq!(outcome.placement.unwrap().as_slice(), &[0, 1]);
    }

    #[test]
    fn test_call_limit() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            circuit.cx(QubitId(a), QubitId(b)).unwrap();
        }
        let tight = ExactLimits {
            call_limit: 2,
            time_limit: Duration::from_secs(60),
        };
        let outcome = exact_layout(&circuit, &CouplingMap::linear(6), tight).unwrap();
        assert_eq!(outcome.status, ExactStatus::CallLimitReached);
    }

    #[test]
    fn test_too_large() {
        let circuit = Circuit::with_size("c", 6, 0);
        assert!(matches!(
            exact_layout(&circuit, &CouplingMap::tenerife(), limits()),
            Err(RouteError::CircuitTooLarge { required: 6, available: 5 })
        ));
    }

    #[test]
    fn test_interaction_weights() {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cz(QubitId(1), QubitId(0)).unwrap();
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        let graph = interaction_graph(&circuit);
        assert_eq!(graph.edge_count(), 3);
        let e = graph.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        assert_eq!(graph[e], 3);
    }
}
