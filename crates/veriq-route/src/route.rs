//! SWAP routing.
//!
//! All routers share one loop: execute every front-layer gate whose qubits
//! sit on a coupler, and when the front is blocked ask the selected method
//! for SWAPs. The methods differ only in how they choose those SWAPs:
//!
//! | method | choice |
//! |---|---|
//! | `basic` | walk the first blocked gate along a shortest path |
//! | `stochastic` | fewest SWAPs over randomized greedy trials for the layer |
//! | `lookahead` | first SWAP of the best sequence in a depth/width search |
//! | `sabre` | SABRE score with an extended set and decay |
//!
//! When a heuristic makes no progress for `10 * n` SWAPs, the closest
//! blocked gate is walked along a shortest path instead.

use std::collections::{BTreeSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};
use veriq_ir::{Circuit, Instruction, InstructionKind, QubitId, StandardGate};

use crate::coupling::CouplingMap;
use crate::error::{RouteError, RouteResult};
use crate::methods::{RoutingMethod, SolverParams};

const EXTENDED_SET_SIZE: usize = 20;
const EXTENDED_SET_WEIGHT: f64 = 0.5;
const DECAY_RATE: f64 = 0.001;
const DECAY_RESET_INTERVAL: usize = 5;
const TIE_EPSILON: f64 = 1e-10;

/// A circuit on physical qubits with SWAPs inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedCircuit {
    pub circuit: Circuit,
    /// Number of SWAPs inserted.
    pub swaps: usize,
    /// Entry `w` is the physical qubit the content of wire `w` ends on.
    pub final_layout: Vec<u32>,
}

/// Random source for the seeded heuristics.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Wire-to-physical assignment tracked while routing.
#[derive(Debug, Clone)]
pub(crate) struct WireLayout {
    wire_to_phys: Vec<u32>,
    phys_to_wire: Vec<u32>,
}

impl WireLayout {
    pub(crate) fn trivial(n: u32) -> Self {
        Self::from_wire_to_phys((0..n).collect())
    }

    /// `wire_to_phys` must be a permutation of `0..len`.
    pub(crate) fn from_wire_to_phys(wire_to_phys: Vec<u32>) -> Self {
        let mut phys_to_wire = vec![0; wire_to_phys.len()];
        for (w, &p) in (0u32..).zip(&wire_to_phys) {
            phys_to_wire[p as usize] = w;
        }
        Self {
            wire_to_phys,
            phys_to_wire,
        }
    }

    pub(crate) fn phys(&self, wire: u32) -> u32 {
        self.wire_to_phys[wire as usize]
    }

    fn swap_physical(&mut self, a: u32, b: u32) {
        let (wa, wb) = (self.phys_to_wire[a as usize], self.phys_to_wire[b as usize]);
        self.phys_to_wire.swap(a as usize, b as usize);
        self.wire_to_phys[wa as usize] = b;
        self.wire_to_phys[wb as usize] = a;
    }

    pub(crate) fn into_wire_to_phys(self) -> Vec<u32> {
        self.wire_to_phys
    }
}

/// Dependency graph over instructions, consumed front layer by front layer.
struct Dag {
    successors: Vec<Vec<usize>>,
    pending: Vec<usize>,
    front: BTreeSet<usize>,
    remaining: usize,
}

impl Dag {
    fn new(insts: &[Instruction], num_qubits: usize, num_clbits: usize) -> Self {
        let n = insts.len();
        let mut successors = vec![Vec::new(); n];
        let mut pending = vec![0; n];
        let mut last_qubit: Vec<Option<usize>> = vec![None; num_qubits];
        let mut last_clbit: Vec<Option<usize>> = vec![None; num_clbits];

        for (i, inst) in insts.iter().enumerate() {
            let preds: BTreeSet<usize> = inst
                .qubits
                .iter()
                .map(|q| last_qubit[q.index()])
                .chain(inst.clbits.iter().map(|c| last_clbit[c.0 as usize]))
                .flatten()
                .collect();
            for p in preds {
                successors[p].push(i);
                pending[i] += 1;
            }
            for q in &inst.qubits {
                last_qubit[q.index()] = Some(i);
            }
            for c in &inst.clbits {
                last_clbit[c.0 as usize] = Some(i);
            }
        }

        let front = (0..n).filter(|&i| pending[i] == 0).collect();
        Self {
            successors,
            pending,
            front,
            remaining: n,
        }
    }

    fn complete(&mut self, i: usize) {
        self.front.remove(&i);
        self.remaining -= 1;
        for &s in &self.successors[i] {
            self.pending[s] -= 1;
            if self.pending[s] == 0 {
                self.front.insert(s);
            }
        }
    }
}

/// The wire pair a gate needs adjacent, if any.
fn coupled_pair(inst: &Instruction) -> Option<(u32, u32)> {
    match (&inst.kind, inst.qubits.as_slice()) {
        (InstructionKind::Gate(_), [a, b]) => Some((a.0, b.0)),
        _ => None,
    }
}

fn dist(coupling: &CouplingMap, a: u32, b: u32) -> f64 {
    coupling
        .distance(a, b)
        .map_or(2.0 * f64::from(coupling.num_qubits()), f64::from)
}

fn swapped(pairs: &[(u32, u32)], (a, b): (u32, u32)) -> Vec<(u32, u32)> {
    let s = |p: u32| {
        if p == a {
            b
        } else if p == b {
            a
        } else {
            p
        }
    };
    pairs.iter().map(|&(x, y)| (s(x), s(y))).collect()
}

/// Couplers touching any qubit of a blocked gate, sorted.
fn candidate_swaps(coupling: &CouplingMap, pairs: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = BTreeSet::new();
    for &(a, b) in pairs {
        for p in [a, b] {
            for nb in coupling.neighbors(p) {
                out.insert((p.min(nb), p.max(nb)));
            }
        }
    }
    out.into_iter().collect()
}

fn all_adjacent(coupling: &CouplingMap, pairs: &[(u32, u32)]) -> bool {
    pairs.iter().all(|&(a, b)| coupling.is_connected(a, b))
}

pub(crate) struct RouterOutput {
    pub(crate) ops: Vec<Instruction>,
    pub(crate) swaps: usize,
    pub(crate) layout: WireLayout,
}

struct Router<'a> {
    coupling: &'a CouplingMap,
    insts: &'a [Instruction],
    method: RoutingMethod,
    params: &'a SolverParams,
    rng: &'a mut StdRng,
    dag: Dag,
    layout: WireLayout,
    out: Vec<Instruction>,
    swaps: usize,
    since_progress: usize,
    decay: Vec<f64>,
    swaps_since_reset: usize,
}

impl Router<'_> {
    fn executable(&self, i: usize) -> bool {
        coupled_pair(&self.insts[i]).is_none_or(|(a, b)| {
            self.coupling
                .is_connected(self.layout.phys(a), self.layout.phys(b))
        })
    }

    fn execute_ready(&mut self) -> bool {
        let mut progressed = false;
        loop {
            let ready: Vec<usize> = self
                .dag
                .front
                .iter()
                .copied()
                .filter(|&i| self.executable(i))
                .collect();
            if ready.is_empty() {
                return progressed;
            }
            for i in ready {
                let inst = self.insts[i].remapped(|q| QubitId(self.layout.phys(q.0)));
                self.out.push(inst);
                self.dag.complete(i);
            }
            progressed = true;
        }
    }

    /// Physical pairs of the blocked front-layer gates, in program order.
    fn blocked_pairs(&self) -> Vec<(u32, u32)> {
        self.dag
            .front
            .iter()
            .filter_map(|&i| coupled_pair(&self.insts[i]))
            .map(|(a, b)| (self.layout.phys(a), self.layout.phys(b)))
            .filter(|&(a, b)| !self.coupling.is_connected(a, b))
            .collect()
    }

    /// Physical pairs of the next two-qubit gates behind the front layer.
    fn extended_set(&self) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<usize> = self.dag.front.iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            for &s in &self.dag.successors[node] {
                if out.len() >= EXTENDED_SET_SIZE {
                    return out;
                }
                if !seen.insert(s) {
                    continue;
                }
                if let Some((a, b)) = coupled_pair(&self.insts[s]) {
                    out.push((self.layout.phys(a), self.layout.phys(b)));
                }
                queue.push_back(s);
            }
        }
        out
    }

    fn shortest_path_swaps(&self, (a, b): (u32, u32)) -> RouteResult<Vec<(u32, u32)>> {
        let path = self
            .coupling
            .shortest_path(a, b)
            .ok_or(RouteError::NoPath {
                qubit1: a,
                qubit2: b,
            })?;
        let hops = path.len().saturating_sub(2);
        Ok(path.windows(2).take(hops).map(|w| (w[0], w[1])).collect())
    }

    /// Walk the closest blocked gate along a shortest path.
    fn release_valve(&self, pairs: &[(u32, u32)]) -> RouteResult<Vec<(u32, u32)>> {
        let closest = pairs
            .iter()
            .copied()
            .min_by(|&(a, b), &(c, d)| {
                dist(self.coupling, a, b)
                    .total_cmp(&dist(self.coupling, c, d))
                    .then((a, b).cmp(&(c, d)))
            })
            .ok_or_else(|| RouteError::InvalidCouplingMap("routing stalled".into()))?;
        self.shortest_path_swaps(closest)
    }

    fn sabre_swap(&mut self, pairs: &[(u32, u32)]) -> Vec<(u32, u32)> {
        let extended = self.extended_set();
        let coupling = self.coupling;
        let mean = |ps: &[(u32, u32)]| {
            ps.iter().map(|&(a, b)| dist(coupling, a, b)).sum::<f64>() / ps.len() as f64
        };

        let mut best = f64::INFINITY;
        let mut tied = Vec::new();
        for swap in candidate_swaps(coupling, pairs) {
            let mut score = mean(&swapped(pairs, swap));
            if !extended.is_empty() {
                score += EXTENDED_SET_WEIGHT * mean(&swapped(&extended, swap));
            }
            score *= self.decay[swap.0 as usize].max(self.decay[swap.1 as usize]);
            if score < best - TIE_EPSILON {
                best = score;
                tied.clear();
                tied.push(swap);
            } else if (score - best).abs() <= TIE_EPSILON {
                tied.push(swap);
            }
        }
        if tied.is_empty() {
            return vec![];
        }
        vec![tied[self.rng.gen_range(0..tied.len())]]
    }

    fn lookahead_cost(&self, pairs: &[(u32, u32)]) -> f64 {
        pairs
            .iter()
            .map(|&(a, b)| dist(self.coupling, a, b) - 1.0)
            .sum()
    }

    fn lookahead_search(&self, pairs: &[(u32, u32)], depth: u32) -> (f64, Option<(u32, u32)>) {
        let base = self.lookahead_cost(pairs);
        if depth == 0 || base <= 0.0 {
            return (base, None);
        }
        let mut ranked: Vec<(f64, (u32, u32), Vec<(u32, u32)>)> =
            candidate_swaps(self.coupling, pairs)
                .into_iter()
                .map(|swap| {
                    let next = swapped(pairs, swap);
                    (self.lookahead_cost(&next), swap, next)
                })
                .collect();
        ranked.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        ranked.truncate(self.params.lookahead_width.max(1) as usize);

        let mut best = (f64::INFINITY, None);
        for (_, swap, next) in ranked {
            let (cost, _) = self.lookahead_search(&next, depth - 1);
            if cost < best.0 {
                best = (cost, Some(swap));
            }
        }
        best
    }

    fn lookahead_swap(&self, pairs: &[(u32, u32)]) -> Vec<(u32, u32)> {
        let base = self.lookahead_cost(pairs);
        match self.lookahead_search(pairs, self.params.lookahead_depth) {
            (cost, Some(swap)) if cost < base => vec![swap],
            _ => vec![],
        }
    }

    fn stochastic_swaps(&mut self, pairs: &[(u32, u32)]) -> Vec<(u32, u32)> {
        let n = self.coupling.num_qubits() as usize;
        let coupling = self.coupling;
        let limit = 2 * n;
        let mut best: Option<Vec<(u32, u32)>> = None;

        for _ in 0..self.params.stochastic_trials {
            let scale: Vec<f64> = (0..n * n)
                .map(|_| 1.0 + self.rng.r#gen::<f64>() / n as f64)
                .collect();
            let cost = |ps: &[(u32, u32)]| {
                ps.iter()
                    .map(|&(a, b)| {
                        let (lo, hi) = (a.min(b) as usize, a.max(b) as usize);
                        scale[lo * n + hi] * dist(coupling, a, b)
                    })
                    .sum::<f64>()
            };

            let mut current = pairs.to_vec();
            let mut sequence = Vec::new();
            while !all_adjacent(coupling, &current) && sequence.len() < limit {
                let now = cost(&current);
                let step = candidate_swaps(coupling, &current)
                    .into_iter()
                    .map(|swap| (cost(&swapped(&current, swap)), swap))
                    .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
                match step {
                    Some((c, swap)) if c < now => {
                        current = swapped(&current, swap);
                        sequence.push(swap);
                    }
                    _ => break,
                }
            }

            let shorter = best.as_ref().is_none_or(|b| sequence.len() < b.len());
            if all_adjacent(coupling, &current) && shorter {
                best = Some(sequence);
            }
        }
        best.unwrap_or_default()
    }

    fn reset_decay(&mut self) {
        self.decay.iter_mut().for_each(|d| *d = 1.0);
        self.swaps_since_reset = 0;
    }

    fn apply_swap(&mut self, a: u32, b: u32) {
        self.out.push(Instruction::two_qubit_gate(
            StandardGate::Swap,
            QubitId(a),
            QubitId(b),
        ));
        self.layout.swap_physical(a, b);
        self.swaps += 1;
        self.since_progress += 1;
        if self.method == RoutingMethod::Sabre {
            self.decay[a as usize] += DECAY_RATE;
            self.decay[b as usize] += DECAY_RATE;
            self.swaps_since_reset += 1;
            if self.swaps_since_reset >= DECAY_RESET_INTERVAL {
                self.reset_decay();
            }
        }
    }

    fn run(mut self) -> RouteResult<RouterOutput> {
        let stall_limit = 10 * self.coupling.num_qubits() as usize;
        while self.dag.remaining > 0 {
            if self.execute_ready() {
                self.since_progress = 0;
                self.reset_decay();
                continue;
            }
            let pairs = self.blocked_pairs();
            let mut swaps = if self.since_progress > stall_limit {
                vec![]
            } else {
                match self.method {
                    RoutingMethod::Basic => match pairs.first() {
                        Some(&pair) => self.shortest_path_swaps(pair)?,
                        None => vec![],
                    },
                    RoutingMethod::Stochastic => self.stochastic_swaps(&pairs),
                    RoutingMethod::Lookahead => self.lookahead_swap(&pairs),
                    RoutingMethod::Sabre => self.sabre_swap(&pairs),
                }
            };
            if swaps.is_empty() {
                swaps = self.release_valve(&pairs)?;
            }
            for (a, b) in swaps {
                self.apply_swap(a, b);
            }
        }
        Ok(RouterOutput {
            ops: self.out,
            swaps: self.swaps,
            layout: self.layout,
        })
    }
}

/// Route `insts`, whose wires start on the physical qubits given by `initial`.
pub(crate) fn run_router(
    insts: &[Instruction],
    num_clbits: u32,
    coupling: &CouplingMap,
    initial: WireLayout,
    method: RoutingMethod,
    params: &SolverParams,
    rng: &mut StdRng,
) -> RouteResult<RouterOutput> {
    let n = coupling.num_qubits();
    for inst in insts {
        if inst.is_gate() && inst.qubits.len() > 2 {
            return Err(RouteError::UnsupportedGate {
                gate: inst.name().to_string(),
            });
        }
        if let Some((a, b)) = coupled_pair(inst) {
            let (pa, pb) = (initial.phys(a), initial.phys(b));
            if coupling.distance(pa, pb).is_none() {
                return Err(RouteError::NoPath {
                    qubit1: pa,
                    qubit2: pb,
                });
            }
        }
    }

    let router = Router {
        coupling,
        insts,
        method,
        params,
        rng,
        dag: Dag::new(insts, n as usize, num_clbits as usize),
        layout: initial,
        out: Vec::with_capacity(insts.len()),
        swaps: 0,
        since_progress: 0,
        decay: vec![1.0; n as usize],
        swaps_since_reset: 0,
    };
    router.run()
}

/// Insert SWAPs so that every two-qubit gate of an embedded circuit acts on a
/// coupler. The circuit's qubit `i` starts on physical qubit `i`.
#[instrument(skip(circuit, coupling, params), fields(qubits = circuit.num_qubits()))]
pub fn route(
    circuit: &Circuit,
    coupling: &CouplingMap,
    method: RoutingMethod,
    params: &SolverParams,
) -> RouteResult<RoutedCircuit> {
    let n = coupling.num_qubits();
    if circuit.num_qubits() > n {
        return Err(RouteError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available: n,
        });
    }
    let mut rng = seeded_rng(params.seed);
    let output = run_router(
        circuit.instructions(),
        circuit.num_clbits(),
        coupling,
        WireLayout::trivial(n),
        method,
        params,
        &mut rng,
    )?;
    debug!("Routing inserted {} SWAPs", output.swaps);
    let routed = Circuit::from_instructions(circuit.name(), n, circuit.num_clbits(), output.ops)?;
    Ok(RoutedCircuit {
        circuit: routed,
        swaps: output.swaps,
        final_layout: output.layout.into_wire_to_phys(),
    })
}
