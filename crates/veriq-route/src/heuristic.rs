//! Heuristic placements, used when the exact search gives up.

use petgraph::graph::NodeIndex;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};
use veriq_ir::{Circuit, Instruction};

use crate::coupling::CouplingMap;
use crate::device::DeviceProperties;
use crate::error::{RouteError, RouteResult};
use crate::exact::interaction_graph;
use crate::layout::Placement;
use crate::methods::{LayoutMethod, RoutingMethod, SolverParams};
use crate::route::{WireLayout, run_router, seeded_rng};

/// Run one heuristic placement.
///
/// `device` feeds `noise_adaptive`; without it every qubit and coupler is
/// treated as equally reliable.
#[instrument(skip(circuit, coupling, params, device))]
pub fn heuristic_layout(
    circuit: &Circuit,
    coupling: &CouplingMap,
    method: LayoutMethod,
    params: &SolverParams,
    device: Option<&DeviceProperties>,
) -> RouteResult<Placement> {
    let available = coupling.num_qubits();
    if circuit.num_qubits() > available {
        return Err(RouteError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available,
        });
    }
    let placement = match method {
        LayoutMethod::Trivial => Placement::trivial(circuit.num_qubits(), available)?,
        LayoutMethod::Dense => dense_layout(circuit, coupling)?,
        LayoutMethod::NoiseAdaptive => {
            let uniform = DeviceProperties::default();
            noise_adaptive_layout(circuit, coupling, device.unwrap_or(&uniform))?
        }
        LayoutMethod::Sabre => sabre_layout(circuit, coupling, params)?,
    };
    debug!("{} placement: {:?}", method, placement.as_slice());
    Ok(placement)
}

/// Total interaction weight of each virtual qubit.
fn interaction_weights(circuit: &Circuit) -> Vec<u32> {
    let graph = interaction_graph(circuit);
    (0..graph.node_count())
        .map(|v| {
            graph
                .edges(NodeIndex::new(v))
                .map(|e| *e.weight())
                .sum()
        })
        .collect()
}

/// Breadth-first region of `size` qubits grown from `start`.
fn region(coupling: &CouplingMap, start: u32, size: usize) -> Vec<u32> {
    let mut region = vec![start];
    let mut head = 0;
    while region.len() < size && head < region.len() {
        let mut next: Vec<u32> = coupling
            .neighbors(region[head])
            .filter(|q| !region.contains(q))
            .collect();
        next.sort_unstable();
        for q in next {
            if region.len() < size {
                region.push(q);
            }
        }
        head += 1;
    }
    region
}

fn dense_layout(circuit: &Circuit, coupling: &CouplingMap) -> RouteResult<Placement> {
    let n = circuit.num_qubits() as usize;
    let available = coupling.num_qubits();
    if n == 0 {
        return Placement::new(vec![], available);
    }

    let inner_edges = |r: &[u32]| {
        coupling
            .edges()
            .iter()
            .filter(|(a, b)| r.contains(a) && r.contains(b))
            .count()
    };
    let mut best: Option<(usize, Vec<u32>)> = None;
    for start in 0..available {
        let r = region(coupling, start, n);
        if r.len() < n {
            continue;
        }
        let score = inner_edges(&r);
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, r));
        }
    }
    let Some((_, mut physical)) = best else {
        // No connected region is large enough; fall back to the first qubits.
        return Placement::trivial(circuit.num_qubits(), available);
    };

    let degree_in = |q: u32| coupling.neighbors(q).filter(|p| physical.contains(p)).count();
    let mut ranked: Vec<(usize, u32)> = physical.iter().map(|&q| (degree_in(q), q)).collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    physical = ranked.into_iter().map(|(_, q)| q).collect();

    let weights = interaction_weights(circuit);
    let mut virtuals: Vec<usize> = (0..n).collect();
    virtuals.sort_by(|&a, &b| weights[b].cmp(&weights[a]).then(a.cmp(&b)));

    let mut mapping = vec![0; n];
    for (v, p) in virtuals.into_iter().zip(physical) {
        mapping[v] = p;
    }
    Placement::new(mapping, available)
}

fn place(v: usize, p: u32, assigned: &mut [Option<u32>], used: &mut [bool]) {
    assigned[v] = Some(p);
    used[p as usize] = true;
}

fn noise_adaptive_layout(
    circuit: &Circuit,
    coupling: &CouplingMap,
    device: &DeviceProperties,
) -> RouteResult<Placement> {
    let n = circuit.num_qubits() as usize;
    let available = coupling.num_qubits();
    let graph = interaction_graph(circuit);

    let mut pairs: Vec<(u32, usize, usize)> = graph
        .edge_indices()
        .filter_map(|e| {
            let (a, b) = graph.edge_endpoints(e)?;
            let (a, b) = (a.index().min(b.index()), a.index().max(b.index()));
            Some((graph[e], a, b))
        })
        .collect();
    pairs.sort_by(|x, y| y.0.cmp(&x.0).then((x.1, x.2).cmp(&(y.1, y.2))));

    let mut assigned: Vec<Option<u32>> = vec![None; n];
    let mut used = vec![false; available as usize];

    for (_, a, b) in pairs {
        match (assigned[a], assigned[b]) {
            (None, None) => {
                let coupler = coupling
                    .edges()
                    .iter()
                    .copied()
                    .filter(|&(p, q)| !used[p as usize] && !used[q as usize])
                    .min_by(|&(p, q), &(r, s)| {
                        device
                            .edge(p, q)
                            .total_cmp(&device.edge(r, s))
                            .then((p, q).cmp(&(r, s)))
                    });
                if let Some((p, q)) = coupler {
                    place(a, p, &mut assigned, &mut used);
                    place(b, q, &mut assigned, &mut used);
                }
            }
            (Some(anchor), None) | (None, Some(anchor)) => {
                let free = if assigned[a].is_none() { a } else { b };
                let best = (0..available)
                    .filter(|&p| !used[p as usize])
                    .min_by(|&p, &q| {
                        let cost = |x: u32| {
                            let hops = coupling.distance(anchor, x).unwrap_or(u32::MAX);
                            (hops, device.edge(anchor, x) + device.qubit_cost(x))
                        };
                        let (hp, cp) = cost(p);
                        let (hq, cq) = cost(q);
                        hp.cmp(&hq).then(cp.total_cmp(&cq)).then(p.cmp(&q))
                    });
                if let Some(p) = best {
                    place(free, p, &mut assigned, &mut used);
                }
            }
            (Some(_), Some(_)) => {}
        }
    }

    let mut mapping = Vec::with_capacity(n);
    let mut spare: Vec<u32> = (0..available).collect();
    spare.sort_by(|&p, &q| {
        device
            .qubit_cost(p)
            .total_cmp(&device.qubit_cost(q))
            .then(p.cmp(&q))
    });
    let mut spare = spare.into_iter();
    for slot in assigned {
        let p = match slot {
            Some(p) => p,
            None => loop {
                match spare.next() {
                    Some(p) if !used[p as usize] => {
                        used[p as usize] = true;
                        break p;
                    }
                    Some(_) => {}
                    None => {
                        return Err(RouteError::CircuitTooLarge {
                            required: circuit.num_qubits(),
                            available,
                        });
                    }
                }
            },
        };
        mapping.push(p);
    }
    Placement::new(mapping, available)
}

fn sabre_layout(
    circuit: &Circuit,
    coupling: &CouplingMap,
    params: &SolverParams,
) -> RouteResult<Placement> {
    let available = coupling.num_qubits();
    let mut rng = seeded_rng(params.seed);
    let mut wires: Vec<u32> = (0..available).collect();
    wires.shuffle(&mut rng);

    let forward = circuit.instructions();
    let reverse: Vec<Instruction> = forward.iter().rev().cloned().collect();
    for _ in 0..params.sabre_layout_iterations {
        for pass in [forward, reverse.as_slice()] {
            let output = run_router(
                pass,
                circuit.num_clbits(),
                coupling,
                WireLayout::from_wire_to_phys(wires),
                RoutingMethod::Sabre,
                params,
                &mut rng,
            )?;
            wires = output.layout.into_wire_to_phys();
        }
    }
    wires.truncate(circuit.num_qubits() as usize);
    Placement::new(wires, available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriq_ir::QubitId;

    fn star_circuit() -> Circuit {
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cx(QubitId(2), QubitId(0)).unwrap();
        circuit.cx(QubitId(2), QubitId(1)).unwrap();
        circuit.cx(QubitId(2), QubitId(0)).unwrap();
        circuit
    }

    fn run(method: LayoutMethod, coupling: &CouplingMap) -> Placement {
        let params = SolverParams::default().with_seed(3);
        heuristic_layout(&star_circuit(), coupling, method, &params, None).unwrap()
    }

    #[test]
    fn test_trivial() {
        assert_eq!(run(LayoutMethod::Trivial, &CouplingMap::linear(4)).as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_dense_puts_busiest_qubit_in_the_middle() {
        let placement = run(LayoutMethod::Dense, &CouplingMap::linear(5));
        assert_eq!(placement.as_slice(), &[0, 2, 1]);
    }

    #[test]
    fn test_noise_adaptive_prefers_good_couplers() {
        let coupling = CouplingMap::linear(4);
        let device = DeviceProperties::new()
            .with_edge_error(0, 1, 0.2)
            .with_edge_error(1, 2, 0.2)
            .with_edge_error(2, 3, 0.01);
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let placement = heuristic_layout(
            &circuit,
            &coupling,
            LayoutMethod::NoiseAdaptive,
            &SolverParams::default(),
            Some(&device),
        )
        .unwrap();
        assert_eq!(placement.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_noise_adaptive_without_properties_is_valid() {
        let placement = run(LayoutMethod::NoiseAdaptive, &CouplingMap::linear(5));
        assert_eq!(placement.num_virtual(), 3);
        let hub = placement.physical(2).unwrap();
        let coupling = CouplingMap::linear(5);
        assert!(coupling.is_connected(hub, placement.physical(0).unwrap()));
    }

    #[test]
    fn test_sabre_is_seeded() {
        let coupling = CouplingMap::ring(6);
        let first = run(LayoutMethod::Sabre, &coupling);
        let second = run(LayoutMethod::Sabre, &coupling);
        assert_eq!(first, second);
        assert_eq!(first.num_virtual(), 3);
    }

    #[test]
    fn test_too_large() {
        let err = heuristic_layout(
            &Circuit::with_size("c", 4, 0),
            &CouplingMap::linear(3),
            LayoutMethod::Dense,
            &SolverParams::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::CircuitTooLarge { .. }));
    }
}
