//! Mapping checks and greedy routing.
//!
//! Layouts are flat lists with `layout[physical] = logical`.

use std::collections::VecDeque;

use veriq_engine::{EngineError, EngineResult};
use veriq_ir::StandardGate;

use crate::arena::Graph;
use crate::program::{Op, Program};

const ANGLE_TOLERANCE: f64 = 1e-9;

/// Every two-qubit gate acts on a graph edge. Larger gates never do.
pub(crate) fn satisfies_constraints(program: &Program, graph: &Graph) -> bool {
    program.ops.iter().all(|op| match op.qubits.as_slice() {
        [_] => true,
        &[a, b] => graph.adjacent(a, b),
        _ => false,
    })
}

/// Rewrite a physical circuit into the logical frame of `layout`, treating
/// SWAPs as relabelings.
fn logical_ops(program: &Program, layout: &[u32]) -> EngineResult<Vec<Op>> {
    let mut frame = layout.to_vec();
    let mut out = Vec::with_capacity(program.ops.len());
    for op in &program.ops {
        if let Some(&q) = op.qubits.iter().find(|&&q| q as usize >= frame.len()) {
            return Err(EngineError::SizeMismatch(format!(
                "qubit {q} outside layout of size {}",
                frame.len()
            )));
        }
        if let (StandardGate::Swap, &[a, b]) = (op.gate, op.qubits.as_slice()) {
            frame.swap(a as usize, b as usize);
            continue;
        }
        out.push(Op::new(
            op.gate,
            op.qubits.iter().map(|&q| frame[q as usize]).collect::<Vec<_>>(),
        ));
    }
    Ok(out)
}

fn same_gate(a: &Op, b: &Op) -> bool {
    if !a.gate.approx_eq(&b.gate, ANGLE_TOLERANCE) {
        return false;
    }
    match a.gate {
        StandardGate::CZ | StandardGate::CCZ => {
            let mut x = a.qubits.clone();
            let mut y = b.qubits.clone();
            x.sort_unstable();
            y.sort_unstable();
            x == y
        }
        _ => a.qubits == b.qubits,
    }
}

/// Whether `c1` under `l1` and `c2` under `l2` apply the same gates in a
/// dependency-respecting order once SWAPs are folded into the layouts.
pub(crate) fn swap_equivalent(
    c1: &Program,
    l1: &[u32],
    c2: &Program,
    l2: &[u32],
) -> EngineResult<bool> {
    let first = logical_ops(c1, l1)?;
    let second = logical_ops(c2, l2)?;
    if first.len() != second.len() {
        return Ok(false);
    }

    let width = l1.len().max(l2.len());
    let mut wires: Vec<VecDeque<usize>> = vec![VecDeque::new(); width];
    for (i, op) in first.iter().enumerate() {
        for &q in &op.qubits {
            wires[q as usize].push_back(i);
        }
    }

    for op in &second {
        let Some(&candidate) = wires[op.qubits[0] as usize].front() else {
            return Ok(false);
        };
        let ready = op
            .qubits
            .iter()
            .all(|&q| wires[q as usize].front() == Some(&candidate));
        let matched = &first[candidate];
        if !ready || matched.qubits.len() != op.qubits.len() || !same_gate(matched, op) {
            return Ok(false);
        }
        for &q in &matched.qubits {
            wires[q as usize].pop_front();
        }
    }
    Ok(wires.iter().all(VecDeque::is_empty))
}

/// Route `program` on `graph` from `layout`, inserting SWAPs along shortest
/// paths. Returns the physical circuit and the final layout.
pub(crate) fn simple_map(
    program: Program,
    mut layout: Vec<u32>,
    graph: &Graph,
) -> EngineResult<(Program, Vec<u32>)> {
    let size = graph.num_qubits as usize;
    if layout.len() != size {
        return Err(EngineError::SizeMismatch(format!(
            "layout of size {} for a {size}-qubit graph",
            layout.len()
        )));
    }
    if !program.well_typed(graph.num_qubits) {
        return Err(EngineError::SizeMismatch(format!(
            "circuit does not fit on {size} qubits"
        )));
    }
    let mut phys = vec![0u32; size];
    for (p, &l) in layout.iter().enumerate() {
        phys[l as usize] = p as u32;
    }

    let mut ops = Vec::with_capacity(program.ops.len());
    for op in program.ops {
        match *op.qubits.as_slice() {
            [l] => ops.push(Op::one(op.gate, phys[l as usize])),
            [la, lb] => {
                loop {
                    let (pa, pb) = (phys[la as usize], phys[lb as usize]);
                    if graph.adjacent(pa, pb) {
                        break;
                    }
                    let path = graph.shortest_path(pa, pb).ok_or_else(|| {
                        EngineError::InvalidGraph(format!("no path between {pa} and {pb}"))
                    })?;
                    let next = path[1];
                    ops.push(Op::new(StandardGate::Swap, vec![pa, next]));
                    layout.swap(pa as usize, next as usize);
                    phys[layout[pa as usize] as usize] = pa;
                    phys[layout[next as usize] as usize] = next;
                }
                ops.push(Op::new(op.gate, vec![phys[la as usize], phys[lb as usize]]));
            }
            _ => return Err(EngineError::UnsupportedGate(op.gate.name().to_string())),
        }
    }
    Ok((
        Program {
            num_qubits: graph.num_qubits,
            ops,
        },
        layout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(n: u32, ops: Vec<Op>) -> Program {
        Program { num_qubits: n, ops }
    }

    fn line(n: u32) -> Graph {
        let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        Graph::new(n, &edges).unwrap()
    }

    #[test]
    fn test_routed_circuit_is_swap_equivalent() {
        let logical = program(3, vec![Op::one(StandardGate::H, 0), Op::cx(0, 2), Op::cx(1, 2)]);
        let trivial = vec![0, 1, 2];
        let (mapped, _final) = simple_map(logical.clone(), trivial.clone(), &line(3)).unwrap();
        assert!(satisfies_constraints(&mapped, &line(3)));
        assert_eq!(
            mapped.ops.iter().filter(|o| o.gate == StandardGate::Swap).count(),
            2
        );
        assert!(swap_equivalent(&logical, &trivial, &mapped, &trivial).unwrap());
    }

    #[test]
    fn test_wrong_layout_is_not_equivalent() {
        let logical = program(2, vec![Op::cx(0, 1)]);
        let physical = program(2, vec![Op::cx(0, 1)]);
        assert!(swap_equivalent(&logical, &[0, 1], &physical, &[0, 1]).unwrap());
        assert!(!swap_equivalent(&logical, &[0, 1], &physical, &[1, 0]).unwrap());
    }

    #[test]
    fn test_independent_gates_may_reorder() {
        let a = program(2, vec![Op::one(StandardGate::H, 0), Op::one(StandardGate::X, 1)]);
        let b = program(2, vec![Op::one(StandardGate::X, 1), Op::one(StandardGate::H, 0)]);
        assert!(swap_equivalent(&a, &[0, 1], &b, &[0, 1]).unwrap());
    }

    #[test]
    fn test_dependent_gates_may_not_reorder() {
        let a = program(2, vec![Op::one(StandardGate::H, 0), Op::cx(0, 1)]);
        let b = program(2, vec![Op::cx(0, 1), Op::one(StandardGate::H, 0)]);
        assert!(!swap_equivalent(&a, &[0, 1], &b, &[0, 1]).unwrap());
    }

    #[test]
    fn test_ancilla_gate_breaks_equivalence() {
        let a = program(2, vec![Op::cx(0, 1)]);
        let b = program(3, vec![Op::cx(0, 2)]);
        assert!(!swap_equivalent(&a, &[0, 1], &b, &[0, 1, 2]).unwrap());
    }

    #[test]
    fn test_three_qubit_gate_cannot_route() {
        let p = program(3, vec![Op::new(StandardGate::CCX, vec![0, 1, 2])]);
        assert!(matches!(
            simple_map(p, vec![0, 1, 2], &line(3)),
            Err(EngineError::UnsupportedGate(_))
        ));
    }

    #[test]
    fn test_constraints() {
        let g = line(3);
        assert!(satisfies_constraints(&program(3, vec![Op::cx(2, 1)]), &g));
        assert!(!satisfies_constraints(&program(3, vec![Op::cx(0, 2)]), &g));
    }
}
