//! Multi-qubit gate decompositions.

use veriq_ir::StandardGate;

use crate::program::Op;

fn toffoli_core(a: u32, b: u32, c: u32, out: &mut Vec<Op>) {
    use StandardGate::{T, Tdg};
    out.extend([
        Op::cx(b, c),
        Op::one(Tdg, c),
        Op::cx(a, c),
        Op::one(T, c),
        Op::cx(b, c),
        Op::one(Tdg, c),
        Op::cx(a, c),
        Op::one(T, b),
        Op::one(T, c),
    ]);
}

fn toffoli_tail(a: u32, b: u32, out: &mut Vec<Op>) {
    out.extend([
        Op::cx(a, b),
        Op::one(StandardGate::T, a),
        Op::one(StandardGate::Tdg, b),
        Op::cx(a, b),
    ]);
}

/// Lower CCX, CCZ, CZ and SWAP to CX plus single-qubit gates.
pub(super) fn decompose_to_cnot(ops: Vec<Op>) -> Vec<Op> {
    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        match (op.gate, op.qubits.as_slice()) {
            (StandardGate::CCX, &[a, b, c]) => {
                out.push(Op::one(StandardGate::H, c));
                toffoli_core(a, b, c, &mut out);
                out.push(Op::one(StandardGate::H, c));
                toffoli_tail(a, b, &mut out);
            }
            (StandardGate::CCZ, &[a, b, c]) => {
                toffoli_core(a, b, c, &mut out);
                toffoli_tail(a, b, &mut out);
            }
            (StandardGate::CZ, &[a, b]) => out.extend([
                Op::one(StandardGate::H, b),
                Op::cx(a, b),
                Op::one(StandardGate::H, b),
            ]),
            (StandardGate::Swap, &[a, b]) => out.extend([Op::cx(a, b), Op::cx(b, a), Op::cx(a, b)]),
            _ => out.push(op),
        }
    }
    out
}

/// Replace SWAPs with three CX gates, leading with a direction present in
/// the graph when there is one.
pub(crate) fn decompose_swaps(ops: Vec<Op>, has_edge: impl Fn(u32, u32) -> bool) -> Vec<Op> {
    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        match (op.gate, op.qubits.as_slice()) {
            (StandardGate::Swap, &[a, b]) => {
                let (x, y) = if !has_edge(a, b) && has_edge(b, a) { (b, a) } else { (a, b) };
                out.extend([Op::cx(x, y), Op::cx(y, x), Op::cx(x, y)]);
            }
            _ => out.push(op),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccx_gate_count() {
        let out = decompose_to_cnot(vec![Op::new(StandardGate::CCX, vec![0, 1, 2])]);
        assert_eq!(out.len(), 15);
        assert_eq!(out.iter().filter(|o| o.gate == StandardGate::CX).count(), 6);
        assert!(out.iter().all(|o| o.qubits.len() <= 2));
    }

    #[test]
    fn test_ccz_has_no_hadamards() {
        let out = decompose_to_cnot(vec![Op::new(StandardGate::CCZ, vec![0, 1, 2])]);
        assert_eq!(out.len(), 13);
        assert!(out.iter().all(|o| o.gate != StandardGate::H));
    }

    #[test]
    fn test_swap_direction_follows_graph() {
        let out = decompose_swaps(vec![Op::new(StandardGate::Swap, vec![0, 1])], |a, b| {
            (a, b) == (1, 0)
        });
        assert_eq!(out, vec![Op::cx(1, 0), Op::cx(0, 1), Op::cx(1, 0)]);
    }
}
