//! Gate cancellation and X propagation.

use veriq_ir::{StandardGate, angles_close};

use super::Slots;
use crate::program::Op;

const ANGLE_TOLERANCE: f64 = 1e-9;

/// Single-qubit gates equal to the identity up to global phase.
fn is_trivial(gate: &StandardGate) -> bool {
    match *gate {
        StandardGate::I => true,
        StandardGate::RzQ(q) => q.is_zero(),
        StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) | StandardGate::U1(t) => {
            angles_close(t, 0.0, ANGLE_TOLERANCE)
        }
        _ => false,
    }
}

fn cancels(first: &StandardGate, second: &StandardGate) -> bool {
    first
        .inverse()
        .is_some_and(|inv| inv.approx_eq(second, ANGLE_TOLERANCE))
}

/// Drop identities and adjacent inverse pairs on each wire.
pub(super) fn cancel_single_qubit(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut slots = Slots::new(n);
    for op in ops {
        if !op.is_single() {
            slots.push(op);
            continue;
        }
        if is_trivial(&op.gate) {
            continue;
        }
        let q = op.qubits[0];
        let prev = slots
            .top(q, 0)
            .filter(|&i| slots.get(i).is_some_and(|p| p.is_single() && cancels(&p.gate, &op.gate)));
        match prev {
            Some(i) => slots.pop(i),
            None => {
                slots.push(op);
            }
        }
    }
    slots.finish()
}

/// Whether two self-inverse multi-qubit gates act identically.
fn same_action(a: &Op, b: &Op) -> bool {
    let as_set = |q: &[u32]| {
        let mut v = q.to_vec();
        v.sort_unstable();
        v
    };
    match (a.gate, b.gate) {
        (StandardGate::CX, StandardGate::CX) => a.qubits == b.qubits,
        (StandardGate::CZ, StandardGate::CZ)
        | (StandardGate::Swap, StandardGate::Swap)
        | (StandardGate::CCZ, StandardGate::CCZ) => as_set(&a.qubits) == as_set(&b.qubits),
        (StandardGate::CCX, StandardGate::CCX) => {
            a.qubits[2] == b.qubits[2] && as_set(&a.qubits[..2]) == as_set(&b.qubits[..2])
        }
        _ => false,
    }
}

/// Cancel adjacent identical multi-qubit gates. With `cx_only`, only CX
/// pairs are considered.
pub(super) fn cancel_two_qubit(ops: Vec<Op>, n: u32, cx_only: bool) -> Vec<Op> {
    let mut slots = Slots::new(n);
    for op in ops {
        let eligible = !op.is_single() && (!cx_only || op.gate == StandardGate::CX);
        let prev = if eligible {
            slots
                .top_shared(&op.qubits)
                .filter(|&i| slots.get(i).is_some_and(|p| same_action(p, &op)))
        } else {
            None
        };
        match prev {
            Some(i) => slots.pop(i),
            None => {
                slots.push(op);
            }
        }
    }
    slots.finish()
}

fn flush(q: u32, pending: &mut [bool], out: &mut Vec<Op>) {
    if std::mem::take(&mut pending[q as usize]) {
        out.push(Op::one(StandardGate::X, q));
    }
}

/// Push X gates forward through CX and CCX targets, cancelling pairs.
pub(super) fn not_propagation(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut pending = vec![false; n as usize];
    let mut out = Vec::with_capacity(ops.len());
    for op in ops {
        match op.gate {
            StandardGate::X => {
                let q = op.qubits[0] as usize;
                pending[q] = !pending[q];
            }
            // X on the target commutes; X on a control does not.
            StandardGate::CX | StandardGate::CCX => {
                let controls = &op.qubits[..op.qubits.len() - 1];
                for &c in controls {
                    flush(c, &mut pending, &mut out);
                }
                out.push(op);
            }
            _ => {
                for &q in &op.qubits {
                    flush(q, &mut pending, &mut out);
                }
                out.push(op);
            }
        }
    }
    for q in 0..n {
        flush(q, &mut pending, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_x_moves_past_cx_target() {
        let ops = vec![Op::one(StandardGate::X, 1), Op::cx(0, 1)];
        assert_eq!(
            not_propagation(ops, 2),
            vec![Op::cx(0, 1), Op::one(StandardGate::X, 1)]
        );
    }

    #[test]
    fn test_x_pairs_cancel_through_target() {
        let ops = vec![
            Op::one(StandardGate::X, 1),
            Op::cx(0, 1),
            Op::one(StandardGate::X, 1),
        ];
        assert_eq!(not_propagation(ops, 2), vec![Op::cx(0, 1)]);
    }

    #[test]
    fn test_x_stops_at_control() {
        let ops = vec![Op::one(StandardGate::X, 0), Op::cx(0, 1)];
        assert_eq!(not_propagation(ops.clone(), 2), ops);
    }

    #[test]
    fn test_cancel_inverse_pair_keeps_rotation() {
        let ops = vec![
            Op::one(StandardGate::Rz(PI / 2.0), 0),
            Op::one(StandardGate::H, 0),
            Op::one(StandardGate::H, 0),
        ];
        assert_eq!(
            cancel_single_qubit(ops, 1),
            vec![Op::one(StandardGate::Rz(PI / 2.0), 0)]
        );
    }

    #[test]
    fn test_cancel_nested_pairs() {
        let ops = vec![
            Op::one(StandardGate::S, 0),
            Op::one(StandardGate::T, 0),
            Op::one(StandardGate::Tdg, 0),
            Op::one(StandardGate::Sdg, 0),
            Op::one(StandardGate::I, 0),
        ];
        assert!(cancel_single_qubit(ops, 1).is_empty());
    }

    #[test]
    fn test_cx_blocks_single_cancellation() {
        let ops = vec![
            Op::one(StandardGate::H, 0),
            Op::cx(0, 1),
            Op::one(StandardGate::H, 0),
        ];
        assert_eq!(cancel_single_qubit(ops.clone(), 2), ops);
    }

    #[test]
    fn test_two_qubit_cancellation() {
        let ops = vec![
            Op::new(StandardGate::CZ, vec![0, 1]),
            Op::new(StandardGate::CZ, vec![1, 0]),
            Op::cx(0, 1),
            Op::cx(1, 0),
        ];
        assert_eq!(
            cancel_two_qubit(ops, 2, false),
            vec![Op::cx(0, 1), Op::cx(1, 0)]
        );
    }

    #[test]
    fn test_cx_only_ignores_cz() {
        let ops = vec![
            Op::new(StandardGate::CZ, vec![0, 1]),
            Op::new(StandardGate::CZ, vec![0, 1]),
        ];
        assert_eq!(cancel_two_qubit(ops.clone(), 2, true), ops);
    }
}
