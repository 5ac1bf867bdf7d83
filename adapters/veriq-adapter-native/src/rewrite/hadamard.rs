//! Hadamard gate reduction.
//!
//! `H P H` becomes `P† H P†` and `H P† H` becomes `P H P`, where `P` is the
//! S phase gate in any of its encodings. Each application removes one H.

use std::f64::consts::FRAC_PI_2;

use veriq_ir::{StandardGate, angles_close};

use super::Slots;
use crate::program::Op;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    S,
    Sdg,
}

fn phase_of(gate: &StandardGate) -> Option<Phase> {
    let close = |t: f64, target: f64| angles_close(t, target, 1e-9);
    match *gate {
        StandardGate::S => Some(Phase::S),
        StandardGate::Sdg => Some(Phase::Sdg),
        StandardGate::RzQ(q) => match (q.num(), q.den()) {
            (1, 2) => Some(Phase::S),
            (3, 2) => Some(Phase::Sdg),
            _ => None,
        },
        StandardGate::Rz(t) | StandardGate::U1(t) if close(t, FRAC_PI_2) => Some(Phase::S),
        StandardGate::Rz(t) | StandardGate::U1(t) if close(t, -FRAC_PI_2) => Some(Phase::Sdg),
        _ => None,
    }
}

pub(super) fn hadamard_reduction(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut slots = Slots::new(n);
    for op in ops {
        if op.gate != StandardGate::H {
            slots.push(op);
            continue;
        }
        let q = op.qubits[0];
        let middle = slots.top(q, 0);
        let outer = slots.top(q, 1);
        let phase = middle
            .and_then(|i| slots.get(i))
            .filter(|p| p.is_single())
            .and_then(|p| phase_of(&p.gate));
        let outer_is_h = outer
            .and_then(|i| slots.get(i))
            .is_some_and(|p| p.is_single() && p.gate == StandardGate::H);

        match (middle, outer, phase) {
            (Some(mid), Some(out), Some(phase)) if outer_is_h => {
                let flipped = match phase {
                    Phase::S => StandardGate::Sdg,
                    Phase::Sdg => StandardGate::S,
                };
                if let Some(first) = slots.get_mut(out) {
                    first.gate = flipped;
                }
                if let Some(second) = slots.get_mut(mid) {
                    second.gate = StandardGate::H;
                }
                slots.push(Op::one(flipped, q));
            }
            _ => {
                slots.push(op);
            }
        }
    }
    slots.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriq_ir::Rational;

    #[test]
    fn test_hsh_becomes_sdg_h_sdg() {
        let ops = vec![
            Op::one(StandardGate::H, 0),
            Op::one(StandardGate::S, 0),
            Op::one(StandardGate::H, 0),
        ];
        assert_eq!(
            hadamard_reduction(ops, 1),
            vec![
                Op::one(StandardGate::Sdg, 0),
                Op::one(StandardGate::H, 0),
                Op::one(StandardGate::Sdg, 0),
            ]
        );
    }

    #[test]
    fn test_rzq_phase_recognized() {
        let ops = vec![
            Op::one(StandardGate::H, 0),
            Op::one(StandardGate::RzQ(Rational::new(3, 2).unwrap()), 0),
            Op::one(StandardGate::H, 0),
        ];
        let out = hadamard_reduction(ops, 1);
        assert_eq!(out[0].gate, StandardGate::S);
        assert_eq!(out.iter().filter(|o| o.gate == StandardGate::H).count(), 1);
    }

    #[test]
    fn test_other_wire_between_is_fine() {
        let ops = vec![
            Op::one(StandardGate::H, 0),
            Op::one(StandardGate::X, 1),
            Op::one(StandardGate::S, 0),
            Op::one(StandardGate::H, 0),
        ];
        let out = hadamard_reduction(ops, 2);
        assert_eq!(out.iter().filter(|o| o.gate == StandardGate::H).count(), 1);
    }

    #[test]
    fn test_t_is_not_a_phase() {
        let ops = vec![
            Op::one(StandardGate::H, 0),
            Op::one(StandardGate::T, 0),
            Op::one(StandardGate::H, 0),
        ];
        assert_eq!(hadamard_reduction(ops.clone(), 1), ops);
    }
}
