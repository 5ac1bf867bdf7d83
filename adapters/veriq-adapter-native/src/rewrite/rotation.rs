//! Z-rotation encoding and merging.

use veriq_ir::{Rational, StandardGate, angles_close};

use crate::program::Op;

const ANGLE_TOLERANCE: f64 = 1e-9;

fn exact(num: i64, den: i64) -> Rational {
    Rational::new(num, den).unwrap_or_default()
}

/// Rotate `rz`, `u1` and the fixed Z-phase gates into `rzq` where the angle
/// is exact.
pub(super) fn convert_to_rzq(ops: Vec<Op>) -> Vec<Op> {
    ops.into_iter()
        .map(|op| {
            let q = match op.gate {
                StandardGate::Z => Some(exact(1, 1)),
                StandardGate::S => Some(exact(1, 2)),
                StandardGate::Sdg => Some(exact(3, 2)),
                StandardGate::T => Some(exact(1, 4)),
                StandardGate::Tdg => Some(exact(7, 4)),
                StandardGate::Rz(t) | StandardGate::U1(t) => Rational::from_radians(t),
                _ => None,
            };
            match q {
                Some(q) => Op::new(StandardGate::RzQ(q), op.qubits),
                None => op,
            }
        })
        .collect()
}

/// Replace every `rzq` with a standard gate. Zero rotations disappear.
pub(super) fn replace_rzq(ops: Vec<Op>) -> Vec<Op> {
    ops.into_iter()
        .filter_map(|op| {
            let StandardGate::RzQ(q) = op.gate else {
                return Some(op);
            };
            let gate = match (q.num(), q.den()) {
                (0, _) => return None,
                (1, 4) => StandardGate::T,
                (1, 2) => StandardGate::S,
                (1, 1) => StandardGate::Z,
                (3, 2) => StandardGate::Sdg,
                (7, 4) => StandardGate::Tdg,
                _ => StandardGate::Rz(q.radians()),
            };
            Some(Op::new(gate, op.qubits))
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum ZAngle {
    Exact(Rational),
    Rz(f64),
    U1(f64),
}

impl ZAngle {
    fn of(gate: &StandardGate) -> Option<Self> {
        Some(match *gate {
            StandardGate::Z => ZAngle::Exact(exact(1, 1)),
            StandardGate::S => ZAngle::Exact(exact(1, 2)),
            StandardGate::Sdg => ZAngle::Exact(exact(3, 2)),
            StandardGate::T => ZAngle::Exact(exact(1, 4)),
            StandardGate::Tdg => ZAngle::Exact(exact(7, 4)),
            StandardGate::RzQ(q) => ZAngle::Exact(q),
            StandardGate::Rz(t) => ZAngle::Rz(t),
            StandardGate::U1(t) => ZAngle::U1(t),
            _ => return None,
        })
    }

    fn radians(self) -> f64 {
        match self {
            ZAngle::Exact(q) => q.radians(),
            ZAngle::Rz(t) | ZAngle::U1(t) => t,
        }
    }

    fn combine(self, other: ZAngle) -> ZAngle {
        match (self, other) {
            (ZAngle::Exact(a), ZAngle::Exact(b)) => ZAngle::Exact(a + b),
            (ZAngle::U1(a), ZAngle::U1(b)) => ZAngle::U1(a + b),
            (a, b) => ZAngle::Rz(a.radians() + b.radians()),
        }
    }

    /// The merged gate, or `None` for a zero rotation.
    fn into_gate(self) -> Option<StandardGate> {
        match self {
            ZAngle::Exact(q) if q.is_zero() => None,
            ZAngle::Exact(q) => Some(StandardGate::RzQ(q)),
            ZAngle::Rz(t) | ZAngle::U1(t) if angles_close(t, 0.0, ANGLE_TOLERANCE) => None,
            ZAngle::Rz(t) => Some(StandardGate::Rz(t)),
            ZAngle::U1(t) => Some(StandardGate::U1(t)),
        }
    }
}

/// Wires of `op` along which a Z rotation commutes through it.
fn z_transparent(op: &Op, q: u32) -> bool {
    match op.gate {
        StandardGate::CZ | StandardGate::CCZ => true,
        StandardGate::CX => op.qubits[0] == q,
        StandardGate::CCX => op.qubits[..2].contains(&q),
        _ => false,
    }
}

/// Merge Z rotations on the same wire, commuting them through CX/CCX
/// controls and CZ/CCZ.
pub(super) fn merge_rotations(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut out: Vec<Option<Op>> = Vec::with_capacity(ops.len());
    let mut open: Vec<Option<(usize, ZAngle)>> = vec![None; n as usize];

    for op in ops {
        let angle = if op.is_single() { ZAngle::of(&op.gate) } else { None };
        if let Some(angle) = angle {
            let q = op.qubits[0] as usize;
            if let Some((idx, acc)) = open[q] {
                let merged = acc.combine(angle);
                match merged.into_gate() {
                    Some(gate) => {
                        out[idx] = Some(Op::one(gate, op.qubits[0]));
                        open[q] = Some((idx, merged));
                    }
                    None => {
                        out[idx] = None;
                        open[q] = None;
                    }
                }
            } else {
                open[q] = Some((out.len(), angle));
                out.push(Some(op));
            }
            continue;
        }
        for &q in &op.qubits {
            if !z_transparent(&op, q) {
                open[q as usize] = None;
            }
        }
        out.push(Some(op));
    }
    out.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn rzq(num: i64, den: i64, q: u32) -> Op {
        Op::one(StandardGate::RzQ(exact(num, den)), q)
    }

    #[test]
    fn test_convert_and_replace() {
        let ops = vec![
            Op::one(StandardGate::Rz(PI / 4.0), 0),
            Op::one(StandardGate::Rz(0.123), 0),
            Op::one(StandardGate::Sdg, 0),
        ];
        let converted = convert_to_rzq(ops);
        assert_eq!(converted[0], rzq(1, 4, 0));
        assert_eq!(converted[1], Op::one(StandardGate::Rz(0.123), 0));
        assert_eq!(converted[2], rzq(3, 2, 0));

        let replaced = replace_rzq(converted);
        assert_eq!(replaced[0].gate, StandardGate::T);
        assert_eq!(replaced[2].gate, StandardGate::Sdg);
    }

    #[test]
    fn test_replace_rzq_general_angle() {
        let out = replace_rzq(vec![rzq(3, 8, 0), rzq(0, 1, 0)]);
        assert_eq!(out.len(), 1);
        assert!(out[0].gate.approx_eq(&StandardGate::Rz(3.0 * PI / 8.0), 1e-12));
    }

    #[test]
    fn test_replace_rzq_leaves_plain_rz() {
        let ops = vec![Op::one(StandardGate::Rz(PI / 2.0), 0)];
        assert_eq!(replace_rzq(ops.clone()), ops);
    }

    #[test]
    fn test_merge_through_cx_control() {
        let ops = vec![
            Op::one(StandardGate::T, 0),
            Op::cx(0, 1),
            Op::one(StandardGate::T, 0),
        ];
        assert_eq!(merge_rotations(ops, 2), vec![rzq(1, 2, 0), Op::cx(0, 1)]);
    }

    #[test]
    fn test_no_merge_through_cx_target() {
        let ops = vec![
            Op::one(StandardGate::T, 1),
            Op::cx(0, 1),
            Op::one(StandardGate::T, 1),
        ];
        assert_eq!(merge_rotations(ops.clone(), 2), ops);
    }

    #[test]
    fn test_merge_to_zero_drops() {
        let ops = vec![
            Op::one(StandardGate::S, 0),
            Op::new(StandardGate::CZ, vec![0, 1]),
            Op::one(StandardGate::Sdg, 0),
        ];
        assert_eq!(
            merge_rotations(ops, 2),
            vec![Op::new(StandardGate::CZ, vec![0, 1])]
        );
    }

    #[test]
    fn test_merge_float_rotations() {
        let ops = vec![
            Op::one(StandardGate::Rz(0.1), 0),
            Op::one(StandardGate::Rz(0.2), 0),
        ];
        let out = merge_rotations(ops, 1);
        assert_eq!(out.len(), 1);
        assert!(out[0].gate.approx_eq(&StandardGate::Rz(0.3), 1e-12));
    }
}
