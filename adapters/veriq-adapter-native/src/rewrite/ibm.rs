//! IBM gate set {u1, u2, u3, cx}.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use veriq_ir::StandardGate;

use super::decompose::decompose_to_cnot;
use crate::program::Op;
use crate::unitary::{Unitary2x2, normalize_angle};

const ANGLE_TOLERANCE: f64 = 1e-9;

fn to_ibm(gate: StandardGate) -> Option<StandardGate> {
    use StandardGate::{U1, U2, U3};
    Some(match gate {
        StandardGate::I => return None,
        StandardGate::X => U3(PI, 0.0, PI),
        StandardGate::Y => U3(PI, FRAC_PI_2, FRAC_PI_2),
        StandardGate::Z => U1(PI),
        StandardGate::H => U2(0.0, PI),
        StandardGate::S => U1(FRAC_PI_2),
        StandardGate::Sdg => U1(-FRAC_PI_2),
        StandardGate::T => U1(FRAC_PI_4),
        StandardGate::Tdg => U1(-FRAC_PI_4),
        StandardGate::Rx(t) => U3(t, -FRAC_PI_2, FRAC_PI_2),
        StandardGate::Ry(t) => U3(t, 0.0, 0.0),
        StandardGate::Rz(t) => U1(t),
        StandardGate::RzQ(q) => U1(q.radians()),
        other => other,
    })
}

/// Rewrite into {u1, u2, u3, cx}.
pub(super) fn convert_to_ibm(ops: Vec<Op>) -> Vec<Op> {
    decompose_to_cnot(ops)
        .into_iter()
        .filter_map(|op| {
            if op.is_single() {
                to_ibm(op.gate).map(|gate| Op::new(gate, op.qubits))
            } else {
                Some(op)
            }
        })
        .collect()
}

/// The cheapest IBM gate equal to `u` up to phase, or `None` for identity.
fn synthesize(u: &Unitary2x2) -> Option<StandardGate> {
    if u.is_identity() {
        return None;
    }
    let (theta, phi, lambda) = u.zyz();
    if theta.abs() < ANGLE_TOLERANCE {
        let l = normalize_angle(phi + lambda);
        return (l.abs() >= ANGLE_TOLERANCE).then_some(StandardGate::U1(l));
    }
    if (theta - FRAC_PI_2).abs() < ANGLE_TOLERANCE {
        return Some(StandardGate::U2(phi, lambda));
    }
    Some(StandardGate::U3(theta, phi, lambda))
}

struct Run {
    slot: usize,
    len: usize,
    first: StandardGate,
    unitary: Unitary2x2,
}

/// Fuse each maximal run of single-qubit gates on a wire into one IBM gate.
pub(super) fn optimize_1q_gates(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut out: Vec<Option<Op>> = Vec::with_capacity(ops.len());
    let mut runs: Vec<Option<Run>> = (0..n).map(|_| None).collect();

    let close = |run: Run, q: u32, out: &mut Vec<Option<Op>>| {
        // A lone gate is kept as written.
        out[run.slot] = if run.len == 1 {
            (!run.unitary.is_identity()).then(|| Op::one(run.first, q))
        } else {
            synthesize(&run.unitary).map(|g| Op::one(g, q))
        };
    };

    for op in ops {
        let unitary = if op.is_single() { Unitary2x2::of(&op.gate) } else { None };
        match unitary {
            Some(u) => {
                let q = op.qubits[0];
                match runs[q as usize].as_mut() {
                    Some(run) => {
                        run.unitary = u.mul(&run.unitary);
                        run.len += 1;
                    }
                    None => {
                        runs[q as usize] = Some(Run {
                            slot: out.len(),
                            len: 1,
                            first: op.gate,
                            unitary: u,
                        });
                        out.push(None);
                    }
                }
            }
            None => {
                for &q in &op.qubits {
                    if let Some(run) = runs[q as usize].take() {
                        close(run, q, &mut out);
                    }
                }
                out.push(Some(op));
            }
        }
    }
    for (q, run) in runs.into_iter().enumerate() {
        if let Some(run) = run {
            close(run, q as u32, &mut out);
        }
    }
    out.into_iter().flatten().collect()
}
