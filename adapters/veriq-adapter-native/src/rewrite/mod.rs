//! Circuit rewriting.
//!
//! Each rewrite takes the op list by value and returns a new one that is
//! equal to the input up to global phase.

mod cancel;
mod decompose;
mod hadamard;
mod ibm;
mod rotation;

pub(crate) use decompose::decompose_swaps;

use tracing::debug;
use veriq_engine::Transform;

use crate::program::{Op, Program};

/// Rounds before a fixpoint loop gives up.
const MAX_ROUNDS: usize = 8;

/// Apply a named transformation.
pub(crate) fn apply(program: Program, transform: Transform) -> Program {
    let n = program.num_qubits;
    let before = program.ops.len();
    let ops = match transform {
        Transform::ConvertToRzq => rotation::convert_to_rzq(program.ops),
        Transform::ConvertToIbm => ibm::convert_to_ibm(program.ops),
        Transform::DecomposeToCnot => decompose::decompose_to_cnot(program.ops),
        Transform::ReplaceRzq => rotation::replace_rzq(program.ops),
        Transform::Optimize1qGates => ibm::optimize_1q_gates(program.ops, n),
        Transform::CxCancellation => cancel::cancel_two_qubit(program.ops, n, true),
        Transform::OptimizeIbm => optimize_ibm(program.ops, n),
        Transform::NotPropagation => cancel::not_propagation(program.ops, n),
        Transform::HadamardReduction => hadamard::hadamard_reduction(program.ops, n),
        Transform::CancelSingleQubitGates => cancel::cancel_single_qubit(program.ops, n),
        Transform::CancelTwoQubitGates => cancel::cancel_two_qubit(program.ops, n, false),
        Transform::MergeRotations => rotation::merge_rotations(program.ops, n),
        Transform::OptimizeNam | Transform::Optimize => optimize_nam(program.ops, n),
    };
    debug!("{}: {} -> {} gates", transform, before, ops.len());
    Program { num_qubits: n, ops }
}

fn optimize_nam(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut ops = rotation::convert_to_rzq(ops);
    for _ in 0..MAX_ROUNDS {
        let previous = ops.clone();
        ops = cancel::not_propagation(ops, n);
        ops = hadamard::hadamard_reduction(ops, n);
        ops = cancel::cancel_single_qubit(ops, n);
        ops = cancel::cancel_two_qubit(ops, n, false);
        ops = rotation::merge_rotations(ops, n);
        ops = cancel::cancel_single_qubit(ops, n);
        ops = cancel::cancel_two_qubit(ops, n, false);
        if ops == previous {
            break;
        }
    }
    ops
}

fn optimize_ibm(ops: Vec<Op>, n: u32) -> Vec<Op> {
    let mut ops = ibm::convert_to_ibm(ops);
    for _ in 0..MAX_ROUNDS {
        let previous = ops.clone();
        ops = ibm::optimize_1q_gates(ops, n);
        ops = cancel::cancel_two_qubit(ops, n, true);
        if ops == previous {
            break;
        }
    }
    ops
}

/// Output slots with a per-wire stack of the slots touching each qubit.
pub(super) struct Slots {
    out: Vec<Option<Op>>,
    wires: Vec<Vec<usize>>,
}

impl Slots {
    pub fn new(num_qubits: u32) -> Self {
        Self {
            out: Vec::new(),
            wires: vec![Vec::new(); num_qubits as usize],
        }
    }

    pub fn push(&mut self, op: Op) -> usize {
        let idx = self.out.len();
        for &q in &op.qubits {
            self.wires[q as usize].push(idx);
        }
        self.out.push(Some(op));
        idx
    }

    /// Most recent live slot on `q`, and the one before it.
    pub fn top(&self, q: u32, depth: usize) -> Option<usize> {
        let wire = &self.wires[q as usize];
        wire.len().checked_sub(depth + 1).map(|i| wire[i])
    }

    /// Slot that is the most recent on every one of `qubits`.
    pub fn top_shared(&self, qubits: &[u32]) -> Option<usize> {
        let first = self.top(*qubits.first()?, 0)?;
        qubits
            .iter()
            .all(|&q| self.top(q, 0) == Some(first))
            .then_some(first)
    }

    pub fn get(&self, idx: usize) -> Option<&Op> {
        self.out.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Op> {
        self.out.get_mut(idx).and_then(Option::as_mut)
    }

    /// Remove a slot that is on top of all of its wires.
    pub fn pop(&mut self, idx: usize) {
        if let Some(op) = self.out.get_mut(idx).and_then(Option::take) {
            for q in op.qubits {
                self.wires[q as usize].pop();
            }
        }
    }

    pub fn finish(self) -> Vec<Op> {
        self.out.into_iter().flatten().collect()
    }
}
