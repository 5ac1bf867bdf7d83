//! Engine-side circuit representation.

use veriq_engine::{EngineError, EngineResult, GateCount};
use veriq_ir::{Circuit, GateKind, Instruction, InstructionKind, QubitId, StandardGate};

/// One gate application.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Op {
    pub gate: StandardGate,
    pub qubits: Vec<u32>,
}

impl Op {
    pub fn new(gate: StandardGate, qubits: impl Into<Vec<u32>>) -> Self {
        Self {
            gate,
            qubits: qubits.into(),
        }
    }

    pub fn one(gate: StandardGate, q: u32) -> Self {
        Self::new(gate, vec![q])
    }

    pub fn cx(control: u32, target: u32) -> Self {
        Self::new(StandardGate::CX, vec![control, target])
    }

    pub fn is_single(&self) -> bool {
        self.qubits.len() == 1
    }
}

/// A circuit owned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Program {
    pub num_qubits: u32,
    pub ops: Vec<Op>,
}

/// Whether `gate` belongs to the engine's gate set.
pub(crate) fn in_gate_set(gate: &StandardGate) -> bool {
    matches!(
        gate,
        StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::RzQ(_)
            | StandardGate::U1(_)
            | StandardGate::U2(_, _)
            | StandardGate::U3(_, _, _)
            | StandardGate::CX
            | StandardGate::CZ
            | StandardGate::Swap
            | StandardGate::CCX
            | StandardGate::CCZ
    )
}

impl Program {
    /// Lower a host circuit, rejecting anything outside the gate set.
    pub fn from_circuit(circuit: &Circuit) -> EngineResult<Self> {
        let mut ops = Vec::with_capacity(circuit.len());
        for inst in circuit.instructions() {
            let gate = match &inst.kind {
                InstructionKind::Gate(GateKind::Standard(g)) if in_gate_set(g) => *g,
                _ => return Err(EngineError::UnsupportedGate(inst.name().to_string())),
            };
            ops.push(Op::new(gate, inst.qubits.iter().map(|q| q.0).collect::<Vec<_>>()));
        }
        Ok(Self {
            num_qubits: circuit.num_qubits(),
            ops,
        })
    }

    /// Raise to a host circuit over `num_qubits` qubits.
    pub fn to_circuit(&self, num_qubits: u32) -> EngineResult<Circuit> {
        Circuit::from_instructions(
            "circuit",
            num_qubits,
            0,
            self.ops
                .iter()
                .map(|op| Instruction::gate(op.gate, op.qubits.iter().map(|&q| QubitId(q)))),
        )
        .map_err(|e| EngineError::SizeMismatch(e.to_string()))
    }

    pub fn well_typed(&self, num_qubits: u32) -> bool {
        self.ops.iter().all(|op| {
            op.gate.num_qubits() as usize == op.qubits.len()
                && op.qubits.iter().all(|&q| q < num_qubits)
                && op
                    .qubits
                    .iter()
                    .enumerate()
                    .all(|(i, q)| !op.qubits[..i].contains(q))
        })
    }

    pub fn count(&self, kind: GateCount) -> usize {
        self.ops.iter().filter(|op| counts_as(&op.gate, kind)).count()
    }

    pub fn count_clifford_rzq(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op.gate, StandardGate::RzQ(q) if q.is_clifford()))
            .count()
    }
}

fn counts_as(gate: &StandardGate, kind: GateCount) -> bool {
    match kind {
        GateCount::I => matches!(gate, StandardGate::I),
        GateCount::X => matches!(gate, StandardGate::X),
        GateCount::Y => matches!(gate, StandardGate::Y),
        GateCount::Z => matches!(gate, StandardGate::Z),
        GateCount::H => matches!(gate, StandardGate::H),
        GateCount::S => matches!(gate, StandardGate::S),
        GateCount::T => matches!(gate, StandardGate::T),
        GateCount::Sdg => matches!(gate, StandardGate::Sdg),
        GateCount::Tdg => matches!(gate, StandardGate::Tdg),
        GateCount::Rx => matches!(gate, StandardGate::Rx(_)),
        GateCount::Ry => matches!(gate, StandardGate::Ry(_)),
        GateCount::Rz => matches!(gate, StandardGate::Rz(_)),
        GateCount::Rzq => matches!(gate, StandardGate::RzQ(_)),
        GateCount::U1 => matches!(gate, StandardGate::U1(_)),
        GateCount::U2 => matches!(gate, StandardGate::U2(_, _)),
        GateCount::U3 => matches!(gate, StandardGate::U3(_, _, _)),
        GateCount::CX => matches!(gate, StandardGate::CX),
        GateCount::CZ => matches!(gate, StandardGate::CZ),
        GateCount::Swap => matches!(gate, StandardGate::Swap),
        GateCount::CCX => matches!(gate, StandardGate::CCX),
        GateCount::CCZ => matches!(gate, StandardGate::CCZ),
    }
}
