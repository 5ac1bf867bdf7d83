//! High-level circuit builder API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{GateKind, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{Clbit, ClbitId, QuantumRegister, Qubit, QubitId};
use crate::rational::Rational;

/// A quantum circuit.
///
/// Instructions are kept in program order. Every qubit operand is checked
/// against the declared qubits when the instruction is added, so a built
/// circuit never refers to a qubit it does not own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Classical bits in the circuit.
    clbits: Vec<Clbit>,
    /// Instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with a single `q` register and, if requested, a `c` register.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        circuit.qubits = (0..num_qubits)
            .map(|i| Qubit::with_register(QubitId(i), "q", i))
            .collect();
        circuit.clbits = (0..num_clbits)
            .map(|i| Clbit::with_register(ClbitId(i), "c", i))
            .collect();
        circuit
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if self
            .qubits
            .iter()
            .any(|q| q.register.as_deref() == Some(name.as_str()))
        {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.num_qubits();
        let ids: Vec<_> = (0..size).map(|i| QubitId(start + i)).collect();
        for (i, &id) in ids.iter().enumerate() {
            self.qubits
                .push(Qubit::with_register(id, &name, u32::try_from(i).unwrap_or(u32::MAX)));
        }
        Ok(ids)
    }

    /// Add a classical register with multiple bits.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<ClbitId>> {
        let name = name.into();
        if self
            .clbits
            .iter()
            .any(|c| c.register.as_deref() == Some(name.as_str()))
        {
            return Err(IrError::DuplicateRegister(name));
        }
        let start = self.num_clbits();
        let ids: Vec<_> = (0..size).map(|i| ClbitId(start + i)).collect();
        for (i, &id) in (0u32..).zip(ids.iter()) {
            self.clbits.push(Clbit::with_register(id, &name, i));
        }
        Ok(ids)
    }

    /// Append an instruction after validating its operands.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check_operands(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append a standard gate.
    pub fn apply(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    fn check_operands(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = || Some(instruction.name().to_string());
        if let InstructionKind::Gate(kind) = &instruction.kind {
            let expected = kind.num_qubits();
            let got = u32::try_from(instruction.qubits.len()).unwrap_or(u32::MAX);
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: kind.name().to_string(),
                    expected,
                    got,
                });
            }
        }
        for (i, &q) in instruction.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits() {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
            if instruction.qubits[..i].contains(&q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate_name: gate_name(),
                });
            }
        }
        for &c in &instruction.clbits {
            if c.0 >= self.num_clbits() {
                return Err(IrError::ClbitNotFound {
                    clbit: c,
                    gate_name: gate_name(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::I, [qubit])
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Y, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Z, [qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::S, [qubit])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Sdg, [qubit])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::T, [qubit])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Tdg, [qubit])
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::SX, [qubit])
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rx(theta), [qubit])
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Ry(theta), [qubit])
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Rz(theta), [qubit])
    }

    /// Apply a Z rotation by `angle * pi`.
    pub fn rzq(&mut self, angle: Rational, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::RzQ(angle), [qubit])
    }

    /// Apply U1 gate.
    pub fn u1(&mut self, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::U1(lambda), [qubit])
    }

    /// Apply U2 gate.
    pub fn u2(&mut self, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::U2(phi, lambda), [qubit])
    }

    /// Apply U3 gate.
    pub fn u3(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::U3(theta, phi, lambda), [qubit])
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CX, [control, target])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CY, [control, target])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CZ, [control, target])
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CH, [control, target])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::Swap, [q1, q2])
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CCX, [c1, c2, target])
    }

    /// Apply doubly-controlled Z gate.
    pub fn ccz(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(StandardGate::CCZ, [c1, c2, target])
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Apply a barrier across the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        u32::try_from(self.qubits.len()).unwrap_or(u32::MAX)
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        u32::try_from(self.clbits.len()).unwrap_or(u32::MAX)
    }

    /// Get the qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the classical bits.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Get the instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume the circuit, returning its instructions.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Quantum registers in declaration order.
    ///
    /// Qubits without a register are reported as one anonymous register
    /// named after their position, so callers never lose track of them.
    pub fn qregs(&self) -> Vec<QuantumRegister> {
        let mut regs: Vec<QuantumRegister> = Vec::new();
        for qubit in &self.qubits {
            let name = qubit
                .register
                .clone()
                .unwrap_or_else(|| format!("__anon{}", qubit.id.0));
            match regs.iter_mut().find(|r| r.name == name) {
                Some(reg) => reg.size += 1,
                None => regs.push(QuantumRegister {
                    name,
                    size: 1,
                    start: qubit.id,
                }),
            }
        }
        regs
    }

    /// Count instructions by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in &self.instructions {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of two-qubit gates.
    pub fn two_qubit_gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .count()
    }

    /// Circuit depth (longest chain of instructions sharing a qubit).
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.qubits.len()];
        let mut depth = 0;
        for inst in &self.instructions {
            let next = inst
                .qubits
                .iter()
                .map(|q| level[q.index()])
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                level[q.index()] = next;
            }
            depth = depth.max(next);
        }
        depth
    }

    /// Build a circuit on `num_qubits` qubits of a single `q` register,
    /// validating every instruction.
    pub fn from_instructions(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut circuit = Self::with_size(name, num_qubits, num_clbits);
        for inst in instructions {
            circuit.push(inst)?;
        }
        Ok(circuit)
    }

    /// Replace the instruction list, keeping qubit and bit declarations.
    pub fn replace_instructions(
        &mut self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<()> {
        let old = std::mem::take(&mut self.instructions);
        for inst in instructions {
            if let Err(e) = self.check_operands(&inst) {
                self.instructions = old;
                return Err(e);
            }
            self.instructions.push(inst);
        }
        Ok(())
    }

    /// Iterate over gate kinds in program order.
    pub fn gates(&self) -> impl Iterator<Item = &GateKind> {
        self.instructions.iter().filter_map(|i| match &i.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bell_circuit() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        circuit.measure(QubitId(1), ClbitId(1)).unwrap();

        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.two_qubit_gate_count(), 1);
    }

    #[test]
    fn test_operand_validation() {
        let mut circuit = Circuit::with_size("bad", 2, 0);
        assert!(matches!(
            circuit.cx(QubitId(0), QubitId(2)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            circuit.cx(QubitId(1), QubitId(1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert!(matches!(
            circuit.apply(StandardGate::CX, [QubitId(0)]),
            Err(IrError::QubitCountMismatch { .. })
        ));
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_registers() {
        let mut circuit = Circuit::new("regs");
        let a = circuit.add_qreg("a", 2).unwrap();
        let b = circuit.add_qreg("b", 3).unwrap();
        assert_eq!(a, vec![QubitId(0), QubitId(1)]);
        assert_eq!(b[0], QubitId(2));
        assert!(circuit.add_qreg("a", 1).is_err());

        let regs = circuit.qregs();
        assert_eq!(regs.len(), 2);
        assert_eq!(regs[1].name, "b");
        assert_eq!(regs[1].size, 3);
        assert_eq!(regs[1].start, QubitId(2));
    }

    #[test]
    fn test_count_ops() {
        let mut circuit = Circuit::with_size("ops", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        circuit.rz(PI / 4.0, QubitId(0)).unwrap();
        let counts = circuit.count_ops();
        assert_eq!(counts.get("h"), Some(&2));
        assert_eq!(counts.get("rz"), Some(&1));
    }

    #[test]
    fn test_replace_instructions_rolls_back() {
        let mut circuit = Circuit::with_size("r", 1, 0);
        circuit.x(QubitId(0)).unwrap();
        let bad = vec![Instruction::single_qubit_gate(StandardGate::H, QubitId(5))];
        assert!(circuit.replace_instructions(bad).is_err());
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut circuit = Circuit::with_size("json", 2, 0);
        circuit.rzq(Rational::new(1, 4).unwrap(), QubitId(1)).unwrap();
        let text = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&text).unwrap();
        assert_eq!(back, circuit);
    }
}
