//! Gate-set validation at every pipeline entry point.

use veriq_ir::{Circuit, Instruction, StandardGate};

use crate::error::{CompileError, CompileResult, Stage};

/// Whether the engine can take `gate`.
pub fn is_supported_gate(gate: &StandardGate) -> bool {
    use StandardGate::*;
    matches!(
        gate,
        I | X
            | Y
            | Z
            | H
            | S
            | Sdg
            | T
            | Tdg
            | Rx(_)
            | Ry(_)
            | Rz(_)
            | RzQ(_)
            | U1(_)
            | U2(..)
            | U3(..)
            | CX
            | CZ
            | Swap
            | CCX
            | CCZ
    )
}

fn is_supported(inst: &Instruction) -> bool {
    inst.as_standard().is_some_and(is_supported_gate)
}

/// Reject the circuit if any instruction is outside the supported vocabulary.
///
/// Reports the first offending instruction in program order.
pub fn validate(circuit: &Circuit, stage: Stage) -> CompileResult<()> {
    match circuit.instructions().iter().find(|inst| !is_supported(inst)) {
        Some(inst) => Err(CompileError::UnsupportedGate {
            gate: inst.name().to_string(),
            stage,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriq_ir::{ClbitId, CustomGate, QubitId};

    #[test]
    fn test_vocabulary_passes() {
        let mut circuit = Circuit::with_size("ok", 3, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.u3(0.1, 0.2, 0.3, QubitId(1)).unwrap();
        circuit.ccz(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit.swap(QubitId(0), QubitId(2)).unwrap();
        assert!(validate(&circuit, Stage::PreOptimization).is_ok());
    }

    #[test]
    fn test_first_offender_is_reported() {
        let mut circuit = Circuit::with_size("bad", 2, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.sx(QubitId(1)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let err = validate(&circuit, Stage::Mapping).unwrap_err();
        assert!(matches!(
            &err,
            CompileError::UnsupportedGate { gate, stage: Stage::Mapping } if gate == "sx"
        ));
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_non_gates_rejected() {
        let mut circuit = Circuit::with_size("m", 1, 1);
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        assert!(validate(&circuit, Stage::PostOptimization).is_err());

        let mut circuit = Circuit::with_size("b", 2, 0);
        circuit.barrier([QubitId(0), QubitId(1)]).unwrap();
        assert!(validate(&circuit, Stage::PostOptimization).is_err());

        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit
            .push(Instruction::gate(CustomGate::new("mine", 1), [QubitId(0)]))
            .unwrap();
        assert!(validate(&circuit, Stage::Decompose3q).is_err());
    }
}
