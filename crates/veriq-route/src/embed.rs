//! Applying a placement and checking connectivity.

use veriq_ir::{Circuit, QubitId};

use crate::coupling::CouplingMap;
use crate::error::{RouteError, RouteResult};
use crate::layout::{Placement, RegisterLayout};

/// Widen `circuit` to the whole device and move each qubit to its placed
/// physical qubit. The unused physical qubits become ancillas.
///
/// The returned circuit has a single `q` register of device size; the
/// returned layout says which register bit each physical qubit now holds.
pub fn embed(
    circuit: &Circuit,
    coupling: &CouplingMap,
    placement: &Placement,
) -> RouteResult<(Circuit, RegisterLayout)> {
    let available = coupling.num_qubits();
    if circuit.num_qubits() > available {
        return Err(RouteError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available,
        });
    }
    if placement.num_physical() != available {
        return Err(RouteError::InvalidPlacement(format!(
            "placement targets {} qubits, device has {available}",
            placement.num_physical()
        )));
    }
    let layout = RegisterLayout::from_placement(circuit, placement)?;
    let map = placement.as_slice();
    let instructions = circuit
        .instructions()
        .iter()
        .map(|inst| inst.remapped(|q| QubitId(map[q.index()])));
    let embedded =
        Circuit::from_instructions(circuit.name(), available, circuit.num_clbits(), instructions)?;
    Ok((embedded, layout))
}

/// The first gate, in program order, acting on two physical qubits that do
/// not share a coupler. `None` means the circuit needs no routing.
pub fn check_map(circuit: &Circuit, coupling: &CouplingMap) -> Option<(u32, u32)> {
    circuit
        .instructions()
        .iter()
        .filter(|inst| inst.is_gate())
        .find_map(|inst| {
            inst.qubits.iter().enumerate().find_map(|(i, a)| {
                inst.qubits[i + 1..]
                    .iter()
                    .find(|b| !coupling.is_connected(a.0, b.0))
                    .map(|b| (a.0, b.0))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_moves_gates() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let placement = Placement::new(vec![3, 2], 4).unwrap();

        let (embedded, layout) = embed(&circuit, &CouplingMap::linear(4), &placement).unwrap();
        assert_eq!(embedded.num_qubits(), 4);
        assert_eq!(embedded.instructions()[1].qubits, vec![QubitId(3), QubitId(2)]);
        assert_eq!(layout.get(3).unwrap().to_string(), "q[0]");
        assert_eq!(layout.get(0).unwrap().to_string(), "ancilla[0]");
    }

    #[test]
    fn test_embed_rejects_foreign_placement() {
        let circuit = Circuit::with_size("c", 2, 0);
        let placement = Placement::trivial(2, 3).unwrap();
        assert!(embed(&circuit, &CouplingMap::linear(4), &placement).is_err());
    }

    #[test]
    fn test_check_map() {
        let coupling = CouplingMap::linear(3);
        let mut circuit = Circuit::with_size("c", 3, 0);
        circuit.cx(QubitId(1), QubitId(2)).unwrap();
        assert_eq!(check_map(&circuit, &coupling), None);
        circuit.cz(QubitId(2), QubitId(0)).unwrap();
        assert_eq!(check_map(&circuit, &coupling), Some((2, 0)));
    }
}
