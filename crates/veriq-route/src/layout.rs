//! Placements and register-based layouts.

use std::fmt;

use serde::{Deserialize, Serialize};
use veriq_ir::Circuit;

use crate::error::{RouteError, RouteResult};

/// Name of the register that holds the padding qubits added by embedding.
///
/// When the circuit already declares a register of that name, the padding
/// register takes the first free `ancilla_<n>` instead.
pub const ANCILLA_REGISTER: &str = "ancilla";

fn padding_register_name(registers: &[RegisterInfo]) -> String {
    let taken = |name: &str| registers.iter().any(|r| r.name == name);
    if !taken(ANCILLA_REGISTER) {
        return ANCILLA_REGISTER.to_string();
    }
    (1u32..)
        .map(|n| format!("{ANCILLA_REGISTER}_{n}"))
        .find(|name| !taken(name))
        .unwrap_or_default()
}

/// An injective assignment of the circuit's qubits to physical qubits.
///
/// Entry `v` is the physical qubit that virtual qubit `v` starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    virtual_to_physical: Vec<u32>,
    num_physical: u32,
}

impl Placement {
    /// Validate and build a placement onto a device with `num_physical` qubits.
    pub fn new(virtual_to_physical: Vec<u32>, num_physical: u32) -> RouteResult<Self> {
        let mut seen = vec![false; num_physical as usize];
        for (v, &p) in virtual_to_physical.iter().enumerate() {
            let slot = seen.get_mut(p as usize).ok_or_else(|| {
                RouteError::InvalidPlacement(format!(
                    "virtual qubit {v} placed on {p}, outside a {num_physical}-qubit device"
                ))
            })?;
            if *slot {
                return Err(RouteError::InvalidPlacement(format!(
                    "physical qubit {p} assigned twice"
                )));
            }
            *slot = true;
        }
        Ok(Self {
            virtual_to_physical,
            num_physical,
        })
    }

    /// Virtual qubit `v` on physical qubit `v`.
    pub fn trivial(num_virtual: u32, num_physical: u32) -> RouteResult<Self> {
        Self::new((0..num_virtual).collect(), num_physical)
    }

    pub fn physical(&self, virtual_qubit: u32) -> Option<u32> {
        self.virtual_to_physical.get(virtual_qubit as usize).copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.virtual_to_physical
    }

    pub fn num_virtual(&self) -> u32 {
        u32::try_from(self.virtual_to_physical.len()).unwrap_or(u32::MAX)
    }

    pub fn num_physical(&self) -> u32 {
        self.num_physical
    }

    /// Physical qubits no virtual qubit is placed on, ascending.
    pub fn unused_physical(&self) -> Vec<u32> {
        (0..self.num_physical)
            .filter(|p| !self.virtual_to_physical.contains(p))
            .collect()
    }
}

/// One entry of a [`RegisterLayout`]: a qubit named by register and index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualBit {
    pub register: String,
    pub index: u32,
}

impl fmt::Display for VirtualBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A register known to a [`RegisterLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInfo {
    pub name: String,
    pub size: u32,
    pub is_ancilla: bool,
}

/// Host-side layout: every physical qubit names the register bit it holds.
///
/// This is the representation the placement and routing side works with.
/// Registers keep their declaration order, with the ancilla register last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterLayout {
    physical: Vec<VirtualBit>,
    registers: Vec<RegisterInfo>,
}

impl RegisterLayout {
    /// Build a layout, checking that each register bit is held by exactly one
    /// physical qubit.
    pub fn new(physical: Vec<VirtualBit>, registers: Vec<RegisterInfo>) -> RouteResult<Self> {
        let total: u32 = registers.iter().map(|r| r.size).sum();
        if total as usize != physical.len() {
            return Err(RouteError::InvalidPlacement(format!(
                "registers hold {total} qubits but the layout covers {}",
                physical.len()
            )));
        }
        let mut seen: Vec<Vec<bool>> = registers
            .iter()
            .map(|r| vec![false; r.size as usize])
            .collect();
        for bit in &physical {
            let slot = registers
                .iter()
                .position(|r| r.name == bit.register)
                .and_then(|r| seen[r].get_mut(bit.index as usize))
                .ok_or_else(|| RouteError::InvalidPlacement(format!("unknown bit {bit}")))?;
            if *slot {
                return Err(RouteError::InvalidPlacement(format!("bit {bit} placed twice")));
            }
            *slot = true;
        }
        Ok(Self {
            physical,
            registers,
        })
    }

    /// Describe where the circuit's qubits sit after `placement`, padding the
    /// unused physical qubits with an ancilla register.
    pub fn from_placement(circuit: &Circuit, placement: &Placement) -> RouteResult<Self> {
        if placement.num_virtual() != circuit.num_qubits() {
            return Err(RouteError::InvalidPlacement(format!(
                "placement covers {} qubits, circuit has {}",
                placement.num_virtual(),
                circuit.num_qubits()
            )));
        }
        let n = placement.num_physical() as usize;
        let mut physical: Vec<Option<VirtualBit>> = vec![None; n];
        for (v, qubit) in circuit.qubits().iter().enumerate() {
            let bit = match (&qubit.register, qubit.index) {
                (Some(reg), Some(index)) => VirtualBit {
                    register: reg.clone(),
                    index,
                },
                _ => VirtualBit {
                    register: format!("__anon{}", qubit.id.0),
                    index: 0,
                },
            };
            physical[placement.as_slice()[v] as usize] = Some(bit);
        }

        let mut registers: Vec<RegisterInfo> = circuit
            .qregs()
            .into_iter()
            .map(|r| RegisterInfo {
                name: r.name,
                size: r.size,
                is_ancilla: false,
            })
            .collect();
        let unused = placement.unused_physical();
        let padding = padding_register_name(&registers);
        if !unused.is_empty() {
            registers.push(RegisterInfo {
                name: padding.clone(),
                size: u32::try_from(unused.len()).unwrap_or(u32::MAX),
                is_ancilla: true,
            });
        }
        for (index, p) in (0u32..).zip(unused) {
            physical[p as usize] = Some(VirtualBit {
                register: padding.clone(),
                index,
            });
        }

        let physical = physical
            .into_iter()
            .enumerate()
            .map(|(p, bit)| {
                bit.ok_or_else(|| {
                    RouteError::InvalidPlacement(format!("physical qubit {p} left empty"))
                })
            })
            .collect::<RouteResult<Vec<_>>>()?;
        Self::new(physical, registers)
    }

    /// The bit held by physical qubit `p`.
    pub fn get(&self, physical: u32) -> Option<&VirtualBit> {
        self.physical.get(physical as usize)
    }

    /// `(physical, bit)` pairs in physical order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &VirtualBit)> {
        (0u32..).zip(self.physical.iter())
    }

    pub fn registers(&self) -> &[RegisterInfo] {
        &self.registers
    }

    pub fn num_physical(&self) -> u32 {
        u32::try_from(self.physical.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_validation() {
        assert!(Placement::new(vec![2, 0], 3).is_ok());
        assert!(Placement::new(vec![1, 1], 3).is_err());
        assert!(Placement::new(vec![3], 3).is_err());
        assert_eq!(Placement::new(vec![2, 0], 4).unwrap().unused_physical(), vec![1, 3]);
    }

    #[test]
    fn test_from_placement_adds_ancillas() {
        let circuit = Circuit::with_size("c", 2, 0);
        let placement = Placement::new(vec![2, 0], 4).unwrap();
        let layout = RegisterLayout::from_placement(&circuit, &placement).unwrap();

        assert_eq!(layout.get(2).unwrap().to_string(), "q[0]");
        assert_eq!(layout.get(0).unwrap().to_string(), "q[1]");
        assert_eq!(layout.get(1).unwrap().to_string(), "ancilla[0]");
        assert_eq!(layout.get(3).unwrap().to_string(), "ancilla[1]");
        assert_eq!(layout.registers().len(), 2);
        assert!(layout.registers()[1].is_ancilla);
    }

    #[test]
    fn test_padding_register_avoids_user_ancilla() {
        let mut circuit = Circuit::new("c");
        circuit.add_qreg("ancilla", 1).unwrap();
        circuit.add_qreg("ancilla_1", 1).unwrap();
        let placement = Placement::new(vec![1, 2], 4).unwrap();
        let layout = RegisterLayout::from_placement(&circuit, &placement).unwrap();

        assert_eq!(layout.get(1).unwrap().to_string(), "ancilla[0]");
        assert_eq!(layout.get(2).unwrap().to_string(), "ancilla_1[0]");
        assert_eq!(layout.get(0).unwrap().to_string(), "ancilla_2[0]");
        assert_eq!(layout.get(3).unwrap().to_string(), "ancilla_2[1]");
        let padding = layout.registers().last().unwrap();
        assert_eq!(padding.name, "ancilla_2");
        assert!(padding.is_ancilla);
    }

    #[test]
    fn test_full_device_has_no_ancilla_register() {
        let circuit = Circuit::with_size("c", 3, 0);
        let placement = Placement::trivial(3, 3).unwrap();
        let layout = RegisterLayout::from_placement(&circuit, &placement).unwrap();
        assert_eq!(layout.registers().len(), 1);
    }

    #[test]
    fn test_multiple_registers_are_kept() {
        let mut circuit = Circuit::new("c");
        circuit.add_qreg("a", 1).unwrap();
        circuit.add_qreg("b", 1).unwrap();
        let placement = Placement::trivial(2, 3).unwrap();
        let layout = RegisterLayout::from_placement(&circuit, &placement).unwrap();
        let names: Vec<_> = layout.registers().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "ancilla"]);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let bit = VirtualBit {
            register: "q".into(),
            index: 0,
        };
        let regs = vec![RegisterInfo {
            name: "q".into(),
            size: 2,
            is_ancilla: false,
        }];
        assert!(RegisterLayout::new(vec![bit.clone(), bit], regs).is_err());
    }
}
