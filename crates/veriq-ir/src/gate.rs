//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::rational::Rational;

/// Standard gates with known semantics.
///
/// The set is wider than what the verified pipeline accepts: host circuits
/// may carry gates such as `sx` or `ch` that the gate-set validator rejects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Rotation around Z by an exact rational multiple of pi.
    RzQ(Rational),
    /// IBM U1(lambda).
    U1(f64),
    /// IBM U2(phi, lambda).
    U2(f64, f64),
    /// IBM U3(theta, phi, lambda).
    U3(f64, f64, f64),
    /// Phase gate.
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around Z.
    CRz(f64),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Doubly-controlled Z gate.
    CCZ,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::RzQ(_) => "rzq",
            StandardGate::U1(_) => "u1",
            StandardGate::U2(_, _) => "u2",
            StandardGate::U3(_, _, _) => "u3",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CCX => "ccx",
            StandardGate::CCZ => "ccz",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::RzQ(_)
            | StandardGate::U1(_)
            | StandardGate::U2(_, _)
            | StandardGate::U3(_, _, _)
            | StandardGate::P(_) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRz(_) => 2,

            StandardGate::CCX | StandardGate::CCZ | StandardGate::CSwap => 3,
        }
    }

    /// Floating-point parameters of this gate, in declaration order.
    ///
    /// `rzq` reports its angle in radians.
    pub fn parameters(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::U1(p)
            | StandardGate::P(p)
            | StandardGate::CRz(p) => vec![p],
            StandardGate::RzQ(q) => vec![q.radians()],
            StandardGate::U2(phi, lambda) => vec![phi, lambda],
            StandardGate::U3(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }

    /// True for gates that are diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::RzQ(_)
                | StandardGate::U1(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::CCZ
                | StandardGate::CRz(_)
        )
    }

    /// The inverse gate, when it is itself a standard gate.
    pub fn inverse(&self) -> Option<StandardGate> {
        let inv = match *self {
            StandardGate::I => StandardGate::I,
            StandardGate::X => StandardGate::X,
            StandardGate::Y => StandardGate::Y,
            StandardGate::Z => StandardGate::Z,
            StandardGate::H => StandardGate::H,
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::RzQ(q) => StandardGate::RzQ(-q),
            StandardGate::U1(l) => StandardGate::U1(-l),
            StandardGate::P(l) => StandardGate::P(-l),
            StandardGate::U3(theta, phi, lambda) => StandardGate::U3(-theta, -lambda, -phi),
            StandardGate::CX => StandardGate::CX,
            StandardGate::CY => StandardGate::CY,
            StandardGate::CZ => StandardGate::CZ,
            StandardGate::CH => StandardGate::CH,
            StandardGate::Swap => StandardGate::Swap,
            StandardGate::CRz(t) => StandardGate::CRz(-t),
            StandardGate::CCX => StandardGate::CCX,
            StandardGate::CCZ => StandardGate::CCZ,
            StandardGate::CSwap => StandardGate::CSwap,
            StandardGate::U2(_, _) => return None,
        };
        Some(inv)
    }

    /// Compare two gates, allowing `tolerance` on floating-point parameters.
    pub fn approx_eq(&self, other: &StandardGate, tolerance: f64) -> bool {
        if let (StandardGate::RzQ(a), StandardGate::RzQ(b)) = (self, other) {
            return a == b;
        }
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }
        self.parameters()
            .iter()
            .zip(other.parameters())
            .all(|(a, b)| angles_close(*a, b, tolerance))
    }
}

/// Compare two angles modulo 2*pi.
pub fn angles_close(a: f64, b: f64, tolerance: f64) -> bool {
    let two_pi = 2.0 * std::f64::consts::PI;
    let diff = (a - b).rem_euclid(two_pi);
    diff < tolerance || two_pi - diff < tolerance
}

/// A quantum gate, either standard or opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A gate known only by name and arity.
    Custom(CustomGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
        }
    }

    /// The standard gate, if this is one.
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match self {
            GateKind::Standard(g) => Some(g),
            GateKind::Custom(_) => None,
        }
    }
}

/// An opaque gate, e.g. one declared in a source file with a `gate` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<f64>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }
}

impl From<StandardGate> for GateKind {
    fn from(gate: StandardGate) -> Self {
        GateKind::Standard(gate)
    }
}

impl From<CustomGate> for GateKind {
    fn from(gate: CustomGate) -> Self {
        GateKind::Custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCZ.num_qubits(), 3);
        assert_eq!(StandardGate::U3(0.1, 0.2, 0.3).parameters().len(), 3);
        assert_eq!(StandardGate::I.name(), "id");
    }

    #[test]
    fn test_inverse_pairs() {
        assert_eq!(StandardGate::S.inverse(), Some(StandardGate::Sdg));
        assert_eq!(StandardGate::Tdg.inverse(), Some(StandardGate::T));
        assert_eq!(StandardGate::Rz(0.5).inverse(), Some(StandardGate::Rz(-0.5)));
        assert_eq!(StandardGate::U2(0.0, PI).inverse(), None);
    }

    #[test]
    fn test_approx_eq_wraps_angles() {
        let a = StandardGate::Rz(PI);
        let b = StandardGate::Rz(-PI);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&StandardGate::Rx(PI), 1e-9));
    }

    #[test]
    fn test_custom_gate() {
        let custom = CustomGate::new("my_gate", 2).with_params(vec![PI / 4.0]);
        let kind = GateKind::from(custom);
        assert_eq!(kind.name(), "my_gate");
        assert_eq!(kind.num_qubits(), 2);
        assert!(kind.as_standard().is_none());
    }
}
