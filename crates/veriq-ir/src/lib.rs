//! Veriq circuit representation
//!
//! Host-side data structures for quantum circuits: qubits grouped into named
//! registers, a gate vocabulary, instructions, and a program-ordered
//! [`Circuit`] builder.
//!
//! # Example
//!
//! ```rust
//! use veriq_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `id`, `x`, `y`, `z` | 1 | Identity and Pauli gates |
//! | `h`, `s`, `sdg`, `t`, `tdg` | 1 | Clifford+T gates |
//! | `rx`, `ry`, `rz` | 1 | Rotations by a float angle |
//! | `rzq` | 1 | Z rotation by an exact rational multiple of pi |
//! | `u1`, `u2`, `u3` | 1 | IBM single-qubit gates |
//! | `cx`, `cz`, `swap` | 2 | Two-qubit gates |
//! | `ccx`, `ccz` | 3 | Doubly-controlled gates |
//!
//! `sx`, `sxdg`, `p`, `cy`, `ch`, `crz` and `cswap` are representable but
//! are not accepted by the verified pipeline.

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod rational;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, GateKind, StandardGate, angles_close};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, QuantumRegister, Qubit, QubitId};
pub use rational::Rational;
