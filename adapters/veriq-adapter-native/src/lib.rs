//! Native verification engine
//!
//! An in-process implementation of [`veriq_engine::VerificationEngine`].
//! Circuits, layouts and graphs live in an arena keyed by raw handles.
//!
//! # Transformations
//!
//! | name | effect |
//! |------|--------|
//! | `not_propagation` | moves X gates through CX targets and cancels pairs |
//! | `hadamard_reduction` | `H S H` to `S† H S†` and its mirror |
//! | `cancel_single_qubit_gates` | drops identities and adjacent inverse pairs |
//! | `cancel_two_qubit_gates` | drops adjacent identical CX, CZ, SWAP, CCX, CCZ |
//! | `merge_rotations` | merges Z rotations through CX controls and CZ |
//! | `optimize_nam` / `optimize` | the rules above to a fixpoint, in the `rzq` encoding |
//! | `convert_to_ibm`, `optimize_1q_gates`, `cx_cancellation`, `optimize_ibm` | IBM gate set passes |
//! | `convert_to_rzq`, `replace_rzq` | exact Z-rotation encoding and back |
//! | `decompose_to_cnot` | CCX, CCZ, CZ and SWAP to CX |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use veriq_adapter_native::NativeEngine;
//! use veriq_engine::{EngineSession, Transform};
//!
//! let session = EngineSession::new(Arc::new(NativeEngine::new()))?;
//! let circuit = session.read_qasm("input.qasm".as_ref())?;
//! let circuit = circuit.transform(Transform::Optimize)?;
//! circuit.write_qasm("output.qasm".as_ref())?;
//! ```

mod arena;
mod engine;
mod mapping;
mod program;
mod rewrite;
mod unitary;

pub use engine::NativeEngine;
