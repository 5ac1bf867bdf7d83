//! Error types for placement and routing.

use thiserror::Error;
use veriq_ir::IrError;

/// Placement and routing errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteError {
    #[error("Circuit requires {required} qubits but the device has {available}")]
    CircuitTooLarge { required: u32, available: u32 },

    #[error("Gate '{gate}' acts on more than two qubits and cannot be routed")]
    UnsupportedGate { gate: String },

    #[error("No path between physical qubits {qubit1} and {qubit2}")]
    NoPath { qubit1: u32, qubit2: u32 },

    #[error("Invalid coupling map: {0}")]
    InvalidCouplingMap(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Unknown layout method: {0}")]
    UnknownLayoutMethod(String),

    #[error("Unknown routing method: {0}")]
    UnknownRoutingMethod(String),

    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for placement and routing.
pub type RouteResult<T> = Result<T, RouteError>;
