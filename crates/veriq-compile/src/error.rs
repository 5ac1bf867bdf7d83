//! Error types for the verified pipeline.

use std::fmt;

use thiserror::Error;
use veriq_engine::EngineError;
use veriq_ir::IrError;
use veriq_route::RouteError;

/// Pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PreOptimization,
    PostOptimization,
    Decompose3q,
    Mapping,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::PreOptimization => "pre-mapping optimization",
            Stage::PostOptimization => "post-mapping optimization",
            Stage::Decompose3q => "3-qubit decomposition",
            Stage::Mapping => "mapping",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    #[error("Unsupported gate '{gate}' in {stage}")]
    UnsupportedGate { gate: String, stage: Stage },

    #[error("Invalid configuration: unknown {kind} '{name}'")]
    InvalidConfiguration { kind: &'static str, name: String },

    #[error("Configuration file error: {0}")]
    Config(String),

    #[error("Layout conversion failed in mapping: {0}")]
    LayoutConversion(String),

    #[error("Mapped circuit is not equivalent to the input in {stage}")]
    MappingValidationFailed { stage: Stage },

    #[error("Gate on physical qubits ({qubit1}, {qubit2}) violates the coupling map in mapping")]
    ConstraintViolation { qubit1: u32, qubit2: u32 },

    #[error("{leaked} engine handle(s) leaked by the pipeline")]
    ResourceLeak { leaked: usize },

    #[error("Circuit requires {required} qubits but the device has {available} in mapping")]
    CircuitTooLarge { required: u32, available: u32 },

    #[error("Mapping requires a coupling map")]
    MissingCouplingMap,

    #[error("Pipeline deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    #[error("Interchange error: {0}")]
    Interchange(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Solver error: {0}")]
    Solver(#[from] RouteError),

    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type CompileResult<T> = Result<T, CompileError>;
