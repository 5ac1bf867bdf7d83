//! Error types for the engine boundary.

use thiserror::Error;

use crate::handle::{HandleKind, RawHandle};

/// Errors reported by a verification engine or by the boundary itself.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The process-wide runtime has not been initialized.
    #[error("Verification engine runtime is not initialized")]
    NotInitialized,

    /// The process-wide runtime was shut down and cannot be restarted.
    #[error("Verification engine runtime has been shut down")]
    RuntimeShutDown,

    /// Runtime initialization hook failed.
    #[error("Verification engine initialization failed: {0}")]
    InitFailed(String),

    /// A handle the engine does not know, or one already released.
    #[error("Unknown {kind} handle {handle}")]
    UnknownHandle { handle: RawHandle, kind: HandleKind },

    /// A handle of the wrong kind was passed.
    #[error("Handle {handle} is a {actual}, expected a {expected}")]
    WrongHandleKind {
        handle: RawHandle,
        expected: HandleKind,
        actual: HandleKind,
    },

    /// Permutation list that is not a bijection on `0..len`.
    #[error("Permutation is not a bijection: {0}")]
    NotABijection(String),

    /// Malformed connectivity graph.
    #[error("Invalid connectivity graph: {0}")]
    InvalidGraph(String),

    /// Transformation name outside the engine's operation set.
    #[error("Unknown transformation: {0}")]
    UnknownTransform(String),

    /// Topology description that cannot be parsed.
    #[error("Unknown topology: {0}")]
    UnknownTopology(String),

    /// Gate the engine cannot represent.
    #[error("Gate '{0}' is not supported by the engine")]
    UnsupportedGate(String),

    /// Sizes that do not agree (circuit vs layout vs graph).
    #[error("Size mismatch: {0}")]
    SizeMismatch(String),

    /// Reading or parsing an interchange file failed.
    #[error("Interchange error: {0}")]
    Interchange(String),

    /// I/O error on an interchange file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
