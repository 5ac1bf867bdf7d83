//! Verification engine boundary.
//!
//! The engine performs verified circuit rewriting and mapping checks on
//! objects it owns. This crate defines how the rest of the workspace talks to
//! it:
//!
//! - [`VerificationEngine`]: the raw, handle-based operation surface.
//! - [`CircuitHandle`], [`LayoutHandle`], [`GraphHandle`]: move-only owners
//!   that release their object exactly once.
//! - [`EngineSession`]: typed constructors over a shared engine.
//! - [`Transform`], [`GateCount`], [`Topology`]: closed operation sets.
//! - [`runtime`]: process-wide initialization and shutdown.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use veriq_engine::{EngineSession, Transform};
//!
//! let session = EngineSession::new(Arc::new(engine))?;
//! let circ = session.read_qasm(path)?;
//! let circ = circ.transform(Transform::Optimize)?;
//! println!("{} gates", circ.total_gate_count()?);
//! ```

pub mod engine;
pub mod error;
pub mod handle;
pub mod ops;
pub mod runtime;
pub mod session;

pub use engine::VerificationEngine;
pub use error::{EngineError, EngineResult};
pub use handle::{CircuitHandle, GraphHandle, HandleKind, LayoutHandle, RawHandle};
pub use ops::{GateCount, Topology, Transform};
pub use session::EngineSession;
