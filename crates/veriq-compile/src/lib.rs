//! Verified compilation pipeline
//!
//! This crate drives a verification engine through a fixed, checked
//! pipeline. Circuits live on the host as [`veriq_ir::Circuit`] and cross
//! into the engine only through transient interchange files. Every result
//! the engine produces is brought back and validated before the next stage.
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │  validate (gate vocabulary)
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (coupling map, layouts, device graph, reports)
//! └─────────────┘
//!       │
//!       ├── VerifiedOptimize (pre)     engine transformations + replace_rzq
//!       ├── Decompose3q                CNOT form (CCX, CCZ, CZ, SWAP)
//!       ├── VerifiedMap                exact → heuristic layout, embed, route,
//!       │                              swap-equivalence, constraint check
//!       └── VerifiedOptimize (post)
//!       │
//!       ▼
//! Output Circuit
//! ```
//!
//! Engine objects are owned by typed handles and released exactly once, on
//! success and on error. The pass manager audits the engine after each run
//! and reports leaked objects as [`CompileError::ResourceLeak`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use veriq_adapter_native::NativeEngine;
//! use veriq_compile::{PassManagerBuilder, PipelineConfig};
//! use veriq_engine::EngineSession;
//! use veriq_ir::{Circuit, QubitId};
//! use veriq_route::{CouplingMap, HeuristicSolver};
//!
//! let session = EngineSession::new(Arc::new(NativeEngine::new()))?;
//! let config = PipelineConfig::builder()
//!     .post(["cancel_single_qubit_gates"])
//!     .seed(7)
//!     .build()?;
//! let (pm, mut props) =
//!     PassManagerBuilder::from_config(&config, session, Arc::new(HeuristicSolver::new()))
//!         .with_coupling_map(CouplingMap::linear(3))
//!         .build();
//!
//! let mut circuit = Circuit::with_size("demo", 2, 0);
//! circuit.h(QubitId(0))?.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
//! pm.run(&mut circuit, &mut props)?;
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use veriq_compile::{CompileResult, Pass, PassKind, PassManager, PropertySet};
//! use veriq_ir::Circuit;
//!
//! struct CountGates;
//!
//! impl Pass for CountGates {
//!     fn name(&self) -> &str { "count_gates" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(circuit.len());
//!         Ok(())
//!     }
//! }
//!
//! let mut pm = PassManager::new();
//! pm.add_pass(CountGates);
//! let mut props = PropertySet::new();
//! pm.run(&mut Circuit::with_size("empty", 1, 0), &mut props).unwrap();
//! assert_eq!(props.get::<usize>(), Some(&0));
//! ```

pub mod chain;
pub mod config;
pub mod device;
pub mod error;
pub mod executor;
pub mod interchange;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod validate;
pub mod verify;

pub use chain::{ChainOutput, ChainSettings, ChainState, ChainTrace, PlacementSource, run_chain};
pub use config::{OptimizationName, PipelineConfig, PipelineConfigBuilder};
pub use device::DeviceGraph;
pub use error::{CompileError, CompileResult, Stage};
pub use executor::{RoutingContext, SkipReason, StepOutcome, StepReport};
pub use interchange::Artifact;
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{Decompose3q, MappingReport, OptimizationLog, VerifiedMap, VerifiedOptimize};
pub use property::PropertySet;
pub use validate::{is_supported_gate, validate};
pub use verify::{enforce_constraints, layout_to_permutation, verify_mapping};
