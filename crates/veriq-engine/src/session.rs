//! Typed entry point onto an engine.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::engine::VerificationEngine;
use crate::error::EngineResult;
use crate::handle::{CircuitHandle, GraphHandle, LayoutHandle};
use crate::ops::Topology;
use crate::runtime;

/// A shared engine with a typed, handle-owning API.
///
/// Creating a session initializes the process-wide runtime if needed.
#[derive(Clone)]
pub struct EngineSession {
    engine: Arc<dyn VerificationEngine>,
}

impl EngineSession {
    pub fn new(engine: Arc<dyn VerificationEngine>) -> EngineResult<Self> {
        runtime::initialize()?;
        debug!("Opened engine session on {}", engine.name());
        Ok(Self { engine })
    }

    pub fn engine(&self) -> &Arc<dyn VerificationEngine> {
        &self.engine
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Read an interchange file into a new circuit.
    pub fn read_qasm(&self, path: &Path) -> EngineResult<CircuitHandle> {
        let (raw, n) = self.engine.read_qasm(path)?;
        Ok(CircuitHandle::from_raw(Arc::clone(&self.engine), raw, n))
    }

    pub fn trivial_layout(&self, size: u32) -> EngineResult<LayoutHandle> {
        let raw = self.engine.trivial_layout(size)?;
        Ok(LayoutHandle::from_raw(Arc::clone(&self.engine), raw, size))
    }

    /// Build a layout from `list[physical] = logical`.
    pub fn list_to_layout(&self, list: &[u32]) -> EngineResult<LayoutHandle> {
        let raw = self.engine.list_to_layout(list)?;
        let size = u32::try_from(list.len()).unwrap_or(u32::MAX);
        Ok(LayoutHandle::from_raw(Arc::clone(&self.engine), raw, size))
    }

    pub fn graph_from_edges(&self, num_qubits: u32, edges: &[(u32, u32)]) -> EngineResult<GraphHandle> {
        let raw = self.engine.graph_from_edges(num_qubits, edges)?;
        Ok(GraphHandle::from_raw(Arc::clone(&self.engine), raw, num_qubits))
    }

    pub fn make_topology(&self, topology: Topology) -> EngineResult<GraphHandle> {
        let raw = self.engine.make_topology(topology)?;
        Ok(GraphHandle::from_raw(
            Arc::clone(&self.engine),
            raw,
            topology.num_qubits(),
        ))
    }

    /// Whether `c1` under `l1` and `c2` under `l2` are equivalent up to the
    /// permutation introduced by SWAPs.
    pub fn check_swap_equivalence(
        &self,
        c1: &CircuitHandle,
        l1: &LayoutHandle,
        c2: &CircuitHandle,
        l2: &LayoutHandle,
    ) -> EngineResult<bool> {
        self.engine
            .check_swap_equivalence(c1.raw(), l1.raw(), c2.raw(), l2.raw())
    }

    /// Number of engine objects currently alive.
    pub fn live_handles(&self) -> usize {
        self.engine.live_handles()
    }
}

impl fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("engine", &self.engine.name())
            .field("live_handles", &self.engine.live_handles())
            .finish()
    }
}
