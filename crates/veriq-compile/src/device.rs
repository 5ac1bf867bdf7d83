//! The engine-side connectivity graph of the target device.

use tracing::debug;
use veriq_engine::{EngineSession, GraphHandle, Topology};
use veriq_route::CouplingMap;

use crate::error::{CompileError, CompileResult};

/// A coupling map together with the engine graph built from it.
///
/// The graph is created once per device and reused across runs. Replacing
/// the device releases the old graph before the new one is built.
#[derive(Debug)]
pub struct DeviceGraph {
    coupling: CouplingMap,
    handle: Option<GraphHandle>,
}

impl DeviceGraph {
    pub fn new(session: &EngineSession, coupling: CouplingMap) -> CompileResult<Self> {
        let handle = session.graph_from_edges(coupling.num_qubits(), coupling.edges())?;
        Ok(Self {
            coupling,
            handle: Some(handle),
        })
    }

    /// Build from a named topology via the engine's own constructor.
    pub fn from_topology(session: &EngineSession, topology: Topology) -> CompileResult<Self> {
        let coupling = CouplingMap::from_edges(topology.num_qubits(), &topology.edges())?;
        let handle = session.make_topology(topology)?;
        Ok(Self {
            coupling,
            handle: Some(handle),
        })
    }

    /// Switch to another device. The current graph is released first.
    pub fn replace(&mut self, session: &EngineSession, coupling: CouplingMap) -> CompileResult<()> {
        if let Some(old) = self.handle.take() {
            debug!("Releasing device graph {}", old.raw());
        }
        self.handle = Some(session.graph_from_edges(coupling.num_qubits(), coupling.edges())?);
        self.coupling = coupling;
        Ok(())
    }

    pub fn coupling(&self) -> &CouplingMap {
        &self.coupling
    }

    pub fn handle(&self) -> CompileResult<&GraphHandle> {
        self.handle.as_ref().ok_or(CompileError::MissingCouplingMap)
    }

    /// Engine objects held by this graph.
    pub fn live_handles(&self) -> usize {
        usize::from(self.handle.is_some())
    }
}
