//! Native engine implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};
use veriq_engine::{
    EngineError, EngineResult, GateCount, RawHandle, Topology, Transform, VerificationEngine,
    runtime,
};

use crate::arena::{Arena, Graph, Object, is_bijection};
use crate::mapping;
use crate::program::Program;
use crate::rewrite;

/// In-process verification engine.
///
/// Objects live in an arena guarded by a mutex, so one engine can be shared
/// behind an `Arc` by several sessions.
#[derive(Debug)]
pub struct NativeEngine {
    name: String,
    arena: Mutex<Arena>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self {
            name: "native".to_string(),
            arena: Mutex::new(Arena::default()),
        }
    }

    fn arena(&self) -> EngineResult<MutexGuard<'_, Arena>> {
        runtime::ensure_ready()?;
        Ok(self.arena.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationEngine for NativeEngine {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self))]
    fn read_qasm(&self, path: &Path) -> EngineResult<(RawHandle, u32)> {
        runtime::ensure_ready()?;
        let source = std::fs::read_to_string(path)?;
        let circuit = veriq_qasm::parse(&source)
            .map_err(|e| EngineError::Interchange(format!("{}: {e}", path.display())))?;
        let program = Program::from_circuit(&circuit)?;
        let n = program.num_qubits;
        debug!("Read {} gates on {} qubits", program.ops.len(), n);
        Ok((self.arena()?.insert(Object::Circuit(program)), n))
    }

    #[instrument(skip(self))]
    fn write_qasm(&self, circ: RawHandle, num_qubits: u32, path: &Path) -> EngineResult<()> {
        let circuit = self.arena()?.circuit(circ)?.to_circuit(num_qubits)?;
        std::fs::write(path, veriq_qasm::emit(&circuit))?;
        Ok(())
    }

    fn count(&self, circ: RawHandle, kind: GateCount) -> EngineResult<usize> {
        Ok(self.arena()?.circuit(circ)?.count(kind))
    }

    fn count_clifford_rzq(&self, circ: RawHandle) -> EngineResult<usize> {
        Ok(self.arena()?.circuit(circ)?.count_clifford_rzq())
    }

    fn total_gate_count(&self, circ: RawHandle) -> EngineResult<usize> {
        Ok(self.arena()?.circuit(circ)?.ops.len())
    }

    fn check_well_typed(&self, circ: RawHandle, num_qubits: u32) -> EngineResult<bool> {
        Ok(self.arena()?.circuit(circ)?.well_typed(num_qubits))
    }

    #[instrument(skip(self))]
    fn transform(&self, circ: RawHandle, op: Transform) -> EngineResult<RawHandle> {
        let mut arena = self.arena()?;
        let program = arena.take_circuit(circ)?;
        let program = rewrite::apply(program, op);
        Ok(arena.insert(Object::Circuit(program)))
    }

    fn trivial_layout(&self, size: u32) -> EngineResult<RawHandle> {
        Ok(self.arena()?.insert(Object::Layout((0..size).collect())))
    }

    fn list_to_layout(&self, list: &[u32]) -> EngineResult<RawHandle> {
        let mut arena = self.arena()?;
        if !is_bijection(list) {
            return Err(EngineError::NotABijection(format!("{list:?}")));
        }
        Ok(arena.insert(Object::Layout(list.to_vec())))
    }

    fn layout_to_list(&self, layout: RawHandle, size: u32) -> EngineResult<Vec<u32>> {
        let arena = self.arena()?;
        let list = arena.layout(layout)?;
        if list.len() != size as usize {
            return Err(EngineError::SizeMismatch(format!(
                "layout has {} entries, expected {size}",
                list.len()
            )));
        }
        Ok(list.to_vec())
    }

    fn check_layout(&self, layout: RawHandle, size: u32) -> EngineResult<bool> {
        let arena = self.arena()?;
        let list = arena.layout(layout)?;
        Ok(list.len() == size as usize && is_bijection(list))
    }

    fn graph_from_edges(&self, num_qubits: u32, edges: &[(u32, u32)]) -> EngineResult<RawHandle> {
        let graph = Graph::new(num_qubits, edges)?;
        Ok(self.arena()?.insert(Object::Graph(graph)))
    }

    fn make_topology(&self, topology: Topology) -> EngineResult<RawHandle> {
        if topology.num_qubits() == 0 {
            return Err(EngineError::UnknownTopology(topology.to_string()));
        }
        self.graph_from_edges(topology.num_qubits(), &topology.edges())
    }

    fn check_graph(&self, graph: RawHandle) -> EngineResult<bool> {
        Ok(self.arena()?.graph(graph)?.is_well_formed())
    }

    #[instrument(skip(self))]
    fn decompose_swaps(&self, circ: RawHandle, graph: RawHandle) -> EngineResult<RawHandle> {
        let mut arena = self.arena()?;
        let program = arena.take_circuit(circ)?;
        let g = arena.graph(graph)?;
        let ops = rewrite::decompose_swaps(program.ops, |a, b| g.has_directed(a, b));
        let out = Program {
            num_qubits: program.num_qubits,
            ops,
        };
        Ok(arena.insert(Object::Circuit(out)))
    }

    fn check_constraints(&self, circ: RawHandle, graph: RawHandle) -> EngineResult<bool> {
        let arena = self.arena()?;
        Ok(mapping::satisfies_constraints(
            arena.circuit(circ)?,
            arena.graph(graph)?,
        ))
    }

    #[instrument(skip(self))]
    fn check_swap_equivalence(
        &self,
        c1: RawHandle,
        l1: RawHandle,
        c2: RawHandle,
        l2: RawHandle,
    ) -> EngineResult<bool> {
        let arena = self.arena()?;
        let equivalent = mapping::swap_equivalent(
            arena.circuit(c1)?,
            arena.layout(l1)?,
            arena.circuit(c2)?,
            arena.layout(l2)?,
        )?;
        debug!("Swap equivalence: {}", equivalent);
        Ok(equivalent)
    }

    #[instrument(skip(self))]
    fn simple_map(
        &self,
        circ: RawHandle,
        layout: RawHandle,
        graph: RawHandle,
    ) -> EngineResult<(RawHandle, RawHandle)> {
        let mut arena = self.arena()?;
        let program = arena.take_circuit(circ);
        let list = arena.take_layout(layout);
        let (mapped, final_layout) = mapping::simple_map(program?, list?, arena.graph(graph)?)?;
        let c = arena.insert(Object::Circuit(mapped));
        let l = arena.insert(Object::Layout(final_layout));
        Ok((c, l))
    }

    fn release(&self, handle: RawHandle) {
        let mut arena = self.arena.lock().unwrap_or_else(PoisonError::into_inner);
        if !arena.remove(handle) {
            warn!("Release of unknown handle {}", handle);
        }
    }

    fn live_handles(&self) -> usize {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
