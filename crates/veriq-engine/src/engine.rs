//! The verification engine trait.

use std::path::Path;

use crate::error::EngineResult;
use crate::handle::RawHandle;
use crate::ops::{GateCount, Topology, Transform};

/// A verified circuit transformation engine.
///
/// Engines own their objects (circuits, layouts, graphs) and hand out
/// [`RawHandle`]s. Callers normally go through the typed handles in
/// [`crate::handle`], which release on drop.
///
/// | group | methods |
/// |---|---|
/// | I/O | `read_qasm`, `write_qasm` |
/// | counts | `count`, `count_clifford_rzq`, `total_gate_count` |
/// | checks | `check_well_typed`, `check_layout`, `check_graph`, `check_constraints` |
/// | rewriting | `transform`, `decompose_swaps` |
/// | layouts | `trivial_layout`, `list_to_layout`, `layout_to_list` |
/// | graphs | `graph_from_edges`, `make_topology` |
/// | mapping | `check_swap_equivalence`, `simple_map` |
/// | lifetime | `release`, `live_handles` |
///
/// # Ownership
///
/// `transform`, `decompose_swaps` and `simple_map` consume their circuit
/// (and, for `simple_map`, layout) argument whether or not they succeed.
/// The returned handles are new objects owned by the caller.
pub trait VerificationEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Read an interchange file. Returns the circuit and its qubit count.
    fn read_qasm(&self, path: &Path) -> EngineResult<(RawHandle, u32)>;

    /// Write a circuit over `num_qubits` qubits to an interchange file.
    fn write_qasm(&self, circ: RawHandle, num_qubits: u32, path: &Path) -> EngineResult<()>;

    fn count(&self, circ: RawHandle, kind: GateCount) -> EngineResult<usize>;

    fn count_clifford_rzq(&self, circ: RawHandle) -> EngineResult<usize>;

    fn total_gate_count(&self, circ: RawHandle) -> EngineResult<usize>;

    /// Whether every operand of `circ` is below `num_qubits`.
    fn check_well_typed(&self, circ: RawHandle, num_qubits: u32) -> EngineResult<bool>;

    /// Apply a named transformation. Consumes `circ`.
    fn transform(&self, circ: RawHandle, op: Transform) -> EngineResult<RawHandle>;

    fn trivial_layout(&self, size: u32) -> EngineResult<RawHandle>;

    /// Build a layout from `list[physical] = logical`. Fails unless the list
    /// is a bijection on `0..list.len()`.
    fn list_to_layout(&self, list: &[u32]) -> EngineResult<RawHandle>;

    fn layout_to_list(&self, layout: RawHandle, size: u32) -> EngineResult<Vec<u32>>;

    fn check_layout(&self, layout: RawHandle, size: u32) -> EngineResult<bool>;

    fn graph_from_edges(&self, num_qubits: u32, edges: &[(u32, u32)]) -> EngineResult<RawHandle>;

    fn make_topology(&self, topology: Topology) -> EngineResult<RawHandle>;

    fn check_graph(&self, graph: RawHandle) -> EngineResult<bool>;

    /// Replace SWAPs with CX triples oriented along graph edges. Consumes `circ`.
    fn decompose_swaps(&self, circ: RawHandle, graph: RawHandle) -> EngineResult<RawHandle>;

    /// Whether every two-qubit gate of `circ` acts on an edge of `graph`.
    fn check_constraints(&self, circ: RawHandle, graph: RawHandle) -> EngineResult<bool>;

    /// Whether `c1` under `l1` equals `c2` under `l2` up to the qubit
    /// permutation introduced by SWAP gates.
    fn check_swap_equivalence(
        &self,
        c1: RawHandle,
        l1: RawHandle,
        c2: RawHandle,
        l2: RawHandle,
    ) -> EngineResult<bool>;

    /// Route `circ` on `graph` from `layout`. Consumes `circ` and `layout`;
    /// returns the mapped circuit and the final layout.
    fn simple_map(
        &self,
        circ: RawHandle,
        layout: RawHandle,
        graph: RawHandle,
    ) -> EngineResult<(RawHandle, RawHandle)>;

    /// Free an object. Unknown handles are ignored.
    fn release(&self, handle: RawHandle);

    /// Number of objects currently alive.
    fn live_handles(&self) -> usize;
}
