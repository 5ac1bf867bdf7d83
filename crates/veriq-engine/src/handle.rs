//! Opaque engine handles.
//!
//! [`RawHandle`] is the untyped token an engine hands out. The typed wrappers
//! [`CircuitHandle`], [`LayoutHandle`] and [`GraphHandle`] own exactly one raw
//! handle each and release it when dropped. They cannot be cloned; operations
//! that consume an engine object take the wrapper by value.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

use tracing::debug;

use crate::engine::VerificationEngine;
use crate::error::EngineResult;
use crate::ops::{GateCount, Transform};

/// Untyped engine object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(NonZeroU64);

impl RawHandle {
    /// Create a raw handle from a non-zero id.
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(RawHandle)
    }

    /// The numeric id.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of object behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Circuit,
    Layout,
    Graph,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Circuit => write!(f, "circuit"),
            HandleKind::Layout => write!(f, "layout"),
            HandleKind::Graph => write!(f, "graph"),
        }
    }
}

/// One engine object, released on drop unless disarmed.
struct Owned {
    engine: Arc<dyn VerificationEngine>,
    raw: RawHandle,
    kind: HandleKind,
    armed: bool,
}

impl Owned {
    fn new(engine: Arc<dyn VerificationEngine>, raw: RawHandle, kind: HandleKind) -> Self {
        Self {
            engine,
            raw,
            kind,
            armed: true,
        }
    }

    /// Give up ownership without releasing; the caller passes the raw handle on.
    fn disarm(mut self) -> (Arc<dyn VerificationEngine>, RawHandle) {
        self.armed = false;
        (Arc::clone(&self.engine), self.raw)
    }
}

impl Drop for Owned {
    fn drop(&mut self) {
        if self.armed {
            debug!("Releasing {} handle {}", self.kind, self.raw);
            self.engine.release(self.raw);
        }
    }
}

impl fmt::Debug for Owned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("engine", &self.engine.name())
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .finish()
    }
}

/// An engine circuit with a fixed qubit count.
#[derive(Debug)]
pub struct CircuitHandle {
    inner: Owned,
    num_qubits: u32,
}

impl CircuitHandle {
    /// Take ownership of a raw circuit handle.
    pub fn from_raw(engine: Arc<dyn VerificationEngine>, raw: RawHandle, num_qubits: u32) -> Self {
        Self {
            inner: Owned::new(engine, raw, HandleKind::Circuit),
            num_qubits,
        }
    }

    /// Give up ownership of the raw handle without releasing it.
    pub fn into_raw(self) -> RawHandle {
        self.inner.disarm().1
    }

    /// The raw handle, still owned by `self`.
    pub fn raw(&self) -> RawHandle {
        self.inner.raw
    }

    /// Qubit count bound to this circuit.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Apply a transformation. The input is consumed even when the engine fails.
    pub fn transform(self, op: Transform) -> EngineResult<CircuitHandle> {
        let n = self.num_qubits;
        let (engine, raw) = self.inner.disarm();
        let out = engine.transform(raw, op)?;
        Ok(CircuitHandle::from_raw(engine, out, n))
    }

    /// Replace every SWAP with three CX gates oriented along `graph`.
    pub fn decompose_swaps(self, graph: &GraphHandle) -> EngineResult<CircuitHandle> {
        let n = self.num_qubits;
        let (engine, raw) = self.inner.disarm();
        let out = engine.decompose_swaps(raw, graph.raw())?;
        Ok(CircuitHandle::from_raw(engine, out, n))
    }

    /// Engine-side greedy routing. Consumes the circuit and the layout and
    /// returns the physically indexed circuit with the final layout.
    pub fn simple_map(
        self,
        layout: LayoutHandle,
        graph: &GraphHandle,
    ) -> EngineResult<(CircuitHandle, LayoutHandle)> {
        let n = graph.num_qubits();
        let (engine, raw) = self.inner.disarm();
        let layout_raw = layout.into_raw();
        let (circ, final_layout) = engine.simple_map(raw, layout_raw, graph.raw())?;
        Ok((
            CircuitHandle::from_raw(Arc::clone(&engine), circ, n),
            LayoutHandle::from_raw(engine, final_layout, n),
        ))
    }

    /// Write the circuit to an interchange file.
    pub fn write_qasm(&self, path: &std::path::Path) -> EngineResult<()> {
        self.inner.engine.write_qasm(self.raw(), self.num_qubits, path)
    }

    /// Count gates of one kind.
    pub fn count(&self, kind: GateCount) -> EngineResult<usize> {
        self.inner.engine.count(self.raw(), kind)
    }

    /// Counts of every kind, with zero entries omitted.
    pub fn gate_counts(&self) -> EngineResult<Vec<(GateCount, usize)>> {
        let mut counts = Vec::new();
        for kind in GateCount::ALL {
            let n = self.count(kind)?;
            if n > 0 {
                counts.push((kind, n));
            }
        }
        Ok(counts)
    }

    /// Number of gates.
    pub fn total_gate_count(&self) -> EngineResult<usize> {
        self.inner.engine.total_gate_count(self.raw())
    }

    /// Number of `rzq` gates whose angle is a multiple of pi/2.
    pub fn count_clifford_rzq(&self) -> EngineResult<usize> {
        self.inner.engine.count_clifford_rzq(self.raw())
    }

    /// Every operand is below `n`.
    pub fn is_well_typed(&self, n: u32) -> EngineResult<bool> {
        self.inner.engine.check_well_typed(self.raw(), n)
    }

    /// Every two-qubit gate lies on an edge of `graph`.
    pub fn satisfies_constraints(&self, graph: &GraphHandle) -> EngineResult<bool> {
        self.inner.engine.check_constraints(self.raw(), graph.raw())
    }
}

/// An engine layout, a bijection over `0..size`.
#[derive(Debug)]
pub struct LayoutHandle {
    inner: Owned,
    size: u32,
}

impl LayoutHandle {
    /// Take ownership of a raw layout handle.
    pub fn from_raw(engine: Arc<dyn VerificationEngine>, raw: RawHandle, size: u32) -> Self {
        Self {
            inner: Owned::new(engine, raw, HandleKind::Layout),
            size,
        }
    }

    /// Give up ownership of the raw handle without releasing it.
    pub fn into_raw(self) -> RawHandle {
        self.inner.disarm().1
    }

    pub fn raw(&self) -> RawHandle {
        self.inner.raw
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Flat list, `list[physical] = logical`.
    pub fn to_list(&self) -> EngineResult<Vec<u32>> {
        self.inner.engine.layout_to_list(self.raw(), self.size)
    }

    pub fn is_well_formed(&self) -> EngineResult<bool> {
        self.inner.engine.check_layout(self.raw(), self.size)
    }
}

/// An engine connectivity graph.
#[derive(Debug)]
pub struct GraphHandle {
    inner: Owned,
    num_qubits: u32,
}

impl GraphHandle {
    /// Take ownership of a raw graph handle.
    pub fn from_raw(engine: Arc<dyn VerificationEngine>, raw: RawHandle, num_qubits: u32) -> Self {
        Self {
            inner: Owned::new(engine, raw, HandleKind::Graph),
            num_qubits,
        }
    }

    /// Give up ownership of the raw handle without releasing it.
    pub fn into_raw(self) -> RawHandle {
        self.inner.disarm().1
    }

    pub fn raw(&self) -> RawHandle {
        self.inner.raw
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn is_well_formed(&self) -> EngineResult<bool> {
        self.inner.engine.check_graph(self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_handle_nonzero() {
        assert!(RawHandle::new(0).is_none());
        let h = RawHandle::new(7).unwrap();
        assert_eq!(h.get(), 7);
        assert_eq!(h.to_string(), "#7");
    }

    #[test]
    fn test_handle_kind_display() {
        assert_eq!(HandleKind::Circuit.to_string(), "circuit");
        assert_eq!(HandleKind::Graph.to_string(), "graph");
    }
}
