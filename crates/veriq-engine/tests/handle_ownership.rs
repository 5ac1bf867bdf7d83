//! Release-exactly-once behaviour of typed handles, checked against a
//! bookkeeping fake engine.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use veriq_engine::{
    EngineError, EngineResult, EngineSession, GateCount, RawHandle, Topology, Transform,
    VerificationEngine,
};

#[derive(Default)]
struct Ledger {
    next: u64,
    live: BTreeSet<u64>,
    released: Vec<u64>,
}

#[derive(Default)]
struct FakeEngine {
    ledger: Mutex<Ledger>,
    fail_transforms: bool,
}

impl FakeEngine {
    fn alloc(&self) -> RawHandle {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.next += 1;
        let id = ledger.next;
        ledger.live.insert(id);
        RawHandle::new(id).unwrap()
    }

    fn released(&self) -> Vec<u64> {
        self.ledger.lock().unwrap().released.clone()
    }
}

impl VerificationEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }
    fn read_qasm(&self, _path: &Path) -> EngineResult<(RawHandle, u32)> {
        Ok((self.alloc(), 3))
    }
    fn write_qasm(&self, _c: RawHandle, _n: u32, _p: &Path) -> EngineResult<()> {
        Ok(())
    }
    fn count(&self, _c: RawHandle, kind: GateCount) -> EngineResult<usize> {
        Ok(usize::from(kind == GateCount::CX))
    }
    fn count_clifford_rzq(&self, _c: RawHandle) -> EngineResult<usize> {
        Ok(0)
    }
    fn total_gate_count(&self, _c: RawHandle) -> EngineResult<usize> {
        Ok(1)
    }
    fn check_well_typed(&self, _c: RawHandle, _n: u32) -> EngineResult<bool> {
        Ok(true)
    }
    fn transform(&self, circ: RawHandle, op: Transform) -> EngineResult<RawHandle> {
        self.release(circ);
        if self.fail_transforms {
            return Err(EngineError::UnknownTransform(op.name().to_string()));
        }
        Ok(self.alloc())
    }
    fn trivial_layout(&self, _size: u32) -> EngineResult<RawHandle> {
        Ok(self.alloc())
    }
    fn list_to_layout(&self, _list: &[u32]) -> EngineResult<RawHandle> {
        Ok(self.alloc())
    }
    fn layout_to_list(&self, _l: RawHandle, size: u32) -> EngineResult<Vec<u32>> {
        Ok((0..size).collect())
    }
    fn check_layout(&self, _l: RawHandle, _size: u32) -> EngineResult<bool> {
        Ok(true)
    }
    fn graph_from_edges(&self, _n: u32, _e: &[(u32, u32)]) -> EngineResult<RawHandle> {
        Ok(self.alloc())
    }
    fn make_topology(&self, _t: Topology) -> EngineResult<RawHandle> {
        Ok(self.alloc())
    }
    fn check_graph(&self, _g: RawHandle) -> EngineResult<bool> {
        Ok(true)
    }
    fn decompose_swaps(&self, circ: RawHandle, _g: RawHandle) -> EngineResult<RawHandle> {
        self.release(circ);
        Ok(self.alloc())
    }
    fn check_constraints(&self, _c: RawHandle, _g: RawHandle) -> EngineResult<bool> {
        Ok(true)
    }
    fn check_swap_equivalence(
        &self,
        _c1: RawHandle,
        _l1: RawHandle,
        _c2: RawHandle,
        _l2: RawHandle,
    ) -> EngineResult<bool> {
        Ok(true)
    }
    fn simple_map(
        &self,
        circ: RawHandle,
        layout: RawHandle,
        _g: RawHandle,
    ) -> EngineResult<(RawHandle, RawHandle)> {
        self.release(circ);
        self.release(layout);
        Ok((self.alloc(), self.alloc()))
    }
    fn release(&self, handle: RawHandle) {
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.live.remove(&handle.get()) {
            ledger.released.push(handle.get());
        } else {
            panic!("handle {handle} released twice");
        }
    }
    fn live_handles(&self) -> usize {
        self.ledger.lock().unwrap().live.len()
    }
}

fn session(engine: &Arc<FakeEngine>) -> EngineSession {
    EngineSession::new(Arc::clone(engine) as Arc<dyn VerificationEngine>).unwrap()
}

#[test]
fn test_drop_releases_once() {
    let engine = Arc::new(FakeEngine::default());
    let s = session(&engine);
    {
        let _c = s.read_qasm(Path::new("unused.qasm")).unwrap();
        let _g = s.make_topology(Topology::Lnn(3)).unwrap();
        assert_eq!(s.live_handles(), 2);
    }
    assert_eq!(s.live_handles(), 0);
    assert_eq!(engine.released().len(), 2);
}

#[test]
fn test_transform_chain_leaves_only_result() {
    let engine = Arc::new(FakeEngine::default());
    let s = session(&engine);
    let c = s.read_qasm(Path::new("unused.qasm")).unwrap();
    let c = c.transform(Transform::NotPropagation).unwrap();
    let c = c.transform(Transform::ReplaceRzq).unwrap();
    assert_eq!(c.num_qubits(), 3);
    assert_eq!(s.live_handles(), 1);
    drop(c);
    assert_eq!(s.live_handles(), 0);
}

#[test]
fn test_failed_transform_does_not_double_release() {
    let engine = Arc::new(FakeEngine {
        fail_transforms: true,
        ..FakeEngine::default()
    });
    let s = session(&engine);
    let c = s.read_qasm(Path::new("unused.qasm")).unwrap();
    assert!(c.transform(Transform::Optimize).is_err());
    assert_eq!(s.live_handles(), 0);
    assert_eq!(engine.released(), vec![1]);
}

#[test]
fn test_simple_map_consumes_circuit_and_layout() {
    let engine = Arc::new(FakeEngine::default());
    let s = session(&engine);
    let g = s.make_topology(Topology::Lnn(4)).unwrap();
    let c = s.read_qasm(Path::new("unused.qasm")).unwrap();
    let l = s.trivial_layout(4).unwrap();
    let (c, l) = c.simple_map(l, &g).unwrap();
    assert_eq!(c.num_qubits(), 4);
    assert_eq!(l.to_list().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(s.live_handles(), 3);
}

#[test]
fn test_into_raw_skips_release() {
    let engine = Arc::new(FakeEngine::default());
    let s = session(&engine);
    let c = s.read_qasm(Path::new("unused.qasm")).unwrap();
    let raw = c.into_raw();
    assert_eq!(s.live_handles(), 1);
    engine.release(raw);
    assert_eq!(s.live_handles(), 0);
}

#[test]
fn test_gate_counts_omit_zero() {
    let engine = Arc::new(FakeEngine::default());
    let s = session(&engine);
    let c = s.read_qasm(Path::new("unused.qasm")).unwrap();
    assert_eq!(c.gate_counts().unwrap(), vec![(GateCount::CX, 1)]);
}
