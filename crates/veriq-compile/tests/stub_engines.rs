//! Failure paths of the pipeline, observed through stub engines and solvers.

use std::path::Path;
use std::sync::{Arc, Mutex};

use veriq_adapter_native::NativeEngine;
use veriq_compile::{
    ChainState, CompileError, MappingReport, PassManagerBuilder, PipelineConfig, PlacementSource,
    Stage,
};
use veriq_engine::{
    EngineError, EngineResult, EngineSession, GateCount, RawHandle, Topology, Transform,
    VerificationEngine,
};
use veriq_ir::{Circuit, ClbitId, QubitId};
use veriq_route::{
    CouplingMap, ExactLimits, ExactOutcome, ExactStatus, HeuristicSolver, LayoutMethod,
    MappingSolver, Placement, RegisterLayout, RouteResult, RoutedCircuit, RoutingMethod,
    SolverParams,
};

/// Records every operation and fails all of them. Bookkeeping queries
/// (`name`, `live_handles`) are not recorded.
#[derive(Default)]
struct RecordingEngine {
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingEngine {
    fn record<T>(&self, op: &'static str) -> EngineResult<T> {
        self.calls.lock().unwrap().push(op);
        Err(EngineError::UnsupportedGate(op.to_string()))
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl VerificationEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }
    fn read_qasm(&self, _path: &Path) -> EngineResult<(RawHandle, u32)> {
        self.record("read_qasm")
    }
    fn write_qasm(&self, _c: RawHandle, _n: u32, _p: &Path) -> EngineResult<()> {
        self.record("write_qasm")
    }
    fn count(&self, _c: RawHandle, _k: GateCount) -> EngineResult<usize> {
        self.record("count")
    }
    fn count_clifford_rzq(&self, _c: RawHandle) -> EngineResult<usize> {
        self.record("count_clifford_rzq")
    }
    fn total_gate_count(&self, _c: RawHandle) -> EngineResult<usize> {
        self.record("total_gate_count")
    }
    fn check_well_typed(&self, _c: RawHandle, _n: u32) -> EngineResult<bool> {
        self.record("check_well_typed")
    }
    fn transform(&self, _c: RawHandle, _op: Transform) -> EngineResult<RawHandle> {
        self.record("transform")
    }
    fn trivial_layout(&self, _size: u32) -> EngineResult<RawHandle> {
        self.record("trivial_layout")
    }
    fn list_to_layout(&self, _list: &[u32]) -> EngineResult<RawHandle> {
        self.record("list_to_layout")
    }
    fn layout_to_list(&self, _l: RawHandle, _size: u32) -> EngineResult<Vec<u32>> {
        self.record("layout_to_list")
    }
    fn check_layout(&self, _l: RawHandle, _size: u32) -> EngineResult<bool> {
        self.record("check_layout")
    }
    fn graph_from_edges(&self, _n: u32, _edges: &[(u32, u32)]) -> EngineResult<RawHandle> {
        self.record("graph_from_edges")
    }
    fn make_topology(&self, _t: Topology) -> EngineResult<RawHandle> {
        self.record("make_topology")
    }
    fn check_graph(&self, _g: RawHandle) -> EngineResult<bool> {
        self.record("check_graph")
    }
    fn decompose_swaps(&self, _c: RawHandle, _g: RawHandle) -> EngineResult<RawHandle> {
        self.record("decompose_swaps")
    }
    fn check_constraints(&self, _c: RawHandle, _g: RawHandle) -> EngineResult<bool> {
        self.record("check_constraints")
    }
    fn check_swap_equivalence(
        &self,
        _c1: RawHandle,
        _l1: RawHandle,
        _c2: RawHandle,
        _l2: RawHandle,
    ) -> EngineResult<bool> {
        self.record("check_swap_equivalence")
    }
    fn simple_map(
        &self,
        _c: RawHandle,
        _l: RawHandle,
        _g: RawHandle,
    ) -> EngineResult<(RawHandle, RawHandle)> {
        self.record("simple_map")
    }
    fn release(&self, _handle: RawHandle) {
        self.calls.lock().unwrap().push("release");
    }
    fn live_handles(&self) -> usize {
        0
    }
}

/// The native engine, except that no mapping is ever equivalent.
#[derive(Default)]
struct DisagreeingEngine {
    inner: NativeEngine,
    compared: Mutex<Vec<RawHandle>>,
    released: Mutex<Vec<RawHandle>>,
    layout_sizes: Mutex<Vec<u32>>,
}

impl VerificationEngine for DisagreeingEngine {
    fn name(&self) -> &str {
        "disagreeing"
    }
    fn read_qasm(&self, path: &Path) -> EngineResult<(RawHandle, u32)> {
        self.inner.read_qasm(path)
    }
    fn write_qasm(&self, c: RawHandle, n: u32, p: &Path) -> EngineResult<()> {
        self.inner.write_qasm(c, n, p)
    }
    fn count(&self, c: RawHandle, k: GateCount) -> EngineResult<usize> {
        self.inner.count(c, k)
    }
    fn count_clifford_rzq(&self, c: RawHandle) -> EngineResult<usize> {
        self.inner.count_clifford_rzq(c)
    }
    fn total_gate_count(&self, c: RawHandle) -> EngineResult<usize> {
        self.inner.total_gate_count(c)
    }
    fn check_well_typed(&self, c: RawHandle, n: u32) -> EngineResult<bool> {
        self.inner.check_well_typed(c, n)
    }
    fn transform(&self, c: RawHandle, op: Transform) -> EngineResult<RawHandle> {
        self.inner.transform(c, op)
    }
    fn trivial_layout(&self, size: u32) -> EngineResult<RawHandle> {
        self.layout_sizes.lock().unwrap().push(size);
        self.inner.trivial_layout(size)
    }
    fn list_to_layout(&self, list: &[u32]) -> EngineResult<RawHandle> {
        self.inner.list_to_layout(list)
    }
    fn layout_to_list(&self, l: RawHandle, size: u32) -> EngineResult<Vec<u32>> {
        self.inner.layout_to_list(l, size)
    }
    fn check_layout(&self, l: RawHandle, size: u32) -> EngineResult<bool> {
        self.inner.check_layout(l, size)
    }
    fn graph_from_edges(&self, n: u32, edges: &[(u32, u32)]) -> EngineResult<RawHandle> {
        self.inner.graph_from_edges(n, edges)
    }
    fn make_topology(&self, t: Topology) -> EngineResult<RawHandle> {
        self.inner.make_topology(t)
    }
    fn check_graph(&self, g: RawHandle) -> EngineResult<bool> {
        self.inner.check_graph(g)
    }
    fn decompose_swaps(&self, c: RawHandle, g: RawHandle) -> EngineResult<RawHandle> {
        self.inner.decompose_swaps(c, g)
    }
    fn check_constraints(&self, c: RawHandle, g: RawHandle) -> EngineResult<bool> {
        self.inner.check_constraints(c, g)
    }
    fn check_swap_equivalence(
        &self,
        _c1: RawHandle,
        _l1: RawHandle,
        c2: RawHandle,
        _l2: RawHandle,
    ) -> EngineResult<bool> {
        self.compared.lock().unwrap().push(c2);
        Ok(false)
    }
    fn simple_map(
        &self,
        c: RawHandle,
        l: RawHandle,
        g: RawHandle,
    ) -> EngineResult<(RawHandle, RawHandle)> {
        self.inner.simple_map(c, l, g)
    }
    fn release(&self, handle: RawHandle) {
        self.released.lock().unwrap().push(handle);
        self.inner.release(handle);
    }
    fn live_handles(&self) -> usize {
        self.inner.live_handles()
    }
}

/// The in-process solver with scripted deviations.
#[derive(Default)]
struct ScriptedSolver {
    inner: HeuristicSolver,
    exact: Option<ExactStatus>,
    skip_routing: bool,
    drop_last_gate: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedSolver {
    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl MappingSolver for ScriptedSolver {
    fn exact_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        limits: ExactLimits,
    ) -> RouteResult<ExactOutcome> {
        self.record("exact_layout");
        match self.exact {
            Some(status) => Ok(ExactOutcome {
                status,
                placement: None,
            }),
            None => self.inner.exact_layout(circuit, coupling, limits),
        }
    }

    fn heuristic_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: LayoutMethod,
        params: &SolverParams,
    ) -> RouteResult<Placement> {
        self.record("heuristic_layout");
        self.inner.heuristic_layout(circuit, coupling, method, params)
    }

    fn embed(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        placement: &Placement,
    ) -> RouteResult<(Circuit, RegisterLayout)> {
        self.record("embed");
        let (mut embedded, layout) = self.inner.embed(circuit, coupling, placement)?;
        if self.drop_last_gate {
            let mut kept = embedded.instructions().to_vec();
            kept.pop();
            embedded.replace_instructions(kept)?;
        }
        Ok((embedded, layout))
    }

    fn check_map(&self, circuit: &Circuit, coupling: &CouplingMap) -> Option<(u32, u32)> {
        self.record("check_map");
        if self.skip_routing {
            None
        } else {
            self.inner.check_map(circuit, coupling)
        }
    }

    fn route(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: RoutingMethod,
        params: &SolverParams,
    ) -> RouteResult<RoutedCircuit> {
        self.record("route");
        self.inner.route(circuit, coupling, method, params)
    }
}

fn native_session() -> EngineSession {
    EngineSession::new(Arc::new(NativeEngine::new())).unwrap()
}

fn far_cx() -> Circuit {
    let mut circuit = Circuit::with_size("far", 3, 0);
    circuit.h(QubitId(0)).unwrap();
    circuit.cx(QubitId(0), QubitId(2)).unwrap();
    circuit
}

#[test]
fn test_unsupported_gate_never_reaches_engine() {
    let engine = Arc::new(RecordingEngine::default());
    let session = EngineSession::new(engine.clone()).unwrap();
    let config = PipelineConfig::builder().pre(["optimize"]).build().unwrap();
    let (pm, mut props) =
        PassManagerBuilder::from_config(&config, session, Arc::new(HeuristicSolver::new()))
            .build();

    let mut circuit = Circuit::with_size("m", 1, 1);
    circuit.h(QubitId(0)).unwrap();
    circuit.measure(QubitId(0), ClbitId(0)).unwrap();

    let err = pm.run(&mut circuit, &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedGate { ref gate, stage: Stage::PreOptimization } if gate == "measure"
    ));
    assert!(engine.calls().is_empty());
    assert_eq!(circuit.len(), 2);
}

#[test]
fn test_unsupported_gate_in_mapping_never_reaches_engine_or_solver() {
    let engine = Arc::new(RecordingEngine::default());
    let session = EngineSession::new(engine.clone()).unwrap();
    let solver = Arc::new(ScriptedSolver::default());
    let config = PipelineConfig::default();
    let (pm, mut props) = PassManagerBuilder::from_config(&config, session, solver.clone())
        .with_coupling_map(CouplingMap::linear(3))
        .build();

    let mut circuit = Circuit::with_size("sx", 2, 0);
    circuit.sx(QubitId(1)).unwrap();

    let err = pm.run(&mut circuit, &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedGate { stage: Stage::Decompose3q, .. }
    ));
    assert!(engine.calls().is_empty());
    assert!(solver.calls().is_empty());
}

/// Load `source` as a pipeline file and run it on a 3-qubit line with the
/// given engine and solver.
fn run_from_yaml(
    source: &str,
    engine: Arc<RecordingEngine>,
    solver: Arc<ScriptedSolver>,
) -> Result<(), CompileError> {
    let config = PipelineConfig::from_yaml_str(source)?;
    let session = EngineSession::new(engine)?;
    let (pm, mut props) = PassManagerBuilder::from_config(&config, session, solver)
        .with_coupling_map(CouplingMap::linear(3))
        .build();
    pm.run(&mut far_cx(), &mut props)
}

#[test]
fn test_bogus_layout_rejected_before_any_call() {
    let engine = Arc::new(RecordingEngine::default());
    let solver = Arc::new(ScriptedSolver::default());

    let err = run_from_yaml("layout: bogus\n", engine.clone(), solver.clone()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidConfiguration { kind: "layout method", ref name } if name == "bogus"
    ));
    assert!(engine.calls().is_empty());
    assert!(solver.calls().is_empty());

    let err = run_from_yaml("post: [frobnicate]\n", engine.clone(), solver.clone()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidConfiguration { kind: "optimization", .. }));
    assert!(engine.calls().is_empty());
    assert!(solver.calls().is_empty());
}

#[test]
fn test_reference_layout_spans_the_device() {
    let engine = Arc::new(DisagreeingEngine::default());
    let session = EngineSession::new(engine.clone()).unwrap();
    let config = PipelineConfig::builder().seed(3).build().unwrap();
    let (pm, mut props) =
        PassManagerBuilder::from_config(&config, session.clone(), Arc::new(HeuristicSolver::new()))
            .with_coupling_map(CouplingMap::linear(5))
            .build();

    let err = pm.run(&mut far_cx(), &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MappingValidationFailed { stage: Stage::Mapping }
    ));
    let sizes = engine.layout_sizes.lock().unwrap().clone();
    assert_eq!(sizes, vec![5]);
    assert_eq!(session.live_handles(), props.retained_handles());
}

#[test]
fn test_inequivalent_mapping_fails_and_releases_once() {
    let engine = Arc::new(DisagreeingEngine::default());
    let session = EngineSession::new(engine.clone()).unwrap();
    let config = PipelineConfig::builder().seed(3).build().unwrap();
    let (pm, mut props) =
        PassManagerBuilder::from_config(&config, session.clone(), Arc::new(HeuristicSolver::new()))
            .with_coupling_map(CouplingMap::linear(3))
            .build();

    let mut circuit = far_cx();
    let err = pm.run(&mut circuit, &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MappingValidationFailed { stage: Stage::Mapping }
    ));

    let compared = engine.compared.lock().unwrap().clone();
    assert_eq!(compared.len(), 1);
    let released = engine.released.lock().unwrap().clone();
    assert_eq!(released.iter().filter(|&&h| h == compared[0]).count(), 1);
    assert_eq!(session.live_handles(), props.retained_handles());
    assert!(props.get::<MappingReport>().is_none());
    assert_eq!(circuit, far_cx());
}

#[test]
fn test_wrong_solver_output_is_caught() {
    let session = native_session();
    let solver = Arc::new(ScriptedSolver {
        drop_last_gate: true,
        ..ScriptedSolver::default()
    });
    let config = PipelineConfig::default();
    let (pm, mut props) = PassManagerBuilder::from_config(&config, session.clone(), solver)
        .with_coupling_map(CouplingMap::linear(3))
        .build();

    let err = pm.run(&mut far_cx(), &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MappingValidationFailed { stage: Stage::Mapping }
    ));
    assert_eq!(session.live_handles(), props.retained_handles());
}

#[test]
fn test_unrouted_circuit_violates_constraints() {
    let session = native_session();
    let solver = Arc::new(ScriptedSolver {
        exact: Some(ExactStatus::NoSolutionFound),
        skip_routing: true,
        ..ScriptedSolver::default()
    });
    let config = PipelineConfig::builder().layout("trivial").build().unwrap();
    let (pm, mut props) = PassManagerBuilder::from_config(&config, session.clone(), solver)
        .with_coupling_map(CouplingMap::linear(3))
        .build();

    let err = pm.run(&mut far_cx(), &mut props).unwrap_err();
    assert!(matches!(
        err,
        CompileError::ConstraintViolation { qubit1: 0, qubit2: 2 }
    ));
    assert_eq!(session.live_handles(), props.retained_handles());
}

#[test]
fn test_fallback_runs_exactly_one_heuristic() {
    let solver = Arc::new(ScriptedSolver {
        exact: Some(ExactStatus::CallLimitReached),
        ..ScriptedSolver::default()
    });
    let config = PipelineConfig::builder()
        .layout("dense")
        .routing("basic")
        .build()
        .unwrap();
    let (pm, mut props) = PassManagerBuilder::from_config(&config, native_session(), solver.clone())
        .with_coupling_map(CouplingMap::linear(3))
        .build();

    let mut circuit = far_cx();
    pm.run(&mut circuit, &mut props).unwrap();

    let calls = solver.calls();
    assert_eq!(calls[..2], ["exact_layout", "heuristic_layout"]);
    assert_eq!(calls.iter().filter(|&&c| c == "heuristic_layout").count(), 1);

    let report = props.get::<MappingReport>().unwrap();
    assert_eq!(report.trace.exact_status, Some(ExactStatus::CallLimitReached));
    assert_eq!(
        report.trace.placement_source,
        Some(PlacementSource::Heuristic(LayoutMethod::Dense))
    );
    assert_eq!(
        report.trace.visited[..2],
        [
            ChainState::ExactLayout,
            ChainState::HeuristicLayout(LayoutMethod::Dense)
        ]
    );
    assert_eq!(circuit.num_qubits(), 3);
}
