//! The solver seam used by the mapping pipeline.

use veriq_ir::Circuit;

use crate::coupling::CouplingMap;
use crate::device::DeviceProperties;
use crate::embed;
use crate::error::RouteResult;
use crate::exact;
use crate::heuristic;
use crate::layout::{Placement, RegisterLayout};
use crate::methods::{ExactLimits, ExactOutcome, LayoutMethod, RoutingMethod, SolverParams};
use crate::route::{self, RoutedCircuit};

/// Placement and routing capabilities.
///
/// Each method runs one named algorithm and reports what it did; choosing
/// between algorithms and falling back is the caller's business.
pub trait MappingSolver: Send + Sync {
    /// Subgraph-isomorphism placement under `limits`.
    fn exact_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        limits: ExactLimits,
    ) -> RouteResult<ExactOutcome>;

    /// One heuristic placement.
    fn heuristic_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: LayoutMethod,
        params: &SolverParams,
    ) -> RouteResult<Placement>;

    /// Pad with ancillas and apply `placement`.
    fn embed(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        placement: &Placement,
    ) -> RouteResult<(Circuit, RegisterLayout)>;

    /// First gate off the coupling map, if any.
    fn check_map(&self, circuit: &Circuit, coupling: &CouplingMap) -> Option<(u32, u32)>;

    /// Insert SWAPs with one routing method.
    fn route(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: RoutingMethod,
        params: &SolverParams,
    ) -> RouteResult<RoutedCircuit>;
}

/// The in-process solver.
#[derive(Debug, Clone, Default)]
pub struct HeuristicSolver {
    device: Option<DeviceProperties>,
}

impl HeuristicSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use calibration data for noise-aware placement.
    #[must_use]
    pub fn with_device(mut self, device: DeviceProperties) -> Self {
        self.device = Some(device);
        self
    }

    pub fn device(&self) -> Option<&DeviceProperties> {
        self.device.as_ref()
    }
}

impl MappingSolver for HeuristicSolver {
    fn exact_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        limits: ExactLimits,
    ) -> RouteResult<ExactOutcome> {
        exact::exact_layout(circuit, coupling, limits)
    }

    fn heuristic_layout(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: LayoutMethod,
        params: &SolverParams,
    ) -> RouteResult<Placement> {
        heuristic::heuristic_layout(circuit, coupling, method, params, self.device.as_ref())
    }

    fn embed(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        placement: &Placement,
    ) -> RouteResult<(Circuit, RegisterLayout)> {
        embed::embed(circuit, coupling, placement)
    }

    fn check_map(&self, circuit: &Circuit, coupling: &CouplingMap) -> Option<(u32, u32)> {
        embed::check_map(circuit, coupling)
    }

    fn route(
        &self,
        circuit: &Circuit,
        coupling: &CouplingMap,
        method: RoutingMethod,
        params: &SolverParams,
    ) -> RouteResult<RoutedCircuit> {
        route::route(circuit, coupling, method, params)
    }
}
