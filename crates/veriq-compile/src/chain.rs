//! The layout and routing fallback chain.
//!
//! ```text
//! ExactLayout ──SolutionFound──────────────┐
//!      │ otherwise                         ▼
//!      └──▶ HeuristicLayout(method) ──▶ Embed ──▶ RoutingCheck ──on map──▶ Done
//!                                                     │ off map
//!                                                     └──▶ Route(method) ──▶ Done
//! ```
//!
//! There is exactly one fallback, from the exact placement to the configured
//! heuristic. If the heuristic fails the chain fails.

use std::fmt;

use tracing::{debug, info, instrument};
use veriq_ir::Circuit;
use veriq_route::{
    CouplingMap, ExactStatus, LayoutMethod, MappingSolver, Placement, RegisterLayout,
    RoutingMethod, SolverParams,
};

use crate::error::{CompileError, CompileResult};

/// A state of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    ExactLayout,
    HeuristicLayout(LayoutMethod),
    Embed,
    RoutingCheck,
    Route(RoutingMethod),
    Done,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainState::ExactLayout => f.write_str("exact layout"),
            ChainState::HeuristicLayout(m) => write!(f, "{m} layout"),
            ChainState::Embed => f.write_str("embed"),
            ChainState::RoutingCheck => f.write_str("routing check"),
            ChainState::Route(m) => write!(f, "{m} routing"),
            ChainState::Done => f.write_str("done"),
        }
    }
}

/// Where the accepted placement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementSource {
    Exact,
    Heuristic(LayoutMethod),
}

/// Record of one run of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainTrace {
    pub visited: Vec<ChainState>,
    pub exact_status: Option<ExactStatus>,
    pub placement_source: Option<PlacementSource>,
    pub swaps: usize,
}

impl ChainTrace {
    pub fn routed(&self) -> bool {
        self.visited
            .iter()
            .any(|s| matches!(s, ChainState::Route(_)))
    }
}

/// The mapped circuit and how it was produced.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    /// Circuit on physical qubits, SWAPs included.
    pub circuit: Circuit,
    /// Layout of `circuit` before any of its SWAPs.
    pub layout: RegisterLayout,
    pub placement: Placement,
    /// Entry `p` is where the content of physical qubit `p` ends up.
    pub final_layout: Vec<u32>,
    pub trace: ChainTrace,
}

/// Methods and budgets for one chain run.
#[derive(Debug, Clone, Copy)]
pub struct ChainSettings<'a> {
    pub layout: LayoutMethod,
    pub routing: RoutingMethod,
    pub params: &'a SolverParams,
}

/// Place and, if needed, route `circuit` on `coupling`.
#[instrument(skip_all, fields(qubits = circuit.num_qubits(), device = coupling.num_qubits()))]
pub fn run_chain(
    solver: &dyn MappingSolver,
    circuit: &Circuit,
    coupling: &CouplingMap,
    settings: ChainSettings<'_>,
) -> CompileResult<ChainOutput> {
    let available = coupling.num_qubits();
    if circuit.num_qubits() > available {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available,
        });
    }

    let mut trace = ChainTrace::default();
    let mut placement: Option<Placement> = None;
    let mut embedded: Option<(Circuit, RegisterLayout)> = None;
    let mut final_layout: Vec<u32> = (0..available).collect();
    let mut state = ChainState::ExactLayout;

    while state != ChainState::Done {
        debug!("Mapping chain: {}", state);
        trace.visited.push(state);
        state = match state {
            ChainState::ExactLayout => {
                let outcome =
                    solver.exact_layout(circuit, coupling, settings.params.exact_limits())?;
                trace.exact_status = Some(outcome.status);
                match (outcome.status, outcome.placement) {
                    (ExactStatus::SolutionFound, Some(found)) => {
                        placement = Some(found);
                        trace.placement_source = Some(PlacementSource::Exact);
                        ChainState::Embed
                    }
                    (status, _) => {
                        info!(
                            "Exact layout ended with {}; falling back to {} layout",
                            status, settings.layout
                        );
                        ChainState::HeuristicLayout(settings.layout)
                    }
                }
            }
            ChainState::HeuristicLayout(method) => {
                let found =
                    solver.heuristic_layout(circuit, coupling, method, settings.params)?;
                placement = Some(found);
                trace.placement_source = Some(PlacementSource::Heuristic(method));
                ChainState::Embed
            }
            ChainState::Embed => {
                let chosen = placement.as_ref().ok_or_else(|| CompileError::PassFailed {
                    name: "mapping".into(),
                    reason: "embed reached without a placement".into(),
                })?;
                embedded = Some(solver.embed(circuit, coupling, chosen)?);
                ChainState::RoutingCheck
            }
            ChainState::RoutingCheck => {
                let on_map = embedded
                    .as_ref()
                    .is_some_and(|(c, _)| solver.check_map(c, coupling).is_none());
                if on_map {
                    ChainState::Done
                } else {
                    ChainState::Route(settings.routing)
                }
            }
            ChainState::Route(method) => {
                let (circuit, layout) = embedded.take().ok_or_else(|| CompileError::PassFailed {
                    name: "mapping".into(),
                    reason: "routing reached without an embedded circuit".into(),
                })?;
                let routed = solver.route(&circuit, coupling, method, settings.params)?;
                trace.swaps = routed.swaps;
                final_layout = routed.final_layout;
                embedded = Some((routed.circuit, layout));
                ChainState::Done
            }
            ChainState::Done => ChainState::Done,
        };
    }

    let (Some((circuit, layout)), Some(placement)) = (embedded, placement) else {
        return Err(CompileError::PassFailed {
            name: "mapping".into(),
            reason: "chain finished without a mapped circuit".into(),
        });
    };
    debug!(
        "Mapping chain finished after {} states with {} SWAPs",
        trace.visited.len(),
        trace.swaps
    );
    Ok(ChainOutput {
        circuit,
        layout,
        placement,
        final_layout,
        trace,
    })
}
