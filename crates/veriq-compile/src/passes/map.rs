//! Verified placement and routing.

use std::sync::Arc;

use tracing::{info, instrument};
use veriq_engine::EngineSession;
use veriq_ir::Circuit;
use veriq_route::{
    LayoutMethod, MappingSolver, Placement, RegisterLayout, RoutingMethod, SolverParams,
};

use crate::chain::{ChainSettings, ChainTrace, run_chain};
use crate::error::{CompileError, CompileResult, Stage};
use crate::interchange;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::validate::validate;
use crate::verify::{enforce_constraints, verify_mapping};

use super::sync_device_graph;

/// What the mapping stage did, published to the property set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingReport {
    pub trace: ChainTrace,
    pub placement: Placement,
    /// Layout of the mapped circuit before its SWAPs.
    pub layout: RegisterLayout,
    /// Layout after the SWAPs, `list[physical] = logical`.
    pub final_layout: Vec<u32>,
}

/// Maps the circuit onto the device in `PropertySet::coupling_map`.
///
/// The solver places and routes; the engine then has to confirm that the
/// mapped circuit is equivalent to the input and respects the device before
/// it replaces the circuit. The result has its SWAPs decomposed into CNOTs.
pub struct VerifiedMap {
    session: EngineSession,
    solver: Arc<dyn MappingSolver>,
    layout: LayoutMethod,
    routing: RoutingMethod,
    params: SolverParams,
}

impl VerifiedMap {
    pub fn new(
        session: EngineSession,
        solver: Arc<dyn MappingSolver>,
        layout: LayoutMethod,
        routing: RoutingMethod,
        params: SolverParams,
    ) -> Self {
        Self {
            session,
            solver,
            layout,
            routing,
            params,
        }
    }
}

impl Pass for VerifiedMap {
    fn name(&self) -> &str {
        "verified_map"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    #[instrument(skip_all, fields(layout = %self.layout, routing = %self.routing))]
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        validate(circuit, Stage::Mapping)?;
        let coupling = properties
            .coupling_map
            .clone()
            .ok_or(CompileError::MissingCouplingMap)?;
        info!(
            "Mapping {} qubits onto a {}-qubit device",
            circuit.num_qubits(),
            coupling.num_qubits()
        );

        let settings = ChainSettings {
            layout: self.layout,
            routing: self.routing,
            params: &self.params,
        };
        let chain = run_chain(self.solver.as_ref(), circuit, &coupling, settings)?;

        sync_device_graph(&self.session, properties)?;
        let graph = properties
            .device_graph()
            .ok_or(CompileError::MissingCouplingMap)?;
        let pre = interchange::load(&self.session, circuit)?;
        let post = interchange::load(&self.session, &chain.circuit)?;
        let verified = verify_mapping(
            &self.session,
            &pre,
            post,
            &chain.layout,
            graph.coupling().num_qubits(),
            Stage::Mapping,
        )?;
        drop(pre);
        let mapped = enforce_constraints(verified, graph)?;
        let result = interchange::store(&mapped)?;

        info!(
            "Mapped with {} SWAP(s) ({} gates after decomposition)",
            chain.trace.swaps,
            result.len()
        );
        properties.final_layout = Some(chain.final_layout.clone());
        properties.insert(MappingReport {
            trace: chain.trace,
            placement: chain.placement,
            layout: chain.layout,
            final_layout: chain.final_layout,
        });
        *circuit = result;
        Ok(())
    }
}
