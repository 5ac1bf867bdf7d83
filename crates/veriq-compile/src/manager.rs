//! Pass manager for orchestrating the pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use veriq_engine::{EngineSession, Topology};
use veriq_ir::Circuit;
use veriq_route::{CouplingMap, MappingSolver};

use crate::config::PipelineConfig;
use crate::device::DeviceGraph;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{Decompose3q, VerifiedMap, VerifiedOptimize};
use crate::property::PropertySet;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    /// Session whose live objects are audited after each run.
    session: Option<EngineSession>,
    deadline: Option<Duration>,
}

impl PassManager {
    pub fn new() -> Self {
        Self {
            passes: vec![],
            session: None,
            deadline: None,
        }
    }

    /// Audit `session` for leaked engine objects after every run.
    #[must_use]
    pub fn with_session(mut self, session: EngineSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Wall-clock budget for one run, checked between passes.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Pass names in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on `circuit`.
    ///
    /// Fails with `ResourceLeak` if the audited session holds more objects
    /// afterwards than before, not counting objects the property set keeps
    /// for later runs.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );
        let live_before = self.session.as_ref().map(EngineSession::live_handles);
        let retained_before = properties.retained_handles();
        let start = Instant::now();

        for (i, pass) in self.passes.iter().enumerate() {
            if i > 0 {
                self.check_deadline(start)?;
            }
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        if let (Some(session), Some(before)) = (self.session.as_ref(), live_before) {
            let retained = properties.retained_handles();
            let expected = (before + retained).saturating_sub(retained_before);
            let live = session.live_handles();
            if live > expected {
                warn!("{} engine object(s) outlived the run", live - expected);
                return Err(CompileError::ResourceLeak {
                    leaked: live - expected,
                });
            }
        }

        info!(
            "Pass manager completed in {:?}, ops: {}",
            start.elapsed(),
            circuit.len()
        );
        Ok(())
    }

    fn check_deadline(&self, start: Instant) -> CompileResult<()> {
        let Some(deadline) = self.deadline else {
            return Ok(());
        };
        let elapsed = start.elapsed();
        if elapsed > deadline {
            return Err(CompileError::DeadlineExceeded {
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the standard verified pipeline from a configuration.
///
/// `[pre optimization] → [3-qubit decomposition → mapping] → post optimization`,
/// where the pre pass needs a non-empty list and mapping needs a coupling map.
pub struct PassManagerBuilder {
    config: PipelineConfig,
    session: EngineSession,
    solver: Arc<dyn MappingSolver>,
    properties: PropertySet,
}

impl PassManagerBuilder {
    pub fn from_config(
        config: &PipelineConfig,
        session: EngineSession,
        solver: Arc<dyn MappingSolver>,
    ) -> Self {
        Self {
            config: config.clone(),
            session,
            solver,
            properties: PropertySet::new(),
        }
    }

    /// Set the target device.
    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self
    }

    /// Target a named topology. The engine graph is built with the engine's
    /// own topology constructor and cached in the properties.
    pub fn with_topology(mut self, topology: Topology) -> CompileResult<Self> {
        let graph = DeviceGraph::from_topology(&self.session, topology)?;
        self.properties.coupling_map = Some(graph.coupling().clone());
        self.properties.device_graph = Some(graph);
        Ok(self)
    }

    /// Start from existing properties, keeping their cached device graph.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new().with_session(self.session.clone());
        if let Some(deadline) = self.config.deadline() {
            pm = pm.with_deadline(deadline);
        }

        if !self.config.pre().is_empty() {
            pm.add_pass(VerifiedOptimize::pre(
                self.session.clone(),
                self.config.pre().to_vec(),
            ));
        }

        if self.properties.coupling_map.is_some() {
            pm.add_pass(Decompose3q::new(self.session.clone()));
            pm.add_pass(VerifiedMap::new(
                self.session.clone(),
                self.solver,
                self.config.layout(),
                self.config.routing(),
                self.config.solver().clone(),
            ));
        }

        pm.add_pass(VerifiedOptimize::post(
            self.session,
            self.config.post().to_vec(),
        ));

        (pm, self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_empty_run_keeps_circuit() {
        let pm = PassManager::new();
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(veriq_ir::QubitId(0)).unwrap();
        pm.run(&mut circuit, &mut PropertySet::new()).unwrap();
        assert_eq!(circuit.len(), 1);
    }
}
