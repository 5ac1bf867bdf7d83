//! Engine-verified optimization.

use tracing::{debug, info, instrument};
use veriq_engine::EngineSession;
use veriq_ir::Circuit;

use crate::config::OptimizationName;
use crate::device::DeviceGraph;
use crate::error::{CompileResult, Stage};
use crate::executor::{self, RoutingContext, StepReport};
use crate::interchange;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::validate::validate;
use crate::verify::layout_to_permutation;

use super::sync_device_graph;

/// Step reports of every optimization run, in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationLog {
    runs: Vec<(Stage, Vec<StepReport>)>,
}

impl OptimizationLog {
    pub fn runs(&self) -> &[(Stage, Vec<StepReport>)] {
        &self.runs
    }

    /// Reports of the most recent run at `stage`.
    pub fn last(&self, stage: Stage) -> Option<&[StepReport]> {
        self.runs
            .iter()
            .rev()
            .find(|(s, _)| *s == stage)
            .map(|(_, reports)| reports.as_slice())
    }

    fn record(properties: &mut PropertySet, stage: Stage, reports: Vec<StepReport>) {
        match properties.get_mut::<OptimizationLog>() {
            Some(log) => log.runs.push((stage, reports)),
            None => properties.insert(OptimizationLog {
                runs: vec![(stage, reports)],
            }),
        }
    }
}

/// Runs an ordered list of engine transformations on the circuit.
///
/// A non-empty list always ends with `replace_rzq`; an empty list leaves the
/// circuit untouched and never reaches the engine. A `simple_map` step uses the
/// layout and device graph from the property set and is skipped when either
/// is missing.
pub struct VerifiedOptimize {
    session: EngineSession,
    stage: Stage,
    steps: Vec<OptimizationName>,
}

impl VerifiedOptimize {
    pub fn new(session: EngineSession, stage: Stage, steps: Vec<OptimizationName>) -> Self {
        Self {
            session,
            stage,
            steps,
        }
    }

    /// Optimization ahead of mapping.
    pub fn pre(session: EngineSession, steps: Vec<OptimizationName>) -> Self {
        Self::new(session, Stage::PreOptimization, steps)
    }

    /// Optimization after mapping.
    pub fn post(session: EngineSession, steps: Vec<OptimizationName>) -> Self {
        Self::new(session, Stage::PostOptimization, steps)
    }

    pub fn steps(&self) -> &[OptimizationName] {
        &self.steps
    }

    fn wants_map(&self) -> bool {
        self.steps.contains(&OptimizationName::SimpleMap)
    }

    /// Returns the optimized circuit and the final layout if `simple_map`
    /// applied.
    fn execute(
        &self,
        circuit: &Circuit,
        properties: &PropertySet,
        reports: &mut Vec<StepReport>,
    ) -> CompileResult<(Circuit, Option<Vec<u32>>)> {
        let graph = if self.wants_map() {
            properties
                .device_graph()
                .map(DeviceGraph::handle)
                .transpose()?
        } else {
            None
        };
        let layout = match (self.wants_map(), properties.layout.as_ref()) {
            (true, Some(layout)) => {
                Some(self.session.list_to_layout(&layout_to_permutation(layout)?)?)
            }
            _ => None,
        };

        let mut ctx = RoutingContext::new(layout, graph);
        let input = interchange::load(&self.session, circuit)?;
        let output = executor::apply(input, &self.steps, &mut ctx, reports)?;
        let optimized = interchange::store(&output)?;
        Ok((optimized, ctx.into_final_layout()))
    }
}

impl Pass for VerifiedOptimize {
    fn name(&self) -> &str {
        match self.stage {
            Stage::PreOptimization => "pre_optimize",
            _ => "post_optimize",
        }
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    #[instrument(skip_all, fields(stage = %self.stage, steps = self.steps.len()))]
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        validate(circuit, self.stage)?;
        if self.steps.is_empty() {
            debug!("No transformations listed for {}", self.stage);
            return Ok(());
        }
        if self.wants_map() {
            sync_device_graph(&self.session, properties)?;
        }
        info!(
            "Running {} with {} step(s) on {} qubits",
            self.stage,
            self.steps.len(),
            circuit.num_qubits()
        );

        let mut reports = Vec::with_capacity(self.steps.len() + 1);
        let outcome = self.execute(circuit, properties, &mut reports);
        OptimizationLog::record(properties, self.stage, reports);
        let (optimized, final_layout) = outcome?;

        if let Some(final_layout) = final_layout {
            debug!("Layout consumed by simple_map");
            properties.layout = None;
            properties.final_layout = Some(final_layout);
        }
        info!(
            "Finished {}: {} -> {} gates",
            self.stage,
            circuit.len(),
            optimized.len()
        );
        *circuit = optimized;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_run_order() {
        let mut props = PropertySet::new();
        OptimizationLog::record(&mut props, Stage::PreOptimization, vec![]);
        OptimizationLog::record(&mut props, Stage::PostOptimization, vec![]);
        OptimizationLog::record(&mut props, Stage::PreOptimization, vec![]);

        let log = props.get::<OptimizationLog>().unwrap();
        assert_eq!(log.runs().len(), 3);
        assert_eq!(log.runs()[1].0, Stage::PostOptimization);
        assert!(log.last(Stage::PostOptimization).unwrap().is_empty());
        assert!(log.last(Stage::Decompose3q).is_none());
    }
}
