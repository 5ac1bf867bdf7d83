//! Applies an ordered list of transformations to an engine circuit.
//!
//! Each step consumes the current handle and yields the next. After a
//! non-empty list, `replace_rzq` runs so that the result uses standard
//! rotation gates. An empty list returns the circuit unchanged.
//! `simple_map` needs both a layout and a graph; without them it is skipped,
//! which is reported but is not an error.

use std::fmt;

use tracing::{debug, info, warn};
use veriq_engine::{CircuitHandle, GraphHandle, LayoutHandle, Transform};

use crate::config::OptimizationName;
use crate::error::CompileResult;

/// Why a step did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingLayout,
    MissingGraph,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingLayout => f.write_str("no layout established"),
            SkipReason::MissingGraph => f.write_str("no device graph established"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Skipped(SkipReason),
    Failed(String),
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub outcome: StepOutcome,
}

impl StepReport {
    fn new(step: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            step: step.into(),
            outcome,
        }
    }
}

/// Prerequisites of `simple_map`.
#[derive(Debug, Default)]
pub struct RoutingContext<'a> {
    layout: Option<LayoutHandle>,
    graph: Option<&'a GraphHandle>,
    final_layout: Option<Vec<u32>>,
}

impl<'a> RoutingContext<'a> {
    pub fn new(layout: Option<LayoutHandle>, graph: Option<&'a GraphHandle>) -> Self {
        Self {
            layout,
            graph,
            final_layout: None,
        }
    }

    /// The layout the engine reported after `simple_map`, if it ran.
    pub fn final_layout(&self) -> Option<&[u32]> {
        self.final_layout.as_deref()
    }

    pub fn into_final_layout(self) -> Option<Vec<u32>> {
        self.final_layout
    }
}

fn run_transform(
    circuit: CircuitHandle,
    transform: Transform,
    reports: &mut Vec<StepReport>,
) -> CompileResult<CircuitHandle> {
    match circuit.transform(transform) {
        Ok(next) => {
            debug!("Applied {}", transform);
            reports.push(StepReport::new(transform.name(), StepOutcome::Applied));
            Ok(next)
        }
        Err(e) => {
            warn!("Transformation {} failed: {}", transform, e);
            reports.push(StepReport::new(
                transform.name(),
                StepOutcome::Failed(e.to_string()),
            ));
            Err(e.into())
        }
    }
}

fn run_simple_map(
    circuit: CircuitHandle,
    ctx: &mut RoutingContext<'_>,
    reports: &mut Vec<StepReport>,
) -> CompileResult<CircuitHandle> {
    let name = OptimizationName::SimpleMap.name();
    let (layout, graph) = match (ctx.layout.take(), ctx.graph) {
        (Some(layout), Some(graph)) => (layout, graph),
        (layout, _) => {
            let reason = if layout.is_some() {
                SkipReason::MissingGraph
            } else {
                SkipReason::MissingLayout
            };
            ctx.layout = layout;
            info!("Skipping {}: {}", name, reason);
            reports.push(StepReport::new(name, StepOutcome::Skipped(reason)));
            return Ok(circuit);
        }
    };

    match circuit.simple_map(layout, graph) {
        Ok((mapped, final_layout)) => {
            ctx.final_layout = Some(final_layout.to_list()?);
            debug!("Applied {} onto {} qubits", name, mapped.num_qubits());
            reports.push(StepReport::new(name, StepOutcome::Applied));
            Ok(mapped)
        }
        Err(e) => {
            warn!("{} failed: {}", name, e);
            reports.push(StepReport::new(name, StepOutcome::Failed(e.to_string())));
            Err(e.into())
        }
    }
}

/// Run `steps` in order, then canonicalize. An empty list is a no-op.
///
/// Reports are appended as steps finish, so on error `reports` ends with the
/// failed step.
pub fn apply(
    circuit: CircuitHandle,
    steps: &[OptimizationName],
    ctx: &mut RoutingContext<'_>,
    reports: &mut Vec<StepReport>,
) -> CompileResult<CircuitHandle> {
    if steps.is_empty() {
        return Ok(circuit);
    }
    let mut circuit = circuit;
    for &step in steps {
        circuit = match step.transform() {
            Some(transform) => run_transform(circuit, transform, reports)?,
            None => run_simple_map(circuit, ctx, reports)?,
        };
    }
    run_transform(circuit, Transform::ReplaceRzq, reports)
}
