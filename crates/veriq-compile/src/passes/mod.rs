//! Built-in pipeline passes.
//!
//! Each pass validates its input, hands the circuit to the engine through
//! the interchange boundary and brings the result back:
//! - [`VerifiedOptimize`]: an ordered list of engine transformations.
//! - [`Decompose3q`]: CNOT form ahead of routing.
//! - [`VerifiedMap`]: placement, routing and verification on a device.

mod decompose;
mod map;
mod optimize;

pub use decompose::Decompose3q;
pub use map::{MappingReport, VerifiedMap};
pub use optimize::{OptimizationLog, VerifiedOptimize};

use tracing::debug;
use veriq_engine::EngineSession;

use crate::device::DeviceGraph;
use crate::error::CompileResult;
use crate::property::PropertySet;

/// Make `properties.device_graph` match `properties.coupling_map`.
///
/// A cached graph for the same coupling map is reused. A graph for another
/// map is replaced; if that fails the cached graph is dropped.
pub(crate) fn sync_device_graph(
    session: &EngineSession,
    properties: &mut PropertySet,
) -> CompileResult<()> {
    let Some(coupling) = properties.coupling_map.as_ref() else {
        return Ok(());
    };
    if let Some(graph) = properties.device_graph.as_mut() {
        if graph.coupling() == coupling && graph.live_handles() > 0 {
            debug!("Reusing device graph for {} qubits", coupling.num_qubits());
            return Ok(());
        }
        if let Err(e) = graph.replace(session, coupling.clone()) {
            // A graph without a handle must not be mistaken for a cached one.
            properties.device_graph = None;
            return Err(e);
        }
        return Ok(());
    }
    properties.device_graph = Some(DeviceGraph::new(session, coupling.clone())?);
    Ok(())
}
