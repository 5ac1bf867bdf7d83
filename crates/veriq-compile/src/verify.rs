//! Mapping verification.
//!
//! A mapped circuit is accepted only if the engine finds it swap-equivalent
//! to the input and every two-qubit gate sits on a device edge once SWAPs are
//! decomposed. Any doubt is a failure.

use tracing::{debug, warn};
use veriq_engine::{CircuitHandle, EngineSession};
use veriq_route::RegisterLayout;

use crate::device::DeviceGraph;
use crate::error::{CompileError, CompileResult, Stage};
use crate::interchange;

/// Flatten a register layout into `perm[physical] = logical`.
///
/// Primary qubits keep their index; ancilla qubits come after them. At most
/// one primary and one ancilla register are supported.
pub fn layout_to_permutation(layout: &RegisterLayout) -> CompileResult<Vec<u32>> {
    let (ancillas, primaries): (Vec<_>, Vec<_>) =
        layout.registers().iter().partition(|r| r.is_ancilla);
    if primaries.len() > 1 {
        return Err(CompileError::LayoutConversion(format!(
            "{} non-ancilla registers, expected at most one",
            primaries.len()
        )));
    }
    if ancillas.len() > 1 {
        return Err(CompileError::LayoutConversion(format!(
            "{} ancilla registers, expected at most one",
            ancillas.len()
        )));
    }
    let primary = primaries.first();
    let ancilla = ancillas.first();
    let offset = primary.map_or(0, |r| r.size);

    layout
        .iter()
        .map(|(physical, bit)| {
            let (register, base) = match (primary, ancilla) {
                (Some(r), _) if r.name == bit.register => (*r, 0),
                (_, Some(r)) if r.name == bit.register => (*r, offset),
                _ => {
                    return Err(CompileError::LayoutConversion(format!(
                        "physical qubit {physical} holds {bit} from an unknown register"
                    )));
                }
            };
            if bit.index >= register.size {
                return Err(CompileError::LayoutConversion(format!(
                    "{bit} is outside register of size {}",
                    register.size
                )));
            }
            Ok(base + bit.index)
        })
        .collect()
}

/// Check `post` under `post_layout` against `pre` under the trivial layout of
/// a `device_qubits`-qubit device.
///
/// `post` is consumed. It is returned only when the engine reports
/// equivalence; otherwise it is released and the stage fails.
pub fn verify_mapping(
    session: &EngineSession,
    pre: &CircuitHandle,
    post: CircuitHandle,
    post_layout: &RegisterLayout,
    device_qubits: u32,
    stage: Stage,
) -> CompileResult<CircuitHandle> {
    let perm = layout_to_permutation(post_layout)?;
    if perm.len() != device_qubits as usize || perm.len() != post.num_qubits() as usize {
        return Err(CompileError::LayoutConversion(format!(
            "layout covers {} qubits, the mapped circuit has {} and the device {}",
            perm.len(),
            post.num_qubits(),
            device_qubits
        )));
    }

    let pre_layout = session.trivial_layout(device_qubits)?;
    let post_perm = session.list_to_layout(&perm)?;
    let equivalent = session.check_swap_equivalence(pre, &pre_layout, &post, &post_perm)?;
    if !equivalent {
        warn!("Engine rejected the mapped circuit in {}", stage);
        drop(post);
        return Err(CompileError::MappingValidationFailed { stage });
    }
    debug!("Mapped circuit is swap-equivalent to the input");
    Ok(post)
}

/// Decompose SWAPs along `graph` and require every two-qubit gate on an edge.
pub fn enforce_constraints(
    post: CircuitHandle,
    graph: &DeviceGraph,
) -> CompileResult<CircuitHandle> {
    let handle = graph.handle()?;
    let decomposed = post.decompose_swaps(handle)?;
    if decomposed.satisfies_constraints(handle)? {
        return Ok(decomposed);
    }

    let host = interchange::store(&decomposed)?;
    match veriq_route::check_map(&host, graph.coupling()) {
        Some((qubit1, qubit2)) => Err(CompileError::ConstraintViolation { qubit1, qubit2 }),
        None => Err(CompileError::PassFailed {
            name: "constraint check".into(),
            reason: "engine reported a violation that could not be located".into(),
        }),
    }
}
