//! The pass abstraction.

use veriq_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the circuit and writes only to the `PropertySet`.
    Analysis,
    /// Replaces the circuit.
    Transformation,
}

/// One stage of the pipeline.
///
/// Passes run in order on a host circuit. A pass that hands the circuit to
/// the engine must get every engine object it creates released before it
/// returns, on success and on error.
pub trait Pass: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> PassKind;

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Skip the pass for this circuit and state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}
