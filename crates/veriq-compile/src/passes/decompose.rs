//! CNOT decomposition ahead of routing.

use tracing::info;
use veriq_engine::{EngineSession, Transform};
use veriq_ir::Circuit;

use crate::error::{CompileResult, Stage};
use crate::interchange;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::validate::validate;

/// Rewrites the circuit into CNOT form so that routing only sees gates on at
/// most two qubits. CCX, CCZ, CZ and SWAP are lowered to CX plus single-qubit
/// gates.
pub struct Decompose3q {
    session: EngineSession,
}

impl Decompose3q {
    pub fn new(session: EngineSession) -> Self {
        Self { session }
    }
}

impl Pass for Decompose3q {
    fn name(&self) -> &str {
        "decompose_3q"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        validate(circuit, Stage::Decompose3q)?;
        let input = interchange::load(&self.session, circuit)?;
        let output = input.transform(Transform::DecomposeToCnot)?;
        let decomposed = interchange::store(&output)?;
        info!(
            "Decomposed to CNOT form: {} -> {} gates",
            circuit.len(),
            decomposed.len()
        );
        *circuit = decomposed;
        Ok(())
    }
}
