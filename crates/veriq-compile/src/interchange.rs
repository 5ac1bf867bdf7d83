//! Circuit interchange with the engine through transient files.
//!
//! Every crossing goes through an [`Artifact`], a uniquely named temporary
//! file that is removed when the artifact is dropped, on success and error
//! paths alike.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use veriq_engine::{CircuitHandle, EngineSession};
use veriq_ir::Circuit;

use crate::error::{CompileError, CompileResult};

/// A transient interchange file.
#[derive(Debug)]
pub struct Artifact {
    file: NamedTempFile,
}

impl Artifact {
    /// A fresh, empty artifact.
    pub fn new() -> CompileResult<Self> {
        let file = tempfile::Builder::new()
            .prefix("veriq-")
            .suffix(".qasm")
            .tempfile()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `circuit` to a new artifact.
pub fn serialize(circuit: &Circuit) -> CompileResult<Artifact> {
    let mut artifact = Artifact::new()?;
    artifact
        .file
        .write_all(veriq_qasm::emit(circuit).as_bytes())?;
    artifact.file.flush()?;
    Ok(artifact)
}

/// Read a circuit back from an artifact.
pub fn deserialize(artifact: &Artifact) -> CompileResult<Circuit> {
    let source = std::fs::read_to_string(artifact.path())?;
    veriq_qasm::parse(&source).map_err(|e| CompileError::Interchange(e.to_string()))
}

/// Hand `circuit` to the engine.
pub fn load(session: &EngineSession, circuit: &Circuit) -> CompileResult<CircuitHandle> {
    let artifact = serialize(circuit)?;
    let handle = session.read_qasm(artifact.path())?;
    debug!(
        "Loaded {} qubits into engine circuit {}",
        handle.num_qubits(),
        handle.raw()
    );
    Ok(handle)
}

/// Fetch an engine circuit back to the host.
pub fn store(handle: &CircuitHandle) -> CompileResult<Circuit> {
    let artifact = Artifact::new()?;
    handle.write_qasm(artifact.path())?;
    deserialize(&artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriq_ir::QubitId;

    #[test]
    fn test_roundtrip_and_cleanup() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let artifact = serialize(&circuit).unwrap();
        let path = artifact.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("veriq-") && name.ends_with(".qasm"));

        let back = deserialize(&artifact).unwrap();
        assert_eq!(back.instructions(), circuit.instructions());

        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn test_names_are_unique() {
        let a = Artifact::new().unwrap();
        let b = Artifact::new().unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_garbage_is_an_interchange_error() {
        let mut artifact = Artifact::new().unwrap();
        artifact.file.write_all(b"not qasm at all").unwrap();
        assert!(matches!(
            deserialize(&artifact),
            Err(CompileError::Interchange(_))
        ));
    }
}
