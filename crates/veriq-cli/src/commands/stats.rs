//! Stats command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use super::common::{native_session, print_counts};

/// Execute the stats command.
pub fn execute(input: &Path) -> Result<()> {
    let session = native_session()?;
    let circuit = session
        .read_qasm(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    println!(
        "{} {} ({} qubits)",
        style("Stats").cyan().bold(),
        style(input.display()).green(),
        circuit.num_qubits()
    );
    print_counts(&circuit.gate_counts()?, None);
    println!(
        "  Clifford rzq: {}",
        circuit.count_clifford_rzq()?
    );
    println!(
        "  Well typed:   {}",
        if circuit.is_well_typed(circuit.num_qubits())? {
            style("yes").green()
        } else {
            style("no").red()
        }
    );
    Ok(())
}
