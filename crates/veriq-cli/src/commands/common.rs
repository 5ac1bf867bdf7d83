//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;

use veriq_adapter_native::NativeEngine;
use veriq_compile::interchange;
use veriq_engine::{EngineSession, GateCount, Topology};
use veriq_ir::Circuit;
use veriq_qasm::{emit, parse};
use veriq_route::CouplingMap;

/// A device named on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// One of the engine's own topologies.
    Named(Topology),
    /// Any other coupling map.
    Custom(CouplingMap),
}

impl Target {
    pub fn num_qubits(&self) -> u32 {
        match self {
            Target::Named(t) => t.num_qubits(),
            Target::Custom(c) => c.num_qubits(),
        }
    }
}

/// Parse `lnn:N`, `ring:N`, `grid:RxC`, `tenerife`, `full:N` or
/// `edges:<file.json>`.
pub fn parse_target(text: &str) -> Result<Target> {
    if let Some(n) = text.strip_prefix("full:") {
        let n: u32 = n
            .parse()
            .with_context(|| format!("Invalid qubit count in topology '{text}'"))?;
        return Ok(Target::Custom(CouplingMap::full(n)));
    }
    if let Some(path) = text.strip_prefix("edges:") {
        return load_edges(Path::new(path)).map(Target::Custom);
    }
    text.parse::<Topology>()
        .map(Target::Named)
        .with_context(|| {
            format!("Unknown topology '{text}'. Available: lnn:N, ring:N, grid:RxC, tenerife, full:N, edges:<file.json>")
        })
}

/// Read a JSON array of `[a, b]` pairs.
fn load_edges(path: &Path) -> Result<CouplingMap> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edge list: {}", path.display()))?;
    let edges: Vec<(u32, u32)> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid edge list: {}", path.display()))?;
    let n = edges
        .iter()
        .map(|&(a, b)| a.max(b) + 1)
        .max()
        .unwrap_or(0);
    CouplingMap::from_edges(n, &edges)
        .with_context(|| format!("Invalid edge list: {}", path.display()))
}

/// Load a circuit from an OpenQASM 2.0 file.
pub fn load_circuit(path: &Path) -> Result<Circuit> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    parse(&source).map_err(|e| anyhow::anyhow!("Parse error in {}: {e}", path.display()))
}

pub fn save_circuit(circuit: &Circuit, path: &Path) -> Result<()> {
    fs::write(path, emit(circuit))
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// A session on the in-process engine.
pub fn native_session() -> Result<EngineSession> {
    EngineSession::new(Arc::new(NativeEngine::new())).context("Failed to start the engine")
}

/// Engine gate counts of a host circuit.
pub fn engine_counts(session: &EngineSession, circuit: &Circuit) -> Result<Vec<(GateCount, usize)>> {
    let handle = interchange::load(session, circuit)?;
    Ok(handle.gate_counts()?)
}

/// Print per-kind counts, side by side when `after` is given.
pub fn print_counts(before: &[(GateCount, usize)], after: Option<&[(GateCount, usize)]>) {
    let lookup = |counts: &[(GateCount, usize)], kind: GateCount| {
        counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |&(_, n)| n)
    };
    let total = |counts: &[(GateCount, usize)]| counts.iter().map(|&(_, n)| n).sum::<usize>();

    for kind in GateCount::ALL {
        let b = lookup(before, kind);
        let a = after.map(|after| lookup(after, kind));
        if b == 0 && a.unwrap_or(0) == 0 {
            continue;
        }
        match a {
            Some(a) => println!("  {:<5} {:>8} {} {:<8}", kind.label(), b, style("→").dim(), a),
            None => println!("  {:<5} {:>8}", kind.label(), b),
        }
    }
    match after {
        Some(after) => println!(
            "  {:<5} {:>8} {} {:<8}",
            style("total").bold(),
            total(before),
            style("→").dim(),
            total(after)
        ),
        None => println!("  {:<5} {:>8}", style("total").bold(), total(before)),
    }
}
