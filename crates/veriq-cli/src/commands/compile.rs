//! Compile command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use veriq_compile::{PassManagerBuilder, PipelineConfig};
use veriq_route::HeuristicSolver;

use super::common::{
    Target, engine_counts, load_circuit, native_session, parse_target, print_counts, save_circuit,
};
use crate::PipelineArgs;

/// Merge the configuration file and flags into one configuration.
pub fn pipeline_config(args: &PipelineArgs) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut builder = base.to_builder();
    if let Some(pre) = &args.pre {
        builder = builder.pre(pre.iter().filter(|s| !s.is_empty()).cloned());
    }
    if let Some(post) = &args.post {
        builder = builder.post(post.iter().filter(|s| !s.is_empty()).cloned());
    }
    if let Some(layout) = &args.layout {
        builder = builder.layout(layout.clone());
    }
    if let Some(routing) = &args.routing {
        builder = builder.routing(routing.clone());
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if let Some(secs) = args.timeout {
        builder = builder.deadline(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_compiled.qasm"))
}

/// Execute the compile command.
pub fn execute(input: &Path, output: Option<&Path>, args: &PipelineArgs) -> Result<()> {
    let config = pipeline_config(args)?;
    let target = args.topology.as_deref().map(parse_target).transpose()?;

    println!(
        "{} Compiling {}{}",
        style("→").cyan().bold(),
        style(input.display()).green(),
        target
            .as_ref()
            .map(|t| format!(" for a {}-qubit device", t.num_qubits()))
            .unwrap_or_default()
    );

    let mut circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qubits, {} gates, depth {}",
        circuit.num_qubits(),
        circuit.len(),
        circuit.depth()
    );

    let original = circuit.clone();
    let session = native_session()?;

    let builder = PassManagerBuilder::from_config(
        &config,
        session.clone(),
        Arc::new(HeuristicSolver::new()),
    );
    let builder = match target {
        Some(Target::Named(topology)) => builder.with_topology(topology)?,
        Some(Target::Custom(coupling)) => builder.with_coupling_map(coupling),
        None => builder,
    };
    let (pm, mut props) = builder.build();
    debug!("Pipeline: {:?}", pm.pass_names());
    println!("  Running {} verified passes", pm.len());

    pm.run(&mut circuit, &mut props)?;

    println!("{} Compilation complete", style("✓").green().bold());
    if let Some(layout) = &props.final_layout {
        println!("  Final layout: {layout:?}");
    }
    let before = engine_counts(&session, &original)?;
    let after = engine_counts(&session, &circuit)?;
    print_counts(&before, Some(&after));

    let output = output.map_or_else(|| default_output(input), Path::to_path_buf);
    save_circuit(&circuit, &output)?;
    println!("  Output: {}", style(output.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = PipelineArgs {
            post: Some(vec!["cancel_single_qubit_gates".into()]),
            layout: Some("trivial".into()),
            seed: Some(4),
            ..PipelineArgs::default()
        };
        let config = pipeline_config(&args).unwrap();
        assert_eq!(config.post().len(), 1);
        assert_eq!(config.layout().name(), "trivial");
        assert_eq!(config.solver().seed, Some(4));
    }

    #[test]
    fn test_bad_layout_flag() {
        let args = PipelineArgs {
            layout: Some("bogus".into()),
            ..PipelineArgs::default()
        };
        assert!(pipeline_config(&args).is_err());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output(Path::new("dir/bell.qasm")),
            PathBuf::from("dir/bell_compiled.qasm")
        );
    }
}
