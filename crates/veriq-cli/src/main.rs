//! veriq command-line interface
//!
//! ```text
//! veriq compile -i in.qasm -o out.qasm --topology grid:2x3 --post optimize
//! veriq stats -i in.qasm
//! veriq topologies
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compile, stats, topologies, version};

/// veriq - verified optimization and mapping of quantum circuits
#[derive(Parser)]
#[command(name = "veriq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verified pipeline on a circuit
    Compile {
        /// Input file (OpenQASM 2.0)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to <input>_compiled.qasm)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print engine gate counts for a circuit
    Stats {
        /// Input file (OpenQASM 2.0)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the named device topologies
    Topologies,

    /// Show version information
    Version,
}

/// Pipeline settings. Flags override the configuration file.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// Pipeline configuration file (YAML or JSON)
    #[arg(long, env = "VERIQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transformations before mapping, comma separated
    #[arg(long, value_delimiter = ',')]
    pub pre: Option<Vec<String>>,

    /// Transformations after mapping, comma separated
    #[arg(long, value_delimiter = ',')]
    pub post: Option<Vec<String>>,

    /// Heuristic layout (trivial, dense, noise_adaptive, sabre)
    #[arg(long)]
    pub layout: Option<String>,

    /// Routing method (basic, stochastic, lookahead, sabre)
    #[arg(long)]
    pub routing: Option<String>,

    /// Target device, e.g. lnn:5, ring:8, grid:3x3, tenerife, full:4, edges:map.json
    #[arg(long, env = "VERIQ_TOPOLOGY")]
    pub topology: Option<String>,

    /// Seed for the randomized solvers
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wall-clock budget for the whole pipeline, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            pipeline,
        } => compile::execute(&input, output.as_deref(), &pipeline),
        Commands::Stats { input } => stats::execute(&input),
        Commands::Topologies => {
            topologies::execute();
            Ok(())
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };
    veriq_engine::runtime::shutdown();

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_flags() {
        let cli = Cli::try_parse_from([
            "veriq",
            "compile",
            "-i",
            "in.qasm",
            "--pre",
            "not_propagation,optimize",
            "--layout",
            "dense",
            "--topology",
            "grid:2x2",
            "--seed",
            "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Compile {
                input,
                output,
                pipeline,
            } => {
                assert_eq!(input, PathBuf::from("in.qasm"));
                assert!(output.is_none());
                assert_eq!(
                    pipeline.pre,
                    Some(vec!["not_propagation".to_string(), "optimize".to_string()])
                );
                assert_eq!(pipeline.layout.as_deref(), Some("dense"));
                assert_eq!(pipeline.seed, Some(9));
                assert!(pipeline.post.is_none());
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_parse_verbose_is_global() {
        let cli = Cli::try_parse_from(["veriq", "topologies", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_compile_requires_input() {
        assert!(Cli::try_parse_from(["veriq", "compile"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["veriq", "simulate"]).is_err());
    }
}
